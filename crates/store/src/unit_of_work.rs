use async_trait::async_trait;
use chrono::NaiveDate;

use mostrador_core::{OrderId, ProductId};
use mostrador_orders::{PurchaseOrder, SaleOrder};
use mostrador_products::Product;

use crate::error::StoreError;

/// A storage backend for the order ledger.
///
/// `begin` opens a unit of work; everything else is a plain read executed
/// outside any transaction. Writes only ever happen through an [`OrderTx`].
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn OrderTx>, StoreError>;

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;
    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
    async fn products(&self) -> Result<Vec<Product>, StoreError>;
    async fn low_stock_products(&self) -> Result<Vec<Product>, StoreError>;

    async fn sales(&self) -> Result<Vec<SaleOrder>, StoreError>;
    async fn sale(&self, id: OrderId) -> Result<Option<SaleOrder>, StoreError>;
    async fn sales_on(&self, day: NaiveDate) -> Result<Vec<SaleOrder>, StoreError>;

    async fn purchases(&self) -> Result<Vec<PurchaseOrder>, StoreError>;
    async fn purchase(&self, id: OrderId) -> Result<Option<PurchaseOrder>, StoreError>;
}

/// One all-or-nothing unit of work.
///
/// Dropping a transaction without calling [`OrderTx::commit`] rolls back
/// every write made through it. `product_for_update` takes whatever lock the
/// backend needs so that the stock seen by the caller cannot change under it
/// before the transaction resolves.
#[async_trait]
pub trait OrderTx: Send {
    async fn product_for_update(&mut self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Apply a signed delta to a product's stock on hand.
    async fn adjust_stock(&mut self, id: ProductId, delta: i64) -> Result<(), StoreError>;

    async fn insert_sale(&mut self, order: &SaleOrder) -> Result<(), StoreError>;
    async fn insert_purchase(&mut self, order: &PurchaseOrder) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
