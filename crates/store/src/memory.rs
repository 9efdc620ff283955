use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use mostrador_core::{OrderId, ProductId};
use mostrador_orders::{PurchaseOrder, SaleOrder};
use mostrador_products::Product;

use crate::error::StoreError;
use crate::unit_of_work::{OrderStore, OrderTx};

#[derive(Debug, Default, Clone)]
struct MemoryState {
    products: HashMap<ProductId, Product>,
    sales: Vec<SaleOrder>,
    purchases: Vec<PurchaseOrder>,
}

/// In-memory backend for development and tests.
///
/// A transaction takes the whole-store mutex for its lifetime and mutates a
/// staged clone, which replaces the live state on commit. That makes
/// transactions serializable by construction and gives read-your-writes
/// semantics inside a transaction, at the cost of concurrency nobody needs
/// from a dev backend.
#[derive(Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn OrderTx>, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx { guard, staged }))
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.products.values().any(|p| p.code == product.code) {
            return Err(StoreError::Constraint(format!(
                "product code {:?} already exists",
                product.code
            )));
        }
        state.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.state.lock().await.products.get(&id).cloned())
    }

    async fn products(&self) -> Result<Vec<Product>, StoreError> {
        let state = self.state.lock().await;
        let mut products: Vec<_> = state.products.values().cloned().collect();
        products.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(products)
    }

    async fn low_stock_products(&self) -> Result<Vec<Product>, StoreError> {
        let state = self.state.lock().await;
        let mut products: Vec<_> = state
            .products
            .values()
            .filter(|p| p.active && p.is_low_stock())
            .cloned()
            .collect();
        products.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(products)
    }

    async fn sales(&self) -> Result<Vec<SaleOrder>, StoreError> {
        Ok(self.state.lock().await.sales.clone())
    }

    async fn sale(&self, id: OrderId) -> Result<Option<SaleOrder>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .sales
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn sales_on(&self, day: NaiveDate) -> Result<Vec<SaleOrder>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .sales
            .iter()
            .filter(|s| s.created_at.date_naive() == day)
            .cloned()
            .collect())
    }

    async fn purchases(&self) -> Result<Vec<PurchaseOrder>, StoreError> {
        Ok(self.state.lock().await.purchases.clone())
    }

    async fn purchase(&self, id: OrderId) -> Result<Option<PurchaseOrder>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .purchases
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl OrderTx for MemoryTx {
    async fn product_for_update(&mut self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.staged.products.get(&id).cloned())
    }

    async fn adjust_stock(&mut self, id: ProductId, delta: i64) -> Result<(), StoreError> {
        let product = self
            .staged
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::Constraint(format!("unknown product {id}")))?;
        product.stock += delta;
        Ok(())
    }

    async fn insert_sale(&mut self, order: &SaleOrder) -> Result<(), StoreError> {
        if self.staged.sales.iter().any(|s| s.order_number == order.order_number)
            || self
                .staged
                .purchases
                .iter()
                .any(|p| p.order_number == order.order_number)
        {
            return Err(StoreError::Constraint(format!(
                "order number {:?} already exists",
                order.order_number
            )));
        }
        self.staged.sales.push(order.clone());
        Ok(())
    }

    async fn insert_purchase(&mut self, order: &PurchaseOrder) -> Result<(), StoreError> {
        if self.staged.purchases.iter().any(|p| p.order_number == order.order_number)
            || self
                .staged
                .sales
                .iter()
                .any(|s| s.order_number == order.order_number)
        {
            return Err(StoreError::Constraint(format!(
                "order number {:?} already exists",
                order.order_number
            )));
        }
        self.staged.purchases.push(order.clone());
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        *self.guard = std::mem::take(&mut self.staged);
        Ok(())
    }
}
