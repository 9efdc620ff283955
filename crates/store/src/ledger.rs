use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{instrument, warn};

use mostrador_core::{DomainError, ProductId, UserId};
use mostrador_orders::{
    LineItem, OrderKind, OrderNumberGenerator, PurchaseDraft, PurchaseOrder, SaleDraft, SaleOrder,
};

use crate::error::StoreError;
use crate::unit_of_work::OrderStore;

/// Outcomes of a recording attempt. Every variant other than success means
/// nothing was written.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The transactional order ledger.
///
/// All sale and purchase recording goes through here. Each call opens one
/// unit of work on the backing store, performs every check and write inside
/// it, and commits only if the whole flow succeeded. A transaction dropped
/// on the error path rolls back implicitly.
#[derive(Clone)]
pub struct OrderLedger {
    store: Arc<dyn OrderStore>,
    numbers: Arc<OrderNumberGenerator>,
}

impl OrderLedger {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            numbers: Arc::new(OrderNumberGenerator::new()),
        }
    }

    /// Record a sale: check stock per line under lock, persist header and
    /// lines, decrement stock. All or nothing.
    #[instrument(skip(self, draft), fields(lines = draft.lines.len()))]
    pub async fn record_sale(
        &self,
        actor: UserId,
        draft: SaleDraft,
    ) -> Result<SaleOrder, LedgerError> {
        // Fail cheap validation before touching the store.
        draft.total()?;

        let mut tx = self.store.begin().await?;
        for line in &draft.lines {
            let product = tx
                .product_for_update(line.product_id)
                .await?
                .ok_or(LedgerError::ProductNotFound(line.product_id))?;
            if product.stock < line.quantity {
                return Err(LedgerError::InsufficientStock {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: product.stock,
                });
            }
            tx.adjust_stock(line.product_id, -line.quantity).await?;
            let remaining = product.stock - line.quantity;
            if remaining <= product.min_stock {
                warn!(
                    product = %product.code,
                    remaining,
                    min_stock = product.min_stock,
                    "stock at or below minimum after sale"
                );
            }
        }

        let number = self.numbers.next(OrderKind::Sale);
        let order = draft.finalize(number, actor, Utc::now())?;
        tx.insert_sale(&order).await?;
        tx.commit().await?;
        Ok(order)
    }

    /// Record a purchase: resolve line prices (catalog fallback), persist
    /// header and lines, increment stock. No sufficiency precondition.
    #[instrument(skip(self, draft), fields(lines = draft.lines.len()))]
    pub async fn record_purchase(
        &self,
        actor: UserId,
        draft: PurchaseDraft,
    ) -> Result<PurchaseOrder, LedgerError> {
        if draft.lines.is_empty() {
            return Err(DomainError::validation("order must have at least one line").into());
        }

        let mut tx = self.store.begin().await?;
        let mut priced: Vec<LineItem> = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let product = tx
                .product_for_update(line.product_id)
                .await?
                .ok_or(LedgerError::ProductNotFound(line.product_id))?;
            priced.push(line.priced(product.purchase_price)?);
            tx.adjust_stock(line.product_id, line.quantity).await?;
        }

        let number = self.numbers.next(OrderKind::Purchase);
        let order = draft.finalize(priced, number, actor, Utc::now())?;
        tx.insert_purchase(&order).await?;
        tx.commit().await?;
        Ok(order)
    }
}
