use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mostrador_core::{DomainError, DomainResult, OrderId, ProductId, SupplierId, UserId};

use crate::line::{LineItem, subtotal};

/// A purchase line as submitted. Unit price is optional: when omitted, the
/// ledger fills it in from the product's catalog purchase price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Option<u64>,
}

impl PurchaseLine {
    pub fn new(product_id: ProductId, quantity: i64, unit_price: Option<u64>) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation(format!(
                "line quantity must be positive, got {quantity}"
            )));
        }
        Ok(Self {
            product_id,
            quantity,
            unit_price,
        })
    }

    /// Resolve into a priced line, defaulting to the catalog price.
    pub fn priced(&self, catalog_purchase_price: u64) -> DomainResult<LineItem> {
        LineItem::new(
            self.product_id,
            self.quantity,
            self.unit_price.unwrap_or(catalog_purchase_price),
        )
    }
}

/// A restock order as submitted by the caller.
#[derive(Debug, Clone)]
pub struct PurchaseDraft {
    pub supplier: SupplierId,
    pub lines: Vec<PurchaseLine>,
    pub notes: Option<String>,
}

impl PurchaseDraft {
    /// Validate the draft against fully-priced lines and produce the record
    /// the ledger will persist. The ledger resolves prices before calling
    /// this, so `lines` here carry the final unit prices.
    pub fn finalize(
        self,
        lines: Vec<LineItem>,
        order_number: String,
        recorded_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<PurchaseOrder> {
        let total = subtotal(&lines)?;
        Ok(PurchaseOrder {
            id: OrderId::new(),
            order_number,
            supplier: self.supplier,
            recorded_by,
            lines,
            total,
            notes: self.notes,
            created_at,
        })
    }
}

/// A recorded purchase (stock intake).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: OrderId,
    pub order_number: String,
    pub supplier: SupplierId,
    pub recorded_by: UserId,
    pub lines: Vec<LineItem>,
    pub total: u64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_price_wins_over_catalog_price() {
        let line = PurchaseLine::new(ProductId::new(), 4, Some(120)).unwrap();
        assert_eq!(line.priced(999).unwrap().unit_price, 120);
    }

    #[test]
    fn missing_price_falls_back_to_catalog() {
        let line = PurchaseLine::new(ProductId::new(), 4, None).unwrap();
        assert_eq!(line.priced(80).unwrap().unit_price, 80);
    }

    #[test]
    fn rejects_nonpositive_quantity() {
        assert!(PurchaseLine::new(ProductId::new(), 0, None).is_err());
    }

    #[test]
    fn finalize_totals_the_priced_lines() {
        let draft = PurchaseDraft {
            supplier: SupplierId::new(),
            lines: vec![],
            notes: Some("restock".into()),
        };
        let lines = vec![
            LineItem::new(ProductId::new(), 10, 80).unwrap(),
            LineItem::new(ProductId::new(), 5, 40).unwrap(),
        ];
        let order = draft
            .finalize(lines, "PURCHASE-1".into(), UserId::new(), Utc::now())
            .unwrap();
        assert_eq!(order.total, 1000);
        assert_eq!(order.notes.as_deref(), Some("restock"));
    }

    #[test]
    fn finalize_rejects_empty_line_set() {
        let draft = PurchaseDraft {
            supplier: SupplierId::new(),
            lines: vec![],
            notes: None,
        };
        assert!(
            draft
                .finalize(vec![], "PURCHASE-2".into(), UserId::new(), Utc::now())
                .is_err()
        );
    }
}
