use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mostrador_core::{ClientId, DomainError, DomainResult, OrderId, UserId};

use crate::line::{LineItem, subtotal};

/// How the customer paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Transfer,
    Card,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Card => "card",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "transfer" => Ok(PaymentMethod::Transfer),
            "card" => Ok(PaymentMethod::Card),
            other => Err(DomainError::validation(format!(
                "unknown payment method {other:?}"
            ))),
        }
    }
}

/// A sale as submitted by the caller, before the ledger has checked stock
/// or assigned an order number.
#[derive(Debug, Clone)]
pub struct SaleDraft {
    pub client: Option<ClientId>,
    pub lines: Vec<LineItem>,
    /// Whole-order discount in cents, applied after the subtotal.
    pub discount: u64,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

impl SaleDraft {
    /// Subtotal across all lines, before discount.
    pub fn subtotal(&self) -> DomainResult<u64> {
        subtotal(&self.lines)
    }

    /// Amount owed after discount.
    ///
    /// A discount larger than the subtotal is rejected rather than clamped:
    /// it is almost certainly a data-entry mistake, and silently recording a
    /// zero-total sale would hide it.
    pub fn total(&self) -> DomainResult<u64> {
        let subtotal = self.subtotal()?;
        subtotal.checked_sub(self.discount).ok_or_else(|| {
            DomainError::validation(format!(
                "discount {} exceeds subtotal {subtotal}",
                self.discount
            ))
        })
    }

    /// Validate the draft and produce the order record the ledger will persist.
    pub fn finalize(
        self,
        order_number: String,
        recorded_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<SaleOrder> {
        let subtotal = self.subtotal()?;
        let total = self.total()?;
        Ok(SaleOrder {
            id: OrderId::new(),
            order_number,
            client: self.client,
            recorded_by,
            lines: self.lines,
            subtotal,
            discount: self.discount,
            total,
            payment_method: self.payment_method,
            notes: self.notes,
            created_at,
        })
    }
}

/// A recorded sale. Totals are denormalized at write time and never
/// recomputed from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleOrder {
    pub id: OrderId,
    pub order_number: String,
    pub client: Option<ClientId>,
    pub recorded_by: UserId,
    pub lines: Vec<LineItem>,
    pub subtotal: u64,
    pub discount: u64,
    pub total: u64,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mostrador_core::ProductId;
    use proptest::prelude::*;

    fn draft(lines: Vec<LineItem>, discount: u64) -> SaleDraft {
        SaleDraft {
            client: None,
            lines,
            discount,
            payment_method: PaymentMethod::Cash,
            notes: None,
        }
    }

    #[test]
    fn totals_follow_the_receipt_math() {
        let lines = vec![
            LineItem::new(ProductId::new(), 3, 200).unwrap(),
            LineItem::new(ProductId::new(), 1, 150).unwrap(),
        ];
        let d = draft(lines, 50);
        assert_eq!(d.subtotal().unwrap(), 750);
        assert_eq!(d.total().unwrap(), 700);
    }

    #[test]
    fn rejects_discount_larger_than_subtotal() {
        let lines = vec![LineItem::new(ProductId::new(), 1, 100).unwrap()];
        assert!(draft(lines, 101).total().is_err());
    }

    #[test]
    fn rejects_empty_sale() {
        assert!(draft(vec![], 0).subtotal().is_err());
    }

    #[test]
    fn finalize_carries_everything_through() {
        let lines = vec![LineItem::new(ProductId::new(), 2, 300).unwrap()];
        let user = UserId::new();
        let now = Utc::now();
        let order = draft(lines.clone(), 100)
            .finalize("SALE-1".into(), user, now)
            .unwrap();
        assert_eq!(order.order_number, "SALE-1");
        assert_eq!(order.recorded_by, user);
        assert_eq!(order.lines, lines);
        assert_eq!(order.subtotal, 600);
        assert_eq!(order.total, 500);
        assert_eq!(order.created_at, now);
    }

    proptest! {
        #[test]
        fn total_never_exceeds_subtotal(
            quantities in proptest::collection::vec(1i64..1_000, 1..8),
            unit_price in 0u64..100_000,
            discount in 0u64..1_000_000,
        ) {
            let lines: Vec<_> = quantities
                .into_iter()
                .map(|q| LineItem::new(ProductId::new(), q, unit_price).unwrap())
                .collect();
            let d = draft(lines, discount);
            let subtotal = d.subtotal().unwrap();
            match d.total() {
                Ok(total) => {
                    prop_assert!(total <= subtotal);
                    prop_assert_eq!(total, subtotal - discount);
                }
                Err(_) => prop_assert!(discount > subtotal),
            }
        }
    }
}
