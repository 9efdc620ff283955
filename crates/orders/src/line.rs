use serde::{Deserialize, Serialize};

use mostrador_core::{DomainError, DomainResult, ProductId};

/// A single order line: a product, how many units, and the unit price the
/// line was recorded at (cents).
///
/// The unit price is captured on the line rather than looked up at read time
/// so that later catalog price changes never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: u64,
}

impl LineItem {
    pub fn new(product_id: ProductId, quantity: i64, unit_price: u64) -> DomainResult<Self> {
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

    /// Extended line total in cents.
    pub fn line_total(&self) -> DomainResult<u64> {
        // quantity is validated positive at construction
        (self.quantity as u64)
            .checked_mul(self.unit_price)
            .ok_or_else(|| DomainError::validation("line total overflows"))
    }
}

/// Sum line totals, rejecting empty orders and arithmetic overflow.
pub(crate) fn subtotal(lines: &[LineItem]) -> DomainResult<u64> {
    if lines.is_empty() {
        return Err(DomainError::validation("order must have at least one line"));
    }
    let mut total: u64 = 0;
    for line in lines {
        total = total
            .checked_add(line.line_total()?)
            .ok_or_else(|| DomainError::validation("order subtotal overflows"))?;
    }
    Ok(total)
}
