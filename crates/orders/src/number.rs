use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Which side of the ledger an order number belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Sale,
    Purchase,
}

impl OrderKind {
    pub fn prefix(self) -> &'static str {
        match self {
            OrderKind::Sale => "SALE-",
            OrderKind::Purchase => "PURCHASE-",
        }
    }
}

/// Generates human-readable order numbers: `{PREFIX}{unix_millis}-{n}`.
///
/// The millisecond timestamp alone can collide when two orders land in the
/// same tick, so a process-wide counter disambiguates. The database carries
/// a UNIQUE constraint on the column as the cross-process backstop.
#[derive(Debug, Default)]
pub struct OrderNumberGenerator {
    counter: AtomicU64,
}

impl OrderNumberGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, kind: OrderKind) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}-{}", kind.prefix(), Utc::now().timestamp_millis(), n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn numbers_carry_the_kind_prefix() {
        let generator = OrderNumberGenerator::new();
        assert!(generator.next(OrderKind::Sale).starts_with("SALE-"));
        assert!(generator.next(OrderKind::Purchase).starts_with("PURCHASE-"));
    }

    #[test]
    fn numbers_are_unique_within_a_process_even_in_the_same_millisecond() {
        let generator = OrderNumberGenerator::new();
        let numbers: HashSet<_> = (0..1_000).map(|_| generator.next(OrderKind::Sale)).collect();
        assert_eq!(numbers.len(), 1_000);
    }
}
