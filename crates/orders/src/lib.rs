//! `mostrador-orders` — order domain model.
//!
//! Sales and purchases share the same shape: a header (who, when, totals,
//! a human-readable order number) plus one or more lines referencing a
//! product. All monetary amounts are integer minor units (cents); arithmetic
//! is exact and overflow-checked at the validation boundary.
//!
//! This crate is pure domain logic. Stock checks and persistence happen in
//! the ledger (`mostrador-store`), which consumes the validated drafts
//! produced here.

pub mod line;
pub mod number;
pub mod purchase;
pub mod sale;

pub use line::LineItem;
pub use number::{OrderKind, OrderNumberGenerator};
pub use purchase::{PurchaseDraft, PurchaseLine, PurchaseOrder};
pub use sale::{PaymentMethod, SaleDraft, SaleOrder};
