//! `mostrador-store` — storage layer and the transactional order ledger.
//!
//! The ledger is the only writer of orders and stock. It runs every
//! recording flow inside a single unit of work obtained from an
//! [`OrderStore`]; two backends exist, an in-memory one for development and
//! tests and a Postgres one for production.

pub mod error;
pub mod ledger;
pub mod memory;
pub mod postgres;
pub mod unit_of_work;

pub use error::StoreError;
pub use ledger::{LedgerError, OrderLedger};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use unit_of_work::{OrderStore, OrderTx};
