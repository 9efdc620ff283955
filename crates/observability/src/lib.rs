//! Process-wide observability init.

mod tracing;

pub use tracing::init;
