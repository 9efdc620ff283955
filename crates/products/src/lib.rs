//! `mostrador-products` — product catalog model.

pub mod product;

pub use product::{NewProduct, Product};
