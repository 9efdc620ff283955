pub mod products;
pub mod purchases;
pub mod sales;
pub mod system;
