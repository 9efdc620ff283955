use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mostrador_core::{CategoryId, DomainError, DomainResult, ProductId};

/// A catalog entry. Prices are integer minor units (cents); `stock` is signed
/// so that arithmetic mistakes show up as negative balances in queries rather
/// than wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Merchant-facing short code (SKU/barcode), unique across the catalog.
    pub code: String,
    pub name: String,
    pub category: Option<CategoryId>,
    /// What the shop pays per unit, in cents.
    pub purchase_price: u64,
    /// What the shop charges per unit, in cents.
    pub sale_price: u64,
    pub stock: i64,
    /// Reorder threshold; at or below this the product counts as low-stock.
    pub min_stock: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

/// Validated input for adding a product to the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub category: Option<CategoryId>,
    pub purchase_price: u64,
    pub sale_price: u64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub min_stock: i64,
}

impl NewProduct {
    pub fn into_product(self, now: DateTime<Utc>) -> DomainResult<Product> {
        if self.code.trim().is_empty() {
            return Err(DomainError::validation("product code must not be blank"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name must not be blank"));
        }
        if self.stock < 0 {
            return Err(DomainError::validation(format!(
                "initial stock must not be negative, got {}",
                self.stock
            )));
        }
        if self.min_stock < 0 {
            return Err(DomainError::validation(format!(
                "min_stock must not be negative, got {}",
                self.min_stock
            )));
        }
        Ok(Product {
            id: ProductId::new(),
            code: self.code,
            name: self.name,
            category: self.category,
            purchase_price: self.purchase_price,
            sale_price: self.sale_price,
            stock: self.stock,
            min_stock: self.min_stock,
            active: true,
            created_at: now,
        })
    }
}
