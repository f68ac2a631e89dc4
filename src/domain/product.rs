use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog product as seen by the ordering core.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: BigDecimal,
    pub stock: i32,
}

impl Product {
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            product_id: self.id,
            name: self.name.clone(),
            category: self.category.clone(),
            unit_price: self.price.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: BigDecimal,
    pub stock: i32,
}

/// Name and price copied out of the catalog at the moment a product
/// enters a cart. Later catalog edits do not reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: Uuid,
    pub name: String,
    pub category: String,
    pub unit_price: BigDecimal,
}

/// Stock remaining for a product after a ledger mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevel {
    pub product_id: Uuid,
    pub stock: i32,
}

/// Inventory report row.
#[derive(Debug, Clone, PartialEq)]
pub struct StockStatus {
    pub product_id: Uuid,
    pub name: String,
    pub category: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub low_stock: bool,
    pub in_stock: bool,
}

impl StockStatus {
    pub fn from_product(product: Product, low_stock_threshold: i32) -> Self {
        Self {
            low_stock: product.stock <= low_stock_threshold,
            in_stock: product.stock > 0,
            product_id: product.id,
            name: product.name,
            category: product.category,
            price: product.price,
            stock: product.stock,
        }
    }
}
