use std::sync::Arc;

use uuid::Uuid;

use crate::domain::cart::ProductLookup;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{Product, StockLevel, StockStatus};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

/// Guarded access to the product stock column. Every stock write in the
/// crate goes through here or through the order transaction.
#[derive(Clone)]
pub struct StockLedger {
    products: Arc<dyn ProductRepository>,
    low_stock_threshold: i32,
}

impl StockLedger {
    pub fn new(products: Arc<dyn ProductRepository>, low_stock_threshold: i32) -> Self {
        Self {
            products,
            low_stock_threshold,
        }
    }

    pub fn low_stock_threshold(&self) -> i32 {
        self.low_stock_threshold
    }

    pub fn product(&self, product_id: Uuid) -> Result<Option<Product>, DomainError> {
        self.products.find_by_id(product_id)
    }

    /// False for unknown products.
    pub fn check_available(&self, product_id: Uuid, quantity: i32) -> Result<bool, DomainError> {
        Ok(self
            .products
            .find_by_id(product_id)?
            .is_some_and(|p| p.stock >= quantity))
    }

    pub fn decrement(&self, product_id: Uuid, delta: i32) -> Result<StockLevel, DomainError> {
        positive(delta)?;
        let level = self.products.decrement_stock(product_id, delta)?;
        self.signal_low_stock(&[level]);
        Ok(level)
    }

    pub fn increment(&self, product_id: Uuid, delta: i32) -> Result<StockLevel, DomainError> {
        positive(delta)?;
        let level = self.products.increment_stock(product_id, delta)?;
        log::info!(
            "restocked product {} by {} (now {})",
            product_id,
            delta,
            level.stock
        );
        Ok(level)
    }

    /// Emits a warning for each level at or below the threshold and returns
    /// the levels it warned about. Never fails.
    pub fn signal_low_stock(&self, levels: &[StockLevel]) -> Vec<StockLevel> {
        let low: Vec<StockLevel> = levels
            .iter()
            .filter(|l| l.stock <= self.low_stock_threshold)
            .copied()
            .collect();
        for level in &low {
            log::warn!(
                target: "low_stock",
                "LOW STOCK ALERT: product {} has {} items remaining",
                level.product_id,
                level.stock
            );
        }
        low
    }

    /// Stock report for the given products, or for the whole catalog when
    /// `product_ids` is `None`. Unknown ids are skipped.
    pub fn get_status(&self, product_ids: Option<&[Uuid]>) -> Result<Vec<StockStatus>, DomainError> {
        let products = match product_ids {
            Some(ids) => self.products.find_many(ids)?,
            None => self.products.list()?,
        };
        Ok(products
            .into_iter()
            .map(|p| StockStatus::from_product(p, self.low_stock_threshold))
            .collect())
    }

    pub fn low_stock_products(&self) -> Result<Vec<StockStatus>, DomainError> {
        Ok(self
            .products
            .list_at_or_below(self.low_stock_threshold)?
            .into_iter()
            .map(|p| StockStatus::from_product(p, self.low_stock_threshold))
            .collect())
    }
}

impl ProductLookup for StockLedger {
    fn lookup(&self, product_id: Uuid) -> Result<Option<Product>, DomainError> {
        self.product(product_id)
    }
}

fn positive(delta: i32) -> Result<(), DomainError> {
    if delta <= 0 {
        return Err(DomainError::InvalidInput(format!(
            "stock delta must be positive, got {delta}"
        )));
    }
    Ok(())
}
