use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, Product};

/// Admin-side product maintenance. Stock movements belong to `StockLedger`.
#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub fn add_product(&self, product: NewProduct) -> Result<Product, DomainError> {
        if product.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("product name is required".to_string()));
        }
        if product.price < BigDecimal::from(0) {
            return Err(DomainError::InvalidInput(format!(
                "price must not be negative, got {}",
                product.price
            )));
        }
        if product.stock < 0 {
            return Err(DomainError::InvalidInput(format!(
                "initial stock must not be negative, got {}",
                product.stock
            )));
        }
        let created = self.products.create(product)?;
        log::info!("product {} '{}' added", created.id, created.name);
        Ok(created)
    }

    /// Changes the list price. Carts and orders keep the price they captured.
    pub fn reprice(&self, product_id: Uuid, price: BigDecimal) -> Result<Product, DomainError> {
        if price < BigDecimal::from(0) {
            return Err(DomainError::InvalidInput(format!(
                "price must not be negative, got {price}"
            )));
        }
        self.products.update_price(product_id, price)?;
        self.products
            .find_by_id(product_id)?
            .ok_or(DomainError::ProductNotFound(product_id))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::application::test_support::Fixture;

    fn keyboard(price: &str, stock: i32) -> NewProduct {
        NewProduct {
            name: "Mechanical Keyboard".to_string(),
            category: "Peripherals".to_string(),
            price: BigDecimal::from_str(price).unwrap(),
            stock,
        }
    }

    #[test]
    fn rejects_negative_price_and_stock() {
        let fx = Fixture::approving();
        assert!(matches!(
            fx.services.catalog.add_product(keyboard("-1.00", 3)),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            fx.services.catalog.add_product(keyboard("1.00", -3)),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn reprice_updates_the_list_price() {
        let fx = Fixture::approving();
        let product = fx.services.catalog.add_product(keyboard("89.00", 3)).unwrap();

        let updated = fx
            .services
            .catalog
            .reprice(product.id, BigDecimal::from_str("79.00").unwrap())
            .unwrap();
        assert_eq!(updated.price, BigDecimal::from_str("79.00").unwrap());
    }

    #[test]
    fn reprice_of_unknown_product_fails() {
        let fx = Fixture::approving();
        assert!(matches!(
            fx.services
                .catalog
                .reprice(Uuid::new_v4(), BigDecimal::from(1)),
            Err(DomainError::ProductNotFound(_))
        ));
    }
}
