//! Session-scoped shopping cart.
//!
//! A cart lives in one session and is mutated sequentially, so it carries no
//! locking. Its stock checks are advisory; checkout re-validates inside the
//! order transaction.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;
use super::order::OrderLineInput;
use super::product::{Product, ProductSnapshot};

/// Read access to live catalog rows, used for snapshots and stock checks.
pub trait ProductLookup {
    fn lookup(&self, product_id: Uuid) -> Result<Option<Product>, DomainError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: ProductSnapshot,
    pub quantity: i32,
}

impl CartLine {
    pub fn line_subtotal(&self) -> BigDecimal {
        &self.product.unit_price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLineView {
    pub product: ProductSnapshot,
    pub quantity: i32,
    pub line_subtotal: BigDecimal,
}

/// A cart line that live stock can no longer satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockConflict {
    pub product_id: Uuid,
    pub name: String,
    pub requested: i32,
    pub available: i32,
}

/// Serializable so a session store can persist it between requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    id: String,
    user_id: Option<Uuid>,
    lines: Vec<CartLine>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Cart {
    pub fn new(user_id: Option<Uuid>) -> Self {
        Self {
            id: format!("cart_{}", Uuid::new_v4().simple()),
            user_id,
            lines: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    pub fn set_user_id(&mut self, user_id: Option<Uuid>) {
        self.user_id = user_id;
    }

    fn position(&self, product_id: Uuid) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product.product_id == product_id)
    }

    /// Adds `quantity` units, merging into an existing line for the same
    /// product. On error the cart is left unchanged.
    pub fn add_line<C>(
        &mut self,
        catalog: &C,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<(), DomainError>
    where
        C: ProductLookup + ?Sized,
    {
        if quantity <= 0 {
            return Err(DomainError::InvalidInput(format!(
                "quantity must be positive, got {quantity}"
            )));
        }
        let product = catalog
            .lookup(product_id)?
            .ok_or(DomainError::ProductNotFound(product_id))?;

        let index = self.position(product_id);
        let in_cart = index.map_or(0, |i| self.lines[i].quantity);
        let requested = in_cart
            .checked_add(quantity)
            .ok_or_else(|| DomainError::InvalidInput("quantity overflow".to_string()))?;
        if requested > product.stock {
            return Err(DomainError::InsufficientStock {
                product_id,
                requested,
                available: product.stock,
            });
        }

        match index {
            Some(i) => self.lines[i].quantity = requested,
            None => self.lines.push(CartLine {
                product: product.snapshot(),
                quantity,
            }),
        }
        Ok(())
    }

    /// Returns false when the product is not in the cart.
    pub fn remove_line(&mut self, product_id: Uuid) -> bool {
        match self.position(product_id) {
            Some(i) => {
                self.lines.remove(i);
                true
            }
            None => false,
        }
    }

    /// Replaces a line's quantity; zero or less removes the line. Returns
    /// false when the product is not in the cart.
    pub fn update_quantity<C>(
        &mut self,
        catalog: &C,
        product_id: Uuid,
        new_quantity: i32,
    ) -> Result<bool, DomainError>
    where
        C: ProductLookup + ?Sized,
    {
        if new_quantity <= 0 {
            return Ok(self.remove_line(product_id));
        }
        let Some(index) = self.position(product_id) else {
            return Ok(false);
        };
        let product = catalog
            .lookup(product_id)?
            .ok_or(DomainError::ProductNotFound(product_id))?;
        if new_quantity > product.stock {
            return Err(DomainError::InsufficientStock {
                product_id,
                requested: new_quantity,
                available: product.stock,
            });
        }
        self.lines[index].quantity = new_quantity;
        Ok(true)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn contents(&self) -> Vec<CartLineView> {
        self.lines
            .iter()
            .map(|line| CartLineView {
                product: line.product.clone(),
                quantity: line.quantity,
                line_subtotal: line.line_subtotal(),
            })
            .collect()
    }

    /// Always derived from the current lines.
    pub fn subtotal(&self) -> BigDecimal {
        self.lines.iter().map(CartLine::line_subtotal).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| i64::from(line.quantity)).sum()
    }

    pub fn unique_product_count(&self) -> usize {
        self.lines.len()
    }

    /// Re-checks every line against live stock.
    pub fn validate<C>(&self, catalog: &C) -> Result<Vec<StockConflict>, DomainError>
    where
        C: ProductLookup + ?Sized,
    {
        let mut conflicts = Vec::new();
        for line in &self.lines {
            let available = catalog
                .lookup(line.product.product_id)?
                .map_or(0, |product| product.stock);
            if line.quantity > available {
                conflicts.push(StockConflict {
                    product_id: line.product.product_id,
                    name: line.product.name.clone(),
                    requested: line.quantity,
                    available,
                });
            }
        }
        Ok(conflicts)
    }

    /// Folds `other` (typically a guest cart) into this cart line by line.
    /// Lines that are gone from the catalog or would oversell are skipped and
    /// their product ids returned.
    pub fn merge_from<C>(&mut self, catalog: &C, other: &Cart) -> Result<Vec<Uuid>, DomainError>
    where
        C: ProductLookup + ?Sized,
    {
        let mut skipped = Vec::new();
        for line in &other.lines {
            let product_id = line.product.product_id;
            match self.add_line(catalog, product_id, line.quantity) {
                Ok(()) => {}
                Err(DomainError::ProductNotFound(_) | DomainError::InsufficientStock { .. }) => {
                    skipped.push(product_id)
                }
                Err(e) => return Err(e),
            }
        }
        Ok(skipped)
    }

    /// Order lines carrying the snapshot prices captured when the products
    /// were added.
    pub fn order_lines(&self) -> Vec<OrderLineInput> {
        self.lines
            .iter()
            .map(|line| OrderLineInput {
                product_id: line.product.product_id,
                product_name: line.product.name.clone(),
                quantity: line.quantity,
                unit_price: line.product.unit_price.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::str::FromStr;

    use super::*;

    #[derive(Default)]
    struct Shelf(HashMap<Uuid, Product>);

    impl Shelf {
        fn stock(&mut self, name: &str, price: &str, stock: i32) -> Uuid {
            let id = Uuid::new_v4();
            self.0.insert(
                id,
                Product {
                    id,
                    name: name.to_string(),
                    category: "Accessories".to_string(),
                    price: BigDecimal::from_str(price).unwrap(),
                    stock,
                },
            );
            id
        }

        fn set_stock(&mut self, id: Uuid, stock: i32) {
            self.0.get_mut(&id).unwrap().stock = stock;
        }
    }

    impl ProductLookup for Shelf {
        fn lookup(&self, product_id: Uuid) -> Result<Option<Product>, DomainError> {
            Ok(self.0.get(&product_id).cloned())
        }
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn assert_subtotal_invariant(cart: &Cart) {
        let expected: BigDecimal = cart
            .lines()
            .iter()
            .map(|l| &l.product.unit_price * BigDecimal::from(l.quantity))
            .sum();
        assert_eq!(cart.subtotal(), expected);
    }

    #[test]
    fn adding_beyond_stock_leaves_cart_unchanged() {
        let mut shelf = Shelf::default();
        let p1 = shelf.stock("P1", "10.00", 3);
        let mut cart = Cart::new(None);

        cart.add_line(&shelf, p1, 2).unwrap();
        assert_eq!(cart.subtotal(), dec("20.00"));

        let err = cart.add_line(&shelf, p1, 2).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientStock {
                requested: 4,
                available: 3,
                ..
            }
        ));
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.subtotal(), dec("20.00"));
    }

    #[test]
    fn adding_same_product_merges_lines() {
        let mut shelf = Shelf::default();
        let p1 = shelf.stock("P1", "2.50", 10);
        let p2 = shelf.stock("P2", "1.00", 10);
        let mut cart = Cart::new(None);

        cart.add_line(&shelf, p1, 1).unwrap();
        cart.add_line(&shelf, p2, 4).unwrap();
        cart.add_line(&shelf, p1, 2).unwrap();

        assert_eq!(cart.unique_product_count(), 2);
        assert_eq!(cart.item_count(), 7);
        assert_eq!(cart.contents()[0].quantity, 3);
        assert_eq!(cart.contents()[0].line_subtotal, dec("7.50"));
        assert_subtotal_invariant(&cart);
    }

    #[test]
    fn unknown_product_is_rejected() {
        let shelf = Shelf::default();
        let mut cart = Cart::new(None);
        let missing = Uuid::new_v4();
        assert!(matches!(
            cart.add_line(&shelf, missing, 1),
            Err(DomainError::ProductNotFound(id)) if id == missing
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn non_positive_add_is_invalid() {
        let mut shelf = Shelf::default();
        let p1 = shelf.stock("P1", "1.00", 5);
        let mut cart = Cart::new(None);
        assert!(matches!(
            cart.add_line(&shelf, p1, 0),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn remove_missing_line_returns_false() {
        let mut cart = Cart::new(None);
        assert!(!cart.remove_line(Uuid::new_v4()));
    }

    #[test]
    fn update_quantity_to_zero_removes_line() {
        let mut shelf = Shelf::default();
        let p1 = shelf.stock("P1", "3.00", 5);
        let mut cart = Cart::new(None);
        cart.add_line(&shelf, p1, 2).unwrap();

        assert!(cart.update_quantity(&shelf, p1, 0).unwrap());
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), BigDecimal::from(0));
    }

    #[test]
    fn update_quantity_checks_live_stock() {
        let mut shelf = Shelf::default();
        let p1 = shelf.stock("P1", "3.00", 5);
        let mut cart = Cart::new(None);
        cart.add_line(&shelf, p1, 2).unwrap();

        shelf.set_stock(p1, 3);
        assert!(matches!(
            cart.update_quantity(&shelf, p1, 4),
            Err(DomainError::InsufficientStock { available: 3, .. })
        ));
        assert!(cart.update_quantity(&shelf, p1, 3).unwrap());
        assert_eq!(cart.subtotal(), dec("9.00"));
    }

    #[test]
    fn update_quantity_for_absent_product_is_false() {
        let mut shelf = Shelf::default();
        let p1 = shelf.stock("P1", "3.00", 5);
        let mut cart = Cart::new(None);
        assert!(!cart.update_quantity(&shelf, p1, 1).unwrap());
    }

    #[test]
    fn clear_resets_subtotal() {
        let mut shelf = Shelf::default();
        let p1 = shelf.stock("P1", "3.00", 5);
        let mut cart = Cart::new(Some(Uuid::new_v4()));
        cart.add_line(&shelf, p1, 2).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.subtotal(), BigDecimal::from(0));
    }

    #[test]
    fn snapshot_price_survives_catalog_edit() {
        let mut shelf = Shelf::default();
        let p1 = shelf.stock("P1", "3.00", 5);
        let mut cart = Cart::new(None);
        cart.add_line(&shelf, p1, 1).unwrap();

        shelf.0.get_mut(&p1).unwrap().price = dec("99.00");
        assert_eq!(cart.subtotal(), dec("3.00"));
        assert_eq!(cart.order_lines()[0].unit_price, dec("3.00"));
    }

    #[test]
    fn validate_reports_lines_that_outgrew_stock() {
        let mut shelf = Shelf::default();
        let p1 = shelf.stock("P1", "1.00", 5);
        let p2 = shelf.stock("P2", "1.00", 5);
        let mut cart = Cart::new(None);
        cart.add_line(&shelf, p1, 4).unwrap();
        cart.add_line(&shelf, p2, 1).unwrap();

        shelf.set_stock(p1, 1);
        let conflicts = cart.validate(&shelf).unwrap();
        assert_eq!(
            conflicts,
            vec![StockConflict {
                product_id: p1,
                name: "P1".to_string(),
                requested: 4,
                available: 1,
            }]
        );
    }

    #[test]
    fn merge_skips_lines_that_would_oversell() {
        let mut shelf = Shelf::default();
        let p1 = shelf.stock("P1", "1.00", 3);
        let p2 = shelf.stock("P2", "2.00", 3);
        let mut guest = Cart::new(None);
        guest.add_line(&shelf, p1, 2).unwrap();
        guest.add_line(&shelf, p2, 1).unwrap();

        let mut account = Cart::new(Some(Uuid::new_v4()));
        account.add_line(&shelf, p1, 2).unwrap();

        let skipped = account.merge_from(&shelf, &guest).unwrap();
        assert_eq!(skipped, vec![p1]);
        assert_eq!(account.lines()[0].quantity, 2);
        assert_eq!(account.lines()[1].quantity, 1);
        assert_subtotal_invariant(&account);
    }

    #[test]
    fn cart_rehydrates_from_session_json() {
        let mut shelf = Shelf::default();
        let p1 = shelf.stock("P1", "4.20", 5);
        let mut cart = Cart::new(None);
        cart.add_line(&shelf, p1, 2).unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
        assert_eq!(restored.subtotal(), dec("8.40"));
    }
}
