use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::invoice::{Invoice, InvoiceDocument, NewInvoice};
use crate::domain::ports::InvoiceRepository;

use super::order_service::OrderService;

#[derive(Clone)]
pub struct InvoiceService {
    invoices: Arc<dyn InvoiceRepository>,
    orders: OrderService,
}

impl InvoiceService {
    pub fn new(invoices: Arc<dyn InvoiceRepository>, orders: OrderService) -> Self {
        Self { invoices, orders }
    }

    /// Freezes the order's lines into an invoice. Calling it again for the
    /// same order returns the first invoice's id.
    pub fn generate(&self, order_id: Uuid) -> Result<Uuid, DomainError> {
        if let Some(existing) = self.invoices.find_by_order(order_id)? {
            return Ok(existing.id);
        }
        let order = self.orders.get_details(order_id)?;
        let invoice = self.invoices.insert_or_get(NewInvoice::from_order(&order))?;
        log::info!("invoice {} generated for order {}", invoice.id, order_id);
        Ok(invoice.id)
    }

    /// Builds the printable document. Line data comes only from the stored
    /// snapshot; the order contributes status, customer and shipping.
    pub fn render(&self, invoice_id: Uuid) -> Result<InvoiceDocument, DomainError> {
        let invoice = self
            .invoices
            .find_by_id(invoice_id)?
            .ok_or(DomainError::InvoiceNotFound(invoice_id))?;
        let order = self.orders.get_details(invoice.order_id)?;
        Ok(InvoiceDocument::new(invoice, &order))
    }

    pub fn find_by_order(&self, order_id: Uuid) -> Result<Option<Invoice>, DomainError> {
        self.invoices.find_by_order(order_id)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::application::test_support::Fixture;
    use crate::domain::order::OrderStatus;
    use crate::domain::ports::ProductRepository;

    #[test]
    fn generate_is_idempotent() {
        let fx = Fixture::approving();
        let order_id = fx.placed_order("7.25", 10, 2);

        let first = fx.services.invoices.generate(order_id).unwrap();
        let second = fx.services.invoices.generate(order_id).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            fx.services
                .invoices
                .find_by_order(order_id)
                .unwrap()
                .map(|i| i.id),
            Some(first)
        );
    }

    #[test]
    fn generate_for_unknown_order_fails() {
        let fx = Fixture::approving();
        assert!(matches!(
            fx.services.invoices.generate(Uuid::new_v4()),
            Err(DomainError::OrderNotFound(_))
        ));
    }

    #[test]
    fn render_uses_the_frozen_snapshot() {
        let fx = Fixture::approving();
        let order_id = fx.placed_order("7.25", 10, 2);
        let invoice_id = fx.services.invoices.generate(order_id).unwrap();
        let product_id = fx.services.orders.get_details(order_id).unwrap().lines[0].product_id;

        ProductRepository::update_price(&fx.store, product_id, BigDecimal::from_str("1.00").unwrap())
            .unwrap();
        fx.services
            .orders
            .update_status(order_id, OrderStatus::Processing)
            .unwrap();

        let doc = fx.services.invoices.render(invoice_id).unwrap();
        assert_eq!(doc.order_status, OrderStatus::Processing);
        assert_eq!(doc.lines[0].unit_price, BigDecimal::from_str("7.25").unwrap());
        assert_eq!(doc.total, BigDecimal::from_str("14.50").unwrap());
        assert!(doc.to_string().contains("$14.50"));
    }

    #[test]
    fn render_of_unknown_invoice_fails() {
        let fx = Fixture::approving();
        assert!(matches!(
            fx.services.invoices.render(Uuid::new_v4()),
            Err(DomainError::InvoiceNotFound(_))
        ));
    }
}
