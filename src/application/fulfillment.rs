use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::errors::DomainError;
use crate::domain::order::ShippingInfo;
use crate::domain::payment::{PaymentMethod, PaymentOutcome};
use crate::domain::product::StockLevel;

use super::invoice_service::InvoiceService;
use super::order_service::OrderService;
use super::payment_service::PaymentService;
use super::stock_ledger::StockLedger;

/// Result of `FulfillmentOrchestrator::checkout`.
#[derive(Debug, Clone)]
pub struct CheckedOut {
    pub order_id: Uuid,
    /// Post-decrement levels that crossed the low-stock threshold.
    pub low_stock: Vec<StockLevel>,
}

/// Result of `FulfillmentOrchestrator::settle_payment`. `invoice_id` is
/// `None` when the payment was declined or the invoice could not be issued.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub payment: PaymentOutcome,
    pub invoice_id: Option<Uuid>,
}

/// Drives a cart through order placement, payment and invoicing.
#[derive(Clone)]
pub struct FulfillmentOrchestrator {
    stock: StockLedger,
    orders: OrderService,
    payments: PaymentService,
    invoices: InvoiceService,
}

impl FulfillmentOrchestrator {
    pub fn new(
        stock: StockLedger,
        orders: OrderService,
        payments: PaymentService,
        invoices: InvoiceService,
    ) -> Self {
        Self {
            stock,
            orders,
            payments,
            invoices,
        }
    }

    /// Turns the cart into a Pending order at the prices snapshotted in the
    /// cart. The cart is cleared only once the order has committed; on any
    /// error it is left untouched.
    pub fn checkout(
        &self,
        cart: &mut Cart,
        user_id: Uuid,
        shipping_info: ShippingInfo,
    ) -> Result<CheckedOut, DomainError> {
        if cart.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        let created = self
            .orders
            .create(user_id, cart.order_lines(), shipping_info)?;
        let low_stock = self.stock.signal_low_stock(&created.stock_levels);

        log::info!(
            "cart {} checked out as order {} ({} item(s))",
            cart.id(),
            created.id,
            cart.item_count()
        );
        cart.clear();
        Ok(CheckedOut {
            order_id: created.id,
            low_stock,
        })
    }

    /// Pays for the order and, when the gateway approves, issues its invoice.
    /// An invoice failure does not undo the payment; it is logged and the
    /// invoice can be generated again later.
    pub fn settle_payment(
        &self,
        order_id: Uuid,
        amount: &BigDecimal,
        method: PaymentMethod,
    ) -> Result<Settlement, DomainError> {
        let payment = self.payments.simulate(order_id, amount, method)?;
        let invoice_id = if payment.success {
            match self.invoices.generate(order_id) {
                Ok(id) => Some(id),
                Err(e) => {
                    log::error!(
                        "order {} paid by {} but invoicing failed: {}",
                        order_id,
                        payment.payment_id,
                        e
                    );
                    None
                }
            }
        } else {
            None
        };
        Ok(Settlement {
            payment,
            invoice_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::{Arc, Barrier};
    use std::thread;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::application::stock_ledger::DEFAULT_LOW_STOCK_THRESHOLD;
    use crate::application::test_support::{line_for, seed_product, shipping, Fixture};
    use crate::application::{Repositories, Services};
    use crate::domain::invoice::{Invoice, NewInvoice};
    use crate::domain::ports::InvoiceRepository;
    use crate::infrastructure::memory::InMemoryStore;
    use crate::infrastructure::simulated_gateway::SimulatedGateway;
    use crate::domain::order::OrderStatus;
    use crate::domain::payment::PaymentStatus;

    #[test]
    fn checkout_places_order_and_clears_cart() {
        let fx = Fixture::approving();
        let p1 = seed_product(&fx.store, "10.00", 3);
        let mut cart = Cart::new(None);
        cart.add_line(&fx.services.stock, p1.id, 1).unwrap();

        let order_id = fx
            .services
            .fulfillment
            .checkout(&mut cart, Uuid::new_v4(), shipping())
            .unwrap()
            .order_id;

        let order = fx.services.orders.get_details(order_id).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_price, BigDecimal::from_str("10.00").unwrap());
        assert_eq!(fx.stock_of(p1.id), 2);
        assert!(cart.is_empty());
    }

    #[test]
    fn checkout_reports_lines_that_ran_low() {
        let fx = Fixture::approving();
        let scarce = seed_product(&fx.store, "10.00", 6);
        let plenty = seed_product(&fx.store, "1.00", 50);
        let mut cart = Cart::new(None);
        cart.add_line(&fx.services.stock, scarce.id, 1).unwrap();
        cart.add_line(&fx.services.stock, plenty.id, 1).unwrap();

        let checked_out = fx
            .services
            .fulfillment
            .checkout(&mut cart, Uuid::new_v4(), shipping())
            .unwrap();

        assert_eq!(
            checked_out.low_stock,
            vec![StockLevel {
                product_id: scarce.id,
                stock: 5
            }]
        );
    }

    #[test]
    fn empty_cart_cannot_check_out() {
        let fx = Fixture::approving();
        let mut cart = Cart::new(None);
        assert!(matches!(
            fx.services
                .fulfillment
                .checkout(&mut cart, Uuid::new_v4(), shipping()),
            Err(DomainError::EmptyCart)
        ));
    }

    #[test]
    fn failed_checkout_keeps_the_cart() {
        let fx = Fixture::approving();
        let p1 = seed_product(&fx.store, "10.00", 3);
        let p2 = seed_product(&fx.store, "4.00", 2);
        let mut cart = Cart::new(None);
        cart.add_line(&fx.services.stock, p1.id, 2).unwrap();
        cart.add_line(&fx.services.stock, p2.id, 2).unwrap();

        // Someone else buys one of p2 after it went into the cart.
        fx.services.stock.decrement(p2.id, 1).unwrap();

        let err = fx
            .services
            .fulfillment
            .checkout(&mut cart, Uuid::new_v4(), shipping())
            .unwrap_err();

        assert!(matches!(err, DomainError::InsufficientStock { product_id, .. } if product_id == p2.id));
        assert_eq!(cart.item_count(), 4);
        assert_eq!(fx.stock_of(p1.id), 3);
        assert_eq!(fx.stock_of(p2.id), 1);
    }

    #[test]
    fn checkout_charges_snapshot_prices() {
        let fx = Fixture::approving();
        let p1 = seed_product(&fx.store, "10.00", 3);
        let mut cart = Cart::new(None);
        cart.add_line(&fx.services.stock, p1.id, 2).unwrap();

        crate::domain::ports::ProductRepository::update_price(
            &fx.store,
            p1.id,
            BigDecimal::from_str("12.00").unwrap(),
        )
        .unwrap();

        let order_id = fx
            .services
            .fulfillment
            .checkout(&mut cart, Uuid::new_v4(), shipping())
            .unwrap()
            .order_id;
        assert_eq!(
            fx.services.orders.get_details(order_id).unwrap().total_price,
            BigDecimal::from_str("20.00").unwrap()
        );
    }

    #[test]
    fn last_unit_goes_to_exactly_one_buyer() {
        let fx = Fixture::approving();
        let last = seed_product(&fx.store, "5.00", 1).id;
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let fulfillment = fx.services.fulfillment.clone();
                let stock = fx.services.stock.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let mut cart = Cart::new(None);
                    cart.add_line(&stock, last, 1).unwrap();
                    barrier.wait();
                    fulfillment.checkout(&mut cart, Uuid::new_v4(), shipping())
                })
            })
            .collect();
        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(DomainError::InsufficientStock { .. }))));
        assert_eq!(fx.stock_of(last), 0);
    }

    #[test]
    fn approved_settlement_issues_an_invoice() {
        let fx = Fixture::approving();
        let order_id = fx.placed_order("10.00", 3, 1);

        let settlement = fx
            .services
            .fulfillment
            .settle_payment(
                order_id,
                &BigDecimal::from_str("10.00").unwrap(),
                PaymentMethod::CreditCard,
            )
            .unwrap();

        assert_eq!(settlement.payment.status, PaymentStatus::Completed);
        let invoice_id = settlement.invoice_id.expect("invoice issued");
        assert_eq!(
            fx.services.invoices.render(invoice_id).unwrap().order_status,
            OrderStatus::Processing
        );
    }

    #[test]
    fn declined_settlement_issues_nothing() {
        let fx = Fixture::declining();
        let order_id = fx.placed_order("10.00", 3, 1);

        let settlement = fx
            .services
            .fulfillment
            .settle_payment(
                order_id,
                &BigDecimal::from_str("10.00").unwrap(),
                PaymentMethod::PayPal,
            )
            .unwrap();

        assert!(!settlement.payment.success);
        assert!(settlement.invoice_id.is_none());
        assert!(fx.services.invoices.find_by_order(order_id).unwrap().is_none());
    }

    struct UnavailableInvoices;

    impl InvoiceRepository for UnavailableInvoices {
        fn insert_or_get(&self, _: NewInvoice) -> Result<Invoice, DomainError> {
            Err(DomainError::Persistence("invoice store offline".to_string()))
        }

        fn find_by_id(&self, _: Uuid) -> Result<Option<Invoice>, DomainError> {
            Ok(None)
        }

        fn find_by_order(&self, _: Uuid) -> Result<Option<Invoice>, DomainError> {
            Ok(None)
        }
    }

    #[test]
    fn invoice_failure_keeps_the_settled_payment() {
        let store = InMemoryStore::new();
        let services = Services::new(
            Repositories {
                invoices: Arc::new(UnavailableInvoices),
                ..store.repositories()
            },
            Arc::new(SimulatedGateway::always_approve()),
            DEFAULT_LOW_STOCK_THRESHOLD,
        );
        let product = seed_product(&store, "10.00", 3);
        let order_id = services
            .orders
            .create(Uuid::new_v4(), vec![line_for(&product, 1)], shipping())
            .unwrap()
            .id;

        let settlement = services
            .fulfillment
            .settle_payment(
                order_id,
                &BigDecimal::from_str("10.00").unwrap(),
                PaymentMethod::CreditCard,
            )
            .unwrap();

        assert!(settlement.payment.success);
        assert_eq!(settlement.payment.order_status, OrderStatus::Processing);
        assert!(settlement.invoice_id.is_none());
    }
}
