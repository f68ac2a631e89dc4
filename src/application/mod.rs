pub mod catalog;
pub mod fulfillment;
pub mod invoice_service;
pub mod order_service;
pub mod payment_service;
pub mod stock_ledger;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use crate::domain::ports::{
    InvoiceRepository, OrderRepository, PaymentGateway, PaymentRepository, ProductRepository,
};

use catalog::CatalogService;
use fulfillment::FulfillmentOrchestrator;
use invoice_service::InvoiceService;
use order_service::OrderService;
use payment_service::PaymentService;
use stock_ledger::StockLedger;

/// The storage adapters a `Services` graph is wired against.
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
}

/// Every application service, wired once at startup and shared by handlers.
#[derive(Clone)]
pub struct Services {
    pub catalog: CatalogService,
    pub stock: StockLedger,
    pub orders: OrderService,
    pub payments: PaymentService,
    pub invoices: InvoiceService,
    pub fulfillment: FulfillmentOrchestrator,
}

impl Services {
    pub fn new(
        repos: Repositories,
        gateway: Arc<dyn PaymentGateway>,
        low_stock_threshold: i32,
    ) -> Self {
        let catalog = CatalogService::new(repos.products.clone());
        let stock = StockLedger::new(repos.products, low_stock_threshold);
        let orders = OrderService::new(repos.orders);
        let payments = PaymentService::new(repos.payments, orders.clone(), gateway);
        let invoices = InvoiceService::new(repos.invoices, orders.clone());
        let fulfillment = FulfillmentOrchestrator::new(
            stock.clone(),
            orders.clone(),
            payments.clone(),
            invoices.clone(),
        );
        Self {
            catalog,
            stock,
            orders,
            payments,
            invoices,
            fulfillment,
        }
    }
}
