use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::stock_ledger::DEFAULT_LOW_STOCK_THRESHOLD;
use super::Services;
use crate::domain::order::{OrderLineInput, ShippingInfo};
use crate::domain::ports::{PaymentGateway, ProductRepository};
use crate::domain::product::{NewProduct, Product};
use crate::infrastructure::memory::InMemoryStore;
use crate::infrastructure::simulated_gateway::SimulatedGateway;

pub(crate) struct Fixture {
    pub store: InMemoryStore,
    pub services: Services,
}

impl Fixture {
    pub fn with_gateway(gateway: impl PaymentGateway) -> Self {
        Self::on_store(InMemoryStore::new(), gateway)
    }

    /// Wires services over an existing store, for gateways that touch it.
    pub fn on_store(store: InMemoryStore, gateway: impl PaymentGateway) -> Self {
        let services = Services::new(
            store.repositories(),
            Arc::new(gateway),
            DEFAULT_LOW_STOCK_THRESHOLD,
        );
        Self { store, services }
    }

    pub fn approving() -> Self {
        Self::with_gateway(SimulatedGateway::always_approve())
    }

    pub fn declining() -> Self {
        Self::with_gateway(SimulatedGateway::always_decline())
    }

    pub fn stock_of(&self, product_id: Uuid) -> i32 {
        ProductRepository::find_by_id(&self.store, product_id)
            .unwrap()
            .expect("product exists")
            .stock
    }

    /// Seeds one product and places an order for `quantity` of it.
    pub fn placed_order(&self, price: &str, stock: i32, quantity: i32) -> Uuid {
        let product = seed_product(&self.store, price, stock);
        self.services
            .orders
            .create(Uuid::new_v4(), vec![line_for(&product, quantity)], shipping())
            .expect("order placed")
            .id
    }
}

pub(crate) fn seed_product(store: &InMemoryStore, price: &str, stock: i32) -> Product {
    ProductRepository::create(
        store,
        NewProduct {
            name: format!("Product {}", &Uuid::new_v4().simple().to_string()[..8]),
            category: "Test".to_string(),
            price: BigDecimal::from_str(price).expect("valid decimal"),
            stock,
        },
    )
    .expect("seed product")
}

pub(crate) fn line_for(product: &Product, quantity: i32) -> OrderLineInput {
    OrderLineInput {
        product_id: product.id,
        product_name: product.name.clone(),
        quantity,
        unit_price: product.price.clone(),
    }
}

pub(crate) fn shipping() -> ShippingInfo {
    ShippingInfo {
        name: "Grace Hopper".to_string(),
        address: "1 Navy Yard".to_string(),
        city: "Arlington".to_string(),
        state: "VA".to_string(),
        postal_code: "22202".to_string(),
        country: "United States".to_string(),
        phone: Some("+1 555 0100".to_string()),
    }
}
