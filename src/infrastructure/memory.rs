//! Process-local store implementing every repository port behind one mutex.
//!
//! Holding the single lock for the whole of `OrderRepository::create` gives
//! the same all-or-nothing behaviour as the database transaction. Used by the
//! unit tests and when no `DATABASE_URL` is configured.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::application::Repositories;
use crate::domain::errors::DomainError;
use crate::domain::invoice::{Invoice, NewInvoice};
use crate::domain::order::{
    CreatedOrder, ListResult, NewOrder, OrderDetails, OrderLine, OrderStatus,
};
use crate::domain::payment::{NewPayment, PaymentAttempt, PaymentStatus};
use crate::domain::ports::{
    InvoiceRepository, OrderRepository, PaymentRepository, ProductRepository,
};
use crate::domain::product::{NewProduct, Product, StockLevel};

#[derive(Debug, Default)]
struct MemoryState {
    products: HashMap<Uuid, Product>,
    orders: Vec<OrderDetails>,
    payments: HashMap<Uuid, PaymentAttempt>,
    invoices: HashMap<Uuid, Invoice>,
}

impl MemoryState {
    fn order_mut(&mut self, id: Uuid) -> Option<&mut OrderDetails> {
        self.orders.iter_mut().find(|o| o.id == id)
    }

    fn decrement(&mut self, id: Uuid, delta: i32) -> Result<StockLevel, DomainError> {
        let product = self
            .products
            .get_mut(&id)
            .ok_or(DomainError::ProductNotFound(id))?;
        if product.stock < delta {
            return Err(DomainError::InsufficientStock {
                product_id: id,
                requested: delta,
                available: product.stock,
            });
        }
        product.stock -= delta;
        Ok(StockLevel {
            product_id: id,
            stock: product.stock,
        })
    }

    fn increment(&mut self, id: Uuid, delta: i32) -> Result<StockLevel, DomainError> {
        let product = self
            .products
            .get_mut(&id)
            .ok_or(DomainError::ProductNotFound(id))?;
        product.stock = product
            .stock
            .checked_add(delta)
            .ok_or_else(|| DomainError::InvalidInput("stock overflow".to_string()))?;
        Ok(StockLevel {
            product_id: id,
            stock: product.stock,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The same store behind every repository port.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            products: Arc::new(self.clone()),
            orders: Arc::new(self.clone()),
            payments: Arc::new(self.clone()),
            invoices: Arc::new(self.clone()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, DomainError> {
        self.state
            .lock()
            .map_err(|e| DomainError::Persistence(format!("in-memory store poisoned: {e}")))
    }
}

impl ProductRepository for InMemoryStore {
    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        if product.stock < 0 {
            return Err(DomainError::InvalidInput(
                "stock cannot be negative".to_string(),
            ));
        }
        let product = Product {
            id: Uuid::new_v4(),
            name: product.name,
            category: product.category,
            price: product.price,
            stock: product.stock,
        };
        self.lock()?.products.insert(product.id, product.clone());
        Ok(product)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.lock()?.products.get(&id).cloned())
    }

    fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let state = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }

    fn list(&self) -> Result<Vec<Product>, DomainError> {
        let mut products: Vec<Product> = self.lock()?.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    fn list_at_or_below(&self, threshold: i32) -> Result<Vec<Product>, DomainError> {
        Ok(ProductRepository::list(self)?
            .into_iter()
            .filter(|p| p.stock <= threshold)
            .collect())
    }

    fn update_price(&self, id: Uuid, price: BigDecimal) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let product = state
            .products
            .get_mut(&id)
            .ok_or(DomainError::ProductNotFound(id))?;
        product.price = price;
        Ok(())
    }

    fn decrement_stock(&self, id: Uuid, delta: i32) -> Result<StockLevel, DomainError> {
        self.lock()?.decrement(id, delta)
    }

    fn increment_stock(&self, id: Uuid, delta: i32) -> Result<StockLevel, DomainError> {
        self.lock()?.increment(id, delta)
    }
}

impl OrderRepository for InMemoryStore {
    fn create(&self, order: NewOrder) -> Result<CreatedOrder, DomainError> {
        let mut state = self.lock()?;

        // Check every line before touching anything so a failure leaves no trace.
        for line in &order.lines {
            let product = state
                .products
                .get(&line.product_id)
                .ok_or(DomainError::ProductNotFound(line.product_id))?;
            if product.stock < line.quantity {
                return Err(DomainError::InsufficientStock {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: product.stock,
                });
            }
        }

        let stock_levels = order
            .lines
            .iter()
            .map(|line| state.decrement(line.product_id, line.quantity))
            .collect::<Result<Vec<_>, _>>()?;

        let id = Uuid::new_v4();
        state.orders.push(OrderDetails {
            id,
            user_id: order.user_id,
            status: OrderStatus::Pending,
            total_price: order.total_price,
            shipping_info: order.shipping_info,
            created_at: Utc::now(),
            lines: order
                .lines
                .into_iter()
                .map(|l| OrderLine {
                    product_id: l.product_id,
                    product_name: l.product_name,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                })
                .collect(),
        });
        Ok(CreatedOrder { id, stock_levels })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderDetails>, DomainError> {
        Ok(self.lock()?.orders.iter().find(|o| o.id == id).cloned())
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let state = self.lock()?;
        let offset = usize::try_from((page - 1).max(0) * limit).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(ListResult {
            items: state
                .orders
                .iter()
                .rev()
                .skip(offset)
                .take(limit)
                .map(|o| OrderDetails {
                    lines: vec![],
                    ..o.clone()
                })
                .collect(),
            total: i64::try_from(state.orders.len()).unwrap_or(i64::MAX),
        })
    }

    fn transition_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state.order_mut(id) {
            Some(order) if order.status == from => {
                order.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn cancel(&self, id: Uuid) -> Result<Option<Vec<StockLevel>>, DomainError> {
        let mut state = self.lock()?;
        let lines = match state.order_mut(id) {
            Some(order) if order.status == OrderStatus::Pending => order.lines.clone(),
            _ => return Ok(None),
        };
        let levels = lines
            .iter()
            .map(|line| state.increment(line.product_id, line.quantity))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(order) = state.order_mut(id) {
            order.status = OrderStatus::Cancelled;
        }
        Ok(Some(levels))
    }
}

impl PaymentRepository for InMemoryStore {
    fn insert(&self, payment: NewPayment) -> Result<PaymentAttempt, DomainError> {
        let mut state = self.lock()?;
        if state
            .payments
            .values()
            .any(|p| p.order_id == payment.order_id)
        {
            return Err(DomainError::DuplicatePayment {
                order_id: payment.order_id,
            });
        }
        let attempt = PaymentAttempt {
            id: Uuid::new_v4(),
            order_id: payment.order_id,
            amount: payment.amount,
            method: payment.method,
            status: payment.status,
            created_at: Utc::now(),
        };
        state.payments.insert(attempt.id, attempt.clone());
        Ok(attempt)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentAttempt>, DomainError> {
        Ok(self.lock()?.payments.get(&id).cloned())
    }

    fn find_by_order(&self, order_id: Uuid) -> Result<Option<PaymentAttempt>, DomainError> {
        Ok(self
            .lock()?
            .payments
            .values()
            .find(|p| p.order_id == order_id)
            .cloned())
    }

    fn transition_status(
        &self,
        id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state.payments.get_mut(&id) {
            Some(payment) if payment.status == from => {
                payment.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl InvoiceRepository for InMemoryStore {
    fn insert_or_get(&self, invoice: NewInvoice) -> Result<Invoice, DomainError> {
        let mut state = self.lock()?;
        if let Some(existing) = state
            .invoices
            .values()
            .find(|i| i.order_id == invoice.order_id)
        {
            return Ok(existing.clone());
        }
        let stored = Invoice {
            id: Uuid::new_v4(),
            order_id: invoice.order_id,
            generated_at: Utc::now(),
            lines: invoice.lines,
        };
        state.invoices.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, DomainError> {
        Ok(self.lock()?.invoices.get(&id).cloned())
    }

    fn find_by_order(&self, order_id: Uuid) -> Result<Option<Invoice>, DomainError> {
        Ok(self
            .lock()?
            .invoices
            .values()
            .find(|i| i.order_id == order_id)
            .cloned())
    }
}
