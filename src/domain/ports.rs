use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;
use super::invoice::{Invoice, NewInvoice};
use super::order::{CreatedOrder, ListResult, NewOrder, OrderDetails, OrderStatus};
use super::payment::{NewPayment, PaymentAttempt, PaymentMethod, PaymentStatus};
use super::product::{NewProduct, Product, StockLevel};

/// Catalog rows plus the guarded stock column.
///
/// `decrement_stock` must check and write in a single conditional update so
/// that concurrent callers serialize on the row.
pub trait ProductRepository: Send + Sync + 'static {
    fn create(&self, product: NewProduct) -> Result<Product, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;
    fn list(&self) -> Result<Vec<Product>, DomainError>;
    fn list_at_or_below(&self, threshold: i32) -> Result<Vec<Product>, DomainError>;
    fn update_price(&self, id: Uuid, price: BigDecimal) -> Result<(), DomainError>;
    fn decrement_stock(&self, id: Uuid, delta: i32) -> Result<StockLevel, DomainError>;
    fn increment_stock(&self, id: Uuid, delta: i32) -> Result<StockLevel, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Inserts the order and its lines and decrements stock for every line,
    /// all or nothing.
    fn create(&self, order: NewOrder) -> Result<CreatedOrder, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderDetails>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
    /// Sets `to` only if the order is still `from`. Returns whether a row
    /// changed.
    fn transition_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, DomainError>;
    /// Moves a Pending order to Cancelled and returns its quantities to
    /// stock in the same transaction. `None` if the order was not Pending.
    fn cancel(&self, id: Uuid) -> Result<Option<Vec<StockLevel>>, DomainError>;
}

pub trait PaymentRepository: Send + Sync + 'static {
    /// Fails with `DuplicatePayment` when the order already has an attempt.
    fn insert(&self, payment: NewPayment) -> Result<PaymentAttempt, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentAttempt>, DomainError>;
    fn find_by_order(&self, order_id: Uuid) -> Result<Option<PaymentAttempt>, DomainError>;
    fn transition_status(
        &self,
        id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<bool, DomainError>;
}

pub trait InvoiceRepository: Send + Sync + 'static {
    /// Inserts unless the order already has an invoice, and returns whichever
    /// invoice is stored for the order afterwards.
    fn insert_or_get(&self, invoice: NewInvoice) -> Result<Invoice, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, DomainError>;
    fn find_by_order(&self, order_id: Uuid) -> Result<Option<Invoice>, DomainError>;
}

/// Decides whether money moves. The simulator is one implementation; a real
/// gateway adapter would be another.
pub trait PaymentGateway: Send + Sync + 'static {
    fn charge(&self, order_id: Uuid, amount: &BigDecimal, method: PaymentMethod) -> bool;
    fn refund(&self, payment: &PaymentAttempt) -> bool;
}
