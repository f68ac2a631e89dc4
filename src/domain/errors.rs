use bigdecimal::BigDecimal;
use thiserror::Error;
use uuid::Uuid;

use super::order::OrderStatus;
use super::payment::PaymentStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    #[error("Payment already exists for order {order_id}")]
    DuplicatePayment { order_id: Uuid },

    #[error("Invalid order status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Payment {payment_id} is {status}; only completed payments can be refunded")]
    NotRefundable {
        payment_id: Uuid,
        status: PaymentStatus,
    },

    #[error("Payment amount {actual} does not match order total {expected}")]
    AmountMismatch {
        expected: BigDecimal,
        actual: BigDecimal,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl DomainError {
    /// Expected business outcomes, as opposed to store failures.
    pub fn is_business_rule(&self) -> bool {
        !matches!(self, DomainError::Persistence(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_names_the_product() {
        let product_id = Uuid::new_v4();
        let err = DomainError::InsufficientStock {
            product_id,
            requested: 4,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            format!("Insufficient stock for product {product_id}: requested 4, available 3")
        );
    }

    #[test]
    fn invalid_transition_display() {
        let err = DomainError::InvalidTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Pending,
        };
        assert_eq!(
            err.to_string(),
            "Invalid order status transition: Delivered -> Pending"
        );
    }

    #[test]
    fn only_persistence_is_not_a_business_rule() {
        assert!(DomainError::EmptyCart.is_business_rule());
        assert!(!DomainError::Persistence("db down".to_string()).is_business_rule());
    }
}
