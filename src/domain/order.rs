use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;
use super::product::StockLevel;

/// Lifecycle of an order.
///
/// ```text
/// Pending ──► Processing ──► Shipped ──► Delivered
///    │             │             │            │
///    ▼             └─────────────┴────────────┴──► Refunded
/// Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Shipped)
                | (Shipped, Delivered)
                | (Pending, Cancelled)
                | (Processing, Refunded)
                | (Shipped, Refunded)
                | (Delivered, Refunded)
        )
    }

    /// Returns the transition as a result, for use with `?`.
    pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Cancelled and Refunded accept no further transitions. Delivered can
    /// still be refunded.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Refunded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Refunded => "Refunded",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown order status '{s}'")))
    }
}

/// Where an order ships to. Stored as JSON alongside the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl OrderLineInput {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

/// A validated order ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub total_price: BigDecimal,
    pub shipping_info: ShippingInfo,
    pub lines: Vec<OrderLineInput>,
}

impl NewOrder {
    pub fn new(
        user_id: Uuid,
        lines: Vec<OrderLineInput>,
        shipping_info: ShippingInfo,
    ) -> Result<Self, DomainError> {
        if lines.is_empty() {
            return Err(DomainError::EmptyCart);
        }
        for (i, line) in lines.iter().enumerate() {
            if line.quantity <= 0 {
                return Err(DomainError::InvalidInput(format!(
                    "quantity for product {} must be positive",
                    line.product_id
                )));
            }
            if lines[..i].iter().any(|l| l.product_id == line.product_id) {
                return Err(DomainError::InvalidInput(format!(
                    "product {} appears on more than one line",
                    line.product_id
                )));
            }
        }
        let total_price = lines.iter().map(OrderLineInput::line_total).sum();
        Ok(Self {
            user_id,
            total_price,
            shipping_info,
            lines,
        })
    }
}

/// Result of a committed order insert.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub id: Uuid,
    pub stock_levels: Vec<StockLevel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl OrderLine {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total_price: BigDecimal,
    pub shipping_info: ShippingInfo,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderDetails>,
    pub total: i64,
}
