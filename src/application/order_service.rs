use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    CreatedOrder, ListResult, NewOrder, OrderDetails, OrderLineInput, OrderStatus, ShippingInfo,
};
use crate::domain::ports::OrderRepository;

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>) -> Self {
        Self { repo }
    }

    /// Persists a Pending order and decrements stock for every line in one
    /// transaction. The returned stock levels are the post-decrement values.
    pub fn create(
        &self,
        user_id: Uuid,
        lines: Vec<OrderLineInput>,
        shipping_info: ShippingInfo,
    ) -> Result<CreatedOrder, DomainError> {
        let order = NewOrder::new(user_id, lines, shipping_info)?;
        let total = order.total_price.clone();
        let created = self.repo.create(order)?;
        log::info!(
            "order {} placed by user {} for {}",
            created.id,
            user_id,
            total
        );
        Ok(created)
    }

    pub fn get_details(&self, order_id: Uuid) -> Result<OrderDetails, DomainError> {
        log::debug!("loading order {}", order_id);
        self.repo
            .find_by_id(order_id)?
            .ok_or(DomainError::OrderNotFound(order_id))
    }

    /// Page numbers start at 1; `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        self.repo.list(page.max(1), limit.clamp(1, MAX_PAGE_SIZE))
    }

    /// Applies one edge of the order state machine. Cancelling a Pending
    /// order also returns its quantities to stock.
    pub fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<OrderStatus, DomainError> {
        let current = self.get_details(order_id)?.status;
        current.transition_to(new_status)?;

        let applied = if new_status == OrderStatus::Cancelled {
            match self.repo.cancel(order_id)? {
                Some(levels) => {
                    log::info!(
                        "order {} cancelled, {} line(s) restocked",
                        order_id,
                        levels.len()
                    );
                    true
                }
                None => false,
            }
        } else {
            self.repo
                .transition_status(order_id, current, new_status)?
        };

        if !applied {
            // Another writer moved the order between the read and the write.
            let now = self.get_details(order_id)?.status;
            return Err(DomainError::InvalidTransition {
                from: now,
                to: new_status,
            });
        }

        log::info!("order {} moved {} -> {}", order_id, current, new_status);
        Ok(new_status)
    }
}
