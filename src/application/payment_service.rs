use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::OrderStatus;
use crate::domain::payment::{
    NewPayment, PaymentAttempt, PaymentMethod, PaymentOutcome, PaymentStatus, RefundOutcome,
};
use crate::domain::ports::{PaymentGateway, PaymentRepository};

use super::order_service::OrderService;

#[derive(Clone)]
pub struct PaymentService {
    payments: Arc<dyn PaymentRepository>,
    orders: OrderService,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        orders: OrderService,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            payments,
            orders,
            gateway,
        }
    }

    pub fn payment_methods(&self) -> &'static [PaymentMethod] {
        &PaymentMethod::ALL
    }

    /// Charges a Pending order once.
    ///
    /// The attempt row is written as `Pending` before the gateway is asked,
    /// so a concurrent second attempt fails with `DuplicatePayment` instead
    /// of charging twice. On approval the order moves to Processing before
    /// the attempt is marked Completed. If the order left Pending while the
    /// gateway was deciding, the charge is handed back, the attempt ends
    /// Failed and the transition error is returned. On decline the order
    /// stays Pending and the attempt is recorded as Failed.
    pub fn simulate(
        &self,
        order_id: Uuid,
        amount: &BigDecimal,
        method: PaymentMethod,
    ) -> Result<PaymentOutcome, DomainError> {
        let order = self.orders.get_details(order_id)?;

        if self.payments.find_by_order(order_id)?.is_some() {
            return Err(DomainError::DuplicatePayment { order_id });
        }
        if *amount != order.total_price {
            return Err(DomainError::AmountMismatch {
                expected: order.total_price,
                actual: amount.clone(),
            });
        }
        order.status.transition_to(OrderStatus::Processing)?;

        let attempt = self.payments.insert(NewPayment {
            order_id,
            amount: order.total_price.clone(),
            method,
            status: PaymentStatus::Pending,
        })?;

        if !self.gateway.charge(order_id, amount, method) {
            self.payments.transition_status(
                attempt.id,
                PaymentStatus::Pending,
                PaymentStatus::Failed,
            )?;
            log::info!(
                "payment {} for order {} via {}: declined",
                attempt.id,
                order_id,
                method
            );
            return Ok(PaymentOutcome {
                success: false,
                payment_id: attempt.id,
                status: PaymentStatus::Failed,
                order_status: order.status,
            });
        }

        let order_status = match self.orders.update_status(order_id, OrderStatus::Processing) {
            Ok(status) => status,
            Err(e) => {
                self.reverse_charge(&attempt);
                return Err(e);
            }
        };
        self.payments.transition_status(
            attempt.id,
            PaymentStatus::Pending,
            PaymentStatus::Completed,
        )?;

        log::info!(
            "payment {} for order {} via {}: {}",
            attempt.id,
            order_id,
            method,
            PaymentStatus::Completed
        );
        Ok(PaymentOutcome {
            success: true,
            payment_id: attempt.id,
            status: PaymentStatus::Completed,
            order_status,
        })
    }

    /// Undoes an approved charge whose order could not take it.
    fn reverse_charge(&self, attempt: &PaymentAttempt) {
        let returned = self.gateway.refund(attempt);
        if !returned {
            log::error!(
                "charge for payment {} on order {} could not be reversed",
                attempt.id,
                attempt.order_id
            );
        }
        match self.payments.transition_status(
            attempt.id,
            PaymentStatus::Pending,
            PaymentStatus::Failed,
        ) {
            Ok(_) => log::warn!(
                "payment {} voided: order {} left Pending during the charge",
                attempt.id,
                attempt.order_id
            ),
            Err(e) => log::error!("failed to void payment {}: {}", attempt.id, e),
        }
    }

    /// Refunds a Completed payment. A gateway decline is reported as
    /// `success: false` and leaves the payment Completed. An order already
    /// moved to Refunded by hand is left as it is.
    pub fn refund(&self, payment_id: Uuid) -> Result<RefundOutcome, DomainError> {
        let payment = self.verify_status(payment_id)?;
        if !payment.status.can_transition_to(PaymentStatus::Refunded) {
            return Err(DomainError::NotRefundable {
                payment_id,
                status: payment.status,
            });
        }
        let order = self.orders.get_details(payment.order_id)?;
        if order.status != OrderStatus::Refunded {
            order.status.transition_to(OrderStatus::Refunded)?;
        }

        if !self.gateway.refund(&payment) {
            log::info!("refund of payment {} declined by gateway", payment_id);
            return Ok(RefundOutcome {
                success: false,
                payment_id,
                status: PaymentStatus::Completed,
            });
        }

        if !self.payments.transition_status(
            payment_id,
            PaymentStatus::Completed,
            PaymentStatus::Refunded,
        )? {
            let current = self.verify_status(payment_id)?.status;
            return Err(DomainError::NotRefundable {
                payment_id,
                status: current,
            });
        }
        match self
            .orders
            .update_status(payment.order_id, OrderStatus::Refunded)
        {
            Ok(_)
            | Err(DomainError::InvalidTransition {
                from: OrderStatus::Refunded,
                ..
            }) => {}
            Err(e) => return Err(e),
        }

        log::info!("payment {} refunded", payment_id);
        Ok(RefundOutcome {
            success: true,
            payment_id,
            status: PaymentStatus::Refunded,
        })
    }

    pub fn verify_status(&self, payment_id: Uuid) -> Result<PaymentAttempt, DomainError> {
        self.payments
            .find_by_id(payment_id)?
            .ok_or(DomainError::PaymentNotFound(payment_id))
    }

    pub fn find_by_order(&self, order_id: Uuid) -> Result<Option<PaymentAttempt>, DomainError> {
        self.payments.find_by_order(order_id)
    }
}
