use bigdecimal::BigDecimal;
use rand::Rng;
use uuid::Uuid;

use crate::domain::payment::{PaymentAttempt, PaymentMethod};
use crate::domain::ports::PaymentGateway;

pub const DEFAULT_SUCCESS_RATE: f64 = 0.9;

/// Stand-in gateway: every charge or refund succeeds with a fixed
/// probability. Not a source of cryptographic randomness.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedGateway {
    success_rate: f64,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_RATE)
    }
}

impl SimulatedGateway {
    /// Rates outside `0.0..=1.0` are clamped.
    pub fn new(success_rate: f64) -> Self {
        let success_rate = if success_rate.is_nan() {
            DEFAULT_SUCCESS_RATE
        } else {
            success_rate.clamp(0.0, 1.0)
        };
        Self { success_rate }
    }

    pub fn always_approve() -> Self {
        Self::new(1.0)
    }

    pub fn always_decline() -> Self {
        Self::new(0.0)
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    fn draw(&self) -> bool {
        rand::thread_rng().gen_bool(self.success_rate)
    }
}

impl PaymentGateway for SimulatedGateway {
    fn charge(&self, order_id: Uuid, amount: &BigDecimal, method: PaymentMethod) -> bool {
        let approved = self.draw();
        log::debug!(
            "simulated charge of {} via {} for order {}: {}",
            amount,
            method,
            order_id,
            if approved { "approved" } else { "declined" }
        );
        approved
    }

    fn refund(&self, payment: &PaymentAttempt) -> bool {
        let approved = self.draw();
        log::debug!(
            "simulated refund of payment {}: {}",
            payment.id,
            if approved { "approved" } else { "declined" }
        );
        approved
    }
}
