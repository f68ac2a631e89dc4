use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::payment::{NewPayment, PaymentAttempt, PaymentStatus};
use crate::domain::ports::PaymentRepository;
use crate::schema::payments;

use super::is_unique_violation;
use super::models::{NewPaymentRow, PaymentRow};

#[derive(Clone)]
pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl PaymentRepository for DieselPaymentRepository {
    fn insert(&self, payment: NewPayment) -> Result<PaymentAttempt, DomainError> {
        let mut conn = self.pool.get()?;
        let order_id = payment.order_id;

        // `payments.order_id` is unique; a concurrent attempt for the same
        // order surfaces as a unique violation.
        let row = diesel::insert_into(payments::table)
            .values(&NewPaymentRow {
                id: Uuid::new_v4(),
                order_id,
                amount: payment.amount,
                method: payment.method.as_str().to_string(),
                status: payment.status.as_str().to_string(),
            })
            .returning(PaymentRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::DuplicatePayment { order_id }
                } else {
                    e.into()
                }
            })?;
        row.try_into()
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentAttempt>, DomainError> {
        let mut conn = self.pool.get()?;
        payments::table
            .filter(payments::id.eq(id))
            .select(PaymentRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(PaymentAttempt::try_from)
            .transpose()
    }

    fn find_by_order(&self, order_id: Uuid) -> Result<Option<PaymentAttempt>, DomainError> {
        let mut conn = self.pool.get()?;
        payments::table
            .filter(payments::order_id.eq(order_id))
            .select(PaymentRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(PaymentAttempt::try_from)
            .transpose()
    }

    fn transition_status(
        &self,
        id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = diesel::update(
            payments::table
                .filter(payments::id.eq(id))
                .filter(payments::status.eq(from.as_str())),
        )
        .set((
            payments::status.eq(to.as_str()),
            payments::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;
        Ok(rows == 1)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use uuid::Uuid;

    use super::DieselPaymentRepository;
    use crate::domain::errors::DomainError;
    use crate::domain::order::{NewOrder, OrderLineInput, ShippingInfo};
    use crate::domain::payment::{NewPayment, PaymentMethod, PaymentStatus};
    use crate::domain::ports::{OrderRepository, PaymentRepository, ProductRepository};
    use crate::domain::product::NewProduct;
    use crate::infrastructure::order_repo::DieselOrderRepository;
    use crate::infrastructure::product_repo::DieselProductRepository;
    use crate::infrastructure::test_db::setup_db;

    fn seed_order(pool: &crate::db::DbPool) -> Uuid {
        let product = DieselProductRepository::new(pool.clone())
            .create(NewProduct {
                name: "Keyboard".to_string(),
                category: "Peripherals".to_string(),
                price: BigDecimal::from_str("49.99").unwrap(),
                stock: 3,
            })
            .expect("seed product");
        let order = NewOrder::new(
            Uuid::new_v4(),
            vec![OrderLineInput {
                product_id: product.id,
                product_name: product.name,
                quantity: 1,
                unit_price: product.price,
            }],
            ShippingInfo {
                name: "Edsger Dijkstra".to_string(),
                address: "Plantage Muidergracht".to_string(),
                city: "Amsterdam".to_string(),
                state: "NH".to_string(),
                postal_code: "1018".to_string(),
                country: "Netherlands".to_string(),
                phone: None,
            },
        )
        .unwrap();
        DieselOrderRepository::new(pool.clone())
            .create(order)
            .expect("seed order")
            .id
    }

    fn payment(order_id: Uuid, status: PaymentStatus) -> NewPayment {
        NewPayment {
            order_id,
            amount: BigDecimal::from_str("49.99").unwrap(),
            method: PaymentMethod::PayPal,
            status,
        }
    }

    #[tokio::test]
    async fn second_attempt_for_an_order_is_a_duplicate() {
        let (_container, pool) = setup_db().await;
        let order_id = seed_order(&pool);
        let repo = DieselPaymentRepository::new(pool);

        let first = repo
            .insert(payment(order_id, PaymentStatus::Failed))
            .expect("insert failed");
        assert_eq!(first.method, PaymentMethod::PayPal);

        let err = repo
            .insert(payment(order_id, PaymentStatus::Completed))
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicatePayment { order_id: id } if id == order_id));
        assert_eq!(
            repo.find_by_order(order_id).unwrap().unwrap().id,
            first.id
        );
    }

    #[tokio::test]
    async fn refund_transition_requires_completed() {
        let (_container, pool) = setup_db().await;
        let order_id = seed_order(&pool);
        let repo = DieselPaymentRepository::new(pool);
        let attempt = repo
            .insert(payment(order_id, PaymentStatus::Completed))
            .unwrap();

        assert!(repo
            .transition_status(attempt.id, PaymentStatus::Completed, PaymentStatus::Refunded)
            .unwrap());
        assert!(!repo
            .transition_status(attempt.id, PaymentStatus::Completed, PaymentStatus::Refunded)
            .unwrap());
        assert_eq!(
            repo.find_by_id(attempt.id).unwrap().unwrap().status,
            PaymentStatus::Refunded
        );
    }
}
