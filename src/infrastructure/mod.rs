pub mod invoice_repo;
pub mod memory;
pub mod models;
pub mod order_repo;
pub mod payment_repo;
pub mod product_repo;
pub mod simulated_gateway;

#[cfg(test)]
pub(crate) mod test_db;

use std::sync::Arc;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::application::Repositories;
use crate::db::DbPool;
use crate::domain::errors::DomainError;

use invoice_repo::DieselInvoiceRepository;
use order_repo::DieselOrderRepository;
use payment_repo::DieselPaymentRepository;
use product_repo::DieselProductRepository;

/// PostgreSQL-backed repositories sharing one pool.
pub fn diesel_repositories(pool: DbPool) -> Repositories {
    Repositories {
        products: Arc::new(DieselProductRepository::new(pool.clone())),
        orders: Arc::new(DieselOrderRepository::new(pool.clone())),
        payments: Arc::new(DieselPaymentRepository::new(pool.clone())),
        invoices: Arc::new(DieselInvoiceRepository::new(pool)),
    }
}

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        DomainError::Persistence(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Persistence(e.to_string())
    }
}

pub(crate) fn is_unique_violation(e: &DieselError) -> bool {
    matches!(
        e,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}
