use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::invoice::{Invoice, NewInvoice};
use crate::domain::ports::InvoiceRepository;
use crate::schema::invoices;

use super::models::{InvoiceRow, NewInvoiceRow};

#[derive(Clone)]
pub struct DieselInvoiceRepository {
    pool: DbPool,
}

impl DieselInvoiceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl InvoiceRepository for DieselInvoiceRepository {
    fn insert_or_get(&self, invoice: NewInvoice) -> Result<Invoice, DomainError> {
        let mut conn = self.pool.get()?;
        let line_items = serde_json::to_value(&invoice.lines)
            .map_err(|e| DomainError::InvalidInput(format!("invoice snapshot: {e}")))?;

        // Losing a race against another generator is fine: read back
        // whichever row won.
        diesel::insert_into(invoices::table)
            .values(&NewInvoiceRow {
                id: Uuid::new_v4(),
                order_id: invoice.order_id,
                line_items,
            })
            .on_conflict(invoices::order_id)
            .do_nothing()
            .execute(&mut conn)?;

        invoices::table
            .filter(invoices::order_id.eq(invoice.order_id))
            .select(InvoiceRow::as_select())
            .first(&mut conn)?
            .try_into()
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, DomainError> {
        let mut conn = self.pool.get()?;
        invoices::table
            .filter(invoices::id.eq(id))
            .select(InvoiceRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Invoice::try_from)
            .transpose()
    }

    fn find_by_order(&self, order_id: Uuid) -> Result<Option<Invoice>, DomainError> {
        let mut conn = self.pool.get()?;
        invoices::table
            .filter(invoices::order_id.eq(order_id))
            .select(InvoiceRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Invoice::try_from)
            .transpose()
    }
}
