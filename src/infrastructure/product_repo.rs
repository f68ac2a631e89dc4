use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, Product, StockLevel};
use crate::schema::products;

use super::models::{NewProductRow, ProductRow};

// ── Stock writes shared with the order transaction ───────────────────────────

/// Conditional decrement: the `stock >= delta` guard and the write are one
/// statement, so PostgreSQL's row lock serializes concurrent checkouts.
pub(super) fn decrement_in(
    conn: &mut PgConnection,
    id: Uuid,
    delta: i32,
) -> Result<StockLevel, DomainError> {
    let updated: Option<i32> = diesel::update(
        products::table
            .filter(products::id.eq(id))
            .filter(products::stock.ge(delta)),
    )
    .set((
        products::stock.eq(products::stock - delta),
        products::updated_at.eq(Utc::now()),
    ))
    .returning(products::stock)
    .get_result(conn)
    .optional()?;

    if let Some(stock) = updated {
        return Ok(StockLevel {
            product_id: id,
            stock,
        });
    }

    let available: Option<i32> = products::table
        .filter(products::id.eq(id))
        .select(products::stock)
        .first(conn)
        .optional()?;
    match available {
        Some(available) => Err(DomainError::InsufficientStock {
            product_id: id,
            requested: delta,
            available,
        }),
        None => Err(DomainError::ProductNotFound(id)),
    }
}

pub(super) fn increment_in(
    conn: &mut PgConnection,
    id: Uuid,
    delta: i32,
) -> Result<StockLevel, DomainError> {
    diesel::update(products::table.filter(products::id.eq(id)))
        .set((
            products::stock.eq(products::stock + delta),
            products::updated_at.eq(Utc::now()),
        ))
        .returning(products::stock)
        .get_result(conn)
        .optional()?
        .map(|stock| StockLevel {
            product_id: id,
            stock,
        })
        .ok_or(DomainError::ProductNotFound(id))
}

// ── Repository ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for DieselProductRepository {
    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        if product.stock < 0 {
            return Err(DomainError::InvalidInput(
                "stock cannot be negative".to_string(),
            ));
        }
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                name: product.name,
                category: product.category,
                price: product.price,
                stock: product.stock,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::id.eq_any(ids))
            .select(ProductRow::as_select())
            .order(products::name.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn list(&self) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .select(ProductRow::as_select())
            .order(products::name.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn list_at_or_below(&self, threshold: i32) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::stock.le(threshold))
            .select(ProductRow::as_select())
            .order(products::stock.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn update_price(&self, id: Uuid, price: BigDecimal) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let rows = diesel::update(products::table.filter(products::id.eq(id)))
            .set((
                products::price.eq(price),
                products::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;
        if rows == 0 {
            return Err(DomainError::ProductNotFound(id));
        }
        Ok(())
    }

    fn decrement_stock(&self, id: Uuid, delta: i32) -> Result<StockLevel, DomainError> {
        let mut conn = self.pool.get()?;
        decrement_in(&mut conn, id, delta)
    }

    fn increment_stock(&self, id: Uuid, delta: i32) -> Result<StockLevel, DomainError> {
        let mut conn = self.pool.get()?;
        increment_in(&mut conn, id, delta)
    }
}
