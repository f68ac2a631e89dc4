use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    CreatedOrder, ListResult, NewOrder, OrderDetails, OrderLine, OrderStatus,
};
use crate::domain::ports::OrderRepository;
use crate::domain::product::StockLevel;
use crate::schema::{order_items, orders};

use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};
use super::product_repo::{decrement_in, increment_in};

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn load_lines(conn: &mut PgConnection, order_id: Uuid) -> Result<Vec<OrderLine>, DomainError> {
    let rows = order_items::table
        .filter(order_items::order_id.eq(order_id))
        .select(OrderItemRow::as_select())
        .order(order_items::position.asc())
        .load(conn)?;
    Ok(rows.into_iter().map(OrderLine::from).collect())
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<CreatedOrder, DomainError> {
        let mut conn = self.pool.get()?;
        let shipping_info = serde_json::to_value(&order.shipping_info)
            .map_err(|e| DomainError::InvalidInput(format!("shipping info: {e}")))?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Re-check and decrement stock line by line. Any failure aborts
            //    the transaction and undoes earlier decrements. Rows are
            //    locked in product id order so overlapping carts cannot
            //    deadlock; levels are reported back in cart order.
            let mut by_product: Vec<usize> = (0..order.lines.len()).collect();
            by_product.sort_by_key(|&i| order.lines[i].product_id);
            let mut decremented = Vec::with_capacity(by_product.len());
            for i in by_product {
                let line = &order.lines[i];
                decremented.push((i, decrement_in(conn, line.product_id, line.quantity)?));
            }
            decremented.sort_by_key(|&(i, _)| i);
            let stock_levels: Vec<StockLevel> =
                decremented.into_iter().map(|(_, level)| level).collect();

            // 2. Insert the order header
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    user_id: order.user_id,
                    status: OrderStatus::Pending.as_str().to_string(),
                    total_price: order.total_price.clone(),
                    shipping_info,
                })
                .execute(conn)?;

            // 3. Insert the immutable line snapshot
            let new_lines: Vec<NewOrderItemRow> = order
                .lines
                .iter()
                .zip(0..)
                .map(|(l, position)| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id: l.product_id,
                    product_name: l.product_name.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price.clone(),
                    position,
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&new_lines)
                .execute(conn)?;

            Ok(CreatedOrder {
                id: order_id,
                stock_levels,
            })
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderDetails>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let lines = load_lines(&mut conn, order.id)?;
        order.into_details(lines).map(Some)
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = (page - 1).max(0) * limit;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let rows = orders::table
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .map(|o| o.into_details(vec![]))
                    .collect::<Result<_, _>>()?,
                total,
            })
        })
    }

    fn transition_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = diesel::update(
            orders::table
                .filter(orders::id.eq(id))
                .filter(orders::status.eq(from.as_str())),
        )
        .set((
            orders::status.eq(to.as_str()),
            orders::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;
        Ok(rows == 1)
    }

    fn cancel(&self, id: Uuid) -> Result<Option<Vec<StockLevel>>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let rows = diesel::update(
                orders::table
                    .filter(orders::id.eq(id))
                    .filter(orders::status.eq(OrderStatus::Pending.as_str())),
            )
            .set((
                orders::status.eq(OrderStatus::Cancelled.as_str()),
                orders::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;
            if rows == 0 {
                return Ok(None);
            }

            let levels = load_lines(conn, id)?
                .iter()
                .map(|line| increment_in(conn, line.product_id, line.quantity))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(levels))
        })
    }
}
