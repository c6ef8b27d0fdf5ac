//! PostgreSQL-backed [`OrderRepository`].
//!
//! Checkout runs as one transaction: the referenced product rows are locked
//! in id order, the lines are validated by [`CheckoutPlan::build`], and only a
//! valid plan is written. Any error rolls back stock, order, and cart alike.

use std::collections::HashMap;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::{debug, info};

use crate::domain::ports::{OrderPersistenceError, OrderRepository};
use crate::domain::{
    CheckoutPlan, CheckoutRejection, LineItem, LineSource, Order, OrderId, OrderLine,
    OrderStatus, PlaceOrder, ProductId, ProductStock, UserId,
};

use super::diesel_error_mapping::DbFailure;
use super::models::{NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow};
use super::pool::DbPool;
use super::schema::{cart_lines, order_lines, orders, products, users};

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Error type threaded through the checkout transaction.
#[derive(Debug)]
enum CheckoutTxError {
    Database(diesel::result::Error),
    UserMissing(i64),
    Rejected(CheckoutRejection),
}

impl From<diesel::result::Error> for CheckoutTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

fn map_error(error: impl Into<DbFailure>) -> OrderPersistenceError {
    match error.into() {
        DbFailure::Connection(message) => OrderPersistenceError::connection(message),
        other => OrderPersistenceError::query(other.message()),
    }
}

fn map_tx_error(error: CheckoutTxError) -> OrderPersistenceError {
    match error {
        CheckoutTxError::Database(err) => map_error(err),
        CheckoutTxError::UserMissing(id) => OrderPersistenceError::user_not_found(id),
        CheckoutTxError::Rejected(rejection) => OrderPersistenceError::rejected(rejection),
    }
}

/// Interpret a stored status, reading legacy values as their migrated form.
fn status_from_row(order_id: i64, raw: &str) -> OrderStatus {
    let status = OrderStatus::from_stored(raw);
    if status.as_str() != raw {
        debug!(order_id, stored = raw, read_as = %status, "legacy order status");
    }
    status
}

type OrderHeader = (OrderRow, String);

/// Attach lines (with product names) to order headers, keeping header order.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    headers: Vec<OrderHeader>,
) -> QueryResult<Vec<Order>> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = headers.iter().map(|(row, _)| row.id).collect();
    let line_rows: Vec<(OrderLineRow, String)> = order_lines::table
        .inner_join(products::table)
        .filter(order_lines::order_id.eq_any(&ids))
        .order_by(order_lines::id)
        .select((OrderLineRow::as_select(), products::name))
        .load(conn)
        .await?;

    let mut lines_by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    for (line, product_name) in line_rows {
        lines_by_order
            .entry(line.order_id)
            .or_default()
            .push(OrderLine {
                id: line.id,
                product_id: ProductId::new(line.product_id),
                product_name,
                quantity: line.quantity,
                unit_price: line.unit_price,
            });
    }

    Ok(headers
        .into_iter()
        .map(|(row, user_name)| Order {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            user_name,
            ordered_at: row.ordered_at,
            status: status_from_row(row.id, &row.status),
            total_amount: row.total_amount,
            lines: lines_by_order.remove(&row.id).unwrap_or_default(),
        })
        .collect())
}

async fn load_order(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<Option<Order>> {
    let header: Option<OrderHeader> = orders::table
        .inner_join(users::table)
        .filter(orders::id.eq(id))
        .select((OrderRow::as_select(), users::name))
        .first(conn)
        .await
        .optional()?;
    let Some(header) = header else {
        return Ok(None);
    };
    Ok(hydrate(conn, vec![header]).await?.pop())
}

async fn checkout(
    conn: &mut AsyncPgConnection,
    request: &PlaceOrder,
) -> Result<Order, CheckoutTxError> {
    let user_id = request.user_id.get();
    let user_name: String = users::table
        .find(user_id)
        .select(users::name)
        .first(conn)
        .await
        .optional()?
        .ok_or(CheckoutTxError::UserMissing(user_id))?;

    let items: Vec<LineItem> = match &request.source {
        LineSource::Explicit(items) => items.clone(),
        LineSource::Cart => cart_lines::table
            .filter(cart_lines::user_id.eq(user_id))
            .order_by(cart_lines::id)
            .select((cart_lines::product_id, cart_lines::quantity))
            .load::<(i64, i32)>(conn)
            .await?
            .into_iter()
            .map(|(product_id, quantity)| LineItem::new(ProductId::new(product_id), quantity))
            .collect(),
    };

    let mut product_ids: Vec<i64> = items.iter().map(|item| item.product_id.get()).collect();
    product_ids.sort_unstable();
    product_ids.dedup();
    let locked: Vec<ProductStock> = products::table
        .filter(products::id.eq_any(&product_ids))
        .order_by(products::id)
        .select((products::id, products::name, products::price, products::stock))
        .for_update()
        .load::<(i64, String, BigDecimal, i32)>(conn)
        .await?
        .into_iter()
        .map(|(id, name, price, stock)| ProductStock {
            product_id: ProductId::new(id),
            name,
            price,
            stock,
        })
        .collect();

    let plan = CheckoutPlan::build(&items, &locked).map_err(CheckoutTxError::Rejected)?;
    for line in plan.lines() {
        diesel::update(products::table.find(line.product_id.get()))
            .set(products::stock.eq(line.remaining_stock))
            .execute(conn)
            .await?;
    }

    let (planned, total) = plan.into_parts();
    let order_row: OrderRow = diesel::insert_into(orders::table)
        .values(NewOrderRow {
            user_id,
            ordered_at: request.placed_at,
            status: request.status.as_str(),
            total_amount: &total,
        })
        .returning(OrderRow::as_returning())
        .get_result(conn)
        .await?;

    let line_rows: Vec<OrderLineRow> = {
        let new_lines: Vec<NewOrderLineRow<'_>> = planned
            .iter()
            .map(|line| NewOrderLineRow {
                order_id: order_row.id,
                product_id: line.product_id.get(),
                quantity: line.quantity,
                unit_price: &line.unit_price,
            })
            .collect();
        diesel::insert_into(order_lines::table)
            .values(&new_lines)
            .returning(OrderLineRow::as_returning())
            .get_results(conn)
            .await?
    };

    diesel::delete(cart_lines::table.filter(cart_lines::user_id.eq(user_id)))
        .execute(conn)
        .await?;

    let lines = line_rows
        .into_iter()
        .zip(planned)
        .map(|(row, plan)| OrderLine {
            id: row.id,
            product_id: plan.product_id,
            product_name: plan.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
        })
        .collect();

    Ok(Order {
        id: OrderId::new(order_row.id),
        user_id: request.user_id,
        user_name,
        ordered_at: order_row.ordered_at,
        status: request.status,
        total_amount: order_row.total_amount,
        lines,
    })
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn place_order(&self, request: &PlaceOrder) -> Result<Order, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let order = conn
            .transaction(|conn| async move { checkout(conn, request).await }.scope_boxed())
            .await
            .map_err(map_tx_error)?;
        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            lines = order.lines.len(),
            "order placed"
        );
        Ok(order)
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let headers: Vec<OrderHeader> = orders::table
            .inner_join(users::table)
            .order_by((orders::ordered_at.desc(), orders::id.desc()))
            .select((OrderRow::as_select(), users::name))
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        hydrate(&mut conn, headers).await.map_err(map_error)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let headers: Vec<OrderHeader> = orders::table
            .inner_join(users::table)
            .filter(orders::user_id.eq(user_id.get()))
            .order_by((orders::ordered_at.desc(), orders::id.desc()))
            .select((OrderRow::as_select(), users::name))
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        hydrate(&mut conn, headers).await.map_err(map_error)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        load_order(&mut conn, id.get()).await.map_err(map_error)
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let updated = diesel::update(orders::table.find(id.get()))
            .set(orders::status.eq(status.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        if updated == 0 {
            return Ok(None);
        }
        load_order(&mut conn, id.get()).await.map_err(map_error)
    }

    async fn migrate_statuses(&self) -> Result<u64, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        conn.transaction::<u64, diesel::result::Error, _>(|conn| {
            async move {
                let rows: Vec<(i64, String)> = orders::table
                    .select((orders::id, orders::status))
                    .order_by(orders::id)
                    .for_update()
                    .load(conn)
                    .await?;
                let mut changed = 0_u64;
                for (id, raw) in rows {
                    let Some(status) = OrderStatus::migrate_legacy(&raw) else {
                        continue;
                    };
                    diesel::update(orders::table.find(id))
                        .set(orders::status.eq(status.as_str()))
                        .execute(conn)
                        .await?;
                    debug!(order_id = id, from = %raw, to = %status, "order status migrated");
                    changed += 1;
                }
                Ok(changed)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("shipped", OrderStatus::Shipped)]
    #[case("PENDING", OrderStatus::Preparing)]
    #[case("Teslim Edildi", OrderStatus::Delivered)]
    #[case("", OrderStatus::Preparing)]
    fn stored_statuses_read_canonically(#[case] raw: &str, #[case] expected: OrderStatus) {
        assert_eq!(status_from_row(1, raw), expected);
    }

    #[test]
    fn rejections_survive_the_transaction_boundary() {
        let rejection = CheckoutRejection::ProductNotFound {
            product_id: ProductId::new(3),
        };
        let err = map_tx_error(CheckoutTxError::Rejected(rejection.clone()));
        assert_eq!(err, OrderPersistenceError::rejected(rejection));
        assert_eq!(
            map_tx_error(CheckoutTxError::UserMissing(8)),
            OrderPersistenceError::user_not_found(8)
        );
    }
}
