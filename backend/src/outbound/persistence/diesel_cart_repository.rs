//! PostgreSQL-backed [`CartRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CartPersistenceError, CartRepository};
use crate::domain::{CartItem, CartLine, ProductId, UserId};

use super::diesel_error_mapping::DbFailure;
use super::diesel_product_repository::row_to_product;
use super::models::{CartLineRow, NewCartLineRow, ProductRow};
use super::pool::DbPool;
use super::schema::{cart_lines, categories, products};

#[derive(Clone)]
pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: impl Into<DbFailure>) -> CartPersistenceError {
    match error.into() {
        DbFailure::Connection(message) => CartPersistenceError::connection(message),
        other => CartPersistenceError::query(other.message()),
    }
}

fn row_to_line(row: CartLineRow) -> CartLine {
    CartLine {
        id: row.id,
        user_id: UserId::new(row.user_id),
        product_id: ProductId::new(row.product_id),
        quantity: row.quantity,
    }
}

type CartItemRow = (CartLineRow, ProductRow, String);

fn row_to_item((line, product, category): CartItemRow) -> CartItem {
    CartItem {
        line_id: line.id,
        quantity: line.quantity,
        product: row_to_product(product, category),
    }
}

#[async_trait]
impl CartRepository for DieselCartRepository {
    async fn list_items(&self, user_id: UserId) -> Result<Vec<CartItem>, CartPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let rows: Vec<CartItemRow> = cart_lines::table
            .inner_join(products::table.inner_join(categories::table))
            .filter(cart_lines::user_id.eq(user_id.get()))
            .order_by(cart_lines::id)
            .select((
                CartLineRow::as_select(),
                ProductRow::as_select(),
                categories::name,
            ))
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(rows.into_iter().map(row_to_item).collect())
    }

    async fn find_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>, CartPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let row = cart_lines::table
            .filter(cart_lines::user_id.eq(user_id.get()))
            .filter(cart_lines::product_id.eq(product_id.get()))
            .select(CartLineRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;
        Ok(row.map(row_to_line))
    }

    async fn save_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, CartPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let line_id: i64 = diesel::insert_into(cart_lines::table)
            .values(NewCartLineRow {
                user_id: user_id.get(),
                product_id: product_id.get(),
                quantity,
            })
            .on_conflict((cart_lines::user_id, cart_lines::product_id))
            .do_update()
            .set(cart_lines::quantity.eq(excluded(cart_lines::quantity)))
            .returning(cart_lines::id)
            .get_result(&mut conn)
            .await
            .map_err(map_error)?;

        let row: CartItemRow = cart_lines::table
            .inner_join(products::table.inner_join(categories::table))
            .filter(cart_lines::id.eq(line_id))
            .select((
                CartLineRow::as_select(),
                ProductRow::as_select(),
                categories::name,
            ))
            .first(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(row_to_item(row))
    }

    async fn remove_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, CartPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let removed = diesel::delete(
            cart_lines::table
                .filter(cart_lines::user_id.eq(user_id.get()))
                .filter(cart_lines::product_id.eq(product_id.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_error)?;
        Ok(removed > 0)
    }

    async fn clear(&self, user_id: UserId) -> Result<usize, CartPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        diesel::delete(cart_lines::table.filter(cart_lines::user_id.eq(user_id.get())))
            .execute(&mut conn)
            .await
            .map_err(map_error)
    }
}
