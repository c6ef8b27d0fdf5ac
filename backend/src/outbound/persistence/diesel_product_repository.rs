//! PostgreSQL-backed [`ProductRepository`].
//!
//! Every read joins `categories` so products carry their category name.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{ProductPersistenceError, ProductRepository};
use crate::domain::{CategoryId, Product, ProductDraft, ProductFilter, ProductId};

use super::diesel_error_mapping::DbFailure;
use super::models::{NewProductRow, ProductChanges, ProductRow};
use super::pool::DbPool;
use super::schema::{categories, products};

#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: impl Into<DbFailure>) -> ProductPersistenceError {
    match error.into() {
        DbFailure::Connection(message) => ProductPersistenceError::connection(message),
        other => ProductPersistenceError::query(other.message()),
    }
}

/// Writes fail on a foreign key when the target category is gone.
fn map_write_error(error: diesel::result::Error, category_id: CategoryId) -> ProductPersistenceError {
    match DbFailure::from(error) {
        DbFailure::ForeignKeyViolation { .. } => {
            ProductPersistenceError::category_missing(category_id.get())
        }
        other => map_error(other),
    }
}

/// Escape `LIKE` metacharacters and wrap the term for a substring match.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

pub(crate) fn row_to_product(row: ProductRow, category_name: String) -> Product {
    Product {
        id: ProductId::new(row.id),
        name: row.name,
        price: row.price,
        description: row.description,
        image_url: row.image_url,
        stock: row.stock,
        active: row.active,
        category_id: CategoryId::new(row.category_id),
        category_name,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Load one product with its category name on an existing connection.
pub(crate) async fn load_product(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> QueryResult<Option<Product>> {
    let row: Option<(ProductRow, String)> = products::table
        .inner_join(categories::table)
        .filter(products::id.eq(id))
        .select((ProductRow::as_select(), categories::name))
        .first(conn)
        .await
        .optional()?;
    Ok(row.map(|(product, category)| row_to_product(product, category)))
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let mut query = products::table
            .inner_join(categories::table)
            .filter(products::active.eq(true))
            .select((ProductRow::as_select(), categories::name))
            .order_by(products::id)
            .into_boxed();
        match filter {
            ProductFilter::Active => {}
            ProductFilter::Category(category_id) => {
                query = query.filter(products::category_id.eq(category_id.get()));
            }
            ProductFilter::Search(term) => {
                let pattern = contains_pattern(term.trim());
                query = query.filter(
                    products::name
                        .ilike(pattern.clone())
                        .or(products::description.ilike(pattern)),
                );
            }
        }
        let rows: Vec<(ProductRow, String)> = query.load(&mut conn).await.map_err(map_error)?;
        Ok(rows
            .into_iter()
            .map(|(product, category)| row_to_product(product, category))
            .collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        load_product(&mut conn, id.get()).await.map_err(map_error)
    }

    async fn insert(
        &self,
        draft: &ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Product, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let id: i64 = diesel::insert_into(products::table)
            .values(NewProductRow {
                name: &draft.name,
                price: &draft.price,
                description: draft.description.as_deref(),
                image_url: draft.image_url.as_deref(),
                stock: draft.stock,
                active: draft.active,
                category_id: draft.category_id.get(),
                created_at: now,
                updated_at: now,
            })
            .returning(products::id)
            .get_result(&mut conn)
            .await
            .map_err(|err| map_write_error(err, draft.category_id))?;
        load_product(&mut conn, id)
            .await
            .map_err(map_error)?
            .ok_or_else(|| ProductPersistenceError::query(format!("product {id} vanished")))
    }

    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let updated = diesel::update(products::table.find(id.get()))
            .set(ProductChanges {
                name: &draft.name,
                price: &draft.price,
                description: draft.description.as_deref(),
                image_url: draft.image_url.as_deref(),
                stock: draft.stock,
                active: draft.active,
                category_id: draft.category_id.get(),
                updated_at: now,
            })
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, draft.category_id))?;
        if updated == 0 {
            return Ok(None);
        }
        load_product(&mut conn, id.get()).await.map_err(map_error)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let deleted = diesel::delete(products::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| match DbFailure::from(err) {
                DbFailure::ForeignKeyViolation { .. } => ProductPersistenceError::ordered(id.get()),
                other => map_error(other),
            })?;
        Ok(deleted > 0)
    }

    async fn count(&self) -> Result<i64, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        products::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bal", "%bal%")]
    #[case("50%", "%50\\%%")]
    #[case("a_b", "%a\\_b%")]
    #[case("c:\\", "%c:\\\\%")]
    fn search_terms_are_escaped(#[case] term: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(term), expected);
    }

    #[test]
    fn write_fk_violation_reports_missing_category() {
        let err = map_write_error(
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                Box::new("products_category_id_fkey".to_owned()),
            ),
            CategoryId::new(9),
        );
        assert_eq!(err, ProductPersistenceError::category_missing(9));
    }
}
