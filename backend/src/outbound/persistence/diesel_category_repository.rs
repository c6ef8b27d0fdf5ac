//! PostgreSQL-backed [`CategoryRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CategoryPersistenceError, CategoryRepository};
use crate::domain::{Category, CategoryDraft, CategoryId};

use super::diesel_error_mapping::DbFailure;
use super::models::{CategoryChanges, CategoryRow, NewCategoryRow};
use super::pool::DbPool;
use super::schema::categories;

#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: DbPool,
}

impl DieselCategoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a storage failure; `draft`/`id` name the row for constraint errors.
fn map_failure(
    failure: DbFailure,
    draft: Option<&CategoryDraft>,
    id: Option<CategoryId>,
) -> CategoryPersistenceError {
    match (failure, draft, id) {
        (DbFailure::Connection(message), _, _) => CategoryPersistenceError::connection(message),
        (DbFailure::UniqueViolation { .. }, Some(draft), _) => {
            CategoryPersistenceError::duplicate_name(draft.name.clone())
        }
        (DbFailure::ForeignKeyViolation { .. }, _, Some(id)) => {
            CategoryPersistenceError::in_use(id.get())
        }
        (other, _, _) => CategoryPersistenceError::query(other.message()),
    }
}

fn map_error(error: impl Into<DbFailure>) -> CategoryPersistenceError {
    map_failure(error.into(), None, None)
}

fn row_to_category(row: CategoryRow) -> Category {
    Category {
        id: CategoryId::new(row.id),
        name: row.name,
        description: row.description,
        icon: row.icon,
        active: row.active,
        created_at: row.created_at,
    }
}

#[async_trait]
impl CategoryRepository for DieselCategoryRepository {
    async fn list_active(&self) -> Result<Vec<Category>, CategoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let rows: Vec<CategoryRow> = categories::table
            .filter(categories::active.eq(true))
            .order_by((categories::name, categories::id))
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(rows.into_iter().map(row_to_category).collect())
    }

    async fn find_by_id(
        &self,
        id: CategoryId,
    ) -> Result<Option<Category>, CategoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let row = categories::table
            .find(id.get())
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;
        Ok(row.map(row_to_category))
    }

    async fn insert(
        &self,
        draft: &CategoryDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Category, CategoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let row = diesel::insert_into(categories::table)
            .values(NewCategoryRow {
                name: &draft.name,
                description: draft.description.as_deref(),
                icon: draft.icon.as_deref(),
                active: draft.active,
                created_at,
            })
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_failure(err.into(), Some(draft), None))?;
        Ok(row_to_category(row))
    }

    async fn update(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
    ) -> Result<Option<Category>, CategoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let row = diesel::update(categories::table.find(id.get()))
            .set(CategoryChanges {
                name: &draft.name,
                description: draft.description.as_deref(),
                icon: draft.icon.as_deref(),
                active: draft.active,
            })
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(err.into(), Some(draft), Some(id)))?;
        Ok(row.map(row_to_category))
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, CategoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let deleted = diesel::delete(categories::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(err.into(), None, Some(id)))?;
        Ok(deleted > 0)
    }

    async fn count(&self) -> Result<i64, CategoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        categories::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CategoryDraft {
        CategoryDraft::try_new("Bal", None, None, true).expect("draft")
    }

    #[test]
    fn unique_violation_names_the_category() {
        let err = map_failure(
            DbFailure::UniqueViolation { constraint: None },
            Some(&draft()),
            None,
        );
        assert_eq!(err, CategoryPersistenceError::duplicate_name("Bal"));
    }

    #[test]
    fn foreign_key_violation_on_delete_means_in_use() {
        let err = map_failure(
            DbFailure::ForeignKeyViolation { constraint: None },
            None,
            Some(CategoryId::new(4)),
        );
        assert_eq!(err, CategoryPersistenceError::in_use(4));
    }
}
