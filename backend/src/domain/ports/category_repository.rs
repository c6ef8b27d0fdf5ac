//! Port abstraction for category persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Category, CategoryDraft, CategoryId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by category repository adapters.
    pub enum CategoryPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "category repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "category repository query failed: {message}",
        /// Another category already uses the name.
        DuplicateName { name: String } => "category name {name} is already taken",
        /// The category still owns products and cannot be deleted.
        InUse { id: i64 } => "category {id} still has products",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Active categories ordered by name.
    async fn list_active(&self) -> Result<Vec<Category>, CategoryPersistenceError>;

    async fn find_by_id(&self, id: CategoryId)
    -> Result<Option<Category>, CategoryPersistenceError>;

    async fn insert(
        &self,
        draft: &CategoryDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Category, CategoryPersistenceError>;

    /// Overwrite every writable field; `None` when the id is unknown.
    async fn update(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
    ) -> Result<Option<Category>, CategoryPersistenceError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: CategoryId) -> Result<bool, CategoryPersistenceError>;

    async fn count(&self) -> Result<i64, CategoryPersistenceError>;
}
