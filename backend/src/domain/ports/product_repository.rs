//! Port abstraction for product persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Product, ProductDraft, ProductFilter, ProductId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by product repository adapters.
    pub enum ProductPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "product repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "product repository query failed: {message}",
        /// The referenced category does not exist.
        CategoryMissing { id: i64 } => "category {id} not found",
        /// The product is referenced by placed orders.
        Ordered { id: i64 } => "product {id} appears in placed orders",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Products matching the filter, ordered by id.
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ProductPersistenceError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, ProductPersistenceError>;

    /// Insert a product; `now` stamps both creation and update times.
    async fn insert(
        &self,
        draft: &ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Product, ProductPersistenceError>;

    /// Overwrite every writable field; `None` when the id is unknown.
    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductPersistenceError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: ProductId) -> Result<bool, ProductPersistenceError>;

    async fn count(&self) -> Result<i64, ProductPersistenceError>;
}
