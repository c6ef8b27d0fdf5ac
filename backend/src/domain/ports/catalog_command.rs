//! Driving port for catalog administration.

use async_trait::async_trait;

use crate::domain::{
    Category, CategoryDraft, CategoryId, CategoryPatch, Error, Product, ProductDraft, ProductId,
    ProductPatch,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogCommand: Send + Sync {
    async fn create_category(&self, draft: CategoryDraft) -> Result<Category, Error>;

    async fn update_category(&self, id: CategoryId, patch: CategoryPatch)
    -> Result<Category, Error>;

    async fn delete_category(&self, id: CategoryId) -> Result<(), Error>;

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, Error>;

    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product, Error>;

    async fn delete_product(&self, id: ProductId) -> Result<(), Error>;
}
