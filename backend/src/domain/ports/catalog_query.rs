//! Driving port for catalog reads.

use async_trait::async_trait;

use crate::domain::{Category, CategoryId, Error, Product, ProductFilter, ProductId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, Error>;

    async fn get_category(&self, id: CategoryId) -> Result<Category, Error>;

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, Error>;

    async fn get_product(&self, id: ProductId) -> Result<Product, Error>;
}
