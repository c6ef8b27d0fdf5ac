//! Catalog reads and administration.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    CatalogCommand, CatalogQuery, CategoryPersistenceError, CategoryRepository,
    ProductPersistenceError, ProductRepository,
};
use crate::domain::{
    CatalogValidationError, Category, CategoryDraft, CategoryId, CategoryPatch, Error, Product,
    ProductDraft, ProductFilter, ProductId, ProductPatch,
};
use serde_json::json;

/// Catalog service implementing [`CatalogQuery`] and [`CatalogCommand`].
#[derive(Clone)]
pub struct CatalogService<C, P> {
    categories: Arc<C>,
    products: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<C, P> CatalogService<C, P> {
    pub fn new(categories: Arc<C>, products: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            categories,
            products,
            clock,
        }
    }
}

/// Translate a draft or patch validation failure into a request error.
pub(crate) fn validation_error(error: CatalogValidationError) -> Error {
    let field = error.field();
    Error::invalid_request(error.to_string())
        .with_details(json!({ "field": field, "code": "invalid_value" }))
}

fn map_category_error(error: CategoryPersistenceError) -> Error {
    match error {
        CategoryPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("category repository unavailable: {message}"))
        }
        CategoryPersistenceError::Query { message } => {
            Error::internal(format!("category repository error: {message}"))
        }
        CategoryPersistenceError::DuplicateName { name } => {
            Error::duplicate_name(format!("category name {name} is already taken"))
        }
        CategoryPersistenceError::InUse { id } => {
            Error::conflict(format!("category {id} still has products"))
        }
    }
}

fn map_product_error(error: ProductPersistenceError) -> Error {
    match error {
        ProductPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("product repository unavailable: {message}"))
        }
        ProductPersistenceError::Query { message } => {
            Error::internal(format!("product repository error: {message}"))
        }
        ProductPersistenceError::CategoryMissing { id } => {
            Error::not_found(format!("category {id} not found"))
        }
        ProductPersistenceError::Ordered { id } => {
            Error::conflict(format!("product {id} appears in placed orders"))
        }
    }
}

fn category_not_found(id: CategoryId) -> Error {
    Error::not_found(format!("category {id} not found"))
}

fn product_not_found(id: ProductId) -> Error {
    Error::not_found(format!("product {id} not found"))
}

impl<C, P> CatalogService<C, P>
where
    C: CategoryRepository,
    P: ProductRepository,
{
    async fn require_category(&self, id: CategoryId) -> Result<Category, Error> {
        self.categories
            .find_by_id(id)
            .await
            .map_err(map_category_error)?
            .ok_or_else(|| category_not_found(id))
    }

    async fn require_product(&self, id: ProductId) -> Result<Product, Error> {
        self.products
            .find_by_id(id)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| product_not_found(id))
    }
}

#[async_trait]
impl<C, P> CatalogQuery for CatalogService<C, P>
where
    C: CategoryRepository,
    P: ProductRepository,
{
    async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        self.categories
            .list_active()
            .await
            .map_err(map_category_error)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Category, Error> {
        self.require_category(id).await
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, Error> {
        self.products.list(filter).await.map_err(map_product_error)
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, Error> {
        self.require_product(id).await
    }
}

#[async_trait]
impl<C, P> CatalogCommand for CatalogService<C, P>
where
    C: CategoryRepository,
    P: ProductRepository,
{
    async fn create_category(&self, draft: CategoryDraft) -> Result<Category, Error> {
        let category = self
            .categories
            .insert(&draft, self.clock.utc())
            .await
            .map_err(map_category_error)?;
        info!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> Result<Category, Error> {
        let current = self.require_category(id).await?;
        let draft = patch.apply(&current).map_err(validation_error)?;
        self.categories
            .update(id, &draft)
            .await
            .map_err(map_category_error)?
            .ok_or_else(|| category_not_found(id))
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), Error> {
        let deleted = self
            .categories
            .delete(id)
            .await
            .map_err(map_category_error)?;
        if !deleted {
            return Err(category_not_found(id));
        }
        info!(category_id = %id, "category deleted");
        Ok(())
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, Error> {
        self.require_category(draft.category_id).await?;
        let product = self
            .products
            .insert(&draft, self.clock.utc())
            .await
            .map_err(map_product_error)?;
        info!(product_id = %product.id, name = %product.name, "product created");
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product, Error> {
        let current = self.require_product(id).await?;
        let draft = patch.apply(&current).map_err(validation_error)?;
        if draft.category_id != current.category_id {
            self.require_category(draft.category_id).await?;
        }
        self.products
            .update(id, &draft, self.clock.utc())
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| product_not_found(id))
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), Error> {
        let deleted = self.products.delete(id).await.map_err(map_product_error)?;
        if !deleted {
            return Err(product_not_found(id));
        }
        info!(product_id = %id, "product deleted");
        Ok(())
    }
}
