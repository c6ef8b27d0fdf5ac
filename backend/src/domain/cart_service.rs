//! Cart management with stock validation.
//!
//! Every add or update re-checks the requested line total against the
//! product's current stock before the single-statement upsert in the cart
//! repository runs. A rejected call leaves the cart untouched.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    CartCommand, CartPersistenceError, CartQuery, CartRepository, ProductPersistenceError,
    ProductRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{CartItem, CartUpdate, Error, Product, ProductId, UserId};

/// Cart service implementing [`CartQuery`] and [`CartCommand`].
#[derive(Clone)]
pub struct CartService<C, P, U> {
    carts: Arc<C>,
    products: Arc<P>,
    users: Arc<U>,
}

impl<C, P, U> CartService<C, P, U> {
    pub fn new(carts: Arc<C>, products: Arc<P>, users: Arc<U>) -> Self {
        Self {
            carts,
            products,
            users,
        }
    }
}

fn map_cart_error(error: CartPersistenceError) -> Error {
    match error {
        CartPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("cart repository unavailable: {message}"))
        }
        CartPersistenceError::Query { message } => {
            Error::internal(format!("cart repository error: {message}"))
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
            Error::internal(format!("product references missing category {id}"))
        }
        ProductPersistenceError::Ordered { id } => {
            Error::internal(format!("unexpected order history conflict on product {id}"))
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message }
        | UserPersistenceError::DuplicateEmail { email: message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn invalid_quantity(quantity: i32) -> Error {
    Error::invalid_request(format!("quantity must be at least 1, got {quantity}"))
        .with_details(json!({ "field": "quantity", "code": "out_of_range" }))
}

/// Reject `requested` units when the product cannot cover them.
pub(crate) fn ensure_stock(product: &Product, requested: i32) -> Result<(), Error> {
    if product.stock >= requested {
        return Ok(());
    }
    Err(Error::insufficient_stock(format!(
        "insufficient stock for {}: available {}, requested {requested}",
        product.name, product.stock
    ))
    .with_details(json!({
        "productId": product.id.get(),
        "available": product.stock,
        "requested": requested,
    })))
}

impl<C, P, U> CartService<C, P, U>
where
    C: CartRepository,
    P: ProductRepository,
    U: UserRepository,
{
    async fn require_product(&self, id: ProductId) -> Result<Product, Error> {
        self.products
            .find_by_id(id)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))
    }

    async fn require_user(&self, id: UserId) -> Result<(), Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }
}

#[async_trait]
impl<C, P, U> CartQuery for CartService<C, P, U>
where
    C: CartRepository,
    P: ProductRepository,
    U: UserRepository,
{
    async fn get_cart_items(&self, user_id: UserId) -> Result<Vec<CartItem>, Error> {
        self.carts.list_items(user_id).await.map_err(map_cart_error)
    }
}

#[async_trait]
impl<C, P, U> CartCommand for CartService<C, P, U>
where
    C: CartRepository,
    P: ProductRepository,
    U: UserRepository,
{
    async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, Error> {
        if quantity < 1 {
            return Err(invalid_quantity(quantity));
        }
        self.require_user(user_id).await?;
        let product = self.require_product(product_id).await?;
        if !product.active {
            return Err(Error::inactive_product(format!(
                "product {} is not available",
                product.name
            )));
        }

        let existing = self
            .carts
            .find_line(user_id, product_id)
            .await
            .map_err(map_cart_error)?
            .map_or(0, |line| line.quantity);
        let requested = existing
            .checked_add(quantity)
            .ok_or_else(|| invalid_quantity(quantity))?;
        ensure_stock(&product, requested)?;

        let item = self
            .carts
            .save_line(user_id, product_id, requested)
            .await
            .map_err(map_cart_error)?;
        debug!(%user_id, %product_id, quantity = requested, "cart line saved");
        Ok(item)
    }

    async fn update_cart_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartUpdate, Error> {
        if quantity <= 0 {
            self.remove_from_cart(user_id, product_id).await?;
            return Ok(CartUpdate::Removed);
        }

        self.carts
            .find_line(user_id, product_id)
            .await
            .map_err(map_cart_error)?
            .ok_or_else(|| {
                Error::not_found(format!("product {product_id} is not in the cart"))
            })?;
        let product = self.require_product(product_id).await?;
        ensure_stock(&product, quantity)?;

        let item = self
            .carts
            .save_line(user_id, product_id, quantity)
            .await
            .map_err(map_cart_error)?;
        Ok(CartUpdate::Updated(item))
    }

    async fn remove_from_cart(&self, user_id: UserId, product_id: ProductId) -> Result<(), Error> {
        let removed = self
            .carts
            .remove_line(user_id, product_id)
            .await
            .map_err(map_cart_error)?;
        if !removed {
            return Err(Error::not_found(format!(
                "product {product_id} is not in the cart"
            )));
        }
        Ok(())
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<(), Error> {
        let removed = self.carts.clear(user_id).await.map_err(map_cart_error)?;
        info!(%user_id, removed, "cart cleared");
        Ok(())
    }
}

#[cfg(test)]
#[path = "cart_service_tests.rs"]
mod tests;
