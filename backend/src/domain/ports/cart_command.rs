//! Driving port for cart mutations.

use async_trait::async_trait;

use crate::domain::{CartItem, CartUpdate, Error, ProductId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartCommand: Send + Sync {
    /// Add `quantity` to the (user, product) line, creating it if needed.
    async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, Error>;

    /// Overwrite a line's quantity; non-positive quantities remove it.
    async fn update_cart_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartUpdate, Error>;

    async fn remove_from_cart(&self, user_id: UserId, product_id: ProductId) -> Result<(), Error>;

    async fn clear_cart(&self, user_id: UserId) -> Result<(), Error>;
}
