//! Driving port for reading a user's cart.

use async_trait::async_trait;

use crate::domain::{CartItem, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartQuery: Send + Sync {
    async fn get_cart_items(&self, user_id: UserId) -> Result<Vec<CartItem>, Error>;
}
