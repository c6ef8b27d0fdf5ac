//! Port abstraction for cart line persistence.

use async_trait::async_trait;

use crate::domain::{CartItem, CartLine, ProductId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by cart repository adapters.
    pub enum CartPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "cart repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "cart repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Lines of the user's cart with product snapshots, oldest line first.
    async fn list_items(&self, user_id: UserId) -> Result<Vec<CartItem>, CartPersistenceError>;

    async fn find_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>, CartPersistenceError>;

    /// Create the (user, product) line or overwrite its quantity in a single
    /// statement.
    async fn save_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, CartPersistenceError>;

    /// Returns `false` when no line existed.
    async fn remove_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, CartPersistenceError>;

    /// Delete every line; returns how many were removed.
    async fn clear(&self, user_id: UserId) -> Result<usize, CartPersistenceError>;
}
