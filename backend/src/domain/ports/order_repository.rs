//! Port abstraction for order persistence, including atomic checkout.

use async_trait::async_trait;

use crate::domain::{CheckoutRejection, Order, OrderId, OrderStatus, PlaceOrder, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by order repository adapters.
    pub enum OrderPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order repository query failed: {message}",
        /// The ordering user does not exist.
        UserNotFound { id: i64 } => "user {id} not found",
        /// The line items failed validation; nothing was written.
        Rejected { rejection: CheckoutRejection } => "{rejection}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Place an order in one transaction.
    ///
    /// Implementations lock the referenced product rows, validate the lines
    /// with [`crate::domain::CheckoutPlan::build`], decrement stock, insert
    /// the order and its lines, and clear the user's cart. Any failure rolls
    /// the whole unit back.
    async fn place_order(&self, request: &PlaceOrder) -> Result<Order, OrderPersistenceError>;

    /// Every order, newest first.
    async fn list_all(&self) -> Result<Vec<Order>, OrderPersistenceError>;

    /// The user's orders, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderPersistenceError>;

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderPersistenceError>;

    /// Overwrite the status; `None` when the id is unknown.
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderPersistenceError>;

    /// Rewrite non-canonical stored statuses using
    /// [`OrderStatus::migrate_legacy`]; returns the number of rows changed.
    async fn migrate_statuses(&self) -> Result<u64, OrderPersistenceError>;
}
