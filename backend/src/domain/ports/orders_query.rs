//! Driving port for reading orders.

use async_trait::async_trait;

use crate::domain::{Error, Identity, Order, OrderId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrdersQuery: Send + Sync {
    /// Every order, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, Error>;

    /// The user's orders, newest first.
    async fn list_user_orders(&self, user_id: UserId) -> Result<Vec<Order>, Error>;

    /// Fetch one order visible to `viewer`. Orders owned by someone else are
    /// reported as missing unless the viewer is an admin.
    async fn get_order(&self, viewer: &Identity, id: OrderId) -> Result<Order, Error>;
}
