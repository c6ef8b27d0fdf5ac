//! Driving port for turning line items into orders.

use async_trait::async_trait;

use crate::domain::{Error, LineItem, Order, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckoutCommand: Send + Sync {
    /// Order caller-supplied lines. The total is always computed here.
    async fn create_order(&self, user_id: UserId, items: Vec<LineItem>) -> Result<Order, Error>;

    /// Order the contents of the user's cart.
    async fn create_order_from_cart(&self, user_id: UserId) -> Result<Order, Error>;
}
