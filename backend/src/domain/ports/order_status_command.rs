//! Driving port for order lifecycle changes.

use async_trait::async_trait;

use crate::domain::{Error, Order, OrderId, OrderStatus};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderStatusCommand: Send + Sync {
    /// Overwrite an order's status with `status`.
    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, Error>;

    /// Normalise legacy status values; returns the number of rows changed.
    async fn migrate_order_statuses(&self) -> Result<u64, Error>;
}
