//! Order queries and status lifecycle.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    OrderPersistenceError, OrderRepository, OrderStatusCommand, OrdersQuery,
};
use crate::domain::{Error, Identity, Order, OrderId, OrderStatus, UserId};

/// Order service implementing [`OrdersQuery`] and [`OrderStatusCommand`].
#[derive(Clone)]
pub struct OrderService<O> {
    orders: Arc<O>,
}

impl<O> OrderService<O> {
    pub fn new(orders: Arc<O>) -> Self {
        Self { orders }
    }
}

pub(crate) fn map_order_error(error: OrderPersistenceError) -> Error {
    match error {
        OrderPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("order repository unavailable: {message}"))
        }
        OrderPersistenceError::Query { message } => {
            Error::internal(format!("order repository error: {message}"))
        }
        OrderPersistenceError::UserNotFound { id } => {
            Error::not_found(format!("user {id} not found"))
        }
        OrderPersistenceError::Rejected { rejection } => {
            Error::invalid_request(rejection.to_string())
        }
    }
}

fn order_not_found(id: OrderId) -> Error {
    Error::not_found(format!("order {id} not found"))
}

#[async_trait]
impl<O> OrdersQuery for OrderService<O>
where
    O: OrderRepository,
{
    async fn list_orders(&self) -> Result<Vec<Order>, Error> {
        self.orders.list_all().await.map_err(map_order_error)
    }

    async fn list_user_orders(&self, user_id: UserId) -> Result<Vec<Order>, Error> {
        self.orders
            .list_for_user(user_id)
            .await
            .map_err(map_order_error)
    }

    async fn get_order(&self, viewer: &Identity, id: OrderId) -> Result<Order, Error> {
        let order = self
            .orders
            .find_by_id(id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| order_not_found(id))?;
        // Hide existence of other users' orders.
        if order.user_id != viewer.user_id && !viewer.is_admin() {
            return Err(order_not_found(id));
        }
        Ok(order)
    }
}

#[async_trait]
impl<O> OrderStatusCommand for OrderService<O>
where
    O: OrderRepository,
{
    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, Error> {
        let current = self
            .orders
            .find_by_id(id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| order_not_found(id))?;
        if current.status == status {
            return Ok(current);
        }
        if !current.status.follows_lifecycle(status) {
            warn!(
                order_id = %id,
                from = %current.status,
                to = %status,
                "order status moved against the usual lifecycle"
            );
        }

        let updated = self
            .orders
            .update_status(id, status)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| order_not_found(id))?;
        info!(order_id = %id, from = %current.status, to = %status, "order status updated");
        Ok(updated)
    }

    async fn migrate_order_statuses(&self) -> Result<u64, Error> {
        let changed = self
            .orders
            .migrate_statuses()
            .await
            .map_err(map_order_error)?;
        info!(changed, "order statuses migrated");
        Ok(changed)
    }
}
