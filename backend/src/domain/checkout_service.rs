//! Checkout: cart or explicit line items into a persisted order.
//!
//! The service validates request shape and stamps the order; the order
//! repository owns the all-or-nothing transaction (see
//! [`OrderRepository::place_order`]).

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::order_service::map_order_error;
use crate::domain::ports::{CheckoutCommand, OrderPersistenceError, OrderRepository};
use crate::domain::{
    CheckoutRejection, Error, LineItem, LineSource, Order, OrderStatus, PlaceOrder, UserId,
    merge_line_items,
};

/// Checkout service implementing [`CheckoutCommand`].
#[derive(Clone)]
pub struct CheckoutService<O> {
    orders: Arc<O>,
    clock: Arc<dyn Clock>,
}

impl<O> CheckoutService<O> {
    pub fn new(orders: Arc<O>, clock: Arc<dyn Clock>) -> Self {
        Self { orders, clock }
    }
}

fn map_rejection(rejection: CheckoutRejection, from_cart: bool) -> Error {
    match rejection {
        CheckoutRejection::NoLines if from_cart => Error::empty_cart("cart is empty"),
        CheckoutRejection::NoLines => {
            Error::invalid_request("order must contain at least one line item")
                .with_details(json!({ "field": "lineItems", "code": "empty" }))
        }
        rejection @ CheckoutRejection::InvalidQuantity { .. } => {
            Error::invalid_request(rejection.to_string())
                .with_details(json!({ "field": "quantity", "code": "out_of_range" }))
        }
        rejection @ CheckoutRejection::ProductNotFound { .. } => {
            Error::not_found(rejection.to_string())
        }
        CheckoutRejection::InsufficientStock {
            product_id,
            product_name,
            available,
            requested,
        } => Error::insufficient_stock(format!(
            "insufficient stock for {product_name}: available {available}, requested {requested}"
        ))
        .with_details(json!({
            "productId": product_id.get(),
            "available": available,
            "requested": requested,
        })),
    }
}

impl<O> CheckoutService<O>
where
    O: OrderRepository,
{
    async fn place(&self, user_id: UserId, source: LineSource) -> Result<Order, Error> {
        let from_cart = matches!(source, LineSource::Cart);
        let request = PlaceOrder {
            user_id,
            source,
            placed_at: self.clock.utc(),
            status: OrderStatus::INITIAL,
        };
        let order = self
            .orders
            .place_order(&request)
            .await
            .map_err(|err| match err {
                OrderPersistenceError::Rejected { rejection } => {
                    map_rejection(rejection, from_cart)
                }
                other => map_order_error(other),
            })?;
        info!(
            order_id = %order.id,
            %user_id,
            total = %order.total_amount,
            lines = order.lines.len(),
            from_cart,
            "order placed"
        );
        Ok(order)
    }
}

#[async_trait]
impl<O> CheckoutCommand for CheckoutService<O>
where
    O: OrderRepository,
{
    async fn create_order(&self, user_id: UserId, items: Vec<LineItem>) -> Result<Order, Error> {
        if items.is_empty() {
            return Err(map_rejection(CheckoutRejection::NoLines, false));
        }
        if let Some(bad) = items.iter().find(|item| item.quantity < 1) {
            return Err(map_rejection(
                CheckoutRejection::InvalidQuantity {
                    product_id: bad.product_id,
                    quantity: bad.quantity,
                },
                false,
            ));
        }
        self.place(user_id, LineSource::Explicit(merge_line_items(items)))
            .await
    }

    async fn create_order_from_cart(&self, user_id: UserId) -> Result<Order, Error> {
        self.place(user_id, LineSource::Cart).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockOrderRepository;
    use crate::domain::{ErrorCode, OrderId, ProductId};
    use crate::test_support::MutableClock;
    use bigdecimal::BigDecimal;
    use chrono::{DateTime, TimeZone, Utc};

    fn placed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 4, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn service(orders: MockOrderRepository) -> CheckoutService<MockOrderRepository> {
        CheckoutService::new(Arc::new(orders), Arc::new(MutableClock::new(placed_at())))
    }

    fn empty_order(request: &PlaceOrder) -> Order {
        Order {
            id: OrderId::new(1),
            user_id: request.user_id,
            user_name: "Shopper".to_owned(),
            ordered_at: request.placed_at,
            status: request.status,
            total_amount: BigDecimal::from(0),
            lines: Vec::new(),
        }
    }

    #[tokio::test]
    async fn explicit_lines_are_merged_and_stamped() {
        let mut orders = MockOrderRepository::new();
        orders
            .expect_place_order()
            .withf(|request| {
                request.placed_at == placed_at()
                    && request.status == OrderStatus::Preparing
                    && request.source
                        == LineSource::Explicit(vec![
                            LineItem::new(ProductId::new(1), 3),
                            LineItem::new(ProductId::new(2), 1),
                        ])
            })
            .times(1)
            .return_once(|request| Ok(empty_order(request)));

        let items = vec![
            LineItem::new(ProductId::new(1), 1),
            LineItem::new(ProductId::new(2), 1),
            LineItem::new(ProductId::new(1), 2),
        ];
        let order = service(orders)
            .create_order(UserId::new(3), items)
            .await
            .expect("order placed");
        assert_eq!(order.status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn empty_explicit_list_never_reaches_repository() {
        let mut orders = MockOrderRepository::new();
        orders.expect_place_order().times(0);

        let err = service(orders)
            .create_order(UserId::new(3), Vec::new())
            .await
            .expect_err("empty");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected_up_front() {
        let mut orders = MockOrderRepository::new();
        orders.expect_place_order().times(0);

        let err = service(orders)
            .create_order(UserId::new(3), vec![LineItem::new(ProductId::new(1), 0)])
            .await
            .expect_err("zero quantity");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn empty_cart_maps_to_empty_cart() {
        let mut orders = MockOrderRepository::new();
        orders.expect_place_order().return_once(|_| {
            Err(OrderPersistenceError::rejected(CheckoutRejection::NoLines))
        });

        let err = service(orders)
            .create_order_from_cart(UserId::new(3))
            .await
            .expect_err("empty cart");
        assert_eq!(err.code(), ErrorCode::EmptyCart);
    }

    #[tokio::test]
    async fn stock_rejection_names_the_product() {
        let mut orders = MockOrderRepository::new();
        orders.expect_place_order().return_once(|_| {
            Err(OrderPersistenceError::rejected(
                CheckoutRejection::InsufficientStock {
                    product_id: ProductId::new(2),
                    product_name: "Elma Sirkesi".to_owned(),
                    available: 1,
                    requested: 4,
                },
            ))
        });

        let err = service(orders)
            .create_order_from_cart(UserId::new(3))
            .await
            .expect_err("short stock");
        assert_eq!(err.code(), ErrorCode::InsufficientStock);
        assert_eq!(
            err.message(),
            "insufficient stock for Elma Sirkesi: available 1, requested 4"
        );
    }
}
