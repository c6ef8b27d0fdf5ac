//! Order handlers.
//!
//! ```text
//! POST /api/orders {"lineItems":[{"productId":3,"quantity":2}]}
//! POST /api/orders/from-cart
//! PUT  /api/orders/7/status {"status":"shipped"}
//! ```
//!
//! `my-orders` must be registered before `{id}` so the literal segment is not
//! parsed as an id.

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, LineItem, Order, OrderId, OrderLine, OrderStatus, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cart::LineItemRequest;
use crate::inbound::http::identity::{AdminIdentity, Authenticated};
use crate::inbound::http::money::format_money;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    #[schema(example = "65.00")]
    pub unit_price: String,
    #[schema(example = "195.00")]
    pub subtotal: String,
}

impl From<OrderLine> for OrderLineView {
    fn from(line: OrderLine) -> Self {
        Self {
            subtotal: format_money(&line.subtotal()),
            unit_price: format_money(&line.unit_price),
            id: line.id,
            product_id: line.product_id.get(),
            product_name: line.product_name,
            quantity: line.quantity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub ordered_at: DateTime<Utc>,
    pub status: OrderStatus,
    #[schema(example = "195.00")]
    pub total_amount: String,
    pub lines: Vec<OrderLineView>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.get(),
            user_id: order.user_id.get(),
            user_name: order.user_name,
            ordered_at: order.ordered_at,
            status: order.status,
            total_amount: format_money(&order.total_amount),
            lines: order.lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub line_items: Vec<LineItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    #[schema(example = "shipped")]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MigrationReport {
    pub updated: u64,
}

fn parse_status(raw: &str) -> Result<OrderStatus, Error> {
    raw.trim().parse::<OrderStatus>().map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "status", "code": "unknown_status" }))
    })
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderView),
        (status = 400, description = "Empty list, bad quantity or inactive product", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Insufficient stock", body = Error)
    ),
    tags = ["orders"],
    operation_id = "createOrder"
)]
#[post("/orders")]
pub async fn create_order(
    who: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<CreateOrderRequest>,
) -> ApiResult<HttpResponse> {
    let items = payload
        .into_inner()
        .line_items
        .into_iter()
        .map(|line| LineItem::new(ProductId::new(line.product_id), line.quantity))
        .collect();
    let order = state
        .checkout
        .create_order(who.identity().user_id, items)
        .await?;
    Ok(HttpResponse::Created().json(OrderView::from(order)))
}

#[utoipa::path(
    post,
    path = "/api/orders/from-cart",
    responses(
        (status = 201, description = "Cart converted into an order", body = OrderView),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Empty cart or insufficient stock", body = Error)
    ),
    tags = ["orders"],
    operation_id = "createOrderFromCart"
)]
#[post("/orders/from-cart")]
pub async fn create_order_from_cart(
    who: Authenticated,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let order = state
        .checkout
        .create_order_from_cart(who.identity().user_id)
        .await?;
    Ok(HttpResponse::Created().json(OrderView::from(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders/my-orders",
    responses(
        (status = 200, description = "Caller's orders, newest first", body = [OrderView]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listMyOrders"
)]
#[get("/orders/my-orders")]
pub async fn my_orders(
    who: Authenticated,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<OrderView>>> {
    let orders = state.orders.list_user_orders(who.identity().user_id).await?;
    Ok(web::Json(orders.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "All orders, newest first", body = [OrderView]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/orders")]
pub async fn list_orders(
    _admin: AdminIdentity,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<OrderView>>> {
    let orders = state.orders.list_orders().await?;
    Ok(web::Json(orders.into_iter().map(Into::into).collect()))
}

/// Fetch one order. Shoppers only see their own; others answer `404`.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderView),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown order", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    who: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<OrderView>> {
    let order = state
        .orders
        .get_order(who.identity(), OrderId::new(path.into_inner()))
        .await?;
    Ok(web::Json(order.into()))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(("id" = i64, Path, description = "Order id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Order with its new status", body = OrderView),
        (status = 400, description = "Unknown status", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown order", body = Error)
    ),
    tags = ["orders"],
    operation_id = "updateOrderStatus"
)]
#[put("/orders/{id}/status")]
pub async fn update_order_status(
    _admin: AdminIdentity,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<UpdateStatusRequest>,
) -> ApiResult<web::Json<OrderView>> {
    let status = parse_status(&payload.status)?;
    let order = state
        .order_status
        .update_order_status(OrderId::new(path.into_inner()), status)
        .await?;
    Ok(web::Json(order.into()))
}

#[utoipa::path(
    post,
    path = "/api/orders/migrate-statuses",
    responses(
        (status = 200, description = "Number of rows rewritten", body = MigrationReport),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["orders"],
    operation_id = "migrateOrderStatuses"
)]
#[post("/orders/migrate-statuses")]
pub async fn migrate_statuses(
    _admin: AdminIdentity,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<MigrationReport>> {
    let updated = state.order_status.migrate_order_statuses().await?;
    Ok(web::Json(MigrationReport { updated }))
}
