//! Cart handlers. The cart owner is always the bearer token's subject.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CartItem, CartUpdate, Error, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::Authenticated;
use crate::inbound::http::money::format_money;
use crate::inbound::http::products::ProductView;
use crate::inbound::http::state::HttpState;

/// `{productId, quantity}` pair used by cart and order requests.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    #[schema(example = 3)]
    pub product_id: i64,
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: i64,
    pub quantity: i32,
    #[schema(example = "195.00")]
    pub subtotal: String,
    pub product: ProductView,
}

impl From<CartItem> for CartItemView {
    fn from(item: CartItem) -> Self {
        let subtotal = &item.product.price * &bigdecimal::BigDecimal::from(item.quantity);
        Self {
            id: item.line_id,
            quantity: item.quantity,
            subtotal: format_money(&subtotal),
            product: item.product.into(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/cart/add",
    request_body = LineItemRequest,
    responses(
        (status = 200, description = "Line after the addition", body = CartItemView),
        (status = 400, description = "Invalid quantity or inactive product", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown product", body = Error),
        (status = 409, description = "Insufficient stock", body = Error)
    ),
    tags = ["cart"],
    operation_id = "addToCart"
)]
#[post("/cart/add")]
pub async fn add_to_cart(
    who: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<LineItemRequest>,
) -> ApiResult<web::Json<CartItemView>> {
    let line = payload.into_inner();
    let item = state
        .cart_command
        .add_to_cart(
            who.identity().user_id,
            ProductId::new(line.product_id),
            line.quantity,
        )
        .await?;
    Ok(web::Json(item.into()))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart lines in insertion order", body = [CartItemView]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["cart"],
    operation_id = "getCart"
)]
#[get("/cart")]
pub async fn get_cart(
    who: Authenticated,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CartItemView>>> {
    let items = state.cart.get_cart_items(who.identity().user_id).await?;
    Ok(web::Json(items.into_iter().map(Into::into).collect()))
}

/// Overwrite a line's quantity. A quantity of zero or less removes the line
/// and answers `204`.
#[utoipa::path(
    put,
    path = "/api/cart/update",
    request_body = LineItemRequest,
    responses(
        (status = 200, description = "Updated line", body = CartItemView),
        (status = 204, description = "Line removed"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Product not in cart", body = Error),
        (status = 409, description = "Insufficient stock", body = Error)
    ),
    tags = ["cart"],
    operation_id = "updateCartItem"
)]
#[put("/cart/update")]
pub async fn update_cart_item(
    who: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<LineItemRequest>,
) -> ApiResult<HttpResponse> {
    let line = payload.into_inner();
    let outcome = state
        .cart_command
        .update_cart_item_quantity(
            who.identity().user_id,
            ProductId::new(line.product_id),
            line.quantity,
        )
        .await?;
    Ok(match outcome {
        CartUpdate::Updated(item) => HttpResponse::Ok().json(CartItemView::from(item)),
        CartUpdate::Removed => HttpResponse::NoContent().finish(),
    })
}

#[utoipa::path(
    delete,
    path = "/api/cart/remove/{productId}",
    params(("productId" = i64, Path, description = "Product to drop from the cart")),
    responses(
        (status = 204, description = "Line removed"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Product not in cart", body = Error)
    ),
    tags = ["cart"],
    operation_id = "removeFromCart"
)]
#[delete("/cart/remove/{product_id}")]
pub async fn remove_from_cart(
    who: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .cart_command
        .remove_from_cart(who.identity().user_id, ProductId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    delete,
    path = "/api/cart/clear",
    responses(
        (status = 204, description = "Cart emptied"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["cart"],
    operation_id = "clearCart"
)]
#[delete("/cart/clear")]
pub async fn clear_cart(who: Authenticated, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    state.cart_command.clear_cart(who.identity().user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryId, Product, UserId};
    use crate::inbound::http::test_utils::{MockPorts, USER_TOKEN, bearer};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use bigdecimal::BigDecimal;
    use chrono::{DateTime, Utc};
    use serde_json::{Value, json};
    use std::str::FromStr;

    fn honey_line(quantity: i32) -> CartItem {
        CartItem {
            line_id: 11,
            quantity,
            product: Product {
                id: ProductId::new(5),
                name: "Çiçek Balı".to_owned(),
                price: BigDecimal::from_str("65.00").expect("decimal"),
                description: None,
                image_url: Some("/placeholder.svg".to_owned()),
                stock: 12,
                active: true,
                category_id: CategoryId::new(4),
                category_name: "Bal".to_owned(),
                created_at: DateTime::<Utc>::UNIX_EPOCH,
                updated_at: DateTime::<Utc>::UNIX_EPOCH,
            },
        }
    }

    async fn send(ports: MockPorts, req: test::TestRequest) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new().app_data(ports.into_state()).service(
                web::scope("/api")
                    .service(add_to_cart)
                    .service(get_cart)
                    .service(update_cart_item)
                    .service(remove_from_cart)
                    .service(clear_cart),
            ),
        )
        .await;
        let res = test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let bytes = test::read_body(res).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, body)
    }

    #[actix_web::test]
    async fn cart_requires_token() {
        let (status, _) = send(MockPorts::default(), test::TestRequest::get().uri("/api/cart")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn add_uses_token_subject() {
        let mut ports = MockPorts::default();
        ports
            .cart_command
            .expect_add_to_cart()
            .withf(|user, product, quantity| {
                *user == UserId::new(7) && *product == ProductId::new(5) && *quantity == 3
            })
            .return_once(|_, _, quantity| Ok(honey_line(quantity)));

        let req = test::TestRequest::post()
            .uri("/api/cart/add")
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({"productId": 5, "quantity": 3}));
        let (status, body) = send(ports, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["quantity"], 3);
        assert_eq!(body["subtotal"], "195.00");
        assert_eq!(body["product"]["name"], "Çiçek Balı");
    }

    #[actix_web::test]
    async fn insufficient_stock_conflicts() {
        let mut ports = MockPorts::default();
        ports.cart_command.expect_add_to_cart().return_once(|_, _, _| {
            Err(Error::insufficient_stock("insufficient stock for Çiçek Balı"))
        });

        let req = test::TestRequest::post()
            .uri("/api/cart/add")
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({"productId": 5, "quantity": 13}));
        let (status, body) = send(ports, req).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "insufficient_stock");
    }

    #[actix_web::test]
    async fn update_to_zero_answers_no_content() {
        let mut ports = MockPorts::default();
        ports
            .cart_command
            .expect_update_cart_item_quantity()
            .return_once(|_, _, _| Ok(CartUpdate::Removed));

        let req = test::TestRequest::put()
            .uri("/api/cart/update")
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({"productId": 5, "quantity": 0}));
        let (status, _) = send(ports, req).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn remove_and_clear_answer_no_content() {
        let mut ports = MockPorts::default();
        ports
            .cart_command
            .expect_remove_from_cart()
            .withf(|_, product| *product == ProductId::new(5))
            .return_once(|_, _| Ok(()));
        ports.cart_command.expect_clear_cart().return_once(|_| Ok(()));
        let state = ports.into_state();
        let app = test::init_service(
            App::new().app_data(state).service(
                web::scope("/api")
                    .service(remove_from_cart)
                    .service(clear_cart),
            ),
        )
        .await;

        for uri in ["/api/cart/remove/5", "/api/cart/clear"] {
            let req = test::TestRequest::delete()
                .uri(uri)
                .insert_header(bearer(USER_TOKEN))
                .to_request();
            assert_eq!(
                test::call_service(&app, req).await.status(),
                StatusCode::NO_CONTENT
            );
        }
    }

    #[actix_web::test]
    async fn get_lists_lines() {
        let mut ports = MockPorts::default();
        ports
            .cart
            .expect_get_cart_items()
            .return_once(|_| Ok(vec![honey_line(2)]));
        let req = test::TestRequest::get()
            .uri("/api/cart")
            .insert_header(bearer(USER_TOKEN));
        let (status, body) = send(ports, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], 11);
        assert_eq!(body[0]["subtotal"], "130.00");
    }
}
