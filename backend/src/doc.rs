//! OpenAPI documentation.
//!
//! [`ApiDoc`] registers every `/api` handler and the health checks, plus the
//! bearer-token security scheme. Swagger UI serves it in debug builds and
//! `cargo run --bin openapi-dump` exports it for tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, OrderStatus, Role};
use crate::inbound::http::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::inbound::http::cart::{CartItemView, LineItemRequest};
use crate::inbound::http::categories::{
    CategoryView, CreateCategoryRequest, UpdateCategoryRequest,
};
use crate::inbound::http::orders::{
    CreateOrderRequest, MigrationReport, OrderLineView, OrderView, UpdateStatusRequest,
};
use crate::inbound::http::products::{CreateProductRequest, ProductView, UpdateProductRequest};

/// Name of the bearer scheme referenced by protected operations.
pub const BEARER_SCHEME: &str = "BearerToken";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        let scheme = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .description(Some("Token returned by POST /api/auth/login."))
            .build();
        components.add_security_scheme(BEARER_SCHEME, SecurityScheme::Http(scheme));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Storefront API",
        description = "Catalog, cart, checkout, and order management for the organic goods shop."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::register,
        crate::inbound::http::categories::list_categories,
        crate::inbound::http::categories::get_category,
        crate::inbound::http::categories::create_category,
        crate::inbound::http::categories::update_category,
        crate::inbound::http::categories::delete_category,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::update_product,
        crate::inbound::http::products::delete_product,
        crate::inbound::http::cart::add_to_cart,
        crate::inbound::http::cart::get_cart,
        crate::inbound::http::cart::update_cart_item,
        crate::inbound::http::cart::remove_from_cart,
        crate::inbound::http::cart::clear_cart,
        crate::inbound::http::orders::create_order,
        crate::inbound::http::orders::create_order_from_cart,
        crate::inbound::http::orders::my_orders,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::update_order_status,
        crate::inbound::http::orders::migrate_statuses,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        OrderStatus,
        LoginRequest,
        RegisterRequest,
        AuthResponse,
        CategoryView,
        CreateCategoryRequest,
        UpdateCategoryRequest,
        ProductView,
        CreateProductRequest,
        UpdateProductRequest,
        LineItemRequest,
        CartItemView,
        CreateOrderRequest,
        UpdateStatusRequest,
        MigrationReport,
        OrderView,
        OrderLineView,
    )),
    tags(
        (name = "auth", description = "Login and registration"),
        (name = "catalog", description = "Categories and products"),
        (name = "cart", description = "The caller's shopping cart"),
        (name = "orders", description = "Checkout and order lifecycle"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn schema<'a>(doc: &'a utoipa::openapi::OpenApi, name: &str) -> &'a RefOr<Schema> {
        let schemas = &doc.components.as_ref().expect("components").schemas;
        schemas
            .iter()
            .find(|(key, _)| key.rsplit('.').next() == Some(name))
            .map(|(_, schema)| schema)
            .unwrap_or_else(|| panic!("{name} schema registered"))
    }

    fn assert_fields(schema: &RefOr<Schema>, fields: &[&str]) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                for field in fields {
                    assert!(obj.properties.contains_key(*field), "missing field '{field}'");
                }
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_uses_wire_names() {
        let doc = ApiDoc::openapi();
        assert_fields(schema(&doc, "Error"), &["code", "message", "traceId", "details"]);
    }

    #[test]
    fn order_view_carries_lookups() {
        let doc = ApiDoc::openapi();
        assert_fields(
            schema(&doc, "OrderView"),
            &["userName", "totalAmount", "status", "lines"],
        );
        assert_fields(schema(&doc, "OrderLineView"), &["productName", "subtotal"]);
    }

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/products/{id}",
            "/api/cart/remove/{productId}",
            "/api/orders/{id}/status",
            "/api/orders/migrate-statuses",
            "/health/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }
}
