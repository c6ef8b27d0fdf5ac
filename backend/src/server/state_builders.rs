//! Wire PostgreSQL and credential adapters into domain services.

use std::sync::Arc;

use actix_web::web;
use mockable::Clock;

use storefront::domain::ports::{PasswordHasher, TokenCodec};
use storefront::domain::{
    AuthService, CartService, CatalogService, CheckoutService, OrderService,
};
use storefront::inbound::http::state::HttpState;
use storefront::outbound::persistence::{
    DbPool, DieselCartRepository, DieselCategoryRepository, DieselOrderRepository,
    DieselProductRepository, DieselUserRepository,
};

/// Driven adapters shared by every service.
pub(crate) struct Adapters {
    pub(crate) pool: DbPool,
    pub(crate) hasher: Arc<dyn PasswordHasher>,
    pub(crate) tokens: Arc<dyn TokenCodec>,
    pub(crate) clock: Arc<dyn Clock>,
}

pub(crate) fn build_http_state(adapters: Adapters) -> web::Data<HttpState> {
    let Adapters {
        pool,
        hasher,
        tokens,
        clock,
    } = adapters;
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let categories = Arc::new(DieselCategoryRepository::new(pool.clone()));
    let products = Arc::new(DieselProductRepository::new(pool.clone()));
    let carts = Arc::new(DieselCartRepository::new(pool.clone()));
    let orders = Arc::new(DieselOrderRepository::new(pool));

    let catalog = Arc::new(CatalogService::new(categories, products.clone(), clock.clone()));
    let cart = Arc::new(CartService::new(carts, products, users.clone()));
    let order_service = Arc::new(OrderService::new(orders.clone()));

    web::Data::new(HttpState {
        auth: Arc::new(AuthService::new(users, hasher, tokens.clone())),
        catalog: catalog.clone(),
        catalog_admin: catalog,
        cart: cart.clone(),
        cart_command: cart,
        checkout: Arc::new(CheckoutService::new(orders, clock)),
        orders: order_service.clone(),
        order_status: order_service,
        tokens,
    })
}
