//! HTTP inbound adapter exposing the REST endpoints under `/api`.

pub mod auth;
pub mod cart;
pub mod categories;
pub mod error;
pub mod health;
pub mod identity;
pub mod money;
pub mod orders;
pub mod products;
pub mod state;
#[cfg(test)]
pub mod test_utils;

use actix_web::web;

pub use error::ApiResult;

/// Register the extractor error handlers and every `/api` route.
///
/// Literal order routes (`from-cart`, `my-orders`, `migrate-statuses`) are
/// registered ahead of `{id}` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .service(
            web::scope("/api")
                .service(auth::login)
                .service(auth::register)
                .service(categories::list_categories)
                .service(categories::get_category)
                .service(categories::create_category)
                .service(categories::update_category)
                .service(categories::delete_category)
                .service(products::list_products)
                .service(products::get_product)
                .service(products::create_product)
                .service(products::update_product)
                .service(products::delete_product)
                .service(cart::add_to_cart)
                .service(cart::get_cart)
                .service(cart::update_cart_item)
                .service(cart::remove_from_cart)
                .service(cart::clear_cart)
                .service(orders::create_order_from_cart)
                .service(orders::migrate_statuses)
                .service(orders::my_orders)
                .service(orders::create_order)
                .service(orders::list_orders)
                .service(orders::get_order)
                .service(orders::update_order_status),
        );
}
