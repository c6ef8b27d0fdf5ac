//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AuthCommand, CartCommand, CartQuery, CatalogCommand, CatalogQuery, CheckoutCommand,
    OrderStatusCommand, OrdersQuery, TokenCodec,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthCommand>,
    pub catalog: Arc<dyn CatalogQuery>,
    pub catalog_admin: Arc<dyn CatalogCommand>,
    pub cart: Arc<dyn CartQuery>,
    pub cart_command: Arc<dyn CartCommand>,
    pub checkout: Arc<dyn CheckoutCommand>,
    pub orders: Arc<dyn OrdersQuery>,
    pub order_status: Arc<dyn OrderStatusCommand>,
    /// Verifies bearer tokens for the identity extractors.
    pub tokens: Arc<dyn TokenCodec>,
}
