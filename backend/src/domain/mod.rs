//! Domain types, services, and ports.
//!
//! Purpose: keep storefront rules (stock checks, order totals, the status
//! lifecycle) free of HTTP and SQL concerns. Inbound adapters call the
//! driving ports in [`ports`]; outbound adapters implement the driven ones.

pub mod auth;
pub mod auth_service;
pub mod cart;
pub mod cart_service;
pub mod catalog;
pub mod catalog_service;
pub mod checkout;
pub mod checkout_service;
pub mod error;
pub mod order;
pub mod order_service;
pub mod patch;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    AccessToken, AuthSession, AuthValidationError, Identity, LoginCredentials, PASSWORD_MIN_LEN,
    Registration,
};
pub use self::auth_service::AuthService;
pub use self::cart::{CartItem, CartLine, CartUpdate};
pub use self::cart_service::CartService;
pub use self::catalog::{
    CatalogValidationError, Category, CategoryDraft, CategoryId, CategoryPatch, Product,
    ProductDraft, ProductFilter, ProductId, ProductPatch, validate_price,
};
pub use self::catalog_service::CatalogService;
pub use self::checkout::{
    CheckoutPlan, CheckoutRejection, LineItem, LineSource, PlaceOrder, PlannedLine, ProductStock,
    merge_line_items,
};
pub use self::checkout_service::CheckoutService;
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::order::{Order, OrderId, OrderLine, OrderStatus, UnknownOrderStatus};
pub use self::order_service::OrderService;
pub use self::patch::{Patch, RequiredFieldCleared};
pub use self::trace_id::TraceId;
pub use self::user::{
    Email, NewUser, PasswordHash, Role, StoredUser, User, UserId, UserValidationError,
};
