//! PostgreSQL adapters for the repository ports.
//!
//! Adapters only translate between Diesel rows (`models`, `schema`) and
//! domain types; rows never leave this module. All connections come from the
//! shared [`DbPool`].
//!
//! ```ignore
//! use storefront::outbound::persistence::{DbPool, DieselProductRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/shop")).await?;
//! let products = DieselProductRepository::new(pool);
//! ```

mod diesel_cart_repository;
mod diesel_category_repository;
mod diesel_error_mapping;
mod diesel_order_repository;
mod diesel_product_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_cart_repository::DieselCartRepository;
pub use diesel_category_repository::DieselCategoryRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_product_repository::DieselProductRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
