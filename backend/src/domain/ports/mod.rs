//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`TokenCodec`], [`PasswordHasher`]) describe
//! what the domain needs from adapters and expose typed errors. Driving ports
//! (`*Query`, `*Command`) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_command;
mod cart_command;
mod cart_query;
mod cart_repository;
mod catalog_command;
mod catalog_query;
mod category_repository;
mod checkout_command;
mod order_repository;
mod order_status_command;
mod orders_query;
mod password_hasher;
mod product_repository;
mod token_codec;
mod user_repository;

pub use auth_command::AuthCommand;
#[cfg(test)]
pub use auth_command::MockAuthCommand;
pub use cart_command::CartCommand;
#[cfg(test)]
pub use cart_command::MockCartCommand;
pub use cart_query::CartQuery;
#[cfg(test)]
pub use cart_query::MockCartQuery;
#[cfg(test)]
pub use cart_repository::MockCartRepository;
pub use cart_repository::{CartPersistenceError, CartRepository};
pub use catalog_command::CatalogCommand;
#[cfg(test)]
pub use catalog_command::MockCatalogCommand;
pub use catalog_query::CatalogQuery;
#[cfg(test)]
pub use catalog_query::MockCatalogQuery;
#[cfg(test)]
pub use category_repository::MockCategoryRepository;
pub use category_repository::{CategoryPersistenceError, CategoryRepository};
pub use checkout_command::CheckoutCommand;
#[cfg(test)]
pub use checkout_command::MockCheckoutCommand;
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderPersistenceError, OrderRepository};
#[cfg(test)]
pub use order_status_command::MockOrderStatusCommand;
pub use order_status_command::OrderStatusCommand;
#[cfg(test)]
pub use orders_query::MockOrdersQuery;
pub use orders_query::OrdersQuery;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{ProductPersistenceError, ProductRepository};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{TokenCodec, TokenError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
