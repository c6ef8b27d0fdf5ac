//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    MockAuthCommand, MockCartCommand, MockCartQuery, MockCatalogCommand, MockCatalogQuery,
    MockCheckoutCommand, MockOrderStatusCommand, MockOrdersQuery, TokenCodec, TokenError,
};
use crate::domain::{AccessToken, Identity, Role, UserId};

use super::state::HttpState;

pub const USER_TOKEN: &str = "user-token";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const EXPIRED_TOKEN: &str = "expired-token";

pub fn shopper() -> Identity {
    Identity {
        user_id: UserId::new(7),
        email: "ayse@example.com".to_owned(),
        role: Role::User,
    }
}

pub fn admin() -> Identity {
    Identity {
        user_id: UserId::new(1),
        email: "admin@organikkose.com".to_owned(),
        role: Role::Admin,
    }
}

/// Token codec that recognises the fixed tokens above.
pub struct StubTokens;

impl TokenCodec for StubTokens {
    fn issue(&self, identity: &Identity) -> Result<AccessToken, TokenError> {
        Ok(AccessToken::new(match identity.role {
            Role::Admin => ADMIN_TOKEN,
            Role::User => USER_TOKEN,
        }))
    }

    fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        match token {
            USER_TOKEN => Ok(shopper()),
            ADMIN_TOKEN => Ok(admin()),
            EXPIRED_TOKEN => Err(TokenError::expired()),
            _ => Err(TokenError::invalid("unknown test token")),
        }
    }
}

/// Mock ports for one handler test. Unused ports keep no expectations, so
/// any unexpected call panics.
#[derive(Default)]
pub struct MockPorts {
    pub auth: MockAuthCommand,
    pub catalog: MockCatalogQuery,
    pub catalog_admin: MockCatalogCommand,
    pub cart: MockCartQuery,
    pub cart_command: MockCartCommand,
    pub checkout: MockCheckoutCommand,
    pub orders: MockOrdersQuery,
    pub order_status: MockOrderStatusCommand,
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            auth: Arc::new(self.auth),
            catalog: Arc::new(self.catalog),
            catalog_admin: Arc::new(self.catalog_admin),
            cart: Arc::new(self.cart),
            cart_command: Arc::new(self.cart_command),
            checkout: Arc::new(self.checkout),
            orders: Arc::new(self.orders),
            order_status: Arc::new(self.order_status),
            tokens: Arc::new(StubTokens),
        })
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}
