//! Driving port for login and registration.

use async_trait::async_trait;

use crate::domain::{AuthSession, Error, LoginCredentials, Registration};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthCommand: Send + Sync {
    /// Verify credentials and issue a bearer token.
    ///
    /// Unknown emails and wrong passwords both yield
    /// [`crate::domain::ErrorCode::InvalidCredentials`].
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error>;

    /// Create a [`crate::domain::Role::User`] account and issue a token.
    async fn register(&self, registration: &Registration) -> Result<AuthSession, Error>;
}
