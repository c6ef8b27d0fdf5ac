//! Port abstraction for user account persistence.

use async_trait::async_trait;

use crate::domain::{Email, NewUser, StoredUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The unique email constraint rejected an insert.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account and its password hash by normalised email.
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<StoredUser>, UserPersistenceError>;

    /// Insert a new account, failing with `DuplicateEmail` on collision.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Insert the account or overwrite name, contact details, role, and
    /// password hash of the account holding the same email.
    async fn upsert_by_email(&self, user: &NewUser) -> Result<User, UserPersistenceError>;
}
