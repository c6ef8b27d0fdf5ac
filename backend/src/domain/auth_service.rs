//! Login and registration.
//!
//! Implements [`AuthCommand`] over a user repository, a password hasher, and
//! a token codec.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    AuthCommand, PasswordHashError, PasswordHasher, TokenCodec, TokenError, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    AuthSession, Error, Identity, LoginCredentials, NewUser, Registration, Role, User,
};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Authentication service implementing the [`AuthCommand`] driving port.
#[derive(Clone)]
pub struct AuthService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
}

impl<U> AuthService<U> {
    pub fn new(users: Arc<U>, hasher: Arc<dyn PasswordHasher>, tokens: Arc<dyn TokenCodec>) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }
}

impl<U> AuthService<U>
where
    U: UserRepository,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateEmail { email } => {
                Error::email_already_exists(format!("email {email} is already registered"))
            }
        }
    }

    fn map_hash_error(error: PasswordHashError) -> Error {
        Error::internal(error.to_string())
    }

    fn map_token_error(error: TokenError) -> Error {
        Error::internal(error.to_string())
    }

    fn session_for(&self, user: User) -> Result<AuthSession, Error> {
        let token = self
            .tokens
            .issue(&Identity::from(&user))
            .map_err(Self::map_token_error)?;
        Ok(AuthSession { token, user })
    }
}

#[async_trait]
impl<U> AuthCommand for AuthService<U>
where
    U: UserRepository,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error> {
        let Some(stored) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(Self::map_user_error)?
        else {
            return Err(Error::invalid_credentials(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(Self::map_hash_error)?;
        if !matches {
            return Err(Error::invalid_credentials(INVALID_CREDENTIALS));
        }

        info!(user_id = %stored.user.id, "user logged in");
        self.session_for(stored.user)
    }

    async fn register(&self, registration: &Registration) -> Result<AuthSession, Error> {
        if self
            .users
            .find_by_email(registration.email())
            .await
            .map_err(Self::map_user_error)?
            .is_some()
        {
            return Err(Error::email_already_exists(format!(
                "email {} is already registered",
                registration.email()
            )));
        }

        let password_hash = self
            .hasher
            .hash(registration.password())
            .map_err(Self::map_hash_error)?;
        let user = self
            .users
            .insert(&NewUser {
                email: registration.email().clone(),
                name: registration.name().to_owned(),
                phone: registration.phone().map(str::to_owned),
                address: registration.address().map(str::to_owned),
                role: Role::User,
                password_hash,
            })
            .await
            .map_err(Self::map_user_error)?;

        info!(user_id = %user.id, "user registered");
        self.session_for(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockPasswordHasher, MockTokenCodec, MockUserRepository};
    use crate::domain::{AccessToken, Email, ErrorCode, PasswordHash, StoredUser, UserId};

    fn stored_user() -> StoredUser {
        StoredUser {
            user: User {
                id: UserId::new(7),
                email: Email::parse("ada@example.com").expect("email"),
                name: "Ada".to_owned(),
                phone: None,
                address: None,
                role: Role::User,
            },
            password_hash: PasswordHash::new("hash"),
        }
    }

    fn token_codec() -> MockTokenCodec {
        let mut tokens = MockTokenCodec::new();
        tokens
            .expect_issue()
            .returning(|identity| Ok(AccessToken::new(format!("token-{}", identity.user_id))));
        tokens
    }

    fn make_service(
        users: MockUserRepository,
        hasher: MockPasswordHasher,
    ) -> AuthService<MockUserRepository> {
        AuthService::new(Arc::new(users), Arc::new(hasher), Arc::new(token_codec()))
    }

    fn credentials(password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts("ada@example.com", password).expect("credentials")
    }

    #[tokio::test]
    async fn login_issues_token_for_matching_password() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .times(1)
            .return_once(|_| Ok(Some(stored_user())));
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_verify()
            .withf(|password, _| password.to_string() == "secret1")
            .return_once(|_, _| Ok(true));

        let session = make_service(users, hasher)
            .login(&credentials("secret1"))
            .await
            .expect("login succeeds");
        assert_eq!(session.token.as_str(), "token-7");
        assert_eq!(session.user.id, UserId::new(7));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .return_once(|_| Ok(Some(stored_user())));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().return_once(|_, _| Ok(false));

        let err = make_service(users, hasher)
            .login(&credentials("wrong"))
            .await
            .expect_err("wrong password");
        assert_eq!(err.code(), ErrorCode::InvalidCredentials);
    }

    #[tokio::test]
    async fn login_rejects_unknown_email_without_hashing() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().return_once(|_| Ok(None));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().times(0);

        let err = make_service(users, hasher)
            .login(&credentials("secret1"))
            .await
            .expect_err("unknown email");
        assert_eq!(err.code(), ErrorCode::InvalidCredentials);
    }

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .return_once(|_| Ok(Some(stored_user())));
        users.expect_insert().times(0);
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().times(0);

        let registration =
            Registration::try_new("ADA@example.com", "secret1", "Ada", None, None).expect("valid");
        let err = make_service(users, hasher)
            .register(&registration)
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::EmailAlreadyExists);
    }

    #[tokio::test]
    async fn register_creates_user_role_account() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().return_once(|_| Ok(None));
        users
            .expect_insert()
            .withf(|user| user.role == Role::User && user.password_hash.as_str() == "hashed")
            .return_once(|new_user| {
                Ok(User {
                    id: UserId::new(8),
                    email: new_user.email.clone(),
                    name: new_user.name.clone(),
                    phone: new_user.phone.clone(),
                    address: new_user.address.clone(),
                    role: new_user.role,
                })
            });
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .return_once(|_| Ok(PasswordHash::new("hashed")));

        let registration =
            Registration::try_new("new@example.com", "secret1", "Grace", Some("555"), None)
                .expect("valid");
        let session = make_service(users, hasher)
            .register(&registration)
            .await
            .expect("registered");
        assert_eq!(session.user.role, Role::User);
        assert_eq!(session.user.phone.as_deref(), Some("555"));
    }

    #[tokio::test]
    async fn repository_outage_maps_to_service_unavailable() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .return_once(|_| Err(UserPersistenceError::connection("pool timed out")));

        let err = make_service(users, MockPasswordHasher::new())
            .login(&credentials("secret1"))
            .await
            .expect_err("outage");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
