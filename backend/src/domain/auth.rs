//! Authentication primitives: credentials, registration, and token identity.
//!
//! Inbound payloads are validated here before a handler talks to a port or
//! service, so services only ever see well-formed input.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{Email, Role, User, UserId, UserValidationError};

/// Minimum accepted password length at registration.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Validation failures for login and registration payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    Email(UserValidationError),
    EmptyPassword,
    PasswordTooShort { min: usize },
    EmptyName,
}

impl AuthValidationError {
    /// Name of the offending payload field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::EmptyPassword | Self::PasswordTooShort { .. } => "password",
            Self::EmptyName => "name",
        }
    }
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::EmptyName => write!(f, "name must not be empty"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is normalised (see [`Email`]).
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use storefront::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Admin@Shop.test", "secret").unwrap();
/// assert_eq!(creds.email().as_str(), "admin@shop.test");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let email = Email::parse(email).map_err(AuthValidationError::Email)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated self-service registration request. New accounts always get
/// [`Role::User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    email: Email,
    password: Zeroizing<String>,
    name: String,
    phone: Option<String>,
    address: Option<String>,
}

impl Registration {
    pub fn try_new(
        email: &str,
        password: &str,
        name: &str,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Self, AuthValidationError> {
        let email = Email::parse(email).map_err(AuthValidationError::Email)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(AuthValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LEN,
            });
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthValidationError::EmptyName);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
            name: name.to_owned(),
            phone: non_blank(phone),
            address: non_blank(address),
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Identity asserted by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.as_str().to_owned(),
            role: user.role,
        }
    }
}

/// Signed bearer token string.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Result of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: AccessToken,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", "email")]
    #[case("user@example.com", "", "password")]
    fn invalid_login(#[case] email: &str, #[case] password: &str, #[case] field: &str) {
        let err = LoginCredentials::try_from_parts(email, password).expect_err("must fail");
        assert_eq!(err.field(), field);
    }

    #[test]
    fn login_keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("a@b.c", " pw ").expect("valid");
        assert_eq!(creds.password(), " pw ");
    }

    #[rstest]
    #[case("bad", "secret1", "Ada", AuthValidationError::Email(UserValidationError::InvalidEmail))]
    #[case("a@b.c", "12345", "Ada", AuthValidationError::PasswordTooShort { min: PASSWORD_MIN_LEN })]
    #[case("a@b.c", "", "Ada", AuthValidationError::EmptyPassword)]
    #[case("a@b.c", "secret1", "  ", AuthValidationError::EmptyName)]
    fn invalid_registration(
        #[case] email: &str,
        #[case] password: &str,
        #[case] name: &str,
        #[case] expected: AuthValidationError,
    ) {
        let err = Registration::try_new(email, password, name, None, None).expect_err("must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn registration_drops_blank_optional_fields() {
        let reg = Registration::try_new(" Ada@Example.com ", "secret1", " Ada ", Some(" "), Some("Izmir"))
            .expect("valid");
        assert_eq!(reg.email().as_str(), "ada@example.com");
        assert_eq!(reg.name(), "Ada");
        assert_eq!(reg.phone(), None);
        assert_eq!(reg.address(), Some("Izmir"));
    }
}
