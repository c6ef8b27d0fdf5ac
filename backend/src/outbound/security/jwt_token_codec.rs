//! HS256 JSON Web Token adapter for the [`TokenCodec`] port.
//!
//! Expiry is checked against the injected clock rather than the system time
//! `jsonwebtoken` would use, so token lifetimes are testable.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{TokenCodec, TokenError};
use crate::domain::{AccessToken, Identity, Role, UserId};

/// Seconds of clock skew tolerated when checking expiry.
const EXPIRY_LEEWAY_SECS: i64 = 30;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenCodec {
    /// Build a codec; the secret buffer is wiped once the keys are derived.
    pub fn new(secret: Zeroizing<Vec<u8>>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);
        Self {
            encoding: EncodingKey::from_secret(&secret),
            decoding: DecodingKey::from_secret(&secret),
            validation,
            ttl,
            clock,
        }
    }

    fn ttl_secs(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, identity: &Identity) -> Result<AccessToken, TokenError> {
        let iat = self.clock.utc().timestamp();
        let claims = Claims {
            sub: identity.user_id.to_string(),
            email: identity.email.clone(),
            role: identity.role,
            iat,
            exp: iat.saturating_add(self.ttl_secs()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(AccessToken::new)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                _ => TokenError::invalid(err.to_string()),
            }
        })?;
        let claims = data.claims;
        if claims.exp.saturating_add(EXPIRY_LEEWAY_SECS) < self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::invalid("subject is not a user id"))?;
        Ok(Identity {
            user_id: UserId::new(user_id),
            email: claims.email,
            role: claims.role,
        })
    }
}
