//! Port for issuing and verifying signed bearer tokens.

use crate::domain::{AccessToken, Identity};

use super::define_port_error;

define_port_error! {
    /// Failures raised by token codecs.
    pub enum TokenError {
        /// The token is malformed or its signature does not verify.
        Invalid { message: String } => "invalid token: {message}",
        /// The token's expiry has passed.
        Expired => "token expired",
        /// The codec could not sign a token.
        Signing { message: String } => "failed to sign token: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Sign a token asserting `identity`.
    fn issue(&self, identity: &Identity) -> Result<AccessToken, TokenError>;

    /// Verify signature and expiry, returning the asserted identity.
    fn verify(&self, token: &str) -> Result<Identity, TokenError>;
}
