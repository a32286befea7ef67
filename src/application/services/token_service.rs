//! Bearer token verification.

use crate::domain::entities::UserClaims;
use crate::error::AppError;
use jsonwebtoken::{decode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Raw claims as they appear on the wire.
///
/// `sub` arrives as either a JSON number or a string depending on the
/// issuer; both coerce to an integer. A non-coercible subject yields 0,
/// which the auth middleware rejects.
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default, deserialize_with = "deserialize_subject")]
    sub: i64,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

fn deserialize_subject<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
        Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    })
}

/// Verifies HMAC-signed bearer tokens.
///
/// Only HS256 is accepted; a token signed with any other algorithm fails
/// with `INVALID_SIGNING_KEY`.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Validates signature and expiry, then extracts the user claims.
    ///
    /// # Errors
    ///
    /// - `INVALID_SIGNING_KEY` for a non-HMAC algorithm
    /// - `TOKEN_EXPIRED` when `exp` has passed
    /// - `INVALID_TOKEN` for any other parse or signature failure
    pub fn verify(&self, token: &str) -> Result<UserClaims, AppError> {
        let data = decode::<RawClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => {
                    AppError::new(crate::error::ErrorKind::TokenExpired).wrap(e)
                }
                JwtErrorKind::InvalidAlgorithm | JwtErrorKind::InvalidAlgorithmName => {
                    AppError::new(crate::error::ErrorKind::InvalidSigningKey).wrap(e)
                }
                _ => AppError::new(crate::error::ErrorKind::InvalidToken).wrap(e),
            })?;

        Ok(UserClaims {
            user_id: data.claims.sub,
            email: data.claims.email.unwrap_or_default(),
            role: data.claims.role.unwrap_or_default(),
        })
    }
}
