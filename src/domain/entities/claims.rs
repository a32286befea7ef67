//! Authenticated user identity derived from a verified bearer token.

/// Claims extracted from a verified token.
///
/// `user_id` is 0 when the token's subject could not be coerced to an
/// integer; such claims are rejected by the auth middleware before any
/// handler runs.
#[derive(Debug, Clone)]
pub struct UserClaims {
    pub user_id: i64,
    pub email: String,
    pub role: String,
}

impl UserClaims {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}
