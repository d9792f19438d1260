use crate::error::PortalError;
use crate::models::{Claims, TokenType};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use once_cell::sync::Lazy;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

static PEEK_VALIDATION: Lazy<Validation> = Lazy::new(|| {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation
});

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

/// Read the claims out of a bearer token without verifying the signature.
///
/// The client holds no signing secret; the server is the one enforcing
/// authenticity. Expiry is still checked so a stale token is rejected before
/// the first request instead of via a 401 round-trip.
pub fn peek_claims(token: &str) -> Result<Claims, PortalError> {
    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &PEEK_VALIDATION)
        .map(|data| data.claims)
        .map_err(|e| PortalError::Token(e.to_string()))
}

/// Mint a throwaway access token for fixture mode, where no backend exists
/// to issue one. Signed with a dummy secret; never valid against a real
/// server.
pub fn mint_fixture_token(user_id: u64, username: &str, role: &str, ttl: usize) -> String {
    let claims = Claims {
        user_id,
        sub: username.to_string(),
        role: role.to_string(),
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type: TokenType::Access,
        employee_id: Some(user_id),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"fixture"),
    )
    .unwrap()
}
