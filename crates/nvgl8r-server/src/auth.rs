use std::fmt;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::routes::AppState;

/// Hex characters of salt at the front of a stored hash (16 random bytes).
const SALT_HEX_LEN: usize = 32;

const REALM_CHALLENGE: &str = "Basic realm=\"Nvgl8r\"";

/// Salted SHA-256 of the server password, stored as `salt_hex || digest_hex`.
///
/// The plaintext password is hashed once at startup and dropped.
pub struct PasswordHash {
    stored: String,
}

impl PasswordHash {
    pub fn generate(password: &str) -> Self {
        let salt = hex::encode(rand::random::<[u8; 16]>());
        let digest = salted_digest(&salt, password);
        Self {
            stored: format!("{}{}", salt, digest),
        }
    }

    pub fn verify(&self, password: &str) -> bool {
        let (salt, digest) = self.stored.split_at(SALT_HEX_LEN);
        salted_digest(salt, password)
            .as_bytes()
            .ct_eq(digest.as_bytes())
            .into()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasswordHash([REDACTED])")
    }
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Password from an `Authorization: Basic base64(user:password)` header.
/// The username is ignored.
fn basic_password(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = String::from_utf8(BASE64.decode(token).ok()?).ok()?;
    let (_user, password) = decoded.split_once(':')?;
    Some(password.to_string())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [
            (header::WWW_AUTHENTICATE, REALM_CHALLENGE),
            (header::CONTENT_TYPE, "text/html"),
        ],
    )
        .into_response()
}

/// Reject any request without valid Basic credentials.
pub async fn require_basic_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match basic_password(req.headers()) {
        Some(password) if state.password.verify(&password) => next.run(req).await,
        _ => unauthorized(),
    }
}
