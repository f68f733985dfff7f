use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use recipebox_api::auth::JwtClaims;

/// Shared secret for tests (must match `test_config`).
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

pub fn token_for(user_id: &str, role: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = JwtClaims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: now + 3600,
        iat: now,
        nbf: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to sign test token")
}

/// `Authorization` header value for a regular user.
pub fn bearer(user_id: &str) -> String {
    format!("Bearer {}", token_for(user_id, "user"))
}

pub fn admin_bearer(user_id: &str) -> String {
    format!("Bearer {}", token_for(user_id, "admin"))
}
