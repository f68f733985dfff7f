//! HS256 bearer token validation
//!
//! Tokens are issued by the user service with a secret shared across services.

use crate::auth::models::{JwtClaims, UserContext, UserRole};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use recipebox_core::AppError;

pub struct JwtService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate a token and turn its claims into the caller's context.
    pub fn validate_token(&self, token: &str) -> Result<UserContext, AppError> {
        let token_data =
            decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        AppError::Unauthenticated("Token has expired".to_string())
                    }
                    ErrorKind::ImmatureSignature => {
                        AppError::Unauthenticated("Token is not yet valid (nbf)".to_string())
                    }
                    _ => AppError::Unauthenticated("Invalid token".to_string()),
                }
            })?;

        let claims = token_data.claims;
        let role = UserRole::parse(&claims.role)
            .ok_or_else(|| AppError::Unauthenticated("Invalid user role".to_string()))?;

        Ok(UserContext {
            user_id: claims.sub,
            role,
        })
    }
}
