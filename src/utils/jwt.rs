use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// JWT claims carried by a bearer token.
///
/// Only the subject identity is meaningful; tokens do not expire.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
}

impl Claims {
    /// Creates claims for a user, stamped with the current time.
    pub fn new(user_id: &str) -> Self {
        Self {
            sub: user_id.to_string(),
            iat: jiff::Timestamp::now().as_second(),
        }
    }
}

/// Signs and verifies HS256 bearer tokens with a secret fixed at
/// construction.
///
/// The same instance is shared by the login handler (signing) and the auth
/// middleware (verification).
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Generates a signed token whose subject is `user_id`.
    ///
    /// # Example
    /// ```ignore
    /// let token = issuer.generate_token(&user.id)?;
    /// ```
    pub fn generate_token(&self, user_id: &str) -> AppResult<String> {
        encode(
            &Header::new(Algorithm::HS256),
            &Claims::new(user_id),
            &self.encoding_key,
        )
        .map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
        })
    }

    /// Validates the signature and decodes the claims.
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AppError::Unauthorized {
                    message: "Invalid token signature".to_string(),
                },
                jsonwebtoken::errors::ErrorKind::InvalidToken => AppError::Unauthorized {
                    message: "Invalid token".to_string(),
                },
                _ => AppError::Unauthorized {
                    message: format!("Token validation failed: {}", e),
                },
            })
    }
}
