use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::{Role, User};
use crate::utils::error::{AppError, AppResult};

/// Claims carried by the bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub role: Role,
    pub company_name: String,
    pub owner_id: Option<i64>,
    pub exp: i64,
    pub iat: i64,
}

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl TokenService {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::hours(expiry_hours),
        }
    }

    pub fn issue(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user.user_id,
            role: user.role,
            company_name: user.company_name.clone(),
            owner_id: user.owner_id,
            exp: (now + self.expiry).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("failed to sign token: {e}")))
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::AuthError("Token expired".to_string()),
                _ => AppError::AuthError("Invalid token".to_string()),
            })
    }

    pub fn expires_in_secs(&self) -> i64 {
        self.expiry.num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            user_id: 7,
            company_name: "Acme".into(),
            role: Role::Operator,
            username: "op".into(),
            password_hash: String::new(),
            email: "op@acme.test".into(),
            owner_id: Some(3),
        }
    }

    #[test]
    fn test_issued_token_verifies_with_same_secret() {
        let service = TokenService::new("test-secret", 1);
        let token = service.issue(&user()).unwrap();
        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.role, Role::Operator);
        assert_eq!(claims.owner_id, Some(3));
        assert_eq!(claims.company_name, "Acme");
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = TokenService::new("one", 1).issue(&user()).unwrap();
        let err = TokenService::new("two", 1).verify(&token).unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = TokenService::new("test-secret", -2);
        let token = service.issue(&user()).unwrap();
        assert!(matches!(
            service.verify(&token),
            Err(AppError::AuthError(msg)) if msg == "Token expired"
        ));
    }
}
