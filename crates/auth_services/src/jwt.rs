use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::types::{AuthError, Claims, Session, UserProfile, UserType};

/// Lifetime of access tokens.
const ACCESS_TOKEN_HOURS: i64 = 1;
/// Lifetime of refresh tokens.
pub const REFRESH_TOKEN_DAYS: i64 = 30;

/// Signs and verifies HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Creates a token service keyed by `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    /// Issues a short-lived access token carrying the user's role.
    pub fn generate_access_token(&self, user: &UserProfile) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.user_type.clone(),
            exp: (now + Duration::hours(ACCESS_TOKEN_HOURS)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Issues a long-lived refresh token.
    pub fn generate_refresh_token(&self, user_id: &Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: String::new(), // Empty for refresh tokens
            role: String::new(),  // Empty for refresh tokens
            exp: (now + Duration::days(REFRESH_TOKEN_DAYS)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verifies signature and expiry.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }

    /// Builds the caller's session from an access token.
    pub fn session_from_token(&self, token: &str) -> Result<Session, AuthError> {
        let claims = self.verify_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            AuthError::Jwt(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidSubject,
            ))
        })?;
        // refresh tokens carry no role and cannot open a session
        let user_type: UserType = claims.role.parse()?;

        Ok(Session { user_id, user_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: &str) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            email: "coach@example.com".to_string(),
            password_hash: String::new(),
            user_type: role.to_string(),
            full_name: "Coach".to_string(),
            phone: None,
            country: None,
            commission_per_participant: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_access_token_yields_session() {
        let jwt = JwtService::new("test-secret");
        let user = profile("camp_owner");
        let token = jwt.generate_access_token(&user).unwrap();

        let session = jwt.session_from_token(&token).unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.user_type, UserType::CampOwner);
    }

    #[test]
    fn test_refresh_token_is_not_a_session() {
        let jwt = JwtService::new("test-secret");
        let token = jwt.generate_refresh_token(&Uuid::new_v4()).unwrap();

        assert!(jwt.verify_token(&token).is_ok());
        assert!(jwt.session_from_token(&token).is_err());
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let issuer = JwtService::new("secret-a");
        let verifier = JwtService::new("secret-b");
        let token = issuer.generate_access_token(&profile("admin")).unwrap();

        assert!(verifier.session_from_token(&token).is_err());
    }
}
