use std::{fmt, str::FromStr, sync::LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Loose international phone format: optional leading `+`, digits and common separators.
static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9][0-9 ()\-.]{5,19}$").unwrap_or_else(|e| panic!("bad phone regex: {e}"))
});

/// Role attached to every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Browses camps, books and reviews.
    #[default]
    Regular,
    /// Submits and manages camps.
    CampOwner,
    /// Moderates submissions.
    Admin,
}

impl UserType {
    /// Database representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Regular => "regular",
            UserType::CampOwner => "camp_owner",
            UserType::Admin => "admin",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(UserType::Regular),
            "camp_owner" => Ok(UserType::CampOwner),
            "admin" => Ok(UserType::Admin),
            other => Err(AuthError::Validation(format!("Unknown user type: {}", other))),
        }
    }
}

/// Request structure for user sign-up
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    /// Full name of the user
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub full_name: String,

    /// Email address of the user
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    /// Password for the user account
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional phone number
    pub phone: Option<String>,

    /// Optional country of residence
    pub country: Option<String>,

    /// Account role; admins cannot be self-registered
    #[serde(default)]
    pub user_type: UserType,

    /// Per-participant commission offered by a camp owner
    pub commission_per_participant: Option<Decimal>,
}

/// Request structure for user login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address of the user
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    /// Password for the user account
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request structure for updating user profile
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// Full name of the user
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub full_name: String,

    /// Phone number of the user
    pub phone: Option<String>,

    /// Country of residence
    pub country: Option<String>,
}

/// Account row from `users_profile`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserProfile {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Email address of the user
    pub email: String,
    /// Hashed password of the user
    pub password_hash: String,
    /// Role stored as text (`regular`, `camp_owner`, `admin`)
    pub user_type: String,
    /// Full name of the user
    pub full_name: String,
    /// Phone number of the user (nullable)
    pub phone: Option<String>,
    /// Country of residence (nullable)
    pub country: Option<String>,
    /// Commission offered by a camp owner (nullable)
    pub commission_per_participant: Option<Decimal>,
    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Parsed role of the account.
    pub fn role(&self) -> Result<UserType, AuthError> {
        self.user_type.parse()
    }

    /// Public view of the account, without the password hash.
    pub fn to_info(&self) -> Result<UserInfo, AuthError> {
        Ok(UserInfo {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            country: self.country.clone(),
            user_type: self.role()?,
            commission_per_participant: self.commission_per_participant,
            created_at: self.created_at,
        })
    }
}

/// Information about the user, used in responses
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Email address of the user
    pub email: String,
    /// Full name of the user
    pub full_name: String,
    /// Phone number of the user
    pub phone: Option<String>,
    /// Country of residence
    pub country: Option<String>,
    /// Account role
    pub user_type: UserType,
    /// Commission offered by a camp owner
    pub commission_per_participant: Option<Decimal>,
    /// Time at which the user was created
    pub created_at: DateTime<Utc>,
}

/// Response structure for user authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Access token for the user
    pub access_token: String,
    /// Refresh token for the user
    pub refresh_token: String,
    /// User information
    pub user: UserInfo,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject of the token, the user ID
    pub sub: String,
    /// Email address of the user
    pub email: String,
    /// Role of the user
    pub role: String,
    /// Expiration timestamp of the token
    pub exp: usize,
    /// Issued at timestamp of the token
    pub iat: usize,
}

/// Identity of the caller, injected into every protected handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// Authenticated user id
    pub user_id: Uuid,
    /// Role carried by the access token
    pub user_type: UserType,
}

/// Custom error type for authentication-related errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The email address already exists in the system
    #[error("Email already exists")]
    EmailExists,

    /// The provided credentials are invalid
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The phone number format is invalid
    #[error("Invalid phone number format")]
    InvalidPhoneNumber,

    /// The user was not found in the system
    #[error("User not found")]
    UserNotFound,

    /// The caller lacks the role required by the route
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A database error occurred
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An error occurred while hashing the password
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// An error occurred while encoding or decoding a token
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// An error occurred while validating input data
    #[error("Validation error: {0}")]
    Validation(String),
}

impl actix_web::ResponseError for AuthError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            AuthError::EmailExists => HttpResponse::Conflict().json(serde_json::json!({
                "error": "email_exists",
                "message": "An account with this email already exists"
            })),
            AuthError::InvalidCredentials => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "invalid_credentials",
                "message": "Invalid email or password"
            })),
            AuthError::UserNotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "user_not_found",
                "message": "User not found"
            })),
            AuthError::Forbidden(msg) => HttpResponse::Forbidden().json(serde_json::json!({
                "error": "forbidden",
                "message": msg
            })),
            AuthError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            AuthError::InvalidPhoneNumber => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "invalid_phone_number",
                "message": "Please enter a valid phone number"
            })),
            _ => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}

/// Validates a phone number in a loose international format
pub fn validate_phone_number(phone: &str) -> bool {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    PHONE_REGEX.is_match(phone.trim()) && (7..=15).contains(&digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("+381 64 123 4567"));
        assert!(validate_phone_number("(555) 123-4567"));
        assert!(validate_phone_number("0641234567"));
        assert!(!validate_phone_number("12345"));
        assert!(!validate_phone_number("call me maybe"));
        assert!(!validate_phone_number("+1 234 567 890 123 456 789"));
    }

    #[test]
    fn test_user_type_round_trip_through_text() {
        for role in [UserType::Regular, UserType::CampOwner, UserType::Admin] {
            assert_eq!(role.as_str().parse::<UserType>().unwrap(), role);
        }
        assert!("superuser".parse::<UserType>().is_err());
    }

    #[test]
    fn test_sign_up_defaults_to_regular() {
        let request: SignUpRequest = serde_json::from_value(serde_json::json!({
            "full_name": "Ana",
            "email": "ana@example.com",
            "password": "hoops1234"
        }))
        .unwrap();

        assert_eq!(request.user_type, UserType::Regular);
        assert!(request.validate().is_ok());
    }
}
