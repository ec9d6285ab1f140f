use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::jwt::REFRESH_TOKEN_DAYS;
use crate::types::{
    AuthError, SignUpRequest, UpdateProfileRequest, UserProfile, UserType, validate_phone_number,
};

const PROFILE_COLUMNS: &str = r#"
    id, email, password_hash, user_type, full_name, phone, country,
    commission_per_participant, created_at, updated_at
"#;

/// A service for handling user authentication operations such as creating users,
/// retrieving profiles, verifying credentials, and managing sessions.
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    /// Creates a new instance of `AuthService` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a new account from the provided sign-up request.
    pub async fn create_user(&self, request: &SignUpRequest) -> Result<UserProfile, AuthError> {
        if request.user_type == UserType::Admin {
            return Err(AuthError::Forbidden(
                "Admin accounts cannot be self-registered".to_string(),
            ));
        }

        if let Some(phone) = request.phone.as_deref() {
            if !validate_phone_number(phone) {
                return Err(AuthError::InvalidPhoneNumber);
            }
        }

        let email = request.email.trim().to_lowercase();
        let existing_user = sqlx::query("SELECT id FROM users_profile WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        if existing_user.is_some() {
            return Err(AuthError::EmailExists);
        }

        let password_hash = hash(&request.password, DEFAULT_COST)?;

        let user = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            INSERT INTO users_profile (
                email, password_hash, user_type, full_name, phone, country,
                commission_per_participant
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(&email)
        .bind(&password_hash)
        .bind(request.user_type.as_str())
        .bind(request.full_name.trim())
        .bind(request.phone.as_deref().map(str::trim))
        .bind(request.country.as_deref().map(str::trim))
        .bind(request.commission_per_participant)
        .fetch_one(&self.pool)
        .await?;

        log::info!("👤 Created {} account {}", user.user_type, user.id);

        Ok(user)
    }

    /// Retrieves a user by their email address.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserProfile>, AuthError> {
        let user = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users_profile WHERE email = $1"
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their ID.
    pub async fn get_user_by_id(&self, user_id: &Uuid) -> Result<Option<UserProfile>, AuthError> {
        let user = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users_profile WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Verifies the user's password against the stored hash.
    pub async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError> {
        let user = self
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Records a new session for the user with a refresh token hash
    pub async fn create_session(
        &self,
        user_id: &Uuid,
        refresh_token_hash: &str,
    ) -> Result<Uuid, AuthError> {
        let row = sqlx::query(
            r#"
            INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(refresh_token_hash)
        .bind(Utc::now() + chrono::Duration::days(REFRESH_TOKEN_DAYS))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// Updates the user's profile information
    pub async fn update_user_profile(
        &self,
        user_id: &Uuid,
        request: &UpdateProfileRequest,
    ) -> Result<UserProfile, AuthError> {
        if let Some(phone) = request.phone.as_deref() {
            if !validate_phone_number(phone) {
                return Err(AuthError::InvalidPhoneNumber);
            }
        }

        let user = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            UPDATE users_profile
            SET full_name = $1,
                phone = $2,
                country = $3,
                updated_at = NOW()
            WHERE id = $4
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(request.full_name.trim())
        .bind(request.phone.as_deref().map(str::trim))
        .bind(request.country.as_deref().map(str::trim))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::UserNotFound)?;

        Ok(user)
    }
}
