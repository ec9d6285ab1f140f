use actix_web::{HttpResponse, Result, web};
use bcrypt::hash;
use sqlx::PgPool;
use validator::Validate;

use auth_services::jwt::JwtService;
use auth_services::service::AuthService;
use auth_services::types::*;

async fn issue_tokens(
    auth_service: &AuthService,
    jwt_service: &JwtService,
    user: &UserProfile,
) -> Result<AuthResponse, AuthError> {
    let access_token = jwt_service.generate_access_token(user)?;
    let refresh_token = jwt_service.generate_refresh_token(&user.id)?;

    // Only the hash of the refresh token is stored
    let refresh_token_hash = hash(&refresh_token, bcrypt::DEFAULT_COST)?;
    auth_service
        .create_session(&user.id, &refresh_token_hash)
        .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: user.to_info()?,
    })
}

/// Handles user signup by validating the request, creating a new user,
/// generating access and refresh tokens, and returning the user info.
/// Returns a 201 Created response with the user info and tokens.
pub async fn signup(
    pool: web::Data<PgPool>,
    jwt_service: web::Data<JwtService>,
    request: web::Json<SignUpRequest>,
) -> Result<HttpResponse, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::Validation(format!("Validation error: {}", e)))?;

    let auth_service = AuthService::new(pool.get_ref().clone());
    let user = auth_service.create_user(&request).await?;

    log::info!("👤 New {} account {}", user.user_type, user.id);

    let response = issue_tokens(&auth_service, &jwt_service, &user).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Handles user login by validating the request, verifying credentials,
/// generating access and refresh tokens, and returning the user info.
pub async fn login(
    pool: web::Data<PgPool>,
    jwt_service: web::Data<JwtService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::Validation(format!("Validation error: {}", e)))?;

    let auth_service = AuthService::new(pool.get_ref().clone());
    let user = auth_service
        .verify_password(&request.email, &request.password)
        .await?;

    let response = issue_tokens(&auth_service, &jwt_service, &user).await?;
    Ok(HttpResponse::Ok().json(response))
}
