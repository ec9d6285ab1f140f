use actix_web::{HttpResponse, Result, web};
use notification_services::NotificationService;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use auth_services::middleware::AuthenticatedUser;
use camp_marketplace::{CreateReviewRequest, MarketplaceError, ReviewService};

/// Stores a review of a camp and mails its verification link
pub async fn create_review(
    pool: web::Data<PgPool>,
    notification_service: web::Data<NotificationService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    request: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, MarketplaceError> {
    request
        .validate()
        .map_err(|e| MarketplaceError::Validation(format!("Validation error: {}", e)))?;

    let camp_id = path.into_inner();
    let review_service = ReviewService::new(pool.get_ref().clone());
    let review = review_service
        .create_review(&user.0.user_id, &camp_id, &request)
        .await?;

    // The review stays pending whether or not the email goes out
    if let Err(e) = notification_service
        .send_review_verification(&review.participant_email, &review.verification_token)
        .await
    {
        log::warn!(
            "Failed to send verification email for review {}: {}",
            review.id,
            e
        );
    }

    Ok(HttpResponse::Created().json(review))
}

/// Lists the caller's reviews and the camps they booked
pub async fn list_my_reviews(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, MarketplaceError> {
    let review_service = ReviewService::new(pool.get_ref().clone());
    let reviews = review_service.list_user_reviews(&user.0.user_id).await?;

    Ok(HttpResponse::Ok().json(reviews))
}
