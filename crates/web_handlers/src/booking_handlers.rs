use actix_web::{HttpResponse, Result, web};
use notification_services::NotificationService;
use sqlx::PgPool;
use validator::Validate;

use auth_services::middleware::AuthenticatedUser;
use camp_marketplace::{BookingService, CreateBookingRequest, MarketplaceError};

/// Stores a booking request and returns the prefilled email that sends it
pub async fn create_booking(
    pool: web::Data<PgPool>,
    notification_service: web::Data<NotificationService>,
    user: AuthenticatedUser,
    request: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, MarketplaceError> {
    request
        .validate()
        .map_err(|e| MarketplaceError::Validation(format!("Validation error: {}", e)))?;

    let booking_service = BookingService::new(pool.get_ref().clone());
    let created = booking_service
        .create_booking(
            &user.0.user_id,
            &request,
            notification_service.admin_email(),
        )
        .await?;

    Ok(HttpResponse::Created().json(created))
}

/// Lists the caller's booking requests, newest first
pub async fn list_my_bookings(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, MarketplaceError> {
    let booking_service = BookingService::new(pool.get_ref().clone());
    let bookings = booking_service.list_user_bookings(&user.0.user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "bookings": bookings,
        "total": bookings.len()
    })))
}
