//! Email notification endpoints.
//!
//! Each endpoint accepts a camelCase JSON body, answers `{success, emailId}` when the
//! provider accepts the message and `{error}` with a 500 otherwise. CORS headers are
//! added by the `/functions` scope in [`crate::routes`].

use actix_web::{HttpResponse, web};
use notification_services::NotificationService;
use notification_services::types::{
    ApprovalEmailData, NotificationError, RejectionEmailData, SendEmailResponse,
    SubmissionNotificationData,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use uuid::Uuid;

use camp_marketplace::{MarketplaceError, ReviewService};

/// Body of the review verification endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewVerificationRequest {
    /// Review whose participant receives the link
    pub review_id: Option<Uuid>,
}

fn error_body(message: impl Into<String>) -> serde_json::Value {
    serde_json::json!({ "error": message.into() })
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, HttpResponse> {
    serde_json::from_slice(body).map_err(|e| {
        log::warn!("Rejected notification body: {}", e);
        HttpResponse::BadRequest().json(error_body(format!("Invalid request body: {}", e)))
    })
}

fn email_response(result: Result<String, NotificationError>) -> HttpResponse {
    match result {
        Ok(email_id) => HttpResponse::Ok().json(SendEmailResponse {
            success: true,
            email_id,
        }),
        Err(e) => {
            log::error!("❌ Notification email failed: {}", e);
            HttpResponse::InternalServerError().json(error_body(e.to_string()))
        }
    }
}

/// Answers CORS preflight requests
pub async fn notification_preflight() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

/// Mails the owner that their camp is live
pub async fn send_camp_approval_email(
    notification_service: web::Data<NotificationService>,
    body: web::Bytes,
) -> HttpResponse {
    let data: ApprovalEmailData = match parse_body(&body) {
        Ok(data) => data,
        Err(response) => return response,
    };

    email_response(notification_service.send_camp_approval(&data).await)
}

/// Mails the owner why their submission was declined
pub async fn send_camp_rejection_email(
    notification_service: web::Data<NotificationService>,
    body: web::Bytes,
) -> HttpResponse {
    let data: RejectionEmailData = match parse_body(&body) {
        Ok(data) => data,
        Err(response) => return response,
    };

    email_response(notification_service.send_camp_rejection(&data).await)
}

/// Alerts the admin inbox about a new submission
pub async fn send_camp_submission_notification(
    notification_service: web::Data<NotificationService>,
    body: web::Bytes,
) -> HttpResponse {
    let data: SubmissionNotificationData = match parse_body(&body) {
        Ok(data) => data,
        Err(response) => return response,
    };

    email_response(notification_service.send_submission_notification(&data).await)
}

/// Mails a review's verification link to its participant
pub async fn send_review_verification(
    pool: web::Data<PgPool>,
    notification_service: web::Data<NotificationService>,
    body: web::Bytes,
) -> HttpResponse {
    let request: ReviewVerificationRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let Some(review_id) = request.review_id else {
        return HttpResponse::BadRequest().json(error_body("Review ID is required"));
    };

    let review_service = ReviewService::new(pool.get_ref().clone());
    let review = match review_service.get_review(&review_id).await {
        Ok(review) => review,
        Err(MarketplaceError::NotFound(_)) => {
            return HttpResponse::NotFound().json(error_body("Review not found"));
        }
        Err(e) => {
            log::error!("❌ Failed to load review {}: {}", review_id, e);
            return HttpResponse::InternalServerError().json(error_body(e.to_string()));
        }
    };

    email_response(
        notification_service
            .send_review_verification(&review.participant_email, &review.verification_token)
            .await,
    )
}
