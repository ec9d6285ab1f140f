use actix_web::{HttpResponse, Result, web};
use notification_services::NotificationService;
use object_storage::ObjectStore;
use sqlx::PgPool;
use uuid::Uuid;

use auth_services::middleware::AdminUser;
use camp_marketplace::{
    MarketplaceError, ModerationService, RejectSubmissionRequest, SubmissionService,
};

/// Lists pending submissions, newest first
pub async fn list_pending_submissions(
    pool: web::Data<PgPool>,
    store: web::Data<dyn ObjectStore>,
    _admin: AdminUser,
) -> Result<HttpResponse, MarketplaceError> {
    let submission_service = SubmissionService::new(pool.get_ref().clone(), store.into_inner());
    let submissions = submission_service.list_pending().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "submissions": submissions,
        "total": submissions.len()
    })))
}

/// Gets a submission with its dates and photos
pub async fn get_submission(
    pool: web::Data<PgPool>,
    store: web::Data<dyn ObjectStore>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, MarketplaceError> {
    let submission_id = path.into_inner();
    let submission_service = SubmissionService::new(pool.get_ref().clone(), store.into_inner());
    let detail = submission_service
        .get_submission_detail(&submission_id)
        .await?;

    Ok(HttpResponse::Ok().json(detail))
}

/// Approves a submission, publishing one camp per date range
pub async fn approve_submission(
    pool: web::Data<PgPool>,
    notification_service: web::Data<NotificationService>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, MarketplaceError> {
    let submission_id = path.into_inner();
    let moderation_service = ModerationService::new(pool.get_ref().clone());
    let outcome = moderation_service
        .approve(&submission_id, &admin.0.user_id)
        .await?;

    // The camps are live at this point; a failed email only gets logged
    if let Err(e) = notification_service
        .send_camp_approval(&outcome.email_data())
        .await
    {
        log::warn!(
            "Failed to send approval email for submission {}: {}",
            submission_id,
            e
        );
    }

    Ok(HttpResponse::Ok().json(outcome))
}

/// Rejects a submission with a reason
pub async fn reject_submission(
    pool: web::Data<PgPool>,
    notification_service: web::Data<NotificationService>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    request: web::Json<RejectSubmissionRequest>,
) -> Result<HttpResponse, MarketplaceError> {
    let submission_id = path.into_inner();
    let moderation_service = ModerationService::new(pool.get_ref().clone());
    let outcome = moderation_service
        .reject(&submission_id, &request.reason)
        .await?;

    if let Err(e) = notification_service
        .send_camp_rejection(&outcome.email_data())
        .await
    {
        log::warn!(
            "Failed to send rejection email for submission {}: {}",
            submission_id,
            e
        );
    }

    Ok(HttpResponse::Ok().json(outcome.submission))
}
