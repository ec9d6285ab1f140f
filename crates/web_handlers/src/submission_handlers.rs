use actix_web::{HttpResponse, Result, web};
use notification_services::NotificationService;
use object_storage::ObjectStore;
use sqlx::PgPool;
use validator::Validate;

use auth_services::middleware::CampOwnerUser;
use camp_marketplace::{CreateSubmissionRequest, MarketplaceError, SubmissionService};

/// Submits a camp for review.
///
/// Photos are uploaded and every row is stored before the admin is alerted; a failed
/// alert is logged and does not affect the response.
pub async fn create_submission(
    pool: web::Data<PgPool>,
    store: web::Data<dyn ObjectStore>,
    notification_service: web::Data<NotificationService>,
    owner: CampOwnerUser,
    request: web::Json<CreateSubmissionRequest>,
) -> Result<HttpResponse, MarketplaceError> {
    request
        .validate()
        .map_err(|e| MarketplaceError::Validation(format!("Validation error: {}", e)))?;

    let submission_service = SubmissionService::new(pool.get_ref().clone(), store.into_inner());
    let created = submission_service
        .create_submission(&owner.0.user_id, &request)
        .await?;

    if let Err(e) = notification_service
        .send_submission_notification(&created.notification_data())
        .await
    {
        log::warn!(
            "Failed to alert admin about submission {}: {}",
            created.submission.id,
            e
        );
    }

    Ok(HttpResponse::Created().json(created))
}

/// Lists the owner's submissions, newest first
pub async fn list_my_submissions(
    pool: web::Data<PgPool>,
    store: web::Data<dyn ObjectStore>,
    owner: CampOwnerUser,
) -> Result<HttpResponse, MarketplaceError> {
    let submission_service = SubmissionService::new(pool.get_ref().clone(), store.into_inner());
    let submissions = submission_service
        .list_owner_submissions(&owner.0.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "submissions": submissions,
        "total": submissions.len()
    })))
}
