use std::future::Future;
use std::time::Duration;

use actix_web::{HttpResponse, Result, web};
use object_storage::ObjectStore;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use auth_services::middleware::CampOwnerUser;
use camp_marketplace::{
    CampService, CreateReplyRequest, MarketplaceError, ReviewService, UpdateCampRequest,
};

/// How long the owner camp list may take before the request is abandoned
#[derive(Debug, Clone, Copy)]
pub struct OwnerDashboardTimeout(pub Duration);

impl Default for OwnerDashboardTimeout {
    fn default() -> Self {
        Self(Duration::from_secs(5))
    }
}

/// Runs `operation`, giving up with [`MarketplaceError::Timeout`] after `limit`.
pub async fn with_watchdog<T, F>(limit: Duration, operation: F) -> Result<T, MarketplaceError>
where
    F: Future<Output = Result<T, MarketplaceError>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => {
            log::warn!("⏱️ Owner request abandoned after {:?}", limit);
            Err(MarketplaceError::Timeout)
        }
    }
}

/// Lists the owner's camps with their dates, newest first
pub async fn list_owner_camps(
    pool: web::Data<PgPool>,
    store: web::Data<dyn ObjectStore>,
    timeout: web::Data<OwnerDashboardTimeout>,
    owner: CampOwnerUser,
) -> Result<HttpResponse, MarketplaceError> {
    let camp_service = CampService::new(pool.get_ref().clone(), store.into_inner());
    let camps = with_watchdog(timeout.0, camp_service.list_owner_camps(&owner.0.user_id)).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "camps": camps,
        "total": camps.len()
    })))
}

/// Owner overview: camps, booking requests and reviews
pub async fn owner_dashboard(
    pool: web::Data<PgPool>,
    store: web::Data<dyn ObjectStore>,
    timeout: web::Data<OwnerDashboardTimeout>,
    owner: CampOwnerUser,
) -> Result<HttpResponse, MarketplaceError> {
    let camp_service = CampService::new(pool.get_ref().clone(), store.into_inner());
    let dashboard =
        with_watchdog(timeout.0, camp_service.owner_dashboard(&owner.0.user_id)).await?;

    Ok(HttpResponse::Ok().json(dashboard))
}

/// Gets one of the owner's camps for editing
pub async fn get_owner_camp(
    pool: web::Data<PgPool>,
    store: web::Data<dyn ObjectStore>,
    owner: CampOwnerUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, MarketplaceError> {
    let camp_id = path.into_inner();
    let camp_service = CampService::new(pool.get_ref().clone(), store.into_inner());
    let camp = camp_service
        .get_owner_camp(&owner.0.user_id, &camp_id)
        .await?;

    Ok(HttpResponse::Ok().json(camp))
}

/// Saves an owner's camp edit
pub async fn update_owner_camp(
    pool: web::Data<PgPool>,
    store: web::Data<dyn ObjectStore>,
    owner: CampOwnerUser,
    path: web::Path<Uuid>,
    request: web::Json<UpdateCampRequest>,
) -> Result<HttpResponse, MarketplaceError> {
    request
        .validate()
        .map_err(|e| MarketplaceError::Validation(format!("Validation error: {}", e)))?;

    let camp_id = path.into_inner();
    let camp_service = CampService::new(pool.get_ref().clone(), store.into_inner());
    let camp = camp_service
        .update_camp(&owner.0.user_id, &camp_id, &request)
        .await?;

    Ok(HttpResponse::Ok().json(camp))
}

/// Removes a photo from one of the owner's camps
pub async fn delete_owner_camp_image(
    pool: web::Data<PgPool>,
    store: web::Data<dyn ObjectStore>,
    owner: CampOwnerUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, MarketplaceError> {
    let (camp_id, image_id) = path.into_inner();
    let camp_service = CampService::new(pool.get_ref().clone(), store.into_inner());
    camp_service
        .delete_camp_image(&owner.0.user_id, &camp_id, &image_id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Replies to a review of one of the owner's camps
pub async fn reply_to_review(
    pool: web::Data<PgPool>,
    owner: CampOwnerUser,
    path: web::Path<Uuid>,
    request: web::Json<CreateReplyRequest>,
) -> Result<HttpResponse, MarketplaceError> {
    request
        .validate()
        .map_err(|e| MarketplaceError::Validation(format!("Validation error: {}", e)))?;

    let review_id = path.into_inner();
    let review_service = ReviewService::new(pool.get_ref().clone());
    let reply = review_service
        .reply_to_review(&owner.0.user_id, &review_id, &request)
        .await?;

    Ok(HttpResponse::Created().json(reply))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_watchdog_times_out() {
        let result: Result<(), _> = with_watchdog(
            Duration::from_millis(10),
            std::future::pending::<Result<(), MarketplaceError>>(),
        )
        .await;

        assert!(matches!(result, Err(MarketplaceError::Timeout)));
    }

    #[actix_web::test]
    async fn test_watchdog_passes_through_results() {
        let ok = with_watchdog(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<(), _> = with_watchdog(Duration::from_secs(1), async {
            Err(MarketplaceError::NotFound("Camp".to_string()))
        })
        .await;
        assert!(matches!(err, Err(MarketplaceError::NotFound(_))));
    }
}
