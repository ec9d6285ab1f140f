use actix_web::{HttpResponse, Result, web};
use object_storage::ObjectStore;
use sqlx::PgPool;
use uuid::Uuid;

use camp_marketplace::{CampListQuery, CampListResponse, CampService, MarketplaceError};

/// Health check endpoint
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "service": "camps-marketplace",
        "status": "healthy",
        "timestamp": chrono::Utc::now()
    })))
}

/// Lists every country, ordered by name
pub async fn list_countries(
    pool: web::Data<PgPool>,
    store: web::Data<dyn ObjectStore>,
) -> Result<HttpResponse, MarketplaceError> {
    let camp_service = CampService::new(pool.get_ref().clone(), store.into_inner());
    let countries = camp_service.list_countries().await?;

    Ok(HttpResponse::Ok().json(countries))
}

/// Lists approved camps matching the country, gender and month filters
pub async fn list_camps(
    pool: web::Data<PgPool>,
    store: web::Data<dyn ObjectStore>,
    query: web::Query<CampListQuery>,
) -> Result<HttpResponse, MarketplaceError> {
    let filter = query.into_inner().into_filter()?;

    let camp_service = CampService::new(pool.get_ref().clone(), store.into_inner());
    let camps = camp_service.list_camps(&filter).await?;

    Ok(HttpResponse::Ok().json(CampListResponse::new(camps, &filter)))
}

/// Gets the public page of an approved camp
pub async fn get_camp(
    pool: web::Data<PgPool>,
    store: web::Data<dyn ObjectStore>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, MarketplaceError> {
    let camp_id = path.into_inner();
    let camp_service = CampService::new(pool.get_ref().clone(), store.into_inner());
    let camp = camp_service.get_camp_detail(&camp_id).await?;

    Ok(HttpResponse::Ok().json(camp))
}
