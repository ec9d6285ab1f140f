//! Named routes and their guards.
//!
//! Authentication is enforced by [`AuthMiddleware`] on each protected scope; role checks
//! happen in the `CampOwnerUser` and `AdminUser` extractors of the handlers themselves.

use actix_web::http::Method;
use actix_web::{HttpResponse, middleware::DefaultHeaders, web};
use auth_services::jwt::JwtService;
use auth_services::middleware::AuthMiddleware;

use crate::*;

fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add((
            "Access-Control-Allow-Headers",
            "authorization, x-client-info, apikey, content-type",
        ))
        .add(("Access-Control-Allow-Methods", "POST, OPTIONS"))
}

fn preflight() -> actix_web::Route {
    web::route()
        .method(Method::OPTIONS)
        .to(notification_preflight)
}

/// Registers every marketplace route. `jwt_service` verifies bearer tokens on protected scopes.
pub fn configure(cfg: &mut web::ServiceConfig, jwt_service: JwtService) {
    let auth = || AuthMiddleware::new(jwt_service.clone());

    cfg.route(
        "/health",
        web::get().to(|| async { HttpResponse::Ok().body("OK") }),
    )
    .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health))
            .route("/countries", web::get().to(list_countries))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(signup))
                    .route("/login", web::post().to(login)),
            )
            .service(
                web::scope("/camps")
                    .route("", web::get().to(list_camps))
                    .route("/{camp_id}", web::get().to(get_camp))
                    .service(
                        web::resource("/{camp_id}/reviews")
                            .wrap(auth())
                            .route(web::post().to(create_review)),
                    ),
            )
            // Any signed-in user
            .service(
                web::scope("/user")
                    .wrap(auth())
                    .route("/profile", web::get().to(get_profile))
                    .route("/profile", web::put().to(update_profile)),
            )
            .service(
                web::scope("/bookings")
                    .wrap(auth())
                    .route("", web::post().to(create_booking))
                    .route("", web::get().to(list_my_bookings)),
            )
            .service(
                web::scope("/reviews")
                    .wrap(auth())
                    .route("", web::get().to(list_my_reviews)),
            )
            // Camp owners
            .service(
                web::scope("/submissions")
                    .wrap(auth())
                    .route("", web::post().to(create_submission))
                    .route("", web::get().to(list_my_submissions)),
            )
            .service(
                web::scope("/owner")
                    .wrap(auth())
                    .route("/camps", web::get().to(list_owner_camps))
                    .route("/dashboard", web::get().to(owner_dashboard))
                    .route("/camps/{camp_id}", web::get().to(get_owner_camp))
                    .route("/camps/{camp_id}", web::put().to(update_owner_camp))
                    .route(
                        "/camps/{camp_id}/images/{image_id}",
                        web::delete().to(delete_owner_camp_image),
                    )
                    .route(
                        "/reviews/{review_id}/replies",
                        web::post().to(reply_to_review),
                    ),
            )
            // Admins
            .service(
                web::scope("/admin")
                    .wrap(auth())
                    .route("/submissions", web::get().to(list_pending_submissions))
                    .route("/submissions/{submission_id}", web::get().to(get_submission))
                    .route(
                        "/submissions/{submission_id}/approve",
                        web::post().to(approve_submission),
                    )
                    .route(
                        "/submissions/{submission_id}/reject",
                        web::post().to(reject_submission),
                    ),
            ),
    )
    .service(
        web::scope("/functions")
            .wrap(cors_headers())
            .service(
                web::resource("/send-camp-approval-email")
                    .route(web::post().to(send_camp_approval_email))
                    .route(preflight()),
            )
            .service(
                web::resource("/send-camp-rejection-email")
                    .route(web::post().to(send_camp_rejection_email))
                    .route(preflight()),
            )
            .service(
                web::resource("/send-review-verification")
                    .route(web::post().to(send_review_verification))
                    .route(preflight()),
            )
            .service(
                web::resource("/send-camp-submission-notification")
                    .route(web::post().to(send_camp_submission_notification))
                    .route(preflight()),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use async_trait::async_trait;
    use auth_services::types::{UserProfile, UserType};
    use notification_services::types::{EmailMessage, NotificationError};
    use notification_services::{EmailService, LogEmailService, NotificationService};
    use object_storage::{MemoryObjectStore, ObjectStore};
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    const SECRET: &str = "test-secret";

    struct FailingEmailService;

    #[async_trait]
    impl EmailService for FailingEmailService {
        async fn send_email(&self, _: &EmailMessage) -> Result<String, NotificationError> {
            Err(NotificationError::Provider("provider down".to_string()))
        }
    }

    fn token_for(user_type: UserType) -> String {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            password_hash: String::new(),
            user_type: user_type.as_str().to_string(),
            full_name: "Test User".to_string(),
            phone: None,
            country: None,
            commission_per_participant: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        JwtService::new(SECRET)
            .generate_access_token(&profile)
            .unwrap()
    }

    fn bearer(user_type: UserType) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", token_for(user_type)))
    }

    // Never connects unless a handler reaches the database
    fn lazy_pool() -> sqlx::PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/camps_marketplace_test")
            .unwrap()
    }

    macro_rules! app {
        ($email_service:expr) => {{
            let store: Arc<dyn ObjectStore> =
                Arc::new(MemoryObjectStore::new("http://localhost/camp-images"));
            test::init_service(
                App::new()
                    .app_data(web::Data::new(lazy_pool()))
                    .app_data(web::Data::new(NotificationService::new(
                        $email_service,
                        "admin@example.com",
                        "https://camps.example.com",
                    )))
                    .app_data(web::Data::from(store))
                    .app_data(web::Data::new(JwtService::new(SECRET)))
                    .app_data(web::Data::new(OwnerDashboardTimeout::default()))
                    .configure(|cfg| configure(cfg, JwtService::new(SECRET))),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_health() {
        let app = app!(Arc::new(LogEmailService::new()));
        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_approval_email_endpoint() {
        let outbox = Arc::new(LogEmailService::new());
        let app = app!(outbox.clone());

        let req = test::TestRequest::post()
            .uri("/functions/send-camp-approval-email")
            .set_json(serde_json::json!({
                "campName": "Hoops Academy",
                "campEmail": "camp@example.com",
                "ownerName": "Ana"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert!(body["emailId"].as_str().unwrap().starts_with("log-email-"));

        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "camp@example.com");
    }

    #[actix_web::test]
    async fn test_provider_failure_returns_error_body() {
        let app = app!(Arc::new(FailingEmailService));

        let req = test::TestRequest::post()
            .uri("/functions/send-camp-rejection-email")
            .set_json(serde_json::json!({
                "campName": "Hoops Academy",
                "campEmail": "camp@example.com",
                "ownerName": "Ana",
                "rejectionReason": "Missing photos"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("provider down"));
    }

    #[actix_web::test]
    async fn test_preflight() {
        let app = app!(Arc::new(LogEmailService::new()));

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/functions/send-camp-submission-notification")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Methods").unwrap(),
            "POST, OPTIONS"
        );
    }

    #[actix_web::test]
    async fn test_review_verification_requires_review_id() {
        let app = app!(Arc::new(LogEmailService::new()));

        let req = test::TestRequest::post()
            .uri("/functions/send-review-verification")
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Review ID is required");
    }

    #[actix_web::test]
    async fn test_protected_routes_require_token() {
        let app = app!(Arc::new(LogEmailService::new()));

        let req = test::TestRequest::get().uri("/api/bookings").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/user/profile")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_role_guards() {
        let app = app!(Arc::new(LogEmailService::new()));

        let req = test::TestRequest::get()
            .uri("/api/admin/submissions")
            .insert_header(bearer(UserType::CampOwner))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );

        let req = test::TestRequest::post()
            .uri(&format!("/api/admin/submissions/{}/approve", Uuid::new_v4()))
            .insert_header(bearer(UserType::Regular))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );

        let req = test::TestRequest::get()
            .uri("/api/submissions")
            .insert_header(bearer(UserType::Regular))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );
    }

    #[actix_web::test]
    async fn test_booking_validation_runs_before_any_write() {
        let app = app!(Arc::new(LogEmailService::new()));

        let req = test::TestRequest::post()
            .uri("/api/bookings")
            .insert_header(bearer(UserType::Regular))
            .set_json(serde_json::json!({
                "camp_id": Uuid::new_v4(),
                "participant_name": "Leo",
                "participant_age": 0,
                "participant_email": "leo@example.com",
                "participant_phone": "+34 600 000 000"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation_error");
    }

    #[actix_web::test]
    async fn test_listing_rejects_invalid_month() {
        let app = app!(Arc::new(LogEmailService::new()));

        let req = test::TestRequest::get()
            .uri("/api/camps?months=13")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
