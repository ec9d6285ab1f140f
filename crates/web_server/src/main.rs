//! Main entry point for the Basketball Camps Marketplace backend server.
//! This crate provides REST API endpoints and serves the frontend application.

mod config;

use std::path::Path;
use std::sync::Arc;

use actix_files::Files;
use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use auth_services::jwt::JwtService;
use notification_services::{
    EmailService, LogEmailService, NotificationService, ResendEmailService, SesEmailService,
};
use object_storage::{HttpObjectStore, MemoryObjectStore, ObjectStore};
use postgres::database::*;
use web_handlers::OwnerDashboardTimeout;

use crate::config::{Config, EmailProvider};

fn get_frontend_path() -> &'static str {
    // Check multiple possible locations for frontend files
    if Path::new("./frontend-build").exists() {
        log::info!("✅ Using Docker frontend path: ./frontend-build");
        "./frontend-build"
    } else if Path::new("../frontend/build").exists() {
        log::info!("✅ Using local frontend path: ../frontend/build");
        "../frontend/build"
    } else {
        log::info!("❌ Frontend files not found in either location");
        "./frontend-build" // fallback
    }
}

async fn build_email_service(config: &Config) -> anyhow::Result<Arc<dyn EmailService>> {
    let service: Arc<dyn EmailService> = match config.email_provider {
        EmailProvider::Resend => {
            let api_key = config
                .resend_api_key
                .clone()
                .context("RESEND_API_KEY must be set when EMAIL_PROVIDER=resend")?;
            Arc::new(ResendEmailService::new(api_key, config.from_email.clone())?)
        }
        EmailProvider::Ses => Arc::new(SesEmailService::new(config.from_email.clone()).await),
        EmailProvider::Log => {
            log::warn!("📭 EMAIL_PROVIDER=log: emails are logged, not delivered");
            Arc::new(LogEmailService::new())
        }
    };

    Ok(service)
}

fn build_object_store(config: &Config) -> Arc<dyn ObjectStore> {
    match &config.storage {
        Some(storage) => {
            log::info!("🪣 Uploading images to bucket '{}'", storage.bucket);
            Arc::new(HttpObjectStore::new(
                &storage.url,
                storage.service_key.clone(),
                storage.bucket.clone(),
            ))
        }
        None => {
            log::warn!("🪣 Development storage: images are kept in memory and lost on restart");
            Arc::new(MemoryObjectStore::new(&format!(
                "{}/camp-images",
                config.public_base_url.trim_end_matches('/')
            )))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting basketball camps marketplace server...");

    let config = Config::from_env().context("Invalid server configuration")?;

    let pool = create_connection_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;
    log::info!("🗃️ Database pool created successfully");

    if let Err(e) = test_connection(&pool).await {
        log::error!("❌ Database connection test failed: {}", e);
    }
    run_migrations(&pool)
        .await
        .context("Failed to apply database migrations")?;

    let email_service = build_email_service(&config).await?;
    let notification_service = web::Data::new(NotificationService::new(
        email_service,
        config.admin_email.clone(),
        config.public_base_url.clone(),
    ));
    log::info!("📧 Notification service initialized ({:?})", config.email_provider);

    let store = web::Data::from(build_object_store(&config));
    let jwt_service = JwtService::new(&config.jwt_secret);
    let dashboard_timeout = OwnerDashboardTimeout(config.owner_dashboard_timeout);

    let frontend_path = get_frontend_path();
    log::info!("📁 Frontend files location: {}", frontend_path);
    log::info!("🌐 Server will be available at: http://{}", config.bind_address);

    HttpServer::new(move || {
        let jwt_service = jwt_service.clone();

        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(notification_service.clone())
            .app_data(store.clone())
            .app_data(web::Data::new(jwt_service.clone()))
            .app_data(web::Data::new(dashboard_timeout))
            .wrap(Logger::default())
            .configure(move |cfg| web_handlers::routes::configure(cfg, jwt_service))
            .service(Files::new("/", frontend_path).index_file("index.html"))
    })
    .bind(&config.bind_address)
    .with_context(|| format!("Failed to bind {}", config.bind_address))?
    .run()
    .await?;

    Ok(())
}
