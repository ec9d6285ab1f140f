use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use postgres::database::DEFAULT_DATABASE_URL;

/// Which transport delivers outgoing email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailProvider {
    Resend,
    Ses,
    /// Logs messages instead of sending them
    Log,
}

impl FromStr for EmailProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resend" => Ok(Self::Resend),
            "ses" => Ok(Self::Ses),
            "log" => Ok(Self::Log),
            other => bail!("Unknown EMAIL_PROVIDER '{}' (expected resend, ses or log)", other),
        }
    }
}

/// Bucket-style object storage endpoint
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub url: String,
    pub service_key: String,
    pub bucket: String,
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: String,
    pub public_base_url: String,
    pub admin_email: String,
    pub email_provider: EmailProvider,
    pub resend_api_key: Option<String>,
    pub from_email: String,
    /// `None` keeps uploads in memory (development only)
    pub storage: Option<StorageConfig>,
    pub owner_dashboard_timeout: Duration,
}

impl Config {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let email_provider: EmailProvider = env::var("EMAIL_PROVIDER")
            .unwrap_or_else(|_| "log".to_string())
            .parse()?;
        let allow_memory_storage = match env::var("ALLOW_MEMORY_STORAGE").ok() {
            Some(value) => value
                .trim()
                .parse()
                .context("ALLOW_MEMORY_STORAGE must be true or false")?,
            None => email_provider == EmailProvider::Log,
        };
        let storage = storage_config(
            env::var("STORAGE_URL").ok(),
            env::var("STORAGE_SERVICE_KEY").ok(),
            env::var("STORAGE_BUCKET").unwrap_or_else(|_| "camp-images".to_string()),
            allow_memory_storage,
        )?;

        let timeout_secs: u64 = env::var("OWNER_DASHBOARD_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("OWNER_DASHBOARD_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            admin_email: env::var("ADMIN_EMAIL").context("ADMIN_EMAIL must be set")?,
            email_provider,
            resend_api_key: env::var("RESEND_API_KEY").ok(),
            from_email: env::var("FROM_EMAIL")
                .unwrap_or_else(|_| "Basketball Camps <noreply@basketballcamps.eu>".to_string()),
            storage,
            owner_dashboard_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Picks the image bucket. Without `STORAGE_URL` uploads live in memory and vanish on
/// restart, which is only accepted for development runs.
fn storage_config(
    url: Option<String>,
    service_key: Option<String>,
    bucket: String,
    allow_memory_storage: bool,
) -> Result<Option<StorageConfig>> {
    match url {
        Some(url) => Ok(Some(StorageConfig {
            url,
            service_key: service_key
                .context("STORAGE_SERVICE_KEY must be set when STORAGE_URL is set")?,
            bucket,
        })),
        None if allow_memory_storage => Ok(None),
        None => bail!(
            "STORAGE_URL must be set (use EMAIL_PROVIDER=log or ALLOW_MEMORY_STORAGE=true for development)"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_provider_parsing() {
        assert_eq!("resend".parse::<EmailProvider>().unwrap(), EmailProvider::Resend);
        assert_eq!(" SES ".parse::<EmailProvider>().unwrap(), EmailProvider::Ses);
        assert_eq!("log".parse::<EmailProvider>().unwrap(), EmailProvider::Log);

        let err = "smtp".parse::<EmailProvider>().unwrap_err();
        assert!(err.to_string().contains("smtp"));
    }

    #[test]
    fn test_memory_storage_only_for_development() {
        let err = storage_config(None, None, "camp-images".to_string(), false).unwrap_err();
        assert!(err.to_string().contains("STORAGE_URL"));

        assert!(
            storage_config(None, None, "camp-images".to_string(), true)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_bucket_storage_needs_service_key() {
        let url = Some("https://storage.example.com".to_string());
        assert!(storage_config(url.clone(), None, "camp-images".to_string(), false).is_err());

        let storage = storage_config(url, Some("key".to_string()), "camp-images".to_string(), false)
            .unwrap()
            .unwrap();
        assert_eq!(storage.bucket, "camp-images");
        assert_eq!(storage.service_key, "key");
    }
}
