use std::sync::Mutex;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ses::Client as SesClient;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::types::{EmailMessage, NotificationError};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Trait for email provider implementations
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Delivers `message` and returns the provider's message id.
    async fn send_email(&self, message: &EmailMessage) -> Result<String, NotificationError>;
}

/// Resend transactional email API, keyed by an API secret.
pub struct ResendEmailService {
    client: Client,
    api_key: String,
    from_email: String,
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: String,
}

impl ResendEmailService {
    /// Creates a Resend client sending as `from_email`.
    pub fn new(api_key: String, from_email: String) -> Result<Self, NotificationError> {
        if api_key.trim().is_empty() {
            return Err(NotificationError::Configuration(
                "RESEND_API_KEY is empty".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            api_key,
            from_email,
        })
    }
}

#[async_trait]
impl EmailService for ResendEmailService {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, NotificationError> {
        log::info!("📧 Sending \"{}\" to {} via Resend", message.subject, message.to);

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&ResendRequest {
                from: &self.from_email,
                to: vec![message.to.as_str()],
                subject: &message.subject,
                html: &message.html,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("❌ Resend rejected email ({}): {}", status, body);
            return Err(NotificationError::Provider(format!(
                "Failed to send email: {} {}",
                status, body
            )));
        }

        let body: ResendResponse = response.json().await?;
        log::info!("✅ Email accepted by Resend, id {}", body.id);
        Ok(body.id)
    }
}

/// AWS SES provider.
#[derive(Debug, Clone)]
pub struct SesEmailService {
    ses_client: SesClient,
    from_email: String,
}

impl SesEmailService {
    /// Loads AWS credentials from the environment and builds an SES client.
    pub async fn new(from_email: String) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        Self {
            ses_client: SesClient::new(&config),
            from_email,
        }
    }
}

#[async_trait]
impl EmailService for SesEmailService {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, NotificationError> {
        let subject_content = aws_sdk_ses::types::Content::builder()
            .data(&message.subject)
            .build()
            .map_err(|e| NotificationError::SesError(format!("Failed to build subject: {}", e)))?;

        let html_content = aws_sdk_ses::types::Content::builder()
            .data(&message.html)
            .build()
            .map_err(|e| {
                NotificationError::SesError(format!("Failed to build HTML body: {}", e))
            })?;

        let body = aws_sdk_ses::types::Body::builder().html(html_content).build();

        let ses_message = aws_sdk_ses::types::Message::builder()
            .subject(subject_content)
            .body(body)
            .build();

        let destination = aws_sdk_ses::types::Destination::builder()
            .to_addresses(&message.to)
            .build();

        log::info!("📧 Sending \"{}\" to {} via AWS SES", message.subject, message.to);

        let result = self
            .ses_client
            .send_email()
            .source(&self.from_email)
            .destination(destination)
            .message(ses_message)
            .send()
            .await;

        match result {
            Ok(output) => {
                let message_id = output.message_id().to_string();
                log::info!("✅ SES Message ID: {}", message_id);
                Ok(message_id)
            }
            Err(e) => {
                log::error!("❌ AWS SES error: {:#?}", e);
                let error_msg = if let Some(service_error) = e.as_service_error() {
                    format!("AWS SES service error: {:?}", service_error)
                } else {
                    format!("AWS SES error: {}", e)
                };
                Err(NotificationError::SesError(error_msg))
            }
        }
    }
}

/// Development provider: logs every message and keeps it in memory.
#[derive(Default)]
pub struct LogEmailService {
    outbox: Mutex<Vec<EmailMessage>>,
}

impl LogEmailService {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered so far.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EmailService for LogEmailService {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, NotificationError> {
        log::info!("📧 [LOG EMAIL] To: {}", message.to);
        log::info!("📧 [LOG EMAIL] Subject: {}", message.subject);
        log::debug!("📧 [LOG EMAIL] Body:\n{}", message.html);

        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.push(message.clone());
        }

        Ok(format!("log-email-{}", uuid::Uuid::new_v4()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_email_service_records_messages() {
        let service = LogEmailService::new();
        let id = service
            .send_email(&EmailMessage {
                to: "coach@example.com".to_string(),
                subject: "Hello".to_string(),
                html: "<p>Hi</p>".to_string(),
            })
            .await
            .unwrap();

        assert!(id.starts_with("log-email-"));
        assert_eq!(service.sent().len(), 1);
        assert_eq!(service.sent()[0].to, "coach@example.com");
    }

    #[test]
    fn test_resend_requires_api_key() {
        assert!(ResendEmailService::new("  ".to_string(), "a@b.c".to_string()).is_err());
        assert!(ResendEmailService::new("re_123".to_string(), "a@b.c".to_string()).is_ok());
    }
}
