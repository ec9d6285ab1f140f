use std::sync::Arc;

use rand::Rng;

use crate::providers::EmailService;
use crate::templates;
use crate::types::{
    ApprovalEmailData, NotificationError, RejectionEmailData, ReviewVerificationData,
    SubmissionNotificationData,
};

const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const TOKEN_LENGTH: usize = 32;

/// Notification service for the marketplace emails.
#[derive(Clone)]
pub struct NotificationService {
    email_service: Arc<dyn EmailService>,
    admin_email: String,
    public_base_url: String,
}

impl NotificationService {
    /// Creates a notification service delivering through `email_service`.
    pub fn new(
        email_service: Arc<dyn EmailService>,
        admin_email: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            email_service,
            admin_email: admin_email.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Address copied on booking requests and alerted about submissions.
    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    /// Tells the owner their camp is live.
    pub async fn send_camp_approval(
        &self,
        data: &ApprovalEmailData,
    ) -> Result<String, NotificationError> {
        self.email_service
            .send_email(&templates::camp_approval(data))
            .await
    }

    /// Tells the owner why their submission was declined.
    pub async fn send_camp_rejection(
        &self,
        data: &RejectionEmailData,
    ) -> Result<String, NotificationError> {
        self.email_service
            .send_email(&templates::camp_rejection(data))
            .await
    }

    /// Alerts the admin inbox about a new submission.
    pub async fn send_submission_notification(
        &self,
        data: &SubmissionNotificationData,
    ) -> Result<String, NotificationError> {
        self.email_service
            .send_email(&templates::submission_notification(&self.admin_email, data))
            .await
    }

    /// Mails the review verification link for `token` to `participant_email`.
    pub async fn send_review_verification(
        &self,
        participant_email: &str,
        token: &str,
    ) -> Result<String, NotificationError> {
        let data = ReviewVerificationData {
            participant_email: participant_email.to_string(),
            verification_url: self.review_verification_url(token),
        };

        self.email_service
            .send_email(&templates::review_verification(&data))
            .await
    }

    /// Link embedding a review verification token.
    pub fn review_verification_url(&self, token: &str) -> String {
        format!("{}/verify-review?token={}", self.public_base_url, token)
    }

    /// Generate secure token for email links
    pub fn generate_verification_token() -> String {
        let mut rng = rand::rng();
        (0..TOKEN_LENGTH)
            .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LogEmailService;

    #[test]
    fn test_generate_verification_token() {
        let token = NotificationService::generate_verification_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, NotificationService::generate_verification_token());
    }

    #[tokio::test]
    async fn test_review_verification_link_embeds_token() {
        let outbox = Arc::new(LogEmailService::new());
        let service = NotificationService::new(
            outbox.clone(),
            "admin@example.com",
            "https://camps.example.com/",
        );

        service
            .send_review_verification("player@example.com", "abc123")
            .await
            .unwrap();

        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "player@example.com");
        assert!(
            sent[0]
                .html
                .contains("https://camps.example.com/verify-review?token=abc123")
        );
    }
}
