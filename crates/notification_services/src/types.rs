use serde::{Deserialize, Serialize};

/// Errors raised while rendering or delivering notifications.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The email provider rejected the message.
    #[error("Email provider error: {0}")]
    Provider(String),

    /// Simple email service (SES) errors.
    #[error("AWS SES error: {0}")]
    SesError(String),

    /// Transport failure reaching the provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Missing or invalid provider configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid email format.
    #[error("Invalid email format")]
    InvalidEmail,
}

/// A fully rendered outgoing email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
}

/// Payload of the approval notice.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalEmailData {
    /// Name of the approved camp
    pub camp_name: String,
    /// Camp contact address receiving the notice
    pub camp_email: String,
    /// Owner name used in the greeting
    pub owner_name: String,
}

/// Payload of the rejection notice.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionEmailData {
    /// Name of the rejected camp
    pub camp_name: String,
    /// Camp contact address receiving the notice
    pub camp_email: String,
    /// Owner name used in the greeting
    pub owner_name: String,
    /// Moderator's explanation
    pub rejection_reason: String,
}

/// One date range listed in the admin submission alert.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDateSummary {
    /// First day
    pub start_date: String,
    /// Last day
    pub end_date: String,
    /// Price per participant, formatted
    pub price: String,
    /// Inclusive number of days
    pub days: i32,
}

/// Payload of the admin alert for a new camp submission.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionNotificationData {
    /// Proposed camp name
    pub camp_name: String,
    /// Owner name, when provided
    #[serde(default)]
    pub owner_name: String,
    /// Owner email, when provided
    #[serde(default)]
    pub owner_email: String,
    /// Owner phone, when provided
    #[serde(default)]
    pub owner_phone: String,
    /// Camp contact address
    pub camp_email: String,
    /// City or venue
    pub location: String,
    /// Country name
    pub country: String,
    /// Free text description
    pub description: String,
    /// Youngest accepted age
    pub age_min: i32,
    /// Oldest accepted age
    pub age_max: i32,
    /// boys, girls or both
    pub gender: String,
    /// Participant capacity
    pub capacity: i32,
    /// Offered date ranges
    pub camp_dates: Vec<SubmissionDateSummary>,
    /// Public image URLs in display order
    pub image_urls: Vec<String>,
    /// Cover image URL
    pub profile_image_url: Option<String>,
}

/// Data needed to mail a review verification link.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewVerificationData {
    /// Address that receives the link
    pub participant_email: String,
    /// Link embedding the verification token
    pub verification_url: String,
}

/// Body returned by notification endpoints on success.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    /// Always true
    pub success: bool,
    /// Provider message id
    pub email_id: String,
}
