use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::Gender;

/// One offered session of a submitted camp
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DateRangeInput {
    /// First day of the session
    pub start_date: NaiveDate,
    /// Last day of the session
    pub end_date: NaiveDate,
    /// Price per participant
    pub price: Decimal,
    /// Platform commission per participant
    pub commission: Decimal,
}

/// Image attached to a submission or camp edit, base64 encoded
#[derive(Debug, Clone, Deserialize)]
pub struct ImageUpload {
    /// Original file name, used for the extension
    pub file_name: String,
    /// MIME type reported by the client
    pub content_type: Option<String>,
    /// Base64 payload, optionally as a `data:` URL
    pub data: String,
}

/// Request structure for submitting a camp for review
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubmissionRequest {
    /// Camp name
    #[validate(length(min = 1, max = 255, message = "Camp name is required"))]
    pub camp_name: String,

    /// Public contact address of the camp
    #[validate(email(message = "Please enter a valid camp email"))]
    pub camp_email: String,

    /// Country the camp takes place in
    pub country_id: Uuid,

    /// City or venue
    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: String,

    /// Free text description
    pub description: String,

    /// Youngest accepted age
    pub age_min: i32,

    /// Oldest accepted age
    pub age_max: i32,

    /// Who the camp is open to
    pub gender: Gender,

    /// Maximum number of participants
    pub capacity: i32,

    /// Owner name, required on a first submission
    pub owner_name: Option<String>,

    /// Owner email, required on a first submission
    pub owner_email: Option<String>,

    /// Owner phone, required on a first submission
    pub owner_phone: Option<String>,

    /// Offered sessions
    pub dates: Vec<DateRangeInput>,

    /// Camp photos in the order the owner picked them
    #[serde(default)]
    pub images: Vec<ImageUpload>,

    /// Position in `images` of the cover photo
    #[serde(default)]
    pub profile_image_index: usize,
}

/// Structure representing a camp submission from the database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CampSubmission {
    /// Unique identifier, allocated before the images are uploaded
    pub id: Uuid,
    /// Camp owner who submitted it
    pub owner_id: Uuid,
    /// Camp name
    pub camp_name: String,
    /// Public contact address of the camp
    pub camp_email: String,
    /// Country the camp takes place in
    pub country_id: Uuid,
    /// City or venue
    pub location: String,
    /// Free text description
    pub description: String,
    /// Youngest accepted age
    pub age_group_min: i32,
    /// Oldest accepted age
    pub age_group_max: i32,
    /// boys, girls or both
    pub gender: String,
    /// Maximum number of participants
    pub capacity: i32,
    /// Owner name from a first submission
    pub owner_name: Option<String>,
    /// Owner email from a first submission
    pub owner_email: Option<String>,
    /// Owner phone from a first submission
    pub owner_phone: Option<String>,
    /// pending, approved or rejected
    pub status: String,
    /// Moderator's explanation, set only when rejected
    pub rejection_reason: Option<String>,
    /// When the submission was created
    pub created_at: DateTime<Utc>,
    /// When the submission was last updated
    pub updated_at: DateTime<Utc>,
}

/// Structure representing a submitted session from the database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SubmissionDate {
    /// Unique identifier
    pub id: Uuid,
    /// Owning submission
    pub submission_id: Uuid,
    /// First day
    pub start_date: NaiveDate,
    /// Last day
    pub end_date: NaiveDate,
    /// Inclusive number of days
    pub duration_days: i32,
    /// Price per participant
    pub price: Decimal,
    /// Platform commission per participant
    pub commission: Decimal,
}

/// Structure representing a submitted photo from the database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SubmissionImage {
    /// Unique identifier
    pub id: Uuid,
    /// Owning submission
    pub submission_id: Uuid,
    /// Public URL in the image bucket
    pub image_url: String,
    /// Display position, 0 is the cover photo
    pub image_order: i32,
}

/// Submission with its country name, as listed to admins
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SubmissionSummary {
    /// Submission row
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub submission: CampSubmission,
    /// Name of the submission's country
    pub country_name: Option<String>,
}

/// Submission with everything needed to review it
#[derive(Debug, Serialize)]
pub struct SubmissionDetail {
    /// Submission row
    #[serde(flatten)]
    pub submission: CampSubmission,
    /// Name of the submission's country
    pub country_name: Option<String>,
    /// Offered sessions ordered by start date
    pub dates: Vec<SubmissionDate>,
    /// Photos ordered by display position
    pub images: Vec<SubmissionImage>,
}

/// Request structure for declining a submission
#[derive(Debug, Deserialize)]
pub struct RejectSubmissionRequest {
    /// Explanation sent to the owner
    pub reason: String,
}

/// Result of approving a submission
#[derive(Debug, Serialize)]
pub struct ApprovalOutcome {
    /// The submission, now approved
    pub submission: CampSubmission,
    /// Camps created, one per session
    pub camp_ids: Vec<Uuid>,
    /// Name used to greet the owner
    #[serde(skip)]
    pub owner_name: String,
}

/// Result of declining a submission
#[derive(Debug, Serialize)]
pub struct RejectionOutcome {
    /// The submission, now rejected
    pub submission: CampSubmission,
    /// Name used to greet the owner
    #[serde(skip)]
    pub owner_name: String,
}
