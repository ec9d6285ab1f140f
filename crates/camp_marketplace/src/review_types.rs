use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request structure for reviewing a camp
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    /// Stars from 1 to 5
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    /// Review body
    #[validate(length(min = 1, max = 5000, message = "Review text is required"))]
    pub review_text: String,

    /// Name shown with the review, defaults to the profile name
    pub participant_name: Option<String>,

    /// Address receiving the verification link, defaults to the profile email
    #[validate(email(message = "Please enter a valid email"))]
    pub participant_email: Option<String>,
}

/// Structure representing a review from the database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    /// Unique identifier
    pub id: Uuid,
    /// Reviewed camp
    pub camp_id: Uuid,
    /// Author
    pub user_id: Uuid,
    /// Name shown with the review
    pub participant_name: String,
    /// Address the verification link was sent to
    pub participant_email: String,
    /// Stars from 1 to 5
    pub rating: i32,
    /// Review body
    pub review_text: String,
    /// Secret embedded in the verification link
    #[serde(skip_serializing)]
    pub verification_token: String,
    /// pending_email_verification, published or rejected
    pub status: String,
    /// When the participant confirmed their email
    pub verified_at: Option<DateTime<Utc>>,
    /// When the review was written
    pub created_at: DateTime<Utc>,
}

/// Structure representing an owner reply from the database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReviewReply {
    /// Unique identifier
    pub id: Uuid,
    /// Review answered
    pub review_id: Uuid,
    /// Camp owner who replied
    pub camp_owner_id: Uuid,
    /// Reply body
    pub reply_text: String,
    /// When the reply was written
    pub created_at: DateTime<Utc>,
}

/// Review with the owner's replies
#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithReplies {
    /// Review row
    #[serde(flatten)]
    pub review: Review,
    /// Replies, oldest first
    pub replies: Vec<ReviewReply>,
}

/// Response body of "my reviews"
#[derive(Debug, Serialize)]
pub struct MyReviews {
    /// The user's reviews, newest first
    pub reviews: Vec<Review>,
    /// Camps the user has requested a booking for
    pub booked_camp_ids: Vec<Uuid>,
}

/// Request structure for answering a review
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReplyRequest {
    /// Reply body
    #[validate(length(min = 1, max = 5000, message = "Reply text is required"))]
    pub reply_text: String,
}
