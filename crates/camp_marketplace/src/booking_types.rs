use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request structure for asking a camp for a place
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    /// Camp to book
    pub camp_id: Uuid,

    /// Name of the player attending
    #[validate(length(min = 1, max = 255, message = "Participant name is required"))]
    pub participant_name: String,

    /// Age of the player attending
    #[validate(range(min = 1, max = 120, message = "Age must be between 1 and 120"))]
    pub participant_age: i32,

    /// Contact address for the camp
    #[validate(email(message = "Please enter a valid email"))]
    pub participant_email: String,

    /// Contact phone for the camp
    #[validate(length(min = 1, max = 50, message = "Phone number is required"))]
    pub participant_phone: String,

    /// Optional note to the camp
    #[serde(default)]
    #[validate(length(max = 5000, message = "Message is too long"))]
    pub message: String,
}

/// Structure representing a booking request from the database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BookingRequest {
    /// Unique identifier
    pub id: Uuid,
    /// Requested camp
    pub camp_id: Uuid,
    /// User who made the request
    pub user_id: Uuid,
    /// Name of the player attending
    pub participant_name: String,
    /// Age of the player attending
    pub participant_age: i32,
    /// Contact address
    pub participant_email: String,
    /// Contact phone
    pub participant_phone: String,
    /// Note to the camp
    pub message: String,
    /// When the request was made
    pub created_at: DateTime<Utc>,
}

/// Booking request with the camp it targets, as listed to its author
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct BookingWithCamp {
    /// Booking row
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: BookingRequest,
    /// Camp name
    pub camp_name: String,
    /// First day of the camp
    pub start_date: NaiveDate,
    /// Last day of the camp
    pub end_date: NaiveDate,
    /// City or venue
    pub location: String,
}

/// Response structure for a stored booking request
#[derive(Debug, Serialize)]
pub struct CreatedBooking {
    /// Stored request
    pub booking: BookingRequest,
    /// Prefilled email to the camp, copied to the admin inbox
    pub mailto_link: String,
}
