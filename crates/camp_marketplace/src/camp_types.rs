use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{BookingRequest, Gender, ImageUpload, Review, ReviewWithReplies};

/// Structure representing a country from the database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Country {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// ISO 3166 alpha-2 code
    pub country_code: String,
    /// Flag emoji shown next to the name
    pub flag_emoji: Option<String>,
}

/// Structure representing a published camp from the database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Camp {
    /// Unique identifier
    pub id: Uuid,
    /// Submission the camp was created from
    pub submission_id: Option<Uuid>,
    /// Camp owner
    pub owner_id: Uuid,
    /// Country the camp takes place in
    pub country_id: Uuid,
    /// Camp name
    pub camp_name: String,
    /// Public contact address, receives booking requests
    pub camp_email: String,
    /// City or venue
    pub location: String,
    /// Free text description
    pub description: String,
    /// First day, fixed at approval
    pub start_date: NaiveDate,
    /// Last day, fixed at approval
    pub end_date: NaiveDate,
    /// Inclusive number of days
    pub duration_days: i32,
    /// Price per participant, fixed at approval
    pub price: Decimal,
    /// Youngest accepted age
    pub age_group_min: i32,
    /// Oldest accepted age
    pub age_group_max: i32,
    /// boys, girls or both
    pub gender: String,
    /// Maximum number of participants
    pub capacity: i32,
    /// Publication state
    pub status: String,
    /// Admin who approved the submission
    pub approved_by: Option<Uuid>,
    /// When the submission was approved
    pub approved_at: Option<DateTime<Utc>>,
    /// When the camp was created
    pub created_at: DateTime<Utc>,
    /// When the camp was last edited
    pub updated_at: DateTime<Utc>,
}

/// Camp with its country name and cover photo, as shown in listings
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CampListing {
    /// Camp row
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub camp: Camp,
    /// Name of the camp's country
    pub country_name: Option<String>,
    /// URL of the image at position 0
    pub cover_image_url: Option<String>,
}

/// Camps of one country, for display
#[derive(Debug, Serialize)]
pub struct CountryGroup {
    /// Country name
    pub country_name: String,
    /// Camps in start date order
    pub camps: Vec<CampListing>,
}

/// Response body of the public catalogue
#[derive(Debug, Serialize)]
pub struct CampListResponse {
    /// Matching camps ordered by start date
    pub camps: Vec<CampListing>,
    /// Number of matching camps
    pub total: usize,
    /// Same camps grouped by country, only when no country filter is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_country: Option<Vec<CountryGroup>>,
}

/// A session of a published camp
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CampDate {
    /// Unique identifier
    pub id: Uuid,
    /// Owning camp
    pub camp_id: Uuid,
    /// First day
    pub start_date: NaiveDate,
    /// Last day
    pub end_date: NaiveDate,
    /// Inclusive number of days
    pub duration_days: i32,
    /// Price per participant
    pub price: Decimal,
}

/// A photo of a published camp
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CampImage {
    /// Unique identifier
    pub id: Uuid,
    /// Owning camp
    pub camp_id: Uuid,
    /// Public URL in the image bucket
    pub image_url: String,
    /// Display position, 0 is the cover photo
    pub image_order: i32,
}

/// Public camp page
#[derive(Debug, Serialize)]
pub struct CampDetail {
    /// Camp with country and cover photo
    #[serde(flatten)]
    pub listing: CampListing,
    /// Sessions of the camp
    pub dates: Vec<CampDate>,
    /// Photos in display order
    pub images: Vec<CampImage>,
    /// Published reviews, newest first
    pub reviews: Vec<ReviewWithReplies>,
    /// Mean rating of the published reviews, one decimal
    pub average_rating: Option<f64>,
}

/// Camp as seen by its owner
#[derive(Debug, Serialize)]
pub struct OwnerCamp {
    /// Camp with country and cover photo
    #[serde(flatten)]
    pub listing: CampListing,
    /// Sessions of the camp
    pub dates: Vec<CampDate>,
}

/// Camp with everything its edit form shows
#[derive(Debug, Serialize)]
pub struct OwnerCampDetail {
    /// Camp row
    #[serde(flatten)]
    pub camp: Camp,
    /// Sessions of the camp
    pub dates: Vec<CampDate>,
    /// Photos in display order
    pub images: Vec<CampImage>,
}

/// Owner's overview of camps, booking requests and reviews
#[derive(Debug, Serialize)]
pub struct OwnerDashboard {
    /// Owner's camps, newest first
    pub camps: Vec<CampListing>,
    /// Booking requests for those camps, newest first
    pub bookings: Vec<BookingRequest>,
    /// Reviews of those camps in every state, newest first
    pub reviews: Vec<Review>,
}

/// A session in a camp edit
#[derive(Debug, Clone, Deserialize)]
pub struct CampDateInput {
    /// First day
    pub start_date: NaiveDate,
    /// Last day
    pub end_date: NaiveDate,
    /// Price per participant
    pub price: Decimal,
}

/// Request structure for editing a published camp
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCampRequest {
    /// Camp name
    #[validate(length(min = 1, max = 255, message = "Camp name is required"))]
    pub camp_name: String,

    /// Public contact address
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

    /// Replacement set of sessions
    pub dates: Vec<CampDateInput>,

    /// Photos appended after the existing ones
    #[serde(default)]
    pub new_images: Vec<ImageUpload>,

    /// Existing photo to move to the cover position
    pub profile_image_id: Option<Uuid>,
}
