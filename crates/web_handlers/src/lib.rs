//! # Web Handlers for the Basketball Camps Marketplace
//!
//! This crate provides the HTTP handlers and the route table of the marketplace API.

/// Authentication handlers (signup, login)
mod auth_handlers;
pub use auth_handlers::*;

/// User profile handlers (get/update profile)
mod profile_handlers;
pub use profile_handlers::*;

/// Public catalogue: countries, camp listing and camp pages
mod catalog_handlers;
pub use catalog_handlers::*;

/// Camp owner submissions
mod submission_handlers;
pub use submission_handlers::*;

/// Admin moderation handlers
mod admin_handlers;
pub use admin_handlers::*;

/// Camp owner tools: camps, dashboard, edits and review replies
mod owner_handlers;
pub use owner_handlers::*;

/// Booking request handlers
mod booking_handlers;
pub use booking_handlers::*;

/// Review handlers
mod review_handlers;
pub use review_handlers::*;

/// Email notification endpoints
mod notification_handlers;
pub use notification_handlers::*;

/// Route table with guards
pub mod routes;
