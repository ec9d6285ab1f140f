//! # Camp Marketplace
//!
//! Domain logic of the basketball camps marketplace: camp submissions and their
//! moderation, the public camp catalogue, owner camp management, booking requests
//! and participant reviews. Every service talks to PostgreSQL through a shared pool.

/// Error type shared by every marketplace operation
mod error;
pub use error::*;

/// Shared enums for camps, submissions and reviews
mod domain;
pub use domain::*;

/// Types for camp submissions and moderation
mod submission_types;
pub use submission_types::*;

/// Types for published camps and the catalogue
mod camp_types;
pub use camp_types::*;

/// Types for booking requests
mod booking_types;
pub use booking_types::*;

/// Types for reviews and replies
mod review_types;
pub use review_types::*;

/// Submission rules applied before anything is written
pub mod validation;

/// Base64 image payload decoding
mod images;
pub use images::*;

/// Catalogue filters
mod listing;
pub use listing::*;

/// Owner-facing submission intake
mod submission_service;
pub use submission_service::*;

/// Admin approval and rejection of submissions
mod moderation_service;
pub use moderation_service::*;

/// Catalogue reads and owner camp management
mod camp_service;
pub use camp_service::*;

/// Booking requests and their mailto hand-off
mod booking_service;
pub use booking_service::*;

/// Reviews and owner replies
mod review_service;
pub use review_service::*;
