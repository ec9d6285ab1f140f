//! # Notification Services
//!
//! Transactional email for the camps marketplace: camp approval and rejection notices,
//! review verification links and the admin alert for new camp submissions.
//! Delivery goes through a pluggable [`EmailService`] provider.

/// Email provider implementations.
pub mod providers;
/// High level notification operations.
pub mod service;
/// HTML templates for every outgoing email.
pub mod templates;
/// Types and structures used in notification services.
pub mod types;

pub use providers::{EmailService, LogEmailService, ResendEmailService, SesEmailService};
pub use service::NotificationService;
pub use types::NotificationError;
