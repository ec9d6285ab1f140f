use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::MarketplaceError;

/// Who a camp is open to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Boys only
    Boys,
    /// Girls only
    Girls,
    /// Mixed camp
    Both,
}

impl Gender {
    /// Database and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Boys => "boys",
            Gender::Girls => "girls",
            Gender::Both => "both",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = MarketplaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boys" => Ok(Gender::Boys),
            "girls" => Ok(Gender::Girls),
            "both" => Ok(Gender::Both),
            other => Err(MarketplaceError::validation(format!(
                "Unknown gender '{}'",
                other
            ))),
        }
    }
}

/// Moderation state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Awaiting an admin decision
    Pending,
    /// Published as camps
    Approved,
    /// Declined with a reason
    Rejected,
}

impl SubmissionStatus {
    /// Database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }
}

/// Publication state of a camp. Only approved camps are listed or bookable.
pub const CAMP_STATUS_APPROVED: &str = "approved";

/// Lifecycle of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Waiting for the participant to confirm their email
    PendingEmailVerification,
    /// Visible on the camp page
    Published,
    /// Hidden by moderation
    Rejected,
}

impl ReviewStatus {
    /// Database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::PendingEmailVerification => "pending_email_verification",
            ReviewStatus::Published => "published",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_round_trip() {
        for gender in [Gender::Boys, Gender::Girls, Gender::Both] {
            assert_eq!(gender.as_str().parse::<Gender>().unwrap(), gender);
        }
        assert!("mixed".parse::<Gender>().is_err());
    }

    #[test]
    fn test_review_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&ReviewStatus::PendingEmailVerification).unwrap(),
            "\"pending_email_verification\""
        );
    }
}
