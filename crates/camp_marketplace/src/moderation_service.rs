use chrono::NaiveDate;
use notification_services::types::{ApprovalEmailData, RejectionEmailData};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::submission_service::SUBMISSION_COLUMNS;
use crate::{
    ApprovalOutcome, CAMP_STATUS_APPROVED, CampSubmission, MarketplaceError, RejectionOutcome,
    SubmissionDate, SubmissionImage, SubmissionStatus,
};

/// A camp to create from one session of an approved submission
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCamp {
    /// First day
    pub start_date: NaiveDate,
    /// Last day
    pub end_date: NaiveDate,
    /// Inclusive number of days
    pub duration_days: i32,
    /// Price per participant
    pub price: Decimal,
    /// Photos as `(url, order)`, copied from the submission
    pub images: Vec<(String, i32)>,
}

/// Expands a submission into one camp per session, ordered by start date.
///
/// Every camp carries the full photo set with its original positions.
pub fn plan_approval(
    dates: &[SubmissionDate],
    images: &[SubmissionImage],
) -> Result<Vec<PlannedCamp>, MarketplaceError> {
    if dates.is_empty() {
        return Err(MarketplaceError::validation(
            "Submission has no camp dates to publish",
        ));
    }

    let mut images: Vec<(String, i32)> = images
        .iter()
        .map(|image| (image.image_url.clone(), image.image_order))
        .collect();
    images.sort_by_key(|(_, order)| *order);

    let mut dates: Vec<&SubmissionDate> = dates.iter().collect();
    dates.sort_by_key(|date| date.start_date);

    Ok(dates
        .into_iter()
        .map(|date| PlannedCamp {
            start_date: date.start_date,
            end_date: date.end_date,
            duration_days: date.duration_days,
            price: date.price,
            images: images.clone(),
        })
        .collect())
}

/// Only pending submissions can be moderated.
pub fn ensure_pending(submission: &CampSubmission) -> Result<(), MarketplaceError> {
    if submission.status != SubmissionStatus::Pending.as_str() {
        return Err(MarketplaceError::Conflict(format!(
            "Submission is already {}",
            submission.status
        )));
    }
    Ok(())
}

/// Trimmed rejection reason, which must not be blank.
pub fn validate_rejection_reason(reason: &str) -> Result<String, MarketplaceError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(MarketplaceError::validation(
            "Please provide a reason for rejection",
        ));
    }
    Ok(reason.to_string())
}

fn greeting_name(submission: &CampSubmission, profile_name: Option<String>) -> String {
    submission
        .owner_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or(profile_name)
        .unwrap_or_else(|| "Camp Owner".to_string())
}

impl ApprovalOutcome {
    /// Outcome of a committed approval. `profile_name` is read before commit.
    pub fn new(submission: CampSubmission, camp_ids: Vec<Uuid>, profile_name: Option<String>) -> Self {
        let owner_name = greeting_name(&submission, profile_name);
        Self {
            submission,
            camp_ids,
            owner_name,
        }
    }

    /// Payload of the approval email.
    pub fn email_data(&self) -> ApprovalEmailData {
        ApprovalEmailData {
            camp_name: self.submission.camp_name.clone(),
            camp_email: self.submission.camp_email.clone(),
            owner_name: self.owner_name.clone(),
        }
    }
}

impl RejectionOutcome {
    /// Outcome of a committed rejection. `profile_name` is read before commit.
    pub fn new(submission: CampSubmission, profile_name: Option<String>) -> Self {
        let owner_name = greeting_name(&submission, profile_name);
        Self {
            submission,
            owner_name,
        }
    }

    /// Payload of the rejection email.
    pub fn email_data(&self) -> RejectionEmailData {
        RejectionEmailData {
            camp_name: self.submission.camp_name.clone(),
            camp_email: self.submission.camp_email.clone(),
            owner_name: self.owner_name.clone(),
            rejection_reason: self.submission.rejection_reason.clone().unwrap_or_default(),
        }
    }
}

/// Service for admin moderation of submissions
pub struct ModerationService {
    pool: PgPool,
}

impl ModerationService {
    /// Creates a new instance of `ModerationService`
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn profile_name(
        conn: &mut PgConnection,
        owner_id: &Uuid,
    ) -> Result<Option<String>, MarketplaceError> {
        let name = sqlx::query_scalar("SELECT full_name FROM users_profile WHERE id = $1")
            .bind(owner_id)
            .fetch_optional(conn)
            .await?;
        Ok(name)
    }

    /// Publishes a pending submission as one camp per session.
    ///
    /// The submission row stays locked until commit, so a second approval waits and
    /// then fails with a conflict instead of creating the camps twice.
    pub async fn approve(
        &self,
        submission_id: &Uuid,
        admin_id: &Uuid,
    ) -> Result<ApprovalOutcome, MarketplaceError> {
        let mut tx = self.pool.begin().await?;

        let submission = sqlx::query_as::<_, CampSubmission>(&format!(
            "SELECT {} FROM camp_submissions WHERE id = $1 FOR UPDATE",
            SUBMISSION_COLUMNS
        ))
        .bind(submission_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| MarketplaceError::NotFound("Submission".to_string()))?;

        ensure_pending(&submission)?;

        let dates = sqlx::query_as::<_, SubmissionDate>(
            r#"
            SELECT id, submission_id, start_date, end_date, duration_days, price, commission
            FROM camp_submission_dates
            WHERE submission_id = $1
            "#,
        )
        .bind(submission_id)
        .fetch_all(&mut *tx)
        .await?;

        let images = sqlx::query_as::<_, SubmissionImage>(
            r#"
            SELECT id, submission_id, image_url, image_order
            FROM camp_submission_images
            WHERE submission_id = $1
            "#,
        )
        .bind(submission_id)
        .fetch_all(&mut *tx)
        .await?;

        let plan = plan_approval(&dates, &images)?;
        let mut camp_ids = Vec::with_capacity(plan.len());

        for camp in &plan {
            let camp_id: Uuid = sqlx::query_scalar(
                r#"
                INSERT INTO camps (
                    submission_id, owner_id, country_id, camp_name, camp_email, location,
                    description, start_date, end_date, duration_days, price,
                    age_group_min, age_group_max, gender, capacity,
                    status, approved_by, approved_at
                ) VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, NOW()
                )
                RETURNING id
                "#,
            )
            .bind(submission.id)
            .bind(submission.owner_id)
            .bind(submission.country_id)
            .bind(&submission.camp_name)
            .bind(&submission.camp_email)
            .bind(&submission.location)
            .bind(&submission.description)
            .bind(camp.start_date)
            .bind(camp.end_date)
            .bind(camp.duration_days)
            .bind(camp.price)
            .bind(submission.age_group_min)
            .bind(submission.age_group_max)
            .bind(&submission.gender)
            .bind(submission.capacity)
            .bind(CAMP_STATUS_APPROVED)
            .bind(admin_id)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO camp_dates (camp_id, start_date, end_date, duration_days, price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(camp_id)
            .bind(camp.start_date)
            .bind(camp.end_date)
            .bind(camp.duration_days)
            .bind(camp.price)
            .execute(&mut *tx)
            .await?;

            for (url, order) in &camp.images {
                sqlx::query(
                    "INSERT INTO camp_images (camp_id, image_url, image_order) VALUES ($1, $2, $3)",
                )
                .bind(camp_id)
                .bind(url)
                .bind(order)
                .execute(&mut *tx)
                .await?;
            }

            camp_ids.push(camp_id);
        }

        let submission = sqlx::query_as::<_, CampSubmission>(&format!(
            r#"
            UPDATE camp_submissions
            SET status = 'approved', updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(submission_id)
        .fetch_one(&mut *tx)
        .await?;

        // Nothing fallible may run after commit
        let profile_name = Self::profile_name(&mut *tx, &submission.owner_id).await?;

        tx.commit().await?;

        info!(
            "✅ Submission {} approved by {}: {} camps published",
            submission_id,
            admin_id,
            camp_ids.len()
        );

        Ok(ApprovalOutcome::new(submission, camp_ids, profile_name))
    }

    /// Declines a pending submission with a reason.
    pub async fn reject(
        &self,
        submission_id: &Uuid,
        reason: &str,
    ) -> Result<RejectionOutcome, MarketplaceError> {
        let reason = validate_rejection_reason(reason)?;
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, CampSubmission>(&format!(
            r#"
            UPDATE camp_submissions
            SET status = 'rejected', rejection_reason = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(submission_id)
        .bind(&reason)
        .fetch_optional(&mut *tx)
        .await?;

        let submission = match updated {
            Some(submission) => submission,
            None => {
                let status: Option<String> =
                    sqlx::query_scalar("SELECT status FROM camp_submissions WHERE id = $1")
                        .bind(submission_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                return Err(match status {
                    Some(status) => {
                        MarketplaceError::Conflict(format!("Submission is already {}", status))
                    }
                    None => MarketplaceError::NotFound("Submission".to_string()),
                });
            }
        };

        let profile_name = Self::profile_name(&mut *tx, &submission.owner_id).await?;
        tx.commit().await?;

        info!("Submission {} rejected", submission_id);

        Ok(RejectionOutcome::new(submission, profile_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn day(month: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, d).unwrap()
    }

    fn session(submission_id: Uuid, start: NaiveDate, price: &str) -> SubmissionDate {
        SubmissionDate {
            id: Uuid::new_v4(),
            submission_id,
            start_date: start,
            end_date: start + chrono::Duration::days(4),
            duration_days: 5,
            price: price.parse().unwrap(),
            commission: "20".parse().unwrap(),
        }
    }

    fn photo(submission_id: Uuid, order: i32) -> SubmissionImage {
        SubmissionImage {
            id: Uuid::new_v4(),
            submission_id,
            image_url: format!("https://cdn/{}.jpg", order),
            image_order: order,
        }
    }

    fn submission(status: &str) -> CampSubmission {
        CampSubmission {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            camp_name: "Hoops".to_string(),
            camp_email: "camp@example.com".to_string(),
            country_id: Uuid::new_v4(),
            location: "Madrid".to_string(),
            description: String::new(),
            age_group_min: 8,
            age_group_max: 14,
            gender: "both".to_string(),
            capacity: 20,
            owner_name: None,
            owner_email: None,
            owner_phone: None,
            status: status.to_string(),
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_plan_creates_one_camp_per_session() {
        let id = Uuid::new_v4();
        let dates = vec![
            session(id, day(8, 1), "400"),
            session(id, day(6, 1), "300"),
            session(id, day(7, 1), "350"),
        ];
        let images = vec![photo(id, 1), photo(id, 0), photo(id, 2)];

        let plan = plan_approval(&dates, &images).unwrap();

        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].start_date, day(6, 1));
        assert_eq!(plan[0].price, "300".parse::<Decimal>().unwrap());
        assert_eq!(plan[2].start_date, day(8, 1));
        for camp in &plan {
            assert_eq!(camp.images.len(), 3);
            assert_eq!(camp.images[0], ("https://cdn/0.jpg".to_string(), 0));
        }
    }

    #[test]
    fn test_plan_requires_sessions() {
        assert!(matches!(
            plan_approval(&[], &[]),
            Err(MarketplaceError::Validation(_))
        ));
    }

    #[test]
    fn test_only_pending_submissions_are_moderated() {
        assert!(ensure_pending(&submission("pending")).is_ok());
        assert!(matches!(
            ensure_pending(&submission("approved")),
            Err(MarketplaceError::Conflict(_))
        ));
        assert!(ensure_pending(&submission("rejected")).is_err());
    }

    #[test]
    fn test_rejection_reason_is_required() {
        assert!(validate_rejection_reason("").is_err());
        assert!(validate_rejection_reason(" \n\t ").is_err());
        assert_eq!(
            validate_rejection_reason("  Missing photos ").unwrap(),
            "Missing photos"
        );
    }

    #[test]
    fn test_greeting_name_prefers_submission_contact() {
        let mut s = submission("pending");
        assert_eq!(greeting_name(&s, Some("Profile".to_string())), "Profile");
        assert_eq!(greeting_name(&s, None), "Camp Owner");

        s.owner_name = Some("Ana".to_string());
        assert_eq!(greeting_name(&s, Some("Profile".to_string())), "Ana");
    }

    #[test]
    fn test_committed_outcomes_always_carry_a_greeting() {
        let approved = ApprovalOutcome::new(submission("approved"), vec![Uuid::new_v4()], None);
        assert_eq!(approved.email_data().owner_name, "Camp Owner");
        assert_eq!(approved.camp_ids.len(), 1);

        let mut rejected = submission("rejected");
        rejected.rejection_reason = Some("Missing photos".to_string());
        let rejected = RejectionOutcome::new(rejected, Some("Profile".to_string()));
        let email = rejected.email_data();
        assert_eq!(email.owner_name, "Profile");
        assert_eq!(email.rejection_reason, "Missing photos");
    }
}
