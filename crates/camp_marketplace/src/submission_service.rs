use std::sync::Arc;

use notification_services::types::{SubmissionDateSummary, SubmissionNotificationData};
use object_storage::ObjectStore;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{error, info};
use uuid::Uuid;

use crate::validation::{self, duration_days, image_upload_order};
use crate::{
    CampSubmission, CreateSubmissionRequest, MarketplaceError, SubmissionDate, SubmissionDetail,
    SubmissionImage, SubmissionSummary, UploadedImage, arrange_images, decode_images,
    remove_uploads, upload_images,
};

/// Everything written by a successful intake
#[derive(Debug, serde::Serialize)]
pub struct CreatedSubmission {
    /// Submission row
    #[serde(flatten)]
    pub submission: CampSubmission,
    /// Name of the submission's country
    pub country_name: String,
    /// Stored sessions
    pub dates: Vec<SubmissionDate>,
    /// Stored photos, cover first
    pub images: Vec<SubmissionImage>,
}

impl CreatedSubmission {
    /// Payload of the admin alert for this submission.
    pub fn notification_data(&self) -> SubmissionNotificationData {
        let submission = &self.submission;
        SubmissionNotificationData {
            camp_name: submission.camp_name.clone(),
            owner_name: submission.owner_name.clone().unwrap_or_default(),
            owner_email: submission.owner_email.clone().unwrap_or_default(),
            owner_phone: submission.owner_phone.clone().unwrap_or_default(),
            camp_email: submission.camp_email.clone(),
            location: submission.location.clone(),
            country: self.country_name.clone(),
            description: submission.description.clone(),
            age_min: submission.age_group_min,
            age_max: submission.age_group_max,
            gender: submission.gender.clone(),
            capacity: submission.capacity,
            camp_dates: self
                .dates
                .iter()
                .map(|date| SubmissionDateSummary {
                    start_date: date.start_date.to_string(),
                    end_date: date.end_date.to_string(),
                    price: date.price.round_dp(2).to_string(),
                    days: date.duration_days,
                })
                .collect(),
            image_urls: self.images.iter().map(|i| i.image_url.clone()).collect(),
            profile_image_url: self
                .images
                .iter()
                .find(|i| i.image_order == 0)
                .map(|i| i.image_url.clone()),
        }
    }
}

pub(crate) const SUBMISSION_COLUMNS: &str = r#"
    id, owner_id, camp_name, camp_email, country_id, location, description,
    age_group_min, age_group_max, gender, capacity, owner_name, owner_email,
    owner_phone, status, rejection_reason, created_at, updated_at
"#;

/// Service for owner camp submissions
pub struct SubmissionService {
    pool: PgPool,
    store: Arc<dyn ObjectStore>,
}

impl SubmissionService {
    /// Creates a new instance of `SubmissionService`
    pub fn new(pool: PgPool, store: Arc<dyn ObjectStore>) -> Self {
        Self { pool, store }
    }

    /// Whether `owner_id` has never submitted a camp before
    pub async fn is_first_submission(&self, owner_id: &Uuid) -> Result<bool, MarketplaceError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM camp_submissions WHERE owner_id = $1)",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(!exists)
    }

    async fn country_name(&self, country_id: &Uuid) -> Result<String, MarketplaceError> {
        sqlx::query_scalar("SELECT name FROM countries WHERE id = $1")
            .bind(country_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| MarketplaceError::validation("Please select a valid country"))
    }

    /// Validates, uploads the photos, then stores the submission with its sessions
    /// and photos in one transaction.
    ///
    /// Photos uploaded for a submission whose transaction fails are removed again.
    pub async fn create_submission(
        &self,
        owner_id: &Uuid,
        request: &CreateSubmissionRequest,
    ) -> Result<CreatedSubmission, MarketplaceError> {
        let is_first = self.is_first_submission(owner_id).await?;
        validation::validate_submission(request, is_first)?;
        let country_name = self.country_name(&request.country_id).await?;

        let decoded = decode_images(&request.images)?;
        let ordered = arrange_images(
            decoded,
            &image_upload_order(request.images.len(), request.profile_image_index),
        );

        let submission_id = Uuid::new_v4();
        let uploaded =
            upload_images(self.store.as_ref(), &submission_id.to_string(), 0, ordered).await?;

        let mut tx = self.pool.begin().await?;
        let stored = match Self::insert_submission(
            &mut tx,
            &submission_id,
            owner_id,
            request,
            is_first,
            &uploaded,
        )
        .await
        {
            Ok(stored) => stored,
            Err(e) => {
                error!("❌ Submission {} failed, removing uploads: {}", submission_id, e);
                drop(tx);
                remove_uploads(self.store.as_ref(), &uploaded).await;
                return Err(e);
            }
        };

        if let Err(e) = tx.commit().await {
            error!("❌ Commit of submission {} failed: {}", submission_id, e);
            remove_uploads(self.store.as_ref(), &uploaded).await;
            return Err(e.into());
        }

        let (submission, dates, images) = stored;
        info!(
            "✅ Submission {} stored with {} dates and {} images",
            submission.id,
            dates.len(),
            images.len()
        );

        Ok(CreatedSubmission {
            submission,
            country_name,
            dates,
            images,
        })
    }

    async fn insert_submission(
        tx: &mut Transaction<'_, Postgres>,
        submission_id: &Uuid,
        owner_id: &Uuid,
        request: &CreateSubmissionRequest,
        is_first: bool,
        uploaded: &[UploadedImage],
    ) -> Result<(CampSubmission, Vec<SubmissionDate>, Vec<SubmissionImage>), MarketplaceError>
    {
        let trimmed = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| is_first && !v.is_empty())
                .map(str::to_string)
        };

        let submission = sqlx::query_as::<_, CampSubmission>(&format!(
            r#"
            INSERT INTO camp_submissions (
                id, owner_id, camp_name, camp_email, country_id, location, description,
                age_group_min, age_group_max, gender, capacity,
                owner_name, owner_email, owner_phone, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, 'pending')
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(submission_id)
        .bind(owner_id)
        .bind(request.camp_name.trim())
        .bind(request.camp_email.trim())
        .bind(request.country_id)
        .bind(request.location.trim())
        .bind(&request.description)
        .bind(request.age_min)
        .bind(request.age_max)
        .bind(request.gender.as_str())
        .bind(request.capacity)
        .bind(trimmed(&request.owner_name))
        .bind(trimmed(&request.owner_email))
        .bind(trimmed(&request.owner_phone))
        .fetch_one(&mut **tx)
        .await?;

        let mut dates = Vec::with_capacity(request.dates.len());
        for range in &request.dates {
            let date = sqlx::query_as::<_, SubmissionDate>(
                r#"
                INSERT INTO camp_submission_dates (
                    submission_id, start_date, end_date, duration_days, price, commission
                ) VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, submission_id, start_date, end_date, duration_days, price, commission
                "#,
            )
            .bind(submission_id)
            .bind(range.start_date)
            .bind(range.end_date)
            .bind(duration_days(range.start_date, range.end_date))
            .bind(range.price)
            .bind(range.commission)
            .fetch_one(&mut **tx)
            .await?;
            dates.push(date);
        }

        let mut images = Vec::with_capacity(uploaded.len());
        for image in uploaded {
            let row = sqlx::query_as::<_, SubmissionImage>(
                r#"
                INSERT INTO camp_submission_images (submission_id, image_url, image_order)
                VALUES ($1, $2, $3)
                RETURNING id, submission_id, image_url, image_order
                "#,
            )
            .bind(submission_id)
            .bind(&image.url)
            .bind(image.order)
            .fetch_one(&mut **tx)
            .await?;
            images.push(row);
        }

        Ok((submission, dates, images))
    }

    /// Gets the owner's submissions, newest first
    pub async fn list_owner_submissions(
        &self,
        owner_id: &Uuid,
    ) -> Result<Vec<CampSubmission>, MarketplaceError> {
        let submissions = sqlx::query_as::<_, CampSubmission>(&format!(
            "SELECT {} FROM camp_submissions WHERE owner_id = $1 ORDER BY created_at DESC",
            SUBMISSION_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }

    /// Gets pending submissions for moderation, newest first
    pub async fn list_pending(&self) -> Result<Vec<SubmissionSummary>, MarketplaceError> {
        let submissions = sqlx::query_as::<_, SubmissionSummary>(
            r#"
            SELECT s.*, c.name AS country_name
            FROM camp_submissions s
            LEFT JOIN countries c ON c.id = s.country_id
            WHERE s.status = 'pending'
            ORDER BY s.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }

    /// Gets a submission with its sessions and photos
    pub async fn get_submission_detail(
        &self,
        submission_id: &Uuid,
    ) -> Result<SubmissionDetail, MarketplaceError> {
        let summary = sqlx::query_as::<_, SubmissionSummary>(
            r#"
            SELECT s.*, c.name AS country_name
            FROM camp_submissions s
            LEFT JOIN countries c ON c.id = s.country_id
            WHERE s.id = $1
            "#,
        )
        .bind(submission_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| MarketplaceError::NotFound("Submission".to_string()))?;

        let dates = sqlx::query_as::<_, SubmissionDate>(
            r#"
            SELECT id, submission_id, start_date, end_date, duration_days, price, commission
            FROM camp_submission_dates
            WHERE submission_id = $1
            ORDER BY start_date
            "#,
        )
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await?;

        let images = sqlx::query_as::<_, SubmissionImage>(
            r#"
            SELECT id, submission_id, image_url, image_order
            FROM camp_submission_images
            WHERE submission_id = $1
            ORDER BY image_order
            "#,
        )
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(SubmissionDetail {
            submission: summary.submission,
            country_name: summary.country_name,
            dates,
            images,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn created() -> CreatedSubmission {
        let id = Uuid::new_v4();
        let image = |order: i32, url: &str| SubmissionImage {
            id: Uuid::new_v4(),
            submission_id: id,
            image_url: url.to_string(),
            image_order: order,
        };

        CreatedSubmission {
            submission: CampSubmission {
                id,
                owner_id: Uuid::new_v4(),
                camp_name: "Hoops Academy".to_string(),
                camp_email: "camp@example.com".to_string(),
                country_id: Uuid::new_v4(),
                location: "Madrid".to_string(),
                description: "Summer camp".to_string(),
                age_group_min: 10,
                age_group_max: 16,
                gender: "both".to_string(),
                capacity: 40,
                owner_name: Some("Ana".to_string()),
                owner_email: None,
                owner_phone: None,
                status: "pending".to_string(),
                rejection_reason: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            country_name: "Spain".to_string(),
            dates: vec![SubmissionDate {
                id: Uuid::new_v4(),
                submission_id: id,
                start_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
                duration_days: 5,
                price: "300".parse().unwrap(),
                commission: "15".parse().unwrap(),
            }],
            images: vec![image(0, "https://cdn/a.jpg"), image(1, "https://cdn/b.jpg")],
        }
    }

    #[test]
    fn test_notification_data() {
        let data = created().notification_data();

        assert_eq!(data.country, "Spain");
        assert_eq!(data.owner_name, "Ana");
        assert_eq!(data.owner_email, "");
        assert_eq!(data.camp_dates[0].days, 5);
        assert_eq!(data.camp_dates[0].price, "300");
        assert_eq!(data.image_urls.len(), 2);
        assert_eq!(data.profile_image_url.as_deref(), Some("https://cdn/a.jpg"));
    }
}
