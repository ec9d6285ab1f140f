use std::collections::HashMap;

use notification_services::NotificationService;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    CreateReplyRequest, CreateReviewRequest, MarketplaceError, MyReviews, Review, ReviewReply,
    ReviewStatus, ReviewWithReplies,
};

const REVIEW_COLUMNS: &str = r#"
    id, camp_id, user_id, participant_name, participant_email, rating, review_text,
    verification_token, status, verified_at, created_at
"#;

/// Mean of `ratings` rounded to one decimal, `None` when there are none.
pub fn average_rating(ratings: impl IntoIterator<Item = i32>) -> Option<f64> {
    let (sum, count) = ratings
        .into_iter()
        .fold((0i64, 0i64), |(sum, count), rating| (sum + rating as i64, count + 1));

    if count == 0 {
        return None;
    }
    let mean = sum as f64 / count as f64;
    Some((mean * 10.0).round() / 10.0)
}

/// Name and address shown with a review: the request's values, else the profile's.
pub fn review_author(
    request: &CreateReviewRequest,
    profile_name: &str,
    profile_email: &str,
) -> (String, String) {
    let pick = |value: &Option<String>, fallback: &str| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(fallback)
            .to_string()
    };

    (
        pick(&request.participant_name, profile_name),
        pick(&request.participant_email, profile_email),
    )
}

/// Service for camp reviews and owner replies
pub struct ReviewService {
    pool: PgPool,
}

impl ReviewService {
    /// Creates a new instance of `ReviewService`
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores a review awaiting email verification.
    ///
    /// The caller mails the link for the returned review's token.
    pub async fn create_review(
        &self,
        user_id: &Uuid,
        camp_id: &Uuid,
        request: &CreateReviewRequest,
    ) -> Result<Review, MarketplaceError> {
        if request.review_text.trim().is_empty() {
            return Err(MarketplaceError::validation("Review text is required"));
        }

        let camp_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM camps WHERE id = $1 AND status = 'approved')",
        )
        .bind(camp_id)
        .fetch_one(&self.pool)
        .await?;
        if !camp_exists {
            return Err(MarketplaceError::NotFound("Camp".to_string()));
        }

        let (profile_name, profile_email): (String, String) =
            sqlx::query_as("SELECT full_name, email FROM users_profile WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| MarketplaceError::NotFound("User".to_string()))?;

        let (participant_name, participant_email) =
            review_author(request, &profile_name, &profile_email);
        let token = NotificationService::generate_verification_token();

        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (
                camp_id, user_id, participant_name, participant_email, rating,
                review_text, verification_token, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(camp_id)
        .bind(user_id)
        .bind(&participant_name)
        .bind(&participant_email)
        .bind(request.rating)
        .bind(request.review_text.trim())
        .bind(&token)
        .bind(ReviewStatus::PendingEmailVerification.as_str())
        .fetch_one(&self.pool)
        .await?;

        info!("Review {} created for camp {}", review.id, camp_id);
        Ok(review)
    }

    /// Gets a review by id
    pub async fn get_review(&self, review_id: &Uuid) -> Result<Review, MarketplaceError> {
        sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE id = $1",
            REVIEW_COLUMNS
        ))
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| MarketplaceError::NotFound("Review".to_string()))
    }

    /// Published reviews of a camp with their replies, newest first
    pub async fn published_reviews(
        &self,
        camp_id: &Uuid,
    ) -> Result<Vec<ReviewWithReplies>, MarketplaceError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {}
            FROM reviews
            WHERE camp_id = $1 AND status = $2
            ORDER BY created_at DESC
            "#,
            REVIEW_COLUMNS
        ))
        .bind(camp_id)
        .bind(ReviewStatus::Published.as_str())
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = reviews.iter().map(|r| r.id).collect();
        let replies = sqlx::query_as::<_, ReviewReply>(
            r#"
            SELECT id, review_id, camp_owner_id, reply_text, created_at
            FROM review_replies
            WHERE review_id = ANY($1)
            ORDER BY created_at
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_review: HashMap<Uuid, Vec<ReviewReply>> = HashMap::new();
        for reply in replies {
            by_review.entry(reply.review_id).or_default().push(reply);
        }

        Ok(reviews
            .into_iter()
            .map(|review| ReviewWithReplies {
                replies: by_review.remove(&review.id).unwrap_or_default(),
                review,
            })
            .collect())
    }

    /// The user's reviews and the camps they booked
    pub async fn list_user_reviews(&self, user_id: &Uuid) -> Result<MyReviews, MarketplaceError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE user_id = $1 ORDER BY created_at DESC",
            REVIEW_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let booked_camp_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT camp_id
            FROM booking_requests
            WHERE user_id = $1
            GROUP BY camp_id
            ORDER BY MAX(created_at) DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(MyReviews {
            reviews,
            booked_camp_ids,
        })
    }

    /// Adds the camp owner's reply to a review of one of their camps
    pub async fn reply_to_review(
        &self,
        owner_id: &Uuid,
        review_id: &Uuid,
        request: &CreateReplyRequest,
    ) -> Result<ReviewReply, MarketplaceError> {
        let reply_text = request.reply_text.trim();
        if reply_text.is_empty() {
            return Err(MarketplaceError::validation("Reply text is required"));
        }

        let camp_owner: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT c.owner_id
            FROM reviews r
            JOIN camps c ON c.id = r.camp_id
            WHERE r.id = $1
            "#,
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;

        match camp_owner {
            None => return Err(MarketplaceError::NotFound("Review".to_string())),
            Some(camp_owner) if &camp_owner != owner_id => {
                return Err(MarketplaceError::Forbidden(
                    "You can only reply to reviews of your own camps".to_string(),
                ));
            }
            Some(_) => {}
        }

        let reply = sqlx::query_as::<_, ReviewReply>(
            r#"
            INSERT INTO review_replies (review_id, camp_owner_id, reply_text)
            VALUES ($1, $2, $3)
            RETURNING id, review_id, camp_owner_id, reply_text, created_at
            "#,
        )
        .bind(review_id)
        .bind(owner_id)
        .bind(reply_text)
        .fetch_one(&self.pool)
        .await?;

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(Vec::new()), None);
        assert_eq!(average_rating(vec![5]), Some(5.0));
        assert_eq!(average_rating(vec![5, 4, 4]), Some(4.3));
        assert_eq!(average_rating(vec![1, 2]), Some(1.5));
    }

    #[test]
    fn test_review_author_defaults_to_profile() {
        let mut request = CreateReviewRequest {
            rating: 5,
            review_text: "Great coaching".to_string(),
            participant_name: None,
            participant_email: Some("  ".to_string()),
        };
        assert_eq!(
            review_author(&request, "Ana", "ana@example.com"),
            ("Ana".to_string(), "ana@example.com".to_string())
        );

        request.participant_name = Some("Leo".to_string());
        request.participant_email = Some("leo@example.com".to_string());
        assert_eq!(
            review_author(&request, "Ana", "ana@example.com"),
            ("Leo".to_string(), "leo@example.com".to_string())
        );
    }
}
