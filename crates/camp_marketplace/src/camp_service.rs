use std::collections::HashMap;
use std::sync::Arc;

use object_storage::ObjectStore;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{error, info};
use uuid::Uuid;

use crate::validation::{self, duration_days};
use crate::{
    BookingRequest, CampDate, CampDetail, CampFilter, CampImage, CampListResponse, CampListing,
    Country, MarketplaceError, OwnerCamp, OwnerCampDetail, OwnerDashboard, Review, ReviewService,
    UpdateCampRequest, UploadedImage, average_rating, decode_images, group_by_country,
    remove_uploads, upload_images,
};

const LISTING_SELECT: &str = r#"
    SELECT c.*, co.name AS country_name,
        (SELECT ci.image_url FROM camp_images ci
         WHERE ci.camp_id = c.id
         ORDER BY ci.image_order
         LIMIT 1) AS cover_image_url
    FROM camps c
    LEFT JOIN countries co ON co.id = c.country_id
"#;

impl CampListResponse {
    /// Wraps listing results, grouping by country when no country was selected.
    pub fn new(camps: Vec<CampListing>, filter: &CampFilter) -> Self {
        let by_country = filter
            .countries
            .is_empty()
            .then(|| group_by_country(&camps));

        Self {
            total: camps.len(),
            camps,
            by_country,
        }
    }
}

/// New display positions after moving `profile_image_id` to the front.
///
/// The remaining photos keep their relative order.
pub fn profile_reorder(
    images: &[CampImage],
    profile_image_id: &Uuid,
) -> Result<Vec<(Uuid, i32)>, MarketplaceError> {
    if !images.iter().any(|image| &image.id == profile_image_id) {
        return Err(MarketplaceError::validation(
            "Profile photo must be one of the camp's images",
        ));
    }

    let mut sorted: Vec<&CampImage> = images.iter().collect();
    sorted.sort_by_key(|image| image.image_order);

    let mut reordered = vec![(*profile_image_id, 0)];
    reordered.extend(
        sorted
            .into_iter()
            .filter(|image| &image.id != profile_image_id)
            .enumerate()
            .map(|(index, image)| (image.id, index as i32 + 1)),
    );
    Ok(reordered)
}

/// Service for the camp catalogue and owner camp management
pub struct CampService {
    pool: PgPool,
    store: Arc<dyn ObjectStore>,
}

impl CampService {
    /// Creates a new instance of `CampService`
    pub fn new(pool: PgPool, store: Arc<dyn ObjectStore>) -> Self {
        Self { pool, store }
    }

    /// Gets every country, ordered by name
    pub async fn list_countries(&self) -> Result<Vec<Country>, MarketplaceError> {
        let countries = sqlx::query_as::<_, Country>(
            "SELECT id, name, country_code, flag_emoji FROM countries ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(countries)
    }

    /// Approved camps matching `filter`, ordered by start date.
    ///
    /// Country and gender are filtered in SQL, start months in memory.
    pub async fn list_camps(&self, filter: &CampFilter) -> Result<Vec<CampListing>, MarketplaceError> {
        let camps = sqlx::query_as::<_, CampListing>(&format!(
            r#"
            {}
            WHERE c.status = 'approved'
              AND (cardinality($1::uuid[]) = 0 OR c.country_id = ANY($1))
              AND ($2::text IS NULL OR c.gender = $2 OR c.gender = 'both')
            ORDER BY c.start_date
            "#,
            LISTING_SELECT
        ))
        .bind(&filter.countries)
        .bind(filter.gender_param())
        .fetch_all(&self.pool)
        .await?;

        Ok(camps
            .into_iter()
            .filter(|camp| filter.matches_month(camp))
            .collect())
    }

    async fn camp_dates(&self, camp_ids: &[Uuid]) -> Result<Vec<CampDate>, MarketplaceError> {
        let dates = sqlx::query_as::<_, CampDate>(
            r#"
            SELECT id, camp_id, start_date, end_date, duration_days, price
            FROM camp_dates
            WHERE camp_id = ANY($1)
            ORDER BY start_date
            "#,
        )
        .bind(camp_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(dates)
    }

    async fn camp_images(&self, camp_id: &Uuid) -> Result<Vec<CampImage>, MarketplaceError> {
        let images = sqlx::query_as::<_, CampImage>(
            r#"
            SELECT id, camp_id, image_url, image_order
            FROM camp_images
            WHERE camp_id = $1
            ORDER BY image_order
            "#,
        )
        .bind(camp_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    /// Public page of an approved camp
    pub async fn get_camp_detail(&self, camp_id: &Uuid) -> Result<CampDetail, MarketplaceError> {
        let listing = sqlx::query_as::<_, CampListing>(&format!(
            "{} WHERE c.id = $1 AND c.status = 'approved'",
            LISTING_SELECT
        ))
        .bind(camp_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| MarketplaceError::NotFound("Camp".to_string()))?;

        let dates = self.camp_dates(&[*camp_id]).await?;
        let images = self.camp_images(camp_id).await?;
        let reviews = ReviewService::new(self.pool.clone())
            .published_reviews(camp_id)
            .await?;

        Ok(CampDetail {
            listing,
            dates,
            images,
            average_rating: average_rating(reviews.iter().map(|r| r.review.rating)),
            reviews,
        })
    }

    async fn owner_listings(&self, owner_id: &Uuid) -> Result<Vec<CampListing>, MarketplaceError> {
        let camps = sqlx::query_as::<_, CampListing>(&format!(
            "{} WHERE c.owner_id = $1 ORDER BY c.created_at DESC",
            LISTING_SELECT
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(camps)
    }

    /// Gets the owner's camps with their sessions, newest first
    pub async fn list_owner_camps(&self, owner_id: &Uuid) -> Result<Vec<OwnerCamp>, MarketplaceError> {
        let listings = self.owner_listings(owner_id).await?;
        let ids: Vec<Uuid> = listings.iter().map(|l| l.camp.id).collect();

        let mut dates_by_camp: HashMap<Uuid, Vec<CampDate>> = HashMap::new();
        for date in self.camp_dates(&ids).await? {
            dates_by_camp.entry(date.camp_id).or_default().push(date);
        }

        Ok(listings
            .into_iter()
            .map(|listing| OwnerCamp {
                dates: dates_by_camp.remove(&listing.camp.id).unwrap_or_default(),
                listing,
            })
            .collect())
    }

    /// Owner's camps with the booking requests and reviews they received
    pub async fn owner_dashboard(&self, owner_id: &Uuid) -> Result<OwnerDashboard, MarketplaceError> {
        let camps = self.owner_listings(owner_id).await?;

        let bookings = sqlx::query_as::<_, BookingRequest>(
            r#"
            SELECT b.*
            FROM booking_requests b
            JOIN camps c ON c.id = b.camp_id
            WHERE c.owner_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT r.*
            FROM reviews r
            JOIN camps c ON c.id = r.camp_id
            WHERE c.owner_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(OwnerDashboard {
            camps,
            bookings,
            reviews,
        })
    }

    /// Gets one of the owner's camps with its sessions and photos
    pub async fn get_owner_camp(
        &self,
        owner_id: &Uuid,
        camp_id: &Uuid,
    ) -> Result<OwnerCampDetail, MarketplaceError> {
        let camp = sqlx::query_as::<_, crate::Camp>(
            "SELECT * FROM camps WHERE id = $1 AND owner_id = $2",
        )
        .bind(camp_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| MarketplaceError::NotFound("Camp".to_string()))?;

        let dates = self.camp_dates(&[*camp_id]).await?;
        let images = self.camp_images(camp_id).await?;

        Ok(OwnerCampDetail {
            camp,
            dates,
            images,
        })
    }

    /// Applies an owner edit: profile fields, sessions, new photos and cover choice.
    ///
    /// New photos are uploaded first; every row change then happens in one transaction.
    pub async fn update_camp(
        &self,
        owner_id: &Uuid,
        camp_id: &Uuid,
        request: &UpdateCampRequest,
    ) -> Result<OwnerCampDetail, MarketplaceError> {
        validation::validate_camp_profile(
            request.age_min,
            request.age_max,
            request.capacity,
            &request.description,
        )?;
        validation::validate_camp_dates(&request.dates)?;

        let existing = self.get_owner_camp(owner_id, camp_id).await?;
        validation::validate_image_count(existing.images.len() + request.new_images.len())?;

        let reorder = match &request.profile_image_id {
            Some(profile_id) => Some(profile_reorder(&existing.images, profile_id)?),
            None => None,
        };

        let country_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM countries WHERE id = $1)")
                .bind(request.country_id)
                .fetch_one(&self.pool)
                .await?;
        if !country_exists {
            return Err(MarketplaceError::validation("Please select a valid country"));
        }

        let decoded = decode_images(&request.new_images)?;
        let first_order = existing
            .images
            .iter()
            .map(|image| image.image_order + 1)
            .max()
            .unwrap_or(0) as usize;
        let uploaded =
            upload_images(self.store.as_ref(), &camp_id.to_string(), first_order, decoded).await?;

        let mut tx = self.pool.begin().await?;
        if let Err(e) = Self::apply_update(&mut tx, camp_id, request, &uploaded, reorder).await {
            error!("❌ Update of camp {} failed, removing uploads: {}", camp_id, e);
            drop(tx);
            remove_uploads(self.store.as_ref(), &uploaded).await;
            return Err(e);
        }
        if let Err(e) = tx.commit().await {
            remove_uploads(self.store.as_ref(), &uploaded).await;
            return Err(e.into());
        }

        info!("✅ Camp {} updated by owner {}", camp_id, owner_id);
        self.get_owner_camp(owner_id, camp_id).await
    }

    async fn apply_update(
        tx: &mut Transaction<'_, Postgres>,
        camp_id: &Uuid,
        request: &UpdateCampRequest,
        uploaded: &[UploadedImage],
        reorder: Option<Vec<(Uuid, i32)>>,
    ) -> Result<(), MarketplaceError> {
        sqlx::query(
            r#"
            UPDATE camps
            SET camp_name = $2, camp_email = $3, country_id = $4, location = $5,
                description = $6, age_group_min = $7, age_group_max = $8,
                gender = $9, capacity = $10, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(camp_id)
        .bind(request.camp_name.trim())
        .bind(request.camp_email.trim())
        .bind(request.country_id)
        .bind(request.location.trim())
        .bind(&request.description)
        .bind(request.age_min)
        .bind(request.age_max)
        .bind(request.gender.as_str())
        .bind(request.capacity)
        .execute(&mut **tx)
        .await?;

        sqlx::query("DELETE FROM camp_dates WHERE camp_id = $1")
            .bind(camp_id)
            .execute(&mut **tx)
            .await?;

        for date in &request.dates {
            sqlx::query(
                r#"
                INSERT INTO camp_dates (camp_id, start_date, end_date, duration_days, price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(camp_id)
            .bind(date.start_date)
            .bind(date.end_date)
            .bind(duration_days(date.start_date, date.end_date))
            .bind(date.price)
            .execute(&mut **tx)
            .await?;
        }

        for (image_id, order) in reorder.unwrap_or_default() {
            sqlx::query("UPDATE camp_images SET image_order = $2 WHERE id = $1 AND camp_id = $3")
                .bind(image_id)
                .bind(order)
                .bind(camp_id)
                .execute(&mut **tx)
                .await?;
        }

        for image in uploaded {
            sqlx::query(
                "INSERT INTO camp_images (camp_id, image_url, image_order) VALUES ($1, $2, $3)",
            )
            .bind(camp_id)
            .bind(&image.url)
            .bind(image.order)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Removes one photo from the owner's camp. The last photo cannot be removed.
    pub async fn delete_camp_image(
        &self,
        owner_id: &Uuid,
        camp_id: &Uuid,
        image_id: &Uuid,
    ) -> Result<(), MarketplaceError> {
        let camp = self.get_owner_camp(owner_id, camp_id).await?;
        if !camp.images.iter().any(|image| &image.id == image_id) {
            return Err(MarketplaceError::NotFound("Image".to_string()));
        }
        if camp.images.len() == 1 {
            return Err(MarketplaceError::validation(
                "A camp must keep at least one image",
            ));
        }

        sqlx::query("DELETE FROM camp_images WHERE id = $1 AND camp_id = $2")
            .bind(image_id)
            .bind(camp_id)
            .execute(&self.pool)
            .await?;

        info!("Image {} removed from camp {}", image_id, camp_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::tests::listing;
    use chrono::NaiveDate;

    fn image(camp_id: Uuid, order: i32) -> CampImage {
        CampImage {
            id: Uuid::new_v4(),
            camp_id,
            image_url: format!("https://cdn/{}.jpg", order),
            image_order: order,
        }
    }

    #[test]
    fn test_profile_reorder_moves_choice_to_front() {
        let camp_id = Uuid::new_v4();
        let images: Vec<CampImage> = (0..4).map(|order| image(camp_id, order)).collect();

        let reordered = profile_reorder(&images, &images[2].id).unwrap();

        assert_eq!(
            reordered,
            vec![
                (images[2].id, 0),
                (images[0].id, 1),
                (images[1].id, 2),
                (images[3].id, 3),
            ]
        );
    }

    #[test]
    fn test_profile_reorder_rejects_unknown_image() {
        let camp_id = Uuid::new_v4();
        let images = vec![image(camp_id, 0)];
        assert!(profile_reorder(&images, &Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_list_response_groups_only_without_country_filter() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let camps = vec![listing(Uuid::new_v4(), "both", start)];

        let grouped = CampListResponse::new(camps.clone(), &CampFilter::default());
        assert_eq!(grouped.total, 1);
        assert!(grouped.by_country.is_some());

        let filtered = CampListResponse::new(
            camps,
            &CampFilter {
                countries: vec![Uuid::new_v4()],
                ..Default::default()
            },
        );
        assert!(filtered.by_country.is_none());
    }
}
