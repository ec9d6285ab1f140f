use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    BookingRequest, BookingWithCamp, CAMP_STATUS_APPROVED, Camp, CreateBookingRequest,
    CreatedBooking, MarketplaceError,
};

/// Prefilled email asking `camp` for a place, copied to `admin_email`.
pub fn booking_mailto(
    camp: &Camp,
    country_name: &str,
    requester_name: &str,
    request: &CreateBookingRequest,
    admin_email: &str,
) -> String {
    let subject = format!("Basketball Camp Booking Request - {}", camp.camp_name);

    let mut body = format!(
        "Hello,\n\n\
         I would like to request a booking for the following camp:\n\n\
         Camp: {}\n\
         Location: {}, {}\n\
         Dates: {} to {}\n\
         Price: €{}\n\n\
         Participant details:\n\
         Name: {}\n\
         Age: {}\n\
         Email: {}\n\
         Phone: {}\n",
        camp.camp_name,
        camp.location,
        country_name,
        camp.start_date.format("%d/%m/%Y"),
        camp.end_date.format("%d/%m/%Y"),
        camp.price.round_dp(2),
        request.participant_name.trim(),
        request.participant_age,
        request.participant_email.trim(),
        request.participant_phone.trim(),
    );

    let message = request.message.trim();
    if !message.is_empty() {
        body.push_str(&format!("\nMessage:\n{}\n", message));
    }
    body.push_str(&format!("\nBest regards,\n{}", requester_name));

    format!(
        "mailto:{}?cc={}&subject={}&body={}",
        urlencoding::encode(&camp.camp_email),
        urlencoding::encode(admin_email),
        urlencoding::encode(&subject),
        urlencoding::encode(&body)
    )
}

/// Service for booking requests
pub struct BookingService {
    pool: PgPool,
}

impl BookingService {
    /// Creates a new instance of `BookingService`
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores a booking request for an approved camp and builds the email to send it.
    pub async fn create_booking(
        &self,
        user_id: &Uuid,
        request: &CreateBookingRequest,
        admin_email: &str,
    ) -> Result<CreatedBooking, MarketplaceError> {
        if request.participant_name.trim().is_empty() || request.participant_phone.trim().is_empty()
        {
            return Err(MarketplaceError::validation(
                "Participant name and phone are required",
            ));
        }

        let camp = sqlx::query_as::<_, Camp>("SELECT * FROM camps WHERE id = $1 AND status = $2")
            .bind(request.camp_id)
            .bind(CAMP_STATUS_APPROVED)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| MarketplaceError::NotFound("Camp".to_string()))?;

        let country_name: String =
            sqlx::query_scalar("SELECT name FROM countries WHERE id = $1")
                .bind(camp.country_id)
                .fetch_optional(&self.pool)
                .await?
                .unwrap_or_default();

        let requester_name: String =
            sqlx::query_scalar("SELECT full_name FROM users_profile WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
                .unwrap_or_else(|| request.participant_name.trim().to_string());

        let booking = sqlx::query_as::<_, BookingRequest>(
            r#"
            INSERT INTO booking_requests (
                camp_id, user_id, participant_name, participant_age,
                participant_email, participant_phone, message
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(camp.id)
        .bind(user_id)
        .bind(request.participant_name.trim())
        .bind(request.participant_age)
        .bind(request.participant_email.trim())
        .bind(request.participant_phone.trim())
        .bind(request.message.trim())
        .fetch_one(&self.pool)
        .await?;

        info!("Booking request {} stored for camp {}", booking.id, camp.id);

        Ok(CreatedBooking {
            mailto_link: booking_mailto(&camp, &country_name, &requester_name, request, admin_email),
            booking,
        })
    }

    /// Gets the user's booking requests with their camps, newest first
    pub async fn list_user_bookings(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<BookingWithCamp>, MarketplaceError> {
        let bookings = sqlx::query_as::<_, BookingWithCamp>(
            r#"
            SELECT b.*, c.camp_name, c.start_date, c.end_date, c.location
            FROM booking_requests b
            JOIN camps c ON c.id = b.camp_id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn camp() -> Camp {
        Camp {
            id: Uuid::new_v4(),
            submission_id: None,
            owner_id: Uuid::new_v4(),
            country_id: Uuid::new_v4(),
            camp_name: "Hoops & Dreams".to_string(),
            camp_email: "camp@example.com".to_string(),
            location: "Madrid".to_string(),
            description: String::new(),
            start_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
            duration_days: 5,
            price: "350.00".parse().unwrap(),
            age_group_min: 10,
            age_group_max: 16,
            gender: "both".to_string(),
            capacity: 30,
            status: "approved".to_string(),
            approved_by: None,
            approved_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(message: &str) -> CreateBookingRequest {
        CreateBookingRequest {
            camp_id: Uuid::new_v4(),
            participant_name: "Leo Player".to_string(),
            participant_age: 14,
            participant_email: "leo@example.com".to_string(),
            participant_phone: "+34 600 000 000".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_mailto_addresses_camp_and_admin() {
        let link = booking_mailto(
            &camp(),
            "Spain",
            "Maria Parent",
            &request(""),
            "admin@example.com",
        );

        assert!(link.starts_with("mailto:camp%40example.com?cc=admin%40example.com&subject="));
        assert!(link.contains("Basketball%20Camp%20Booking%20Request%20-%20Hoops%20%26%20Dreams"));
        assert!(link.contains("Leo%20Player"));
        assert!(link.contains("Madrid%2C%20Spain"));
        assert!(!link.contains("Message"));
    }

    #[test]
    fn test_mailto_encodes_camp_address() {
        let mut camp = camp();
        camp.camp_email = "camps&co?x=1%@example.com".to_string();

        let link = booking_mailto(&camp, "Spain", "Maria Parent", &request(""), "admin@example.com");

        let (recipient, query) = link
            .strip_prefix("mailto:")
            .unwrap()
            .split_once('?')
            .unwrap();
        assert_eq!(urlencoding::decode(recipient).unwrap(), camp.camp_email);
        assert!(query.starts_with("cc=admin%40example.com&subject="));
        assert_eq!(query.matches('&').count(), 2);
    }

    #[test]
    fn test_mailto_includes_optional_message() {
        let link = booking_mailto(
            &camp(),
            "Spain",
            "Maria Parent",
            &request("Needs vegetarian meals"),
            "admin@example.com",
        );

        let body = link.split("&body=").nth(1).unwrap();
        let decoded = urlencoding::decode(body).unwrap();
        assert!(decoded.contains("Message:\nNeeds vegetarian meals"));
        assert!(decoded.contains("Price: €350.00"));
        assert!(decoded.ends_with("Best regards,\nMaria Parent"));
    }
}
