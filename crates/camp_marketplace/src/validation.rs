//! Submission and camp edit rules. Every check here runs before the first upload
//! or database write, so a rejected request leaves nothing behind.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use validator::ValidateEmail;

use crate::{CampDateInput, CreateSubmissionRequest, DateRangeInput, MarketplaceError};

/// Longest accepted description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 10_000;

/// Most photos a submission or camp may carry.
pub const MAX_IMAGES: usize = 50;

/// Oldest participant age a camp may target.
pub const MAX_AGE: i32 = 120;

/// Smallest commission accepted for `price`: 5% of it.
pub fn minimum_commission(price: Decimal) -> Decimal {
    price * Decimal::new(5, 2)
}

/// Largest amount a `NUMERIC(10, 2)` money column holds.
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_99, 2)
}

/// Checks that `amount` is whole cents and fits the money columns, so the stored
/// value is exactly the validated one.
fn validate_amount(position: usize, label: &str, amount: Decimal) -> Result<(), MarketplaceError> {
    if amount != amount.round_dp(2) {
        return Err(MarketplaceError::validation(format!(
            "Camp date {}: {} cannot have more than 2 decimal places",
            position, label
        )));
    }
    if amount > max_amount() {
        return Err(MarketplaceError::validation(format!(
            "Camp date {}: {} must be at most €{}",
            position,
            label,
            max_amount()
        )));
    }
    Ok(())
}

/// Inclusive number of calendar days from `start` to `end`.
pub fn duration_days(start: NaiveDate, end: NaiveDate) -> i32 {
    (end - start).num_days() as i32 + 1
}

fn validate_session(
    position: usize,
    start: NaiveDate,
    end: NaiveDate,
    price: Decimal,
) -> Result<(), MarketplaceError> {
    if end <= start {
        return Err(MarketplaceError::validation(format!(
            "Camp date {}: end date must be after start date",
            position
        )));
    }
    if price <= Decimal::ZERO {
        return Err(MarketplaceError::validation(format!(
            "Camp date {}: price must be greater than zero",
            position
        )));
    }
    validate_amount(position, "price", price)
}

/// Checks one submitted session. `position` is 1-based and only used in messages.
pub fn validate_date_range(position: usize, range: &DateRangeInput) -> Result<(), MarketplaceError> {
    validate_session(position, range.start_date, range.end_date, range.price)?;
    validate_amount(position, "commission", range.commission)?;

    let minimum = minimum_commission(range.price);
    if range.commission < minimum {
        return Err(MarketplaceError::validation(format!(
            "Camp date {}: commission must be at least 5% of the price (minimum €{})",
            position,
            minimum.round_dp(2)
        )));
    }
    Ok(())
}

/// Checks the replacement sessions of a camp edit.
pub fn validate_camp_dates(dates: &[CampDateInput]) -> Result<(), MarketplaceError> {
    if dates.is_empty() {
        return Err(MarketplaceError::validation(
            "Please add at least one camp date",
        ));
    }
    for (index, date) in dates.iter().enumerate() {
        validate_session(index + 1, date.start_date, date.end_date, date.price)?;
    }
    Ok(())
}

/// Checks the description length in characters, not bytes.
pub fn validate_description(description: &str) -> Result<(), MarketplaceError> {
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(MarketplaceError::validation(format!(
            "Description must be {} characters or less",
            MAX_DESCRIPTION_CHARS
        )));
    }
    Ok(())
}

/// Checks the total number of photos a camp would end up with.
pub fn validate_image_count(count: usize) -> Result<(), MarketplaceError> {
    if count == 0 {
        return Err(MarketplaceError::validation(
            "Please upload at least one image",
        ));
    }
    if count > MAX_IMAGES {
        return Err(MarketplaceError::validation(format!(
            "Maximum {} images allowed",
            MAX_IMAGES
        )));
    }
    Ok(())
}

/// Checks the fields shared by submissions and camp edits.
pub fn validate_camp_profile(
    age_min: i32,
    age_max: i32,
    capacity: i32,
    description: &str,
) -> Result<(), MarketplaceError> {
    if age_min < 1 || age_max > MAX_AGE {
        return Err(MarketplaceError::validation(format!(
            "Ages must be between 1 and {}",
            MAX_AGE
        )));
    }
    if age_min > age_max {
        return Err(MarketplaceError::validation(
            "Minimum age cannot be above maximum age",
        ));
    }
    if capacity <= 0 {
        return Err(MarketplaceError::validation(
            "Capacity must be greater than zero",
        ));
    }
    validate_description(description)
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or_default().is_empty()
}

/// Owner contact details are collected once, on the owner's first submission.
pub fn validate_owner_contact(request: &CreateSubmissionRequest) -> Result<(), MarketplaceError> {
    if is_blank(&request.owner_name)
        || is_blank(&request.owner_email)
        || is_blank(&request.owner_phone)
    {
        return Err(MarketplaceError::validation(
            "Owner name, email and phone are required on your first submission",
        ));
    }

    let email = request.owner_email.as_deref().unwrap_or_default().trim();
    if !email.validate_email() {
        return Err(MarketplaceError::validation("Please enter a valid owner email"));
    }

    let phone = request.owner_phone.as_deref().unwrap_or_default().trim();
    if !auth_services::types::validate_phone_number(phone) {
        return Err(MarketplaceError::validation("Please enter a valid owner phone"));
    }
    Ok(())
}

/// Runs every intake rule against `request`.
pub fn validate_submission(
    request: &CreateSubmissionRequest,
    is_first_submission: bool,
) -> Result<(), MarketplaceError> {
    if request.dates.is_empty() {
        return Err(MarketplaceError::validation(
            "Please add at least one camp date",
        ));
    }
    for (index, range) in request.dates.iter().enumerate() {
        validate_date_range(index + 1, range)?;
    }

    validate_camp_profile(
        request.age_min,
        request.age_max,
        request.capacity,
        &request.description,
    )?;

    validate_image_count(request.images.len())?;
    if request.profile_image_index >= request.images.len() {
        return Err(MarketplaceError::validation(
            "Please pick one of the uploaded images as the profile photo",
        ));
    }

    if is_first_submission {
        validate_owner_contact(request)?;
    }
    Ok(())
}

/// Upload order of `count` photos: the profile photo first, then the rest as picked.
pub fn image_upload_order(count: usize, profile_index: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(count);
    if profile_index < count {
        order.push(profile_index);
    }
    order.extend((0..count).filter(|&index| index != profile_index));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Gender, ImageUpload};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(price: &str, commission: &str) -> DateRangeInput {
        DateRangeInput {
            start_date: date(2025, 7, 1),
            end_date: date(2025, 7, 5),
            price: price.parse().unwrap(),
            commission: commission.parse().unwrap(),
        }
    }

    fn image(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            content_type: Some("image/jpeg".to_string()),
            data: "aGVsbG8=".to_string(),
        }
    }

    fn request() -> CreateSubmissionRequest {
        CreateSubmissionRequest {
            camp_name: "Hoops Academy".to_string(),
            camp_email: "camp@example.com".to_string(),
            country_id: Uuid::new_v4(),
            location: "Madrid".to_string(),
            description: "Summer basketball camp".to_string(),
            age_min: 10,
            age_max: 16,
            gender: Gender::Both,
            capacity: 40,
            owner_name: Some("Ana Coach".to_string()),
            owner_email: Some("ana@example.com".to_string()),
            owner_phone: Some("+34 600 123 456".to_string()),
            dates: vec![range("100.00", "5.00")],
            images: vec![image("court.jpg")],
            profile_image_index: 0,
        }
    }

    #[test]
    fn test_valid_submission() {
        assert!(validate_submission(&request(), true).is_ok());
    }

    #[test]
    fn test_end_date_must_follow_start_date() {
        let mut req = request();
        req.dates[0].end_date = req.dates[0].start_date;
        assert!(matches!(
            validate_submission(&req, false),
            Err(MarketplaceError::Validation(_))
        ));
    }

    #[test]
    fn test_commission_boundary() {
        assert!(validate_date_range(1, &range("100.00", "5.00")).is_ok());
        assert!(validate_date_range(1, &range("100.00", "4.99")).is_err());
        assert!(validate_date_range(1, &range("99.99", "5.00")).is_ok());
        assert!(validate_date_range(1, &range("99.99", "4.99")).is_err());
    }

    #[test]
    fn test_amounts_must_be_whole_cents() {
        // Would round to 100.01 / 5.00 in the database, below the 5% floor
        assert!(validate_date_range(1, &range("100.006", "5.0003")).is_err());
        assert!(validate_date_range(1, &range("100.00", "5.001")).is_err());
        assert!(validate_date_range(1, &range("100.000", "5.000")).is_ok());
    }

    #[test]
    fn test_price_must_fit_money_column() {
        assert!(validate_date_range(1, &range("99999999.99", "5000000.00")).is_ok());
        assert!(validate_date_range(1, &range("100000000.00", "5000000.00")).is_err());
        assert!(validate_date_range(1, &range("100.00", "100000000.00")).is_err());
    }

    #[test]
    fn test_price_must_be_positive() {
        assert!(validate_date_range(1, &range("0", "0")).is_err());
    }

    #[test]
    fn test_description_boundary() {
        let mut req = request();
        req.description = "a".repeat(MAX_DESCRIPTION_CHARS);
        assert!(validate_submission(&req, false).is_ok());

        req.description = "a".repeat(MAX_DESCRIPTION_CHARS + 1);
        assert!(validate_submission(&req, false).is_err());

        req.description = "é".repeat(MAX_DESCRIPTION_CHARS);
        assert!(validate_submission(&req, false).is_ok());
    }

    #[test]
    fn test_image_count_boundary() {
        let mut req = request();
        req.images.clear();
        assert!(validate_submission(&req, false).is_err());

        req.images = (0..50).map(|i| image(&format!("{}.jpg", i))).collect();
        assert!(validate_submission(&req, false).is_ok());

        req.images.push(image("51.jpg"));
        assert!(validate_submission(&req, false).is_err());
    }

    #[test]
    fn test_profile_index_must_point_at_an_image() {
        let mut req = request();
        req.profile_image_index = 1;
        assert!(validate_submission(&req, false).is_err());
    }

    #[test]
    fn test_owner_contact_only_required_on_first_submission() {
        let mut req = request();
        req.owner_phone = Some("   ".to_string());
        assert!(validate_submission(&req, true).is_err());
        assert!(validate_submission(&req, false).is_ok());

        req.owner_phone = Some("+34 600 123 456".to_string());
        req.owner_email = Some("not-an-email".to_string());
        assert!(validate_submission(&req, true).is_err());
    }

    #[test]
    fn test_age_and_capacity() {
        let mut req = request();
        req.age_min = 17;
        assert!(validate_submission(&req, false).is_err());

        let mut req = request();
        req.capacity = 0;
        assert!(validate_submission(&req, false).is_err());
    }

    #[test]
    fn test_duration_is_inclusive() {
        assert_eq!(duration_days(date(2025, 7, 1), date(2025, 7, 5)), 5);
        assert_eq!(duration_days(date(2025, 6, 30), date(2025, 7, 1)), 2);
    }

    #[test]
    fn test_image_upload_order_puts_profile_first() {
        assert_eq!(image_upload_order(4, 2), vec![2, 0, 1, 3]);
        assert_eq!(image_upload_order(3, 0), vec![0, 1, 2]);
        assert_eq!(image_upload_order(1, 0), vec![0]);
    }

    #[test]
    fn test_camp_dates_for_edit() {
        assert!(validate_camp_dates(&[]).is_err());
        assert!(
            validate_camp_dates(&[CampDateInput {
                start_date: date(2025, 8, 1),
                end_date: date(2025, 8, 3),
                price: "250".parse().unwrap(),
            }])
            .is_ok()
        );
    }
}
