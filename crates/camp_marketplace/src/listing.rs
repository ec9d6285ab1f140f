use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Deserialize;
use uuid::Uuid;

use crate::{CampListing, CountryGroup, Gender, MarketplaceError};

/// Query string of the public catalogue: comma separated lists.
///
/// `?countries=<uuid>,<uuid>&gender=girls&months=6,7`
#[derive(Debug, Default, Deserialize)]
pub struct CampListQuery {
    /// Country ids
    pub countries: Option<String>,
    /// boys, girls or both
    pub gender: Option<String>,
    /// Start months, 1 to 12
    pub months: Option<String>,
}

/// Filters applied to approved camps. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampFilter {
    /// Camp country must be one of these
    pub countries: Vec<Uuid>,
    /// Camp must be open to this group
    pub gender: Option<Gender>,
    /// Camp must start in one of these months
    pub months: Vec<u32>,
}

fn split_list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

impl CampListQuery {
    /// Parses the raw query into a filter.
    pub fn into_filter(self) -> Result<CampFilter, MarketplaceError> {
        let countries = split_list(self.countries.as_deref())
            .map(|id| {
                Uuid::parse_str(id)
                    .map_err(|_| MarketplaceError::validation(format!("Invalid country id '{}'", id)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let gender = match self.gender.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(value) => Some(value.parse::<Gender>()?),
        };

        let months = split_list(self.months.as_deref())
            .map(|month| match month.parse::<u32>() {
                Ok(value @ 1..=12) => Ok(value),
                _ => Err(MarketplaceError::validation(format!(
                    "Invalid month '{}'",
                    month
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CampFilter {
            countries,
            gender,
            months,
        })
    }
}

impl CampFilter {
    /// Gender selections match camps for that group and mixed camps.
    pub fn matches_gender(&self, camp_gender: &str) -> bool {
        match self.gender {
            None => true,
            Some(selected) => camp_gender == selected.as_str() || camp_gender == Gender::Both.as_str(),
        }
    }

    /// True when no country is selected or the camp's country is one of them.
    pub fn matches_country(&self, country_id: &Uuid) -> bool {
        self.countries.is_empty() || self.countries.contains(country_id)
    }

    /// True when no month is selected or the camp starts in one of them.
    pub fn matches_month(&self, listing: &CampListing) -> bool {
        self.months.is_empty() || self.months.contains(&listing.camp.start_date.month())
    }

    /// Full predicate. The database applies country and gender, months are checked in memory.
    pub fn matches(&self, listing: &CampListing) -> bool {
        self.matches_country(&listing.camp.country_id)
            && self.matches_gender(&listing.camp.gender)
            && self.matches_month(listing)
    }

    /// Gender bound to the SQL query.
    pub fn gender_param(&self) -> Option<&'static str> {
        self.gender.map(|gender| gender.as_str())
    }
}

/// Groups listings by country name, keeping each group in start date order.
pub fn group_by_country(camps: &[CampListing]) -> Vec<CountryGroup> {
    let mut groups: BTreeMap<String, Vec<CampListing>> = BTreeMap::new();
    for listing in camps {
        let name = listing
            .country_name
            .clone()
            .unwrap_or_else(|| "Other".to_string());
        groups.entry(name).or_default().push(listing.clone());
    }

    groups
        .into_iter()
        .map(|(country_name, camps)| CountryGroup {
            country_name,
            camps,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Camp;
    use chrono::{NaiveDate, Utc};

    pub(crate) fn listing(country_id: Uuid, gender: &str, start: NaiveDate) -> CampListing {
        CampListing {
            camp: Camp {
                id: Uuid::new_v4(),
                submission_id: None,
                owner_id: Uuid::new_v4(),
                country_id,
                camp_name: "Hoops".to_string(),
                camp_email: "camp@example.com".to_string(),
                location: "Madrid".to_string(),
                description: String::new(),
                start_date: start,
                end_date: start + chrono::Duration::days(4),
                duration_days: 5,
                price: "300".parse().unwrap(),
                age_group_min: 10,
                age_group_max: 16,
                gender: gender.to_string(),
                capacity: 30,
                status: "approved".to_string(),
                approved_by: None,
                approved_at: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            country_name: Some("Spain".to_string()),
            cover_image_url: None,
        }
    }

    fn day(month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, 10).unwrap()
    }

    #[test]
    fn test_query_parsing() {
        let spain = Uuid::new_v4();
        let filter = CampListQuery {
            countries: Some(format!("{}, ", spain)),
            gender: Some("girls".to_string()),
            months: Some("6,7".to_string()),
        }
        .into_filter()
        .unwrap();

        assert_eq!(filter.countries, vec![spain]);
        assert_eq!(filter.gender, Some(Gender::Girls));
        assert_eq!(filter.months, vec![6, 7]);

        assert!(
            CampListQuery {
                months: Some("13".to_string()),
                ..Default::default()
            }
            .into_filter()
            .is_err()
        );
        assert_eq!(
            CampListQuery::default().into_filter().unwrap(),
            CampFilter::default()
        );
    }

    #[test]
    fn test_country_and_month_filter() {
        let spain = Uuid::new_v4();
        let italy = Uuid::new_v4();
        let filter = CampFilter {
            countries: vec![spain],
            gender: None,
            months: vec![6],
        };

        assert!(filter.matches(&listing(spain, "boys", day(6))));
        assert!(!filter.matches(&listing(spain, "boys", day(7))));
        assert!(!filter.matches(&listing(italy, "boys", day(6))));
    }

    #[test]
    fn test_gender_filter_includes_mixed_camps() {
        let filter = CampFilter {
            gender: Some(Gender::Girls),
            ..Default::default()
        };
        assert!(filter.matches_gender("girls"));
        assert!(filter.matches_gender("both"));
        assert!(!filter.matches_gender("boys"));

        let mixed_only = CampFilter {
            gender: Some(Gender::Both),
            ..Default::default()
        };
        assert!(mixed_only.matches_gender("both"));
        assert!(!mixed_only.matches_gender("boys"));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = CampFilter::default();
        assert!(filter.matches(&listing(Uuid::new_v4(), "boys", day(1))));
    }

    #[test]
    fn test_group_by_country() {
        let mut italian = listing(Uuid::new_v4(), "both", day(8));
        italian.country_name = Some("Italy".to_string());
        let camps = vec![listing(Uuid::new_v4(), "both", day(6)), italian];

        let groups = group_by_country(&camps);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].country_name, "Italy");
        assert_eq!(groups[1].camps.len(), 1);
    }
}
