//! Event catalog: lookup plus the filter/sort pipeline behind the events listing.
//!
//! Filters are AND-combined in a fixed order: free text, city, category, date,
//! then price range. Sorting happens last and is stable, so events that compare
//! equal under the chosen key keep their catalog order.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::form_urlencoded;

use crate::data::{self, ALL_CATEGORIES, ALL_CITIES};
use crate::models::{Event, Money};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Event '{0}' was not found")]
    EventNotFound(String),

    #[error("Invalid catalog query: {0}")]
    InvalidQuery(String),
}

/// A facet filter that is either off or pinned to one exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Blank input and the "all" placeholders disable the filter.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("all")
            || trimmed == ALL_CITIES
            || trimmed == ALL_CATEGORIES
        {
            Selection::All
        } else {
            Selection::Only(trimmed.to_string())
        }
    }

    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Only(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "price-asc", alias = "price-low")]
    PriceAsc,
    #[serde(rename = "price-desc", alias = "price-high")]
    PriceDesc,
    #[serde(rename = "popularity", alias = "popular")]
    Popularity,
}

impl SortKey {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" | "date" => Some(SortKey::Date),
            "price-asc" | "price-low" => Some(SortKey::PriceAsc),
            "price-desc" | "price-high" => Some(SortKey::PriceDesc),
            "popularity" | "popular" => Some(SortKey::Popularity),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::Popularity => "popularity",
        }
    }

    fn compare(self, a: &Event, b: &Event) -> Ordering {
        match self {
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::PriceAsc => a.price.cmp(&b.price),
            SortKey::PriceDesc => b.price.cmp(&a.price),
            SortKey::Popularity => b.sold_tickets.cmp(&a.sold_tickets),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive price bounds. The default is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Money,
    pub max: Money,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: Money::ZERO,
            max: Money::MAX,
        }
    }
}

impl PriceRange {
    pub fn contains(&self, price: Money) -> bool {
        self.min <= price && price <= self.max
    }

    pub fn is_unbounded(&self) -> bool {
        *self == PriceRange::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub query: String,
    pub city: Selection,
    pub category: Selection,
    pub date: Option<NaiveDate>,
    pub price: PriceRange,
    pub sort: SortKey,
}

impl FilterCriteria {
    fn matches_with_needle(&self, event: &Event, needle: &str) -> bool {
        (needle.is_empty() || event.matches_text(needle))
            && self.city.accepts(&event.city)
            && self.category.accepts(&event.category)
            && self.date.map_or(true, |date| event.date == date)
            && self.price.contains(event.price)
    }

    /// Number of narrowing filters in effect. Sorting does not count.
    pub fn active_filter_count(&self) -> usize {
        [
            !self.query.is_empty(),
            self.city != Selection::All,
            self.category != Selection::All,
            self.date.is_some(),
            !self.price.is_unbounded(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// Serializes the non-default criteria as a URL query string.
    pub fn to_query_string(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        if !self.query.is_empty() {
            out.append_pair("q", &self.query);
        }
        if let Some(city) = self.city.as_value() {
            out.append_pair("location", city);
        }
        if let Some(category) = self.category.as_value() {
            out.append_pair("category", category);
        }
        if let Some(date) = self.date {
            out.append_pair("date", &date.format("%Y-%m-%d").to_string());
        }
        if self.price.min != Money::ZERO {
            out.append_pair("min_price", &self.price.min.to_string());
        }
        if self.price.max != Money::MAX {
            out.append_pair("max_price", &self.price.max.to_string());
        }
        if self.sort != SortKey::Date {
            out.append_pair("sort", self.sort.as_str());
        }
        out.finish()
    }

    /// Parses criteria from a raw query string (without the leading `?`).
    pub fn from_query_string(raw: &str) -> Result<Self, CatalogError> {
        let mut params = CatalogParams::default();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "q" => params.q = value,
                "location" => params.location = value,
                "category" => params.category = value,
                "date" => params.date = value,
                "min_price" => params.min_price = value,
                "max_price" => params.max_price = value,
                "sort" => params.sort = value,
                _ => {}
            }
        }
        params.try_into()
    }
}

/// Raw query parameters for the events listing, as they appear in the URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogParams {
    pub q: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
}

fn parse_price(field: &str, raw: Option<&str>) -> Result<Option<Money>, CatalogError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<Decimal>()
        .ok()
        .and_then(Money::from_decimal)
        .filter(|m| !m.is_negative())
        .map(Some)
        .ok_or_else(|| CatalogError::InvalidQuery(format!("{field} '{raw}' is not a valid price")))
}

impl TryFrom<CatalogParams> for FilterCriteria {
    type Error = CatalogError;

    fn try_from(params: CatalogParams) -> Result<Self, Self::Error> {
        let date = match params.date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                CatalogError::InvalidQuery(format!("date '{raw}' is not YYYY-MM-DD"))
            })?),
            None => None,
        };

        let sort = match params.sort.as_deref() {
            Some(raw) => SortKey::parse(raw)
                .ok_or_else(|| CatalogError::InvalidQuery(format!("unknown sort key '{raw}'")))?,
            None => SortKey::Date,
        };

        let min = parse_price("min_price", params.min_price.as_deref())?.unwrap_or(Money::ZERO);
        let max = parse_price("max_price", params.max_price.as_deref())?.unwrap_or(Money::MAX);
        if min > max {
            return Err(CatalogError::InvalidQuery(format!(
                "min_price {min} is greater than max_price {max}"
            )));
        }

        Ok(FilterCriteria {
            query: params.q.unwrap_or_default(),
            city: params.location.as_deref().map(Selection::parse).unwrap_or_default(),
            category: params.category.as_deref().map(Selection::parse).unwrap_or_default(),
            date,
            price: PriceRange { min, max },
            sort,
        })
    }
}

/// Filters then sorts `events`. An empty result is a normal outcome.
pub fn apply<'a>(events: &'a [Event], criteria: &FilterCriteria) -> Vec<&'a Event> {
    let needle = criteria.query.to_lowercase();
    let mut matched: Vec<&Event> = events
        .iter()
        .filter(|event| criteria.matches_with_needle(event, &needle))
        .collect();
    // `sort_by` is stable: ties keep catalog order.
    matched.sort_by(|a, b| criteria.sort.compare(a, b));
    matched
}

/// The read-only set of events the site serves.
#[derive(Debug, Clone)]
pub struct Catalog {
    events: Vec<Event>,
    cities: Vec<String>,
    categories: Vec<String>,
}

impl Catalog {
    pub fn new(events: Vec<Event>, cities: Vec<String>, categories: Vec<String>) -> Self {
        Self {
            events,
            cities,
            categories,
        }
    }

    pub fn seeded() -> Self {
        Self::new(
            data::seed_events(),
            data::CITIES.iter().map(|c| c.to_string()).collect(),
            data::CATEGORIES.iter().map(|c| c.to_string()).collect(),
        )
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn get(&self, id: &str) -> Result<&Event, CatalogError> {
        self.find(id)
            .ok_or_else(|| CatalogError::EventNotFound(id.to_string()))
    }

    pub fn featured(&self) -> Vec<&Event> {
        self.events.iter().filter(|e| e.featured).collect()
    }

    pub fn by_organizer(&self, organizer_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.organizer_id == organizer_id)
            .collect()
    }

    pub fn search(&self, criteria: &FilterCriteria) -> Vec<&Event> {
        let results = apply(&self.events, criteria);
        debug!(
            active_filters = criteria.active_filter_count(),
            sort = %criteria.sort,
            matched = results.len(),
            "Catalog search"
        );
        results
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn is_known_city(&self, city: &str) -> bool {
        self.cities.iter().any(|c| c == city)
    }

    pub fn is_known_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::seeded()
    }

    fn ids(events: &[&Event]) -> Vec<String> {
        events.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_no_filters_returns_everything_sorted() {
        let catalog = catalog();
        for sort in [
            SortKey::Date,
            SortKey::PriceAsc,
            SortKey::PriceDesc,
            SortKey::Popularity,
        ] {
            let criteria = FilterCriteria {
                sort,
                ..FilterCriteria::default()
            };
            let results = catalog.search(&criteria);
            assert_eq!(results.len(), catalog.len());
            let mut got = ids(&results);
            got.sort();
            assert_eq!(got, vec!["1", "2", "3", "4", "5", "6"]);
        }
    }

    #[test]
    fn test_text_query_matches_title_description_or_city() {
        let catalog = catalog();
        for query in ["jazz", "NEW YORK", "Workshop", "an", "zzz"] {
            let criteria = FilterCriteria {
                query: query.to_string(),
                ..FilterCriteria::default()
            };
            let results = catalog.search(&criteria);
            let needle = query.to_lowercase();
            for event in catalog.events() {
                let hit = event.title.to_lowercase().contains(&needle)
                    || event.description.to_lowercase().contains(&needle)
                    || event.city.to_lowercase().contains(&needle);
                assert_eq!(results.iter().any(|e| e.id == event.id), hit, "{query}");
            }
        }
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let catalog = catalog();
        let criteria = FilterCriteria {
            price: PriceRange {
                min: Money::from_dollars(75),
                max: Money::from_dollars(199),
            },
            ..FilterCriteria::default()
        };
        let results = catalog.search(&criteria);
        assert_eq!(ids(&results), vec!["2", "3", "4"]);
        assert!(results
            .iter()
            .all(|e| criteria.price.min <= e.price && e.price <= criteria.price.max));
    }

    #[test]
    fn test_inverted_price_range_matches_nothing() {
        let criteria = FilterCriteria {
            price: PriceRange {
                min: Money::from_dollars(500),
                max: Money::from_dollars(10),
            },
            ..FilterCriteria::default()
        };
        assert!(catalog().search(&criteria).is_empty());
    }

    #[test]
    fn test_price_sorts_are_monotonic() {
        let catalog = catalog();
        let asc = catalog.search(&FilterCriteria {
            sort: SortKey::PriceAsc,
            ..FilterCriteria::default()
        });
        assert!(asc.windows(2).all(|w| w[0].price <= w[1].price));

        let desc = catalog.search(&FilterCriteria {
            sort: SortKey::PriceDesc,
            ..FilterCriteria::default()
        });
        assert!(desc.windows(2).all(|w| w[0].price >= w[1].price));
    }

    #[test]
    fn test_popularity_orders_by_sold_tickets() {
        let catalog = catalog();
        let results = catalog.search(&FilterCriteria {
            sort: SortKey::Popularity,
            ..FilterCriteria::default()
        });
        assert_eq!(ids(&results), vec!["2", "4", "1", "5", "6", "3"]);
    }

    #[test]
    fn test_city_filter_austin() {
        let criteria = FilterCriteria {
            city: Selection::parse("Austin"),
            ..FilterCriteria::default()
        };
        let catalog = catalog();
        let results = catalog.search(&criteria);
        assert_eq!(ids(&results), vec!["4"]);
    }

    #[test]
    fn test_category_and_date_filters() {
        let catalog = catalog();
        let criteria = FilterCriteria {
            category: Selection::parse("Music"),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&catalog.search(&criteria)), vec!["2"]);

        let criteria = FilterCriteria {
            date: NaiveDate::from_ymd_opt(2024, 4, 12),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&catalog.search(&criteria)), vec!["5"]);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let mut events = data::seed_events();
        for event in &mut events {
            event.price = Money::from_dollars(50);
        }
        let criteria = FilterCriteria {
            sort: SortKey::PriceDesc,
            ..FilterCriteria::default()
        };
        let results = apply(&events, &criteria);
        assert_eq!(ids(&results), vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn test_all_placeholders_disable_facets() {
        assert_eq!(Selection::parse("All Cities"), Selection::All);
        assert_eq!(Selection::parse("All Categories"), Selection::All);
        assert_eq!(Selection::parse("  "), Selection::All);
        assert_eq!(Selection::parse("all"), Selection::All);
        assert_eq!(
            Selection::parse("Boulder"),
            Selection::Only("Boulder".to_string())
        );
    }

    #[test]
    fn test_query_string_round_trip() {
        let criteria = FilterCriteria {
            query: "jazz & blues".to_string(),
            city: Selection::Only("New York".to_string()),
            category: Selection::Only("Food & Drink".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 3, 22),
            price: PriceRange {
                min: Money::from_dollars(10),
                max: Money::from_cents(12_550),
            },
            sort: SortKey::PriceDesc,
        };
        let encoded = criteria.to_query_string();
        assert!(encoded.contains("location=New+York"));
        assert_eq!(FilterCriteria::from_query_string(&encoded), Ok(criteria));

        assert_eq!(FilterCriteria::default().to_query_string(), "");
    }

    #[test]
    fn test_params_accept_legacy_sort_names() {
        let criteria = FilterCriteria::from_query_string("sort=price-low").unwrap();
        assert_eq!(criteria.sort, SortKey::PriceAsc);
        let criteria = FilterCriteria::from_query_string("sort=popular").unwrap();
        assert_eq!(criteria.sort, SortKey::Popularity);
    }

    #[test]
    fn test_params_reject_bad_input() {
        assert!(FilterCriteria::from_query_string("date=15-03-2024").is_err());
        assert!(FilterCriteria::from_query_string("sort=random").is_err());
        assert!(FilterCriteria::from_query_string("min_price=abc").is_err());
        assert!(FilterCriteria::from_query_string("min_price=-5").is_err());
        assert!(FilterCriteria::from_query_string("min_price=300&max_price=100").is_err());
    }

    #[test]
    fn test_active_filter_count() {
        let criteria =
            FilterCriteria::from_query_string("q=tech&location=All+Cities&max_price=500").unwrap();
        assert_eq!(criteria.active_filter_count(), 2);
        assert_eq!(FilterCriteria::default().active_filter_count(), 0);
    }

    #[test]
    fn test_lookup_and_facets() {
        let catalog = catalog();
        assert_eq!(catalog.get("3").map(|e| e.title.as_str()), Ok("Culinary Arts Workshop"));
        assert_eq!(
            catalog.get("99"),
            Err(CatalogError::EventNotFound("99".to_string()))
        );
        assert_eq!(ids(&catalog.featured()), vec!["1", "2", "4", "6"]);
        assert_eq!(ids(&catalog.by_organizer("org-1")), vec!["1", "4"]);
        assert!(catalog.is_known_city("Seattle"));
        assert!(!catalog.is_known_category("Gardening"));
    }
}
