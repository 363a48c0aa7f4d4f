// src/listings/query.rs

use std::cmp::Ordering;
use std::collections::HashMap;

use super::filters::{eq_ci, ilike};
use super::models::{ListingPage, NormalizedListing};

pub const DEFAULT_PAGE_SIZE: usize = 24;
pub const MAX_PAGE_SIZE: usize = 100;
/// Deepest page a caller may ask for; anything past it is a bad request.
pub const MAX_PAGE: usize = 100_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    BedsDesc,
    SqftDesc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "newest" => Some(Self::Newest),
            "oldest" => Some(Self::Oldest),
            "price_asc" => Some(Self::PriceAsc),
            "price_desc" => Some(Self::PriceDesc),
            "beds_desc" => Some(Self::BedsDesc),
            "sqft_desc" => Some(Self::SqftDesc),
            _ => None,
        }
    }
}

/// Caller-facing search over a listing collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingsQuery {
    pub city: Option<String>,
    pub status: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_beds: Option<i64>,
    pub min_baths: Option<i64>,
    pub search: Option<String>,
    pub sort: SortOrder,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListingsQuery {
    fn default() -> Self {
        Self {
            city: None,
            status: None,
            min_price: None,
            max_price: None,
            min_beds: None,
            min_baths: None,
            search: None,
            sort: SortOrder::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListingsQuery {
    /// Builds a query from decoded URL parameters. Blank values are ignored;
    /// malformed numbers are reported by parameter name.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let text = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let sort = match text("sort") {
            Some(raw) => SortOrder::parse(&raw).ok_or_else(|| format!("unknown sort '{raw}'"))?,
            None => SortOrder::default(),
        };

        let page: usize = parse_number(params, "page")?.unwrap_or(1);
        if page > MAX_PAGE {
            return Err(format!("page {page} is out of range (max {MAX_PAGE})"));
        }
        let page_size: usize = parse_number(params, "page_size")?.unwrap_or(DEFAULT_PAGE_SIZE);

        Ok(Self {
            city: text("city"),
            status: text("status"),
            min_price: parse_price(params, "min_price")?,
            max_price: parse_price(params, "max_price")?,
            min_beds: parse_number(params, "min_beds")?,
            min_baths: parse_number(params, "min_baths")?,
            search: text("q"),
            sort,
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.page_size)
    }

    pub fn matches(&self, listing: &NormalizedListing) -> bool {
        if let Some(city) = &self.city {
            if !eq_ci(listing.city.as_deref(), city) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if !eq_ci(Some(listing.status.as_str()), status) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if !listing.list_price.is_some_and(|p| p >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if !listing.list_price.is_some_and(|p| p <= max) {
                return false;
            }
        }
        if let Some(min) = self.min_beds {
            if !listing.bedrooms.is_some_and(|b| b >= min) {
                return false;
            }
        }
        if let Some(min) = self.min_baths {
            if !listing.bathrooms_total.is_some_and(|b| b >= min) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let hit = [
                listing.address.as_deref(),
                listing.city.as_deref(),
                listing.subdivision_name.as_deref(),
                listing.zip_code.as_deref(),
            ]
            .into_iter()
            .any(|field| ilike(field, search));
            if !hit {
                return false;
            }
        }
        true
    }

    /// Filters, sorts and pages an in-memory collection.
    pub fn apply(&self, listings: &[NormalizedListing]) -> ListingPage {
        let mut matched: Vec<&NormalizedListing> =
            listings.iter().filter(|l| self.matches(l)).collect();

        matched.sort_by(|a, b| compare(self.sort, a, b));

        let total = matched.len();
        let items = matched
            .into_iter()
            .skip(self.offset())
            .take(self.page_size)
            .cloned()
            .collect();

        ListingPage {
            items,
            total,
            page: self.page,
            page_size: self.page_size,
            total_pages: total.div_ceil(self.page_size),
        }
    }
}

fn parse_number<T: std::str::FromStr>(
    params: &HashMap<String, String>,
    key: &str,
) -> Result<Option<T>, String> {
    match params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("invalid {key} '{raw}'")),
        None => Ok(None),
    }
}

/// Like `parse_number`, but `NaN` and the infinities are malformed too.
fn parse_price(params: &HashMap<String, String>, key: &str) -> Result<Option<f64>, String> {
    match parse_number::<f64>(params, key)? {
        Some(value) if !value.is_finite() => Err(format!("invalid {key} '{value}'")),
        other => Ok(other),
    }
}

fn compare(sort: SortOrder, a: &NormalizedListing, b: &NormalizedListing) -> Ordering {
    let primary = match sort {
        SortOrder::Newest => nulls_last(&a.listing_date, &b.listing_date, true),
        SortOrder::Oldest => nulls_last(&a.listing_date, &b.listing_date, false),
        SortOrder::PriceAsc => nulls_last_f64(a.list_price, b.list_price, false),
        SortOrder::PriceDesc => nulls_last_f64(a.list_price, b.list_price, true),
        SortOrder::BedsDesc => nulls_last(&a.bedrooms, &b.bedrooms, true),
        SortOrder::SqftDesc => nulls_last_f64(a.square_feet, b.square_feet, true),
    };
    primary.then_with(|| a.listing_id.cmp(&b.listing_id))
}

fn nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(a),
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn nulls_last_f64(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.total_cmp(&a),
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
