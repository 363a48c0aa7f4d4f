// supabase.rs
//
// Relational listings source: a PostgREST view whose rows already use the
// canonical snake_case column names.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_RANGE;
use url::Url;

use super::models::{ListingPage, NormalizedListing};
use super::query::{ListingsQuery, SortOrder};
use super::ListingsError;

const USER_AGENT: &str = concat!("listings_feed/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_VIEW: &str = "listings_view";

struct SupabaseConn {
    client: Client,
    base_url: String,
    anon_key: String,
    view: String,
}

pub struct SupabaseListingsSource {
    conn: Option<SupabaseConn>,
}

impl SupabaseListingsSource {
    /// Disabled (empty results) when URL or key is missing.
    pub fn from_settings(
        base_url: Option<String>,
        anon_key: Option<String>,
        view: String,
    ) -> Result<Self, ListingsError> {
        let (Some(base_url), Some(anon_key)) = (base_url, anon_key) else {
            tracing::warn!("SUPABASE_URL or SUPABASE_ANON_KEY not set, source disabled");
            return Ok(Self::disabled());
        };

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ListingsError::Network(e.to_string()))?;

        tracing::info!(url = %base_url, view = %view, "Supabase listings source enabled");

        Ok(Self {
            conn: Some(SupabaseConn {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
                anon_key,
                view,
            }),
        })
    }

    pub fn disabled() -> Self {
        Self { conn: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.conn.is_some()
    }

    pub fn search(&self, query: &ListingsQuery) -> Result<ListingPage, ListingsError> {
        let Some(conn) = &self.conn else {
            return Ok(ListingPage::empty(query.page, query.page_size));
        };

        let (rows, content_range) = conn.fetch_rows(&search_params(query))?;
        let total = content_range
            .as_deref()
            .and_then(parse_content_range)
            .unwrap_or(query.offset().saturating_add(rows.len()));

        Ok(ListingPage {
            items: rows,
            total,
            page: query.page,
            page_size: query.page_size,
            total_pages: total.div_ceil(query.page_size),
        })
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<NormalizedListing>, ListingsError> {
        let Some(conn) = &self.conn else {
            return Ok(None);
        };

        let params = vec![
            ("select".to_string(), "*".to_string()),
            ("listing_id".to_string(), format!("eq.{id}")),
            ("limit".to_string(), "1".to_string()),
        ];
        let (rows, _) = conn.fetch_rows(&params)?;
        Ok(rows.into_iter().next())
    }
}

impl SupabaseConn {
    fn fetch_rows(
        &self,
        params: &[(String, String)],
    ) -> Result<(Vec<NormalizedListing>, Option<String>), ListingsError> {
        let url = Url::parse_with_params(
            &format!("{}/rest/v1/{}", self.base_url, self.view),
            params,
        )
        .map_err(|e| ListingsError::Network(format!("invalid Supabase URL: {e}")))?;

        tracing::debug!(url = %url, "querying Supabase listings view");

        let resp = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .header("Prefer", "count=exact")
            .send()
            .map_err(|e| ListingsError::Network(e.to_string()))?;

        let status = resp.status();
        let content_range = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let text = resp
            .text()
            .map_err(|e| ListingsError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ListingsError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok((parse_rows(&text)?, content_range))
    }
}

/// Decodes view rows, backfilling `id`/status and dropping rows with no identity.
pub fn parse_rows(body: &str) -> Result<Vec<NormalizedListing>, ListingsError> {
    let rows: Vec<NormalizedListing> =
        serde_json::from_str(body).map_err(|e| ListingsError::JsonParse(e.to_string()))?;

    let before = rows.len();
    let rows: Vec<_> = rows
        .into_iter()
        .filter_map(|mut row| row.ensure_identity().then_some(row))
        .collect();

    if rows.len() < before {
        tracing::warn!(dropped = before - rows.len(), "dropped view rows without listing_id");
    }
    Ok(rows)
}

/// PostgREST filter, order and range parameters for a search.
pub fn search_params(query: &ListingsQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    let mut push = |key: &str, value: String| params.push((key.to_string(), value));

    if let Some(city) = &query.city {
        push("city", format!("ilike.{}", sanitize(city)));
    }
    if let Some(status) = &query.status {
        push("status", format!("ilike.{}", sanitize(status)));
    }
    if let Some(min) = query.min_price {
        push("list_price", format!("gte.{min}"));
    }
    if let Some(max) = query.max_price {
        push("list_price", format!("lte.{max}"));
    }
    if let Some(min) = query.min_beds {
        push("bedrooms", format!("gte.{min}"));
    }
    if let Some(min) = query.min_baths {
        push("bathrooms_total", format!("gte.{min}"));
    }
    if let Some(search) = &query.search {
        let term = sanitize(search);
        push(
            "or",
            format!(
                "(address.ilike.*{term}*,city.ilike.*{term}*,subdivision_name.ilike.*{term}*,zip_code.ilike.*{term}*)"
            ),
        );
    }

    push("order", order_clause(query.sort).to_string());
    push("limit", query.page_size.to_string());
    push("offset", query.offset().to_string());
    params
}

fn order_clause(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Newest => "listing_date.desc.nullslast,listing_id.asc",
        SortOrder::Oldest => "listing_date.asc.nullslast,listing_id.asc",
        SortOrder::PriceAsc => "list_price.asc.nullslast,listing_id.asc",
        SortOrder::PriceDesc => "list_price.desc.nullslast,listing_id.asc",
        SortOrder::BedsDesc => "bedrooms.desc.nullslast,listing_id.asc",
        SortOrder::SqftDesc => "square_feet.desc.nullslast,listing_id.asc",
    }
}

// PostgREST reserves these inside filter values.
fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '%'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Total row count from a `Content-Range` header such as `0-23/512`.
pub fn parse_content_range(header: &str) -> Option<usize> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
        params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn builds_filters_order_and_range() {
        let query = ListingsQuery {
            city: Some("Aspen".into()),
            min_price: Some(500000.0),
            max_price: Some(1500000.0),
            min_beds: Some(3),
            sort: SortOrder::PriceAsc,
            page: 3,
            page_size: 20,
            ..Default::default()
        };
        let params = search_params(&query);

        assert_eq!(value_of(&params, "city"), vec!["ilike.Aspen"]);
        assert_eq!(
            value_of(&params, "list_price"),
            vec!["gte.500000", "lte.1500000"]
        );
        assert_eq!(value_of(&params, "bedrooms"), vec!["gte.3"]);
        assert_eq!(
            value_of(&params, "order"),
            vec!["list_price.asc.nullslast,listing_id.asc"]
        );
        assert_eq!(value_of(&params, "limit"), vec!["20"]);
        assert_eq!(value_of(&params, "offset"), vec!["40"]);
        assert!(value_of(&params, "status").is_empty());
    }

    #[test]
    fn search_term_is_sanitized() {
        let query = ListingsQuery {
            search: Some("Red (Mountain), *".into()),
            ..Default::default()
        };
        let params = search_params(&query);
        let or = value_of(&params, "or");
        assert_eq!(or.len(), 1);
        assert!(or[0].starts_with("(address.ilike.*Red Mountain*,"));
    }

    #[test]
    fn content_range_total() {
        assert_eq!(parse_content_range("0-23/512"), Some(512));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-23/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn rows_backfill_identity_and_decode_media() {
        let body = r#"[
            {"listing_id": "R1", "status": "Active", "city": "Aspen",
             "list_price": "815000", "media": "[\"https://cdn.example.com/r1.jpg\"]",
             "cooling": ["Central Air"]},
            {"listing_id": "R2", "status": null, "heating": "{oops"},
            {"status": "Active"}
        ]"#;

        let rows = parse_rows(body).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].id, "R1");
        assert_eq!(rows[0].list_price, Some(815000.0));
        assert_eq!(
            rows[0].media,
            Some(vec!["https://cdn.example.com/r1.jpg".to_string()])
        );
        assert_eq!(rows[0].cooling, Some(vec!["Central Air".to_string()]));

        assert_eq!(rows[1].id, "R2");
        assert_eq!(rows[1].status, "Unknown");
        assert_eq!(rows[1].heating, None);
    }

    #[test]
    fn disabled_source_returns_empty_page() {
        let source = SupabaseListingsSource::from_settings(None, None, DEFAULT_VIEW.into()).unwrap();
        assert!(!source.is_enabled());

        let page = source.search(&ListingsQuery::default()).unwrap();
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
        assert!(source.find_by_id("R1").unwrap().is_none());
    }
}
