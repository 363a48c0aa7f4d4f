// graphql.rs
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::cache::{Clock, ListingsCache, SystemClock, DEFAULT_TTL};
use super::models::{NormalizedListing, RawListing, RAW_LISTING_FIELDS};
use super::normalize::normalize;
use super::ListingsError;

const USER_AGENT: &str = concat!("listings_feed/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_PAGE_LIMIT: u32 = 1000;

/// Hard stop for the pagination loop against an upstream that never stops
/// handing out tokens.
pub const MAX_PAGES: usize = 500;

#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: Value,
}

impl GraphqlRequest {
    pub fn list_listings(limit: u32, next_token: Option<&str>) -> Self {
        Self {
            query: list_listings_query(),
            variables: json!({ "limit": limit, "nextToken": next_token }),
        }
    }

    pub fn next_token(&self) -> Option<&str> {
        self.variables.get("nextToken").and_then(Value::as_str)
    }
}

fn list_listings_query() -> String {
    format!(
        "query ListListings($limit: Int, $nextToken: String) {{ \
         listListings(limit: $limit, nextToken: $nextToken) {{ \
         items {{ {} }} nextToken }} }}",
        RAW_LISTING_FIELDS.join(" ")
    )
}

/// Sends one GraphQL request and returns the decoded JSON body.
///
/// Implementations report non-2xx statuses as `ListingsError::Http`;
/// GraphQL-level `errors` are inspected by the client.
pub trait GraphqlTransport: Send + Sync {
    fn execute(&self, request: &GraphqlRequest) -> Result<Value, ListingsError>;
}

pub struct HttpGraphqlTransport {
    client: Client,
    url: String,
    api_key: String,
}

impl HttpGraphqlTransport {
    pub fn new(url: String, api_key: String) -> Result<Self, ListingsError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ListingsError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url,
            api_key,
        })
    }
}

impl GraphqlTransport for HttpGraphqlTransport {
    fn execute(&self, request: &GraphqlRequest) -> Result<Value, ListingsError> {
        let resp = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .map_err(|e| ListingsError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| ListingsError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ListingsError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| ListingsError::JsonParse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ListListingsData>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorItem>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorItem {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListListingsData {
    list_listings: Option<ListingConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingConnection {
    #[serde(default)]
    items: Option<Vec<Value>>,
    next_token: Option<String>,
}

/// Result of one complete paginated fetch.
#[derive(Debug)]
pub struct FetchOutcome {
    pub listings: Vec<NormalizedListing>,
    pub pages_fetched: usize,
    /// The page ceiling was hit while the upstream still had a token.
    pub truncated: bool,
}

/// Alternative listings source backed by the AppSync `listListings` query.
///
/// The whole collection is fetched, normalized and cached; callers filter
/// the cached array in memory.
pub struct GraphqlListingsClient {
    transport: Option<Box<dyn GraphqlTransport>>,
    page_limit: u32,
    cache: ListingsCache,
}

impl GraphqlListingsClient {
    pub fn new(transport: Box<dyn GraphqlTransport>, page_limit: u32, cache: ListingsCache) -> Self {
        Self {
            transport: Some(transport),
            page_limit: page_limit.max(1),
            cache,
        }
    }

    /// A client with no upstream. Always yields an empty collection.
    pub fn disabled() -> Self {
        Self {
            transport: None,
            page_limit: DEFAULT_PAGE_LIMIT,
            cache: ListingsCache::new(DEFAULT_TTL, Arc::new(SystemClock)),
        }
    }

    /// Builds the HTTP-backed client, or a disabled one when URL or key is missing.
    pub fn from_settings(
        url: Option<String>,
        api_key: Option<String>,
        page_limit: u32,
        ttl: Duration,
    ) -> Result<Self, ListingsError> {
        match (url, api_key) {
            (Some(url), Some(api_key)) => {
                tracing::info!(url = %url, page_limit, "GraphQL listings source enabled");
                let transport = HttpGraphqlTransport::new(url, api_key)?;
                let cache = ListingsCache::new(ttl, Arc::new(SystemClock) as Arc<dyn Clock>);
                Ok(Self::new(Box::new(transport), page_limit, cache))
            }
            _ => {
                tracing::warn!("GraphQL listings URL or API key not set, source disabled");
                Ok(Self::disabled())
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    pub fn cache(&self) -> &ListingsCache {
        &self.cache
    }

    /// Full normalized collection, from cache when fresh.
    ///
    /// Refresh failures propagate; the previous cache entry is kept.
    pub fn get_all_listings(&self) -> Result<Arc<Vec<NormalizedListing>>, ListingsError> {
        let Some(transport) = self.transport.as_deref() else {
            return Ok(Arc::new(Vec::new()));
        };

        self.cache
            .get_or_refresh(|| fetch_all_listings(transport, self.page_limit))
    }
}

/// Walks every page of `listListings`, serially, following `nextToken`.
pub fn fetch_all_listings(
    transport: &dyn GraphqlTransport,
    page_limit: u32,
) -> Result<FetchOutcome, ListingsError> {
    let mut listings = Vec::new();
    let mut next_token: Option<String> = None;
    let mut pages_fetched = 0;
    let mut skipped = 0;
    let mut truncated = false;

    loop {
        let request = GraphqlRequest::list_listings(page_limit, next_token.as_deref());
        let body = transport.execute(&request)?;
        let connection = parse_page(body)?;
        pages_fetched += 1;

        let items = connection.items.unwrap_or_default();
        tracing::debug!(page = pages_fetched, items = items.len(), "fetched listings page");

        for item in items {
            match serde_json::from_value::<RawListing>(item) {
                Ok(raw) if raw.listing_id.is_some() => listings.push(normalize(&raw)),
                _ => skipped += 1,
            }
        }

        next_token = connection.next_token.filter(|t| !t.is_empty());
        if next_token.is_none() {
            break;
        }

        if pages_fetched >= MAX_PAGES {
            tracing::warn!(
                pages = pages_fetched,
                listings = listings.len(),
                "listing pagination hit the page ceiling, result truncated"
            );
            truncated = true;
            break;
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "skipped listing items without a ListingId");
    }

    tracing::info!(
        pages = pages_fetched,
        listings = listings.len(),
        "fetched all listings"
    );

    Ok(FetchOutcome {
        listings,
        pages_fetched,
        truncated,
    })
}

fn parse_page(body: Value) -> Result<ListingConnection, ListingsError> {
    let response: GraphqlResponse =
        serde_json::from_value(body).map_err(|e| ListingsError::JsonParse(e.to_string()))?;

    if let Some(errors) = response.errors.filter(|errs| !errs.is_empty()) {
        return Err(ListingsError::Graphql(
            errors.into_iter().map(|e| e.message).collect(),
        ));
    }

    response
        .data
        .and_then(|data| data.list_listings)
        .ok_or_else(|| ListingsError::UnexpectedShape("data.listListings missing".to_string()))
}
