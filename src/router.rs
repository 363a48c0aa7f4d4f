use crate::errors::ServerError;
use crate::listings::{ListingsQuery, ListingsService};
use crate::responses::{json_response, ResultResp};
use astra::Request;
use percent_encoding::percent_decode_str;
use serde_json::json;
use std::collections::HashMap;

pub fn handle(req: Request, listings: &ListingsService) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path();

    tracing::debug!(method, path, "request");

    match (method, path) {
        ("GET", "/health") => health(listings),

        ("GET", "/api/listings") | ("GET", "/api/listings/") => {
            let params = parse_query(&req);
            let query = ListingsQuery::from_params(&params).map_err(ServerError::BadRequest)?;
            let page = listings.search(&query)?;
            json_response(&page)
        }

        ("GET", p) if p.starts_with("/api/listings/") => {
            let raw_id = p.trim_start_matches("/api/listings/");
            if raw_id.is_empty() || raw_id.contains('/') {
                return Err(ServerError::NotFound);
            }
            let id = percent_decode_str(raw_id)
                .decode_utf8()
                .map_err(|_| ServerError::BadRequest(format!("invalid listing id '{raw_id}'")))?;
            match listings.find_by_id(&id)? {
                Some(listing) => json_response(&listing),
                None => Err(ServerError::NotFound),
            }
        }

        _ => Err(ServerError::NotFound),
    }
}

fn health(listings: &ListingsService) -> ResultResp {
    let (primary, fallback) = listings.health();
    let status = if primary.enabled || fallback.as_ref().is_some_and(|f| f.enabled) {
        "ok"
    } else {
        "no_source"
    };

    // The GraphQL source is the only cached one, whichever slot it sits in.
    let cache = primary
        .cache
        .clone()
        .or_else(|| fallback.as_ref().and_then(|f| f.cache.clone()));

    json_response(&json!({
        "status": status,
        "primary": primary,
        "fallback": fallback,
        "cache": cache,
    }))
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}
