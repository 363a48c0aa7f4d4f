// src/tests/router_tests/health_tests.rs

use crate::handle;
use crate::listings::{GraphqlListingsClient, ListingsService, ManualClock, SupabaseListingsSource};
use crate::tests::utils::{client_with, get, page, raw_item, MockTransport};
use serde_json::Value;
use std::io::Read;
use std::sync::Arc;

fn health_body(service: &ListingsService) -> Value {
    let mut resp = handle(get("/health"), service).unwrap();
    assert_eq!(resp.status(), 200);

    let mut body_bytes = Vec::new();
    resp.body_mut()
        .reader()
        .read_to_end(&mut body_bytes)
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[test]
fn health_reports_sources_and_cache() {
    let transport = MockTransport::paged(vec![page(vec![raw_item("1", "Aspen", 1)], None)]);
    let clock = Arc::new(ManualClock::new());
    let service = ListingsService::new(
        Box::new(client_with(&transport, &clock)),
        Some(Box::new(SupabaseListingsSource::disabled())),
    );

    let before = health_body(&service);
    assert_eq!(before["status"], "ok");
    assert_eq!(before["primary"]["name"], "graphql");
    assert_eq!(before["primary"]["cache"]["populated"], false);
    assert_eq!(before["fallback"]["name"], "supabase");
    assert_eq!(before["fallback"]["enabled"], false);
    assert!(before["fallback"]["cache"].is_null());
    assert_eq!(before["cache"]["populated"], false);

    handle(get("/api/listings"), &service).unwrap();

    let after = health_body(&service);
    assert_eq!(after["primary"]["cache"]["populated"], true);
    assert_eq!(after["primary"]["cache"]["listings"], 1);
    assert_eq!(after["primary"]["cache"]["truncated"], false);
    assert_eq!(after["cache"], after["primary"]["cache"]);
}

#[test]
fn health_cache_comes_from_the_graphql_fallback() {
    let transport = MockTransport::paged(vec![page(vec![raw_item("1", "Aspen", 1)], None)]);
    let clock = Arc::new(ManualClock::new());
    let service = ListingsService::new(
        Box::new(SupabaseListingsSource::disabled()),
        Some(Box::new(client_with(&transport, &clock))),
    );

    handle(get("/api/listings"), &service).unwrap();

    let body = health_body(&service);
    assert!(body["primary"]["cache"].is_null());
    assert_eq!(body["cache"]["populated"], true);
    assert_eq!(body["cache"]["listings"], 1);
}

#[test]
fn health_without_sources() {
    let service = ListingsService::new(
        Box::new(SupabaseListingsSource::disabled()),
        Some(Box::new(GraphqlListingsClient::disabled())),
    );

    let body = health_body(&service);
    assert_eq!(body["status"], "no_source");
    assert_eq!(body["cache"]["populated"], false);

    // Still answers listing requests, with nothing in them
    let resp = handle(get("/api/listings"), &service).unwrap();
    assert_eq!(resp.status(), 200);
}
