// src/tests/router_tests/listings_tests.rs

use crate::errors::ServerError;
use crate::handle;
use crate::listings::{ListingsError, ListingsService, ManualClock, SupabaseListingsSource};
use crate::responses::error_to_response;
use crate::tests::utils::{client_with, get, page, raw_item, MockTransport};
use astra::Response;
use http::Method;
use serde_json::Value;
use std::io::Read;
use std::sync::Arc;

/// GraphQL-backed service over a fixed upstream collection
fn make_service(transport: &MockTransport) -> ListingsService {
    let clock = Arc::new(ManualClock::new());
    let client = client_with(transport, &clock);
    ListingsService::new(
        Box::new(client),
        Some(Box::new(SupabaseListingsSource::disabled())),
    )
}

fn fixture() -> MockTransport {
    MockTransport::paged(vec![
        page(
            vec![
                raw_item("AS-1", "Aspen", 2_450_000),
                raw_item("BA-1", "Basalt", 899_000),
            ],
            Some("next"),
        ),
        page(
            vec![
                raw_item("AS-2", "ASPEN", 1_150_000),
                raw_item("SM-1", "Snowmass Village", 3_100_000),
            ],
            None,
        ),
    ])
}

fn body_json(mut resp: Response) -> Value {
    let mut body_bytes = Vec::new();
    resp.body_mut()
        .reader()
        .read_to_end(&mut body_bytes)
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[test]
fn lists_filtered_and_sorted_listings() {
    let transport = fixture();
    let service = make_service(&transport);

    let resp = handle(get("/api/listings?city=aspen&sort=price_asc"), &service).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_json(resp);
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"][0]["listing_id"], "AS-2");
    assert_eq!(body["items"][1]["listing_id"], "AS-1");
    assert_eq!(
        body["items"][0]["media"][0],
        "https://cdn.example.com/photo.jpg"
    );
}

#[test]
fn decodes_query_values() {
    let transport = fixture();
    let service = make_service(&transport);

    let resp = handle(get("/api/listings?city=Snowmass%20Village"), &service).unwrap();
    let body = body_json(resp);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["listing_id"], "SM-1");
}

#[test]
fn repeated_requests_reuse_cached_pages() {
    let transport = fixture();
    let service = make_service(&transport);

    handle(get("/api/listings"), &service).unwrap();
    handle(get("/api/listings?page=2&page_size=1"), &service).unwrap();
    handle(get("/api/listings/AS-1"), &service).unwrap();

    assert_eq!(transport.calls(), 2);
}

#[test]
fn finds_listing_by_id() {
    let transport = fixture();
    let service = make_service(&transport);

    let resp = handle(get("/api/listings/BA-1"), &service).unwrap();
    let body = body_json(resp);
    assert_eq!(body["id"], "BA-1");
    assert_eq!(body["city"], "Basalt");
    assert!(body["sold_price"].is_null());
}

#[test]
fn unknown_listing_is_404() {
    let transport = fixture();
    let service = make_service(&transport);

    let err = handle(get("/api/listings/NOPE-9"), &service).unwrap_err();
    assert!(matches!(err, ServerError::NotFound));
    assert_eq!(error_to_response(err).status(), 404);
}

#[test]
fn bad_parameters_are_400() {
    let transport = fixture();
    let service = make_service(&transport);

    let err = handle(get("/api/listings?min_price=cheap"), &service).unwrap_err();
    assert!(matches!(err, ServerError::BadRequest(_)));

    let resp = error_to_response(err);
    assert_eq!(resp.status(), 400);
    let body = body_json(resp);
    assert!(body["error"].as_str().unwrap().contains("min_price"));

    // Rejected before touching the upstream
    assert_eq!(transport.calls(), 0);
}

#[test]
fn upstream_failure_is_502() {
    let transport = MockTransport::new(|_, _| {
        Err(ListingsError::Http {
            status: 503,
            body: "Service Unavailable".into(),
        })
    });
    let service = make_service(&transport);

    let err = handle(get("/api/listings"), &service).unwrap_err();
    assert!(matches!(err, ServerError::Upstream(_)));
    assert_eq!(error_to_response(err).status(), 502);
}

#[test]
fn unknown_route_is_404() {
    let transport = fixture();
    let service = make_service(&transport);

    let err = handle(get("/listings"), &service).unwrap_err();
    assert!(matches!(err, ServerError::NotFound));

    let mut req = get("/api/listings");
    *req.method_mut() = Method::POST;
    assert!(matches!(handle(req, &service), Err(ServerError::NotFound)));
}

#[test]
fn huge_page_number_is_400_not_a_panic() {
    let transport = fixture();
    let service = make_service(&transport);

    for path in [
        "/api/listings?page=18446744073709551615",
        "/api/listings?page=100001&page_size=100",
    ] {
        let err = handle(get(path), &service).unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)), "{path}");
        assert_eq!(error_to_response(err).status(), 400);
    }
    assert_eq!(transport.calls(), 0);

    // The deepest allowed page is simply empty
    let resp = handle(get("/api/listings?page=100000&page_size=100"), &service).unwrap();
    let body = body_json(resp);
    assert_eq!(body["total"], 4);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}

#[test]
fn non_finite_prices_are_400() {
    let transport = fixture();
    let service = make_service(&transport);

    for path in [
        "/api/listings?min_price=NaN",
        "/api/listings?max_price=inf",
        "/api/listings?max_price=-Infinity",
    ] {
        let err = handle(get(path), &service).unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)), "{path}");
    }
    assert_eq!(transport.calls(), 0);
}

#[test]
fn listing_ids_are_percent_decoded() {
    let transport = MockTransport::paged(vec![page(
        vec![raw_item("ABC 123", "Aspen", 1), raw_item("AS/9", "Aspen", 2)],
        None,
    )]);
    let service = make_service(&transport);

    let body = body_json(handle(get("/api/listings/ABC%20123"), &service).unwrap());
    assert_eq!(body["listing_id"], "ABC 123");

    let body = body_json(handle(get("/api/listings/AS%2F9"), &service).unwrap());
    assert_eq!(body["listing_id"], "AS/9");

    let err = handle(get("/api/listings/%FF"), &service).unwrap_err();
    assert!(matches!(err, ServerError::BadRequest(_)));
}
