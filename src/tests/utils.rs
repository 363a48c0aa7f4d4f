// src/tests/utils.rs

use astra::{Body, Request};
use http::Method;
use crate::listings::{
    GraphqlListingsClient, GraphqlRequest, GraphqlTransport, ListingsCache, ListingsError,
    ManualClock, DEFAULT_TTL,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Responder = dyn Fn(usize, &GraphqlRequest) -> Result<Value, ListingsError> + Send + Sync;

/// Scripted GraphQL transport. The responder gets the zero-based call number
/// and the request; every request's `nextToken` is recorded.
#[derive(Clone)]
pub struct MockTransport {
    responder: Arc<Responder>,
    calls: Arc<AtomicUsize>,
    tokens: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(usize, &GraphqlRequest) -> Result<Value, ListingsError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            calls: Arc::new(AtomicUsize::new(0)),
            tokens: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Serves the given pages in order, repeating the sequence on every refresh.
    pub fn paged(pages: Vec<Value>) -> Self {
        Self::new(move |call, _| Ok(pages[call % pages.len()].clone()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn tokens(&self) -> Vec<Option<String>> {
        self.tokens.lock().unwrap().clone()
    }
}

impl GraphqlTransport for MockTransport {
    fn execute(&self, request: &GraphqlRequest) -> Result<Value, ListingsError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .lock()
            .unwrap()
            .push(request.next_token().map(str::to_string));
        (self.responder)(call, request)
    }
}

/// A raw AppSync item with just enough fields to filter on.
pub fn raw_item(id: &str, city: &str, price: u64) -> Value {
    json!({
        "ListingId": id,
        "MlsStatus": "Active",
        "ListPrice": price,
        "City": city,
        "StateOrProvince": "CO",
        "BedroomsTotal": 3,
        "ListingContractDate": "2024-04-01",
        "Media": "[\"https://cdn.example.com/photo.jpg\"]"
    })
}

/// One `listListings` response body.
pub fn page(items: Vec<Value>, next_token: Option<&str>) -> Value {
    json!({
        "data": {
            "listListings": {
                "items": items,
                "nextToken": next_token
            }
        }
    })
}

pub fn client_with(
    transport: &MockTransport,
    clock: &Arc<ManualClock>,
) -> GraphqlListingsClient {
    let cache = ListingsCache::new(DEFAULT_TTL, clock.clone());
    GraphqlListingsClient::new(Box::new(transport.clone()), 1000, cache)
}

pub fn ids(listings: &[crate::listings::NormalizedListing]) -> Vec<String> {
    listings.iter().map(|l| l.listing_id.clone()).collect()
}

/// Bodyless GET for `path`, which may carry a query string.
pub fn get(path: &str) -> Request {
    let mut req = Request::new(Body::empty());
    *req.method_mut() = Method::GET;
    *req.uri_mut() = path.parse().unwrap();
    req
}
