mod cache;
mod filters;
mod graphql;
mod lenient;
mod listings_error;
mod models;
mod normalize;
mod query;
mod service;
mod supabase;

pub use cache::DEFAULT_TTL;
pub use graphql::{GraphqlListingsClient, DEFAULT_PAGE_LIMIT};
pub use listings_error::ListingsError;
pub use query::ListingsQuery;
pub use service::{ListingsService, ListingsSource};
pub use supabase::{SupabaseListingsSource, DEFAULT_VIEW};

#[cfg(test)]
pub use cache::{test_clock::ManualClock, ListingsCache};
#[cfg(test)]
pub use graphql::{GraphqlRequest, GraphqlTransport, MAX_PAGES};
#[cfg(test)]
pub use models::NormalizedListing;
