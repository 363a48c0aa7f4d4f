// service.rs
use serde::Serialize;

use super::cache::CacheStatus;
use super::graphql::GraphqlListingsClient;
use super::models::{ListingPage, NormalizedListing};
use super::query::ListingsQuery;
use super::supabase::SupabaseListingsSource;
use super::ListingsError;

/// A place listings can be read from.
pub trait ListingsSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn is_enabled(&self) -> bool;
    fn search(&self, query: &ListingsQuery) -> Result<ListingPage, ListingsError>;
    fn find_by_id(&self, id: &str) -> Result<Option<NormalizedListing>, ListingsError>;

    fn cache_status(&self) -> Option<CacheStatus> {
        None
    }
}

impl GraphqlListingsClient {
    /// Cached collection, falling back to stale data when a refresh fails.
    fn listings_or_stale(
        &self,
    ) -> Result<std::sync::Arc<Vec<NormalizedListing>>, ListingsError> {
        match self.get_all_listings() {
            Ok(listings) => Ok(listings),
            Err(e) => match self.cache().stale() {
                Some(stale) => {
                    tracing::warn!(error = %e, count = stale.len(), "listing refresh failed, serving stale cache");
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }
}

impl ListingsSource for GraphqlListingsClient {
    fn name(&self) -> &'static str {
        "graphql"
    }

    fn is_enabled(&self) -> bool {
        GraphqlListingsClient::is_enabled(self)
    }

    fn search(&self, query: &ListingsQuery) -> Result<ListingPage, ListingsError> {
        let listings = self.listings_or_stale()?;
        Ok(query.apply(&listings))
    }

    fn find_by_id(&self, id: &str) -> Result<Option<NormalizedListing>, ListingsError> {
        let listings = self.listings_or_stale()?;
        Ok(listings.iter().find(|l| l.listing_id == id).cloned())
    }

    fn cache_status(&self) -> Option<CacheStatus> {
        Some(self.cache().status())
    }
}

impl ListingsSource for SupabaseListingsSource {
    fn name(&self) -> &'static str {
        "supabase"
    }

    fn is_enabled(&self) -> bool {
        SupabaseListingsSource::is_enabled(self)
    }

    fn search(&self, query: &ListingsQuery) -> Result<ListingPage, ListingsError> {
        SupabaseListingsSource::search(self, query)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<NormalizedListing>, ListingsError> {
        SupabaseListingsSource::find_by_id(self, id)
    }
}

#[derive(Debug, Serialize)]
pub struct SourceHealth {
    pub name: &'static str,
    pub enabled: bool,
    pub cache: Option<CacheStatus>,
}

/// Chooses between a primary source and an optional fallback.
pub struct ListingsService {
    primary: Box<dyn ListingsSource>,
    fallback: Option<Box<dyn ListingsSource>>,
}

impl ListingsService {
    pub fn new(primary: Box<dyn ListingsSource>, fallback: Option<Box<dyn ListingsSource>>) -> Self {
        Self { primary, fallback }
    }

    pub fn search(&self, query: &ListingsQuery) -> Result<ListingPage, ListingsError> {
        self.with_source(|source| source.search(query))
            .map(|page| page.unwrap_or_else(|| ListingPage::empty(query.page, query.page_size)))
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<NormalizedListing>, ListingsError> {
        self.with_source(|source| source.find_by_id(id))
            .map(Option::flatten)
    }

    /// Runs `op` on the primary when enabled, otherwise (or on error) on the
    /// fallback. `Ok(None)` means no source is enabled.
    fn with_source<T, F>(&self, op: F) -> Result<Option<T>, ListingsError>
    where
        F: Fn(&dyn ListingsSource) -> Result<T, ListingsError>,
    {
        let fallback = self.fallback.as_deref().filter(|f| f.is_enabled());

        if self.primary.is_enabled() {
            match op(self.primary.as_ref()) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => match fallback {
                    Some(fb) => {
                        tracing::warn!(
                            primary = self.primary.name(),
                            fallback = fb.name(),
                            error = %e,
                            "primary listings source failed, using fallback"
                        );
                    }
                    None => return Err(e),
                },
            }
        }

        match fallback {
            Some(fb) => op(fb).map(Some),
            None => {
                tracing::debug!("no listings source enabled");
                Ok(None)
            }
        }
    }

    pub fn health(&self) -> (SourceHealth, Option<SourceHealth>) {
        let describe = |s: &dyn ListingsSource| SourceHealth {
            name: s.name(),
            enabled: s.is_enabled(),
            cache: s.cache_status(),
        };
        (
            describe(self.primary.as_ref()),
            self.fallback.as_deref().map(|s| describe(s)),
        )
    }
}
