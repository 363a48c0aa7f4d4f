// config.rs
use std::net::SocketAddr;
use std::time::Duration;

use crate::listings::{DEFAULT_PAGE_LIMIT, DEFAULT_TTL, DEFAULT_VIEW};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Supabase,
    Graphql,
}

/// Runtime settings, read from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_env: String,
    pub log_level: String,
    pub bind_addr: SocketAddr,
    pub max_workers: usize,

    pub primary_source: SourceKind,

    pub graphql_url: Option<String>,
    pub graphql_api_key: Option<String>,
    pub graphql_page_limit: u32,
    pub cache_ttl: Duration,

    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub supabase_view: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset;
    /// malformed numbers fall back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let primary_source = match get("LISTINGS_SOURCE").as_deref() {
            Some(raw) if raw.eq_ignore_ascii_case("graphql") => SourceKind::Graphql,
            Some(raw) if raw.eq_ignore_ascii_case("supabase") => SourceKind::Supabase,
            Some(raw) => {
                tracing::warn!(value = raw, "unknown LISTINGS_SOURCE, using supabase");
                SourceKind::Supabase
            }
            None => SourceKind::Supabase,
        };

        Self {
            app_env: get("APP_ENV").unwrap_or_else(|| "development".to_string()),
            log_level: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            bind_addr: parse_or(get("BIND_ADDR"), "BIND_ADDR", default_bind_addr()),
            max_workers: parse_or(get("MAX_WORKERS"), "MAX_WORKERS", 8),

            primary_source,

            graphql_url: get("LISTINGS_GRAPHQL_URL"),
            graphql_api_key: get("LISTINGS_GRAPHQL_API_KEY"),
            graphql_page_limit: parse_or(
                get("LISTINGS_GRAPHQL_PAGE_LIMIT"),
                "LISTINGS_GRAPHQL_PAGE_LIMIT",
                DEFAULT_PAGE_LIMIT,
            ),
            cache_ttl: get("LISTINGS_CACHE_TTL_SECS")
                .map(|raw| Duration::from_secs(parse_or(Some(raw), "LISTINGS_CACHE_TTL_SECS", DEFAULT_TTL.as_secs())))
                .unwrap_or(DEFAULT_TTL),

            supabase_url: get("SUPABASE_URL"),
            supabase_anon_key: get("SUPABASE_ANON_KEY"),
            supabase_view: get("SUPABASE_LISTINGS_VIEW").unwrap_or_else(|| DEFAULT_VIEW.to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "invalid setting, using default");
            default
        }),
        None => default,
    }
}
