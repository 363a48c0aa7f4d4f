use crate::config::{AppConfig, SourceKind};
use crate::listings::{
    GraphqlListingsClient, ListingsError, ListingsService, ListingsSource, SupabaseListingsSource,
};
use crate::router::handle;
use astra::Server;

mod config;
mod errors;
mod listings;
mod logging;
mod responses;
mod router;

#[cfg(test)]
mod tests;

fn build_service(config: &AppConfig) -> Result<ListingsService, ListingsError> {
    let graphql: Box<dyn ListingsSource> = Box::new(GraphqlListingsClient::from_settings(
        config.graphql_url.clone(),
        config.graphql_api_key.clone(),
        config.graphql_page_limit,
        config.cache_ttl,
    )?);
    let supabase: Box<dyn ListingsSource> = Box::new(SupabaseListingsSource::from_settings(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
        config.supabase_view.clone(),
    )?);

    Ok(match config.primary_source {
        SourceKind::Supabase => ListingsService::new(supabase, Some(graphql)),
        SourceKind::Graphql => ListingsService::new(graphql, Some(supabase)),
    })
}

fn main() {
    let config = AppConfig::from_env();
    logging::init_tracing(&config);

    let service = match build_service(&config) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(error = %e, "listings service initialization failed");
            std::process::exit(1);
        }
    };

    tracing::info!(
        addr = %config.bind_addr,
        primary = ?config.primary_source,
        "starting listings server"
    );

    let server = Server::bind(&config.bind_addr).max_workers(config.max_workers);

    let result = server.serve(move |req, _info| match handle(req, &service) {
        Ok(resp) => resp,
        Err(err) => responses::error_to_response(err),
    });

    if let Err(e) = result {
        tracing::error!(error = %e, "server ended with error");
    }

    tracing::info!("server shut down cleanly");
}
