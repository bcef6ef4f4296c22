//! Public HTTP surface of the site: affiliate cloak redirects, locale pages,
//! robots.txt and the sitemap, plus the admin listener.

pub mod config;
pub mod errors;
pub mod metrics_defs;
mod pages;
mod seo;
mod service;

pub use errors::CloakError;
pub use service::CloakService;

use campaigns::CampaignRegistry;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;

/// Validates `config` against `registry`, then serves the public and admin
/// listeners until either of them fails.
pub async fn run(config: config::Config, registry: Arc<CampaignRegistry>) -> Result<(), CloakError> {
    config.validate(&registry)?;
    tracing::info!(campaigns = registry.len(), "campaign registry loaded");

    let cloak_task = run_http_service(
        &config.listener.host,
        config.listener.port,
        CloakService::new(&config, registry),
    );
    // The registry is fully loaded before either listener binds
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::new(|| true),
    );

    tokio::try_join!(cloak_task, admin_task)?;
    Ok(())
}
