//! HTTP server wiring for the relief workflow.
//!
//! Mounts the [`relief_api`] router under `/api`, adds request tracing, and
//! prepares the [`ReliefService`] from a [`ServerConfig`].

pub mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use axum::Router;
use relief_core::{ReliefService, policy, store::ReliefStore};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Wrap `store` in a service configured by `config`, seeding the default
/// policies when asked to.
pub async fn service<S>(
  store: S,
  config: &ServerConfig,
) -> relief_core::Result<Arc<ReliefService<S>>>
where
  S: ReliefStore,
{
  let service = ReliefService::new(Arc::new(store)).with_retry(config.retry);
  if config.seed_default_policies {
    let added = service.bootstrap_policies(policy::default_policies()).await?;
    info!(added, "default policies seeded");
  }
  Ok(Arc::new(service))
}

/// Build the full application router.
pub fn router<S>(service: Arc<ReliefService<S>>) -> Router
where
  S: ReliefStore + 'static,
{
  Router::new()
    .nest("/api", relief_api::api_router(service))
    .layer(TraceLayer::new_for_http())
}
