//! JSON REST API for the relief workflow.
//!
//! Exposes an axum [`Router`] backed by a [`ReliefService`] over any
//! [`relief_core::store::ReliefStore`]. Callers are identified by headers set
//! by an upstream gateway (see [`identity`]); TLS and authentication proper
//! are the deployment's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", relief_api::api_router(service.clone()))
//! ```

pub mod error;
pub mod extract;
pub mod identity;
pub mod policies;
pub mod requests;
pub mod stats;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use relief_core::{ReliefService, store::ReliefStore};

pub use error::ApiError;
pub use identity::Caller;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: Arc<ReliefService<S>>) -> Router<()>
where
  S: ReliefStore + 'static,
{
  Router::new()
    // Relief requests
    .route("/relief-requests", get(requests::list::<S>).post(requests::create::<S>))
    .route(
      "/relief-requests/{id}",
      get(requests::get_one::<S>).delete(requests::delete_one::<S>),
    )
    .route("/relief-requests/{id}/status", post(requests::update_status::<S>))
    .route("/relief-requests/{id}/volunteer", post(requests::assign_volunteer::<S>))
    // Dashboard
    .route("/stats/districts", get(stats::districts::<S>))
    // Policies
    .route("/policies/evaluate", post(policies::evaluate::<S>))
    .route("/policies", get(policies::list::<S>).post(policies::create::<S>))
    .route(
      "/policies/{name}",
      get(policies::get_one::<S>)
        .put(policies::update::<S>)
        .delete(policies::delete_one::<S>),
    )
    .with_state(service)
}
