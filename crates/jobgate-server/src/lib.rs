//! HTTP surface for jobgate.
//!
//! Exposes an axum [`Router`] backed by any [`MarketStore`]. Organization
//! requests authenticate with the `token` header; individual requests with
//! the identity provider's bearer assertion.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;
pub mod upload;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{delete, get, post, put},
};
use jobgate_core::store::MarketStore;
use tower_http::{services::ServeDir, trace::TraceLayer};

use handlers::{applications, individuals, openings, organizations, webhooks};

/// Uploads (logos, résumés) are capped at this many bytes per request.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Build the application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: MarketStore + 'static,
{
  let uploads = ServeDir::new(state.assets.root());

  Router::new()
    // Organizations
    .route("/register", post(organizations::register::<S>))
    .route("/login", post(organizations::login::<S>))
    .route(
      "/company",
      get(organizations::get_company).put(organizations::update_company::<S>),
    )
    // Openings
    .route("/openings", post(openings::create::<S>))
    .route("/openings/{id}", delete(openings::delete::<S>))
    .route("/openings/{id}/visibility", put(openings::set_visibility::<S>))
    .route("/openings/{id}/apply", post(applications::apply::<S>))
    // Applications
    .route("/applications/{id}/status", put(applications::set_status::<S>))
    // Individuals
    .route("/individuals/me", get(individuals::me))
    .route("/individuals/{id}/resume", put(individuals::update_resume::<S>))
    // Provider push
    .route("/webhooks", post(webhooks::receive::<S>))
    .nest_service("/uploads", uploads)
    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
