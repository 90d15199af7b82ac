pub mod routes;
pub mod models;
pub mod errors;
pub mod auth;
pub mod scope;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::db::Database;
use crate::drafts::{Autosaver, DraftStore};
use crate::errors::RoofdeskError;
use crate::geocoding::{AddressLookup, Geocoder, NominatimGeocoder};
use crate::notifications::Notifier;
use crate::storage::{LocalObjectStore, ObjectStore};

/// Environment variable that overrides `server.api_token`.
pub const API_TOKEN_ENV: &str = "ROOFDESK_API_TOKEN";

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub drafts: DraftStore,
    pub autosavers: Arc<DashMap<String, Arc<Autosaver>>>,
    pub lookups: Arc<DashMap<String, Arc<AddressLookup>>>,
    pub objects: Arc<dyn ObjectStore>,
    pub geocoder: Arc<dyn Geocoder>,
    pub notifier: Notifier,
    pub api_token: Option<String>,
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire state from already-built collaborators.
    pub fn new(
        config: AppConfig,
        db: Database,
        objects: Arc<dyn ObjectStore>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        let api_token = std::env::var(API_TOKEN_ENV)
            .ok()
            .or_else(|| config.server.api_token.clone())
            .filter(|t| !t.is_empty());
        let drafts = DraftStore::new(config.drafts.directory.clone(), config.drafts.ttl());
        let notifier = Notifier::new(db.clone(), config.notifications.clone());

        Self {
            db,
            drafts,
            autosavers: Arc::new(DashMap::new()),
            lookups: Arc::new(DashMap::new()),
            objects,
            geocoder,
            notifier,
            api_token,
            shutdown: CancellationToken::new(),
            config: Arc::new(config),
        }
    }

    /// The caller's autosave controller, created on first use.
    pub fn autosaver_for(&self, user_id: &str) -> Arc<Autosaver> {
        self.autosavers
            .entry(user_id.to_string())
            .or_insert_with(|| {
                Arc::new(Autosaver::new(
                    Arc::new(self.drafts.clone()),
                    self.config.drafts.debounce(),
                    &self.shutdown,
                ))
            })
            .clone()
    }

    /// Drop the caller's autosave controller once nothing of it can still
    /// reach the draft store.
    pub async fn release_autosaver(&self, user_id: &str) {
        let removed = self.autosavers.remove(user_id);
        if let Some((_, autosaver)) = removed {
            autosaver.settle().await;
        }
    }

    /// The caller's address-suggestion state, created on first use.
    pub fn lookup_for(&self, user_id: &str) -> Arc<AddressLookup> {
        let geocoding = &self.config.geocoding;
        self.lookups
            .entry(user_id.to_string())
            .or_insert_with(|| {
                Arc::new(AddressLookup::new(
                    self.geocoder.clone(),
                    geocoding.debounce(),
                    geocoding.min_query_len,
                    geocoding.limit,
                ))
            })
            .clone()
    }

    /// Forget `lookup` for `user_id` unless another request is still using it.
    pub fn release_lookup(&self, user_id: &str, lookup: &Arc<AddressLookup>) {
        // The map and the caller hold the only references when idle
        self.lookups
            .remove_if(user_id, |_, held| Arc::ptr_eq(held, lookup) && Arc::strong_count(held) == 2);
    }

    /// Cancel pending autosaves and timers.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        for entry in self.autosavers.iter() {
            entry.value().shutdown();
        }
        info!(autosavers = self.autosavers.len(), "Draft autosave stopped");
    }
}

pub async fn create_app_state(config: AppConfig) -> Result<AppState, RoofdeskError> {
    let db_path = config.database.path.to_string_lossy().to_string();
    let db = Database::new(&db_path)?;

    tokio::fs::create_dir_all(&config.drafts.directory).await?;
    tokio::fs::create_dir_all(&config.storage.root).await?;

    let objects: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(config.storage.root.clone()));
    let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimGeocoder::new(&config.geocoding)?);

    let state = AppState::new(config, db, objects, geocoder);
    if state.api_token.is_none() {
        warn!("No API token configured; the API is unauthenticated");
    }
    Ok(state)
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.storage.max_upload_bytes;

    let protected = Router::new()
        .route("/api/branch", get(routes::branch::get_branch).put(routes::branch::update_branch))
        .route("/api/customers", get(routes::customers::list_customers).post(routes::customers::create_customer))
        .route("/api/customers/:id", get(routes::customers::get_customer).put(routes::customers::update_customer))
        .route("/api/buildings", get(routes::buildings::list_buildings).post(routes::buildings::create_building))
        .route("/api/buildings/:id", get(routes::buildings::get_building))
        .route("/api/reports", get(routes::reports::list_reports).post(routes::reports::create_report))
        .route("/api/reports/:id", get(routes::reports::get_report).put(routes::reports::update_report))
        .route("/api/reports/:id/status", put(routes::reports::set_status))
        .route("/api/reports/:id/archive", post(routes::reports::archive_report))
        .route("/api/reports/:id/export", get(routes::reports::export_report))
        .route(
            "/api/reports/:id/issues/:issue_id/images",
            post(routes::uploads::upload_issue_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/reports/:id/snapshot",
            post(routes::uploads::upload_snapshot).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/reports/:id/offer", get(routes::offers::get_offer).post(routes::offers::create_offer))
        .route("/api/offers/:id/respond", post(routes::offers::respond))
        .route(
            "/api/drafts",
            get(routes::drafts::load_draft).put(routes::drafts::save_draft).delete(routes::drafts::discard_draft),
        )
        .route("/api/drafts/flush", post(routes::drafts::flush_draft))
        .route("/api/drafts/submit", post(routes::drafts::submit_draft))
        .route("/api/validation/:step", post(routes::validation::validate))
        .route("/api/geometry/area", post(routes::geometry::measure))
        .route("/api/geocode/search", get(routes::geocode::search))
        .route("/api/geocode/reverse", get(routes::geocode::reverse))
        .route(
            "/api/notifications/preferences",
            get(routes::notifications::get_preferences).put(routes::notifications::update_preferences),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::api_auth_middleware));

    Router::new()
        .route("/api/health", get(routes::health::health_check))
        .merge(protected)
        .layer(cors_layer(&state.config.server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}
