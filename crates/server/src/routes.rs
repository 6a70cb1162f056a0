use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Json, Router,
};
use configs::StorageConfig;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::{Health, CONTACTS_BANNER};
use service::contact::{repository::ContactRepository, ContactService};
use service::storage::FileStore;

use crate::openapi::ApiDoc;

pub mod contacts;
pub mod form;

pub type DynContactService = ContactService<dyn ContactRepository, dyn FileStore>;

#[derive(Clone)]
pub struct ServerState {
    pub contacts: Arc<DynContactService>,
}

impl ServerState {
    pub fn new(repo: Arc<dyn ContactRepository>, files: Arc<dyn FileStore>) -> Self {
        Self { contacts: Arc::new(ContactService::new(repo, files)) }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn banner() -> &'static str {
    CONTACTS_BANNER
}

/// Build the full application router: contact API, docs, health and static files.
pub fn build_router(state: ServerState, cors: CorsLayer, storage: &StorageConfig) -> Router {
    let api = Router::new()
        .route("/api/contacts", get(banner))
        .route("/api/contacts/", get(banner))
        .route("/api/contacts/get/all", get(contacts::list))
        .route("/api/contacts/get/:id", get(contacts::get))
        .route("/api/contacts/create", post(contacts::create))
        .route("/api/contacts/update/:id", put(contacts::update))
        .route("/api/contacts/delete/:id", delete(contacts::delete))
        .layer(DefaultBodyLimit::max(storage.max_upload_bytes));

    // uploads live under the public dir, so images are served from there as well
    let static_files = ServeDir::new(&storage.public_dir);

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback_service(static_files)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
