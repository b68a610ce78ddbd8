//! # Collection Ops Backend
//!
//! Backend service for municipal waste-collection field operations:
//! inchargers assign labours to streets and time slots, residents report
//! readiness and confirm pickups, and every allotment is tracked through
//! Pending, PendingAcknowledgment, and Collected.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers, mappers)
//!     ↓
//! Domain Layer (services, lifecycle rules, suitability ranking)
//!     ↓
//! Storage Layer (file-backed repositories)
//! ```

pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::Method,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::domain::{AllotmentService, LabourService, ResidentService};
use crate::storage::csv::{
    AllotmentRepository, CsvConnection, LabourRepository, ResidentRepository,
};

/// Main application state that holds all services.
#[derive(Clone)]
pub struct AppState {
    pub allotment_service: AllotmentService,
    pub labour_service: LabourService,
    pub resident_service: ResidentService,
}

/// Wire the repositories and services over one storage connection.
pub fn build_app_state(connection: CsvConnection) -> AppState {
    let allotments = Arc::new(AllotmentRepository::new(connection.clone()));
    let labours = Arc::new(LabourRepository::new(connection.clone()));
    let residents = Arc::new(ResidentRepository::new(connection));

    AppState {
        allotment_service: AllotmentService::new(allotments, labours.clone()),
        labour_service: LabourService::new(labours),
        resident_service: ResidentService::new(residents),
    }
}

/// Initialize the backend with the default data directory.
pub async fn initialize_backend() -> Result<AppState> {
    info!("Setting up storage");
    let connection = CsvConnection::new_default()?;
    info!("Data directory: {}", connection.base_directory().display());

    info!("Setting up domain services");
    Ok(build_app_state(connection))
}

/// Create the Axum router with all routes configured.
pub fn create_router(app_state: AppState) -> Router {
    // The mobile clients call from app webviews and dev servers alike, so
    // CORS stays permissive.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/allotwork/unallocated/:incharger_id",
            get(io::rest::allotment_apis::list_unallocated),
        )
        .route(
            "/allotWork/allotwork/:incharger_id",
            post(io::rest::allotment_apis::allot_work),
        )
        .route(
            "/allotwork/pending/all",
            get(io::rest::allotment_apis::pending_for_street),
        )
        .route(
            "/allotwork/pending/:labour_id",
            get(io::rest::allotment_apis::pending_for_labour),
        )
        .route(
            "/allotWork/remove/:incharger_id/:labour_id",
            delete(io::rest::allotment_apis::remove_work),
        )
        .route(
            "/allotWork/confirm/:allotment_id",
            put(io::rest::allotment_apis::confirm_collection),
        )
        .route(
            "/allotWork/acknowledge/:user_id",
            put(io::rest::allotment_apis::acknowledge_collection),
        )
        .route(
            "/allotWork/finalize/:allotment_id",
            put(io::rest::allotment_apis::finalize_collection),
        )
        .route(
            "/allotWork/locations/yesCount/:street",
            get(io::rest::location_apis::yes_count),
        )
        .route(
            "/allotWork/allotments/:incharger_id",
            get(io::rest::allotment_apis::allotments_for_incharger),
        )
        .route(
            "/labours/register/:incharger_id",
            post(io::rest::labour_apis::register_labour),
        )
        .route("/labours/:incharger_id", get(io::rest::labour_apis::list_labours))
        .route(
            "/locations/status/:user_id",
            put(io::rest::location_apis::update_resident_status),
        );

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
