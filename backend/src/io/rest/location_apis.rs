//! # REST API for Resident Locations
//!
//! Resident readiness upserts and the per-street ready count inchargers use
//! to gauge demand before allotting.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::str::FromStr;
use tracing::{error, info};

use crate::domain::commands::resident::UpsertResidentCommand;
use crate::io::rest::error_response;
use crate::io::rest::mappers::resident_mapper::ResidentMapper;
use crate::AppState;
use shared::{ResidentResponse, TodayStatus, UpdateResidentRequest, YesCountResponse};

/// GET /api/allotWork/locations/yesCount/:street
pub async fn yes_count(
    State(state): State<AppState>,
    Path(street): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/allotWork/locations/yesCount/{}", street);

    match state.resident_service.count_ready_for_collection(&street).await {
        Ok(count) => (
            StatusCode::OK,
            Json(YesCountResponse {
                street,
                yes_count: count,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to count ready residents: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// PUT /api/locations/status/:userId
pub async fn update_resident_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateResidentRequest>,
) -> impl IntoResponse {
    info!(
        "PUT /api/locations/status/{} - street: {} status: {}",
        user_id, request.street, request.today_status
    );

    let today_status = match TodayStatus::from_str(&request.today_status) {
        Ok(status) => status,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, e).into_response();
        }
    };

    let command = UpsertResidentCommand {
        user_id,
        username: request.username,
        user_address: request.user_address,
        contact: request.contact,
        street: request.street,
        latitude: request.latitude,
        longitude: request.longitude,
        today_status,
    };

    match state.resident_service.upsert_resident(command).await {
        Ok(result) => (
            StatusCode::OK,
            Json(ResidentResponse {
                resident: ResidentMapper::to_dto(result.resident),
                success_message: result.success_message,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to update resident status: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}
