//! # REST API for Labour Management
//!
//! Endpoints for registering and listing the labours under an incharger.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{error, info};

use crate::domain::commands::labour::RegisterLabourCommand;
use crate::io::rest::error_response;
use crate::io::rest::mappers::labour_mapper::LabourMapper;
use crate::AppState;
use shared::{LabourListResponse, LabourResponse, RegisterLabourRequest};

/// POST /api/labours/register/:inchargerId
pub async fn register_labour(
    State(state): State<AppState>,
    Path(incharger_id): Path<String>,
    Json(request): Json<RegisterLabourRequest>,
) -> impl IntoResponse {
    info!("POST /api/labours/register/{} - name: {}", incharger_id, request.name);

    let command = RegisterLabourCommand {
        incharger_id,
        name: request.name,
        phone_number: request.phone_number,
        working_areas: request.labour_working_area,
        office: request.office,
        incharger_name: request.incharger_name,
        incharger_phone: request.incharger_phone,
        last_latitude: request.last_latitude,
        last_longitude: request.last_longitude,
    };

    match state.labour_service.register_labour(command).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(LabourResponse {
                labour: LabourMapper::to_dto(result.labour),
                success_message: result.success_message,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to register labour: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// GET /api/labours/:inchargerId
pub async fn list_labours(
    State(state): State<AppState>,
    Path(incharger_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/labours/{}", incharger_id);

    match state.labour_service.list_labours(&incharger_id).await {
        Ok(labours) => (
            StatusCode::OK,
            Json(LabourListResponse {
                labours: LabourMapper::to_list_dto(labours),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to list labours: {}", e);
            error_response(&e).into_response()
        }
    }
}
