//! # REST API for Work Allotment
//!
//! Endpoints for creating, listing, removing, and transitioning allotments.
//! Paths (including their mixed casing) match what the deployed mobile
//! clients already call.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{error, info, warn};

use crate::domain::commands::allotment::{
    AllotWorkCommand, ConfirmCollectionCommand, FinalizeCollectionCommand, RemoveWorkCommand,
    UnallocatedQuery,
};
use crate::domain::suitability::ComplaintSite;
use crate::io::rest::error_response;
use crate::io::rest::mappers::allotment_mapper::AllotmentMapper;
use crate::io::rest::mappers::labour_mapper::LabourMapper;
use crate::AppState;
use shared::{
    AcknowledgeCollectionRequest, AllotWorkRequest, AllotWorkResponse, AllotmentListResponse,
    AllotmentStatus, CollectionUpdateResponse, ConfirmCollectionRequest, RemoveWorkResponse,
    UnallocatedLabourResponse,
};

/// Query parameters for the unallocated-labour listing. The complaint site
/// is optional; a listing without one still ranks on availability.
#[derive(Deserialize, Debug)]
pub struct UnallocatedParams {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub date: Option<String>,
}

/// Query parameters for the street-level pending listing.
#[derive(Deserialize, Debug)]
pub struct PendingAllParams {
    pub street: String,
    #[serde(rename = "inchargerId")]
    pub incharger_id: String,
}

/// Query parameters for composite-key removal.
#[derive(Deserialize, Debug)]
pub struct RemoveParams {
    pub street: String,
    pub date: String,
}

/// GET /api/allotwork/unallocated/:inchargerId
pub async fn list_unallocated(
    State(state): State<AppState>,
    Path(incharger_id): Path<String>,
    Query(params): Query<UnallocatedParams>,
) -> impl IntoResponse {
    info!("GET /api/allotwork/unallocated/{} - params: {:?}", incharger_id, params);

    let reference_date = match &params.date {
        Some(raw) => match AllotmentMapper::parse_date(raw) {
            Ok(date) => date,
            Err(e) => return error_response(&e).into_response(),
        },
        None => Utc::now().date_naive(),
    };

    let has_site =
        params.latitude.is_some() || params.longitude.is_some() || params.address.is_some();
    let complaint = has_site.then(|| ComplaintSite {
        latitude: params.latitude.unwrap_or(0.0),
        longitude: params.longitude.unwrap_or(0.0),
        address: params.address.unwrap_or_default(),
    });

    let query = UnallocatedQuery {
        incharger_id,
        reference_date,
        complaint,
    };

    match state.allotment_service.list_unallocated(query).await {
        Ok(result) => {
            let labours = result
                .labours
                .into_iter()
                .map(LabourMapper::to_candidate_dto)
                .collect();
            (StatusCode::OK, Json(UnallocatedLabourResponse { labours })).into_response()
        }
        Err(e) => {
            error!("Failed to list unallocated labours: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// POST /api/allotWork/allotwork/:inchargerId
pub async fn allot_work(
    State(state): State<AppState>,
    Path(incharger_id): Path<String>,
    Json(request): Json<AllotWorkRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/allotWork/allotwork/{} - labour: {} street: {}",
        incharger_id, request.labour_id, request.street
    );

    let date = match AllotmentMapper::parse_date(&request.date) {
        Ok(date) => date,
        Err(e) => return error_response(&e).into_response(),
    };

    // New allotments always start Pending; anything else the client sends
    // is logged and discarded.
    if let Some(raw) = &request.status {
        match AllotmentStatus::from_str(raw) {
            Ok(AllotmentStatus::Pending) => {}
            Ok(other) => warn!("Ignoring client-supplied status {} on new allotment", other),
            Err(_) => warn!("Ignoring unparseable status {:?} on new allotment", raw),
        }
    }

    let location_data = match AllotmentMapper::points_to_domain(request.location_data) {
        Ok(points) => points,
        Err(e) => return error_response(&e).into_response(),
    };

    let command = AllotWorkCommand {
        incharger_id,
        labour_id: request.labour_id,
        street: request.street,
        date,
        time: request.time,
        location_data,
        complaint_id: request.complaint_id,
    };

    match state.allotment_service.allot_work(command).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(AllotWorkResponse {
                success: true,
                message: result.message,
                allotment: AllotmentMapper::to_dto(result.allotment),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to allot work: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// GET /api/allotwork/pending/all?street&inchargerId
pub async fn pending_for_street(
    State(state): State<AppState>,
    Query(params): Query<PendingAllParams>,
) -> impl IntoResponse {
    info!(
        "GET /api/allotwork/pending/all - street: {} incharger: {}",
        params.street, params.incharger_id
    );

    match state
        .allotment_service
        .pending_for_street(&params.street, &params.incharger_id)
        .await
    {
        Ok(allotments) => (
            StatusCode::OK,
            Json(AllotmentListResponse {
                allotments: AllotmentMapper::to_list_dto(allotments),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to list street allotments: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// GET /api/allotwork/pending/:labourId
pub async fn pending_for_labour(
    State(state): State<AppState>,
    Path(labour_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/allotwork/pending/{}", labour_id);

    match state.allotment_service.pending_for_labour(&labour_id).await {
        Ok(allotments) => (
            StatusCode::OK,
            Json(AllotmentListResponse {
                allotments: AllotmentMapper::to_list_dto(allotments),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to list labour allotments: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// DELETE /api/allotWork/remove/:inchargerId/:labourId?street&date
///
/// Always succeeds; absence is reported in the message so the client can
/// treat removal as fire-and-forget.
pub async fn remove_work(
    State(state): State<AppState>,
    Path((incharger_id, labour_id)): Path<(String, String)>,
    Query(params): Query<RemoveParams>,
) -> impl IntoResponse {
    info!(
        "DELETE /api/allotWork/remove/{}/{} - street: {} date: {}",
        incharger_id, labour_id, params.street, params.date
    );

    let date = match AllotmentMapper::parse_date(&params.date) {
        Ok(date) => date,
        Err(e) => return error_response(&e).into_response(),
    };

    let command = RemoveWorkCommand {
        incharger_id,
        labour_id,
        street: params.street,
        date,
    };

    match state.allotment_service.remove_work(command).await {
        Ok(result) => (
            StatusCode::OK,
            Json(RemoveWorkResponse {
                success: true,
                message: result.message,
                removed: result.removed,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to remove work: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// PUT /api/allotWork/confirm/:allotmentId
pub async fn confirm_collection(
    State(state): State<AppState>,
    Path(allotment_id): Path<String>,
    Json(request): Json<ConfirmCollectionRequest>,
) -> impl IntoResponse {
    info!(
        "PUT /api/allotWork/confirm/{} - user: {}",
        allotment_id, request.user_id
    );

    let command = ConfirmCollectionCommand {
        allotment_id,
        user_id: request.user_id,
    };

    match state.allotment_service.confirm_collection(command).await {
        Ok(result) => (
            StatusCode::OK,
            Json(CollectionUpdateResponse {
                success: true,
                message: result.message,
                allotment: AllotmentMapper::to_dto(result.allotment),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to confirm collection: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// PUT /api/allotWork/acknowledge/:userId
pub async fn acknowledge_collection(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<AcknowledgeCollectionRequest>,
) -> impl IntoResponse {
    info!(
        "PUT /api/allotWork/acknowledge/{} - allotment: {}",
        user_id, request.allotment_id
    );

    let command = ConfirmCollectionCommand {
        allotment_id: request.allotment_id,
        user_id,
    };

    match state.allotment_service.acknowledge_collection(command).await {
        Ok(result) => (
            StatusCode::OK,
            Json(CollectionUpdateResponse {
                success: true,
                message: result.message,
                allotment: AllotmentMapper::to_dto(result.allotment),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to acknowledge collection: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// PUT /api/allotWork/finalize/:allotmentId
pub async fn finalize_collection(
    State(state): State<AppState>,
    Path(allotment_id): Path<String>,
) -> impl IntoResponse {
    info!("PUT /api/allotWork/finalize/{}", allotment_id);

    let command = FinalizeCollectionCommand { allotment_id };

    match state.allotment_service.finalize_collection(command).await {
        Ok(result) => (
            StatusCode::OK,
            Json(CollectionUpdateResponse {
                success: true,
                message: result.message,
                allotment: AllotmentMapper::to_dto(result.allotment),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to finalize collection: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// GET /api/allotWork/allotments/:inchargerId
pub async fn allotments_for_incharger(
    State(state): State<AppState>,
    Path(incharger_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/allotWork/allotments/{}", incharger_id);

    match state
        .allotment_service
        .allotments_for_incharger(&incharger_id)
        .await
    {
        Ok(allotments) => (
            StatusCode::OK,
            Json(AllotmentListResponse {
                allotments: AllotmentMapper::to_list_dto(allotments),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to list incharger allotments: {}", e);
            error_response(&e).into_response()
        }
    }
}
