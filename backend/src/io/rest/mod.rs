//! # REST API Interface Layer
//!
//! HTTP endpoints for the collection-ops service. This layer handles
//! request/response serialization, translation of domain errors to HTTP
//! status codes, and request logging. Business logic stays in the domain
//! layer; handlers only map DTOs to commands and back.

use axum::http::StatusCode;
use axum::Json;

use crate::domain::models::allotment::AllotmentError;
use shared::ErrorResponse;

pub mod allotment_apis;
pub mod labour_apis;
pub mod location_apis;
pub mod mappers;

/// Translate a service error into the HTTP status and `{error}` body the
/// clients expect. Conflicts and validation failures are the caller's
/// fault (400), missing aggregates are 404, anything else is 500.
pub fn error_response(e: &anyhow::Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e.downcast_ref::<AllotmentError>() {
        Some(AllotmentError::AlreadyAllotted { .. }) | Some(AllotmentError::Validation(_)) => {
            StatusCode::BAD_REQUEST
        }
        Some(AllotmentError::LabourNotFound)
        | Some(AllotmentError::NotFound(_))
        | Some(AllotmentError::PointNotFound { .. }) => StatusCode::NOT_FOUND,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn conflict_maps_to_bad_request() {
        let err: anyhow::Error = AllotmentError::AlreadyAllotted {
            street: "Elm St".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            time: "9:00 AM - 3:00 PM".to_string(),
        }
        .into();
        let (status, body) = error_response(&err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.contains("Elm St"));
        assert!(body.error.contains("2024-06-01"));
    }

    #[test]
    fn missing_aggregates_map_to_not_found() {
        let err: anyhow::Error = AllotmentError::LabourNotFound.into();
        let (status, body) = error_response(&err);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Labour or incharger not found");

        let err: anyhow::Error = AllotmentError::NotFound("allot-1".to_string()).into();
        let (status, _) = error_response(&err);
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn unknown_errors_map_to_internal_error() {
        let err = anyhow::anyhow!("disk on fire");
        let (status, _) = error_response(&err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
