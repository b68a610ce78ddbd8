//! # Domain Module
//!
//! Business logic for the collection-ops service: allotment lifecycle,
//! labour registration, resident readiness, and the advisory suitability
//! ranking. Operates independently of the HTTP layer and of any specific
//! storage backend.
//!
//! ## Module Organization
//!
//! - **allotment_service**: assigning labours to streets, status transitions,
//!   removal, and the ranked unallocated listing
//! - **labour_service**: labour registration and listing per incharger
//! - **resident_service**: resident readiness upserts and the yes-count gauge
//! - **suitability**: pure scoring of labours against a complaint site
//! - **commands**: internal command/query/result types
//! - **models**: domain entities and their lifecycle rules

pub mod allotment_service;
pub mod commands;
pub mod labour_service;
pub mod models;
pub mod resident_service;
pub mod suitability;

pub use allotment_service::AllotmentService;
pub use labour_service::LabourService;
pub use resident_service::ResidentService;
