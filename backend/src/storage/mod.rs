//! # Storage Module
//!
//! Data persistence for the collection-ops service. The domain layer depends
//! only on the traits defined here; the file-backed implementation under
//! `csv/` can be swapped without touching business logic.

pub mod csv;
pub mod traits;

pub use csv::{AllotmentRepository, CsvConnection, LabourRepository, ResidentRepository};
pub use traits::{AllotmentStorage, LabourStorage, ResidentStorage};
