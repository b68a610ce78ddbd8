//! File-backed repositories: CSV files for flat records, one YAML document
//! per allotment aggregate.

pub mod allotment_repository;
pub mod connection;
pub mod labour_repository;
pub mod resident_repository;

pub use allotment_repository::AllotmentRepository;
pub use connection::CsvConnection;
pub use labour_repository::LabourRepository;
pub use resident_repository::ResidentRepository;
