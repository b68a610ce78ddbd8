//! # Storage Traits
//!
//! Storage abstraction traits that let the domain layer work against any
//! backing store. The file-backed implementation lives in `csv/`; the
//! services only ever see these traits.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::models::allotment::Allotment;
use crate::domain::models::labour::Labour;
use crate::domain::models::resident::Resident;

/// Interface for allotment storage operations.
#[async_trait]
pub trait AllotmentStorage: Send + Sync {
    /// Store a new allotment.
    ///
    /// Fails with [`AllotmentError::AlreadyAllotted`] when a live allotment
    /// already exists for the same (labour, street, date) key, carrying the
    /// conflicting record's street, date, and time.
    ///
    /// [`AllotmentError::AlreadyAllotted`]: crate::domain::models::allotment::AllotmentError::AlreadyAllotted
    async fn create_allotment(&self, allotment: &Allotment) -> Result<()>;

    /// Retrieve a specific allotment by id.
    async fn get_allotment(&self, allotment_id: &str) -> Result<Option<Allotment>>;

    /// Overwrite an existing allotment document. Callers serialize writes
    /// per allotment id; the store only guarantees each write lands atomically.
    async fn save_allotment(&self, allotment: &Allotment) -> Result<()>;

    /// A labour's visible allotments: everything live, plus allotments
    /// collected within the last 24 hours.
    async fn find_by_labour(&self, labour_id: &str) -> Result<Vec<Allotment>>;

    /// All of a labour's allotments for one calendar date, regardless of status.
    async fn find_by_labour_and_date(
        &self,
        labour_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Allotment>>;

    /// Allotments for one street under one incharger.
    async fn find_by_street_and_incharger(
        &self,
        street: &str,
        incharger_id: &str,
    ) -> Result<Vec<Allotment>>;

    /// All allotments under one incharger.
    async fn find_by_incharger(&self, incharger_id: &str) -> Result<Vec<Allotment>>;

    /// Delete by composite key. Returns the removed records; an empty vec
    /// means "already absent", which is not an error.
    async fn remove_by_composite_key(
        &self,
        incharger_id: &str,
        labour_id: &str,
        street: &str,
        date: NaiveDate,
    ) -> Result<Vec<Allotment>>;
}

/// Interface for labour storage operations.
#[async_trait]
pub trait LabourStorage: Send + Sync {
    /// Store a new labour under their incharger.
    async fn store_labour(&self, labour: &Labour) -> Result<()>;

    /// Retrieve one labour, scoped to the owning incharger.
    async fn get_labour(&self, incharger_id: &str, labour_id: &str) -> Result<Option<Labour>>;

    /// List all labours under an incharger, ordered by name.
    async fn list_labours(&self, incharger_id: &str) -> Result<Vec<Labour>>;
}

/// Interface for resident storage operations.
#[async_trait]
pub trait ResidentStorage: Send + Sync {
    /// Insert or replace a resident record, keyed by user id.
    async fn upsert_resident(&self, resident: &Resident) -> Result<()>;

    /// Retrieve a resident by user id.
    async fn get_resident(&self, user_id: &str) -> Result<Option<Resident>>;

    /// All residents on one street.
    async fn list_by_street(&self, street: &str) -> Result<Vec<Resident>>;
}
