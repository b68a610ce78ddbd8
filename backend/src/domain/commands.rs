//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs defined
//! in the `shared` crate to these internal types.

pub mod allotment {
    use chrono::NaiveDate;

    use crate::domain::models::allotment::{Allotment, CollectionPoint};
    use crate::domain::suitability::{ComplaintSite, ScoredLabour};

    /// Input for creating a new allotment.
    #[derive(Debug, Clone)]
    pub struct AllotWorkCommand {
        pub incharger_id: String,
        pub labour_id: String,
        pub street: String,
        pub date: NaiveDate,
        pub time: String,
        pub location_data: Vec<CollectionPoint>,
        pub complaint_id: Option<String>,
    }

    /// Result of creating an allotment.
    #[derive(Debug, Clone)]
    pub struct AllotWorkResult {
        pub allotment: Allotment,
        pub message: String,
    }

    /// Input for removing an allotment by its composite key.
    #[derive(Debug, Clone)]
    pub struct RemoveWorkCommand {
        pub incharger_id: String,
        pub labour_id: String,
        pub street: String,
        pub date: NaiveDate,
    }

    /// Result of a removal. Absence is not an error, only a message.
    #[derive(Debug, Clone)]
    pub struct RemoveWorkResult {
        pub removed: bool,
        pub message: String,
    }

    /// Input for confirming one resident's pickup within an allotment.
    #[derive(Debug, Clone)]
    pub struct ConfirmCollectionCommand {
        pub allotment_id: String,
        pub user_id: String,
    }

    /// Input for force-closing an allotment.
    #[derive(Debug, Clone)]
    pub struct FinalizeCollectionCommand {
        pub allotment_id: String,
    }

    /// Result of any status transition.
    #[derive(Debug, Clone)]
    pub struct CollectionUpdateResult {
        pub allotment: Allotment,
        pub message: String,
    }

    /// Query for the ranked unallocated-labour listing.
    #[derive(Debug, Clone)]
    pub struct UnallocatedQuery {
        pub incharger_id: String,
        pub reference_date: NaiveDate,
        /// Complaint site to rank against; absent floors the distance and
        /// area factors.
        pub complaint: Option<ComplaintSite>,
    }

    /// Result of the unallocated-labour listing, highest score first.
    #[derive(Debug, Clone)]
    pub struct UnallocatedResult {
        pub labours: Vec<ScoredLabour>,
    }
}

pub mod labour {
    use crate::domain::models::labour::Labour;

    /// Input for registering a labour under an incharger.
    #[derive(Debug, Clone)]
    pub struct RegisterLabourCommand {
        pub incharger_id: String,
        pub name: String,
        pub phone_number: String,
        pub working_areas: Vec<String>,
        pub office: String,
        pub incharger_name: String,
        pub incharger_phone: String,
        pub last_latitude: Option<f64>,
        pub last_longitude: Option<f64>,
    }

    /// Result of registering a labour.
    #[derive(Debug, Clone)]
    pub struct RegisterLabourResult {
        pub labour: Labour,
        pub success_message: String,
    }
}

pub mod resident {
    use shared::TodayStatus;

    use crate::domain::models::resident::Resident;

    /// Input for upserting a resident's profile and readiness flag.
    #[derive(Debug, Clone)]
    pub struct UpsertResidentCommand {
        pub user_id: String,
        pub username: String,
        pub user_address: String,
        pub contact: String,
        pub street: String,
        pub latitude: f64,
        pub longitude: f64,
        pub today_status: TodayStatus,
    }

    /// Result of a resident upsert.
    #[derive(Debug, Clone)]
    pub struct UpsertResidentResult {
        pub resident: Resident,
        pub success_message: String,
    }
}
