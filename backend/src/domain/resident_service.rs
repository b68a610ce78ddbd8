use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::resident::{UpsertResidentCommand, UpsertResidentResult};
use crate::domain::models::resident::Resident;
use crate::storage::traits::ResidentStorage;

/// Service for resident profiles and the daily readiness gauge.
#[derive(Clone)]
pub struct ResidentService {
    residents: Arc<dyn ResidentStorage>,
}

impl ResidentService {
    pub fn new(residents: Arc<dyn ResidentStorage>) -> Self {
        Self { residents }
    }

    /// Insert or replace a resident's profile and readiness flag.
    pub async fn upsert_resident(
        &self,
        command: UpsertResidentCommand,
    ) -> Result<UpsertResidentResult> {
        info!(
            "Upserting resident {} on street {} ({})",
            command.user_id, command.street, command.today_status
        );

        if command.street.trim().is_empty() {
            return Err(anyhow::anyhow!("Street cannot be empty"));
        }
        if command.username.trim().is_empty() {
            return Err(anyhow::anyhow!("Username cannot be empty"));
        }

        let resident = Resident {
            user_id: command.user_id,
            username: command.username.trim().to_string(),
            user_address: command.user_address.trim().to_string(),
            contact: command.contact.trim().to_string(),
            street: command.street.trim().to_string(),
            latitude: command.latitude,
            longitude: command.longitude,
            today_status: command.today_status,
        };

        self.residents.upsert_resident(&resident).await?;

        Ok(UpsertResidentResult {
            resident,
            success_message: "Resident status updated".to_string(),
        })
    }

    /// Count of residents on a street whose readiness flag reads YES.
    pub async fn count_ready_for_collection(&self, street: &str) -> Result<u32> {
        let residents = self.residents.list_by_street(street).await?;
        let ready = residents.iter().filter(|r| r.is_ready()).count() as u32;
        info!("{} of {} residents ready on {}", ready, residents.len(), street);
        Ok(ready)
    }
}
