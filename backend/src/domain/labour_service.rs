use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::labour::{RegisterLabourCommand, RegisterLabourResult};
use crate::domain::models::labour::Labour;
use crate::storage::traits::LabourStorage;

/// Service for managing the labours registered under each incharger.
#[derive(Clone)]
pub struct LabourService {
    labours: Arc<dyn LabourStorage>,
}

impl LabourService {
    pub fn new(labours: Arc<dyn LabourStorage>) -> Self {
        Self { labours }
    }

    /// Register a new labour under an incharger.
    pub async fn register_labour(
        &self,
        command: RegisterLabourCommand,
    ) -> Result<RegisterLabourResult> {
        info!(
            "Registering labour {} under incharger {}",
            command.name, command.incharger_id
        );

        self.validate_register_command(&command)?;

        let existing = self.labours.list_labours(&command.incharger_id).await?;
        if existing.iter().any(|l| l.phone_number == command.phone_number) {
            warn!(
                "Duplicate labour phone number {} under incharger {}",
                command.phone_number, command.incharger_id
            );
            return Err(anyhow::anyhow!(
                "A labour with this phone number is already registered"
            ));
        }

        let labour = Labour {
            id: Labour::generate_id(),
            name: command.name.trim().to_string(),
            phone_number: command.phone_number.trim().to_string(),
            working_areas: command
                .working_areas
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
            office: command.office.trim().to_string(),
            incharger_id: command.incharger_id,
            incharger_name: command.incharger_name,
            incharger_phone: command.incharger_phone,
            last_latitude: command.last_latitude,
            last_longitude: command.last_longitude,
        };

        self.labours.store_labour(&labour).await?;

        info!("Registered labour {} with id {}", labour.name, labour.id);
        Ok(RegisterLabourResult {
            labour,
            success_message: "Labour registered successfully".to_string(),
        })
    }

    /// List all labours under an incharger.
    pub async fn list_labours(&self, incharger_id: &str) -> Result<Vec<Labour>> {
        info!("Listing labours for incharger {}", incharger_id);
        let labours = self.labours.list_labours(incharger_id).await?;
        info!("Found {} labours", labours.len());
        Ok(labours)
    }

    fn validate_register_command(&self, command: &RegisterLabourCommand) -> Result<()> {
        if command.name.trim().is_empty() {
            return Err(anyhow::anyhow!("Labour name cannot be empty"));
        }
        if command.name.len() > 100 {
            return Err(anyhow::anyhow!("Labour name cannot exceed 100 characters"));
        }

        let phone = command.phone_number.trim();
        if phone.is_empty() {
            return Err(anyhow::anyhow!("Phone number cannot be empty"));
        }
        if !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(anyhow::anyhow!("Phone number must contain only digits"));
        }

        if !command.working_areas.iter().any(|a| !a.trim().is_empty()) {
            return Err(anyhow::anyhow!("At least one working area is required"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::storage::csv::{CsvConnection, LabourRepository};

    async fn setup_test() -> (LabourService, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = CsvConnection::new(temp_dir.path()).expect("Failed to create connection");
        let service = LabourService::new(Arc::new(LabourRepository::new(connection)));
        (service, temp_dir)
    }

    fn register_command(name: &str, phone: &str) -> RegisterLabourCommand {
        RegisterLabourCommand {
            incharger_id: "incharger-1".to_string(),
            name: name.to_string(),
            phone_number: phone.to_string(),
            working_areas: vec!["Elm St".to_string()],
            office: "Ward 12".to_string(),
            incharger_name: "Meera".to_string(),
            incharger_phone: "9000000002".to_string(),
            last_latitude: None,
            last_longitude: None,
        }
    }

    #[tokio::test]
    async fn register_labour_assigns_id_and_persists() {
        let (service, _guard) = setup_test().await;

        let result = service
            .register_labour(register_command("Suresh", "9000000001"))
            .await
            .expect("register failed");

        assert!(result.labour.id.starts_with("labour-"));
        assert_eq!(result.labour.name, "Suresh");
        assert_eq!(result.success_message, "Labour registered successfully");

        let labours = service.list_labours("incharger-1").await.unwrap();
        assert_eq!(labours.len(), 1);
    }

    #[tokio::test]
    async fn register_labour_validation() {
        let (service, _guard) = setup_test().await;

        // Empty name
        assert!(service
            .register_labour(register_command("", "9000000001"))
            .await
            .is_err());

        // Non-digit phone
        assert!(service
            .register_labour(register_command("Suresh", "phone"))
            .await
            .is_err());

        // No working areas
        let mut command = register_command("Suresh", "9000000001");
        command.working_areas = vec!["  ".to_string()];
        assert!(service.register_labour(command).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_phone_number_is_rejected() {
        let (service, _guard) = setup_test().await;
        service
            .register_labour(register_command("Suresh", "9000000001"))
            .await
            .unwrap();

        let err = service
            .register_labour(register_command("Ravi", "9000000001"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[tokio::test]
    async fn blank_working_areas_are_dropped() {
        let (service, _guard) = setup_test().await;
        let mut command = register_command("Suresh", "9000000001");
        command.working_areas = vec!["Elm St".to_string(), " ".to_string(), "Oak Ave".to_string()];

        let result = service.register_labour(command).await.unwrap();
        assert_eq!(result.labour.working_areas, vec!["Elm St", "Oak Ave"]);
    }
}
