use anyhow::Result;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::allotment::{
    AllotWorkCommand, AllotWorkResult, CollectionUpdateResult, ConfirmCollectionCommand,
    FinalizeCollectionCommand, RemoveWorkCommand, RemoveWorkResult, UnallocatedQuery,
    UnallocatedResult,
};
use crate::domain::models::allotment::{Allotment, AllotmentError};
use crate::domain::suitability;
use crate::storage::traits::{AllotmentStorage, LabourStorage};
use shared::AllotmentStatus;

/// Service for assigning labours to streets and walking allotments through
/// their collection lifecycle.
#[derive(Clone)]
pub struct AllotmentService {
    allotments: Arc<dyn AllotmentStorage>,
    labours: Arc<dyn LabourStorage>,
    /// One advisory lock per allotment id, held across each
    /// read-modify-write so concurrent transitions cannot lose updates.
    transition_locks: Arc<tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl AllotmentService {
    pub fn new(allotments: Arc<dyn AllotmentStorage>, labours: Arc<dyn LabourStorage>) -> Self {
        Self {
            allotments,
            labours,
            transition_locks: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
        }
    }

    async fn lock_for(&self, allotment_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.transition_locks.lock().await;
        locks
            .entry(allotment_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Run one transition under the allotment's advisory lock and persist
    /// the result.
    async fn with_allotment<F>(&self, allotment_id: &str, mutate: F) -> Result<Allotment>
    where
        F: FnOnce(&mut Allotment) -> Result<(), AllotmentError>,
    {
        let lock = self.lock_for(allotment_id).await;
        let _guard = lock.lock().await;

        let mut allotment = self
            .allotments
            .get_allotment(allotment_id)
            .await?
            .ok_or_else(|| AllotmentError::NotFound(allotment_id.to_string()))?;

        mutate(&mut allotment)?;
        self.allotments.save_allotment(&allotment).await?;
        Ok(allotment)
    }

    /// List labours under an incharger who have not collected anything on
    /// the reference date, ranked by suitability for the complaint site.
    pub async fn list_unallocated(&self, query: UnallocatedQuery) -> Result<UnallocatedResult> {
        info!(
            "Listing unallocated labours for incharger {} on {}",
            query.incharger_id, query.reference_date
        );

        let labours = self.labours.list_labours(&query.incharger_id).await?;

        let mut collected_today: HashSet<String> = HashSet::new();
        for labour in &labours {
            let day_allotments = self
                .allotments
                .find_by_labour_and_date(&labour.id, query.reference_date)
                .await?;
            let has_collected_point = day_allotments
                .iter()
                .flat_map(|a| a.location_data.iter())
                .any(|p| p.labour_collected);
            if has_collected_point {
                collected_today.insert(labour.id.clone());
            }
        }

        let candidates: Vec<_> = labours
            .into_iter()
            .filter(|l| !collected_today.contains(&l.id))
            .collect();

        let site = query.complaint.unwrap_or_default();
        let ranked = suitability::rank(candidates, &site, &collected_today);

        info!("Ranked {} unallocated labours", ranked.len());
        Ok(UnallocatedResult { labours: ranked })
    }

    /// Create a new Pending allotment for a labour on a street and date.
    pub async fn allot_work(&self, command: AllotWorkCommand) -> Result<AllotWorkResult> {
        info!(
            "Allotting work: incharger={} labour={} street={} date={}",
            command.incharger_id, command.labour_id, command.street, command.date
        );

        if command.street.trim().is_empty() {
            return Err(AllotmentError::Validation("No street selected".to_string()).into());
        }
        if command.time.trim().is_empty() {
            return Err(AllotmentError::Validation("No time slot selected".to_string()).into());
        }

        let labour = self
            .labours
            .get_labour(&command.incharger_id, &command.labour_id)
            .await?
            .ok_or(AllotmentError::LabourNotFound)?;

        // The street must belong to the incharger's supervised set, which is
        // the union of their labours' working areas.
        let supervised = self.labours.list_labours(&command.incharger_id).await?;
        let street_supervised = supervised.iter().any(|l| l.covers_street(&command.street));
        if !street_supervised {
            warn!(
                "Street {} is not supervised by incharger {}",
                command.street, command.incharger_id
            );
            return Err(AllotmentError::LabourNotFound.into());
        }

        let now = Utc::now();
        let allotment = Allotment {
            id: Allotment::generate_id(),
            incharger_id: command.incharger_id,
            incharger_name: labour.incharger_name.clone(),
            labour_id: labour.id.clone(),
            labour_name: labour.name.clone(),
            labour_phone_number: labour.phone_number.clone(),
            street: command.street,
            date: command.date,
            time: command.time,
            status: AllotmentStatus::Pending,
            location_data: command.location_data,
            complaint_id: command.complaint_id,
            created_at: now,
            updated_at: now,
            collected_at: None,
        };

        self.allotments.create_allotment(&allotment).await?;

        info!("Allotted work {} to labour {}", allotment.id, allotment.labour_id);
        Ok(AllotWorkResult {
            allotment,
            message: "Work allotted successfully".to_string(),
        })
    }

    /// Remove an allotment by its composite key. Absence is reported in the
    /// message, never as an error, so callers can treat removal as
    /// fire-and-forget.
    pub async fn remove_work(&self, command: RemoveWorkCommand) -> Result<RemoveWorkResult> {
        info!(
            "Removing work: incharger={} labour={} street={} date={}",
            command.incharger_id, command.labour_id, command.street, command.date
        );

        let removed = self
            .allotments
            .remove_by_composite_key(
                &command.incharger_id,
                &command.labour_id,
                &command.street,
                command.date,
            )
            .await?;

        for allotment in &removed {
            if !allotment.is_live() {
                warn!(
                    "Removed collected allotment {} (labour={} street={} date={})",
                    allotment.id, allotment.labour_id, allotment.street, allotment.date
                );
            }
        }

        if removed.is_empty() {
            Ok(RemoveWorkResult {
                removed: false,
                message: "No work to remove".to_string(),
            })
        } else {
            Ok(RemoveWorkResult {
                removed: true,
                message: "Work removed".to_string(),
            })
        }
    }

    /// Incharger-side confirmation of one resident's pickup.
    pub async fn confirm_collection(
        &self,
        command: ConfirmCollectionCommand,
    ) -> Result<CollectionUpdateResult> {
        info!(
            "Confirming collection: allotment={} user={}",
            command.allotment_id, command.user_id
        );

        let now = Utc::now();
        let user_id = command.user_id.clone();
        let allotment = self
            .with_allotment(&command.allotment_id, move |a| {
                a.confirm_point(&user_id, now).map(|_| ())
            })
            .await?;

        let message = format!("Collection status: {}", allotment.status);
        Ok(CollectionUpdateResult { allotment, message })
    }

    /// Resident-side acknowledgment of their own pickup. Same transition as
    /// confirm, authorized by the resident's own id.
    pub async fn acknowledge_collection(
        &self,
        command: ConfirmCollectionCommand,
    ) -> Result<CollectionUpdateResult> {
        info!(
            "Resident {} acknowledging collection on allotment {}",
            command.user_id, command.allotment_id
        );
        self.confirm_collection(command).await
    }

    /// Administrative override: force an allotment to Collected regardless
    /// of per-point state.
    pub async fn finalize_collection(
        &self,
        command: FinalizeCollectionCommand,
    ) -> Result<CollectionUpdateResult> {
        info!("Finalizing allotment {}", command.allotment_id);

        let now = Utc::now();
        let allotment = self
            .with_allotment(&command.allotment_id, move |a| {
                a.finalize(now);
                Ok(())
            })
            .await?;

        Ok(CollectionUpdateResult {
            allotment,
            message: "Collection finalized".to_string(),
        })
    }

    /// A labour's visible allotments: live work plus anything collected in
    /// the last 24 hours.
    pub async fn pending_for_labour(&self, labour_id: &str) -> Result<Vec<Allotment>> {
        info!("Listing pending work for labour {}", labour_id);
        self.allotments.find_by_labour(labour_id).await
    }

    /// Open allotments for one street under one incharger.
    pub async fn pending_for_street(
        &self,
        street: &str,
        incharger_id: &str,
    ) -> Result<Vec<Allotment>> {
        info!("Listing pending work for street {} under {}", street, incharger_id);
        let allotments = self
            .allotments
            .find_by_street_and_incharger(street, incharger_id)
            .await?;
        Ok(allotments.into_iter().filter(|a| a.is_live()).collect())
    }

    /// Every allotment under one incharger, regardless of status.
    pub async fn allotments_for_incharger(&self, incharger_id: &str) -> Result<Vec<Allotment>> {
        info!("Listing all allotments for incharger {}", incharger_id);
        self.allotments.find_by_incharger(incharger_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::TodayStatus;
    use tempfile::TempDir;

    use crate::domain::models::allotment::CollectionPoint;
    use crate::domain::models::labour::Labour;
    use crate::domain::suitability::ComplaintSite;
    use crate::storage::csv::{AllotmentRepository, CsvConnection, LabourRepository};

    async fn setup_test() -> (AllotmentService, Arc<LabourRepository>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = CsvConnection::new(temp_dir.path()).expect("Failed to create connection");
        let labours = Arc::new(LabourRepository::new(connection.clone()));
        let allotments = Arc::new(AllotmentRepository::new(connection));
        let service = AllotmentService::new(allotments, labours.clone());
        (service, labours, temp_dir)
    }

    fn sample_labour(id: &str, name: &str, areas: &[&str]) -> Labour {
        Labour {
            id: id.to_string(),
            name: name.to_string(),
            phone_number: "9000000001".to_string(),
            working_areas: areas.iter().map(|s| s.to_string()).collect(),
            office: "Ward 12".to_string(),
            incharger_id: "incharger-1".to_string(),
            incharger_name: "Meera".to_string(),
            incharger_phone: "9000000002".to_string(),
            last_latitude: None,
            last_longitude: None,
        }
    }

    fn point(user_id: &str, status: TodayStatus) -> CollectionPoint {
        CollectionPoint {
            user_id: user_id.to_string(),
            username: format!("resident {}", user_id),
            user_address: "12 Elm St".to_string(),
            contact: "9876543210".to_string(),
            latitude: 12.97,
            longitude: 77.59,
            today_status: status,
            labour_collected: false,
            collection_confirmed: false,
            acknowledged_at: None,
        }
    }

    fn june_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn allot_command(labour_id: &str, street: &str, points: Vec<CollectionPoint>) -> AllotWorkCommand {
        AllotWorkCommand {
            incharger_id: "incharger-1".to_string(),
            labour_id: labour_id.to_string(),
            street: street.to_string(),
            date: june_first(),
            time: "9:00 AM - 3:00 PM".to_string(),
            location_data: points,
            complaint_id: None,
        }
    }

    #[tokio::test]
    async fn allot_work_creates_pending_allotment() {
        let (service, labours, _guard) = setup_test().await;
        labours
            .store_labour(&sample_labour("labour-1", "Suresh", &["Elm St"]))
            .await
            .unwrap();

        let result = service
            .allot_work(allot_command("labour-1", "Elm St", vec![point("user-1", TodayStatus::Yes)]))
            .await
            .expect("allot failed");

        assert_eq!(result.allotment.status, AllotmentStatus::Pending);
        assert_eq!(result.allotment.labour_name, "Suresh");
        assert_eq!(result.allotment.incharger_name, "Meera");
        assert_eq!(result.message, "Work allotted successfully");
    }

    #[tokio::test]
    async fn duplicate_allotment_is_rejected_with_conflicting_details() {
        let (service, labours, _guard) = setup_test().await;
        labours
            .store_labour(&sample_labour("labour-1", "Suresh", &["Elm St"]))
            .await
            .unwrap();

        service
            .allot_work(allot_command("labour-1", "Elm St", vec![]))
            .await
            .unwrap();
        let err = service
            .allot_work(allot_command("labour-1", "Elm St", vec![]))
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Labour already allotted"));
        assert!(message.contains("2024-06-01"));
        assert!(message.contains("9:00 AM - 3:00 PM"));
    }

    #[tokio::test]
    async fn allot_for_unknown_labour_is_not_found() {
        let (service, _labours, _guard) = setup_test().await;
        let err = service
            .allot_work(allot_command("labour-missing", "Elm St", vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Labour or incharger not found");
    }

    #[tokio::test]
    async fn allot_for_unsupervised_street_is_not_found() {
        let (service, labours, _guard) = setup_test().await;
        labours
            .store_labour(&sample_labour("labour-1", "Suresh", &["Elm St"]))
            .await
            .unwrap();

        let err = service
            .allot_work(allot_command("labour-1", "Unknown Blvd", vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Labour or incharger not found");
    }

    #[tokio::test]
    async fn allot_without_street_is_a_validation_failure() {
        let (service, labours, _guard) = setup_test().await;
        labours
            .store_labour(&sample_labour("labour-1", "Suresh", &["Elm St"]))
            .await
            .unwrap();

        let err = service
            .allot_work(allot_command("labour-1", "  ", vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No street selected");
    }

    #[tokio::test]
    async fn remove_work_is_idempotent() {
        let (service, labours, _guard) = setup_test().await;
        labours
            .store_labour(&sample_labour("labour-1", "Suresh", &["Elm St"]))
            .await
            .unwrap();
        service
            .allot_work(allot_command("labour-1", "Elm St", vec![]))
            .await
            .unwrap();

        let command = RemoveWorkCommand {
            incharger_id: "incharger-1".to_string(),
            labour_id: "labour-1".to_string(),
            street: "Elm St".to_string(),
            date: june_first(),
        };

        let first = service.remove_work(command.clone()).await.unwrap();
        assert!(first.removed);
        assert_eq!(first.message, "Work removed");

        let second = service.remove_work(command).await.unwrap();
        assert!(!second.removed);
        assert_eq!(second.message, "No work to remove");
    }

    #[tokio::test]
    async fn confirm_walks_allotment_to_collected() {
        let (service, labours, _guard) = setup_test().await;
        labours
            .store_labour(&sample_labour("labour-1", "Suresh", &["Elm St"]))
            .await
            .unwrap();

        let allotment = service
            .allot_work(allot_command(
                "labour-1",
                "Elm St",
                vec![point("user-a", TodayStatus::Yes), point("user-b", TodayStatus::Yes)],
            ))
            .await
            .unwrap()
            .allotment;

        let partial = service
            .confirm_collection(ConfirmCollectionCommand {
                allotment_id: allotment.id.clone(),
                user_id: "user-a".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(partial.allotment.status, AllotmentStatus::PendingAcknowledgment);

        let complete = service
            .acknowledge_collection(ConfirmCollectionCommand {
                allotment_id: allotment.id.clone(),
                user_id: "user-b".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(complete.allotment.status, AllotmentStatus::Collected);
    }

    #[tokio::test]
    async fn confirm_on_unknown_allotment_is_not_found() {
        let (service, _labours, _guard) = setup_test().await;
        let err = service
            .confirm_collection(ConfirmCollectionCommand {
                allotment_id: "allot-missing".to_string(),
                user_id: "user-a".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Allotment not found"));
    }

    #[tokio::test]
    async fn finalize_forces_collected() {
        let (service, labours, _guard) = setup_test().await;
        labours
            .store_labour(&sample_labour("labour-1", "Suresh", &["Elm St"]))
            .await
            .unwrap();

        let allotment = service
            .allot_work(allot_command(
                "labour-1",
                "Elm St",
                vec![point("user-a", TodayStatus::Yes), point("user-b", TodayStatus::Yes)],
            ))
            .await
            .unwrap()
            .allotment;

        let result = service
            .finalize_collection(FinalizeCollectionCommand {
                allotment_id: allotment.id.clone(),
            })
            .await
            .unwrap();
        assert_eq!(result.allotment.status, AllotmentStatus::Collected);

        // Finalized work no longer shows as pending on the street.
        let open = service.pending_for_street("Elm St", "incharger-1").await.unwrap();
        assert!(open.is_empty());
    }

    #[tokio::test]
    async fn unallocated_listing_excludes_labours_who_collected_today() {
        let (service, labours, _guard) = setup_test().await;
        labours
            .store_labour(&sample_labour("labour-1", "Suresh", &["Elm St"]))
            .await
            .unwrap();
        labours
            .store_labour(&sample_labour("labour-2", "Ravi", &["Elm St"]))
            .await
            .unwrap();

        let allotment = service
            .allot_work(allot_command("labour-1", "Elm St", vec![point("user-a", TodayStatus::Yes)]))
            .await
            .unwrap()
            .allotment;
        service
            .confirm_collection(ConfirmCollectionCommand {
                allotment_id: allotment.id,
                user_id: "user-a".to_string(),
            })
            .await
            .unwrap();

        let result = service
            .list_unallocated(UnallocatedQuery {
                incharger_id: "incharger-1".to_string(),
                reference_date: june_first(),
                complaint: None,
            })
            .await
            .unwrap();

        let ids: Vec<&str> = result.labours.iter().map(|s| s.labour.id.as_str()).collect();
        assert_eq!(ids, vec!["labour-2"]);
    }

    #[tokio::test]
    async fn unallocated_listing_ranks_area_match_first() {
        let (service, labours, _guard) = setup_test().await;
        labours
            .store_labour(&sample_labour("labour-1", "Suresh", &["Oak Ave"]))
            .await
            .unwrap();
        labours
            .store_labour(&sample_labour("labour-2", "Ravi", &["Main St"]))
            .await
            .unwrap();

        let result = service
            .list_unallocated(UnallocatedQuery {
                incharger_id: "incharger-1".to_string(),
                reference_date: june_first(),
                complaint: Some(ComplaintSite {
                    latitude: 0.0,
                    longitude: 0.0,
                    address: "123 Main St, City".to_string(),
                }),
            })
            .await
            .unwrap();

        assert_eq!(result.labours[0].labour.id, "labour-2");
        assert!(result.labours[0].score > result.labours[1].score);
    }
}
