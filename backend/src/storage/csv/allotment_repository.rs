use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use super::connection::CsvConnection;
use crate::domain::models::allotment::{Allotment, AllotmentError};
use crate::storage::traits::AllotmentStorage;

/// File-backed allotment repository: one YAML document per allotment under
/// the owning incharger's directory.
#[derive(Clone)]
pub struct AllotmentRepository {
    connection: CsvConnection,
    /// Serializes create/remove scans so duplicate detection cannot race a
    /// concurrent write of the same composite key.
    scan_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AllotmentRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            connection,
            scan_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn allotment_file_path(&self, incharger_id: &str, allotment_id: &str) -> PathBuf {
        self.connection
            .allotments_directory(incharger_id)
            .join(format!("{}.yaml", CsvConnection::safe_name(allotment_id)))
    }

    /// Load one allotment document, skipping unreadable files with a warning
    /// rather than failing the whole scan.
    fn read_allotment(path: &Path) -> Option<Allotment> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Skipping unreadable allotment file {:?}: {}", path, e);
                return None;
            }
        };
        match serde_yaml::from_str(&contents) {
            Ok(allotment) => Some(allotment),
            Err(e) => {
                warn!("Skipping malformed allotment file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Atomic write using a temp file beside the target.
    fn write_allotment(&self, allotment: &Allotment) -> Result<()> {
        self.connection
            .ensure_allotments_directory_exists(&allotment.incharger_id)?;

        let file_path = self.allotment_file_path(&allotment.incharger_id, &allotment.id);
        let temp_path = file_path.with_extension("tmp");

        let contents = serde_yaml::to_string(allotment)
            .with_context(|| format!("Failed to serialize allotment {}", allotment.id))?;
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, &file_path)?;

        Ok(())
    }

    /// All allotment documents under one incharger's directory.
    fn allotments_in_directory(dir: &Path) -> Result<Vec<Allotment>> {
        let allotments_dir = dir.join("allotments");
        if !allotments_dir.exists() {
            return Ok(Vec::new());
        }

        let mut allotments = Vec::new();
        for entry in fs::read_dir(&allotments_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "yaml") {
                if let Some(allotment) = Self::read_allotment(&path) {
                    allotments.push(allotment);
                }
            }
        }
        Ok(allotments)
    }

    /// Scan every incharger directory for allotment documents.
    fn all_allotments(&self) -> Result<Vec<Allotment>> {
        let mut allotments = Vec::new();
        for dir in self.connection.incharger_directories()? {
            allotments.extend(Self::allotments_in_directory(&dir)?);
        }
        Ok(allotments)
    }

    fn find_live_duplicate(
        &self,
        labour_id: &str,
        street: &str,
        date: NaiveDate,
    ) -> Result<Option<Allotment>> {
        Ok(self.all_allotments()?.into_iter().find(|a| {
            a.is_live()
                && a.labour_id == labour_id
                && a.street.eq_ignore_ascii_case(street)
                && a.date == date
        }))
    }
}

#[async_trait]
impl AllotmentStorage for AllotmentRepository {
    async fn create_allotment(&self, allotment: &Allotment) -> Result<()> {
        let _guard = self.scan_lock.lock().await;

        if let Some(existing) =
            self.find_live_duplicate(&allotment.labour_id, &allotment.street, allotment.date)?
        {
            return Err(AllotmentError::AlreadyAllotted {
                street: existing.street,
                date: existing.date,
                time: existing.time,
            }
            .into());
        }

        self.write_allotment(allotment)
    }

    async fn get_allotment(&self, allotment_id: &str) -> Result<Option<Allotment>> {
        for dir in self.connection.incharger_directories()? {
            let path = dir
                .join("allotments")
                .join(format!("{}.yaml", CsvConnection::safe_name(allotment_id)));
            if path.exists() {
                return Ok(Self::read_allotment(&path));
            }
        }
        Ok(None)
    }

    async fn save_allotment(&self, allotment: &Allotment) -> Result<()> {
        let file_path = self.allotment_file_path(&allotment.incharger_id, &allotment.id);
        if !file_path.exists() {
            return Err(AllotmentError::NotFound(allotment.id.clone()).into());
        }
        self.write_allotment(allotment)
    }

    async fn find_by_labour(&self, labour_id: &str) -> Result<Vec<Allotment>> {
        let now = Utc::now();
        let mut allotments: Vec<Allotment> = self
            .all_allotments()?
            .into_iter()
            .filter(|a| a.labour_id == labour_id && a.visible_to_labour(now))
            .collect();
        allotments.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(allotments)
    }

    async fn find_by_labour_and_date(
        &self,
        labour_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Allotment>> {
        Ok(self
            .all_allotments()?
            .into_iter()
            .filter(|a| a.labour_id == labour_id && a.date == date)
            .collect())
    }

    async fn find_by_street_and_incharger(
        &self,
        street: &str,
        incharger_id: &str,
    ) -> Result<Vec<Allotment>> {
        let dir = self.connection.incharger_directory(incharger_id);
        Ok(Self::allotments_in_directory(&dir)?
            .into_iter()
            .filter(|a| a.street.eq_ignore_ascii_case(street))
            .collect())
    }

    async fn find_by_incharger(&self, incharger_id: &str) -> Result<Vec<Allotment>> {
        let dir = self.connection.incharger_directory(incharger_id);
        let mut allotments = Self::allotments_in_directory(&dir)?;
        allotments.sort_by(|a, b| a.date.cmp(&b.date).then(a.street.cmp(&b.street)));
        Ok(allotments)
    }

    async fn remove_by_composite_key(
        &self,
        incharger_id: &str,
        labour_id: &str,
        street: &str,
        date: NaiveDate,
    ) -> Result<Vec<Allotment>> {
        let _guard = self.scan_lock.lock().await;

        let dir = self.connection.incharger_directory(incharger_id);
        let mut removed = Vec::new();
        for allotment in Self::allotments_in_directory(&dir)? {
            if allotment.matches_composite_key(incharger_id, labour_id, street, date) {
                let path = self.allotment_file_path(incharger_id, &allotment.id);
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove allotment {}", allotment.id))?;
                removed.push(allotment);
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shared::{AllotmentStatus, TodayStatus};
    use tempfile::TempDir;

    use crate::domain::models::allotment::CollectionPoint;

    fn setup() -> (AllotmentRepository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = CsvConnection::new(temp_dir.path()).expect("Failed to create connection");
        (AllotmentRepository::new(connection), temp_dir)
    }

    fn sample_point(user_id: &str) -> CollectionPoint {
        CollectionPoint {
            user_id: user_id.to_string(),
            username: "Asha".to_string(),
            user_address: "12 Elm St".to_string(),
            contact: "9876543210".to_string(),
            latitude: 12.97,
            longitude: 77.59,
            today_status: TodayStatus::Yes,
            labour_collected: false,
            collection_confirmed: false,
            acknowledged_at: None,
        }
    }

    fn sample_allotment(labour_id: &str, street: &str, date: NaiveDate) -> Allotment {
        let now = Utc::now();
        Allotment {
            id: Allotment::generate_id(),
            incharger_id: "incharger-1".to_string(),
            incharger_name: "Meera".to_string(),
            labour_id: labour_id.to_string(),
            labour_name: "Suresh".to_string(),
            labour_phone_number: "9000000001".to_string(),
            street: street.to_string(),
            date,
            time: "9:00 AM - 3:00 PM".to_string(),
            status: AllotmentStatus::Pending,
            location_data: vec![sample_point("user-1")],
            complaint_id: None,
            created_at: now,
            updated_at: now,
            collected_at: None,
        }
    }

    fn june_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let (repo, _guard) = setup();
        let allotment = sample_allotment("labour-1", "Elm St", june_first());

        repo.create_allotment(&allotment).await.expect("create failed");
        let loaded = repo
            .get_allotment(&allotment.id)
            .await
            .expect("get failed")
            .expect("allotment missing");
        assert_eq!(loaded, allotment);
    }

    #[tokio::test]
    async fn duplicate_live_allotment_is_a_conflict() {
        let (repo, _guard) = setup();
        let first = sample_allotment("labour-1", "Elm St", june_first());
        repo.create_allotment(&first).await.expect("create failed");

        let second = sample_allotment("labour-1", "Elm St", june_first());
        let err = repo.create_allotment(&second).await.unwrap_err();
        match err.downcast_ref::<AllotmentError>() {
            Some(AllotmentError::AlreadyAllotted { street, date, time }) => {
                assert_eq!(street, "Elm St");
                assert_eq!(*date, june_first());
                assert_eq!(time, "9:00 AM - 3:00 PM");
            }
            other => panic!("Expected AlreadyAllotted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn collected_allotment_does_not_block_reallotting() {
        let (repo, _guard) = setup();
        let mut first = sample_allotment("labour-1", "Elm St", june_first());
        first.status = AllotmentStatus::Collected;
        first.collected_at = Some(Utc::now());
        repo.create_allotment(&first).await.expect("create failed");

        let second = sample_allotment("labour-1", "Elm St", june_first());
        repo.create_allotment(&second)
            .await
            .expect("re-allotting over collected work should succeed");
    }

    #[tokio::test]
    async fn different_street_or_date_is_not_a_conflict() {
        let (repo, _guard) = setup();
        repo.create_allotment(&sample_allotment("labour-1", "Elm St", june_first()))
            .await
            .unwrap();
        repo.create_allotment(&sample_allotment("labour-1", "Oak Ave", june_first()))
            .await
            .unwrap();
        repo.create_allotment(&sample_allotment(
            "labour-1",
            "Elm St",
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
        ))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn remove_by_composite_key_is_idempotent() {
        let (repo, _guard) = setup();
        let allotment = sample_allotment("labour-1", "Elm St", june_first());
        repo.create_allotment(&allotment).await.unwrap();

        let removed = repo
            .remove_by_composite_key("incharger-1", "labour-1", "Elm St", june_first())
            .await
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, allotment.id);

        let removed_again = repo
            .remove_by_composite_key("incharger-1", "labour-1", "Elm St", june_first())
            .await
            .unwrap();
        assert!(removed_again.is_empty());
    }

    #[tokio::test]
    async fn find_by_labour_hides_old_collected_work() {
        let (repo, _guard) = setup();

        let live = sample_allotment("labour-1", "Elm St", june_first());
        repo.create_allotment(&live).await.unwrap();

        let mut fresh = sample_allotment("labour-1", "Oak Ave", june_first());
        fresh.status = AllotmentStatus::Collected;
        fresh.collected_at = Some(Utc::now() - Duration::hours(2));
        repo.create_allotment(&fresh).await.unwrap();

        let mut stale = sample_allotment("labour-1", "Pine Rd", june_first());
        stale.status = AllotmentStatus::Collected;
        stale.collected_at = Some(Utc::now() - Duration::hours(30));
        repo.create_allotment(&stale).await.unwrap();

        let visible = repo.find_by_labour("labour-1").await.unwrap();
        let streets: Vec<&str> = visible.iter().map(|a| a.street.as_str()).collect();
        assert!(streets.contains(&"Elm St"));
        assert!(streets.contains(&"Oak Ave"));
        assert!(!streets.contains(&"Pine Rd"));
    }

    #[tokio::test]
    async fn save_updates_existing_document() {
        let (repo, _guard) = setup();
        let mut allotment = sample_allotment("labour-1", "Elm St", june_first());
        repo.create_allotment(&allotment).await.unwrap();

        allotment.confirm_point("user-1", Utc::now()).unwrap();
        repo.save_allotment(&allotment).await.unwrap();

        let loaded = repo.get_allotment(&allotment.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, AllotmentStatus::Collected);
    }

    #[tokio::test]
    async fn save_of_unknown_allotment_is_not_found() {
        let (repo, _guard) = setup();
        let allotment = sample_allotment("labour-1", "Elm St", june_first());
        let err = repo.save_allotment(&allotment).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AllotmentError>(),
            Some(AllotmentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn street_listing_is_scoped_to_incharger() {
        let (repo, _guard) = setup();
        repo.create_allotment(&sample_allotment("labour-1", "Elm St", june_first()))
            .await
            .unwrap();

        let mut other = sample_allotment("labour-2", "Elm St", june_first());
        other.incharger_id = "incharger-2".to_string();
        repo.create_allotment(&other).await.unwrap();

        let mine = repo
            .find_by_street_and_incharger("elm st", "incharger-1")
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].labour_id, "labour-1");
    }
}
