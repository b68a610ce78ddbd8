use anyhow::Result;
use async_trait::async_trait;
use csv::{Reader, Writer};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::str::FromStr;
use std::sync::Arc;

use super::connection::CsvConnection;
use crate::domain::models::resident::Resident;
use crate::storage::traits::ResidentStorage;
use shared::TodayStatus;

/// CSV-based resident repository, one service-wide file.
#[derive(Clone)]
pub struct ResidentRepository {
    connection: CsvConnection,
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl ResidentRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            connection,
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn read_residents(&self) -> Result<Vec<Resident>> {
        self.connection.ensure_residents_file_exists()?;

        let file = File::open(self.connection.residents_file_path())?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut residents = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            residents.push(Resident {
                user_id: record.get(0).unwrap_or("").to_string(),
                username: record.get(1).unwrap_or("").to_string(),
                user_address: record.get(2).unwrap_or("").to_string(),
                contact: record.get(3).unwrap_or("").to_string(),
                street: record.get(4).unwrap_or("").to_string(),
                latitude: record.get(5).unwrap_or("0").parse::<f64>().unwrap_or(0.0),
                longitude: record.get(6).unwrap_or("0").parse::<f64>().unwrap_or(0.0),
                today_status: TodayStatus::from_str(record.get(7).unwrap_or(""))
                    .unwrap_or_default(),
            });
        }

        Ok(residents)
    }

    fn write_residents(&self, residents: &[Resident]) -> Result<()> {
        let file_path = self.connection.residents_file_path();
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let writer = BufWriter::new(file);
            let mut csv_writer = Writer::from_writer(writer);

            csv_writer.write_record([
                "user_id",
                "username",
                "user_address",
                "contact",
                "street",
                "latitude",
                "longitude",
                "today_status",
            ])?;

            for resident in residents {
                let latitude = resident.latitude.to_string();
                let longitude = resident.longitude.to_string();
                let today_status = resident.today_status.to_string();
                csv_writer.write_record([
                    resident.user_id.as_str(),
                    resident.username.as_str(),
                    resident.user_address.as_str(),
                    resident.contact.as_str(),
                    resident.street.as_str(),
                    latitude.as_str(),
                    longitude.as_str(),
                    today_status.as_str(),
                ])?;
            }

            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;
        Ok(())
    }
}

#[async_trait]
impl ResidentStorage for ResidentRepository {
    async fn upsert_resident(&self, resident: &Resident) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut residents = self.read_residents()?;
        residents.retain(|r| r.user_id != resident.user_id);
        residents.push(resident.clone());
        self.write_residents(&residents)
    }

    async fn get_resident(&self, user_id: &str) -> Result<Option<Resident>> {
        Ok(self
            .read_residents()?
            .into_iter()
            .find(|r| r.user_id == user_id))
    }

    async fn list_by_street(&self, street: &str) -> Result<Vec<Resident>> {
        Ok(self
            .read_residents()?
            .into_iter()
            .filter(|r| r.street.eq_ignore_ascii_case(street))
            .collect())
    }
}
