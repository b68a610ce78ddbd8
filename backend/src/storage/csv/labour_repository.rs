use anyhow::Result;
use async_trait::async_trait;
use csv::{Reader, Writer};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::sync::Arc;

use super::connection::CsvConnection;
use crate::domain::models::labour::Labour;
use crate::storage::traits::LabourStorage;

/// Separator for the working-area list within a single CSV field.
const AREA_SEPARATOR: char = ';';

/// CSV-based labour repository, one file per incharger.
#[derive(Clone)]
pub struct LabourRepository {
    connection: CsvConnection,
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl LabourRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            connection,
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn parse_coordinate(raw: &str) -> Option<f64> {
        if raw.is_empty() {
            None
        } else {
            raw.parse::<f64>().ok()
        }
    }

    /// Read all labours for an incharger from their CSV file.
    fn read_labours(&self, incharger_id: &str) -> Result<Vec<Labour>> {
        self.connection.ensure_labours_file_exists(incharger_id)?;

        let file_path = self.connection.labours_file_path(incharger_id);
        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut labours = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let working_areas: Vec<String> = record
                .get(3)
                .unwrap_or("")
                .split(AREA_SEPARATOR)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            labours.push(Labour {
                id: record.get(0).unwrap_or("").to_string(),
                name: record.get(1).unwrap_or("").to_string(),
                phone_number: record.get(2).unwrap_or("").to_string(),
                working_areas,
                office: record.get(4).unwrap_or("").to_string(),
                incharger_id: record.get(5).unwrap_or("").to_string(),
                incharger_name: record.get(6).unwrap_or("").to_string(),
                incharger_phone: record.get(7).unwrap_or("").to_string(),
                last_latitude: Self::parse_coordinate(record.get(8).unwrap_or("")),
                last_longitude: Self::parse_coordinate(record.get(9).unwrap_or("")),
            });
        }

        Ok(labours)
    }

    /// Write all labours for an incharger to their CSV file, atomically.
    fn write_labours(&self, incharger_id: &str, labours: &[Labour]) -> Result<()> {
        self.connection.ensure_labours_file_exists(incharger_id)?;

        let file_path = self.connection.labours_file_path(incharger_id);
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
                "id",
                "name",
                "phone_number",
                "working_areas",
                "office",
                "incharger_id",
                "incharger_name",
                "incharger_phone",
                "last_latitude",
                "last_longitude",
            ])?;

            for labour in labours {
                let areas = labour
                    .working_areas
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(&AREA_SEPARATOR.to_string());
                let latitude = labour.last_latitude.map(|v| v.to_string()).unwrap_or_default();
                let longitude = labour.last_longitude.map(|v| v.to_string()).unwrap_or_default();
                csv_writer.write_record([
                    labour.id.as_str(),
                    labour.name.as_str(),
                    labour.phone_number.as_str(),
                    areas.as_str(),
                    labour.office.as_str(),
                    labour.incharger_id.as_str(),
                    labour.incharger_name.as_str(),
                    labour.incharger_phone.as_str(),
                    latitude.as_str(),
                    longitude.as_str(),
                ])?;
            }

            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;
        Ok(())
    }
}

#[async_trait]
impl LabourStorage for LabourRepository {
    async fn store_labour(&self, labour: &Labour) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut labours = self.read_labours(&labour.incharger_id)?;
        labours.retain(|l| l.id != labour.id);
        labours.push(labour.clone());
        self.write_labours(&labour.incharger_id, &labours)
    }

    async fn get_labour(&self, incharger_id: &str, labour_id: &str) -> Result<Option<Labour>> {
        Ok(self
            .read_labours(incharger_id)?
            .into_iter()
            .find(|l| l.id == labour_id))
    }

    async fn list_labours(&self, incharger_id: &str) -> Result<Vec<Labour>> {
        let mut labours = self.read_labours(incharger_id)?;
        labours.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(labours)
    }
}
