use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A collection worker. Owned by exactly one incharger at a time; the
/// incharger's name and phone are denormalized for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labour {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    /// Street names this labour covers
    pub working_areas: Vec<String>,
    pub office: String,
    pub incharger_id: String,
    pub incharger_name: String,
    pub incharger_phone: String,
    pub last_latitude: Option<f64>,
    pub last_longitude: Option<f64>,
}

impl Labour {
    pub fn generate_id() -> String {
        format!("labour-{}", Uuid::new_v4())
    }

    /// Case-insensitive substring check of any working area against an
    /// address string.
    pub fn covers_address(&self, address: &str) -> bool {
        let address = address.to_lowercase();
        self.working_areas.iter().any(|area| {
            let area = area.trim().to_lowercase();
            !area.is_empty() && address.contains(&area)
        })
    }

    /// Exact (case-insensitive) street membership, used when validating an
    /// allotment's street against the supervised set.
    pub fn covers_street(&self, street: &str) -> bool {
        self.working_areas
            .iter()
            .any(|area| area.trim().eq_ignore_ascii_case(street.trim()))
    }
}
