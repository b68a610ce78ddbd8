use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an allotment.
///
/// Parsed case-insensitively so the ad hoc variants the mobile clients send
/// ("pending", "collected") normalize to one canonical form at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllotmentStatus {
    /// Created, no resident confirmed yet
    Pending,
    /// Some but not all qualifying residents confirmed
    PendingAcknowledgment,
    /// Every qualifying resident confirmed, or force-closed
    Collected,
}

impl AllotmentStatus {
    /// A collected allotment accepts no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AllotmentStatus::Collected)
    }
}

impl fmt::Display for AllotmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AllotmentStatus::Pending => "Pending",
            AllotmentStatus::PendingAcknowledgment => "PendingAcknowledgment",
            AllotmentStatus::Collected => "Collected",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AllotmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "pending" => Ok(AllotmentStatus::Pending),
            "pendingacknowledgment" | "pendingacknowledgement" => {
                Ok(AllotmentStatus::PendingAcknowledgment)
            }
            "collected" => Ok(AllotmentStatus::Collected),
            _ => Err(format!("Unknown allotment status: {}", s)),
        }
    }
}

/// Resident's self-reported daily readiness flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodayStatus {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl Default for TodayStatus {
    fn default() -> Self {
        TodayStatus::NotApplicable
    }
}

impl fmt::Display for TodayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TodayStatus::Yes => "YES",
            TodayStatus::No => "NO",
            TodayStatus::NotApplicable => "N/A",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TodayStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "YES" => Ok(TodayStatus::Yes),
            "NO" => Ok(TodayStatus::No),
            "N/A" | "NA" | "" => Ok(TodayStatus::NotApplicable),
            _ => Err(format!("Unknown today status: {}", s)),
        }
    }
}

/// One resident's pickup record within an allotment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPoint {
    pub user_id: String,
    pub username: String,
    pub user_address: String,
    pub contact: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub today_status: TodayStatus,
    #[serde(default)]
    pub labour_collected: bool,
    #[serde(default)]
    pub collection_confirmed: bool,
    /// RFC 3339 timestamp set when the resident's pickup was confirmed
    #[serde(default)]
    pub acknowledged_at: Option<String>,
}

/// One labour's assignment to one street for one date and time slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allotment {
    pub id: String,
    pub incharger_id: String,
    pub incharger_name: String,
    pub labour_id: String,
    pub labour_name: String,
    pub labour_phone_number: String,
    pub street: String,
    /// Calendar date in YYYY-MM-DD
    pub date: String,
    /// Named slot, e.g. "9:00 AM - 3:00 PM"
    pub time: String,
    pub status: AllotmentStatus,
    pub location_data: Vec<CollectionPoint>,
    /// Present when the allotment originated from a resident complaint
    pub complaint_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub collected_at: Option<String>,
}

/// A collection worker registered under one incharger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Labour {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub labour_working_area: Vec<String>,
    pub office: String,
    pub incharger_id: String,
    pub incharger_name: String,
    pub incharger_phone: String,
    pub last_latitude: Option<f64>,
    pub last_longitude: Option<f64>,
}

/// A resident on a street, with their readiness flag for today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub user_id: String,
    pub username: String,
    pub user_address: String,
    pub contact: String,
    pub street: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub today_status: TodayStatus,
}

/// A labour plus their advisory suitability score for a complaint site.
/// Recomputed per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuitabilityCandidate {
    pub labour: Labour,
    pub suitability_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllotWorkRequest {
    /// Field name matches the mobile client's payload
    #[serde(rename = "labourid")]
    pub labour_id: String,
    pub street: String,
    pub date: String,
    pub time: String,
    /// Ignored unless it normalizes to Pending; new allotments always start Pending
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub location_data: Vec<CollectionPoint>,
    #[serde(default)]
    pub complaint_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmCollectionRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcknowledgeCollectionRequest {
    #[serde(rename = "allotmentId")]
    pub allotment_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterLabourRequest {
    pub name: String,
    pub phone_number: String,
    pub labour_working_area: Vec<String>,
    pub office: String,
    pub incharger_name: String,
    pub incharger_phone: String,
    #[serde(default)]
    pub last_latitude: Option<f64>,
    #[serde(default)]
    pub last_longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResidentRequest {
    pub username: String,
    pub user_address: String,
    pub contact: String,
    pub street: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    pub today_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllotWorkResponse {
    pub success: bool,
    pub message: String,
    pub allotment: Allotment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveWorkResponse {
    pub success: bool,
    pub message: String,
    pub removed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionUpdateResponse {
    pub success: bool,
    pub message: String,
    pub allotment: Allotment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllotmentListResponse {
    pub allotments: Vec<Allotment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnallocatedLabourResponse {
    pub labours: Vec<SuitabilityCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YesCountResponse {
    pub street: String,
    pub yes_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabourResponse {
    pub labour: Labour,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabourListResponse {
    pub labours: Vec<Labour>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentResponse {
    pub resident: Resident,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
