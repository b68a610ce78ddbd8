use serde::{Deserialize, Serialize};
use shared::TodayStatus;

/// A resident on a street with their self-reported readiness flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resident {
    pub user_id: String,
    pub username: String,
    pub user_address: String,
    pub contact: String,
    pub street: String,
    pub latitude: f64,
    pub longitude: f64,
    pub today_status: TodayStatus,
}

impl Resident {
    /// Residents counted by the ready-for-collection gauge.
    pub fn is_ready(&self) -> bool {
        self.today_status == TodayStatus::Yes
    }
}
