use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{AllotmentStatus, TodayStatus};
use uuid::Uuid;

/// One resident's pickup record, embedded in its allotment. A point never
/// outlives the allotment that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionPoint {
    pub user_id: String,
    pub username: String,
    pub user_address: String,
    pub contact: String,
    pub latitude: f64,
    pub longitude: f64,
    pub today_status: TodayStatus,
    pub labour_collected: bool,
    pub collection_confirmed: bool,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl CollectionPoint {
    /// Whether this point counts toward the aggregate status. A confirmed
    /// point had its readiness flag flipped to NO, so the flag alone cannot
    /// tell us it once read YES.
    pub fn qualifies(&self) -> bool {
        self.today_status == TodayStatus::Yes || self.collection_confirmed
    }
}

/// One labour's assignment to one street for one calendar date and time slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allotment {
    pub id: String,
    pub incharger_id: String,
    pub incharger_name: String,
    pub labour_id: String,
    pub labour_name: String,
    pub labour_phone_number: String,
    pub street: String,
    pub date: NaiveDate,
    pub time: String,
    pub status: AllotmentStatus,
    pub location_data: Vec<CollectionPoint>,
    pub complaint_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub collected_at: Option<DateTime<Utc>>,
}

/// How long a collected allotment stays visible in a labour's pending view.
pub const COLLECTED_VISIBILITY_HOURS: i64 = 24;

impl Allotment {
    pub fn generate_id() -> String {
        format!("allot-{}", Uuid::new_v4())
    }

    /// Confirm one resident's pickup: stamp the point, flip its readiness
    /// flag to NO, then derive the aggregate status. Confirming an already
    /// confirmed point, or any point of a collected allotment, is a no-op.
    pub fn confirm_point(
        &mut self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AllotmentStatus, AllotmentError> {
        if self.status.is_terminal() {
            return Ok(self.status);
        }

        let point = self
            .location_data
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or_else(|| AllotmentError::PointNotFound {
                allotment_id: self.id.clone(),
                user_id: user_id.to_string(),
            })?;

        if !point.collection_confirmed {
            point.collection_confirmed = true;
            point.labour_collected = true;
            point.acknowledged_at = Some(now);
            point.today_status = TodayStatus::No;
        }

        self.recompute_status(now);
        self.updated_at = now;
        Ok(self.status)
    }

    /// Force the allotment closed regardless of per-point state.
    pub fn finalize(&mut self, now: DateTime<Utc>) -> AllotmentStatus {
        if !self.status.is_terminal() {
            self.status = AllotmentStatus::Collected;
            self.collected_at = Some(now);
            self.updated_at = now;
        }
        self.status
    }

    /// Derive the aggregate status from the qualifying points: all confirmed
    /// means Collected, a strict subset means PendingAcknowledgment, none
    /// leaves the allotment Pending.
    fn recompute_status(&mut self, now: DateTime<Utc>) {
        let qualifying = self.location_data.iter().filter(|p| p.qualifies()).count();
        if qualifying == 0 {
            return;
        }
        let confirmed = self
            .location_data
            .iter()
            .filter(|p| p.qualifies() && p.collection_confirmed)
            .count();

        if confirmed == qualifying {
            self.status = AllotmentStatus::Collected;
            if self.collected_at.is_none() {
                self.collected_at = Some(now);
            }
        } else if confirmed > 0 {
            self.status = AllotmentStatus::PendingAcknowledgment;
        }
    }

    /// A live allotment blocks re-allotting the same (labour, street, date).
    pub fn is_live(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Pending views show live allotments plus recently collected ones.
    pub fn visible_to_labour(&self, now: DateTime<Utc>) -> bool {
        if self.is_live() {
            return true;
        }
        match self.collected_at {
            Some(at) => now - at <= Duration::hours(COLLECTED_VISIBILITY_HOURS),
            None => false,
        }
    }

    /// Composite-key match used by the remove operation.
    pub fn matches_composite_key(
        &self,
        incharger_id: &str,
        labour_id: &str,
        street: &str,
        date: NaiveDate,
    ) -> bool {
        self.incharger_id == incharger_id
            && self.labour_id == labour_id
            && self.street.eq_ignore_ascii_case(street)
            && self.date == date
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AllotmentError {
    #[error("Labour already allotted for this date and time: {street} on {date} ({time})")]
    AlreadyAllotted {
        street: String,
        date: NaiveDate,
        time: String,
    },
    #[error("Labour or incharger not found")]
    LabourNotFound,
    #[error("Allotment not found: {0}")]
    NotFound(String),
    #[error("Collection point not found for user {user_id} in allotment {allotment_id}")]
    PointNotFound {
        allotment_id: String,
        user_id: String,
    },
    #[error("{0}")]
    Validation(String),
}
