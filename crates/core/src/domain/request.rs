use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::employee::EmployeeId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
    NeedsInfo,
    LateSubmission,
    InsufficientBalance,
}

impl RequestStatus {
    /// No further business transition is defined out of these states.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Approved | Self::Denied | Self::LateSubmission | Self::InsufficientBalance
        )
    }

    /// A manager status edit only fires from here; edits against any other
    /// state are ignored, so an already-approved request cannot have its
    /// balance deduction applied twice.
    pub fn accepts_manager_edit(&self) -> bool {
        matches!(self, Self::Pending | Self::NeedsInfo)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::NeedsInfo => "needs_info",
            Self::LateSubmission => "late_submission",
            Self::InsufficientBalance => "insufficient_balance",
        };
        write!(f, "{value}")
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            "needs_info" => Ok(Self::NeedsInfo),
            "late_submission" => Ok(Self::LateSubmission),
            "insufficient_balance" => Ok(Self::InsufficientBalance),
            other => Err(format!("unknown request status `{other}`")),
        }
    }
}

/// Absence-type bucket deciding which lead-time rule applies. The type field
/// is free text, so classification is a case-insensitive substring match;
/// the vacation match wins when both would hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbsenceClass {
    Vacation,
    Sick,
    Unclassified,
}

impl AbsenceClass {
    pub fn classify(absence_type: &str) -> Self {
        let normalized = absence_type.to_ascii_lowercase();
        if normalized.contains("vacation") || normalized.contains("personal") {
            Self::Vacation
        } else if normalized.contains("sick") {
            Self::Sick
        } else {
            Self::Unclassified
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PtoRequest {
    pub id: RequestId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub absence_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hours_requested: Decimal,
    pub status: RequestStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub decision_at: Option<DateTime<Utc>>,
}

impl PtoRequest {
    pub fn absence_class(&self) -> AbsenceClass {
        AbsenceClass::classify(&self.absence_type)
    }
}

/// Submission event payload. The id and hours are optional at intake: a
/// missing id is assigned on acceptance and missing hours resolve to zero,
/// which the ledger treats as invalid for balance operations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestIntake {
    pub request_id: Option<RequestId>,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub absence_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hours_requested: Option<Decimal>,
}

impl RequestIntake {
    pub fn into_request(self, submitted_at: DateTime<Utc>) -> PtoRequest {
        PtoRequest {
            id: self.request_id.unwrap_or_else(RequestId::generate),
            employee_id: self.employee_id,
            employee_name: self.employee_name,
            absence_type: self.absence_type,
            start_date: self.start_date,
            end_date: self.end_date,
            hours_requested: self.hours_requested.unwrap_or(Decimal::ZERO),
            status: RequestStatus::Pending,
            submitted_at: Some(submitted_at),
            decision_at: None,
        }
    }
}
