use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub status: EnrollmentStatus,
    pub enrolled_on: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Active,
    Cancelled,
}

/// Outcome of applying a lifecycle transition to an enrollment status.
/// Repeated calls in the same or a terminal state must be no-ops so
/// notifications are never double-fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed(EnrollmentStatus),
    AlreadyThere,
    Refused,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(EnrollmentStatus::Pending),
            "active" => Some(EnrollmentStatus::Active),
            "cancelled" => Some(EnrollmentStatus::Cancelled),
            _ => None,
        }
    }

    /// A live enrollment blocks re-enrollment in the same course.
    pub fn is_live(&self) -> bool {
        matches!(self, EnrollmentStatus::Pending | EnrollmentStatus::Active)
    }

    /// Guarded edge: pending -> active. Activating an active enrollment
    /// is a no-op; a cancelled one cannot come back.
    pub fn activate(&self) -> Transition {
        match self {
            EnrollmentStatus::Pending => Transition::Changed(EnrollmentStatus::Active),
            EnrollmentStatus::Active => Transition::AlreadyThere,
            EnrollmentStatus::Cancelled => Transition::Refused,
        }
    }

    /// Guarded edge: any live state -> cancelled. Cancelling twice is a
    /// no-op; re-enrollment after cancellation creates a new row.
    pub fn cancel(&self) -> Transition {
        match self {
            EnrollmentStatus::Cancelled => Transition::AlreadyThere,
            _ => Transition::Changed(EnrollmentStatus::Cancelled),
        }
    }
}
