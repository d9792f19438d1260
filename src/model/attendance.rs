use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shift length used only when the server omits hours worked and the local
/// timestamps cannot be recovered either. Legacy placeholder carried over
/// from the original portal.
pub const DEFAULT_SHIFT_HOURS: f64 = 8.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub working_hours: Option<f64>,
    pub status: PresenceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PresenceStatus {
    Present,
    Absent,
}

/// Server acknowledgement for a check-in. The timestamp is optional; the
/// client falls back to its own clock when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckInAck {
    pub check_in_time: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckOutAck {
    pub check_out_time: Option<DateTime<Utc>>,
    pub hours_worked: Option<f64>,
    pub message: Option<String>,
}

/// Authoritative session state as reported by `GET …/attendance/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendanceStatus {
    pub checked_in: bool,
    pub check_in_time: Option<DateTime<Utc>>,
}
