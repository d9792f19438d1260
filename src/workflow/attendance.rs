use crate::api::{Page, PageQuery, PortalApi};
use crate::error::PortalError;
use crate::model::attendance::{AttendanceRecord, DEFAULT_SHIFT_HOURS};
use crate::utils::local_store::{LocalStore, keys};
use crate::workflow::ActionOutcome;
use crate::workflow::confirm::Confirm;
use crate::workflow::toast::Notifier;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Client-side view of the attendance session.
#[derive(Debug, Clone, Default)]
pub struct AttendanceView {
    pub checked_in: bool,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
}

/// Attendance check-in/check-out state machine.
///
/// CHECKED_OUT -> CHECKED_IN on a successful check-in call, back to
/// CHECKED_OUT on a confirmed check-out. The server stays authoritative:
/// `refresh` reconciles from `GET …/attendance/status`, and the local marker
/// is only a same-session reload fallback. Nothing is mutated optimistically,
/// so a failed call needs no rollback.
pub struct AttendanceSession {
    api: Arc<dyn PortalApi>,
    marker: Arc<dyn LocalStore>,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    state: Mutex<AttendanceView>,
    checking_in: AtomicBool,
    checking_out: AtomicBool,
}

impl AttendanceSession {
    pub fn new(
        api: Arc<dyn PortalApi>,
        marker: Arc<dyn LocalStore>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            api,
            marker,
            notifier,
            confirm,
            state: Mutex::new(AttendanceView::default()),
            checking_in: AtomicBool::new(false),
            checking_out: AtomicBool::new(false),
        }
    }

    pub fn view(&self) -> AttendanceView {
        self.state.lock().unwrap().clone()
    }

    /// Start the day's session. Skipped when a session is already open or a
    /// check-in request is still in flight; no duplicate request leaves the
    /// client.
    pub async fn check_in(&self) -> Result<ActionOutcome, PortalError> {
        if self.view().checked_in {
            return Ok(ActionOutcome::Skipped);
        }
        if self
            .checking_in
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(ActionOutcome::Skipped);
        }

        let result = self.api.check_in().await;
        self.checking_in.store(false, Ordering::SeqCst);

        match result {
            Ok(ack) => {
                let ts = ack.check_in_time.unwrap_or_else(Utc::now);
                {
                    let mut state = self.state.lock().unwrap();
                    state.checked_in = true;
                    state.check_in_time = Some(ts);
                    state.check_out_time = None;
                }
                self.marker.set(keys::CHECK_IN_TIME, &ts.to_rfc3339());
                self.notifier
                    .success(&format!("Checked in at {}", ts.format("%H:%M")));
                Ok(ActionOutcome::Done)
            }
            Err(e) => {
                self.notifier.error(&format!("Check-in failed: {e}"));
                Err(e)
            }
        }
    }

    /// End the session. Requires explicit confirmation; declining leaves
    /// every timestamp untouched.
    pub async fn check_out(&self) -> Result<ActionOutcome, PortalError> {
        let view = self.view();
        if !view.checked_in {
            return Ok(ActionOutcome::Skipped);
        }
        if !self
            .confirm
            .confirm("Check out and end your attendance session for today?")
        {
            return Ok(ActionOutcome::Skipped);
        }
        if self
            .checking_out
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(ActionOutcome::Skipped);
        }

        let result = self.api.check_out().await;
        self.checking_out.store(false, Ordering::SeqCst);

        match result {
            Ok(ack) => {
                let out_ts = ack.check_out_time.unwrap_or_else(Utc::now);
                // Hours: server value first, else derived from the two
                // timestamps, else the legacy shift constant.
                let hours = ack
                    .hours_worked
                    .or_else(|| {
                        view.check_in_time
                            .map(|cin| (out_ts - cin).num_seconds() as f64 / 3600.0)
                    })
                    .unwrap_or(DEFAULT_SHIFT_HOURS);
                {
                    let mut state = self.state.lock().unwrap();
                    state.checked_in = false;
                    state.check_in_time = None;
                    state.check_out_time = Some(out_ts);
                }
                self.marker.remove(keys::CHECK_IN_TIME);
                self.notifier.success(&format!(
                    "Checked out. Worked {} hours",
                    format_hours(hours)
                ));
                Ok(ActionOutcome::Done)
            }
            Err(e) => {
                self.notifier.error(&format!("Check-out failed: {e}"));
                Err(e)
            }
        }
    }

    /// Reconcile against the server. When the server is unreachable the
    /// stored marker stands in, so a reload mid-session does not show the
    /// user as checked out.
    pub async fn refresh(&self) -> Result<AttendanceView, PortalError> {
        match self.api.attendance_status().await {
            Ok(status) => {
                {
                    let mut state = self.state.lock().unwrap();
                    state.checked_in = status.checked_in;
                    state.check_in_time = status.check_in_time;
                }
                match (status.checked_in, status.check_in_time) {
                    (true, Some(ts)) => self.marker.set(keys::CHECK_IN_TIME, &ts.to_rfc3339()),
                    _ => self.marker.remove(keys::CHECK_IN_TIME),
                }
                Ok(self.view())
            }
            Err(e) if e.is_connectivity() => {
                tracing::warn!(error = %e, "Attendance status unreachable, using stored session marker");
                let stored = self
                    .marker
                    .get(keys::CHECK_IN_TIME)
                    .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                    .map(|dt| dt.with_timezone(&Utc));
                {
                    let mut state = self.state.lock().unwrap();
                    state.checked_in = stored.is_some();
                    state.check_in_time = stored;
                }
                Ok(self.view())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn history(&self, page: PageQuery) -> Result<Page<AttendanceRecord>, PortalError> {
        self.api.attendance_history(page).await
    }
}

fn format_hours(hours: f64) -> String {
    if (hours - hours.round()).abs() < 0.05 {
        format!("{:.0}", hours.round())
    } else {
        format!("{hours:.1}")
    }
}
