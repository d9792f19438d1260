use crate::api::{
    DashboardSummary, NotificationQuery, Page, PageQuery, PortalApi, TaskQuery,
};
use crate::error::PortalError;
use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, CheckInAck, CheckOutAck, PresenceStatus,
};
use crate::model::kyc::{KycAssistanceRequest, KycStatus};
use crate::model::notification::{
    Notification, NotificationKind, NotificationPriority, NotificationStatus,
};
use crate::model::resource::ResourceKind;
use crate::model::task::{Task, TaskPriority, TaskStatus};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn bad_request(message: &str) -> PortalError {
    PortalError::Http {
        status: 400,
        message: message.to_string(),
    }
}

fn not_found(message: &str) -> PortalError {
    PortalError::Http {
        status: 404,
        message: message.to_string(),
    }
}

struct FixtureState {
    open_session: Option<DateTime<Utc>>,
    history: Vec<AttendanceRecord>,
    tasks: Vec<Task>,
    kyc: Vec<KycAssistanceRequest>,
    notifications: Vec<Notification>,
    next_id: u64,
}

/// Fixture implementation of [`PortalApi`] serving seeded in-memory data.
///
/// This is the explicit offline/demo data source (the old silent mock
/// fallback, promoted to a first-class implementation). Lifecycle rules are
/// enforced the same way the backend enforces them, so workflows behave
/// identically against it. Latency and offline toggles exist so failure
/// paths can be exercised without a network.
pub struct FixtureApi {
    state: Mutex<FixtureState>,
    offline: AtomicBool,
    latency: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl FixtureApi {
    pub fn seeded() -> Self {
        let now = Utc::now();
        Self {
            state: Mutex::new(FixtureState {
                open_session: None,
                history: Vec::new(),
                tasks: vec![
                    Task {
                        id: 5,
                        title: "Restock saline in ward B".to_string(),
                        description: Some("Supply room reported 4 units left".to_string()),
                        priority: TaskPriority::High,
                        status: TaskStatus::Pending,
                        count: Some(4),
                        category: Some("supplies".to_string()),
                        due_date: None,
                    },
                    Task {
                        id: 6,
                        title: "Prepare discharge summary for bed 12".to_string(),
                        description: None,
                        priority: TaskPriority::Medium,
                        status: TaskStatus::InProgress,
                        count: None,
                        category: Some("paperwork".to_string()),
                        due_date: None,
                    },
                    Task {
                        id: 7,
                        title: "Calibrate infusion pump".to_string(),
                        description: None,
                        priority: TaskPriority::Low,
                        status: TaskStatus::Completed,
                        count: None,
                        category: Some("equipment".to_string()),
                        due_date: None,
                    },
                ],
                kyc: vec![
                    KycAssistanceRequest {
                        id: 7,
                        patient: "Arjun Mehta".to_string(),
                        patient_id: 301,
                        documents: vec!["passport".to_string(), "insurance-card".to_string()],
                        submitted_date: now - ChronoDuration::hours(3),
                        status: KycStatus::Pending,
                    },
                    KycAssistanceRequest {
                        id: 9,
                        patient: "Lena Fischer".to_string(),
                        patient_id: 305,
                        documents: vec!["id-card".to_string()],
                        submitted_date: now - ChronoDuration::hours(1),
                        status: KycStatus::Pending,
                    },
                ],
                notifications: vec![
                    Notification {
                        id: 1,
                        title: "Appointment rescheduled".to_string(),
                        message: "Dr. Rao moved the 10:30 slot to 11:15".to_string(),
                        kind: NotificationKind::Appointment,
                        priority: NotificationPriority::High,
                        status: NotificationStatus::Unread,
                        created_at: now - ChronoDuration::minutes(40),
                        read_at: None,
                    },
                    Notification {
                        id: 2,
                        title: "KYC documents submitted".to_string(),
                        message: "Arjun Mehta uploaded 2 documents".to_string(),
                        kind: NotificationKind::Kyc,
                        priority: NotificationPriority::Medium,
                        status: NotificationStatus::Read,
                        created_at: now - ChronoDuration::hours(2),
                        read_at: Some(now - ChronoDuration::hours(1)),
                    },
                    Notification {
                        id: 3,
                        title: "System maintenance tonight".to_string(),
                        message: "Portal unavailable 02:00-02:30".to_string(),
                        kind: NotificationKind::System,
                        priority: NotificationPriority::Low,
                        status: NotificationStatus::Archived,
                        created_at: now - ChronoDuration::days(1),
                        read_at: Some(now - ChronoDuration::days(1)),
                    },
                    Notification {
                        id: 4,
                        title: "New task assigned".to_string(),
                        message: "Restock saline in ward B".to_string(),
                        kind: NotificationKind::Task,
                        priority: NotificationPriority::Urgent,
                        status: NotificationStatus::Unread,
                        created_at: now - ChronoDuration::minutes(5),
                        read_at: None,
                    },
                ],
                next_id: 100,
            }),
            offline: AtomicBool::new(false),
            latency: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Simulate a server-side session already open since `since`.
    pub fn with_open_session(self, since: DateTime<Utc>) -> Self {
        self.state.lock().unwrap().open_session = Some(since);
        self
    }

    /// Delay every operation, mimicking a slow link.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every operation fail with a connectivity error until switched
    /// back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Operations observed so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn observe(&self, op: &str) -> Result<(), PortalError> {
        self.calls.lock().unwrap().push(op.to_string());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(PortalError::Connectivity("fixture offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PortalApi for FixtureApi {
    async fn check_in(&self) -> Result<CheckInAck, PortalError> {
        self.observe("check_in").await?;
        let mut state = self.state.lock().unwrap();
        if state.open_session.is_some() {
            return Err(bad_request("Already checked in today"));
        }
        let now = Utc::now();
        state.open_session = Some(now);
        Ok(CheckInAck {
            check_in_time: Some(now),
            message: Some("Checked in successfully".to_string()),
        })
    }

    async fn check_out(&self) -> Result<CheckOutAck, PortalError> {
        self.observe("check_out").await?;
        let mut state = self.state.lock().unwrap();
        let Some(check_in) = state.open_session.take() else {
            return Err(bad_request("No active check-in found for today"));
        };
        let now = Utc::now();
        let hours = (now - check_in).num_seconds() as f64 / 3600.0;
        let id = state.next_id;
        state.next_id += 1;
        state.history.push(AttendanceRecord {
            id,
            employee_id: 7,
            check_in_time: check_in,
            check_out_time: Some(now),
            working_hours: Some(hours),
            status: PresenceStatus::Present,
        });
        Ok(CheckOutAck {
            check_out_time: Some(now),
            hours_worked: Some(hours),
            message: Some("Checked out successfully".to_string()),
        })
    }

    async fn attendance_status(&self) -> Result<AttendanceStatus, PortalError> {
        self.observe("attendance_status").await?;
        let state = self.state.lock().unwrap();
        Ok(AttendanceStatus {
            checked_in: state.open_session.is_some(),
            check_in_time: state.open_session,
        })
    }

    async fn attendance_history(
        &self,
        _page: PageQuery,
    ) -> Result<Page<AttendanceRecord>, PortalError> {
        self.observe("attendance_history").await?;
        let state = self.state.lock().unwrap();
        Ok(Page::of(state.history.clone()))
    }

    async fn tasks(&self, query: TaskQuery) -> Result<Page<Task>, PortalError> {
        self.observe("tasks").await?;
        let state = self.state.lock().unwrap();
        let data = state
            .tasks
            .iter()
            .filter(|t| query.status.is_none_or(|s| t.status == s))
            .cloned()
            .collect();
        Ok(Page::of(data))
    }

    async fn start_task(&self, id: u64) -> Result<Task, PortalError> {
        self.observe("start_task").await?;
        let mut state = self.state.lock().unwrap();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("Task not found"))?;
        if task.status != TaskStatus::Pending {
            return Err(bad_request("Task is not pending"));
        }
        task.status = TaskStatus::InProgress;
        Ok(task.clone())
    }

    async fn complete_task(&self, id: u64) -> Result<Task, PortalError> {
        self.observe("complete_task").await?;
        let mut state = self.state.lock().unwrap();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("Task not found"))?;
        if task.status != TaskStatus::InProgress {
            return Err(bad_request("Task is not in progress"));
        }
        task.status = TaskStatus::Completed;
        Ok(task.clone())
    }

    async fn kyc_queue(&self) -> Result<Vec<KycAssistanceRequest>, PortalError> {
        self.observe("kyc_queue").await?;
        let state = self.state.lock().unwrap();
        Ok(state
            .kyc
            .iter()
            .filter(|k| k.status != KycStatus::Assisted)
            .cloned()
            .collect())
    }

    async fn assist_kyc(&self, id: u64, _notes: Option<&str>) -> Result<(), PortalError> {
        self.observe("assist_kyc").await?;
        let mut state = self.state.lock().unwrap();
        let item = state
            .kyc
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or_else(|| not_found("KYC request not found"))?;
        if item.status == KycStatus::Assisted {
            return Err(bad_request("Request already assisted"));
        }
        item.status = KycStatus::Assisted;
        Ok(())
    }

    async fn notifications(
        &self,
        query: NotificationQuery,
    ) -> Result<Page<Notification>, PortalError> {
        self.observe("notifications").await?;
        let state = self.state.lock().unwrap();
        let needle = query.search.as_deref().map(str::to_lowercase);
        let data = state
            .notifications
            .iter()
            .filter(|n| query.status.is_none_or(|s| n.status == s))
            .filter(|n| query.kind.is_none_or(|k| n.kind == k))
            .filter(|n| {
                needle.as_deref().is_none_or(|q| {
                    n.title.to_lowercase().contains(q) || n.message.to_lowercase().contains(q)
                })
            })
            .cloned()
            .collect();
        Ok(Page::of(data))
    }

    async fn unread_count(&self) -> Result<u64, PortalError> {
        self.observe("unread_count").await?;
        let state = self.state.lock().unwrap();
        Ok(state.notifications.iter().filter(|n| n.is_unread()).count() as u64)
    }

    async fn mark_read(&self, id: u64) -> Result<(), PortalError> {
        self.observe("mark_read").await?;
        let mut state = self.state.lock().unwrap();
        let item = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| not_found("Notification not found"))?;
        if item.status == NotificationStatus::Unread {
            item.status = NotificationStatus::Read;
            item.read_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<u64, PortalError> {
        self.observe("mark_all_read").await?;
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let mut updated = 0;
        for n in state.notifications.iter_mut() {
            if n.status == NotificationStatus::Unread {
                n.status = NotificationStatus::Read;
                n.read_at = Some(now);
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn archive_notification(&self, id: u64) -> Result<(), PortalError> {
        self.observe("archive_notification").await?;
        let mut state = self.state.lock().unwrap();
        let item = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| not_found("Notification not found"))?;
        item.status = NotificationStatus::Archived;
        Ok(())
    }

    async fn delete_notification(&self, id: u64) -> Result<(), PortalError> {
        self.observe("delete_notification").await?;
        let mut state = self.state.lock().unwrap();
        let before = state.notifications.len();
        state.notifications.retain(|n| n.id != id);
        if state.notifications.len() == before {
            return Err(not_found("Notification not found"));
        }
        Ok(())
    }

    async fn dashboard_summary(&self) -> Result<DashboardSummary, PortalError> {
        self.observe("dashboard_summary").await?;
        let state = self.state.lock().unwrap();
        Ok(DashboardSummary {
            tasks_pending: state
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Pending)
                .count() as u64,
            tasks_completed: state
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Completed)
                .count() as u64,
            kyc_pending: state
                .kyc
                .iter()
                .filter(|k| k.status != KycStatus::Assisted)
                .count() as u64,
            kyc_assisted_today: state
                .kyc
                .iter()
                .filter(|k| k.status == KycStatus::Assisted)
                .count() as u64,
            unread_notifications: state.notifications.iter().filter(|n| n.is_unread()).count()
                as u64,
        })
    }

    async fn resource_list(
        &self,
        kind: ResourceKind,
        _page: PageQuery,
    ) -> Result<Page<Value>, PortalError> {
        self.observe("resource_list").await?;
        let rows = match kind {
            ResourceKind::Patients => vec![
                json!({"id": 301, "name": "Arjun Mehta", "age": 52, "ward": "B"}),
                json!({"id": 305, "name": "Lena Fischer", "age": 34, "ward": "A"}),
            ],
            ResourceKind::Doctors => vec![
                json!({"id": 12, "name": "Dr. Rao", "speciality": "cardiology"}),
            ],
            ResourceKind::Appointments => vec![
                json!({"id": 88, "patientId": 301, "doctorId": 12, "slot": "11:15"}),
            ],
            ResourceKind::Billing => vec![
                json!({"id": 501, "patientId": 305, "amount": 420.0, "status": "due"}),
            ],
            ResourceKind::Medicines => vec![
                json!({"id": 71, "name": "Saline 0.9%", "stock": 4}),
                json!({"id": 72, "name": "Paracetamol 500mg", "stock": 230}),
            ],
            ResourceKind::Beds => vec![
                json!({"id": 12, "ward": "B", "occupied": true}),
                json!({"id": 13, "ward": "B", "occupied": false}),
            ],
            ResourceKind::Vitals => vec![
                json!({"patientId": 301, "bp": "130/85", "pulse": 78}),
            ],
            ResourceKind::EmergencyAlerts => Vec::new(),
        };
        Ok(Page::of(rows))
    }
}
