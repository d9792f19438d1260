pub mod fixtures;
pub mod http;

use crate::error::PortalError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, CheckInAck, CheckOutAck};
use crate::model::kyc::KycAssistanceRequest;
use crate::model::notification::{Notification, NotificationKind, NotificationStatus};
use crate::model::resource::ResourceKind;
use crate::model::task::{Task, TaskStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Paginated list shape returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: i64,
}

impl<T> Page<T> {
    pub fn of(data: Vec<T>) -> Self {
        let total = data.len() as i64;
        Self {
            data,
            page: 1,
            per_page: total.max(1) as u32,
            total,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub page: PageQuery,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationQuery {
    pub status: Option<NotificationStatus>,
    pub kind: Option<NotificationKind>,
    pub search: Option<String>,
    pub page: PageQuery,
}

impl NotificationQuery {
    /// True when any server-side filter narrows the result, in which case
    /// the returned page says nothing about the global unread count.
    pub fn is_filtered(&self) -> bool {
        self.status.is_some() || self.kind.is_some() || self.search.is_some()
    }
}

/// Aggregate counters shown on the dashboard header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardSummary {
    pub tasks_pending: u64,
    pub tasks_completed: u64,
    pub kyc_pending: u64,
    pub kyc_assisted_today: u64,
    pub unread_notifications: u64,
}

/// The portal's data source. One method per REST operation; implemented by
/// [`http::HttpApi`] for the live backend and [`fixtures::FixtureApi`] for
/// offline/demo mode. Which one runs is a configuration decision, never
/// inferred from an error.
#[async_trait]
pub trait PortalApi: Send + Sync {
    // Attendance
    async fn check_in(&self) -> Result<CheckInAck, PortalError>;
    async fn check_out(&self) -> Result<CheckOutAck, PortalError>;
    async fn attendance_status(&self) -> Result<AttendanceStatus, PortalError>;
    async fn attendance_history(
        &self,
        page: PageQuery,
    ) -> Result<Page<AttendanceRecord>, PortalError>;

    // Tasks
    async fn tasks(&self, query: TaskQuery) -> Result<Page<Task>, PortalError>;
    async fn start_task(&self, id: u64) -> Result<Task, PortalError>;
    async fn complete_task(&self, id: u64) -> Result<Task, PortalError>;

    // KYC assistance
    async fn kyc_queue(&self) -> Result<Vec<KycAssistanceRequest>, PortalError>;
    async fn assist_kyc(&self, id: u64, notes: Option<&str>) -> Result<(), PortalError>;

    // Notifications
    async fn notifications(
        &self,
        query: NotificationQuery,
    ) -> Result<Page<Notification>, PortalError>;
    async fn unread_count(&self) -> Result<u64, PortalError>;
    async fn mark_read(&self, id: u64) -> Result<(), PortalError>;
    async fn mark_all_read(&self) -> Result<u64, PortalError>;
    async fn archive_notification(&self, id: u64) -> Result<(), PortalError>;
    async fn delete_notification(&self, id: u64) -> Result<(), PortalError>;

    // Dashboard
    async fn dashboard_summary(&self) -> Result<DashboardSummary, PortalError>;
    async fn resource_list(
        &self,
        kind: ResourceKind,
        page: PageQuery,
    ) -> Result<Page<Value>, PortalError>;
}
