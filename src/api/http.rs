use crate::api::{
    DashboardSummary, NotificationQuery, Page, PageQuery, PortalApi, TaskQuery,
};
use crate::config::Config;
use crate::error::PortalError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, CheckInAck, CheckOutAck};
use crate::model::kyc::KycAssistanceRequest;
use crate::model::notification::Notification;
use crate::model::resource::ResourceKind;
use crate::model::role::PortalRole;
use crate::model::task::Task;
use crate::routes;
use crate::utils::local_store::{LocalStore, keys};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Thin wrapper over `reqwest` scoped to the portal's base URL.
///
/// The bearer token is read from the local store at send time, not bound at
/// construction, so a token refreshed between calls is picked up
/// automatically. No retry, no backoff: errors propagate to the caller.
pub struct PortalClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    store: Arc<dyn LocalStore>,
}

impl PortalClient {
    pub fn new(config: &Config, store: Arc<dyn LocalStore>) -> Self {
        Self {
            http: Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
            store,
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T, PortalError> {
        let url = format!("{}{}", self.base_url, path);
        let request_id = Uuid::new_v4().to_string();

        let mut req = self
            .http
            .request(method, &url)
            .timeout(self.timeout)
            .header("x-request-id", &request_id);
        if let Some(token) = self.store.get(keys::AUTH_TOKEN) {
            req = req.bearer_auth(token);
        }
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if !status.is_success() {
            // The backend reports failures as {"message": ...} (sometimes
            // {"error": ...}); fall back to a generic string.
            let message = resp
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| {
                    v.get("message")
                        .or_else(|| v.get("error"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| format!("request to {path} failed"));
            tracing::debug!(status = status.as_u16(), path, request_id, "Request rejected");
            return Err(PortalError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = resp.bytes().await?;
        let value: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Deserialize)]
struct CountDto {
    #[serde(alias = "unreadCount", alias = "updated")]
    count: u64,
}

/// Live implementation of [`PortalApi`] against the REST backend, scoped to
/// one portal role's namespace.
pub struct HttpApi {
    client: PortalClient,
    namespace: &'static str,
    recipient: &'static str,
    user_id: u64,
}

impl HttpApi {
    pub fn new(client: PortalClient, role: PortalRole, user_id: u64) -> Self {
        Self {
            client,
            namespace: routes::api_namespace(role),
            recipient: role.recipient_segment(),
            user_id,
        }
    }

    fn ns(&self, path: &str) -> String {
        format!("{}{}", self.namespace, path)
    }

    fn inbox(&self, suffix: &str) -> String {
        format!("/notifications/{}/{}{}", self.recipient, self.user_id, suffix)
    }
}

fn page_params(page: PageQuery, out: &mut Vec<(&'static str, String)>) {
    if let Some(p) = page.page {
        out.push(("page", p.to_string()));
    }
    if let Some(pp) = page.per_page {
        out.push(("per_page", pp.to_string()));
    }
}

#[async_trait]
impl PortalApi for HttpApi {
    async fn check_in(&self) -> Result<CheckInAck, PortalError> {
        self.client
            .request(Method::POST, &self.ns("/attendance/check-in"), &[], None)
            .await
    }

    async fn check_out(&self) -> Result<CheckOutAck, PortalError> {
        self.client
            .request(Method::POST, &self.ns("/attendance/check-out"), &[], None)
            .await
    }

    async fn attendance_status(&self) -> Result<AttendanceStatus, PortalError> {
        self.client
            .request(Method::GET, &self.ns("/attendance/status"), &[], None)
            .await
    }

    async fn attendance_history(
        &self,
        page: PageQuery,
    ) -> Result<Page<AttendanceRecord>, PortalError> {
        let mut query = Vec::new();
        page_params(page, &mut query);
        self.client
            .request(Method::GET, &self.ns("/attendance/history"), &query, None)
            .await
    }

    async fn tasks(&self, q: TaskQuery) -> Result<Page<Task>, PortalError> {
        let mut query = Vec::new();
        if let Some(status) = q.status {
            query.push(("status", status.to_string()));
        }
        page_params(q.page, &mut query);
        self.client
            .request(Method::GET, &self.ns("/tasks"), &query, None)
            .await
    }

    async fn start_task(&self, id: u64) -> Result<Task, PortalError> {
        self.client
            .request(Method::POST, &self.ns(&format!("/tasks/{id}/start")), &[], None)
            .await
    }

    async fn complete_task(&self, id: u64) -> Result<Task, PortalError> {
        self.client
            .request(
                Method::POST,
                &self.ns(&format!("/tasks/{id}/complete")),
                &[],
                None,
            )
            .await
    }

    async fn kyc_queue(&self) -> Result<Vec<KycAssistanceRequest>, PortalError> {
        let page: Page<KycAssistanceRequest> = self
            .client
            .request(Method::GET, &self.ns("/kyc-assistance"), &[], None)
            .await?;
        Ok(page.data)
    }

    async fn assist_kyc(&self, id: u64, notes: Option<&str>) -> Result<(), PortalError> {
        let _: Value = self
            .client
            .request(
                Method::POST,
                &self.ns(&format!("/kyc-assistance/{id}/assist")),
                &[],
                Some(json!({ "notes": notes })),
            )
            .await?;
        Ok(())
    }

    async fn notifications(
        &self,
        q: NotificationQuery,
    ) -> Result<Page<Notification>, PortalError> {
        let mut query = Vec::new();
        if let Some(status) = q.status {
            query.push(("status", status.to_string()));
        }
        if let Some(kind) = q.kind {
            query.push(("type", kind.to_string()));
        }
        if let Some(search) = &q.search {
            query.push(("search", search.clone()));
        }
        page_params(q.page, &mut query);
        self.client
            .request(Method::GET, &self.inbox(""), &query, None)
            .await
    }

    async fn unread_count(&self) -> Result<u64, PortalError> {
        let dto: CountDto = self
            .client
            .request(Method::GET, &self.inbox("/unread/count"), &[], None)
            .await?;
        Ok(dto.count)
    }

    async fn mark_read(&self, id: u64) -> Result<(), PortalError> {
        let _: Value = self
            .client
            .request(
                Method::PATCH,
                &format!("/notifications/{id}/read"),
                &[],
                None,
            )
            .await?;
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<u64, PortalError> {
        let dto: CountDto = self
            .client
            .request(Method::PATCH, &self.inbox("/mark-all-read"), &[], None)
            .await?;
        Ok(dto.count)
    }

    async fn archive_notification(&self, id: u64) -> Result<(), PortalError> {
        let _: Value = self
            .client
            .request(
                Method::PATCH,
                &format!("/notifications/{id}/archive"),
                &[],
                None,
            )
            .await?;
        Ok(())
    }

    async fn delete_notification(&self, id: u64) -> Result<(), PortalError> {
        let _: Value = self
            .client
            .request(Method::DELETE, &format!("/notifications/{id}"), &[], None)
            .await?;
        Ok(())
    }

    async fn dashboard_summary(&self) -> Result<DashboardSummary, PortalError> {
        self.client
            .request(Method::GET, &self.ns("/dashboard/summary"), &[], None)
            .await
    }

    async fn resource_list(
        &self,
        kind: ResourceKind,
        page: PageQuery,
    ) -> Result<Page<Value>, PortalError> {
        let mut query = Vec::new();
        page_params(page, &mut query);
        self.client
            .request(Method::GET, &self.ns(&kind.path()), &query, None)
            .await
    }
}
