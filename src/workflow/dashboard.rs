use crate::api::{DashboardSummary, Page, PortalApi};
use crate::error::PortalError;
use crate::model::resource::ResourceKind;
use crate::routes::Badge;
use crate::store::ReadCache;
use crate::workflow::kyc::KycQueue;
use crate::workflow::notifications::NotificationCenter;
use crate::workflow::tasks::TaskBoard;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Aggregates the role's queues plus the summary counters, and owns the read
/// cache for the plain display resources. After a mutating action the caller
/// runs `refresh_all` and everything converges on the server's view in one
/// parallel round-trip.
pub struct Dashboard {
    api: Arc<dyn PortalApi>,
    cache: ReadCache,
    summary: Mutex<DashboardSummary>,
    pub tasks: Arc<TaskBoard>,
    pub kyc: Arc<KycQueue>,
    pub notifications: Arc<NotificationCenter>,
}

impl Dashboard {
    pub fn new(
        api: Arc<dyn PortalApi>,
        cache_ttl: Duration,
        tasks: Arc<TaskBoard>,
        kyc: Arc<KycQueue>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            api,
            cache: ReadCache::new(cache_ttl),
            summary: Mutex::new(DashboardSummary::default()),
            tasks,
            kyc,
            notifications,
        }
    }

    pub fn summary(&self) -> DashboardSummary {
        self.summary.lock().unwrap().clone()
    }

    /// Refresh summary counters and all three queues in parallel.
    pub async fn refresh_all(&self) -> Result<(), PortalError> {
        let (summary, tasks, kyc, notifications) = futures::join!(
            self.api.dashboard_summary(),
            self.tasks.refresh(),
            self.kyc.refresh(),
            self.notifications.refresh(),
        );
        *self.summary.lock().unwrap() = summary?;
        tasks?;
        kyc?;
        notifications?;
        Ok(())
    }

    /// Live value behind a menu badge.
    pub fn badge(&self, badge: Badge) -> u64 {
        match badge {
            Badge::UnreadNotifications => self.notifications.unread(),
            Badge::PendingTasks => self.tasks.pending_count(),
            Badge::PendingKyc => self.kyc.pending_count(),
        }
    }

    /// Cached first page of a display resource.
    pub async fn resource(&self, kind: ResourceKind) -> Result<Arc<Page<Value>>, PortalError> {
        self.cache.resource(self.api.as_ref(), kind).await
    }

    pub async fn invalidate(&self, kind: ResourceKind) {
        self.cache.invalidate(kind).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fixtures::FixtureApi;
    use crate::workflow::confirm::AutoConfirm;
    use crate::workflow::toast::BufferedNotifier;

    fn dashboard() -> Dashboard {
        let api: Arc<FixtureApi> = Arc::new(FixtureApi::seeded());
        let notifier = Arc::new(BufferedNotifier::new());
        let tasks = Arc::new(TaskBoard::new(api.clone(), notifier.clone()));
        let kyc = Arc::new(KycQueue::new(
            api.clone(),
            notifier.clone(),
            Arc::new(AutoConfirm),
        ));
        let notifications = Arc::new(NotificationCenter::new(
            api.clone(),
            notifier,
            Duration::from_millis(300),
        ));
        Dashboard::new(api, Duration::from_secs(60), tasks, kyc, notifications)
    }

    #[tokio::test]
    async fn refresh_all_populates_badges_and_summary() {
        let dash = dashboard();
        dash.refresh_all().await.unwrap();

        assert_eq!(dash.badge(Badge::PendingTasks), 1);
        assert_eq!(dash.badge(Badge::PendingKyc), 2);
        assert_eq!(dash.badge(Badge::UnreadNotifications), 2);

        let summary = dash.summary();
        assert_eq!(summary.tasks_pending, 1);
        assert_eq!(summary.unread_notifications, 2);
    }

    #[tokio::test]
    async fn badges_follow_queue_mutations_after_refresh() {
        let dash = dashboard();
        dash.refresh_all().await.unwrap();

        dash.kyc.assist(7, None).await.unwrap();
        assert_eq!(dash.badge(Badge::PendingKyc), 1);

        dash.tasks.start(5).await.unwrap();
        assert_eq!(dash.badge(Badge::PendingTasks), 0);
    }

    #[tokio::test]
    async fn resources_come_from_the_cache() {
        let dash = dashboard();
        let beds = dash.resource(ResourceKind::Beds).await.unwrap();
        assert_eq!(beds.data.len(), 2);
    }
}
