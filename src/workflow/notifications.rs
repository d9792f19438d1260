use crate::api::{NotificationQuery, PortalApi};
use crate::error::PortalError;
use crate::model::notification::{Notification, NotificationKind, NotificationStatus};
use crate::utils::debounce::Debouncer;
use crate::utils::poll::Poller;
use crate::workflow::toast::Notifier;
use crate::workflow::{ActionOutcome, ViewState};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct CenterState {
    view: ViewState<Notification>,
    unread: u64,
    query: NotificationQuery,
    applied_seq: u64,
}

/// Notification inbox: unread -> read -> archived, deletion terminal from
/// any state. Filters and search run server-side; the search box is
/// debounced so typing does not issue a request per keystroke. Unread counts
/// arrive by polling, guarded against out-of-order responses.
pub struct NotificationCenter {
    api: Arc<dyn PortalApi>,
    notifier: Arc<dyn Notifier>,
    debouncer: Debouncer,
    state: Mutex<CenterState>,
    poll_seq: AtomicU64,
}

impl NotificationCenter {
    pub fn new(
        api: Arc<dyn PortalApi>,
        notifier: Arc<dyn Notifier>,
        search_debounce: Duration,
    ) -> Self {
        Self {
            api,
            notifier,
            debouncer: Debouncer::new(search_debounce),
            state: Mutex::new(CenterState {
                view: ViewState::Loading,
                unread: 0,
                query: NotificationQuery::default(),
                applied_seq: 0,
            }),
            poll_seq: AtomicU64::new(0),
        }
    }

    pub fn list(&self) -> ViewState<Notification> {
        self.state.lock().unwrap().view.clone()
    }

    pub fn unread(&self) -> u64 {
        self.state.lock().unwrap().unread
    }

    pub async fn refresh(&self) -> Result<(), PortalError> {
        let query = self.state.lock().unwrap().query.clone();
        let filtered = query.is_filtered();
        match self.api.notifications(query).await {
            Ok(page) => {
                let unread = page.data.iter().filter(|n| n.is_unread()).count() as u64;
                self.state.lock().unwrap().view = ViewState::Loaded(page.data);
                // Only an unfiltered page reflects the whole inbox, and even
                // then the badge write goes through the same sequence gate
                // as the poller so it cannot undo a fresher count.
                if !filtered {
                    let seq = self.poll_seq.fetch_add(1, Ordering::SeqCst) + 1;
                    self.apply_unread(seq, unread);
                }
                Ok(())
            }
            Err(e) => {
                self.state.lock().unwrap().view = ViewState::Failed(e.to_string());
                self.notifier
                    .error(&format!("Could not load notifications: {e}"));
                Err(e)
            }
        }
    }

    /// Change status/type filters and reload immediately (filters are a
    /// deliberate click, unlike keystrokes).
    pub async fn apply_filter(
        &self,
        status: Option<NotificationStatus>,
        kind: Option<NotificationKind>,
    ) -> Result<(), PortalError> {
        {
            let mut state = self.state.lock().unwrap();
            state.query.status = status;
            state.query.kind = kind;
        }
        self.refresh().await
    }

    /// Update the search term; the actual reload fires after the debounce
    /// window, and only for the last term typed.
    pub fn search(self: &Arc<Self>, term: impl Into<String>) {
        let term = term.into();
        {
            let mut state = self.state.lock().unwrap();
            state.query.search = if term.is_empty() { None } else { Some(term) };
        }
        let center = Arc::downgrade(self);
        self.debouncer.call(move || async move {
            if let Some(center) = center.upgrade() {
                let _ = center.refresh().await;
            }
        });
    }

    /// Mark one notification read. Only that item changes; marking an
    /// already-read item again sends nothing.
    pub async fn mark_read(&self, id: u64) -> Result<ActionOutcome, PortalError> {
        {
            let state = self.state.lock().unwrap();
            let unread = state
                .view
                .items()
                .iter()
                .any(|n| n.id == id && n.is_unread());
            if !unread {
                return Ok(ActionOutcome::Skipped);
            }
        }

        self.api.mark_read(id).await?;

        let mut state = self.state.lock().unwrap();
        if let ViewState::Loaded(items) = &mut state.view {
            if let Some(item) = items.iter_mut().find(|n| n.id == id) {
                item.status = NotificationStatus::Read;
                if item.read_at.is_none() {
                    item.read_at = Some(Utc::now());
                }
            }
        }
        state.unread = state.unread.saturating_sub(1);
        Ok(ActionOutcome::Done)
    }

    /// Open the detail view; the first open of an unread item marks it read.
    pub async fn open(&self, id: u64) -> Result<Option<Notification>, PortalError> {
        let exists = {
            let state = self.state.lock().unwrap();
            state.view.items().iter().any(|n| n.id == id)
        };
        if !exists {
            return Ok(None);
        }
        self.mark_read(id).await?;
        let state = self.state.lock().unwrap();
        Ok(state.view.items().iter().find(|n| n.id == id).cloned())
    }

    /// One server call, then mirror the transition onto every local unread
    /// item. Archived items and existing read stamps are untouched.
    pub async fn mark_all_read(&self) -> Result<u64, PortalError> {
        let updated = self.api.mark_all_read().await?;
        let now = Utc::now();

        let mut state = self.state.lock().unwrap();
        if let ViewState::Loaded(items) = &mut state.view {
            for item in items.iter_mut() {
                if item.is_unread() {
                    item.status = NotificationStatus::Read;
                    item.read_at = Some(now);
                }
            }
        }
        state.unread = 0;
        Ok(updated)
    }

    pub async fn archive(&self, id: u64) -> Result<ActionOutcome, PortalError> {
        let was_unread = {
            let state = self.state.lock().unwrap();
            match state.view.items().iter().find(|n| n.id == id) {
                Some(item) => item.is_unread(),
                None => return Ok(ActionOutcome::Skipped),
            }
        };

        self.api.archive_notification(id).await?;

        let mut state = self.state.lock().unwrap();
        if let ViewState::Loaded(items) = &mut state.view {
            if let Some(item) = items.iter_mut().find(|n| n.id == id) {
                item.status = NotificationStatus::Archived;
            }
        }
        if was_unread {
            state.unread = state.unread.saturating_sub(1);
        }
        Ok(ActionOutcome::Done)
    }

    pub async fn delete(&self, id: u64) -> Result<ActionOutcome, PortalError> {
        let was_unread = {
            let state = self.state.lock().unwrap();
            match state.view.items().iter().find(|n| n.id == id) {
                Some(item) => item.is_unread(),
                None => return Ok(ActionOutcome::Skipped),
            }
        };

        self.api.delete_notification(id).await?;

        let mut state = self.state.lock().unwrap();
        if let ViewState::Loaded(items) = &mut state.view {
            items.retain(|n| n.id != id);
        }
        if was_unread {
            state.unread = state.unread.saturating_sub(1);
        }
        Ok(ActionOutcome::Done)
    }

    /// Single poll tick for the badge count. Each tick takes a sequence
    /// number before the request leaves; a response is applied only if no
    /// newer tick has landed, so a slow response cannot overwrite a fresher
    /// count.
    pub async fn poll_unread_once(&self) {
        let seq = self.poll_seq.fetch_add(1, Ordering::SeqCst) + 1;
        match self.api.unread_count().await {
            Ok(count) => self.apply_unread(seq, count),
            Err(e) => tracing::debug!(error = %e, "Unread count poll failed"),
        }
    }

    fn apply_unread(&self, seq: u64, count: u64) {
        let mut state = self.state.lock().unwrap();
        if seq > state.applied_seq {
            state.unread = count;
            state.applied_seq = seq;
        }
    }

    /// Badge poller tied to this center's lifetime: dropping the returned
    /// handle aborts the task, so nothing writes into a dropped view.
    pub fn spawn_unread_poller(self: &Arc<Self>, interval: Duration, jitter: Duration) -> Poller {
        let center = Arc::downgrade(self);
        Poller::spawn(interval, jitter, move || {
            let center = center.clone();
            async move {
                if let Some(center) = center.upgrade() {
                    center.poll_unread_once().await;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fixtures::FixtureApi;
    use crate::workflow::toast::BufferedNotifier;

    fn center() -> (Arc<FixtureApi>, Arc<NotificationCenter>) {
        let api = Arc::new(FixtureApi::seeded());
        let center = Arc::new(NotificationCenter::new(
            api.clone(),
            Arc::new(BufferedNotifier::new()),
            Duration::from_millis(300),
        ));
        (api, center)
    }

    #[tokio::test]
    async fn mark_read_touches_only_that_item() {
        let (_api, center) = center();
        center.refresh().await.unwrap();
        assert_eq!(center.unread(), 2);

        center.mark_read(1).await.unwrap();

        let items = center.list().items().to_vec();
        let one = items.iter().find(|n| n.id == 1).unwrap();
        assert_eq!(one.status, NotificationStatus::Read);
        assert!(one.read_at.is_some());

        let four = items.iter().find(|n| n.id == 4).unwrap();
        assert_eq!(four.status, NotificationStatus::Unread);
        assert_eq!(center.unread(), 1);
    }

    #[tokio::test]
    async fn marking_read_twice_sends_one_request() {
        let (api, center) = center();
        center.refresh().await.unwrap();

        assert_eq!(center.mark_read(1).await.unwrap(), ActionOutcome::Done);
        assert_eq!(center.mark_read(1).await.unwrap(), ActionOutcome::Skipped);
        assert_eq!(
            api.calls().iter().filter(|c| *c == "mark_read").count(),
            1
        );
    }

    #[tokio::test]
    async fn mark_all_read_skips_archived_and_keeps_old_stamps() {
        let (_api, center) = center();
        center.refresh().await.unwrap();

        let old_stamp = center
            .list()
            .items()
            .iter()
            .find(|n| n.id == 2)
            .unwrap()
            .read_at;

        let updated = center.mark_all_read().await.unwrap();
        assert_eq!(updated, 2);
        assert_eq!(center.unread(), 0);

        let items = center.list().items().to_vec();
        assert!(
            items
                .iter()
                .filter(|n| n.id != 3)
                .all(|n| n.status == NotificationStatus::Read)
        );
        // Archived item untouched, previously-read stamp unchanged.
        assert_eq!(
            items.iter().find(|n| n.id == 3).unwrap().status,
            NotificationStatus::Archived
        );
        assert_eq!(items.iter().find(|n| n.id == 2).unwrap().read_at, old_stamp);
    }

    #[tokio::test]
    async fn opening_an_unread_item_marks_it_read_once() {
        let (api, center) = center();
        center.refresh().await.unwrap();

        let opened = center.open(4).await.unwrap().unwrap();
        assert_eq!(opened.status, NotificationStatus::Read);

        center.open(4).await.unwrap();
        assert_eq!(
            api.calls().iter().filter(|c| *c == "mark_read").count(),
            1
        );
    }

    #[tokio::test]
    async fn delete_removes_item_and_adjusts_count() {
        let (_api, center) = center();
        center.refresh().await.unwrap();

        center.delete(4).await.unwrap();
        assert!(center.list().items().iter().all(|n| n.id != 4));
        assert_eq!(center.unread(), 1);
    }

    #[tokio::test]
    async fn archive_keeps_item_out_of_unread() {
        let (_api, center) = center();
        center.refresh().await.unwrap();

        center.archive(1).await.unwrap();
        assert_eq!(
            center
                .list()
                .items()
                .iter()
                .find(|n| n.id == 1)
                .unwrap()
                .status,
            NotificationStatus::Archived
        );
        assert_eq!(center.unread(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn search_is_debounced_to_the_last_term() {
        let (api, center) = center();
        center.refresh().await.unwrap();
        let before = api
            .calls()
            .iter()
            .filter(|c| *c == "notifications")
            .count();

        center.search("mainten");
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        center.search("maintenance");
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(400)).await;
        tokio::task::yield_now().await;

        let after = api
            .calls()
            .iter()
            .filter(|c| *c == "notifications")
            .count();
        assert_eq!(after - before, 1);
    }

    #[tokio::test]
    async fn filtered_views_leave_the_global_badge_alone() {
        let (api, center) = center();
        center.refresh().await.unwrap();
        assert_eq!(center.unread(), 2);

        // Viewing only read items narrows the page to zero unread; the
        // badge must keep reflecting the server-side inbox.
        center
            .apply_filter(Some(NotificationStatus::Read), None)
            .await
            .unwrap();
        assert_eq!(center.list().items().len(), 1);
        assert_eq!(center.unread(), 2);
        assert_eq!(api.unread_count().await.unwrap(), 2);

        // Dropping the filter makes the page whole-inbox again, so the
        // badge may update from it.
        api.mark_read(1).await.unwrap();
        center.apply_filter(None, None).await.unwrap();
        assert_eq!(center.unread(), 1);
    }

    #[tokio::test]
    async fn stale_poll_response_cannot_overwrite_a_newer_one() {
        let (_api, center) = center();
        center.refresh().await.unwrap();

        center.apply_unread(2, 5);
        center.apply_unread(1, 9); // late arrival from an older tick
        assert_eq!(center.unread(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn poller_updates_the_badge() {
        let (_api, center) = center();
        let poller = center.spawn_unread_poller(Duration::from_secs(30), Duration::ZERO);
        tokio::task::yield_now().await;

        tokio::time::advance(Duration::from_secs(31)).await;
        tokio::task::yield_now().await;
        assert_eq!(center.unread(), 2);

        drop(poller);
    }
}
