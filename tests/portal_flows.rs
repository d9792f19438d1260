//! End-to-end workflow flows against the fixture data source.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use medportal::api::fixtures::FixtureApi;
use medportal::model::notification::NotificationStatus;
use medportal::model::task::TaskStatus;
use medportal::routes::Badge;
use medportal::utils::local_store::{LocalStore, MemoryStore, keys};
use medportal::workflow::ActionOutcome;
use medportal::workflow::attendance::AttendanceSession;
use medportal::workflow::confirm::AutoConfirm;
use medportal::workflow::dashboard::Dashboard;
use medportal::workflow::kyc::KycQueue;
use medportal::workflow::notifications::NotificationCenter;
use medportal::workflow::tasks::TaskBoard;
use medportal::workflow::toast::{BufferedNotifier, Toast};

struct Portal {
    api: Arc<FixtureApi>,
    marker: Arc<MemoryStore>,
    notifier: Arc<BufferedNotifier>,
    session: AttendanceSession,
    dashboard: Arc<Dashboard>,
}

fn portal(api: FixtureApi) -> Portal {
    let api = Arc::new(api);
    let marker = Arc::new(MemoryStore::new());
    let notifier = Arc::new(BufferedNotifier::new());
    let confirm = Arc::new(AutoConfirm);

    let session = AttendanceSession::new(
        api.clone(),
        marker.clone(),
        notifier.clone(),
        confirm.clone(),
    );
    let tasks = Arc::new(TaskBoard::new(api.clone(), notifier.clone()));
    let kyc = Arc::new(KycQueue::new(api.clone(), notifier.clone(), confirm));
    let notifications = Arc::new(NotificationCenter::new(
        api.clone(),
        notifier.clone(),
        Duration::from_millis(300),
    ));
    let dashboard = Arc::new(Dashboard::new(
        api.clone(),
        Duration::from_secs(60),
        tasks,
        kyc,
        notifications,
    ));

    Portal {
        api,
        marker,
        notifier,
        session,
        dashboard,
    }
}

#[tokio::test]
async fn full_attendance_day() {
    let p = portal(FixtureApi::seeded());

    // Morning: reconcile, check in.
    let view = p.session.refresh().await.unwrap();
    assert!(!view.checked_in);
    assert_eq!(p.session.check_in().await.unwrap(), ActionOutcome::Done);
    assert!(p.marker.get(keys::CHECK_IN_TIME).is_some());

    // A second check-in attempt is unavailable.
    assert_eq!(p.session.check_in().await.unwrap(), ActionOutcome::Skipped);

    // Evening: check out, marker gone, history has the closed record.
    assert_eq!(p.session.check_out().await.unwrap(), ActionOutcome::Done);
    assert_eq!(p.marker.get(keys::CHECK_IN_TIME), None);

    let history = p.session.history(Default::default()).await.unwrap();
    assert_eq!(history.data.len(), 1);
    assert!(history.data[0].check_out_time.is_some());
}

#[tokio::test]
async fn server_reported_hours_reach_the_toast() {
    let since = Utc::now() - ChronoDuration::hours(8);
    let p = portal(FixtureApi::seeded().with_open_session(since));

    p.session.refresh().await.unwrap();
    p.session.check_out().await.unwrap();

    assert!(
        p.notifier
            .toasts()
            .iter()
            .any(|t| matches!(t, Toast::Success(msg) if msg.contains("8 hours")))
    );
}

#[tokio::test]
async fn reload_while_offline_keeps_the_open_session() {
    let p = portal(FixtureApi::seeded());
    p.session.check_in().await.unwrap();

    // Backend goes away; a fresh reconcile still shows the session from the
    // stored marker.
    p.api.set_offline(true);
    let view = p.session.refresh().await.unwrap();
    assert!(view.checked_in);
}

#[tokio::test]
async fn task_and_kyc_mutations_converge_via_refresh() {
    let p = portal(FixtureApi::seeded());
    p.dashboard.refresh_all().await.unwrap();

    assert_eq!(p.dashboard.badge(Badge::PendingTasks), 1);
    assert_eq!(p.dashboard.badge(Badge::PendingKyc), 2);

    p.dashboard.tasks.start(5).await.unwrap();
    p.dashboard.kyc.assist(7, Some("helped at desk")).await.unwrap();
    p.dashboard.refresh_all().await.unwrap();

    assert_eq!(p.dashboard.badge(Badge::PendingTasks), 0);
    assert_eq!(p.dashboard.badge(Badge::PendingKyc), 1);
    assert_eq!(p.dashboard.summary().tasks_pending, 0);
    assert_eq!(p.dashboard.summary().kyc_assisted_today, 1);

    let started = p
        .dashboard
        .tasks
        .tasks()
        .items()
        .iter()
        .find(|t| t.id == 5)
        .cloned()
        .unwrap();
    assert_eq!(started.status, TaskStatus::InProgress);
}

#[tokio::test]
async fn notification_lifecycle_end_to_end() {
    let p = portal(FixtureApi::seeded());
    let center = &p.dashboard.notifications;
    center.refresh().await.unwrap();
    assert_eq!(center.unread(), 2);

    // Open one unread item; the other stays unread.
    let opened = center.open(1).await.unwrap().unwrap();
    assert_eq!(opened.status, NotificationStatus::Read);
    assert_eq!(center.unread(), 1);

    // Bulk-read the rest; the archived item is untouched.
    center.mark_all_read().await.unwrap();
    assert_eq!(center.unread(), 0);
    assert_eq!(
        center
            .list()
            .items()
            .iter()
            .find(|n| n.id == 3)
            .unwrap()
            .status,
        NotificationStatus::Archived
    );

    // Archive and delete are terminal.
    center.archive(1).await.unwrap();
    center.delete(4).await.unwrap();
    let ids: Vec<u64> = center.list().items().iter().map(|n| n.id).collect();
    assert!(!ids.contains(&4));
}

#[tokio::test]
async fn failed_queue_fetch_is_reported_not_blank() {
    let p = portal(FixtureApi::seeded());
    p.api.set_offline(true);

    assert!(p.dashboard.refresh_all().await.is_err());
    assert!(p.dashboard.tasks.tasks().is_failed());
    assert!(
        p.notifier
            .toasts()
            .iter()
            .any(|t| matches!(t, Toast::Error(_)))
    );
}
