use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::rolling;

use medportal::api::PortalApi;
use medportal::api::fixtures::FixtureApi;
use medportal::api::http::{HttpApi, PortalClient};
use medportal::auth::jwt::{mint_fixture_token, peek_claims};
use medportal::config::Config;
use medportal::model::role::PortalRole;
use medportal::routes;
use medportal::utils::local_store::{JsonFileStore, LocalStore, keys};
use medportal::workflow::attendance::AttendanceSession;
use medportal::workflow::confirm::AutoConfirm;
use medportal::workflow::dashboard::Dashboard;
use medportal::workflow::kyc::KycQueue;
use medportal::workflow::notifications::NotificationCenter;
use medportal::workflow::tasks::TaskBoard;
use medportal::workflow::toast::LogNotifier;

/// Headless portal agent: authenticates from the stored token, reconciles
/// the attendance session, then keeps the dashboard badges fresh until
/// interrupted. Useful for ward displays and for soak-testing the backend.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "portal.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Portal agent starting...");

    let store: Arc<dyn LocalStore> = Arc::new(JsonFileStore::open(&config.session_file));

    if let Some(token) = &config.portal_token {
        store.set(keys::AUTH_TOKEN, token);
    } else if config.offline_fixtures && store.get(keys::AUTH_TOKEN).is_none() {
        // No backend to log into; mint a local token so the rest of the
        // stack behaves exactly as it would online.
        let token = mint_fixture_token(7, "fixture-user", &config.portal_role, 86_400);
        store.set(keys::AUTH_TOKEN, &token);
    }

    let token = store
        .get(keys::AUTH_TOKEN)
        .context("no bearer token: set PORTAL_TOKEN or enable OFFLINE_FIXTURES")?;
    let claims = peek_claims(&token)?;
    let role = PortalRole::from_name(&claims.role)
        .with_context(|| format!("unknown portal role {:?}", claims.role))?;

    info!(user = %claims.sub, role = role.as_str(), "Authenticated");
    for entry in routes::menu_for(role) {
        info!(route = entry.route, label = entry.label, "Menu entry");
    }

    let api: Arc<dyn PortalApi> = if config.offline_fixtures {
        info!("Running against fixture data (OFFLINE_FIXTURES)");
        Arc::new(FixtureApi::seeded())
    } else {
        info!(base_url = %config.api_base_url, namespace = routes::api_namespace(role), "Running against live API");
        Arc::new(HttpApi::new(
            PortalClient::new(&config, store.clone()),
            role,
            claims.user_id,
        ))
    };

    let notifier = Arc::new(LogNotifier);
    let confirm = Arc::new(AutoConfirm);

    let session = AttendanceSession::new(
        api.clone(),
        store.clone(),
        notifier.clone(),
        confirm.clone(),
    );
    match session.refresh().await {
        Ok(view) if view.checked_in => info!(
            since = ?view.check_in_time,
            "Attendance session open"
        ),
        Ok(_) => info!("No attendance session open"),
        Err(e) => warn!(error = %e, "Could not reconcile attendance"),
    }

    let tasks = Arc::new(TaskBoard::new(api.clone(), notifier.clone()));
    let kyc = Arc::new(KycQueue::new(api.clone(), notifier.clone(), confirm));
    let notifications = Arc::new(NotificationCenter::new(
        api.clone(),
        notifier,
        config.search_debounce,
    ));
    let dashboard = Arc::new(Dashboard::new(
        api,
        config.cache_ttl,
        tasks,
        kyc,
        notifications.clone(),
    ));

    if let Err(e) = dashboard.refresh_all().await {
        warn!(error = %e, "Initial dashboard refresh failed");
    }
    for entry in routes::menu_for(role) {
        if let Some(badge) = entry.badge {
            info!(route = entry.route, count = dashboard.badge(badge), "Badge");
        }
    }

    let _poller =
        notifications.spawn_unread_poller(config.unread_poll_interval, config.poll_jitter);

    // Periodically surface the badge counts until interrupted.
    let report = {
        let dashboard = dashboard.clone();
        let interval = config.unread_poll_interval;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval + Duration::from_secs(1)).await;
                info!(
                    unread = dashboard.notifications.unread(),
                    tasks_pending = dashboard.tasks.pending_count(),
                    kyc_pending = dashboard.kyc.pending_count(),
                    "Badge counts"
                );
            }
        })
    };

    tokio::signal::ctrl_c().await?;
    report.abort();
    info!("Portal agent stopped");
    Ok(())
}
