use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    /// REST base, e.g. `http://localhost:5000/api` in development or `/api`
    /// behind a reverse proxy.
    pub api_base_url: String,

    /// Bearer token injected into the session store at startup, if provided.
    pub portal_token: Option<String>,

    /// Fallback role used when running against fixtures without a token.
    pub portal_role: String,

    /// Path of the JSON file backing the local session store (the
    /// local-storage analog: token + check-in marker).
    pub session_file: String,

    /// Serve canned fixture data instead of hitting the network. Selected
    /// explicitly by configuration, never inferred from error type.
    pub offline_fixtures: bool,

    pub request_timeout: Duration,

    // Polling / staleness knobs
    pub unread_poll_interval: Duration,
    pub poll_jitter: Duration,
    pub cache_ttl: Duration,
    pub search_debounce: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000/api".to_string()),
            portal_token: env::var("PORTAL_TOKEN").ok(),
            portal_role: env::var("PORTAL_ROLE").unwrap_or_else(|_| "nurse".to_string()),
            session_file: env::var("SESSION_FILE")
                .unwrap_or_else(|_| ".portal-session.json".to_string()),
            offline_fixtures: env::var("OFFLINE_FIXTURES")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap(),
            ),
            unread_poll_interval: Duration::from_secs(
                env::var("UNREAD_POLL_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap(),
            ),
            poll_jitter: Duration::from_secs(
                env::var("POLL_JITTER_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap(),
            ),
            cache_ttl: Duration::from_secs(
                env::var("CACHE_TTL_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .unwrap(),
            ),
            search_debounce: Duration::from_millis(
                env::var("SEARCH_DEBOUNCE_MS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .unwrap(),
            ),
        }
    }
}
