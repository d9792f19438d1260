use derive_more::Display;

/// Crate-wide error taxonomy.
///
/// `Connectivity` covers everything where the server was never reached
/// (refused connection, DNS failure, timeout). `Http` carries the status and
/// the server's `{"message": ...}` body when one was present. Everything else
/// is a local failure.
#[derive(Debug, Display)]
pub enum PortalError {
    #[display(fmt = "network unreachable: {}", _0)]
    Connectivity(String),

    #[display(fmt = "HTTP {}: {}", status, message)]
    Http { status: u16, message: String },

    #[display(fmt = "failed to decode response: {}", _0)]
    Decode(String),

    #[display(fmt = "invalid bearer token: {}", _0)]
    Token(String),

    #[display(fmt = "session store error: {}", _0)]
    Storage(String),

    #[display(fmt = "missing configuration: {}", _0)]
    Config(String),
}

impl std::error::Error for PortalError {}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            PortalError::Connectivity(err.to_string())
        } else if err.is_decode() {
            PortalError::Decode(err.to_string())
        } else {
            PortalError::Http {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Decode(err.to_string())
    }
}

impl PortalError {
    /// True when the server could not be reached at all, as opposed to a
    /// reply the caller did not like.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, PortalError::Connectivity(_))
    }
}
