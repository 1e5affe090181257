use std::fmt;

/// Failure of a live fetch. Kept distinct from an empty result so callers and
/// tests can tell "nothing found" from "request never went out".
#[derive(Debug, Clone)]
pub enum FetchError {
    /// Signature computed but the request was not sent because the transport
    /// contract (where the auth params go) is not configured.
    Unsent { path: String, reason: &'static str },
    Upstream {
        stage: &'static str,
        status: Option<u16>,
        detail: String,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Unsent { path, reason } => {
                write!(f, "partner request to {path} not sent: {reason}")
            }
            FetchError::Upstream {
                stage,
                status: Some(status),
                detail,
            } => write!(f, "partner fetch failed (stage={stage}, HTTP {status}): {detail}"),
            FetchError::Upstream {
                stage,
                status: None,
                detail,
            } => write!(f, "partner fetch failed (stage={stage}): {detail}"),
        }
    }
}

impl std::error::Error for FetchError {}
