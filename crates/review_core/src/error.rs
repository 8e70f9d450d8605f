use std::fmt;

/// Classification of failures surfaced by the review workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure or timeout before a response arrived.
    Transport,
    /// Non-success HTTP response, with the server's `message`/`error` if any.
    Http {
        status: u16,
        server_message: Option<String>,
    },
    /// The response body could not be decoded.
    Decode,
    /// Platform speech capture or synthesis is not available.
    CapabilityUnavailable,
    /// Input rejected locally before any network call.
    Validation,
    /// A well-formed answer with nothing in it (search without matches).
    DomainEmpty,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::Http { status, .. } => write!(f, "http status {status}"),
            ErrorKind::Decode => write!(f, "decode error"),
            ErrorKind::CapabilityUnavailable => write!(f, "capability unavailable"),
            ErrorKind::Validation => write!(f, "validation error"),
            ErrorKind::DomainEmpty => write!(f, "no results"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{detail}")]
pub struct ReviewError {
    pub kind: ErrorKind,
    pub detail: String,
}

impl ReviewError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, detail)
    }

    pub fn capability(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::CapabilityUnavailable, detail)
    }

    /// Informational entries travel on an error channel but are not failures.
    pub fn is_informational(&self) -> bool {
        matches!(self.kind, ErrorKind::DomainEmpty)
    }

    /// Re-wraps the detail with a prefix, keeping the kind.
    pub(crate) fn prefixed(&self, prefix: &str) -> Self {
        Self::new(self.kind.clone(), format!("{prefix}{}", self.detail))
    }
}
