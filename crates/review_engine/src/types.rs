use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Text versions the backend stores per chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Original,
    Spun,
    ReviewComments,
}

impl ContentKind {
    pub fn path_segment(self) -> &'static str {
        match self {
            ContentKind::Original => "original",
            ContentKind::Spun => "spun",
            ContentKind::ReviewComments => "review_comments",
        }
    }
}

/// Shown in place of missing or empty `content`.
pub const NO_CONTENT_PLACEHOLDER: &str = "No content found.";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentVersion {
    /// Missing, null and empty content all read as [`NO_CONTENT_PLACEHOLDER`].
    #[serde(default = "no_content", deserialize_with = "content_or_placeholder")]
    pub content: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

fn no_content() -> String {
    NO_CONTENT_PLACEHOLDER.to_string()
}

fn content_or_placeholder<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|content| !content.is_empty())
        .unwrap_or_else(no_content))
}

/// The store reports absent documents and metadata as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotBytes {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// A screenshot held in the engine's image registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub id: u64,
    pub byte_len: u64,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct StatusReply {
    #[serde(default)]
    pub latest_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    Approve,
    RequestRevision { feedback: String },
}

impl ActionRequest {
    pub fn endpoint(&self) -> ActionEndpoint {
        match self {
            ActionRequest::Approve => ActionEndpoint::Approve,
            ActionRequest::RequestRevision { .. } => ActionEndpoint::RequestRevision,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEndpoint {
    Approve,
    RequestRevision,
}

impl ActionEndpoint {
    pub fn path_segment(self) -> &'static str {
        match self {
            ActionEndpoint::Approve => "approve_chapter",
            ActionEndpoint::RequestRevision => "request_revision",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub version_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct RevisionBody<'a> {
    pub feedback: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query_text: String,
    pub n_results: usize,
    pub filter_metadata: BTreeMap<String, String>,
}

impl SearchRequest {
    pub fn for_chapter(query_text: impl Into<String>, n_results: usize, chapter_id: &str) -> Self {
        let mut filter_metadata = BTreeMap::new();
        filter_metadata.insert("chapter_id".to_string(), chapter_id.to_string());
        Self {
            query_text: query_text.into(),
            n_results,
            filter_metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct SearchReply {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<StoredVersionHit>,
}

/// One result of a semantic search over stored chapter versions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredVersionHit {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub distance: Option<f64>,
}

impl StoredVersionHit {
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionSummary {
    pub id: String,
    #[serde(default)]
    pub version_type: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub content_length: u64,
}

/// Summary of the backend content store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreOverview {
    pub status: String,
    #[serde(default)]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub document_count: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chapter_versions: Vec<VersionSummary>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ContentFetched {
        kind: ContentKind,
        generation: u64,
        result: Result<ContentVersion, ApiError>,
    },
    ScreenshotFetched {
        generation: u64,
        result: Result<StoredImage, ApiError>,
    },
    StatusFetched {
        revision: u64,
        result: Result<Option<String>, ApiError>,
    },
    ActionCompleted {
        endpoint: ActionEndpoint,
        result: Result<ActionReply, ApiError>,
    },
    TimerElapsed {
        token: u64,
    },
    SearchCompleted {
        generation: u64,
        result: Result<Vec<StoredVersionHit>, ApiError>,
    },
    OverviewFetched {
        result: Result<StoreOverview, ApiError>,
    },
    HealthChecked {
        result: Result<String, ApiError>,
    },
    Transcript {
        text: String,
    },
    CaptureEnded,
    CaptureFailed {
        error: ApiError,
    },
    SpeechEnded {
        utterance: u64,
    },
    SpeechFailed {
        utterance: u64,
        error: ApiError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
    /// `message` or `error` field of a JSON error body, when the server sent one.
    pub server_message: Option<String>,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            server_message: None,
        }
    }

    /// Human-readable description for display next to the failed panel.
    pub fn describe(&self) -> String {
        match self.kind {
            FailureKind::HttpStatus(code) => {
                let detail = self.server_message.as_deref().unwrap_or(&self.message);
                format!("HTTP error! status: {code} - {detail}")
            }
            _ => self.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// The platform lacks the requested speech capability.
    Unsupported,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Unsupported => write!(f, "unsupported"),
        }
    }
}
