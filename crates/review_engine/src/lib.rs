//! Review engine: backend client, effect execution and platform ports.
mod client;
mod engine;
mod images;
mod speech;
mod types;

pub use client::{ApiSettings, ReqwestReviewApi, ReviewApi};
pub use engine::EngineHandle;
pub use images::ImageRegistry;
pub use speech::{
    ChannelEventSink, EventSink, SpeechCapture, SpeechPorts, SpeechSynthesis, SpeechUnavailable,
    UnsupportedSpeech,
};
pub use types::{
    ActionEndpoint, ActionReply, ActionRequest, ApiError, ContentKind, ContentVersion,
    EngineEvent, FailureKind, ScreenshotBytes, SearchRequest, StoreOverview, StoredImage,
    StoredVersionHit, VersionSummary, NO_CONTENT_PLACEHOLDER,
};
