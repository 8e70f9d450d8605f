use review_core::{
    ActionKind, Capabilities, Effect, ErrorKind, ImageHandle, Msg, ReviewError, SearchHit, Slot,
    SlotValue, WorkflowAction,
};
use review_engine::{
    ActionEndpoint, ActionRequest, ApiError, ContentKind, EngineEvent, EngineHandle,
    FailureKind, SearchRequest, StoreOverview, StoredVersionHit,
};
use bytes::Bytes;
use review_logging::{review_debug, review_info, review_warn};

pub const UNKNOWN_ACTION_ERROR: &str = "Unknown error occurred.";
pub const DEFAULT_ACTION_MESSAGE: &str = "Action completed.";
const EXCERPT_CHARS: usize = 300;

/// What the app receives back from the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Msg(Msg),
    Overview(Result<StoreOverview, ApiError>),
    Health(Result<String, ApiError>),
}

/// Executes core effects on the engine and translates engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    chapter_id: String,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, chapter_id: impl Into<String>) -> Self {
        Self {
            engine,
            chapter_id: chapter_id.into(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        let (speech_capture, speech_synthesis) = self.engine.speech_availability();
        Capabilities {
            speech_capture,
            speech_synthesis,
        }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            review_debug!("effect {:?}", effect);
            match effect {
                Effect::FetchSlot { slot, generation } => match content_kind(slot) {
                    Some(kind) => self.engine.fetch_content(&self.chapter_id, kind, generation),
                    None => self.engine.fetch_screenshot(generation),
                },
                Effect::FetchStatus { revision } => {
                    self.engine.fetch_status(&self.chapter_id, revision)
                }
                Effect::SubmitAction { action } => {
                    review_info!("SubmitAction {:?}", action.kind());
                    self.engine
                        .submit_action(&self.chapter_id, action_request(action));
                }
                Effect::StartGraceTimer { cycle, delay } => {
                    self.engine.start_timer(cycle, delay);
                }
                Effect::Search { generation, query } => {
                    let request =
                        SearchRequest::for_chapter(query.text, query.limit, &query.chapter_id);
                    self.engine.search(generation, request);
                }
                Effect::ReleaseImage { handle } => self.engine.release_image(handle.id),
                Effect::StartCapture => self.engine.start_capture(),
                Effect::StopCapture => self.engine.stop_capture(),
                Effect::Speak {
                    utterance, text, ..
                } => self.engine.speak(utterance, text),
                Effect::CancelSpeech => self.engine.cancel_speech(),
            }
        }
    }

    pub fn fetch_overview(&self) {
        self.engine.fetch_overview();
    }

    pub fn check_health(&self) {
        self.engine.check_health();
    }

    /// Bytes behind a screenshot handle that has not been released yet.
    pub fn image_bytes(&self, handle: &ImageHandle) -> Option<Bytes> {
        self.engine.image_bytes(handle.id)
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }

    /// Drains every event the engine has produced so far.
    pub fn drain(&self) -> Vec<Inbound> {
        let mut inbound = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            inbound.push(translate(event));
        }
        inbound
    }
}

fn content_kind(slot: Slot) -> Option<ContentKind> {
    match slot {
        Slot::Original => Some(ContentKind::Original),
        Slot::Spun => Some(ContentKind::Spun),
        Slot::ReviewComments => Some(ContentKind::ReviewComments),
        Slot::Screenshot => None,
    }
}

fn slot_for(kind: ContentKind) -> Slot {
    match kind {
        ContentKind::Original => Slot::Original,
        ContentKind::Spun => Slot::Spun,
        ContentKind::ReviewComments => Slot::ReviewComments,
    }
}

fn action_request(action: WorkflowAction) -> ActionRequest {
    match action {
        WorkflowAction::Approve => ActionRequest::Approve,
        WorkflowAction::RequestRevision { feedback } => ActionRequest::RequestRevision { feedback },
    }
}

fn action_kind(endpoint: ActionEndpoint) -> ActionKind {
    match endpoint {
        ActionEndpoint::Approve => ActionKind::Approve,
        ActionEndpoint::RequestRevision => ActionKind::RequestRevision,
    }
}

pub fn translate(event: EngineEvent) -> Inbound {
    let msg = match event {
        EngineEvent::ContentFetched {
            kind,
            generation,
            result,
        } => Msg::SlotLoaded {
            slot: slot_for(kind),
            generation,
            result: result
                .map(|version| SlotValue::Text(version.content))
                .map_err(|err| described(&err)),
        },
        EngineEvent::ScreenshotFetched { generation, result } => Msg::SlotLoaded {
            slot: Slot::Screenshot,
            generation,
            result: result
                .map(|image| {
                    SlotValue::Image(ImageHandle {
                        id: image.id,
                        byte_len: image.byte_len,
                        content_type: image.content_type,
                    })
                })
                .map_err(|err| described(&err)),
        },
        EngineEvent::StatusFetched { revision, result } => Msg::StatusFetched {
            revision,
            result: result.map_err(|err| described(&err)),
        },
        EngineEvent::ActionCompleted { endpoint, result } => Msg::ActionCompleted {
            action: action_kind(endpoint),
            result: result
                .map(|reply| {
                    reply
                        .message
                        .unwrap_or_else(|| DEFAULT_ACTION_MESSAGE.to_string())
                })
                .map_err(|err| action_error(&err)),
        },
        EngineEvent::TimerElapsed { token } => Msg::GraceElapsed { cycle: token },
        EngineEvent::SearchCompleted { generation, result } => Msg::SearchCompleted {
            generation,
            result: result
                .map(|hits| hits.into_iter().map(search_hit).collect())
                .map_err(|err| described(&err)),
        },
        EngineEvent::OverviewFetched { result } => return Inbound::Overview(result),
        EngineEvent::HealthChecked { result } => return Inbound::Health(result),
        EngineEvent::Transcript { text } => Msg::TranscriptFinalized(text),
        EngineEvent::CaptureEnded => Msg::CaptureEnded,
        EngineEvent::CaptureFailed { error } => {
            review_warn!("speech capture failed: {}", error);
            Msg::CaptureFailed(described(&error))
        }
        EngineEvent::SpeechEnded { utterance } => Msg::SpeechEnded { utterance },
        EngineEvent::SpeechFailed { utterance, error } => {
            review_warn!("speech synthesis failed: {}", error);
            Msg::SpeechFailed {
                utterance,
                error: described(&error),
            }
        }
    };
    Inbound::Msg(msg)
}

fn error_kind(err: &ApiError) -> ErrorKind {
    match err.kind {
        FailureKind::InvalidUrl | FailureKind::Timeout | FailureKind::Network => {
            ErrorKind::Transport
        }
        FailureKind::HttpStatus(status) => ErrorKind::Http {
            status,
            server_message: err.server_message.clone(),
        },
        FailureKind::Decode | FailureKind::TooLarge { .. } => ErrorKind::Decode,
        FailureKind::Unsupported => ErrorKind::CapabilityUnavailable,
    }
}

fn described(err: &ApiError) -> ReviewError {
    ReviewError::new(error_kind(err), err.describe())
}

/// Action failures show the server's own message when there is one.
fn action_error(err: &ApiError) -> ReviewError {
    let detail = match err.kind {
        FailureKind::HttpStatus(_) => err
            .server_message
            .clone()
            .unwrap_or_else(|| UNKNOWN_ACTION_ERROR.to_string()),
        _ => err.message.clone(),
    };
    ReviewError::new(error_kind(err), detail)
}

fn search_hit(hit: StoredVersionHit) -> SearchHit {
    SearchHit {
        version_tag: hit.metadata_str("version_type").map(str::to_string),
        timestamp: hit.metadata_str("timestamp").map(str::to_string),
        distance: hit.distance.unwrap_or(f64::NAN),
        excerpt: excerpt(&hit.content),
        id: hit.id,
    }
}

fn excerpt(content: &str) -> String {
    let mut chars = content.char_indices();
    match chars.nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", content[..cut].trim_end()),
        None => content.to_string(),
    }
}
