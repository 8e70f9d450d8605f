use crate::{ActionKind, ReviewError, SearchHit, Slot, SlotValue, WorkflowAction};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Review view opened: load all four slots.
    Mounted,
    /// User asked to reload every slot.
    ReloadClicked,
    /// Engine finished fetching a slot.
    SlotLoaded {
        slot: Slot,
        generation: u64,
        result: Result<SlotValue, ReviewError>,
    },
    /// Engine finished fetching the chapter status. `Ok(None)` means the
    /// response carried no `latest_status` field.
    StatusFetched {
        revision: u64,
        result: Result<Option<String>, ReviewError>,
    },
    /// User triggered a workflow action.
    ActionRequested(WorkflowAction),
    /// Engine finished posting an action; `Ok` carries the server message.
    ActionCompleted {
        action: ActionKind,
        result: Result<String, ReviewError>,
    },
    /// The regeneration grace timer fired.
    GraceElapsed { cycle: u64 },
    /// User opened the revision feedback composer.
    FeedbackOpened,
    /// User edited the feedback text.
    FeedbackEdited(String),
    /// User dismissed the feedback composer.
    FeedbackClosed,
    /// User submitted the composer text as a revision request.
    FeedbackSubmitted,
    /// User ran a semantic search.
    SearchSubmitted { query: String, limit: usize },
    /// Engine finished a semantic search.
    SearchCompleted {
        generation: u64,
        result: Result<Vec<SearchHit>, ReviewError>,
    },
    /// User pressed the microphone button.
    RecordClicked,
    /// User pressed stop while recording.
    StopRecordingClicked,
    /// Capture port finalized a transcript.
    TranscriptFinalized(String),
    /// Capture port reached the end of the utterance.
    CaptureEnded,
    /// Capture port failed.
    CaptureFailed(ReviewError),
    /// User asked for a slot to be read aloud (or stopped).
    SpeakClicked(Slot),
    /// Synthesis port finished an utterance.
    SpeechEnded { utterance: u64 },
    /// Synthesis port failed an utterance.
    SpeechFailed { utterance: u64, error: ReviewError },
    /// User left the review view.
    NavigatedAway,
}
