//! Review core: pure chapter-review state machine and view-model helpers.
mod action;
mod content;
mod effect;
mod error;
mod msg;
mod search;
mod state;
mod status;
mod update;
mod view_model;
mod voice;

pub use action::{ActionKind, ActionOutcome, ActionState, RegenerationCycle, RegenerationPolicy, WorkflowAction};
pub use content::{ContentStore, ImageHandle, Slot, SlotState, SlotValue};
pub use effect::Effect;
pub use error::{ErrorKind, ReviewError};
pub use msg::Msg;
pub use search::{SearchHit, SearchQuery, SearchState, DEFAULT_SEARCH_LIMIT};
pub use state::ReviewState;
pub use status::{ChapterStatus, StatusRegister};
pub use update::{
    update, ALREADY_APPROVED_MESSAGE, EMPTY_QUERY_MESSAGE, NOTHING_TO_READ_MESSAGE,
    REVISION_IN_PROGRESS_MESSAGE,
};
pub use view_model::{ReviewViewModel, SlotView};
pub use voice::{Capabilities, FeedbackComposer, VoiceInputState, VoiceOutputState};
