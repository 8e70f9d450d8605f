use std::time::Duration;

use crate::{ImageHandle, SearchQuery, Slot, WorkflowAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchSlot { slot: Slot, generation: u64 },
    FetchStatus { revision: u64 },
    SubmitAction { action: WorkflowAction },
    StartGraceTimer { cycle: u64, delay: Duration },
    Search { generation: u64, query: SearchQuery },
    ReleaseImage { handle: ImageHandle },
    StartCapture,
    StopCapture,
    Speak { utterance: u64, slot: Slot, text: String },
    CancelSpeech,
}
