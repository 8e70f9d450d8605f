use crate::{ActionOutcome, ChapterStatus, ImageHandle, SearchHit, Slot};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReviewViewModel {
    pub chapter_id: String,
    pub status: ChapterStatus,
    pub status_label: &'static str,
    pub status_loading: bool,
    pub status_error: Option<String>,
    pub slots: Vec<SlotView>,
    pub settled_slots: usize,
    pub action_busy: bool,
    pub actions_enabled: bool,
    pub regenerating: bool,
    pub outcome: Option<ActionOutcome>,
    pub composer_open: bool,
    pub feedback_text: String,
    pub search_loading: bool,
    pub search_results: Vec<SearchHit>,
    /// Message on the search channel and whether it is a real error.
    pub search_message: Option<(String, bool)>,
    pub recording: bool,
    pub speaking: Option<Slot>,
    pub general_error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    pub slot: Slot,
    pub label: &'static str,
    pub text: Option<String>,
    pub image: Option<ImageHandle>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub speaking: bool,
}
