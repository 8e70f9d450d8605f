use std::collections::BTreeSet;

use crate::view_model::{ReviewViewModel, SlotView};
use crate::{
    ActionState, Capabilities, ContentStore, FeedbackComposer, RegenerationPolicy, ReviewError,
    SearchState, Slot, StatusRegister, VoiceInputState, VoiceOutputState,
};

/// Complete state of one chapter review session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReviewState {
    pub(crate) chapter_id: String,
    pub(crate) capabilities: Capabilities,
    pub(crate) policy: RegenerationPolicy,
    pub(crate) content: ContentStore,
    /// Slots of the running `load_all` that have not settled yet.
    pub(crate) load_all_pending: BTreeSet<Slot>,
    pub(crate) status: StatusRegister,
    pub(crate) action: ActionState,
    pub(crate) composer: FeedbackComposer,
    pub(crate) search: SearchState,
    pub(crate) voice_input: VoiceInputState,
    pub(crate) voice_output: VoiceOutputState,
    pub(crate) next_utterance: u64,
    /// Errors that belong to no particular panel (voice, capabilities).
    pub(crate) general_error: Option<ReviewError>,
    dirty: bool,
}

impl ReviewState {
    pub fn new(chapter_id: impl Into<String>, capabilities: Capabilities) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            capabilities,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: RegenerationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn chapter_id(&self) -> &str {
        &self.chapter_id
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn status(&self) -> &StatusRegister {
        &self.status
    }

    pub fn action(&self) -> &ActionState {
        &self.action
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn composer(&self) -> &FeedbackComposer {
        &self.composer
    }

    pub fn voice_input(&self) -> VoiceInputState {
        self.voice_input
    }

    pub fn voice_output(&self) -> VoiceOutputState {
        self.voice_output
    }

    pub fn general_error(&self) -> Option<&ReviewError> {
        self.general_error.as_ref()
    }

    pub fn view(&self) -> ReviewViewModel {
        let slots = self
            .content
            .iter()
            .map(|(slot, state)| SlotView {
                slot,
                label: slot.label(),
                text: state
                    .value
                    .as_ref()
                    .and_then(|v| v.as_text())
                    .map(ToOwned::to_owned),
                image: state.value.as_ref().and_then(|v| v.as_image()).cloned(),
                is_loading: state.is_loading,
                error: state.error.as_ref().map(ToString::to_string),
                speaking: self.voice_output.active_slot() == Some(slot),
            })
            .collect();

        let actions_enabled = self.actions_enabled();
        ReviewViewModel {
            chapter_id: self.chapter_id.clone(),
            status: self.status.status,
            status_label: self.status.status.label(),
            status_loading: self.status.is_loading(),
            status_error: self.status.error.as_ref().map(ToString::to_string),
            slots,
            settled_slots: self.content.settled_count(),
            action_busy: self.action.is_loading(),
            actions_enabled,
            regenerating: self.action.cycle.is_some(),
            outcome: self.action.outcome.clone(),
            composer_open: self.composer.open,
            feedback_text: self.composer.text.clone(),
            search_loading: self.search.is_loading,
            search_results: self.search.results.clone(),
            search_message: self.search.error.as_ref().map(|e| (e.to_string(), !e.is_informational())),
            recording: self.voice_input == VoiceInputState::Recording,
            speaking: self.voice_output.active_slot(),
            general_error: self.general_error.as_ref().map(ToString::to_string),
            dirty: self.dirty,
        }
    }

    pub(crate) fn actions_enabled(&self) -> bool {
        !self.action.is_loading() && self.status.status != crate::ChapterStatus::Approved
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the state changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
