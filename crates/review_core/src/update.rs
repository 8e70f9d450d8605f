use crate::content::Settled;
use crate::{
    ActionKind, ActionOutcome, ChapterStatus, Effect, Msg, ReviewError, ReviewState, SearchQuery,
    Slot, SlotValue, VoiceInputState, VoiceOutputState, WorkflowAction,
};

pub const REVISION_IN_PROGRESS_MESSAGE: &str =
    "Revision requested. New spun content and review comments are loading...";
pub const ALREADY_APPROVED_MESSAGE: &str = "Chapter is already approved.";
pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a search query.";
pub const NOTHING_TO_READ_MESSAGE: &str = "Nothing to read aloud.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ReviewState, msg: Msg) -> (ReviewState, Vec<Effect>) {
    let effects = match msg {
        Msg::Mounted | Msg::ReloadClicked => load_all(&mut state),
        Msg::SlotLoaded {
            slot,
            generation,
            result,
        } => slot_loaded(&mut state, slot, generation, result),
        Msg::StatusFetched { revision, result } => status_fetched(&mut state, revision, result),
        Msg::ActionRequested(action) => request_action(&mut state, action),
        Msg::FeedbackSubmitted => {
            let feedback = state.composer.text.trim().to_string();
            request_action(&mut state, WorkflowAction::RequestRevision { feedback })
        }
        Msg::ActionCompleted { action, result } => action_completed(&mut state, action, result),
        Msg::GraceElapsed { cycle } => grace_elapsed(&mut state, cycle),
        Msg::FeedbackOpened => {
            state.composer.open_fresh();
            state.mark_dirty();
            Vec::new()
        }
        Msg::FeedbackEdited(text) => {
            state.composer.open = true;
            state.composer.text = text;
            state.mark_dirty();
            Vec::new()
        }
        Msg::FeedbackClosed => {
            state.composer.close();
            state.mark_dirty();
            Vec::new()
        }
        Msg::SearchSubmitted { query, limit } => submit_search(&mut state, query, limit),
        Msg::SearchCompleted { generation, result } => {
            search_completed(&mut state, generation, result);
            Vec::new()
        }
        Msg::RecordClicked => start_recording(&mut state),
        Msg::StopRecordingClicked => {
            if state.voice_input == VoiceInputState::Recording {
                vec![Effect::StopCapture]
            } else {
                Vec::new()
            }
        }
        Msg::TranscriptFinalized(text) => {
            if state.voice_input == VoiceInputState::Recording
                && state.composer.append_transcript(&text)
            {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::CaptureEnded => {
            if state.voice_input == VoiceInputState::Recording {
                state.voice_input = VoiceInputState::Idle;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::CaptureFailed(error) => {
            state.voice_input = VoiceInputState::Idle;
            state.general_error = Some(error);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SpeakClicked(slot) => toggle_speech(&mut state, slot),
        Msg::SpeechEnded { utterance } => {
            if state.voice_output.is_active_utterance(utterance) {
                state.voice_output = VoiceOutputState::Idle;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SpeechFailed { utterance, error } => {
            if state.voice_output.is_active_utterance(utterance) {
                state.voice_output = VoiceOutputState::Idle;
                state.general_error = Some(error);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NavigatedAway => teardown(&mut state),
    };

    (state, effects)
}

fn load_slot(state: &mut ReviewState, slot: Slot) -> Effect {
    let generation = state.content.begin(slot);
    Effect::FetchSlot { slot, generation }
}

fn refresh_status(state: &mut ReviewState) -> Effect {
    let revision = state.status.begin_poll();
    Effect::FetchStatus { revision }
}

fn load_all(state: &mut ReviewState) -> Vec<Effect> {
    state.load_all_pending = Slot::ALL.into_iter().collect();
    state.mark_dirty();
    Slot::ALL
        .into_iter()
        .map(|slot| load_slot(state, slot))
        .collect()
}

fn slot_loaded(
    state: &mut ReviewState,
    slot: Slot,
    generation: u64,
    result: Result<SlotValue, ReviewError>,
) -> Vec<Effect> {
    let mut effects = Vec::new();
    match state.content.settle(slot, generation, result) {
        Settled::Stale { orphan } => {
            if let Some(handle) = orphan {
                effects.push(Effect::ReleaseImage { handle });
            }
            return effects;
        }
        Settled::Applied { displaced } => {
            if let Some(handle) = displaced {
                effects.push(Effect::ReleaseImage { handle });
            }
        }
    }
    state.mark_dirty();

    let was_pending = state.load_all_pending.remove(&slot);
    if was_pending && state.load_all_pending.is_empty() {
        effects.push(refresh_status(state));
    }
    effects
}

fn status_fetched(
    state: &mut ReviewState,
    revision: u64,
    result: Result<Option<String>, ReviewError>,
) -> Vec<Effect> {
    let applied = state.status.apply_poll(revision, result);
    state.mark_dirty();
    if !applied {
        return Vec::new();
    }

    // Bounded poll: keep waiting while the backend still reports the revision
    // request as unprocessed.
    let Some(mut cycle) = state.action.cycle else {
        return Vec::new();
    };
    if !cycle.refetched {
        return Vec::new();
    }
    if state.status.status == ChapterStatus::RevisionRequested
        && cycle.round < state.policy.max_polls
    {
        cycle.round += 1;
        cycle.refetched = false;
        state.action.cycle = Some(cycle);
        return vec![Effect::StartGraceTimer {
            cycle: cycle.id,
            delay: state.policy.delay_for_round(cycle.round),
        }];
    }
    state.action.cycle = None;
    Vec::new()
}

fn request_action(state: &mut ReviewState, action: WorkflowAction) -> Vec<Effect> {
    if state.action.is_loading() {
        return Vec::new();
    }
    state.mark_dirty();
    if state.status.status == ChapterStatus::Approved {
        state.action.outcome = Some(ActionOutcome::Failed {
            error: ReviewError::validation(ALREADY_APPROVED_MESSAGE),
        });
        return Vec::new();
    }

    state.action.outcome = None;
    state.action.in_flight = Some(action.kind());
    vec![Effect::SubmitAction { action }]
}

fn action_completed(
    state: &mut ReviewState,
    action: ActionKind,
    result: Result<String, ReviewError>,
) -> Vec<Effect> {
    if state.action.in_flight != Some(action) {
        return Vec::new();
    }
    state.mark_dirty();

    let message = match result {
        Ok(message) => message,
        Err(error) => {
            state.action.in_flight = None;
            state.action.outcome = Some(ActionOutcome::Failed {
                error: error.prefixed("Action failed: "),
            });
            if action == ActionKind::RequestRevision {
                state.composer.close();
            }
            return Vec::new();
        }
    };

    match action {
        ActionKind::Approve => {
            state.action.in_flight = None;
            state.action.cycle = None;
            state.status.write_optimistic(ChapterStatus::Approved);
            state.action.outcome = Some(ActionOutcome::Succeeded { message });
            vec![refresh_status(state)]
        }
        ActionKind::RequestRevision => {
            state.composer.close();
            state.status.write_optimistic(ChapterStatus::Processing);
            state.action.outcome = Some(ActionOutcome::Succeeded {
                message: REVISION_IN_PROGRESS_MESSAGE.to_string(),
            });
            let cycle = state.action.start_cycle();
            vec![Effect::StartGraceTimer {
                cycle: cycle.id,
                delay: state.policy.delay_for_round(0),
            }]
        }
    }
}

fn grace_elapsed(state: &mut ReviewState, cycle_id: u64) -> Vec<Effect> {
    let Some(mut cycle) = state.action.cycle else {
        return Vec::new();
    };
    if cycle.id != cycle_id || cycle.refetched {
        return Vec::new();
    }
    cycle.refetched = true;
    state.action.cycle = Some(cycle);
    if state.action.in_flight == Some(ActionKind::RequestRevision) {
        state.action.in_flight = None;
    }
    state.mark_dirty();

    vec![
        load_slot(state, Slot::Spun),
        load_slot(state, Slot::ReviewComments),
        refresh_status(state),
    ]
}

fn submit_search(state: &mut ReviewState, query: String, limit: usize) -> Vec<Effect> {
    state.mark_dirty();
    let text = query.trim();
    if text.is_empty() {
        // Supersedes any search still in flight.
        state.search.invalidate();
        state.search.results.clear();
        state.search.error = Some(ReviewError::validation(EMPTY_QUERY_MESSAGE));
        return Vec::new();
    }
    let generation = state.search.begin(text);
    vec![Effect::Search {
        generation,
        query: SearchQuery {
            text: text.to_string(),
            limit: limit.max(1),
            chapter_id: state.chapter_id.clone(),
        },
    }]
}

fn search_completed(
    state: &mut ReviewState,
    generation: u64,
    result: Result<Vec<crate::SearchHit>, ReviewError>,
) {
    if !state.search.is_current(generation) {
        return;
    }
    state.search.is_loading = false;
    match result {
        Ok(hits) if hits.is_empty() => {
            let query = state.search.last_query.clone().unwrap_or_default();
            state.search.results.clear();
            state.search.error = Some(ReviewError::new(
                crate::ErrorKind::DomainEmpty,
                format!("No results found for '{query}'."),
            ));
        }
        Ok(hits) => {
            state.search.results = hits;
            state.search.error = None;
        }
        Err(error) => {
            state.search.results.clear();
            state.search.error = Some(error);
        }
    }
    state.mark_dirty();
}

fn start_recording(state: &mut ReviewState) -> Vec<Effect> {
    if state.voice_input == VoiceInputState::Recording {
        return Vec::new();
    }
    state.mark_dirty();
    if !state.capabilities.speech_capture {
        state.general_error = Some(ReviewError::capability(
            "Speech recognition is not supported on this platform.",
        ));
        return Vec::new();
    }
    if !state.composer.open {
        state.composer.open_fresh();
    }
    state.voice_input = VoiceInputState::Recording;
    vec![Effect::StartCapture]
}

fn toggle_speech(state: &mut ReviewState, slot: Slot) -> Vec<Effect> {
    state.mark_dirty();
    if state.voice_output.active_slot() == Some(slot) {
        state.voice_output = VoiceOutputState::Idle;
        return vec![Effect::CancelSpeech];
    }
    if !state.capabilities.speech_synthesis {
        state.general_error = Some(ReviewError::capability(
            "Speech synthesis is not supported on this platform.",
        ));
        return Vec::new();
    }
    let text = match state.content.text(slot) {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => {
            state.general_error = Some(ReviewError::validation(NOTHING_TO_READ_MESSAGE));
            return Vec::new();
        }
    };

    let mut effects = Vec::with_capacity(2);
    if state.voice_output.active_slot().is_some() {
        effects.push(Effect::CancelSpeech);
    }
    state.next_utterance += 1;
    let utterance = state.next_utterance;
    state.voice_output = VoiceOutputState::Speaking { slot, utterance };
    effects.push(Effect::Speak {
        utterance,
        slot,
        text,
    });
    effects
}

fn teardown(state: &mut ReviewState) -> Vec<Effect> {
    let mut effects = Vec::new();
    if let Some(handle) = state.content.teardown() {
        effects.push(Effect::ReleaseImage { handle });
    }
    if state.voice_input == VoiceInputState::Recording {
        effects.push(Effect::StopCapture);
    }
    if state.voice_output.active_slot().is_some() {
        effects.push(Effect::CancelSpeech);
    }
    state.load_all_pending.clear();
    state.status.reset_polls();
    state.action.in_flight = None;
    state.action.outcome = None;
    state.action.cycle = None;
    state.composer.close();
    state.search.invalidate();
    state.voice_input = VoiceInputState::Idle;
    state.voice_output = VoiceOutputState::Idle;
    state.general_error = None;
    state.mark_dirty();
    effects
}
