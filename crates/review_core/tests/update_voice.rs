use review_core::{
    update, Capabilities, Effect, ErrorKind, Msg, ReviewError, ReviewState, Slot, SlotValue,
    VoiceInputState, VoiceOutputState, NOTHING_TO_READ_MESSAGE,
};

fn with_text(capabilities: Capabilities) -> ReviewState {
    let (mut state, _) = update(ReviewState::new("chapter_1", capabilities), Msg::Mounted);
    for (slot, text) in [
        (Slot::Original, "The gates opened at dawn."),
        (Slot::Spun, "At first light the gates swung wide."),
        (Slot::ReviewComments, ""),
    ] {
        let (next, _) = update(
            state,
            Msg::SlotLoaded {
                slot,
                generation: 1,
                result: Ok(SlotValue::Text(text.to_string())),
            },
        );
        state = next;
    }
    state
}

fn record_cycle(state: ReviewState, transcript: &str) -> ReviewState {
    let (state, effects) = update(state, Msg::RecordClicked);
    assert_eq!(effects, vec![Effect::StartCapture]);
    assert_eq!(state.voice_input(), VoiceInputState::Recording);
    let (state, _) = update(state, Msg::TranscriptFinalized(transcript.to_string()));
    let (state, effects) = update(state, Msg::StopRecordingClicked);
    assert_eq!(effects, vec![Effect::StopCapture]);
    let (state, _) = update(state, Msg::CaptureEnded);
    assert_eq!(state.voice_input(), VoiceInputState::Idle);
    state
}

#[test]
fn two_recording_cycles_accumulate_feedback() {
    let state = with_text(Capabilities::all());
    let state = record_cycle(state, "hello");
    let state = record_cycle(state, "world");

    assert_eq!(state.composer().text, "hello world");
    assert!(state.composer().open);
}

#[test]
fn opening_the_composer_starts_a_fresh_session() {
    let state = with_text(Capabilities::all());
    let state = record_cycle(state, "hello");
    let (state, _) = update(state, Msg::FeedbackOpened);
    let state = record_cycle(state, "again");

    assert_eq!(state.composer().text, "again");
}

#[test]
fn recording_without_capture_support_reports_capability_error() {
    let state = with_text(Capabilities {
        speech_capture: false,
        speech_synthesis: true,
    });
    let (state, effects) = update(state, Msg::RecordClicked);

    assert!(effects.is_empty());
    assert_eq!(state.voice_input(), VoiceInputState::Idle);
    assert_eq!(
        state.general_error().map(|e| e.kind.clone()),
        Some(ErrorKind::CapabilityUnavailable)
    );
}

#[test]
fn recognition_error_returns_to_idle_and_keeps_text() {
    let state = with_text(Capabilities::all());
    let state = record_cycle(state, "keep this");
    let (state, _) = update(state, Msg::RecordClicked);
    let (state, _) = update(
        state,
        Msg::CaptureFailed(ReviewError::new(ErrorKind::Transport, "no-speech")),
    );

    assert_eq!(state.voice_input(), VoiceInputState::Idle);
    assert_eq!(state.composer().text, "keep this");
    assert_eq!(state.view().general_error.as_deref(), Some("no-speech"));
}

#[test]
fn speaking_the_same_slot_again_stops_playback() {
    let state = with_text(Capabilities::all());
    let (state, effects) = update(state, Msg::SpeakClicked(Slot::Original));
    assert_eq!(
        effects,
        vec![Effect::Speak {
            utterance: 1,
            slot: Slot::Original,
            text: "The gates opened at dawn.".to_string(),
        }]
    );

    let (state, effects) = update(state, Msg::SpeakClicked(Slot::Original));
    assert_eq!(effects, vec![Effect::CancelSpeech]);
    assert_eq!(state.voice_output(), VoiceOutputState::Idle);
}

#[test]
fn speaking_another_slot_cancels_then_starts() {
    let state = with_text(Capabilities::all());
    let (state, _) = update(state, Msg::SpeakClicked(Slot::Original));
    let (state, effects) = update(state, Msg::SpeakClicked(Slot::Spun));

    assert_eq!(
        effects,
        vec![
            Effect::CancelSpeech,
            Effect::Speak {
                utterance: 2,
                slot: Slot::Spun,
                text: "At first light the gates swung wide.".to_string(),
            },
        ]
    );
    assert_eq!(
        state.voice_output(),
        VoiceOutputState::Speaking { slot: Slot::Spun, utterance: 2 }
    );

    // The cancelled utterance reports its end late; it must not stop the new one.
    let (state, _) = update(state, Msg::SpeechEnded { utterance: 1 });
    assert_eq!(state.voice_output().active_slot(), Some(Slot::Spun));

    let (state, _) = update(state, Msg::SpeechEnded { utterance: 2 });
    assert_eq!(state.voice_output(), VoiceOutputState::Idle);
}

#[test]
fn synthesis_error_goes_to_the_general_channel() {
    let state = with_text(Capabilities::all());
    let (state, _) = update(state, Msg::SpeakClicked(Slot::Spun));
    let (state, _) = update(
        state,
        Msg::SpeechFailed {
            utterance: 1,
            error: ReviewError::new(ErrorKind::Transport, "audio device busy"),
        },
    );

    assert_eq!(state.voice_output(), VoiceOutputState::Idle);
    assert_eq!(state.view().general_error.as_deref(), Some("audio device busy"));
    assert!(state.content().slot(Slot::Spun).error.is_none());
}

#[test]
fn empty_slot_is_not_spoken() {
    let state = with_text(Capabilities::all());
    let (state, effects) = update(state, Msg::SpeakClicked(Slot::ReviewComments));

    assert!(effects.is_empty());
    assert_eq!(state.view().general_error.as_deref(), Some(NOTHING_TO_READ_MESSAGE));
}

#[test]
fn voice_input_and_output_coexist() {
    let state = with_text(Capabilities::all());
    let (state, _) = update(state, Msg::SpeakClicked(Slot::Original));
    let (state, effects) = update(state, Msg::RecordClicked);

    assert_eq!(effects, vec![Effect::StartCapture]);
    assert_eq!(state.voice_input(), VoiceInputState::Recording);
    assert_eq!(state.voice_output().active_slot(), Some(Slot::Original));

    let (_state, effects) = update(state, Msg::NavigatedAway);
    assert_eq!(effects, vec![Effect::StopCapture, Effect::CancelSpeech]);
}
