//! Voice capture and playback state.
//!
//! Both machines are independent of each other: a reviewer may dictate
//! feedback while a slot is being read aloud.

use crate::Slot;

/// Platform speech features detected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub speech_capture: bool,
    pub speech_synthesis: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            speech_capture: true,
            speech_synthesis: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceInputState {
    #[default]
    Idle,
    Recording,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceOutputState {
    #[default]
    Idle,
    Speaking { slot: Slot, utterance: u64 },
}

impl VoiceOutputState {
    pub fn active_slot(&self) -> Option<Slot> {
        match self {
            VoiceOutputState::Speaking { slot, .. } => Some(*slot),
            VoiceOutputState::Idle => None,
        }
    }

    pub fn is_active_utterance(&self, id: u64) -> bool {
        matches!(self, VoiceOutputState::Speaking { utterance, .. } if *utterance == id)
    }
}

/// Feedback text being composed for a revision request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedbackComposer {
    pub open: bool,
    pub text: String,
}

impl FeedbackComposer {
    /// Starts a fresh feedback session.
    pub(crate) fn open_fresh(&mut self) {
        self.open = true;
        self.text.clear();
    }

    pub(crate) fn close(&mut self) {
        self.open = false;
        self.text.clear();
    }

    /// Appends a finalized transcript, space-joined with what is already there.
    pub(crate) fn append_transcript(&mut self, transcript: &str) -> bool {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return false;
        }
        if !self.text.trim_end().is_empty() {
            let trimmed_len = self.text.trim_end().len();
            self.text.truncate(trimmed_len);
            self.text.push(' ');
        }
        self.text.push_str(transcript);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcripts_are_space_joined() {
        let mut composer = FeedbackComposer::default();
        composer.open_fresh();
        assert!(composer.append_transcript("hello"));
        assert!(composer.append_transcript("  world "));
        assert!(!composer.append_transcript("   "));
        assert_eq!(composer.text, "hello world");
    }

    #[test]
    fn typed_text_with_trailing_space_is_not_doubled() {
        let mut composer = FeedbackComposer {
            open: true,
            text: "tighten the pacing ".to_string(),
        };
        composer.append_transcript("in act two");
        assert_eq!(composer.text, "tighten the pacing in act two");
    }
}
