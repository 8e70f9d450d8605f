use std::sync::{mpsc, Arc};

use crate::{ApiError, EngineEvent, FailureKind};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Returned by a port that cannot serve the request on this platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{feature} is not supported on this platform")]
pub struct SpeechUnavailable {
    pub feature: &'static str,
}

impl From<SpeechUnavailable> for ApiError {
    fn from(err: SpeechUnavailable) -> Self {
        ApiError::new(FailureKind::Unsupported, err.to_string())
    }
}

/// Speech-to-text. Finalized transcripts are reported as
/// [`EngineEvent::Transcript`], followed by [`EngineEvent::CaptureEnded`] or
/// [`EngineEvent::CaptureFailed`]. Failures after a successful start go
/// through the sink.
pub trait SpeechCapture: Send + Sync {
    fn is_available(&self) -> bool;
    fn start(&self, sink: Arc<dyn EventSink>) -> Result<(), SpeechUnavailable>;
    fn stop(&self);
}

/// Text-to-speech. Completion is reported as [`EngineEvent::SpeechEnded`] or
/// [`EngineEvent::SpeechFailed`] carrying the utterance id.
pub trait SpeechSynthesis: Send + Sync {
    fn is_available(&self) -> bool;
    fn speak(&self, utterance: u64, text: &str, sink: Arc<dyn EventSink>)
        -> Result<(), SpeechUnavailable>;
    fn cancel(&self);
}

#[derive(Clone)]
pub struct SpeechPorts {
    pub capture: Arc<dyn SpeechCapture>,
    pub synthesis: Arc<dyn SpeechSynthesis>,
}

impl SpeechPorts {
    pub fn unsupported() -> Self {
        Self {
            capture: Arc::new(UnsupportedSpeech),
            synthesis: Arc::new(UnsupportedSpeech),
        }
    }

    /// `(capture, synthesis)` availability.
    pub fn availability(&self) -> (bool, bool) {
        (self.capture.is_available(), self.synthesis.is_available())
    }
}

impl Default for SpeechPorts {
    fn default() -> Self {
        Self::unsupported()
    }
}

/// Used on platforms without a speech backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedSpeech;

impl SpeechCapture for UnsupportedSpeech {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&self, _sink: Arc<dyn EventSink>) -> Result<(), SpeechUnavailable> {
        Err(SpeechUnavailable {
            feature: "speech recognition",
        })
    }

    fn stop(&self) {}
}

impl SpeechSynthesis for UnsupportedSpeech {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(
        &self,
        _utterance: u64,
        _text: &str,
        _sink: Arc<dyn EventSink>,
    ) -> Result<(), SpeechUnavailable> {
        Err(SpeechUnavailable {
            feature: "speech synthesis",
        })
    }

    fn cancel(&self) {}
}
