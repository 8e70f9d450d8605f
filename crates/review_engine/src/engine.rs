use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use review_logging::{review_debug, review_info, review_warn};
use tokio_util::sync::CancellationToken;

use crate::images::ImageRegistry;
use crate::speech::{ChannelEventSink, EventSink, SpeechPorts};
use crate::{ActionRequest, ContentKind, EngineEvent, ReviewApi, SearchRequest};

enum EngineCommand {
    FetchContent {
        chapter_id: String,
        kind: ContentKind,
        generation: u64,
    },
    FetchScreenshot {
        generation: u64,
    },
    FetchStatus {
        chapter_id: String,
        revision: u64,
    },
    SubmitAction {
        chapter_id: String,
        action: ActionRequest,
    },
    StartTimer {
        token: u64,
        delay: Duration,
    },
    Search {
        generation: u64,
        request: SearchRequest,
    },
    FetchOverview,
    CheckHealth,
    ReleaseImage {
        id: u64,
    },
    StartCapture,
    StopCapture,
    Speak {
        utterance: u64,
        text: String,
    },
    CancelSpeech,
    Shutdown,
}

/// Runs backend requests, timers and speech on a background tokio runtime.
/// Results come back as [`EngineEvent`]s through [`EngineHandle::try_recv`].
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    images: ImageRegistry,
    speech: SpeechPorts,
}

impl EngineHandle {
    pub fn new(api: Arc<dyn ReviewApi>, speech: SpeechPorts) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let images = ImageRegistry::new();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("review-engine")
            .on_thread_start(|| review_logging::set_context("engine"))
            .build()?;

        let worker = Worker {
            api,
            images: images.clone(),
            speech: speech.clone(),
            event_tx,
            shutdown: CancellationToken::new(),
        };

        thread::Builder::new()
            .name("review-engine-loop".to_string())
            .spawn(move || {
                review_logging::set_context("engine");
                while let Ok(command) = cmd_rx.recv() {
                    if matches!(command, EngineCommand::Shutdown) {
                        break;
                    }
                    worker.handle(&runtime, command);
                }
                worker.shutdown.cancel();
                worker.speech.capture.stop();
                worker.speech.synthesis.cancel();
                review_info!("engine loop stopped");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            images,
            speech,
        })
    }

    /// `(capture, synthesis)` availability of the configured speech ports.
    pub fn speech_availability(&self) -> (bool, bool) {
        self.speech.availability()
    }

    pub fn fetch_content(&self, chapter_id: &str, kind: ContentKind, generation: u64) {
        self.send(EngineCommand::FetchContent {
            chapter_id: chapter_id.to_string(),
            kind,
            generation,
        });
    }

    pub fn fetch_screenshot(&self, generation: u64) {
        self.send(EngineCommand::FetchScreenshot { generation });
    }

    pub fn fetch_status(&self, chapter_id: &str, revision: u64) {
        self.send(EngineCommand::FetchStatus {
            chapter_id: chapter_id.to_string(),
            revision,
        });
    }

    pub fn submit_action(&self, chapter_id: &str, action: ActionRequest) {
        self.send(EngineCommand::SubmitAction {
            chapter_id: chapter_id.to_string(),
            action,
        });
    }

    /// Emits [`EngineEvent::TimerElapsed`] after `delay` unless the engine shuts down first.
    pub fn start_timer(&self, token: u64, delay: Duration) {
        self.send(EngineCommand::StartTimer { token, delay });
    }

    pub fn search(&self, generation: u64, request: SearchRequest) {
        self.send(EngineCommand::Search {
            generation,
            request,
        });
    }

    pub fn fetch_overview(&self) {
        self.send(EngineCommand::FetchOverview);
    }

    /// Emits [`EngineEvent::HealthChecked`] with the backend's root reply.
    pub fn check_health(&self) {
        self.send(EngineCommand::CheckHealth);
    }

    pub fn release_image(&self, id: u64) {
        self.send(EngineCommand::ReleaseImage { id });
    }

    /// Bytes of a registered screenshot, `None` once released.
    pub fn image_bytes(&self, id: u64) -> Option<Bytes> {
        self.images.get(id)
    }

    pub fn start_capture(&self) {
        self.send(EngineCommand::StartCapture);
    }

    pub fn stop_capture(&self) {
        self.send(EngineCommand::StopCapture);
    }

    pub fn speak(&self, utterance: u64, text: impl Into<String>) {
        self.send(EngineCommand::Speak {
            utterance,
            text: text.into(),
        });
    }

    pub fn cancel_speech(&self) {
        self.send(EngineCommand::CancelSpeech);
    }

    /// Cancels pending timers and stops the engine loop.
    pub fn shutdown(&self) {
        self.send(EngineCommand::Shutdown);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            review_warn!("engine loop is gone; command dropped");
        }
    }
}

struct Worker {
    api: Arc<dyn ReviewApi>,
    images: ImageRegistry,
    speech: SpeechPorts,
    event_tx: mpsc::Sender<EngineEvent>,
    shutdown: CancellationToken,
}

impl Worker {
    fn sink(&self) -> Arc<dyn EventSink> {
        Arc::new(ChannelEventSink::new(self.event_tx.clone()))
    }

    fn handle(&self, runtime: &tokio::runtime::Runtime, command: EngineCommand) {
        let api = self.api.clone();
        let event_tx = self.event_tx.clone();
        match command {
            EngineCommand::FetchContent {
                chapter_id,
                kind,
                generation,
            } => {
                runtime.spawn(async move {
                    let result = api.fetch_content(&chapter_id, kind).await;
                    let _ = event_tx.send(EngineEvent::ContentFetched {
                        kind,
                        generation,
                        result,
                    });
                });
            }
            EngineCommand::FetchScreenshot { generation } => {
                let images = self.images.clone();
                runtime.spawn(async move {
                    let result = api
                        .fetch_screenshot()
                        .await
                        .map(|screenshot| images.register(screenshot));
                    let _ = event_tx.send(EngineEvent::ScreenshotFetched { generation, result });
                });
            }
            EngineCommand::FetchStatus {
                chapter_id,
                revision,
            } => {
                runtime.spawn(async move {
                    let result = api.fetch_status(&chapter_id).await;
                    let _ = event_tx.send(EngineEvent::StatusFetched { revision, result });
                });
            }
            EngineCommand::SubmitAction { chapter_id, action } => {
                review_info!("submitting {:?} for {chapter_id}", action.endpoint());
                runtime.spawn(async move {
                    let endpoint = action.endpoint();
                    let result = api.submit_action(&chapter_id, &action).await;
                    let _ = event_tx.send(EngineEvent::ActionCompleted { endpoint, result });
                });
            }
            EngineCommand::StartTimer { token, delay } => {
                let cancel = self.shutdown.clone();
                runtime.spawn(async move {
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = tokio::time::sleep(delay) => {
                            let _ = event_tx.send(EngineEvent::TimerElapsed { token });
                        }
                    }
                });
            }
            EngineCommand::Search {
                generation,
                request,
            } => {
                runtime.spawn(async move {
                    let result = api.semantic_search(&request).await;
                    let _ = event_tx.send(EngineEvent::SearchCompleted { generation, result });
                });
            }
            EngineCommand::FetchOverview => {
                runtime.spawn(async move {
                    let result = api.store_overview().await;
                    let _ = event_tx.send(EngineEvent::OverviewFetched { result });
                });
            }
            EngineCommand::CheckHealth => {
                runtime.spawn(async move {
                    let result = api.health().await;
                    let _ = event_tx.send(EngineEvent::HealthChecked { result });
                });
            }
            EngineCommand::ReleaseImage { id } => {
                if !self.images.release(id) {
                    review_debug!("image {id} already released");
                }
            }
            EngineCommand::StartCapture => {
                if let Err(err) = self.speech.capture.start(self.sink()) {
                    let _ = event_tx.send(EngineEvent::CaptureFailed { error: err.into() });
                }
            }
            EngineCommand::StopCapture => self.speech.capture.stop(),
            EngineCommand::Speak { utterance, text } => {
                if let Err(err) = self.speech.synthesis.speak(utterance, &text, self.sink()) {
                    let _ = event_tx.send(EngineEvent::SpeechFailed {
                        utterance,
                        error: err.into(),
                    });
                }
            }
            EngineCommand::CancelSpeech => self.speech.synthesis.cancel(),
            EngineCommand::Shutdown => {}
        }
    }
}
