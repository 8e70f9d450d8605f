use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use review_core::{update, Msg, ReviewState, Slot, SlotValue};
use review_engine::{EngineHandle, ReqwestReviewApi, SpeechPorts};
use review_logging::{review_info, review_warn};

use super::config::ReviewConfig;
use super::effects::{EffectRunner, Inbound};
use super::logging;
use super::ui::commands::{self, Command, HELP};
use super::ui::render;

const TICK: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<()> {
    let config = ReviewConfig::load();
    logging::initialize(config.log_destination);
    review_logging::set_context(config.chapter_id.clone());
    review_info!("Reviewing {} against {}", config.chapter_id, config.api_base);

    let api = ReqwestReviewApi::new(config.api_settings()).context("building HTTP client")?;
    let engine = EngineHandle::new(Arc::new(api), SpeechPorts::unsupported())
        .context("starting engine runtime")?;
    let runner = EffectRunner::new(engine, config.chapter_id.clone());
    let state =
        ReviewState::new(config.chapter_id.clone(), runner.capabilities()).with_policy(config.policy());

    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if line_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        review_warn!("stdin read failed: {}", err);
                        break;
                    }
                }
            }
        })
        .context("spawning stdin reader")?;

    let mut session = ReviewSession::new(state, runner);
    let mut out = io::stdout();
    writeln!(out, "{HELP}")?;
    session.runner.check_health();
    session.dispatch(Msg::Mounted);

    loop {
        match line_rx.recv_timeout(TICK) {
            Ok(line) => match commands::parse(&line, config.search_limit) {
                Some(Command::Dispatch(msg)) => session.dispatch(msg),
                Some(Command::Overview) => session.runner.fetch_overview(),
                Some(Command::SaveScreenshot(path)) => {
                    writeln!(out, "{}", session.save_screenshot(&path))?
                }
                Some(Command::Help) => writeln!(out, "{HELP}")?,
                Some(Command::Quit) => break,
                Some(Command::Unknown(input)) => {
                    writeln!(out, "Unknown command: {input} (try `help`)")?
                }
                None => {}
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        for text in session.pump() {
            write!(out, "{text}")?;
        }
        if let Some(view) = session.take_render() {
            write!(out, "{view}")?;
            out.flush()?;
        }
    }

    session.dispatch(Msg::NavigatedAway);
    session.runner.shutdown();
    review_info!("Review session closed");
    Ok(())
}

/// Owns the review state and feeds effects to the engine.
struct ReviewSession {
    state: ReviewState,
    runner: EffectRunner,
}

impl ReviewSession {
    fn new(state: ReviewState, runner: EffectRunner) -> Self {
        Self { state, runner }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }

    /// Applies pending engine events; returns any standalone output.
    fn pump(&mut self) -> Vec<String> {
        let mut printed = Vec::new();
        for inbound in self.runner.drain() {
            match inbound {
                Inbound::Msg(msg) => self.dispatch(msg),
                Inbound::Overview(result) => printed.push(render::render_overview(&result)),
                Inbound::Health(result) => {
                    match &result {
                        Ok(reply) => review_info!("backend health: {}", reply.trim()),
                        Err(err) => review_warn!("backend health check failed: {}", err),
                    }
                    printed.push(render::render_health(&result));
                }
            }
        }
        printed
    }

    /// Writes the currently displayed screenshot to `path`.
    fn save_screenshot(&self, path: &Path) -> String {
        let handle = match &self.state.content().slot(Slot::Screenshot).value {
            Some(SlotValue::Image(handle)) => handle,
            _ => return "No screenshot loaded.".to_string(),
        };
        let Some(bytes) = self.runner.image_bytes(handle) else {
            return "Screenshot was released.".to_string();
        };
        match fs::write(path, &bytes) {
            Ok(()) => {
                review_info!("saved screenshot {} to {}", handle.id, path.display());
                format!("Saved {} bytes to {}", bytes.len(), path.display())
            }
            Err(err) => {
                review_warn!("saving screenshot to {} failed: {}", path.display(), err);
                format!("Could not save screenshot: {err}")
            }
        }
    }

    fn take_render(&mut self) -> Option<String> {
        if self.state.consume_dirty() {
            Some(render::render(&self.state.view()))
        } else {
            None
        }
    }
}
