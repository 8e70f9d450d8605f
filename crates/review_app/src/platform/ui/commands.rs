use std::path::PathBuf;

use review_core::{Msg, Slot, WorkflowAction};

pub const HELP: &str = "\
commands:
  approve                         approve the rewrite
  revise                          open a fresh feedback draft
  feedback <text>                 replace the feedback draft
  submit                          request a revision with the draft
  cancel                          discard the draft
  record | stop                   dictate into the draft
  speak <original|spun|comments>  read a panel aloud (again to stop)
  search <text>                   semantic search over stored versions
  reload                          reload all panels
  store                           show the content store overview
  screenshot <file>               save the loaded screenshot
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(Msg),
    Overview,
    SaveScreenshot(PathBuf),
    Help,
    Quit,
    Unknown(String),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse(line: &str, search_limit: usize) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "approve" => Command::Dispatch(Msg::ActionRequested(WorkflowAction::Approve)),
        "revise" => Command::Dispatch(Msg::FeedbackOpened),
        "feedback" => Command::Dispatch(Msg::FeedbackEdited(rest.to_string())),
        "submit" => Command::Dispatch(Msg::FeedbackSubmitted),
        "cancel" => Command::Dispatch(Msg::FeedbackClosed),
        "record" => Command::Dispatch(Msg::RecordClicked),
        "stop" => Command::Dispatch(Msg::StopRecordingClicked),
        "speak" => match parse_slot(rest) {
            Some(slot) => Command::Dispatch(Msg::SpeakClicked(slot)),
            None => Command::Unknown(line.to_string()),
        },
        // Blank queries still go to core so the validation message shows.
        "search" => Command::Dispatch(Msg::SearchSubmitted {
            query: rest.to_string(),
            limit: search_limit,
        }),
        "reload" => Command::Dispatch(Msg::ReloadClicked),
        "store" => Command::Overview,
        "screenshot" if !rest.is_empty() => Command::SaveScreenshot(PathBuf::from(rest)),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    };
    Some(command)
}

fn parse_slot(word: &str) -> Option<Slot> {
    match word.to_ascii_lowercase().as_str() {
        "original" => Some(Slot::Original),
        "spun" | "rewrite" => Some(Slot::Spun),
        "comments" | "review" | "review_comments" => Some(Slot::ReviewComments),
        _ => None,
    }
}
