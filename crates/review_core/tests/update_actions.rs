use std::sync::Once;
use std::time::Duration;

use pretty_assertions::assert_eq;
use review_core::{
    update, ActionKind, ActionOutcome, Capabilities, ChapterStatus, Effect, ErrorKind, Msg,
    RegenerationPolicy, ReviewError, ReviewState, Slot, SlotValue, WorkflowAction,
    ALREADY_APPROVED_MESSAGE, REVISION_IN_PROGRESS_MESSAGE,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(review_logging::initialize_for_tests);
}

/// A session whose initial load and first status poll have settled.
fn settled_with_status(status: &str) -> ReviewState {
    let (mut state, effects) = update(
        ReviewState::new("chapter_1", Capabilities::default()),
        Msg::Mounted,
    );
    let mut status_effects = Vec::new();
    for effect in effects {
        if let Effect::FetchSlot { slot, generation } = effect {
            let value = match slot {
                Slot::Screenshot => continue,
                _ => SlotValue::Text(format!("{slot:?} text")),
            };
            let (next, follow_up) = update(
                state,
                Msg::SlotLoaded { slot, generation, result: Ok(value) },
            );
            state = next;
            status_effects.extend(follow_up);
        }
    }
    let (next, follow_up) = update(
        state,
        Msg::SlotLoaded {
            slot: Slot::Screenshot,
            generation: 1,
            result: Err(ReviewError::new(ErrorKind::Transport, "offline")),
        },
    );
    status_effects.extend(follow_up);
    assert_eq!(status_effects, vec![Effect::FetchStatus { revision: 0 }]);

    let (mut state, _) = update(
        next,
        Msg::StatusFetched {
            revision: 0,
            result: Ok(Some(status.to_string())),
        },
    );
    state.consume_dirty();
    state
}

fn server_error(message: &str) -> ReviewError {
    ReviewError::new(
        ErrorKind::Http {
            status: 500,
            server_message: Some(message.to_string()),
        },
        message,
    )
}

#[test]
fn status_without_latest_status_is_pending() {
    init_logging();
    let (state, _) = update(
        ReviewState::new("chapter_1", Capabilities::default()),
        Msg::StatusFetched { revision: 0, result: Ok(None) },
    );
    assert_eq!(state.status().status, ChapterStatus::Pending);
    assert!(state.status().error.is_none());
}

#[test]
fn status_transport_failure_fails_open_to_pending() {
    init_logging();
    let (state, _) = update(
        ReviewState::new("chapter_1", Capabilities::default()),
        Msg::StatusFetched {
            revision: 0,
            result: Err(ReviewError::new(ErrorKind::Transport, "connection refused")),
        },
    );
    assert_eq!(state.status().status, ChapterStatus::Pending);
    assert_eq!(
        state.view().status_error.as_deref(),
        Some("Failed to fetch chapter status: connection refused")
    );
}

#[test]
fn approve_success_sets_approved_and_refreshes() {
    init_logging();
    let state = settled_with_status("pending");

    let (state, effects) = update(state, Msg::ActionRequested(WorkflowAction::Approve));
    assert_eq!(
        effects,
        vec![Effect::SubmitAction { action: WorkflowAction::Approve }]
    );
    assert!(state.view().action_busy);
    assert!(!state.view().actions_enabled);

    let (state, effects) = update(
        state,
        Msg::ActionCompleted {
            action: ActionKind::Approve,
            result: Ok("Chapter 'chapter_1' approved successfully.".to_string()),
        },
    );
    assert_eq!(effects, vec![Effect::FetchStatus { revision: 1 }]);
    assert_eq!(state.status().status, ChapterStatus::Approved);
    assert_eq!(
        state.action().outcome,
        Some(ActionOutcome::Succeeded {
            message: "Chapter 'chapter_1' approved successfully.".to_string()
        })
    );
    assert!(!state.view().action_busy);
}

#[test]
fn approve_failure_leaves_status_and_sets_action_error() {
    init_logging();
    let state = settled_with_status("pending");

    let (state, _) = update(state, Msg::ActionRequested(WorkflowAction::Approve));
    let (state, effects) = update(
        state,
        Msg::ActionCompleted {
            action: ActionKind::Approve,
            result: Err(server_error("No spun content found to approve.")),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.status().status, ChapterStatus::Pending);
    match &state.action().outcome {
        Some(ActionOutcome::Failed { error }) => {
            assert_eq!(error.to_string(), "Action failed: No spun content found to approve.");
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    // The next attempt clears the previous error.
    let (state, effects) = update(state, Msg::ActionRequested(WorkflowAction::Approve));
    assert_eq!(effects.len(), 1);
    assert_eq!(state.action().outcome, None);
}

#[test]
fn actions_are_rejected_without_network_once_approved() {
    init_logging();
    let state = settled_with_status("approved");

    let (state, effects) = update(state, Msg::ActionRequested(WorkflowAction::Approve));
    assert!(effects.is_empty());
    let (state, effects) = update(
        state,
        Msg::ActionRequested(WorkflowAction::RequestRevision {
            feedback: "more dialogue".to_string(),
        }),
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.action().outcome,
        Some(ActionOutcome::Failed {
            error: ReviewError::validation(ALREADY_APPROVED_MESSAGE)
        })
    );
    assert!(!state.view().actions_enabled);
}

#[test]
fn second_action_is_gated_while_one_is_in_flight() {
    init_logging();
    let state = settled_with_status("pending");

    let (state, effects) = update(state, Msg::ActionRequested(WorkflowAction::Approve));
    assert_eq!(effects.len(), 1);
    let (state, effects) = update(
        state,
        Msg::ActionRequested(WorkflowAction::RequestRevision { feedback: String::new() }),
    );
    assert!(effects.is_empty());
    assert_eq!(state.action().in_flight, Some(ActionKind::Approve));
}

#[test]
fn revision_waits_then_refetches_two_slots_and_refreshes_once() {
    init_logging();
    let state = settled_with_status("pending");

    let (state, _) = update(state, Msg::FeedbackOpened);
    let (state, _) = update(state, Msg::FeedbackEdited("  Keep the archaic tone. ".to_string()));
    let (state, effects) = update(state, Msg::FeedbackSubmitted);
    assert_eq!(
        effects,
        vec![Effect::SubmitAction {
            action: WorkflowAction::RequestRevision {
                feedback: "Keep the archaic tone.".to_string()
            }
        }]
    );

    let (state, effects) = update(
        state,
        Msg::ActionCompleted {
            action: ActionKind::RequestRevision,
            result: Ok("revision requested".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::StartGraceTimer { cycle: 1, delay: Duration::from_secs(5) }]
    );
    assert_eq!(state.status().status, ChapterStatus::Processing);
    assert_eq!(
        state.action().outcome,
        Some(ActionOutcome::Succeeded {
            message: REVISION_IN_PROGRESS_MESSAGE.to_string()
        })
    );
    assert!(!state.composer().open);
    assert!(state.composer().text.is_empty());
    // Still gated during the grace interval.
    assert!(state.view().action_busy);

    let (state, effects) = update(state, Msg::GraceElapsed { cycle: 1 });
    assert_eq!(
        effects,
        vec![
            Effect::FetchSlot { slot: Slot::Spun, generation: 2 },
            Effect::FetchSlot { slot: Slot::ReviewComments, generation: 2 },
            Effect::FetchStatus { revision: 1 },
        ]
    );
    assert!(!state.view().action_busy);
    assert!(state.content().slot(Slot::Spun).is_loading);

    // A duplicate timer does not re-fetch.
    let (state, effects) = update(state, Msg::GraceElapsed { cycle: 1 });
    assert!(effects.is_empty());

    // With no extra polling configured, the cycle ends on the status answer.
    let (state, effects) = update(
        state,
        Msg::StatusFetched {
            revision: 1,
            result: Ok(Some("revision_requested".to_string())),
        },
    );
    assert!(effects.is_empty());
    assert!(!state.view().regenerating);
}

#[test]
fn revision_failure_keeps_status_and_closes_composer() {
    init_logging();
    let state = settled_with_status("pending");

    let (state, _) = update(state, Msg::FeedbackOpened);
    let (state, _) = update(state, Msg::FeedbackEdited("shorter".to_string()));
    let (state, _) = update(state, Msg::FeedbackSubmitted);
    let (state, effects) = update(
        state,
        Msg::ActionCompleted {
            action: ActionKind::RequestRevision,
            result: Err(ReviewError::new(
                ErrorKind::Http { status: 500, server_message: None },
                "Unknown error occurred.",
            )),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.status().status, ChapterStatus::Pending);
    assert!(!state.composer().open);
    assert!(!state.view().action_busy);
    assert!(matches!(
        &state.action().outcome,
        Some(ActionOutcome::Failed { error }) if error.detail == "Action failed: Unknown error occurred."
    ));
}

#[test]
fn stale_poll_cannot_overwrite_optimistic_approval() {
    init_logging();
    let (state, _) = update(
        ReviewState::new("chapter_1", Capabilities::default()),
        Msg::StatusFetched { revision: 0, result: Ok(Some("pending".to_string())) },
    );
    let (state, _) = update(state, Msg::ReloadClicked);
    let (state, _) = update(state, Msg::ActionRequested(WorkflowAction::Approve));
    let (state, refresh) = update(
        state,
        Msg::ActionCompleted { action: ActionKind::Approve, result: Ok("ok".to_string()) },
    );
    assert_eq!(refresh, vec![Effect::FetchStatus { revision: 1 }]);

    // A poll issued before the approval lands late.
    let (state, _) = update(
        state,
        Msg::StatusFetched { revision: 0, result: Ok(Some("pending".to_string())) },
    );
    assert_eq!(state.status().status, ChapterStatus::Approved);

    let (state, _) = update(
        state,
        Msg::StatusFetched { revision: 1, result: Ok(Some("approved".to_string())) },
    );
    assert_eq!(state.status().status, ChapterStatus::Approved);
    assert!(!state.status().is_loading());
}

#[test]
fn bounded_poll_backs_off_while_revision_is_unprocessed() {
    init_logging();
    let policy = RegenerationPolicy {
        grace: Duration::from_millis(100),
        max_polls: 2,
    };
    let state = settled_with_status("pending").with_policy(policy);

    let (state, _) = update(
        state,
        Msg::ActionRequested(WorkflowAction::RequestRevision { feedback: String::new() }),
    );
    let (state, _) = update(
        state,
        Msg::ActionCompleted { action: ActionKind::RequestRevision, result: Ok("ok".into()) },
    );

    let mut state = state;
    for expected_delay in [200, 400] {
        let (next, effects) = update(state, Msg::GraceElapsed { cycle: 1 });
        assert_eq!(effects.len(), 3);
        let (next, effects) = update(
            next,
            Msg::StatusFetched {
                revision: 1,
                result: Ok(Some("revision_requested".to_string())),
            },
        );
        assert_eq!(
            effects,
            vec![Effect::StartGraceTimer {
                cycle: 1,
                delay: Duration::from_millis(expected_delay)
            }]
        );
        state = next;
    }

    // Budget exhausted: the last round ends the cycle.
    let (state, effects) = update(state, Msg::GraceElapsed { cycle: 1 });
    assert_eq!(effects.len(), 3);
    let (state, effects) = update(
        state,
        Msg::StatusFetched {
            revision: 1,
            result: Ok(Some("revision_requested".to_string())),
        },
    );
    assert!(effects.is_empty());
    assert!(state.action().cycle.is_none());
}

#[test]
fn bounded_poll_stops_when_regeneration_is_seen() {
    init_logging();
    let policy = RegenerationPolicy {
        grace: Duration::from_millis(100),
        max_polls: 3,
    };
    let state = settled_with_status("pending").with_policy(policy);
    let (state, _) = update(
        state,
        Msg::ActionRequested(WorkflowAction::RequestRevision { feedback: "x".into() }),
    );
    let (state, _) = update(
        state,
        Msg::ActionCompleted { action: ActionKind::RequestRevision, result: Ok("ok".into()) },
    );
    let (state, _) = update(state, Msg::GraceElapsed { cycle: 1 });
    let (state, effects) = update(
        state,
        Msg::StatusFetched { revision: 1, result: Ok(Some("processing".to_string())) },
    );

    assert!(effects.is_empty());
    assert!(state.action().cycle.is_none());
    assert_eq!(state.status().status, ChapterStatus::Processing);
}
