use std::fmt::Write;

use chrono::{DateTime, NaiveDateTime};
use review_core::{ActionOutcome, ReviewViewModel, SearchHit, SlotView};
use review_engine::StoreOverview;

const RULE: &str = "------------------------------------------------------------";

pub fn render(view: &ReviewViewModel) -> String {
    let mut out = String::new();

    let status = if view.status_loading {
        format!("{} (refreshing)", view.status_label)
    } else {
        view.status_label.to_string()
    };
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "Chapter: {} | Status: {} | {}/4 loaded",
        view.chapter_id, status, view.settled_slots
    );
    if let Some(error) = &view.status_error {
        let _ = writeln!(out, "  status error: {error}");
    }

    for slot in &view.slots {
        render_slot(&mut out, slot);
    }

    let _ = writeln!(out, "{RULE}");
    let actions = if view.action_busy {
        "busy"
    } else if view.actions_enabled {
        "ready"
    } else {
        "disabled"
    };
    let _ = write!(out, "Actions: {actions}");
    if view.regenerating {
        let _ = write!(out, " | waiting for regeneration");
    }
    let _ = writeln!(out);
    match &view.outcome {
        Some(ActionOutcome::Succeeded { message }) => {
            let _ = writeln!(out, "  {message}");
        }
        Some(ActionOutcome::Failed { error }) => {
            let _ = writeln!(out, "  ! {}", error.detail);
        }
        None => {}
    }

    if view.composer_open {
        let _ = writeln!(
            out,
            "Feedback{}: {}",
            if view.recording { " (recording)" } else { "" },
            if view.feedback_text.is_empty() {
                "<empty>"
            } else {
                &view.feedback_text
            }
        );
    } else if view.recording {
        let _ = writeln!(out, "Recording...");
    }
    if let Some(slot) = view.speaking {
        let _ = writeln!(out, "Reading aloud: {}", slot.label());
    }

    render_search(&mut out, view);

    if let Some(error) = &view.general_error {
        let _ = writeln!(out, "! {error}");
    }
    out
}

fn render_slot(out: &mut String, slot: &SlotView) {
    let mut header = format!("[{}]", slot.label);
    if slot.is_loading {
        header.push_str(" loading...");
    }
    if slot.speaking {
        header.push_str(" (speaking)");
    }
    let _ = writeln!(out, "{header}");

    if let Some(text) = &slot.text {
        for line in text.lines() {
            let _ = writeln!(out, "  {line}");
        }
    } else if let Some(image) = &slot.image {
        let _ = writeln!(
            out,
            "  image #{} ({} bytes, {})",
            image.id,
            image.byte_len,
            image.content_type.as_deref().unwrap_or("unknown type")
        );
    } else if !slot.is_loading && slot.error.is_none() {
        let _ = writeln!(out, "  <empty>");
    }
    if let Some(error) = &slot.error {
        let _ = writeln!(out, "  ! {error}");
    }
}

fn render_search(out: &mut String, view: &ReviewViewModel) {
    if view.search_loading {
        let _ = writeln!(out, "Searching...");
    }
    if let Some((message, is_error)) = &view.search_message {
        let prefix = if *is_error { "! " } else { "" };
        let _ = writeln!(out, "Search: {prefix}{message}");
    }
    if view.search_results.is_empty() {
        return;
    }
    let _ = writeln!(out, "Search results:");
    for hit in &view.search_results {
        render_hit(out, hit);
    }
}

fn render_hit(out: &mut String, hit: &SearchHit) {
    let version = hit.version_tag.as_deref().unwrap_or("unknown");
    let when = hit
        .timestamp
        .as_deref()
        .map(format_timestamp)
        .unwrap_or_else(|| "-".to_string());
    let distance = if hit.distance.is_finite() {
        format!("{:.4}", hit.distance)
    } else {
        "n/a".to_string()
    };
    let _ = writeln!(
        out,
        "  {} | {version} | {when} | distance {distance}",
        hit.id
    );
    let _ = writeln!(out, "    {}", hit.excerpt);
}

/// Formats backend timestamps (RFC 3339 or naive ISO 8601) for display.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(parsed) => parsed.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// One line for the startup health check.
pub fn render_health(result: &Result<String, review_engine::ApiError>) -> String {
    match result {
        Ok(reply) => format!("Backend: {}\n", reply.trim()),
        Err(err) => format!("Warning: backend unreachable ({})\n", err.describe()),
    }
}

pub fn render_overview(result: &Result<StoreOverview, review_engine::ApiError>) -> String {
    let overview = match result {
        Ok(overview) => overview,
        Err(err) => return format!("Store overview failed: {}\n", err.describe()),
    };

    let mut out = String::new();
    let _ = writeln!(out, "Store: {}", overview.status);
    if let Some(name) = &overview.collection_name {
        let _ = writeln!(out, "  collection: {name}");
    }
    if let Some(count) = overview.document_count {
        let _ = writeln!(out, "  documents: {count}");
    }
    if let Some(message) = &overview.message {
        let _ = writeln!(out, "  {message}");
    }
    for version in &overview.chapter_versions {
        let _ = writeln!(
            out,
            "  {} | {} | {} | {} chars",
            version.id,
            version.version_type,
            format_timestamp(&version.timestamp),
            version.content_length
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use review_core::{update, Capabilities, Msg, ReviewState, Slot, SlotValue};

    use super::*;

    #[test]
    fn timestamps_are_formatted_when_parseable() {
        assert_eq!(format_timestamp("2025-06-01T10:00:00.123456"), "2025-06-01 10:00:00");
        assert_eq!(format_timestamp("2025-06-01T10:00:00+02:00"), "2025-06-01 10:00:00");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn render_shows_progress_and_slot_errors() {
        let (state, _) = update(
            ReviewState::new("chapter_1", Capabilities::default()),
            Msg::Mounted,
        );
        let (state, _) = update(
            state,
            Msg::SlotLoaded {
                slot: Slot::Original,
                generation: 1,
                result: Ok(SlotValue::Text("It was morning.".to_string())),
            },
        );
        let out = render(&state.view());

        assert!(out.contains("Status: Processing | 1/4 loaded"));
        assert!(out.contains("  It was morning."));
        assert!(out.contains("loading..."));
    }

    #[test]
    fn overview_failure_is_described() {
        let err = review_engine::ApiError {
            kind: review_engine::FailureKind::HttpStatus(503),
            message: "Service Unavailable".to_string(),
            server_message: None,
        };
        assert_eq!(
            render_overview(&Err(err)),
            "Store overview failed: HTTP error! status: 503 - Service Unavailable\n"
        );
    }

    #[test]
    fn health_reply_or_warning() {
        assert_eq!(
            render_health(&Ok("Backend is running\n".to_string())),
            "Backend: Backend is running\n"
        );
        let err = review_engine::ApiError {
            kind: review_engine::FailureKind::Network,
            message: "connection refused".to_string(),
            server_message: None,
        };
        assert_eq!(
            render_health(&Err(err)),
            "Warning: backend unreachable (connection refused)\n"
        );
    }
}
