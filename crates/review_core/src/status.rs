use crate::ReviewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChapterStatus {
    #[default]
    Processing,
    Pending,
    Approved,
    RevisionRequested,
}

impl ChapterStatus {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "processing" => Some(ChapterStatus::Processing),
            "pending" => Some(ChapterStatus::Pending),
            "approved" => Some(ChapterStatus::Approved),
            "revision_requested" => Some(ChapterStatus::RevisionRequested),
            _ => None,
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            ChapterStatus::Processing => "processing",
            ChapterStatus::Pending => "pending",
            ChapterStatus::Approved => "approved",
            ChapterStatus::RevisionRequested => "revision_requested",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChapterStatus::Processing => "Processing",
            ChapterStatus::Pending => "Pending Review",
            ChapterStatus::Approved => "Approved",
            ChapterStatus::RevisionRequested => "Revision Requested",
        }
    }
}

/// Single-writer register for the chapter status.
///
/// `revision` counts optimistic writes. A poll is tagged with the revision at
/// which it was issued and is only applied if no optimistic write happened
/// since, so a slow poll can never roll back a newer local decision.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusRegister {
    pub status: ChapterStatus,
    pub error: Option<ReviewError>,
    revision: u64,
    polls_in_flight: u32,
}

impl StatusRegister {
    pub fn is_loading(&self) -> bool {
        self.polls_in_flight > 0
    }

    pub(crate) fn begin_poll(&mut self) -> u64 {
        self.polls_in_flight += 1;
        self.error = None;
        self.revision
    }

    pub(crate) fn write_optimistic(&mut self, status: ChapterStatus) {
        self.revision += 1;
        self.status = status;
    }

    /// Applies a poll result. Returns `false` when the result was stale.
    pub(crate) fn apply_poll(
        &mut self,
        issued_at: u64,
        result: Result<Option<String>, ReviewError>,
    ) -> bool {
        self.polls_in_flight = self.polls_in_flight.saturating_sub(1);
        if issued_at < self.revision {
            return false;
        }
        match result {
            Ok(raw) => {
                self.status = raw
                    .as_deref()
                    .and_then(ChapterStatus::from_wire)
                    .unwrap_or(ChapterStatus::Pending);
                self.error = None;
            }
            Err(err) => {
                // Fail open: never leave the reviewer stuck on "processing".
                self.status = ChapterStatus::Pending;
                self.error = Some(err.prefixed("Failed to fetch chapter status: "));
            }
        }
        true
    }

    pub(crate) fn reset_polls(&mut self) {
        self.polls_in_flight = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn wire_names_round_trip() {
        for status in [
            ChapterStatus::Processing,
            ChapterStatus::Pending,
            ChapterStatus::Approved,
            ChapterStatus::RevisionRequested,
        ] {
            assert_eq!(ChapterStatus::from_wire(status.as_wire()), Some(status));
        }
        assert_eq!(ChapterStatus::from_wire("Approved"), None);
    }

    #[test]
    fn unrecognised_status_defaults_to_pending() {
        let mut register = StatusRegister::default();
        let issued = register.begin_poll();
        assert!(register.apply_poll(issued, Ok(Some("archived".to_string()))));
        assert_eq!(register.status, ChapterStatus::Pending);
        assert!(!register.is_loading());
    }

    #[test]
    fn poll_issued_before_optimistic_write_is_discarded() {
        let mut register = StatusRegister::default();
        let stale = register.begin_poll();
        register.write_optimistic(ChapterStatus::Approved);

        let transport = ReviewError::new(ErrorKind::Transport, "connection reset");
        assert!(!register.apply_poll(stale, Err(transport)));
        assert_eq!(register.status, ChapterStatus::Approved);
        assert!(register.error.is_none());
    }
}
