/// Scrape state definitions for areas and neighborhoods
///
/// Transitions are validated so the coordinator cannot, for example, import
/// a page it never fetched.
use crate::ImportError;
use std::fmt;

/// Represents the current state of an area or neighborhood in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrapeState {
    // ===== Active States =====
    /// Selected for this run but not yet requested
    Pending,

    /// Page request in flight
    Fetching,

    /// Page parsed; its contents are being imported
    Importing,

    // ===== Terminal States =====
    /// Everything on the page was handled
    Completed,

    /// Fetch, parse or persistence failure; logged and passed over
    Skipped,

    /// Cut by `--max-neighborhoods` before being requested
    LimitSkipped,
}

impl ScrapeState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped | Self::LimitSkipped)
    }

    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: ScrapeState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Fetching)
                | (Self::Pending, Self::LimitSkipped)
                | (Self::Fetching, Self::Importing)
                | (Self::Fetching, Self::Skipped)
                | (Self::Importing, Self::Completed)
                | (Self::Importing, Self::Skipped)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Importing => "importing",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
            Self::LimitSkipped => "limit_skipped",
        }
    }
}

impl fmt::Display for ScrapeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item (area or neighborhood) together with its scrape state
#[derive(Debug, Clone)]
pub struct Tracked<T> {
    pub item: T,
    state: ScrapeState,
}

impl<T> Tracked<T> {
    pub fn new(item: T) -> Self {
        Self {
            item,
            state: ScrapeState::Pending,
        }
    }

    pub fn state(&self) -> ScrapeState {
        self.state
    }

    /// Moves to `next`, rejecting transitions the lifecycle does not allow
    pub fn transition(&mut self, next: ScrapeState) -> Result<(), ImportError> {
        if !self.state.can_transition_to(next) {
            return Err(ImportError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("{} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!ScrapeState::Pending.is_terminal());
        assert!(!ScrapeState::Fetching.is_terminal());
        assert!(!ScrapeState::Importing.is_terminal());

        assert!(ScrapeState::Completed.is_terminal());
        assert!(ScrapeState::Skipped.is_terminal());
        assert!(ScrapeState::LimitSkipped.is_terminal());
    }

    #[test]
    fn test_happy_path() {
        let mut tracked = Tracked::new("A");
        tracked.transition(ScrapeState::Fetching).unwrap();
        tracked.transition(ScrapeState::Importing).unwrap();
        tracked.transition(ScrapeState::Completed).unwrap();
        assert_eq!(tracked.state(), ScrapeState::Completed);
    }

    #[test]
    fn test_cannot_import_without_fetching() {
        let mut tracked = Tracked::new("A001");
        let err = tracked.transition(ScrapeState::Importing).unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidTransition {
                from: ScrapeState::Pending,
                to: ScrapeState::Importing
            }
        ));
        assert_eq!(tracked.state(), ScrapeState::Pending);
    }

    #[test]
    fn test_terminal_states_do_not_move() {
        for terminal in [
            ScrapeState::Completed,
            ScrapeState::Skipped,
            ScrapeState::LimitSkipped,
        ] {
            for next in [
                ScrapeState::Pending,
                ScrapeState::Fetching,
                ScrapeState::Importing,
                ScrapeState::Completed,
                ScrapeState::Skipped,
                ScrapeState::LimitSkipped,
            ] {
                assert!(
                    !terminal.can_transition_to(next),
                    "{} -> {} should be rejected",
                    terminal,
                    next
                );
            }
        }
    }

    #[test]
    fn test_limit_skip_only_from_pending() {
        assert!(ScrapeState::Pending.can_transition_to(ScrapeState::LimitSkipped));
        assert!(!ScrapeState::Fetching.can_transition_to(ScrapeState::LimitSkipped));
    }

    #[test]
    fn test_display() {
        assert_eq!(ScrapeState::LimitSkipped.to_string(), "limit_skipped");
        assert_eq!(ScrapeState::Completed.to_string(), "completed");
    }
}
