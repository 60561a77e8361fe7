/// Page state definitions for tracking crawl progress
///
/// A URL moves `Unseen -> Queued -> Fetching -> {Fetched, FetchFailed}` and
/// never goes back. `Disallowed` is reached straight from `Queued` when the
/// robots gate refuses a URL.
use std::fmt;

/// Represents the current state of a URL in the discovery pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// URL has not been seen yet
    Unseen,

    /// URL is waiting in the frontier
    Queued,

    /// URL is currently being fetched
    Fetching,

    // ===== Terminal States =====
    /// Page was fetched and classified
    Fetched,

    /// Transport gave up on the page
    FetchFailed,

    /// robots.txt forbids the page; it was never requested
    Disallowed,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Fetched | Self::FetchFailed | Self::Disallowed)
    }

    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: PageState) -> bool {
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Self::Unseen, Self::Queued)
                | (Self::Queued, Self::Fetching)
                | (Self::Queued, Self::Disallowed)
                | (Self::Fetching, Self::Fetched)
                | (Self::Fetching, Self::FetchFailed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unseen => "unseen",
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Fetched => "fetched",
            Self::FetchFailed => "fetch_failed",
            Self::Disallowed => "disallowed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PageState; 6] = [
        PageState::Unseen,
        PageState::Queued,
        PageState::Fetching,
        PageState::Fetched,
        PageState::FetchFailed,
        PageState::Disallowed,
    ];

    #[test]
    fn test_is_terminal() {
        assert!(!PageState::Unseen.is_terminal());
        assert!(!PageState::Queued.is_terminal());
        assert!(!PageState::Fetching.is_terminal());

        assert!(PageState::Fetched.is_terminal());
        assert!(PageState::FetchFailed.is_terminal());
        assert!(PageState::Disallowed.is_terminal());
    }

    #[test]
    fn test_legal_transitions() {
        assert!(PageState::Unseen.can_transition_to(PageState::Queued));
        assert!(PageState::Queued.can_transition_to(PageState::Fetching));
        assert!(PageState::Queued.can_transition_to(PageState::Disallowed));
        assert!(PageState::Fetching.can_transition_to(PageState::Fetched));
        assert!(PageState::Fetching.can_transition_to(PageState::FetchFailed));
    }

    #[test]
    fn test_terminal_states_never_leave() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(
                    !from.can_transition_to(to),
                    "terminal {:?} must not move to {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_no_requeue() {
        for from in ALL {
            if from != PageState::Unseen {
                assert!(!from.can_transition_to(PageState::Queued));
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PageState::Queued), "queued");
        assert_eq!(format!("{}", PageState::FetchFailed), "fetch_failed");
    }
}
