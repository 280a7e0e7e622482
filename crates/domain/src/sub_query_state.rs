use serde::{Deserialize, Serialize};
use std::fmt;

/// Dispatch state of one sub-query.
///
/// `NotSent → Sent → {Answered | Failed | Canceled}`; a hand-off the resolver
/// engine rejects goes straight from `NotSent` to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubQueryState {
    NotSent,
    Sent,
    Answered,
    Canceled,
    Failed,
}

impl SubQueryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubQueryState::NotSent => "not_sent",
            SubQueryState::Sent => "sent",
            SubQueryState::Answered => "answered",
            SubQueryState::Canceled => "canceled",
            SubQueryState::Failed => "failed",
        }
    }

    /// Answered, failed and canceled sub-queries never move again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubQueryState::Answered | SubQueryState::Canceled | SubQueryState::Failed
        )
    }

    pub fn can_transition_to(&self, next: SubQueryState) -> bool {
        matches!(
            (self, next),
            (SubQueryState::NotSent, SubQueryState::Sent)
                | (SubQueryState::NotSent, SubQueryState::Failed)
                | (SubQueryState::Sent, SubQueryState::Answered)
                | (SubQueryState::Sent, SubQueryState::Failed)
                | (SubQueryState::Sent, SubQueryState::Canceled)
        )
    }
}

impl fmt::Display for SubQueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
