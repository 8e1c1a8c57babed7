//! Listener lifecycle states.

use std::fmt;

use imagehub_entity::DownloadStatus;

/// Where a listener is in the life of its remote job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerState {
    /// Command sent, waiting for the agent.
    Pending,
    /// Lost contact with the agent; a status check is scheduled.
    Disconnected,
    /// The agent reported success.
    Completed,
    /// The agent reported a definitive failure.
    Failed,
    /// Displaced by a newer listener for the same identity.
    Abandoned,
}

impl ListenerState {
    /// Whether the listener will never act again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Abandoned)
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Disconnected => "disconnected",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for ListenerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Point-in-time view of a listener, published on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerSnapshot {
    pub state: ListenerState,
    /// Last status the agent reported, or the prior status when resuming.
    pub last_status: Option<DownloadStatus>,
}

impl ListenerSnapshot {
    pub(crate) fn new(last_status: Option<DownloadStatus>) -> Self {
        Self {
            state: ListenerState::Pending,
            last_status,
        }
    }
}
