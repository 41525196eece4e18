use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for one interview session. Generated once at creation
/// and never reused; terminated sessions leave no reusable slot behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Error taxonomy for the interview core.
///
/// `InvalidArgument` and `NotFound` surface to the caller unchanged.
/// The upstream pair is recovered locally during turns and feedback
/// compilation (logged, then replaced by a fallback decision) and only
/// reaches the caller on the frame-submission path, where a retry makes
/// sense. Nothing here is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum InterviewError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("upstream returned malformed content: {0}")]
    UpstreamMalformed(String),
}

pub type Result<T> = std::result::Result<T, InterviewError>;
