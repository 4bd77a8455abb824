mod game;
mod roster;
mod round;
mod score;
mod submission;
mod timer;
mod vote;

pub use game::{Action, PhaseEngine};
pub use roster::Roster;
pub use round::RoundTracker;
pub use score::Scoreboard;
pub use submission::SubmissionLedger;
pub use timer::{PhaseTimer, ScheduledTask, TimerEvent};

use crate::types::Phase;

/// Why an inbound action was not applied
///
/// Only join-time rejections reach the participant. Everything else is
/// treated as a stale or duplicate client message: logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("display name is already taken")]
    NameTaken,

    #[error("display name must not be empty")]
    InvalidName,

    #[error("connection has already joined")]
    AlreadyJoined,

    #[error("unknown participant")]
    UnknownParticipant,

    #[error("only the facilitator can start a game")]
    NotFacilitator,

    #[error("action needs phase {expected:?} but session is in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("not eligible to submit in this phase")]
    NotEligible,

    #[error("already submitted this round")]
    AlreadySubmitted,

    #[error("already voted this round")]
    AlreadyVoted,

    #[error("answer index {index} out of range ({len} answers)")]
    InvalidIndex { index: usize, len: usize },
}

impl Rejection {
    /// Stable code sent to clients for user-correctable rejections
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::NameTaken => "NAME_TAKEN",
            Rejection::InvalidName => "INVALID_NAME",
            Rejection::AlreadyJoined => "ALREADY_JOINED",
            Rejection::UnknownParticipant => "UNKNOWN_PARTICIPANT",
            Rejection::NotFacilitator => "NOT_FACILITATOR",
            Rejection::WrongPhase { .. } => "WRONG_PHASE",
            Rejection::NotEligible => "NOT_ELIGIBLE",
            Rejection::AlreadySubmitted => "ALREADY_SUBMITTED",
            Rejection::AlreadyVoted => "ALREADY_VOTED",
            Rejection::InvalidIndex { .. } => "INVALID_INDEX",
        }
    }

    /// Whether the requester is told about this rejection
    pub fn is_surfaced(&self) -> bool {
        matches!(self, Rejection::NameTaken | Rejection::InvalidName)
    }
}
