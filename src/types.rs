use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Opaque ID types for type safety
pub type ParticipantId = String;
pub type DisplayName = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Idle,
    CollectingQuestions,
    CollectingAnswers,
    CollectingVotes,
    ShowingResults,
    GameOver,
}

impl Phase {
    /// Phases in which a question is in play and `RoundTracker::current` must resolve
    pub fn has_current_question(self) -> bool {
        matches!(
            self,
            Phase::CollectingAnswers | Phase::CollectingVotes | Phase::ShowingResults
        )
    }

    /// A new game may only be started from a resting phase
    pub fn can_start_game(self) -> bool {
        matches!(self, Phase::Idle | Phase::GameOver)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: DisplayName,
    pub is_facilitator: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub text: String,
    pub author_id: ParticipantId,
    /// Kept alongside the id so the answer phase can name an author who already left
    pub author_name: DisplayName,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub text: String,
    pub author_id: ParticipantId,
    pub author_name: DisplayName,
    /// Display names of everyone who voted for this answer
    pub voters: HashSet<DisplayName>,
}

impl Answer {
    pub fn new(author_id: ParticipantId, author_name: DisplayName, text: String) -> Self {
        Self {
            text,
            author_id,
            author_name,
            voters: HashSet::new(),
        }
    }

    /// Vote count is derived from the voter set, never stored separately
    pub fn votes(&self) -> u32 {
        self.voters.len() as u32
    }
}

/// Who may submit in a given collection phase
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityPolicy {
    /// Everyone except the author of the question in play
    ExcludeAuthor,
    Everyone,
}

impl EligibilityPolicy {
    /// Compares display names, so a reconnect under the same name keeps its role
    pub fn allows(self, participant: &str, question_author: &str) -> bool {
        match self {
            EligibilityPolicy::ExcludeAuthor => participant != question_author,
            EligibilityPolicy::Everyone => true,
        }
    }
}

impl FromStr for EligibilityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exclude_author" => Ok(EligibilityPolicy::ExcludeAuthor),
            "everyone" => Ok(EligibilityPolicy::Everyone),
            other => Err(format!("unknown eligibility policy: {}", other)),
        }
    }
}

/// How ranked answers turn into points
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// One point per vote received
    PerVote,
    /// Voted answers earn `answer_count - rank + 1`, unvoted answers earn nothing
    Placement,
}

impl FromStr for ScoringRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per_vote" => Ok(ScoringRule::PerVote),
            "placement" => Ok(ScoringRule::Placement),
            other => Err(format!("unknown scoring rule: {}", other)),
        }
    }
}

impl fmt::Display for ScoringRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringRule::PerVote => write!(f, "per_vote"),
            ScoringRule::Placement => write!(f, "placement"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Display name that marks the facilitator at join time
    pub facilitator_name: String,
    /// Countdown per phase in seconds, 0 disables the countdown
    pub question_seconds: u32,
    pub answer_seconds: u32,
    pub vote_seconds: u32,
    pub results_delay: Duration,
    pub tick_interval: Duration,
    pub answer_policy: EligibilityPolicy,
    pub vote_policy: EligibilityPolicy,
    pub scoring: ScoringRule,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            facilitator_name: "Facu".to_string(),
            question_seconds: 90,
            answer_seconds: 60,
            vote_seconds: 30,
            results_delay: Duration::from_secs(8),
            tick_interval: Duration::from_secs(1),
            answer_policy: EligibilityPolicy::ExcludeAuthor,
            vote_policy: EligibilityPolicy::Everyone,
            scoring: ScoringRule::PerVote,
        }
    }
}

impl GameConfig {
    /// Countdown length for a collection phase, `None` when disabled or not applicable
    pub fn countdown_for(&self, phase: Phase) -> Option<u32> {
        let seconds = match phase {
            Phase::CollectingQuestions => self.question_seconds,
            Phase::CollectingAnswers => self.answer_seconds,
            Phase::CollectingVotes => self.vote_seconds,
            _ => 0,
        };
        (seconds > 0).then_some(seconds)
    }
}
