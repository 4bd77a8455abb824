use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cumulative score per display name
pub type ScoreMap = BTreeMap<DisplayName, u32>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    Join { display_name: String },
    StartGame,
    SubmitQuestion { text: String },
    SubmitAnswer { text: String },
    SubmitVote { answer_index: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent to the joiner only
    Joined {
        participant_id: ParticipantId,
        display_name: DisplayName,
        is_facilitator: bool,
        phase: Phase,
    },
    /// Sent to the requester only
    JoinRejected {
        reason: String,
    },
    RosterUpdated {
        names: Vec<DisplayName>,
    },
    PhaseChanged {
        phase: Phase,
        payload: PhasePayload,
    },
    TimerTick {
        seconds_left: u32,
    },
    Error {
        code: String,
        msg: String,
    },
}

/// Data a client needs to render the phase it just entered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhasePayload {
    Empty,
    Question {
        question: String,
        question_author: DisplayName,
    },
    /// Anonymized: authors are withheld until results
    Answers {
        answers: Vec<AnswerInfo>,
        /// Whether the question's author is barred from voting this round
        excluding_author: bool,
    },
    Results {
        ranked_answers: Vec<RankedAnswer>,
        scores: ScoreMap,
    },
    FinalScores {
        final_scores: ScoreMap,
    },
}

/// Public answer info (no author to keep voting anonymous)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerInfo {
    pub text: String,
}

impl From<&Answer> for AnswerInfo {
    fn from(a: &Answer) -> Self {
        Self {
            text: a.text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedAnswer {
    /// Competition rank, ties share the same value (1, 1, 3)
    pub rank: u32,
    pub text: String,
    pub votes: u32,
    pub author_name: DisplayName,
    pub points: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_wire_format() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"submit_vote","answer_index":2}"#).unwrap();
        assert!(matches!(msg, ClientMessage::SubmitVote { answer_index: 2 }));

        let msg: ClientMessage = serde_json::from_str(r#"{"t":"start_game"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::StartGame));

        assert!(serde_json::from_str::<ClientMessage>(r#"{"t":"host_reset"}"#).is_err());
    }

    #[test]
    fn test_phase_changed_wire_format() {
        let msg = ServerMessage::PhaseChanged {
            phase: Phase::CollectingAnswers,
            payload: PhasePayload::Question {
                question: "Why?".to_string(),
                question_author: "Ana".to_string(),
            },
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["t"], "phase_changed");
        assert_eq!(json["phase"], "COLLECTING_ANSWERS");
        assert_eq!(json["payload"]["kind"], "question");
        assert_eq!(json["payload"]["question_author"], "Ana");
    }

    #[test]
    fn test_answers_payload_withholds_authors() {
        let answer = Answer::new("id-b".to_string(), "Bea".to_string(), "42".to_string());
        let payload = PhasePayload::Answers {
            answers: vec![AnswerInfo::from(&answer)],
            excluding_author: false,
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("42"));
        assert!(!json.contains("Bea"));
        assert!(!json.contains("id-b"));
    }
}
