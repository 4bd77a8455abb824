use crate::protocol::{RankedAnswer, ScoreMap};
use crate::types::*;

/// Cumulative score per display name across one game
#[derive(Debug, Clone)]
pub struct Scoreboard {
    rule: ScoringRule,
    totals: ScoreMap,
}

impl Scoreboard {
    pub fn new(rule: ScoringRule) -> Self {
        Self {
            rule,
            totals: ScoreMap::new(),
        }
    }

    /// Start a fresh game: everyone listed at 0, everyone else dropped
    pub fn initialize<'a>(&mut self, participants: impl IntoIterator<Item = &'a Participant>) {
        self.totals = participants
            .into_iter()
            .map(|p| (p.display_name.clone(), 0))
            .collect();
    }

    /// Make sure a joining participant has an entry, keeping any score from an earlier connection
    pub fn register(&mut self, display_name: &str) {
        self.totals.entry(display_name.to_string()).or_insert(0);
    }

    /// Rank answers by descending votes, stable on submission order, and assign points
    pub fn rank(&self, answers: &[Answer]) -> Vec<RankedAnswer> {
        let mut order: Vec<&Answer> = answers.iter().collect();
        // sort_by is stable, equal vote counts keep submission order
        order.sort_by(|a, b| b.votes().cmp(&a.votes()));

        let answer_count = answers.len() as u32;
        let mut ranked: Vec<RankedAnswer> = Vec::with_capacity(order.len());
        for (position, answer) in order.into_iter().enumerate() {
            let votes = answer.votes();
            let rank = match ranked.last() {
                Some(prev) if prev.votes == votes => prev.rank,
                _ => position as u32 + 1,
            };
            let points = match self.rule {
                ScoringRule::PerVote => votes,
                ScoringRule::Placement if votes > 0 => answer_count - rank + 1,
                ScoringRule::Placement => 0,
            };

            ranked.push(RankedAnswer {
                rank,
                text: answer.text.clone(),
                votes,
                author_name: answer.author_name.clone(),
                points,
            });
        }
        ranked
    }

    /// Credit each ranked answer's points to its author, never decreasing a total
    pub fn apply_round_results(&mut self, ranked: &[RankedAnswer]) {
        for entry in ranked {
            *self.totals.entry(entry.author_name.clone()).or_insert(0) += entry.points;
        }
    }

    pub fn snapshot(&self) -> ScoreMap {
        self.totals.clone()
    }

    pub fn get(&self, display_name: &str) -> Option<u32> {
        self.totals.get(display_name).copied()
    }

    pub fn clear(&mut self) {
        self.totals.clear();
    }
}
