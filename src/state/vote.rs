use super::{Rejection, SubmissionLedger};
use crate::types::*;

impl SubmissionLedger {
    /// Record a vote from `voter` for the answer at `answer_index`
    ///
    /// A participant gets one vote per round across all answers, may not vote
    /// for their own answer, and is subject to the vote eligibility policy.
    pub fn submit_vote(
        &mut self,
        voter: &str,
        question_author: &str,
        answer_index: usize,
    ) -> Result<(), Rejection> {
        let len = self.answers.len();
        if answer_index >= len {
            return Err(Rejection::InvalidIndex {
                index: answer_index,
                len,
            });
        }
        if self.has_voted(voter) {
            return Err(Rejection::AlreadyVoted);
        }
        if !self.vote_policy().allows(voter, question_author) {
            return Err(Rejection::NotEligible);
        }

        let answer = &mut self.answers[answer_index];
        if answer.author_name == voter {
            return Err(Rejection::NotEligible);
        }
        answer.voters.insert(voter.to_string());
        Ok(())
    }

    pub fn has_voted(&self, voter: &str) -> bool {
        self.answers.iter().any(|a| a.voters.contains(voter))
    }

    /// Distinct participants who voted this round, including ones who have since left
    pub fn voter_count(&self) -> usize {
        // Each voter sits in exactly one voter set
        self.answers.iter().map(|a| a.voters.len()).sum()
    }

    /// The given participants who have something they are allowed to vote for
    pub fn eligible_voters<'a>(
        &self,
        participants: impl IntoIterator<Item = &'a DisplayName>,
        question_author: &str,
    ) -> Vec<&'a DisplayName> {
        participants
            .into_iter()
            .filter(|name| self.vote_policy().allows(name, question_author))
            .filter(|name| self.answers.iter().any(|a| a.author_name != **name))
            .collect()
    }

    /// True once every present eligible voter has voted
    pub fn is_vote_phase_complete<'a>(
        &self,
        participants: impl IntoIterator<Item = &'a DisplayName>,
        question_author: &str,
    ) -> bool {
        self.eligible_voters(participants, question_author)
            .into_iter()
            .all(|name| self.has_voted(name))
    }
}
