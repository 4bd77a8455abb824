use super::Rejection;
use crate::types::*;

/// Answers and votes for the round in play
///
/// Eligibility is decided by two named policies instead of per-phase
/// conditionals: one for answering, one for voting. Submissions are keyed
/// by display name, the identity scores are credited to, so a participant
/// who reconnects under the same name is still the same author and voter.
#[derive(Debug, Clone)]
pub struct SubmissionLedger {
    answer_policy: EligibilityPolicy,
    vote_policy: EligibilityPolicy,
    pub(super) answers: Vec<Answer>,
}

impl SubmissionLedger {
    pub fn new(answer_policy: EligibilityPolicy, vote_policy: EligibilityPolicy) -> Self {
        Self {
            answer_policy,
            vote_policy,
            answers: Vec::new(),
        }
    }

    pub fn vote_policy(&self) -> EligibilityPolicy {
        self.vote_policy
    }

    /// Record an answer, at most one per participant per round
    pub fn submit_answer(
        &mut self,
        participant: &Participant,
        question_author: &str,
        text: String,
    ) -> Result<usize, Rejection> {
        if !self
            .answer_policy
            .allows(&participant.display_name, question_author)
        {
            return Err(Rejection::NotEligible);
        }
        if self.has_answered(&participant.display_name) {
            return Err(Rejection::AlreadySubmitted);
        }

        self.answers.push(Answer::new(
            participant.id.clone(),
            participant.display_name.clone(),
            text,
        ));
        Ok(self.answers.len() - 1)
    }

    pub fn has_answered(&self, name: &str) -> bool {
        self.answers.iter().any(|a| a.author_name == name)
    }

    /// The given participants who may answer the current question
    pub fn eligible_answerers<'a>(
        &self,
        participants: impl IntoIterator<Item = &'a DisplayName>,
        question_author: &str,
    ) -> Vec<&'a DisplayName> {
        participants
            .into_iter()
            .filter(|name| self.answer_policy.allows(name, question_author))
            .collect()
    }

    /// True once every present eligible participant has answered
    ///
    /// Answers from participants who left still stand, but they never stand
    /// in for someone who is still here.
    pub fn is_answer_phase_complete<'a>(
        &self,
        participants: impl IntoIterator<Item = &'a DisplayName>,
        question_author: &str,
    ) -> bool {
        self.eligible_answerers(participants, question_author)
            .into_iter()
            .all(|name| self.has_answered(name))
    }

    /// Answers in submission order, which is also the voting index order
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Clear answers and votes before the next round
    pub fn reset(&mut self) {
        self.answers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: &str) -> Participant {
        Participant {
            id: id.to_string(),
            display_name: id.to_uppercase(),
            is_facilitator: false,
        }
    }

    fn ledger() -> SubmissionLedger {
        SubmissionLedger::new(EligibilityPolicy::ExcludeAuthor, EligibilityPolicy::Everyone)
    }

    #[test]
    fn test_submit_answer_first_write_wins() {
        let mut ledger = ledger();
        let b = participant("b");

        assert_eq!(ledger.submit_answer(&b, "A", "one".to_string()), Ok(0));
        assert_eq!(
            ledger.submit_answer(&b, "A", "two".to_string()),
            Err(Rejection::AlreadySubmitted)
        );
        assert_eq!(ledger.answers().len(), 1);
        assert_eq!(ledger.answers()[0].text, "one");
        assert_eq!(ledger.answers()[0].author_name, "B");
    }

    #[test]
    fn test_question_author_excluded_from_answering() {
        let mut ledger = ledger();
        let a = participant("a");

        assert_eq!(
            ledger.submit_answer(&a, "A", "mine".to_string()),
            Err(Rejection::NotEligible)
        );
        assert!(ledger.answers().is_empty());

        let mut open =
            SubmissionLedger::new(EligibilityPolicy::Everyone, EligibilityPolicy::Everyone);
        assert!(open.submit_answer(&a, "A", "mine".to_string()).is_ok());
    }

    fn names(names: &[&str]) -> Vec<DisplayName> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_answer_phase_completeness() {
        let mut ledger = ledger();
        let roster = names(&["A", "B", "C"]);

        assert_eq!(ledger.eligible_answerers(&roster, "A").len(), 2);
        assert!(!ledger.is_answer_phase_complete(&roster, "A"));

        ledger
            .submit_answer(&participant("b"), "A", "x".to_string())
            .unwrap();
        assert!(!ledger.is_answer_phase_complete(&roster, "A"));

        ledger
            .submit_answer(&participant("c"), "A", "y".to_string())
            .unwrap();
        assert!(ledger.is_answer_phase_complete(&roster, "A"));
    }

    #[test]
    fn test_departed_answer_does_not_complete_for_present_players() {
        let mut ledger = ledger();
        ledger
            .submit_answer(&participant("b"), "A", "x".to_string())
            .unwrap();

        // B left, C is still here and has not answered
        let roster = names(&["A", "C"]);
        assert!(!ledger.is_answer_phase_complete(&roster, "A"));
        assert_eq!(ledger.answers().len(), 1);

        ledger
            .submit_answer(&participant("c"), "A", "y".to_string())
            .unwrap();
        assert!(ledger.is_answer_phase_complete(&roster, "A"));
    }

    #[test]
    fn test_reconnect_under_same_name_cannot_answer_twice() {
        let mut ledger = ledger();
        ledger
            .submit_answer(&participant("b"), "A", "x".to_string())
            .unwrap();

        let rejoined = Participant {
            id: "b2".to_string(),
            display_name: "B".to_string(),
            is_facilitator: false,
        };
        assert_eq!(
            ledger.submit_answer(&rejoined, "A", "again".to_string()),
            Err(Rejection::AlreadySubmitted)
        );
    }

    #[test]
    fn test_zero_eligible_is_complete() {
        let ledger = ledger();
        assert!(ledger.is_answer_phase_complete(&names(&["A"]), "A"));
        assert!(ledger.is_answer_phase_complete(&Vec::<DisplayName>::new(), "A"));
    }

    #[test]
    fn test_reset_clears_answers() {
        let mut ledger = ledger();
        ledger
            .submit_answer(&participant("b"), "A", "x".to_string())
            .unwrap();
        ledger.reset();

        assert!(ledger.answers().is_empty());
        assert!(!ledger.has_answered("B"));
    }
}
