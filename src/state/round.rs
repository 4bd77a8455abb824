use super::Rejection;
use crate::types::*;

/// Player-submitted questions in submission order and the one currently in play
#[derive(Debug, Clone, Default)]
pub struct RoundTracker {
    questions: Vec<Question>,
    current_index: usize,
}

impl RoundTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a question, first write wins per author name
    pub fn add_question(
        &mut self,
        author_id: &ParticipantId,
        author_name: &str,
        text: String,
    ) -> Result<&Question, Rejection> {
        if self.has_submitted(author_name) {
            return Err(Rejection::AlreadySubmitted);
        }

        self.questions.push(Question {
            text,
            author_id: author_id.clone(),
            author_name: author_name.to_string(),
        });
        Ok(&self.questions[self.questions.len() - 1])
    }

    pub fn has_submitted(&self, author_name: &str) -> bool {
        self.questions.iter().any(|q| q.author_name == author_name)
    }

    /// True once every listed participant has a question queued
    pub fn all_questions_in<'a>(
        &self,
        participants: impl IntoIterator<Item = &'a DisplayName>,
    ) -> bool {
        let mut participants = participants.into_iter().peekable();
        if participants.peek().is_none() {
            return false;
        }
        participants.all(|name| self.has_submitted(name))
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Move to the next question, returns false (and parks the index past the end) when none is left
    pub fn advance(&mut self) -> bool {
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            true
        } else {
            self.current_index = self.questions.len();
            false
        }
    }

    /// Park the index past the last question, used when the game ends early
    pub fn finish(&mut self) {
        self.current_index = self.questions.len();
    }

    pub fn reset(&mut self) {
        self.questions.clear();
        self.current_index = 0;
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ParticipantId {
        s.to_string()
    }

    #[test]
    fn test_first_write_wins() {
        let mut rounds = RoundTracker::new();
        assert!(rounds.add_question(&id("a"), "A", "first".to_string()).is_ok());

        let result = rounds.add_question(&id("a"), "A", "second".to_string());
        assert_eq!(result, Err(Rejection::AlreadySubmitted));
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds.current().unwrap().text, "first");
    }

    #[test]
    fn test_all_questions_in() {
        let mut rounds = RoundTracker::new();
        let roster = vec!["A".to_string(), "B".to_string()];
        assert!(!rounds.all_questions_in(&roster));

        rounds.add_question(&id("b"), "B", "q".to_string()).unwrap();
        assert!(!rounds.all_questions_in(&roster));

        rounds.add_question(&id("a"), "A", "q".to_string()).unwrap();
        assert!(rounds.all_questions_in(&roster));

        // An empty roster never counts as complete
        assert!(!rounds.all_questions_in(&Vec::<DisplayName>::new()));
    }

    #[test]
    fn test_reconnect_under_same_name_cannot_ask_twice() {
        let mut rounds = RoundTracker::new();
        rounds.add_question(&id("b"), "B", "first".to_string()).unwrap();

        let result = rounds.add_question(&id("b2"), "B", "again".to_string());
        assert_eq!(result, Err(Rejection::AlreadySubmitted));
        assert!(rounds.all_questions_in(&vec!["B".to_string()]));
    }

    #[test]
    fn test_fifo_order_and_advance() {
        let mut rounds = RoundTracker::new();
        rounds.add_question(&id("c"), "C", "one".to_string()).unwrap();
        rounds.add_question(&id("a"), "A", "two".to_string()).unwrap();

        assert_eq!(rounds.current().unwrap().text, "one");
        assert_eq!(rounds.current().unwrap().author_name, "C");

        assert!(rounds.advance());
        assert_eq!(rounds.current().unwrap().text, "two");

        assert!(!rounds.advance());
        assert!(rounds.current().is_none());
        assert_eq!(rounds.current_index(), rounds.len());
    }

    #[test]
    fn test_reset() {
        let mut rounds = RoundTracker::new();
        rounds.add_question(&id("a"), "A", "q".to_string()).unwrap();
        rounds.advance();
        rounds.reset();

        assert!(rounds.is_empty());
        assert_eq!(rounds.current_index(), 0);
        assert!(rounds.add_question(&id("a"), "A", "again".to_string()).is_ok());
    }
}
