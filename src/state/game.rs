use super::{
    PhaseTimer, Rejection, Roster, RoundTracker, Scoreboard, SubmissionLedger, TimerEvent,
};
use crate::broadcast::Broadcaster;
use crate::protocol::{AnswerInfo, PhasePayload, RankedAnswer, ServerMessage};
use crate::types::*;
use tokio::sync::mpsc;

/// An inbound participant action, already bound to a connection
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Join { display_name: String },
    StartGame,
    SubmitQuestion { text: String },
    SubmitAnswer { text: String },
    SubmitVote { answer_index: usize },
    Disconnect,
}

/// The round-orchestration state machine
///
/// Owns the single session-wide phase and every per-game component. It is
/// the only place that emits outbound messages. All methods run to
/// completion on the session loop, so no locking is needed.
pub struct PhaseEngine<B: Broadcaster> {
    config: GameConfig,
    phase: Phase,
    roster: Roster,
    rounds: RoundTracker,
    ledger: SubmissionLedger,
    scoreboard: Scoreboard,
    /// Ranked answers of the round being shown
    results: Vec<RankedAnswer>,
    timer: PhaseTimer,
    outbox: B,
}

impl<B: Broadcaster> PhaseEngine<B> {
    pub fn new(
        config: GameConfig,
        outbox: B,
        timer_events: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        Self {
            phase: Phase::Idle,
            roster: Roster::new(config.facilitator_name.clone()),
            rounds: RoundTracker::new(),
            ledger: SubmissionLedger::new(config.answer_policy, config.vote_policy),
            scoreboard: Scoreboard::new(config.scoring),
            results: Vec::new(),
            timer: PhaseTimer::new(timer_events),
            outbox,
            config,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn rounds(&self) -> &RoundTracker {
        &self.rounds
    }

    pub fn ledger(&self) -> &SubmissionLedger {
        &self.ledger
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// Epoch of the currently scheduled timer task
    pub fn timer_epoch(&self) -> u64 {
        self.timer.epoch()
    }

    pub fn seconds_left(&self) -> Option<u32> {
        self.timer.seconds_left()
    }

    /// Apply one participant action, dropping it if it does not fit the current state
    pub fn handle(&mut self, participant: &ParticipantId, action: Action) {
        let result = match action {
            Action::Join { display_name } => self.join(participant, &display_name),
            Action::StartGame => self.start_game(participant),
            Action::SubmitQuestion { text } => self.submit_question(participant, text),
            Action::SubmitAnswer { text } => self.submit_answer(participant, text),
            Action::SubmitVote { answer_index } => self.submit_vote(participant, answer_index),
            Action::Disconnect => self.leave(participant),
        };

        if let Err(reason) = result {
            tracing::debug!(
                participant = %participant,
                phase = ?self.phase,
                %reason,
                "Dropped action"
            );
        }
    }

    pub fn join(&mut self, id: &ParticipantId, display_name: &str) -> Result<(), Rejection> {
        let participant = match self.roster.join(id.clone(), display_name) {
            Ok(p) => p,
            Err(reason) => {
                if reason.is_surfaced() {
                    self.outbox.to_one(
                        id,
                        ServerMessage::JoinRejected {
                            reason: reason.code().to_string(),
                        },
                    );
                }
                return Err(reason);
            }
        };

        tracing::info!(
            participant = %participant.id,
            name = %participant.display_name,
            facilitator = participant.is_facilitator,
            "Participant joined"
        );

        self.scoreboard.register(&participant.display_name);
        self.outbox.to_one(
            id,
            ServerMessage::Joined {
                participant_id: participant.id,
                display_name: participant.display_name,
                is_facilitator: participant.is_facilitator,
                phase: self.phase,
            },
        );
        // Late joiners need the data of the phase already in progress
        if self.phase != Phase::Idle {
            self.outbox.to_one(
                id,
                ServerMessage::PhaseChanged {
                    phase: self.phase,
                    payload: self.current_payload(),
                },
            );
        }
        self.broadcast_roster();
        Ok(())
    }

    pub fn leave(&mut self, id: &ParticipantId) -> Result<(), Rejection> {
        let participant = self
            .roster
            .leave(id)
            .ok_or(Rejection::UnknownParticipant)?;

        tracing::info!(
            participant = %participant.id,
            name = %participant.display_name,
            remaining = self.roster.len(),
            "Participant left"
        );
        self.broadcast_roster();

        if self.roster.is_empty() {
            self.reset_to_idle();
            return Ok(());
        }

        // Thresholds shrink with the roster; submissions already made stay
        self.check_completion();
        Ok(())
    }

    pub fn start_game(&mut self, id: &ParticipantId) -> Result<(), Rejection> {
        let is_facilitator = self
            .roster
            .get(id)
            .map(|p| p.is_facilitator)
            .ok_or(Rejection::UnknownParticipant)?;
        if !is_facilitator {
            return Err(Rejection::NotFacilitator);
        }
        if !self.phase.can_start_game() {
            return Err(Rejection::WrongPhase {
                expected: Phase::Idle,
                actual: self.phase,
            });
        }

        tracing::info!(players = self.roster.len(), "Starting game");
        self.reset_for_new_game();
        self.enter(Phase::CollectingQuestions);
        Ok(())
    }

    pub fn submit_question(&mut self, id: &ParticipantId, text: String) -> Result<(), Rejection> {
        self.expect_phase(Phase::CollectingQuestions)?;
        let author = self.roster.get(id).ok_or(Rejection::UnknownParticipant)?;

        self.rounds
            .add_question(&author.id, &author.display_name, text)?;
        tracing::info!(
            participant = %id,
            queued = self.rounds.len(),
            players = self.roster.len(),
            "Question submitted"
        );

        self.check_completion();
        Ok(())
    }

    pub fn submit_answer(&mut self, id: &ParticipantId, text: String) -> Result<(), Rejection> {
        self.expect_phase(Phase::CollectingAnswers)?;
        let participant = self.roster.get(id).ok_or(Rejection::UnknownParticipant)?;
        let question = self
            .rounds
            .current()
            .ok_or(Rejection::WrongPhase {
                expected: Phase::CollectingAnswers,
                actual: self.phase,
            })?;

        self.ledger
            .submit_answer(participant, &question.author_name, text)?;
        tracing::info!(
            participant = %id,
            answers = self.ledger.answers().len(),
            "Answer submitted"
        );

        self.check_completion();
        Ok(())
    }

    pub fn submit_vote(&mut self, id: &ParticipantId, answer_index: usize) -> Result<(), Rejection> {
        self.expect_phase(Phase::CollectingVotes)?;
        let voter = self.roster.get(id).ok_or(Rejection::UnknownParticipant)?;
        let question = self
            .rounds
            .current()
            .ok_or(Rejection::WrongPhase {
                expected: Phase::CollectingVotes,
                actual: self.phase,
            })?;

        self.ledger
            .submit_vote(&voter.display_name, &question.author_name, answer_index)?;
        tracing::info!(
            participant = %id,
            answer_index,
            voters = self.ledger.voter_count(),
            "Vote submitted"
        );

        self.check_completion();
        Ok(())
    }

    /// React to a countdown tick or the end of the results pause
    pub fn on_timer(&mut self, event: TimerEvent) {
        if !self.timer.is_current(&event) {
            tracing::debug!(
                epoch = event.epoch(),
                current = self.timer.epoch(),
                "Ignoring stale timer event"
            );
            return;
        }

        match event {
            TimerEvent::Tick { .. } => {
                let Some(seconds_left) = self.timer.tick() else {
                    return;
                };
                self.outbox
                    .to_all(ServerMessage::TimerTick { seconds_left });

                if seconds_left == 0 {
                    tracing::info!(phase = ?self.phase, "Countdown expired, forcing transition");
                    self.finish_phase();
                }
            }
            TimerEvent::ResultsElapsed { .. } => self.next_round(),
        }
    }

    /// Clear every per-game component and score the current roster at 0
    pub fn reset_for_new_game(&mut self) {
        self.timer.cancel();
        self.rounds.reset();
        self.ledger.reset();
        self.results.clear();
        self.scoreboard.initialize(self.roster.list());
    }

    /// Stop all timers, used when the session shuts down
    pub fn teardown(&mut self) {
        self.timer.cancel();
    }

    fn reset_to_idle(&mut self) {
        tracing::info!("Roster is empty, resetting session to idle");
        self.timer.cancel();
        self.rounds.reset();
        self.ledger.reset();
        self.results.clear();
        self.scoreboard.clear();
        self.phase = Phase::Idle;
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), Rejection> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Rejection::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    /// Move to `phase`: cancel the old timer, broadcast, then schedule the new one
    fn enter(&mut self, phase: Phase) {
        self.timer.cancel();
        let from = self.phase;
        self.phase = phase;
        debug_assert!(!phase.has_current_question() || self.rounds.current().is_some());

        tracing::info!(
            from = ?from,
            to = ?phase,
            question = self.rounds.current_index(),
            "Phase transition"
        );
        self.outbox.to_all(ServerMessage::PhaseChanged {
            phase,
            payload: self.current_payload(),
        });

        if phase == Phase::ShowingResults {
            self.timer.schedule_results_delay(self.config.results_delay);
        } else if let Some(seconds) = self.config.countdown_for(phase) {
            self.timer
                .start_countdown(seconds, self.config.tick_interval);
        }

        // A phase nobody is eligible for must not wait for its countdown
        self.check_completion();
    }

    fn check_completion(&mut self) {
        let complete = match (self.phase, self.rounds.current()) {
            (Phase::CollectingQuestions, _) => {
                self.rounds.all_questions_in(self.roster.display_names())
            }
            (Phase::CollectingAnswers, Some(question)) => self
                .ledger
                .is_answer_phase_complete(self.roster.display_names(), &question.author_name),
            (Phase::CollectingVotes, Some(question)) => self
                .ledger
                .is_vote_phase_complete(self.roster.display_names(), &question.author_name),
            _ => false,
        };

        if complete {
            tracing::debug!(phase = ?self.phase, "Phase complete");
            self.finish_phase();
        }
    }

    /// Leave a collection phase with whatever has been submitted so far
    fn finish_phase(&mut self) {
        match self.phase {
            Phase::CollectingQuestions => self.begin_round(),
            Phase::CollectingAnswers => self.enter(Phase::CollectingVotes),
            Phase::CollectingVotes => self.show_results(),
            _ => {}
        }
    }

    fn begin_round(&mut self) {
        self.ledger.reset();
        self.results.clear();
        if self.rounds.current().is_some() {
            self.enter(Phase::CollectingAnswers);
        } else {
            self.game_over();
        }
    }

    fn show_results(&mut self) {
        self.results = self.scoreboard.rank(self.ledger.answers());
        self.scoreboard.apply_round_results(&self.results);
        self.enter(Phase::ShowingResults);
    }

    fn next_round(&mut self) {
        if self.phase != Phase::ShowingResults {
            return;
        }
        if self.rounds.advance() {
            self.begin_round();
        } else {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        self.rounds.finish();
        self.ledger.reset();
        self.results.clear();
        self.enter(Phase::GameOver);
    }

    fn current_payload(&self) -> PhasePayload {
        match self.phase {
            Phase::Idle | Phase::CollectingQuestions => PhasePayload::Empty,
            Phase::CollectingAnswers => match self.rounds.current() {
                Some(question) => PhasePayload::Question {
                    question: question.text.clone(),
                    question_author: question.author_name.clone(),
                },
                None => PhasePayload::Empty,
            },
            Phase::CollectingVotes => PhasePayload::Answers {
                answers: self.ledger.answers().iter().map(AnswerInfo::from).collect(),
                excluding_author: self.ledger.vote_policy() == EligibilityPolicy::ExcludeAuthor,
            },
            Phase::ShowingResults => PhasePayload::Results {
                ranked_answers: self.results.clone(),
                scores: self.scoreboard.snapshot(),
            },
            Phase::GameOver => PhasePayload::FinalScores {
                final_scores: self.scoreboard.snapshot(),
            },
        }
    }

    fn broadcast_roster(&self) {
        self.outbox.to_all(ServerMessage::RosterUpdated {
            names: self.roster.names(),
        });
    }
}
