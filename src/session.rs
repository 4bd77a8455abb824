//! The single shared game session
//!
//! One tokio task owns the [`PhaseEngine`]. Participant commands and timer
//! events are merged into that task and handled one at a time, which gives
//! the engine exclusive access without locks. Transports talk to it through
//! a cloneable [`SessionHandle`].

use crate::broadcast::{Outbound, OUTBOUND_CAPACITY};
use crate::state::{Action, PhaseEngine, TimerEvent};
use crate::types::{GameConfig, ParticipantId};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

/// Inbound commands buffered before the transport waits on the loop
const COMMAND_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct Command {
    pub participant: ParticipantId,
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("game session has stopped")]
pub struct SessionClosed;

/// Transport-facing side of the session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    outbound: broadcast::Sender<Outbound>,
}

impl SessionHandle {
    /// Queue an action from `participant` for the session loop
    pub async fn dispatch(
        &self,
        participant: ParticipantId,
        action: Action,
    ) -> Result<(), SessionClosed> {
        self.commands
            .send(Command {
                participant,
                action,
            })
            .await
            .map_err(|_| SessionClosed)
    }

    /// Receive everything the engine emits from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.outbound.subscribe()
    }
}

pub struct Session {
    handle: SessionHandle,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Session {
    /// Spawn the session loop with a fresh, idle engine
    pub fn create(config: GameConfig) -> Self {
        let (outbound, _) = broadcast::channel(OUTBOUND_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tracing::info!(
            facilitator = %config.facilitator_name,
            scoring = %config.scoring,
            answer_policy = ?config.answer_policy,
            vote_policy = ?config.vote_policy,
            "Creating game session"
        );
        let engine = PhaseEngine::new(config, outbound.clone(), timer_tx);
        let task = tokio::spawn(run(engine, command_rx, timer_rx, shutdown_rx));

        Self {
            handle: SessionHandle {
                commands: command_tx,
                outbound,
            },
            shutdown: shutdown_tx,
            task,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Stop the loop, cancel outstanding timers and wait for the task to finish
    pub async fn teardown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::error!("Session loop ended abnormally: {}", e);
        }
    }
}

async fn run(
    mut engine: PhaseEngine<broadcast::Sender<Outbound>>,
    mut commands: mpsc::Receiver<Command>,
    mut timers: mpsc::UnboundedReceiver<TimerEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown => break,

            command = commands.recv() => match command {
                Some(Command { participant, action }) => engine.handle(&participant, action),
                None => break,
            },

            Some(event) = timers.recv() => engine.on_timer(event),
        }
    }

    engine.teardown();
    tracing::info!("Game session stopped");
}
