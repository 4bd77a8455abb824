//! WebSocket message dispatch
//!
//! Translates wire messages into engine actions bound to the sending
//! connection. Validation happens in the engine, not here.

use crate::protocol::ClientMessage;
use crate::session::{SessionClosed, SessionHandle};
use crate::state::Action;
use crate::types::ParticipantId;

impl From<ClientMessage> for Action {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::Join { display_name } => Action::Join { display_name },
            ClientMessage::StartGame => Action::StartGame,
            ClientMessage::SubmitQuestion { text } => Action::SubmitQuestion { text },
            ClientMessage::SubmitAnswer { text } => Action::SubmitAnswer { text },
            ClientMessage::SubmitVote { answer_index } => Action::SubmitVote { answer_index },
        }
    }
}

/// Forward a client message from `connection` to the session
pub async fn handle_message(
    msg: ClientMessage,
    connection: &ParticipantId,
    session: &SessionHandle,
) -> Result<(), SessionClosed> {
    session.dispatch(connection.clone(), Action::from(msg)).await
}
