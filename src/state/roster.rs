use super::Rejection;
use crate::types::*;

/// Connected participants in join order
#[derive(Debug, Clone)]
pub struct Roster {
    participants: Vec<Participant>,
    facilitator_name: String,
}

impl Roster {
    pub fn new(facilitator_name: impl Into<String>) -> Self {
        Self {
            participants: Vec::new(),
            facilitator_name: facilitator_name.into(),
        }
    }

    /// Add a participant under a display name that must be unique on the roster
    pub fn join(
        &mut self,
        id: ParticipantId,
        display_name: &str,
    ) -> Result<Participant, Rejection> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(Rejection::InvalidName);
        }
        if self.get(&id).is_some() {
            return Err(Rejection::AlreadyJoined);
        }
        if self
            .participants
            .iter()
            .any(|p| p.display_name == display_name)
        {
            return Err(Rejection::NameTaken);
        }

        let participant = Participant {
            id,
            display_name: display_name.to_string(),
            is_facilitator: display_name == self.facilitator_name,
        };
        self.participants.push(participant.clone());
        Ok(participant)
    }

    /// Remove a participant, returning them if they were on the roster
    pub fn leave(&mut self, id: &ParticipantId) -> Option<Participant> {
        let index = self.participants.iter().position(|p| p.id == *id)?;
        Some(self.participants.remove(index))
    }

    pub fn list(&self) -> &[Participant] {
        &self.participants
    }

    pub fn names(&self) -> Vec<DisplayName> {
        self.participants
            .iter()
            .map(|p| p.display_name.clone())
            .collect()
    }

    /// Names of everyone currently present, in join order
    pub fn display_names(&self) -> impl Iterator<Item = &DisplayName> {
        self.participants.iter().map(|p| &p.display_name)
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == *id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
