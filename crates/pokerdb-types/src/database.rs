use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::player::PlayerRegistry;
use crate::session::Session;

/// Root persisted document: the player registry and the append-only
/// sequence of sealed sessions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub players: PlayerRegistry,
    #[serde(default)]
    sessions: Vec<Session>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Append a sealed session. Sessions are never modified afterwards.
    pub fn push_session(&mut self, session: Session) -> Result<(), TypeError> {
        if !session.is_sealed() {
            return Err(TypeError::UnsealedSession);
        }
        self.sessions.push(session);
        Ok(())
    }
}
