use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::money::{round2, Money};

/// Lifetime statistics for one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    /// Cumulative profit across all settled sessions.
    pub profit: Money,
    /// Number of settled sessions played.
    pub sessions: u64,
    pub hours_played: f64,
}

impl Player {
    /// A fresh record with all lifetime counters at zero.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profit: Money::ZERO,
            sessions: 0,
            hours_played: 0.0,
        }
    }
}

/// Registry of players, unique by name, kept in insertion order.
///
/// Lifetime fields only move through [`PlayerRegistry::accrue`], which the
/// settlement engine calls once per participant of a balanced session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Player>", into = "Vec<Player>")]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from existing records, rejecting duplicate names.
    pub fn from_players(players: Vec<Player>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for player in players {
            if registry.exists(&player.name) {
                return Err(RegistryError::AlreadyExists(player.name));
            }
            registry.players.push(player);
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Insert a new player with zeroed statistics.
    pub fn add(&mut self, name: &str) -> Result<&Player, RegistryError> {
        validate_player_name(name)?;
        if self.exists(name) {
            return Err(RegistryError::AlreadyExists(name.to_string()));
        }
        self.players.push(Player::new(name));
        let index = self.players.len() - 1;
        Ok(&self.players[index])
    }

    /// Change a player's name, keeping their statistics.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<(), RegistryError> {
        validate_player_name(new_name)?;
        if old_name != new_name && self.exists(new_name) {
            return Err(RegistryError::AlreadyExists(new_name.to_string()));
        }
        let player = self.get_mut(old_name)?;
        player.name = new_name.to_string();
        Ok(())
    }

    /// Add one settled session's outcome to a player's lifetime totals.
    pub fn accrue(&mut self, name: &str, profit: Money, hours: f64) -> Result<(), RegistryError> {
        let player = self.get_mut(name)?;
        player.profit += profit;
        player.sessions += 1;
        player.hours_played = round2(player.hours_played + round2(hours));
        Ok(())
    }

    /// Sum of lifetime profit over all players. Zero while every settled
    /// session balanced.
    pub fn net_profit(&self) -> Money {
        self.players.iter().map(|p| p.profit).sum()
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Player, RegistryError> {
        self.players
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }
}

impl TryFrom<Vec<Player>> for PlayerRegistry {
    type Error = RegistryError;

    fn try_from(players: Vec<Player>) -> Result<Self, Self::Error> {
        Self::from_players(players)
    }
}

impl From<PlayerRegistry> for Vec<Player> {
    fn from(registry: PlayerRegistry) -> Self {
        registry.players
    }
}

fn validate_player_name(name: &str) -> Result<(), RegistryError> {
    if name.trim().is_empty() {
        return Err(RegistryError::InvalidName {
            name: name.to_string(),
            reason: "name must not be empty".into(),
        });
    }
    if name.trim() != name {
        return Err(RegistryError::InvalidName {
            name: name.to_string(),
            reason: "name must not start or end with whitespace".into(),
        });
    }
    Ok(())
}
