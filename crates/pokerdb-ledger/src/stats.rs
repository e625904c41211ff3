use std::cmp::Reverse;

use pokerdb_types::{round2, Database, Money, Player};
use serde::Serialize;

/// Lifetime statistics for one player, with derived rates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerStats {
    pub name: String,
    pub profit: Money,
    pub sessions: u64,
    pub hours_played: f64,
    /// `None` until the player has settled a session.
    pub profit_per_session: Option<Money>,
    /// `None` until the player has logged any time.
    pub profit_per_hour: Option<f64>,
}

impl From<&Player> for PlayerStats {
    fn from(player: &Player) -> Self {
        let profit_per_session = (player.sessions > 0).then(|| {
            let per = player.profit.cents() as f64 / player.sessions as f64;
            Money::from_cents(per.round() as i64)
        });
        let profit_per_hour = (player.hours_played > 0.0)
            .then(|| round2(player.profit.to_f64() / player.hours_played));
        Self {
            name: player.name.clone(),
            profit: player.profit,
            sessions: player.sessions,
            hours_played: player.hours_played,
            profit_per_session,
            profit_per_hour,
        }
    }
}

/// Whole-database totals.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatabaseSummary {
    pub players: usize,
    pub sessions: usize,
    /// Sum of session durations (not of player-hours).
    pub total_hours: f64,
    /// Buy-ins plus rebuys across every session.
    pub total_in_play: Money,
    /// Sum of lifetime profits; zero while every session balanced.
    pub registry_net: Money,
    /// Stored sessions whose final stacks do not match contributions.
    pub unbalanced_sessions: usize,
}

/// Read-only projection of a database for reporting.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatsProjection {
    /// Players ordered by lifetime profit, highest first, then by name.
    pub leaderboard: Vec<PlayerStats>,
    pub summary: DatabaseSummary,
}

impl StatsProjection {
    pub fn build(db: &Database) -> Self {
        let mut leaderboard: Vec<PlayerStats> = db.players.iter().map(PlayerStats::from).collect();
        leaderboard.sort_by(|a, b| {
            Reverse(a.profit)
                .cmp(&Reverse(b.profit))
                .then_with(|| a.name.cmp(&b.name))
        });

        let sessions = db.sessions();
        let total_hours = round2(sessions.iter().filter_map(|s| s.duration_hours()).sum());
        let summary = DatabaseSummary {
            players: db.players.len(),
            sessions: sessions.len(),
            total_hours,
            total_in_play: sessions.iter().map(|s| s.total_contributions()).sum(),
            registry_net: db.players.net_profit(),
            unbalanced_sessions: sessions
                .iter()
                .filter(|s| s.balance() != Some(Money::ZERO))
                .count(),
        };

        Self { leaderboard, summary }
    }

    pub fn is_empty(&self) -> bool {
        self.leaderboard.is_empty()
    }
}
