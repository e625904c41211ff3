use std::collections::BTreeMap;

use pokerdb_types::{Database, Money, Session, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::session::SessionLedger;

/// Configuration for the settlement engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// How many rounds of final-stack entry to allow before giving up with
    /// [`LedgerError::Unbalanced`]. Zero is treated as one.
    pub max_attempts: u32,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self { max_attempts: 10 }
    }
}

/// Supplies final stacks while a session is being settled.
///
/// The interactive shell prompts the user; tests script the answers.
pub trait StackSource {
    /// Final stack for `name` in round `attempt` (starting at 1).
    fn final_stack(&mut self, name: &str, attempt: u32) -> LedgerResult<Money>;

    /// The stacks entered in round `attempt` were off by `difference`
    /// (stacks minus contributions). `retrying` is false on the last round.
    fn unbalanced(&mut self, _difference: Money, _attempt: u32, _retrying: bool) {}
}

/// One participant's result in a settled session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerOutcome {
    pub name: String,
    /// Buy-in plus rebuys.
    pub contribution: Money,
    pub final_stack: Money,
    pub profit: Money,
}

/// Everything a successful settlement committed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SettlementReport {
    /// The sealed session, as appended to the database.
    pub session: Session,
    /// Per-participant results, ordered by name.
    pub outcomes: Vec<PlayerOutcome>,
    /// Session duration credited to every participant.
    pub hours: f64,
    /// Rounds of stack entry it took to balance.
    pub attempts: u32,
}

/// Reconciles final stacks against contributions and commits the result.
#[derive(Clone, Debug, Default)]
pub struct SettlementEngine {
    config: SettlementConfig,
}

impl SettlementEngine {
    pub fn new(config: SettlementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Settle `ledger` with the current time as its end time.
    pub fn settle<S: StackSource + ?Sized>(
        &self,
        ledger: &mut SessionLedger,
        db: &mut Database,
        stacks: &mut S,
    ) -> LedgerResult<SettlementReport> {
        self.settle_at(ledger, db, stacks, Timestamp::now())
    }

    /// Settle `ledger`, ending the session at `end_time`.
    ///
    /// Final stacks are requested for every participant, round after round,
    /// until they sum exactly to the total contributed or the attempt budget
    /// runs out. Only a balanced round proceeds: every participant's profit
    /// and the session duration accrue to the registry together, the ledger
    /// is sealed, and the session is appended to `db`. Any error leaves
    /// `ledger` open and `db` untouched.
    pub fn settle_at<S: StackSource + ?Sized>(
        &self,
        ledger: &mut SessionLedger,
        db: &mut Database,
        stacks: &mut S,
        end_time: Timestamp,
    ) -> LedgerResult<SettlementReport> {
        ledger.ensure_open()?;
        if ledger.is_empty() {
            return Err(LedgerError::EmptySession);
        }
        if let Some(name) = ledger
            .session()
            .participants
            .keys()
            .find(|name| !db.players.exists(name))
        {
            return Err(LedgerError::UnknownPlayer(name.clone()));
        }

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        let final_stacks = loop {
            attempt += 1;
            let entered = collect_stacks(ledger.session(), stacks, attempt)?;
            let difference = balance_error(ledger.session(), &entered);
            if difference.is_zero() {
                break entered;
            }
            let retrying = attempt < max_attempts;
            info!(attempt, %difference, retrying, "final stacks do not balance");
            stacks.unbalanced(difference, attempt, retrying);
            if !retrying {
                return Err(LedgerError::Unbalanced {
                    attempts: attempt,
                    difference,
                });
            }
        };

        let hours = ledger.session().start_time.hours_until(&end_time);
        let outcomes: Vec<PlayerOutcome> = ledger
            .session()
            .participants
            .iter()
            .zip(final_stacks.values())
            .map(|((name, participation), &final_stack)| {
                let contribution = participation.total_contribution();
                PlayerOutcome {
                    name: name.clone(),
                    contribution,
                    final_stack,
                    profit: final_stack - contribution,
                }
            })
            .collect();

        // Stage every accrual before touching the database.
        let mut staged = db.players.clone();
        for outcome in &outcomes {
            staged.accrue(&outcome.name, outcome.profit, hours)?;
        }

        let session = ledger.seal_with(end_time, &final_stacks)?;
        db.push_session(session.clone())?;
        db.players = staged;

        info!(
            participants = outcomes.len(),
            hours,
            attempts = attempt,
            pot = %session.total_contributions(),
            "session settled"
        );

        Ok(SettlementReport {
            session,
            outcomes,
            hours,
            attempts: attempt,
        })
    }
}

fn collect_stacks<S: StackSource + ?Sized>(
    session: &Session,
    stacks: &mut S,
    attempt: u32,
) -> LedgerResult<BTreeMap<String, Money>> {
    session
        .participants
        .keys()
        .map(|name| -> LedgerResult<(String, Money)> {
            Ok((name.clone(), stacks.final_stack(name, attempt)?))
        })
        .collect()
}

/// Entered stacks minus contributions; zero when the session balances.
fn balance_error(session: &Session, final_stacks: &BTreeMap<String, Money>) -> Money {
    let total_stacks: Money = final_stacks.values().sum();
    total_stacks - session.total_contributions()
}
