use std::collections::BTreeMap;

use pokerdb_types::{Database, Money, Participation, PlayerRegistry, RegistryError, Session, Timestamp};
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::settlement::{SettlementEngine, SettlementReport, StackSource};

/// Lifecycle of a session ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerState {
    /// Accepting participants and rebuys.
    Open,
    /// Settled and timestamped; no further mutation.
    Sealed,
}

/// The in-progress session, built one operation at a time.
///
/// Every mutation is validated before anything changes, so a rejected
/// operation leaves the ledger (and the registry, where one is passed) as
/// it was.
#[derive(Clone, Debug)]
pub struct SessionLedger {
    session: Session,
    state: LedgerState,
}

impl SessionLedger {
    /// Open a session starting now.
    pub fn open() -> Self {
        Self::open_at(Timestamp::now())
    }

    pub fn open_at(start_time: Timestamp) -> Self {
        Self {
            session: Session::new(start_time),
            state: LedgerState::Open,
        }
    }

    pub fn state(&self) -> LedgerState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_empty(&self) -> bool {
        self.session.participants.is_empty()
    }

    pub fn participant(&self, name: &str) -> Option<&Participation> {
        self.session.participants.get(name)
    }

    /// Seat a registered player with their initial buy-in.
    pub fn add_participant(
        &mut self,
        registry: &PlayerRegistry,
        name: &str,
        buy_in: Money,
    ) -> LedgerResult<()> {
        self.ensure_open()?;
        ensure_non_negative(buy_in)?;
        if !registry.exists(name) {
            return Err(LedgerError::UnknownPlayer(name.to_string()));
        }
        if self.session.participants.contains_key(name) {
            return Err(LedgerError::AlreadyParticipant(name.to_string()));
        }
        self.session
            .participants
            .insert(name.to_string(), Participation::new(buy_in));
        debug!(player = name, %buy_in, "participant added");
        Ok(())
    }

    /// Record a rebuy for a player already seated in this session.
    pub fn add_rebuy(&mut self, name: &str, amount: Money) -> LedgerResult<()> {
        self.ensure_open()?;
        ensure_non_negative(amount)?;
        let participation = self
            .session
            .participants
            .get_mut(name)
            .ok_or_else(|| LedgerError::NotParticipant(name.to_string()))?;
        participation.rebuys.push(amount);
        debug!(player = name, %amount, rebuys = participation.rebuys.len(), "rebuy added");
        Ok(())
    }

    /// Register a brand-new player and seat them in one step.
    pub fn register_and_add(
        &mut self,
        registry: &mut PlayerRegistry,
        name: &str,
        buy_in: Money,
    ) -> LedgerResult<()> {
        self.ensure_open()?;
        ensure_non_negative(buy_in)?;
        if registry.exists(name) {
            return Err(RegistryError::AlreadyExists(name.to_string()).into());
        }
        registry.add(name)?;
        self.add_participant(registry, name, buy_in)
    }

    /// Finalize the session: hand it to `engine` for settlement.
    ///
    /// On success the ledger is `Sealed`, lifetime stats have accrued and the
    /// sealed session is appended to `db`. On failure nothing has changed.
    pub fn seal<S: StackSource + ?Sized>(
        &mut self,
        db: &mut Database,
        engine: &SettlementEngine,
        stacks: &mut S,
    ) -> LedgerResult<SettlementReport> {
        engine.settle(self, db, stacks)
    }

    pub(crate) fn ensure_open(&self) -> LedgerResult<()> {
        match self.state {
            LedgerState::Open => Ok(()),
            LedgerState::Sealed => Err(LedgerError::InvalidState("session is already sealed".into())),
        }
    }

    /// Record final stacks and the end time, and transition to `Sealed`.
    ///
    /// Callers must have verified that `final_stacks` covers every
    /// participant and balances.
    pub(crate) fn seal_with(
        &mut self,
        end_time: Timestamp,
        final_stacks: &BTreeMap<String, Money>,
    ) -> LedgerResult<Session> {
        self.ensure_open()?;
        if let Some(name) = self
            .session
            .participants
            .keys()
            .find(|name| !final_stacks.contains_key(*name))
        {
            return Err(LedgerError::InvalidState(format!("no final stack for {name}")));
        }
        for (name, participation) in self.session.participants.iter_mut() {
            participation.final_stack = final_stacks.get(name).copied();
        }
        self.session.end_time = Some(end_time);
        self.state = LedgerState::Sealed;
        Ok(self.session.clone())
    }
}

fn ensure_non_negative(amount: Money) -> LedgerResult<()> {
    if amount.is_negative() {
        return Err(LedgerError::NegativeAmount(amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str]) -> PlayerRegistry {
        let mut reg = PlayerRegistry::new();
        for name in names {
            reg.add(name).unwrap();
        }
        reg
    }

    fn ledger() -> SessionLedger {
        SessionLedger::open_at("2024-07-04 18:00:00".parse().unwrap())
    }

    #[test]
    fn opens_empty() {
        let l = ledger();
        assert_eq!(l.state(), LedgerState::Open);
        assert!(l.is_empty());
        assert!(l.session().end_time.is_none());
    }

    #[test]
    fn add_participant_creates_participation() {
        let reg = registry(&["Alice"]);
        let mut l = ledger();
        l.add_participant(&reg, "Alice", Money::from_units(100)).unwrap();
        let p = l.participant("Alice").unwrap();
        assert_eq!(p.buy_in, Money::from_units(100));
        assert!(p.rebuys.is_empty());
        assert!(p.final_stack.is_none());
    }

    #[test]
    fn add_unknown_player_fails() {
        let reg = registry(&["Alice"]);
        let mut l = ledger();
        let err = l.add_participant(&reg, "Mallory", Money::from_units(10)).unwrap_err();
        assert_eq!(err, LedgerError::UnknownPlayer("Mallory".into()));
        assert!(l.is_empty());
    }

    #[test]
    fn add_twice_fails() {
        let reg = registry(&["Alice"]);
        let mut l = ledger();
        l.add_participant(&reg, "Alice", Money::from_units(100)).unwrap();
        let err = l.add_participant(&reg, "Alice", Money::from_units(50)).unwrap_err();
        assert_eq!(err, LedgerError::AlreadyParticipant("Alice".into()));
        assert_eq!(l.participant("Alice").unwrap().buy_in, Money::from_units(100));
    }

    #[test]
    fn negative_buy_in_rejected() {
        let reg = registry(&["Alice"]);
        let mut l = ledger();
        assert!(matches!(
            l.add_participant(&reg, "Alice", Money::from_cents(-1)),
            Err(LedgerError::NegativeAmount(_))
        ));
        assert!(l.is_empty());
    }

    #[test]
    fn rebuys_append_in_order() {
        let reg = registry(&["Alice"]);
        let mut l = ledger();
        l.add_participant(&reg, "Alice", Money::from_units(100)).unwrap();
        l.add_rebuy("Alice", Money::from_units(50)).unwrap();
        l.add_rebuy("Alice", Money::from_cents(2525)).unwrap();
        let p = l.participant("Alice").unwrap();
        assert_eq!(p.rebuys, vec![Money::from_units(50), Money::from_cents(2525)]);
        assert_eq!(p.total_contribution(), Money::from_cents(17525));
    }

    #[test]
    fn rebuy_for_non_participant_fails() {
        let reg = registry(&["Alice", "Bob"]);
        let mut l = ledger();
        l.add_participant(&reg, "Alice", Money::from_units(100)).unwrap();
        let err = l.add_rebuy("Bob", Money::from_units(50)).unwrap_err();
        assert_eq!(err, LedgerError::NotParticipant("Bob".into()));
        assert!(l.participant("Bob").is_none());
    }

    #[test]
    fn negative_rebuy_rejected() {
        let reg = registry(&["Alice"]);
        let mut l = ledger();
        l.add_participant(&reg, "Alice", Money::from_units(100)).unwrap();
        assert!(matches!(
            l.add_rebuy("Alice", Money::from_units(-5)),
            Err(LedgerError::NegativeAmount(_))
        ));
        assert!(l.participant("Alice").unwrap().rebuys.is_empty());
    }

    #[test]
    fn register_and_add_new_player() {
        let mut reg = registry(&["Alice"]);
        let mut l = ledger();
        l.register_and_add(&mut reg, "Dana", Money::from_units(40)).unwrap();
        assert!(reg.exists("Dana"));
        assert_eq!(l.participant("Dana").unwrap().buy_in, Money::from_units(40));
    }

    #[test]
    fn register_and_add_existing_fails_without_changes() {
        let mut reg = registry(&["Alice"]);
        let mut l = ledger();
        let err = l.register_and_add(&mut reg, "Alice", Money::from_units(40)).unwrap_err();
        assert_eq!(err, LedgerError::Registry(RegistryError::AlreadyExists("Alice".into())));
        assert_eq!(reg.len(), 1);
        assert!(l.is_empty());
    }

    #[test]
    fn register_and_add_negative_leaves_registry_alone() {
        let mut reg = registry(&[]);
        let mut l = ledger();
        assert!(l.register_and_add(&mut reg, "Eve", Money::from_units(-1)).is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn sealed_ledger_rejects_mutation() {
        let reg = registry(&["Alice", "Bob"]);
        let mut l = ledger();
        l.add_participant(&reg, "Alice", Money::from_units(10)).unwrap();
        let stacks = BTreeMap::from([("Alice".to_string(), Money::from_units(10))]);
        let sealed = l.seal_with("2024-07-04 20:00:00".parse().unwrap(), &stacks).unwrap();
        assert!(sealed.is_sealed());
        assert_eq!(l.state(), LedgerState::Sealed);

        assert!(matches!(l.add_rebuy("Alice", Money::from_units(5)), Err(LedgerError::InvalidState(_))));
        assert!(matches!(
            l.add_participant(&reg, "Bob", Money::from_units(5)),
            Err(LedgerError::InvalidState(_))
        ));
    }

    #[test]
    fn seal_with_missing_stack_is_rejected() {
        let reg = registry(&["Alice", "Bob"]);
        let mut l = ledger();
        l.add_participant(&reg, "Alice", Money::from_units(10)).unwrap();
        l.add_participant(&reg, "Bob", Money::from_units(10)).unwrap();
        let stacks = BTreeMap::from([("Alice".to_string(), Money::from_units(20))]);
        assert!(l.seal_with("2024-07-04 20:00:00".parse().unwrap(), &stacks).is_err());
        assert_eq!(l.state(), LedgerState::Open);
        assert!(l.participant("Alice").unwrap().final_stack.is_none());
    }
}
