use std::str::FromStr;

use pokerdb_ledger::{
    LedgerError, LedgerResult, SessionLedger, SettlementEngine, SettlementReport, StackSource,
};
use pokerdb_types::{Database, Money, RegistryError};

use crate::input::InputProvider;

const MENU: &str = "\nOptions:\n\
    1. Add Player to Session\n\
    2. Add Rebuy for a Player\n\
    3. Add New Player to Database\n\
    4. Finalize Session";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    AddParticipant,
    AddRebuy,
    RegisterAndAdd,
    Finalize,
}

impl FromStr for MenuChoice {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::AddParticipant),
            "2" => Ok(Self::AddRebuy),
            "3" => Ok(Self::RegisterAndAdd),
            "4" => Ok(Self::Finalize),
            _ => Err(()),
        }
    }
}

/// Menu loop binding user input to the session ledger and settlement engine.
///
/// Ledger errors are reported and the menu is shown again; the loop only
/// ends with a settled session or a fatal error (input closed, or the
/// registry could not be persisted).
pub struct SessionController<'a, I: InputProvider + ?Sized> {
    input: &'a mut I,
    engine: &'a SettlementEngine,
}

impl<'a, I: InputProvider + ?Sized> SessionController<'a, I> {
    pub fn new(input: &'a mut I, engine: &'a SettlementEngine) -> Self {
        Self { input, engine }
    }

    /// Drive `ledger` to settlement against `db`.
    ///
    /// `on_register` runs after a new player is added to the registry so the
    /// caller can persist it right away.
    pub fn run<F>(
        &mut self,
        db: &mut Database,
        mut ledger: SessionLedger,
        mut on_register: F,
    ) -> anyhow::Result<SettlementReport>
    where
        F: FnMut(&Database) -> anyhow::Result<()>,
    {
        loop {
            self.input.show(MENU);
            let raw = self.input.next_string("Choose an option")?;
            let Ok(choice) = raw.parse::<MenuChoice>() else {
                self.input.error("Invalid option, please try again.");
                continue;
            };

            let step = match choice {
                MenuChoice::AddParticipant => self.add_participant(db, &mut ledger),
                MenuChoice::AddRebuy => self.add_rebuy(&mut ledger),
                MenuChoice::RegisterAndAdd => {
                    let step = self.register_and_add(db, &mut ledger);
                    if step.is_ok() {
                        on_register(&*db)?;
                    }
                    step
                }
                MenuChoice::Finalize => match self.finalize(db, &mut ledger) {
                    Ok(report) => return Ok(report),
                    Err(e) => Err(e),
                },
            };

            match step {
                Ok(()) => {}
                Err(LedgerError::Input(reason)) => anyhow::bail!(reason),
                Err(e) => self.input.error(&e.to_string()),
            }
        }
    }

    fn add_participant(&mut self, db: &Database, ledger: &mut SessionLedger) -> LedgerResult<()> {
        let name = self.ask_string("Enter player name")?;
        let buy_in = self.ask_amount("Enter buy-in amount")?;
        ledger.add_participant(&db.players, &name, buy_in)
    }

    fn add_rebuy(&mut self, ledger: &mut SessionLedger) -> LedgerResult<()> {
        let name = self.ask_string("Enter player name")?;
        if ledger.participant(&name).is_none() {
            return Err(LedgerError::NotParticipant(name));
        }
        let amount = self.ask_amount("Enter rebuy amount")?;
        ledger.add_rebuy(&name, amount)
    }

    fn register_and_add(&mut self, db: &mut Database, ledger: &mut SessionLedger) -> LedgerResult<()> {
        let name = self.ask_string("Enter new player's name")?;
        if db.players.exists(&name) {
            return Err(RegistryError::AlreadyExists(name).into());
        }
        let buy_in = self.ask_amount(&format!("Enter buy-in amount for {name}"))?;
        ledger.register_and_add(&mut db.players, &name, buy_in)?;
        self.input
            .show(&format!("New player {name} added to the database."));
        Ok(())
    }

    fn finalize(&mut self, db: &mut Database, ledger: &mut SessionLedger) -> LedgerResult<SettlementReport> {
        if ledger.is_empty() {
            return Err(LedgerError::EmptySession);
        }
        self.input.show("Finalizing session...");
        let mut stacks = PromptedStacks { input: &mut *self.input };
        ledger.seal(db, self.engine, &mut stacks)
    }

    fn ask_string(&mut self, prompt: &str) -> LedgerResult<String> {
        self.input.next_string(prompt).map_err(input_error)
    }

    fn ask_amount(&mut self, prompt: &str) -> LedgerResult<Money> {
        self.input.next_amount(prompt).map_err(input_error)
    }
}

/// Asks the user for each participant's final stack.
struct PromptedStacks<'a, I: InputProvider + ?Sized> {
    input: &'a mut I,
}

impl<I: InputProvider + ?Sized> StackSource for PromptedStacks<'_, I> {
    fn final_stack(&mut self, name: &str, attempt: u32) -> LedgerResult<Money> {
        let prompt = if attempt == 1 {
            format!("Enter final stack for {name}")
        } else {
            format!("Re-enter final stack for {name}")
        };
        self.input.next_amount(&prompt).map_err(input_error)
    }

    fn unbalanced(&mut self, difference: Money, _attempt: u32, retrying: bool) {
        if retrying {
            self.input.error(&format!(
                "Profit difference is not zero ({difference}). Re-enter final stacks."
            ));
        }
    }
}

fn input_error(err: anyhow::Error) -> LedgerError {
    LedgerError::Input(format!("{err:#}"))
}
