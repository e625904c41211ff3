use pokerdb_ledger::SettlementConfig;
use pokerdb_store::{StoreConfig, StoreResult};
use serde::Serialize;

use crate::cli::{Cli, OutputFormat};

/// Resolved runtime configuration, built once from the command line.
#[derive(Clone, Debug, Serialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub settlement: SettlementConfig,
    #[serde(skip)]
    pub format: OutputFormat,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> StoreResult<Self> {
        let store = match &cli.data_dir {
            Some(dir) => StoreConfig::new(dir.clone()),
            None => StoreConfig::from_home()?,
        };
        let mut settlement = SettlementConfig::default();
        if let Some(max_attempts) = cli.max_attempts {
            settlement.max_attempts = max_attempts;
        }
        Ok(Self {
            store,
            settlement,
            format: cli.format,
        })
    }
}
