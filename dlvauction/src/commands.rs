use super::IOArgs;
use clap::{Args, Subcommand};
use dlv_agent::{settings::FileSettings, table::StateActionTable};
use dlv_core::{
    models::{AgentConfig, ConfigurationError, Timeouts},
    ports::ConfigProvider,
};
use std::{fs::File, io::BufReader, path::PathBuf, time::Duration};

pub mod plan;
pub mod simulate;

#[derive(Subcommand)]
pub enum Commands {
    /// Play the host: run every scheduled auction round against the agent, then plan
    Simulate {
        #[command(flatten)]
        io: IOArgs,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Plan every task of the scenario directly and report the routes
    Plan {
        #[command(flatten)]
        io: IOArgs,

        #[command(flatten)]
        settings: SettingsArgs,
    },
}

// Where the agent configuration and valuation table come from
#[derive(Args, Default)]
pub struct SettingsArgs {
    /// The agent configuration file (TOML), overridden by DLV_* variables.
    /// If omitted, the scenario's configuration or the defaults are used.
    #[arg(short, long, env = "DLVAUCTION_CONFIG")]
    pub config: Option<PathBuf>,

    /// A precomputed state-action table (JSON) to bias the bids with
    #[arg(short, long)]
    pub table: Option<PathBuf>,
}

impl SettingsArgs {
    /// The configuration source, falling back on `inline` when no file is given
    pub fn source(&self, inline: Option<AgentConfig>) -> ConfigSource {
        match &self.config {
            Some(path) => ConfigSource::File(FileSettings::new(path)),
            None => ConfigSource::Inline(inline.unwrap_or_else(default_config)),
        }
    }

    pub fn table(&self) -> anyhow::Result<Option<StateActionTable>> {
        let Some(path) = &self.table else {
            return Ok(None);
        };
        let reader = BufReader::new(File::open(path)?);
        Ok(Some(StateActionTable::from_reader(reader)?))
    }
}

pub enum ConfigSource {
    File(FileSettings),
    Inline(AgentConfig),
}

impl ConfigProvider for ConfigSource {
    fn load(&self) -> Result<AgentConfig, ConfigurationError> {
        match self {
            Self::File(settings) => settings.load(),
            Self::Inline(config) => config.load(),
        }
    }
}

fn default_config() -> AgentConfig {
    AgentConfig::new(Timeouts {
        setup: Duration::from_secs(5),
        plan: Duration::from_secs(10),
        bid: Duration::from_secs(1),
    })
}
