use clap::Parser;
use dlv_core::models::TaskId;

mod io;
pub use io::*;

mod commands;
pub use commands::*;

pub mod scenario;

// The top-level arguments -- presently just which subcommand to execute
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct BaseArgs {
    #[command(subcommand)]
    pub command: Commands,
}

impl BaseArgs {
    pub fn evaluate(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Simulate { io, settings } => {
                let scenario = scenario::Scenario::from_reader(io.read()?)?;
                let report = simulate::run(scenario, &settings)?;
                serde_json::to_writer_pretty(io.write()?, &report)?;
            }
            Commands::Plan { io, settings } => {
                let scenario = scenario::Scenario::from_reader(io.read()?)?;
                let report = plan::run(scenario, &settings)?;
                serde_json::to_writer_pretty(io.write()?, &report)?;
            }
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Unknown city `{0}` in scenario")]
    UnknownCity(String),
    #[error("Task {0} is scheduled more than once")]
    DuplicateTask(TaskId),
}
