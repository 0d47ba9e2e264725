use std::fs;
use std::io::Read;

use anyhow::Result;
use clap::Parser;

use stagegate::cli::{Cli, Command};
use stagegate::{demo, logging, ArtifactStore, EngineConfig, StagegateError, WorkflowOrchestrator};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = EngineConfig::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.storage_dir = data_dir;
    }

    let store = ArtifactStore::open(&config.storage_dir)?;
    let orchestrator = WorkflowOrchestrator::new(store, config);

    match cli.command {
        Command::NextStep { file } => {
            let raw = match file {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let response = orchestrator.next_step(&raw);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Ticket { ticket_id } => match orchestrator.ticket(&ticket_id)? {
            Some(ticket) => println!("{}", serde_json::to_string_pretty(&ticket)?),
            None => return Err(StagegateError::TicketNotFound(ticket_id).into()),
        },
        Command::Demo => {
            demo::run(&orchestrator)?;
        }
    }

    Ok(())
}
