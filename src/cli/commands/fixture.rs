use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::{DatabaseManager, PgStore, Repositories};
use crate::services::{load_fixture, Fixture, FixtureRecords};

#[derive(Subcommand)]
pub enum FixtureCommands {
    #[command(about = "Load a YAML fixture into the database named by DATABASE_URL")]
    Load {
        #[arg(help = "Fixture file")]
        file: PathBuf,
    },

    #[command(about = "Parse a fixture and check its references without touching a database")]
    Check {
        #[arg(help = "Fixture file")]
        file: PathBuf,
    },
}

pub async fn handle(cmd: FixtureCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        FixtureCommands::Load { file } => {
            let yaml = read(&file)?;
            let pool = DatabaseManager::pool().await?;
            let repos = Repositories::from_store(Arc::new(PgStore::new(pool)));

            let records = load_fixture(&yaml, &repos).await?;
            DatabaseManager::close().await;

            output_success(&output_format, &format!("Loaded {}", file.display()), Some(counts(&records)))
        }
        FixtureCommands::Check { file } => {
            let records = Fixture::from_yaml(&read(&file)?)?.into_records()?;
            output_success(&output_format, &format!("{} is valid", file.display()), Some(counts(&records)))
        }
    }
}

fn read(file: &PathBuf) -> anyhow::Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("Failed to read fixture {}", file.display()))
}

fn counts(records: &FixtureRecords) -> serde_json::Value {
    json!({
        "departments": records.departments.len(),
        "accounts": records.accounts.len(),
        "people": records.people.len(),
        "cases": records.cases.len(),
        "items": records.items.len(),
    })
}
