use clap::Subcommand;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum InitCommands {
    #[command(about = "Create the tables in the database named by DATABASE_URL")]
    Schema,
}

pub async fn handle(cmd: InitCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        InitCommands::Schema => {
            DatabaseManager::apply_schema().await?;
            DatabaseManager::close().await;
            output_success(&output_format, "Schema applied", None)
        }
    }
}
