//! Formsmith command line runtime.

#![forbid(unsafe_code)]

mod cli_config;
mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use formsmith_application::FormBuilderService;
use formsmith_core::{AppError, AppResult};
use formsmith_infrastructure::{ConsoleSubmissionSink, JsonFileFormRepository};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli_config::CliConfig;
use crate::commands::FieldAssignment;

#[derive(Debug, Parser)]
#[command(name = "formsmith", version, about = "Manage saved forms and preview them")]
struct Cli {
    /// Directory holding the saved form list.
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List saved forms.
    List,
    /// Print one saved form as JSON.
    Show { id: String },
    /// Save a form document, replacing a stored form with the same id.
    Import { path: PathBuf },
    /// Delete one saved form.
    Delete { id: String },
    /// Delete every saved form.
    Clear,
    /// Fill in a saved form and submit it.
    Preview {
        id: String,
        /// Field value to enter before submitting.
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
        /// Date used for derived ages, defaults to today.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.store_dir)?;
    info!(store_dir = %config.store_dir.display(), "using form store");

    let service = FormBuilderService::new(
        Arc::new(JsonFileFormRepository::new(&config.store_dir)),
        Arc::new(ConsoleSubmissionSink::new()),
    );

    run(&service, cli.command).await
}

async fn run(service: &FormBuilderService, command: Command) -> AppResult<()> {
    match command {
        Command::List => commands::list_forms(service).await,
        Command::Show { id } => commands::show_form(service, id.as_str()).await,
        Command::Import { path } => commands::import_form(service, &path).await,
        Command::Delete { id } => commands::delete_form(service, id.as_str()).await,
        Command::Clear => {
            service.clear_forms().await?;
            println!("cleared saved forms");
            Ok(())
        }
        Command::Preview { id, set, today } => {
            let assignments = set
                .iter()
                .map(|raw| FieldAssignment::parse(raw))
                .collect::<AppResult<Vec<_>>>()?;
            commands::preview_form(service, id.as_str(), assignments, today).await
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
