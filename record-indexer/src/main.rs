use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing::{error, info};

use record_indexer::{logging, Dependencies, IndexingError, Settings};
use record_indexer_shared::IndexResult;

#[derive(Parser)]
#[command(name = "record-indexer")]
#[command(about = "Index repository records into Elasticsearch", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consume record batches and index requests from Kafka until Ctrl-C
    Consume,
    /// Index every record of a repository
    IndexRepository { repo_code: String },
    /// Index every record of one organization
    IndexOrganization {
        repo_code: String,
        organization: String,
    },
    /// Index a single record
    IndexRecord {
        repo_code: String,
        organization: String,
        id: String,
    },
    /// Remove a single record from the index
    RemoveRecord {
        repo_code: String,
        organization: String,
        id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Settings first so LOG_LEVEL from .env is visible to the subscriber
    let settings = Settings::from_env();
    logging::init_tracing();

    let result = match settings {
        Ok(settings) => run(cli.command, settings).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!(error = %e, "Record indexer failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, settings: Settings) -> Result<(), IndexingError> {
    let dependencies = Dependencies::new(settings).await?;
    let orchestrator = dependencies.orchestrator.clone();

    let result = match command {
        Commands::Consume => return consume(&dependencies).await,
        Commands::IndexRepository { repo_code } => orchestrator.index_repository(&repo_code).await?,
        Commands::IndexOrganization {
            repo_code,
            organization,
        } => {
            orchestrator
                .index_organization(&repo_code, &organization)
                .await?
        }
        Commands::IndexRecord {
            repo_code,
            organization,
            id,
        } => orchestrator.index_record(&repo_code, &organization, &id).await?,
        Commands::RemoveRecord {
            repo_code,
            organization,
            id,
        } => {
            orchestrator
                .remove_index_record(&repo_code, &organization, &id)
                .await?
        }
    };

    print_result(&result)
}

async fn consume(dependencies: &Dependencies) -> Result<(), IndexingError> {
    let (consumer, handler) = dependencies.event_consumer()?;
    consumer.subscribe()?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
        }
    });

    consumer.run(&handler, shutdown_rx).await?;

    info!("Consumer shutdown complete");
    Ok(())
}

fn print_result(result: &IndexResult) -> Result<(), IndexingError> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| IndexingError::config(format!("Failed to render result: {}", e)))?;
    println!("{}", json);

    if !result.is_successful() {
        error!(
            index = %result.index_name(),
            failures = result.failure_data().len(),
            "Indexing finished with failures"
        );
    }
    Ok(())
}
