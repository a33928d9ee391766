use chrono::Utc;
use clap::{Parser, Subcommand};
use doculyzer_core::{
    read_upload, AnalysisClient, AnalysisConfig, DocumentService, FsBlobStore, JsonDocumentStore,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "doculyzer", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding document records and uploaded blobs
    #[arg(long, env = "DOCULYZER_DATA_DIR", default_value = ".doculyzer")]
    data_dir: PathBuf,

    /// Bearer credential for the completion service
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    openrouter_api_key: Option<String>,

    /// Chat-completion endpoint URL
    #[arg(long, env = "OPENROUTER_URL")]
    openrouter_url: Option<String>,

    /// Model identifier sent with each analysis request
    #[arg(long, env = "OPENROUTER_MODEL")]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a PDF or DOCX file and extract its text.
    Upload {
        /// File to upload.
        #[arg(long)]
        file: PathBuf,
    },
    /// Send a stored document's text for summary, type and metadata extraction.
    Analyze {
        /// Document identifier returned by `upload`.
        #[arg(long)]
        id: String,
    },
    /// Print a stored document as JSON.
    Show {
        /// Document identifier returned by `upload`.
        #[arg(long)]
        id: String,
    },
    /// Upload every PDF and DOCX file found recursively under a folder.
    Ingest {
        /// Folder to scan.
        #[arg(long)]
        folder: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is not an error; settings may come from the real environment.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    if let Err(error) = dotenv {
        if !error.not_found() {
            warn!(%error, "failed to load .env file");
        }
    }

    let cli = Cli::parse();

    let config = AnalysisConfig::from_values(
        cli.openrouter_api_key.clone(),
        cli.openrouter_url.clone(),
        cli.model.clone(),
    )?;
    let service = DocumentService::new(
        JsonDocumentStore::new(cli.data_dir.join("documents")),
        FsBlobStore::new(cli.data_dir.join("blobs")),
        AnalysisClient::new(config),
    );

    info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %cli.data_dir.display(),
        started_at = %Utc::now().to_rfc3339(),
        "doculyzer boot"
    );

    match cli.command {
        Command::Upload { file } => {
            let upload = read_upload(&file).await?;
            let document = service.upload(upload).await?;
            println!("{}", document.id);
        }
        Command::Analyze { id } => {
            let document = service.analyze_stored_document(&id).await?;
            println!("{}", serde_json::to_string_pretty(&document.view())?);
        }
        Command::Show { id } => {
            let document = service.get_document(&id).await?;
            println!("{}", serde_json::to_string_pretty(&document.view())?);
        }
        Command::Ingest { folder } => {
            let report = service.ingest_folder(&folder).await?;

            for document in &report.documents {
                println!("{}\t{}", document.id, document.filename);
            }

            if !report.skipped_files.is_empty() {
                warn!(
                    skipped = report.skipped_files.len(),
                    folder = %folder.display(),
                    "some files were not ingested"
                );
                for skipped in &report.skipped_files {
                    println!("skipped\t{}\t{}", skipped.path.display(), skipped.reason);
                }
            }

            println!(
                "{} documents ingested at {}",
                report.documents.len(),
                Utc::now().to_rfc3339()
            );
        }
    }

    Ok(())
}
