// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{error, info};
use uuid::Uuid;

use crate::console::Console;
use crate::core::{ConfigManager, ServiceClient};
use crate::store::ResumeStore;
use crate::types::ResumeDocument;
use crate::utils::SourceFile;
use crate::wizard::Wizard;

#[derive(Parser)]
#[command(name = "resume-builder")]
#[command(about = "Build a resume step by step against the resume service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Resume service base URL (overrides RESUME_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Log at debug level
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Interactive step-by-step builder
    Wizard {
        /// Resume file to parse before the first step
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        template: Option<String>,
    },
    /// Parse a resume file and print the document as JSON
    Upload {
        path: PathBuf,
        #[arg(long)]
        template: Option<String>,
    },
    /// Print the document of an already parsed resume
    Fetch { resume_id: Uuid },
    /// Generate a summary tailored to a job description
    Summary {
        #[arg(long)]
        job_description: String,
        /// Document JSON to summarize (an empty resume otherwise)
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    /// Check that the resume service is up
    Health,
}

pub async fn run(cli: Cli, config: ConfigManager) -> Result<()> {
    let client = Arc::new(ServiceClient::new(
        &config.service.base_url,
        config.service.timeout_seconds,
    )?);
    let store = Arc::new(ResumeStore::new(client.clone()));

    match cli.command {
        Command::Wizard { file, template } => {
            let template = template.unwrap_or(config.default_template);
            if let Some(path) = file {
                let source = read_source(&path).await?;
                if let Err(err) = store.upload_source_document(&source, &template).await {
                    error!("Initial upload failed: {}", err);
                    eprintln!("❌ {}", err.user_message());
                }
            }

            let mut console = Console::new(Wizard::new(store), template, tokio::io::stdout());
            console.run(BufReader::new(tokio::io::stdin())).await?;
        }

        Command::Upload { path, template } => {
            let template = template.unwrap_or(config.default_template);
            let source = read_source(&path).await?;
            store
                .upload_source_document(&source, &template)
                .await
                .map_err(|err| anyhow::anyhow!(err.user_message()))?;

            let state = store.snapshot();
            if let Some(session) = &state.session {
                info!("Resume ID: {}", session.resume_id);
                eprintln!("✅ Parsed as resume {} ({})", session.resume_id, session.template_id);
            }
            print_document(&state.document)?;
        }

        Command::Fetch { resume_id } => {
            store
                .load_session(resume_id)
                .await
                .map_err(|err| anyhow::anyhow!(err.user_message()))?;
            print_document(&store.document())?;
        }

        Command::Summary {
            job_description,
            resume,
        } => {
            if let Some(path) = resume {
                store.load_document(read_document(&path).await?);
            }
            let summary = store
                .generate_summary(&job_description)
                .await
                .map_err(|err| anyhow::anyhow!(err.user_message()))?;
            println!("{}", summary);
        }

        Command::Health => match client.health().await {
            Ok(health) => {
                info!("Resume service at {} is {}", client.base_url(), health.status);
                println!("✅ {} ({})", client.base_url(), health.status);
            }
            Err(err) => {
                error!("Health check failed: {}", err);
                anyhow::bail!("❌ {} is not reachable: {}", client.base_url(), err);
            }
        },
    }

    Ok(())
}

async fn read_source(path: &Path) -> Result<SourceFile> {
    SourceFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn read_document(path: &Path) -> Result<ResumeDocument> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse resume JSON in {}", path.display()))
}

fn print_document(document: &ResumeDocument) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(document)?);
    Ok(())
}
