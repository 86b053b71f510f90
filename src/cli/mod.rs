//! Command-line interface for hebsafeharbor.
//!
//! Provides commands for de-identifying documents, inspecting the
//! span list of every identification stage, and showing the resolved
//! configuration.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config;
use crate::service::{DocsRequest, SafeHarborService};
use crate::signals::PreloadedModel;

/// hsh - Hebrew clinical text de-identification
#[derive(Parser, Debug)]
#[command(name = "hsh")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (overrides discovery)
    #[arg(long, global = true, env = "HSH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Identify and mask PHI in a batch of documents
    Run {
        /// Input JSON file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Pretty-print the response
        #[arg(long)]
        pretty: bool,
    },

    /// Print the span list of every identification stage
    Identify {
        /// Input JSON file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show resolved configuration
    Config {
        /// Print the full tables and lexicons as YAML
        #[arg(long)]
        full: bool,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = match &self.config {
            Some(path) => config::ResolvedConfig::from_path(path)?,
            None => config::config()?.clone(),
        };

        match self.command {
            Commands::Run { input, pretty } => run(cfg, input, pretty).await,
            Commands::Identify { input } => identify(cfg, input).await,
            Commands::Config { full } => show_config(&cfg, full),
        }
    }
}

/// Read the request body from a file or piped stdin
fn read_request(input_file: Option<PathBuf>) -> Result<DocsRequest> {
    let input = if let Some(path) = input_file {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        anyhow::bail!("No input provided. Use --input <file> or pipe to stdin");
    };

    if input.trim().is_empty() {
        anyhow::bail!("Input is empty");
    }

    serde_json::from_str(&input).context("Failed to parse request JSON")
}

/// Load a service whose statistical spans come with the request
async fn loaded_service(cfg: config::ResolvedConfig) -> Result<SafeHarborService> {
    let service = SafeHarborService::new(cfg, Arc::new(PreloadedModel::default()));
    service.load().await?;
    Ok(service)
}

async fn run(cfg: config::ResolvedConfig, input: Option<PathBuf>, pretty: bool) -> Result<()> {
    let request = read_request(input)?;
    let service = loaded_service(cfg).await?;

    let response = match service.query(request).await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("[{}] {}", e.status_code(), e);
            std::process::exit(1);
        }
    };

    let json = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", json);

    Ok(())
}

async fn identify(cfg: config::ResolvedConfig, input: Option<PathBuf>) -> Result<()> {
    let request = read_request(input)?;
    let service = loaded_service(cfg).await?;

    let docs = service
        .identify(request)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{}", serde_json::to_string_pretty(&docs)?);
    Ok(())
}

fn show_config(cfg: &config::ResolvedConfig, full: bool) -> Result<()> {
    if full {
        print!("{}", serde_yaml::to_string(cfg).context("Failed to render configuration")?);
        return Ok(());
    }

    println!("Hebrew Safe Harbor Configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Tables:");
    println!("  Entity types:          {}", cfg.tables.categories.len());
    println!("  Ignored types:         {}", join(&cfg.tables.ignored_types));
    println!("  Post-processed types:  {}", join(&cfg.tables.postprocessed_types));
    println!("  Statistical signals:   {}", join(&cfg.tables.statistical_recognizers));
    println!("  Split nested MIXED:    {}", cfg.tables.split_nested_mixed);
    println!();
    println!("Windows (chars):");
    println!("  Context:          {}", cfg.tables.windows.context);
    println!("  Medical context:  {}", cfg.tables.windows.medical_context);
    println!("  Healthcare title: {}", cfg.tables.windows.healthcare_title);
    println!("  Birth context:    {}", cfg.tables.windows.birth_context);
    println!();
    println!("Lexicons:");
    println!("  Cities:          {}", cfg.lexicons.cities.len());
    println!("  Large cities:    {}", cfg.lexicons.large_cities.len());
    println!("  Countries:       {}", cfg.lexicons.countries.len());
    println!("  Country regions: {}", cfg.lexicons.country_regions.len());
    println!("  Diseases:        {}", cfg.lexicons.diseases.len());
    println!("  Medications:     {}", cfg.lexicons.medications.len());
    println!("  Medical tests:   {}", cfg.lexicons.medical_tests.len());
    println!();
    println!("Limits:");
    println!("  Max text:  {} chars", cfg.limits.max_text_chars);
    println!("  Max docs:  {}", cfg.limits.max_docs);

    Ok(())
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
