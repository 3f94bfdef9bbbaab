//! Command-line interface for CoVIC-DB submissions.
//!
//! This module provides the `covic` tool for:
//! - Writing blank or pre-filled submission templates
//! - Validating submissions, with a highlighted workbook on failure
//! - Expanding identifier columns with labels
//! - Converting tables to TSV or HTML
//! - Building a configuration from curator TSV files

use crate::api::{ConvertFormat, SubmissionService, read_path};
use crate::validator::References;
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use submission_core::configuration::SubmissionConfig;
use submission_core::response::Response;
use submission_core::table::read_tsv;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CoVIC-DB submission tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (JSON or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a blank submission template
    Template {
        /// Submission type
        kind: String,

        /// Output workbook
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write a submission template pre-filled from a table
    Fill {
        /// Submission type
        kind: String,

        /// Input table (.xlsx or .tsv)
        input: PathBuf,

        /// Output workbook
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Validate a submission
    Validate {
        /// Submission type
        kind: String,

        /// Input table (.xlsx or .tsv)
        input: PathBuf,

        /// Write the highlighted workbook here when validation fails
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reference set as NAME=FILE; the first column of the TSV file
        /// holds the valid values
        #[arg(long = "reference", value_name = "NAME=FILE", value_parser = parse_reference)]
        references: Vec<(String, PathBuf)>,
    },

    /// Add label columns for identifier columns
    Expand {
        /// Input table (.xlsx or .tsv)
        input: PathBuf,

        /// Output TSV file; stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a table to TSV or HTML
    Convert {
        /// Input table (.xlsx or .tsv)
        input: PathBuf,

        /// Output format (tsv or html)
        format: ConvertFormat,

        /// Output file; stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Build a configuration from TSV tables and schema files
    Build {
        /// Prefix table (prefix, base)
        #[arg(long)]
        prefixes: PathBuf,

        /// Label table (ID, LABEL)
        #[arg(long)]
        labels: PathBuf,

        /// Field table (field, label)
        #[arg(long)]
        fields: PathBuf,

        /// Schema files (YAML or JSON)
        #[arg(long = "schema", required = true)]
        schemas: Vec<PathBuf>,

        /// Output configuration file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_reference(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=FILE, got '{value}'")),
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins unless `verbose` is set.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run a parsed command line.
///
/// # Errors
///
/// Returns an error if configuration or input cannot be read, or if a
/// result cannot be written.
pub fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Commands::Template { kind, output } => {
            let service = SubmissionService::new(load_config(cli.config.as_deref())?);
            finish(&service.template(kind), Some(output))
        }
        Commands::Fill {
            kind,
            input,
            output,
        } => {
            let service = SubmissionService::new(load_config(cli.config.as_deref())?);
            let table = read_path(input, None)?;
            finish(&service.fill(kind, &table), Some(output))
        }
        Commands::Validate {
            kind,
            input,
            output,
            references,
        } => {
            let service = SubmissionService::new(load_config(cli.config.as_deref())?);
            let references = load_references(references)?;
            let response = service.validate_path(kind, input, &references);
            report(&response);
            if response.failed()
                && let Some(output) = output
                && response.content.is_some()
            {
                return finish(&response, Some(output));
            }
            Ok(exit_code(&response))
        }
        Commands::Expand { input, output } => {
            let service = SubmissionService::new(load_config(cli.config.as_deref())?);
            let table = read_path(input, None)?;
            let response = service.convert(
                response_table(&service.expand(&table))?,
                ConvertFormat::Tsv,
            );
            finish(&response, output.as_ref())
        }
        Commands::Convert {
            input,
            format,
            output,
        } => {
            let config = match cli.config.as_deref() {
                Some(path) => load_config(Some(path))?,
                None => SubmissionConfig::default(),
            };
            let table = read_path(input, None)?;
            let response = SubmissionService::new(config).convert(&table, *format);
            finish(&response, output.as_ref())
        }
        Commands::Config(ConfigCommand::Build {
            prefixes,
            labels,
            fields,
            schemas,
            output,
        }) => {
            let config =
                SubmissionConfig::build_from_tsv(prefixes, labels, fields, schemas.as_slice())?;
            config.save(output)?;
            println!(
                "{} {} ({} schemas)",
                "✓ Wrote".green().bold(),
                output.display(),
                config.schemas.len()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SubmissionConfig> {
    let Some(path) = path else {
        bail!("This command needs a configuration; pass --config <file>");
    };
    SubmissionConfig::from_path(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn load_references(sets: &[(String, PathBuf)]) -> anyhow::Result<References> {
    let mut references = References::new();
    for (name, path) in sets {
        let table = read_tsv(path)
            .with_context(|| format!("Failed to read reference set {}", path.display()))?;
        let values: Vec<String> = table
            .iter()
            .filter_map(|row| row.values().next().cloned())
            .collect();
        info!(set = %name, values = values.len(), "Loaded reference set");
        references.insert(name.clone(), name.clone(), values);
    }
    Ok(references)
}

fn response_table(response: &Response) -> anyhow::Result<&submission_core::table::Table> {
    match &response.table {
        Some(table) if response.succeeded() => Ok(table),
        _ => bail!("{}", response.message),
    }
}

fn report(response: &Response) {
    if response.succeeded() {
        println!("{}", "✓ Validation PASSED".green().bold());
        return;
    }
    println!("{}", "✗ Validation FAILED".red().bold());
    println!("  {}", response.message);
    for error in &response.errors {
        println!("  {} {error}", "ERROR".red());
    }
}

/// Write content to a file or stdout, or report a failed response
fn finish(response: &Response, output: Option<&PathBuf>) -> anyhow::Result<ExitCode> {
    if response.failed() && response.content.is_none() {
        eprintln!("{} {}", "Error:".red().bold(), response.message);
        return Ok(ExitCode::FAILURE);
    }
    let Some(content) = &response.content else {
        return Ok(exit_code(response));
    };
    match output {
        Some(path) => {
            std::fs::write(path, &content.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} {}", "✓ Wrote".green().bold(), path.display());
        }
        None => {
            let text = String::from_utf8_lossy(&content.bytes);
            print!("{text}");
        }
    }
    Ok(exit_code(response))
}

fn exit_code(response: &Response) -> ExitCode {
    if response.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
