//! Subcommand handlers. Each returns the process exit code.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use super::commands::{AnalyzeArgs, ConfigArgs, InspectArgs, LimitArgs};
use super::output::OutputFormatter;
use crate::agent::parse_document;
use crate::analysis::roster::{build_roster, AgentDossier, DuplicatePolicy};
use crate::config::DossierConfig;
use crate::heuristics::ScoreLogger;
use crate::loader::{DocumentLoader, LoaderConfig};

pub fn handle_analyze(args: &AnalyzeArgs) -> i32 {
    info!("Starting roster analysis");
    exit_code(run_analyze(args))
}

pub fn handle_inspect(args: &InspectArgs) -> i32 {
    exit_code(run_inspect(args))
}

pub fn handle_config(args: &ConfigArgs) -> i32 {
    let formatter = OutputFormatter::new(args.format.into());
    exit_code(
        formatter
            .format_config(&DossierConfig::default())
            .map(|text| print!("{}", ensure_newline(text))),
    )
}

fn exit_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let config = effective_config(&args.limits)?;
    debug!("Effective configuration: {:?}", config);

    let loader = DocumentLoader::new(LoaderConfig::from(&config));
    let documents = loader.load(&args.path)?;

    let policy = DuplicatePolicy::from(args.duplicates);
    let roster = build_roster(&documents, policy)?;

    ScoreLogger::new(args.score_log.as_deref()).log_roster(&roster);

    let text = OutputFormatter::new(args.format.into()).format_roster(&roster)?;
    emit(text, args.output.as_deref())
}

fn run_inspect(args: &InspectArgs) -> Result<()> {
    let loader = DocumentLoader::new(LoaderConfig::from(&DossierConfig::default()));
    let document = loader
        .load(&args.file)?
        .into_iter()
        .next()
        .with_context(|| format!("No document loaded from {}", args.file.display()))?;

    let agent = AgentDossier::from_parsed(parse_document(&document));
    let text = OutputFormatter::new(args.format.into()).format_agent(&agent)?;
    emit(text, None)
}

/// Environment configuration with command-line limits applied on top.
fn effective_config(limits: &LimitArgs) -> Result<DossierConfig> {
    let mut config = DossierConfig::default();
    if let Some(size) = limits.max_file_size {
        config.max_file_size = size;
    }
    if let Some(files) = limits.max_files {
        config.max_files = files;
    }
    if let Some(depth) = limits.max_depth {
        config.max_depth = depth;
    }
    if !limits.extensions.is_empty() {
        config.set_value("extensions", &limits.extensions.join(","))?;
    }

    config
        .validate()
        .context("Invalid configuration; check DOSSIER_* environment variables and flags")?;
    Ok(config)
}

fn emit(text: String, output: Option<&Path>) -> Result<()> {
    let text = ensure_newline(text);
    match output {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Output written to {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn ensure_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
