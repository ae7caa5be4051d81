use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lsp_types::{DiagnosticSeverity, Position};
use tracing::{debug, info};

use yaml_lsp::lsp::{capabilities, Snapshot};
use yaml_lsp::{EngineConfig, YamlService};

#[derive(Parser)]
#[command(name = "yaml-lsp", about = "Validate YAML documents against required top-level keys.")]
struct Cli {
    /// Config file (defaults to .yaml-lsp/config.yaml, then built-in rules)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report diagnostics for files or glob patterns
    Check {
        #[arg(required = true)]
        paths: Vec<String>,
        /// Print one JSON publication per file
        #[arg(long)]
        json: bool,
    },
    /// List completion candidates for a file
    Complete {
        path: PathBuf,
        #[arg(long, default_value_t = 0)]
        line: u32,
        #[arg(long, default_value_t = 0)]
        character: u32,
        #[arg(long)]
        json: bool,
    },
    /// Print the capabilities a transport should advertise
    Capabilities,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yaml_lsp=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref()).context("loading config")?;
    info!(required_keys = config.required_keys.len(), "config resolved");
    let service = YamlService::new(config);

    match cli.command {
        Command::Check { paths, json } => check(&service, &paths, json).await,
        Command::Complete {
            path,
            line,
            character,
            json,
        } => {
            let text = read(&path).await?;
            let uri = path.display().to_string();
            let items = service.complete(&uri, &text, Position::new(line, character));
            if json {
                println!("{}", serde_json::to_string(&items)?);
            } else {
                for item in &items {
                    println!(
                        "{}\t{}",
                        item.insert_text.as_deref().unwrap_or(&item.label),
                        item.detail.as_deref().unwrap_or("")
                    );
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Capabilities => {
            println!("{}", serde_json::to_string_pretty(&capabilities())?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

/// Expand glob patterns; plain paths pass through untouched.
fn expand(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for pattern in patterns {
        if !pattern.contains(&['*', '?', '['][..]) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let matches = glob::glob(pattern).with_context(|| format!("bad pattern {pattern}"))?;
        for entry in matches {
            out.push(entry?);
        }
    }
    debug!(files = out.len(), "expanded inputs");
    Ok(out)
}

async fn check(service: &YamlService, patterns: &[String], json: bool) -> Result<ExitCode> {
    let mut errors = 0usize;
    for path in expand(patterns)? {
        let snapshot = Snapshot::new(path.display().to_string(), read(&path).await?);
        let publication = service.publish(&snapshot);

        if json {
            println!("{}", serde_json::to_string(&publication)?);
        }
        for diag in &publication.diagnostics {
            let severity = match diag.severity {
                Some(DiagnosticSeverity::WARNING) => "warning",
                _ => {
                    errors += 1;
                    "error"
                }
            };
            if !json {
                println!(
                    "{}:{}:{}: {severity}: {}",
                    publication.uri,
                    diag.range.start.line + 1,
                    diag.range.start.character + 1,
                    diag.message
                );
            }
        }
    }

    info!(errors, "check finished");
    Ok(if errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
