use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// Import from docintake-core
use docintake_core::{DocumentIngestor, IngestConfig, IngestError};

#[derive(Parser)]
#[command(name = "docintake")]
#[command(about = "Ingest documents into uniform JSON with request form table reconstruction")]
struct Args {
    /// Documents to ingest (relative paths resolve against the workspace root)
    paths: Vec<String>,

    /// Type hint applied to every positional path (text, pdf, docx, doc, spreadsheet)
    #[arg(short = 't', long = "type")]
    type_hint: Option<String>,

    /// JSON file holding an array of descriptors (path strings or {path, label, type})
    #[arg(short, long)]
    manifest: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Root for relative paths (overrides config and DOCINTAKE_WORKSPACE_ROOT)
    #[arg(long)]
    workspace_root: Option<PathBuf>,

    /// Maximum preview length in characters
    #[arg(long)]
    preview_limit: Option<usize>,

    /// Rows kept per extracted table
    #[arg(long)]
    table_sample_rows: Option<usize>,

    /// Write the JSON result here instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Print the effective config as YAML and exit
    #[arg(long)]
    show_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = effective_config(&args);

    if args.show_config {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let request = build_request(&args)?;
    let ingestor = DocumentIngestor::new(config);

    match ingestor.ingest_json(&request) {
        Ok(result) => {
            let rendered = serde_json::to_string_pretty(&result)?;
            match &args.output {
                Some(path) => {
                    std::fs::write(path, rendered)
                        .with_context(|| format!("failed to write {path}"))?;
                    eprintln!(
                        "✅ {} document(s), {} warning(s) written to {}",
                        result.documents.len(),
                        result.warnings.len(),
                        path
                    );
                }
                None => println!("{rendered}"),
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {e}");
            for warning in e.warnings() {
                eprintln!("   {}: {}", warning.message, warning.detail);
            }
            std::process::exit(exit_code(&e));
        }
    }
}

fn effective_config(args: &Args) -> IngestConfig {
    let mut config = IngestConfig::load_with_fallback(args.config.as_deref());

    // Apply CLI overrides to config
    if let Some(root) = &args.workspace_root {
        config.workspace_root = Some(root.clone());
    }
    if let Some(limit) = args.preview_limit {
        config.preview_limit = limit;
    }
    if let Some(rows) = args.table_sample_rows {
        config.table_sample_rows = rows;
    }
    config
}

/// Manifest entries first, then positional paths.
fn build_request(args: &Args) -> Result<Value> {
    let mut entries = Vec::new();

    if let Some(manifest) = &args.manifest {
        let content = std::fs::read_to_string(manifest)
            .with_context(|| format!("failed to read manifest {manifest}"))?;
        let parsed: Value = serde_json::from_str(&content)
            .with_context(|| format!("manifest {manifest} is not valid JSON"))?;
        match parsed {
            Value::Array(items) => entries.extend(items),
            _ => bail!("manifest {manifest} must contain a JSON array of descriptors"),
        }
    }

    entries.extend(args.paths.iter().map(|path| match &args.type_hint {
        Some(hint) => json!({ "path": path, "type": hint }),
        None => Value::String(path.clone()),
    }));

    Ok(Value::Array(entries))
}

fn exit_code(error: &IngestError) -> i32 {
    match error {
        IngestError::EmptyInput => 2,
        IngestError::NoReadableDocuments { .. } => 1,
    }
}
