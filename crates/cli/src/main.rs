// presetlab CLI - headless preset apply/revert and ingestion

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use serde_json::{json, Value};

use presetlab_config::{ConfigError, PresetConfig};
use presetlab_engine::model::set_path;
use presetlab_engine::{
    EngineError, EventCollector, NamespaceStore, PartialSettings, PresetCatalog, PresetController,
};
use presetlab_io::{ArchiveIngestor, IngestError, TabularIngestor};

use exit_codes::{EXIT_ERROR, EXIT_INGEST_REJECTED, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "presetlab")]
#[command(about = "Apply, revert and ingest feature presets (headless)")]
#[command(version)]
struct Cli {
    /// Config file (TOML). Defaults to the user config directory.
    #[arg(long, global = true, env = "PRESETLAB_CONFIG")]
    config: Option<PathBuf>,

    /// JSON catalog of static preset definitions
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// CSV files whose rows are appended to the catalog (repeatable)
    #[arg(long = "csv", global = true, value_name = "FILE")]
    csv: Vec<PathBuf>,

    /// More logging (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List presets in the catalog
    List,

    /// Apply a preset onto baseline settings and print the resulting state
    #[command(after_help = "\
Examples:
  presetlab --catalog presets.json apply Glow
  presetlab --csv looks.csv apply Glow --edit skin.softening.strength=0.5 --reset")]
    Apply {
        /// Preset name (first match in the catalog)
        name: String,

        /// Simulate a user edit after applying (repeatable)
        #[arg(long = "edit", value_name = "NS.PATH=VALUE")]
        edits: Vec<String>,

        /// Revert the preset after applying (and after edits)
        #[arg(long)]
        reset: bool,
    },

    /// Ingest a CSV of presets and print them as JSON
    Ingest {
        file: PathBuf,

        /// Exit non-zero if any row was rejected
        #[arg(long)]
        strict: bool,
    },

    /// List the entries of a zip archive
    Archive {
        file: PathBuf,

        /// Only list image entries
        #[arg(long)]
        images: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::List => cmd_list(&cli),
        Commands::Apply { name, edits, reset } => cmd_apply(&cli, name, edits, *reset),
        Commands::Ingest { file, strict } => cmd_ingest(&cli, file, *strict),
        Commands::Archive { file, images } => cmd_archive(&cli, file, *images),
        Commands::Config => cmd_config(&cli),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io { .. } => CliError::io(err.to_string()),
            _ => CliError::parse(err.to_string()),
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownPreset(_) => CliError::args(err.to_string())
                .with_hint("run `presetlab list` to see available presets"),
            EngineError::UnknownNamespace(_) => CliError::args(err.to_string()),
            _ => CliError::parse(err.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Context loading
// ---------------------------------------------------------------------------

fn load_config(cli: &Cli) -> Result<PresetConfig, CliError> {
    match &cli.config {
        Some(path) => Ok(PresetConfig::load_from(path)?),
        None => Ok(PresetConfig::load()),
    }
}

fn load_catalog(cli: &Cli, config: &PresetConfig) -> Result<PresetCatalog, CliError> {
    let mut catalog = match &cli.catalog {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;
            PresetCatalog::from_json(&text)?
        }
        None => PresetCatalog::new(),
    };

    let ingestor = TabularIngestor::from_config(config);
    for path in &cli.csv {
        smol::block_on(ingestor.ingest_path(path, &mut catalog, report_warning));
    }
    Ok(catalog)
}

fn build_store(config: &PresetConfig) -> Result<NamespaceStore, CliError> {
    Ok(NamespaceStore::from_baselines(config.baselines())?)
}

fn report_warning(err: IngestError) {
    eprintln!("warning: {err}");
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CliError::general(e.to_string()))?;
    println!("{text}");
    Ok(())
}

/// `skin.softening.strength=0.5` -> ("skin", {"softening": {"strength": 0.5}}).
/// The value is read as JSON when it parses, else as a plain string.
fn parse_edit(edit: &str) -> Result<(String, PartialSettings), CliError> {
    let (target, raw) = edit
        .split_once('=')
        .ok_or_else(|| CliError::args(format!("edit '{edit}' must look like NS.PATH=VALUE")))?;
    let (namespace, path) = target
        .split_once('.')
        .filter(|(ns, path)| !ns.is_empty() && !path.is_empty())
        .ok_or_else(|| CliError::args(format!("edit '{edit}' needs a namespace and a path")))?;

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    let mut partial = PartialSettings::new();
    set_path(&mut partial, path, value);
    Ok((namespace.to_string(), partial))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_list(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let catalog = load_catalog(cli, &config)?;
    let value = serde_json::to_value(&catalog).map_err(|e| CliError::general(e.to_string()))?;
    print_json(&value)
}

fn cmd_apply(cli: &Cli, name: &str, edits: &[String], reset: bool) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let catalog = load_catalog(cli, &config)?;
    let mut store = build_store(&config)?;

    // Validate edits before touching state
    let edits = edits.iter().map(|e| parse_edit(e)).collect::<Result<Vec<_>, _>>()?;

    let events = EventCollector::new();
    let mut controller = PresetController::new();
    controller.subscribe(events.callback());

    controller.apply_by_name(&mut store, &catalog, name)?;

    for (namespace, partial) in &edits {
        store.update(namespace, partial)?;
    }

    let report = if reset { Some(controller.reset_active(&mut store)) } else { None };

    let active = serde_json::to_value(controller.active())
        .map_err(|e| CliError::general(e.to_string()))?;
    let mut output = json!({
        "preset": name,
        "active": active,
        "events": events.len(),
        "state": Value::Object(store.snapshot()),
    });
    if let Some(report) = report {
        output["reverted"] = json!(report.reverted);
        output["preserved"] = json!(report.preserved);
    }
    print_json(&output)
}

fn cmd_ingest(cli: &Cli, file: &Path, strict: bool) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let ingestor = TabularIngestor::from_config(&config);

    let mut catalog = PresetCatalog::new();
    let mut rejected = 0usize;
    smol::block_on(ingestor.ingest_path(file, &mut catalog, |e| {
        rejected += 1;
        report_warning(e);
    }));

    let value = serde_json::to_value(&catalog).map_err(|e| CliError::general(e.to_string()))?;
    print_json(&value)?;

    if strict && rejected > 0 {
        return Err(CliError {
            code: EXIT_INGEST_REJECTED,
            message: format!("{rejected} row(s) rejected"),
            hint: None,
        });
    }
    Ok(())
}

fn cmd_archive(cli: &Cli, file: &Path, images: bool) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let mut ingestor = ArchiveIngestor::with_image_extensions(config.ingest.image_extensions.clone());

    let mut failure = None;
    let loaded = smol::block_on(ingestor.load_path(file, |e| failure = Some(e.to_string())));
    if !loaded {
        return Err(CliError::io(failure.unwrap_or_else(|| "archive load failed".to_string())));
    }

    let entries: Vec<&str> = if images {
        ingestor.images()
    } else {
        ingestor.entries().iter().map(String::as_str).collect()
    };
    print_json(&json!(entries))
}

fn cmd_config(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
