use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use scanlog_browser::ArtifactFileInfo;
use scanlog_reports::{export_report, ReportEntry, ReportSummary};
use serde_json::{json, Value};
use std::io::{self, Write};
use std::path::PathBuf;

mod browse;
mod config;
mod render;
mod viewer;

pub use config::ViewerConfig;
pub use viewer::Viewer;

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    print_stdout(&serde_json::to_string_pretty(value)?)
}

#[derive(Parser)]
#[command(name = "scanlog-viewer")]
#[command(about = "Browse scanlog reports and extracted artifacts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Results directory (overrides config and SCANLOG_RESULTS_DIR)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Config file (defaults to ./scanlog-viewer.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Emit a single JSON document on stdout (implies --quiet)
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List models with their execution counts
    Models,

    /// List the executions of a model, most recent first
    Executions(ModelArgs),

    /// Show the summary and tables of a report
    Summary(ExecutionArgs),

    /// Write a report as pretty-printed JSON
    Export(ExportArgs),

    /// List the extracted artifacts of an execution
    Artifacts(ExecutionArgs),

    /// Print a bounded view of an artifact
    View(ViewArgs),

    /// Save the full content of an artifact
    Download(DownloadArgs),

    /// Interactive artifact session reading commands from stdin
    Browse(ExecutionArgs),
}

#[derive(Args)]
struct ModelArgs {
    /// Model name (directory under the results root)
    model: String,
}

#[derive(Args)]
struct ExecutionArgs {
    /// Model name (directory under the results root)
    model: String,

    /// Execution id (defaults to the most recent)
    #[arg(long, short = 'e')]
    execution: Option<String>,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    target: ExecutionArgs,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// File name prefix (overrides export_prefix)
    #[arg(long)]
    prefix: Option<String>,
}

#[derive(Args)]
struct ViewArgs {
    /// Model name (directory under the results root)
    model: String,

    /// Artifact path relative to result/extracoes
    path: String,

    /// Execution id (defaults to the most recent)
    #[arg(long, short = 'e')]
    execution: Option<String>,

    /// Inline view budget in bytes (overrides view_limit_bytes)
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args)]
struct DownloadArgs {
    /// Model name (directory under the results root)
    model: String,

    /// Artifact path relative to result/extracoes
    path: String,

    /// Execution id (defaults to the most recent)
    #[arg(long, short = 'e')]
    execution: Option<String>,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

pub fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();
    if cli.json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = resolve_config(&cli)?;
    log::debug!("Results directory: {}", config.results_dir.display());
    let viewer = Viewer::new(config);
    let json_output = cli.json;

    match cli.command {
        Commands::Models => run_models(&viewer, json_output)?,
        Commands::Executions(args) => run_executions(&viewer, args, json_output)?,
        Commands::Summary(args) => run_summary(&viewer, args, json_output)?,
        Commands::Export(args) => run_export(&viewer, args, json_output)?,
        Commands::Artifacts(args) => run_artifacts(&viewer, args, json_output)?,
        Commands::View(args) => run_view(&viewer, args, json_output)?,
        Commands::Download(args) => run_download(&viewer, args, json_output)?,
        Commands::Browse(args) => run_browse(&viewer, args)?,
    }

    Ok(())
}

/// Defaults < config file < environment < flags.
fn resolve_config(cli: &Cli) -> Result<ViewerConfig> {
    let mut config = ViewerConfig::load(cli.config.as_deref())?;
    config.apply_env()?;
    if let Some(root) = &cli.root {
        config.results_dir = root.clone();
    }
    match &cli.command {
        Commands::View(args) => {
            if let Some(limit) = args.limit {
                config.view_limit_bytes = limit;
            }
        }
        Commands::Export(args) => {
            if let Some(prefix) = &args.prefix {
                config.export_prefix = prefix.clone();
            }
        }
        _ => {}
    }
    config.validate()?;
    Ok(config)
}

/// `None` when the results root holds no reports at all; that case is a
/// warning, not a failure.
fn select_entry(
    viewer: &Viewer,
    model: &str,
    execution: Option<&str>,
) -> Result<Option<ReportEntry>> {
    let catalog = viewer.catalog();
    if catalog.is_empty() {
        log::warn!("{}", viewer.no_reports_message());
        return Ok(None);
    }
    viewer.resolve_entry(&catalog, model, execution).map(Some)
}

fn run_models(viewer: &Viewer, json_output: bool) -> Result<()> {
    let catalog = viewer.catalog();
    if catalog.is_empty() {
        log::warn!("{}", viewer.no_reports_message());
    }
    if json_output {
        return print_json(&serde_json::to_value(catalog.as_map())?);
    }
    if !catalog.is_empty() {
        print_stdout(render::render_models(&catalog).trim_end())?;
    }
    Ok(())
}

fn run_executions(viewer: &Viewer, args: ModelArgs, json_output: bool) -> Result<()> {
    let catalog = viewer.catalog();
    if catalog.is_empty() {
        log::warn!("{}", viewer.no_reports_message());
        return if json_output {
            print_json(&json!([]))
        } else {
            Ok(())
        };
    }
    // Fails with the list of known models when `args.model` is unknown.
    viewer.resolve_entry(&catalog, &args.model, None)?;

    let entries = catalog.executions_by_recency(&args.model);
    if json_output {
        return print_json(&serde_json::to_value(&entries)?);
    }
    let ids: Vec<&str> = entries.iter().map(|e| e.execution_id.as_str()).collect();
    print_stdout(&ids.join("\n"))
}

fn run_summary(viewer: &Viewer, args: ExecutionArgs, json_output: bool) -> Result<()> {
    let Some(entry) = select_entry(viewer, &args.model, args.execution.as_deref())? else {
        return if json_output {
            print_json(&Value::Null)
        } else {
            Ok(())
        };
    };

    let doc = match viewer.cache().try_load(&entry.report_path) {
        Ok(doc) => doc,
        Err(err) => {
            eprintln!("Could not load report for {}: {err}", entry.key());
            return if json_output {
                print_json(&json!({ "entry": entry, "error": err.to_string() }))
            } else {
                print_stdout("No data.")
            };
        }
    };

    let summary = ReportSummary::from_document(&entry, &doc);
    if json_output {
        return print_json(&json!({ "summary": summary, "report": doc.as_ref() }));
    }
    print_stdout(render::render_summary(&summary, &doc).trim_end())
}

fn run_export(viewer: &Viewer, args: ExportArgs, json_output: bool) -> Result<()> {
    let target = args.target;
    let Some(entry) = select_entry(viewer, &target.model, target.execution.as_deref())? else {
        return if json_output {
            print_json(&Value::Null)
        } else {
            Ok(())
        };
    };

    let doc = viewer
        .cache()
        .try_load(&entry.report_path)
        .with_context(|| format!("Cannot export {}", entry.key()))?;
    let export = export_report(
        &doc,
        &viewer.config().export_prefix,
        &entry.model,
        &entry.execution_id,
    )?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Cannot create {}", args.out.display()))?;
    let target_path = args.out.join(&export.file_name);
    std::fs::write(&target_path, export.contents.as_bytes())
        .with_context(|| format!("Cannot write {}", target_path.display()))?;
    log::info!("Exported {} to {}", entry.key(), target_path.display());

    if json_output {
        return print_json(&json!({
            "file": target_path,
            "bytes": export.contents.len(),
        }));
    }
    print_stdout(&format!("Exported {}", target_path.display()))
}

fn run_artifacts(viewer: &Viewer, args: ExecutionArgs, json_output: bool) -> Result<()> {
    let Some(entry) = select_entry(viewer, &args.model, args.execution.as_deref())? else {
        return if json_output {
            print_json(&json!([]))
        } else {
            Ok(())
        };
    };

    let listing = viewer.browser().list_for_entry(&entry);
    for skipped in &listing.skipped {
        log::warn!("Skipped artifact entry: {}", skipped.reason);
    }

    if json_output {
        let files: Vec<Value> = listing.files.iter().map(artifact_json).collect();
        return print_json(&Value::Array(files));
    }
    if listing.is_empty() {
        return print_stdout("No files found in result/extracoes.");
    }
    print_stdout(render::render_artifacts(&listing).trim_end())
}

fn run_view(viewer: &Viewer, args: ViewArgs, json_output: bool) -> Result<()> {
    let Some(entry) = select_entry(viewer, &args.model, args.execution.as_deref())? else {
        return if json_output {
            print_json(&Value::Null)
        } else {
            Ok(())
        };
    };

    let file = viewer
        .browser()
        .find(&entry.extractions_dir(), &args.path)
        .with_context(|| format!("Artifact '{}' of {}", args.path, entry.key()))?;
    let view = viewer
        .browser()
        .open_for_view(&file, viewer.config().view_limit_bytes)
        .context("Could not open the selected file")?;

    if view.truncated {
        eprintln!(
            "Showing the first {} of {} bytes; use `download` for the full file.",
            view.shown_bytes, view.total_bytes
        );
    }
    if json_output {
        return print_json(&json!({ "file": artifact_json(&file), "view": view }));
    }
    print_stdout(&view.content)
}

fn run_download(viewer: &Viewer, args: DownloadArgs, json_output: bool) -> Result<()> {
    let Some(entry) = select_entry(viewer, &args.model, args.execution.as_deref())? else {
        return if json_output {
            print_json(&Value::Null)
        } else {
            Ok(())
        };
    };

    let file = viewer
        .browser()
        .find(&entry.extractions_dir(), &args.path)
        .with_context(|| format!("Artifact '{}' of {}", args.path, entry.key()))?;
    let (path, len) = browse::save_download(viewer, &file, &args.out)
        .context("Could not read the file for download")?;

    if json_output {
        return print_json(&json!({ "file": path, "bytes": len }));
    }
    print_stdout(&format!("Saved {} ({len} bytes)", path.display()))
}

fn run_browse(viewer: &Viewer, args: ExecutionArgs) -> Result<()> {
    let Some(entry) = select_entry(viewer, &args.model, args.execution.as_deref())? else {
        return Ok(());
    };
    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    browse::run_browse(viewer, &entry, stdin, &mut stdout)
}

fn artifact_json(file: &ArtifactFileInfo) -> Value {
    json!({
        "relative_path": file.relative_path,
        "size_bytes": file.size_bytes,
        "size_kb": file.size_kb,
        "modified_at": file.modified_display(),
        "absolute_path": file.absolute_path,
    })
}
