// File: crates/metafade-cli/src/main.rs

mod config;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use metafade_core::{
    AppState, Command, Event, FileInspector, ImageHandle, ItemBody, MediaFilter, MetadataEntry,
    MetadataRecord, PickMode, PickOutcome, PickRequest, Screen, ScrubOutcome, entries, inspect,
    render, scrub_all,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// A tool to view and remove privacy-sensitive EXIF metadata from images.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Read settings from this file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// View metadata for one or more images
    View {
        /// The paths to the images
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Also list every raw EXIF entry
        #[arg(short, long)]
        all: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Remove privacy-sensitive metadata from one or more images
    Scrub {
        /// The paths to the images
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write `name.clean.ext` next to each original instead of overwriting it
        #[arg(short, long)]
        keep_original: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Pick, inspect and scrub images interactively
    Session,
    /// Show the effective configuration
    Config {
        /// Write the default configuration if no file exists yet
        #[arg(long)]
        init: bool,
    },
}

fn setup_logging(verbose: u8) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Splits the command line paths into an image selection and the paths the
/// image filter rejects.
fn pick_from_args(files: Vec<PathBuf>) -> (AppState, Vec<PathBuf>) {
    let (images, rejected): (Vec<_>, Vec<_>) = files
        .into_iter()
        .map(ImageHandle::from)
        .partition(|handle| MediaFilter::ImageOnly.accepts(handle));

    let mut state = AppState::default();
    state.update(Event::PickerResolved(PickOutcome::from_handles(
        PickRequest::images(PickMode::Multiple),
        images,
    )));
    let rejected = rejected
        .into_iter()
        .map(|handle| handle.path().to_path_buf())
        .collect();
    (state, rejected)
}

fn report_rejected(rejected: &[PathBuf]) {
    for path in rejected {
        eprintln!("Skipping {}: not an image file.", path.display());
    }
}

#[derive(Serialize)]
struct ViewJson {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<MetadataRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<Vec<MetadataEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn view_one(path: &Path, all: bool) -> Result<ViewJson> {
    let handle = ImageHandle::new(path);
    let metadata = inspect(&handle)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let entries = if all {
        Some(entries(&handle).with_context(|| format!("Failed to read file: {}", path.display()))?)
    } else {
        None
    };
    Ok(ViewJson {
        path: path.to_path_buf(),
        metadata: Some(metadata),
        entries,
        error: None,
    })
}

fn run_view(files: Vec<PathBuf>, all: bool, json: bool) -> Result<usize> {
    let (mut state, rejected) = pick_from_args(files);
    report_rejected(&rejected);
    let mut failed = rejected.len();

    if json {
        let mut views = Vec::new();
        for item in state.items() {
            let path = item.handle.path();
            views.push(view_one(path, all).unwrap_or_else(|e| {
                failed += 1;
                ViewJson {
                    path: path.to_path_buf(),
                    metadata: None,
                    entries: None,
                    error: Some(format!("{e:#}")),
                }
            }));
        }
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(failed);
    }

    for index in 0..state.items().len() {
        state.update(Event::ToggleMetadata(index));
    }
    let Screen::Gallery { items } = render(&state, &FileInspector) else {
        return Ok(failed);
    };

    for item in &items {
        println!("{item}");
        if matches!(item.body, ItemBody::Unavailable { .. }) {
            failed += 1;
            continue;
        }
        if !all {
            continue;
        }
        let handle = &state.items()[item.index].handle;
        match entries(handle) {
            Ok(entries) if entries.is_empty() => {
                println!("No metadata found in {}.", handle.path().display());
            }
            Ok(entries) => {
                println!("Metadata for {}:", handle.path().display());
                for entry in entries {
                    println!("  - {}: {} = {}", entry.category, entry.key, entry.value);
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("Error: {e}");
            }
        }
    }
    Ok(failed)
}

#[derive(Serialize)]
struct ScrubJson {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<PathBuf>,
    metadata_removed: Vec<MetadataEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn run_scrub(files: Vec<PathBuf>, settings: &config::Config, json: bool) -> Result<usize> {
    let (mut state, rejected) = pick_from_args(files);
    report_rejected(&rejected);

    let Some(Command::Scrub(handles)) = state.update(Event::Proceed) else {
        return Ok(rejected.len());
    };
    let results = scrub_all(&handles, &settings.profile, settings.save_target());

    let mut lines = Vec::new();
    for (handle, result) in &results {
        let path = handle.path();
        match result {
            Ok(report) => {
                if !json {
                    if report.metadata_removed.is_empty() {
                        println!("No sensitive metadata found in {}.", path.display());
                    } else {
                        println!(
                            "Successfully removed {} metadata entries from {}.",
                            report.metadata_removed.len(),
                            path.display()
                        );
                    }
                    println!("Cleaned file saved to: {}", report.saved_to.display());
                }
                lines.push(ScrubJson {
                    path: path.to_path_buf(),
                    saved_to: Some(report.saved_to.clone()),
                    metadata_removed: report.metadata_removed.clone(),
                    error: None,
                });
            }
            Err(e) => {
                if !json {
                    eprintln!("Failed to scrub {}: {}", path.display(), e);
                }
                lines.push(ScrubJson {
                    path: path.to_path_buf(),
                    saved_to: None,
                    metadata_removed: Vec::new(),
                    error: Some(e.to_string()),
                });
            }
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
    }

    let outcomes = results
        .iter()
        .map(|(handle, result)| ScrubOutcome::from_result(handle.clone(), result))
        .collect();
    state.update(Event::ScrubFinished(outcomes));
    Ok(rejected.len() + state.items().len())
}

fn run_config(explicit: Option<&Path>, settings: &config::Config, init: bool) -> Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(config::default_config_path);

    if init {
        let path = path.context("No configuration directory on this platform")?;
        if path.exists() {
            println!("Configuration already exists at {}", path.display());
        } else {
            config::save_to_path(&config::Config::default(), &path)?;
            println!("Wrote default configuration to {}", path.display());
        }
        return Ok(());
    }

    if let Some(path) = &path {
        println!("# {}", path.display());
    }
    print!("{}", toml::to_string_pretty(settings).context("Failed to serialize config")?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut settings = match (&cli.command, config::load(cli.config.as_deref())) {
        // `config --init` must work even when the existing file is broken.
        (Commands::Config { init: true }, Err(e)) => {
            tracing::warn!("{e:#}");
            config::Config::default()
        }
        (_, loaded) => loaded?,
    };

    let failed = match cli.command {
        Commands::View { files, all, json } => run_view(files, all, json)?,
        Commands::Scrub {
            files,
            keep_original,
            json,
        } => {
            if keep_original {
                settings.in_place = false;
            }
            run_scrub(files, &settings, json)?
        }
        Commands::Session => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut console = session::Console::new(stdin, std::io::stdout());
            println!("{}", session::HELP);
            let summary = session::run(&mut console, &settings, &FileInspector).await?;
            tracing::info!(
                "Session finished: {} scrubbed, {} failed",
                summary.scrubbed,
                summary.failed
            );
            summary.failed
        }
        Commands::Config { init } => {
            run_config(cli.config.as_deref(), &settings, init)?;
            0
        }
    };

    if failed > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
