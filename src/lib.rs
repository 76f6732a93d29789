//! Stemsplit - vocal/accompaniment separation and tempo/key analysis.
//!
//! The crate splits songs into vocal and accompaniment stems with an
//! external separator, re-encodes them as 64 kbit/s MP3, and estimates
//! tempo and key from the original recording.

#![warn(missing_docs)]

pub mod analysis;
pub mod audio;
pub mod cli;
pub mod config;
pub mod constants;
pub mod convert;
pub mod error;
pub mod locking;
pub mod output;
pub mod pipeline;
pub mod provision;
pub mod separate;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, GlobalArgs, ModelAction};
use config::{Config, active_config_path, load_default_config, save_default_config, validate_config};
use output::{ModelStatus, ResultType};
use pipeline::{Pipeline, ProcessOptions, collect_input_files};
use provision::SeparationModel;
use std::path::PathBuf;
use tracing::{info, warn};

pub use error::{Error, Result};

/// Main entry point for the stemsplit CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet);

    // Install Ctrl+C handler to clean up lock files on interrupt
    if let Err(e) = ctrlc::set_handler(|| {
        locking::cleanup_all_locks();
        std::process::exit(130); // 128 + SIGINT(2)
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    handle_command(cli.command, &cli.global)
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    // Logs go to stderr so JSON on stdout stays parseable.
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Configuration file merged with command-line overrides.
fn effective_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = load_default_config()?;
    if let Some(dir) = &global.model_dir {
        config.model.dir = Some(dir.clone());
    }
    if let Some(url) = &global.model_url {
        config.model.url = Some(url.clone());
    }
    validate_config(&config)?;
    Ok(config)
}

fn handle_command(command: Command, global: &GlobalArgs) -> Result<()> {
    match command {
        Command::Separate {
            input,
            output_dir,
            json,
        } => {
            let config = effective_config(global)?;
            let pipeline = Pipeline::from_config(&config)?;
            let stems = match output_dir {
                Some(output_root) => pipeline.separate_into(&input, &output_root)?,
                None => pipeline.separate(&input)?,
            };
            if json {
                println!("{}", output::render(ResultType::Separation, &stems)?);
            } else {
                println!("{}", output::format_stems(&stems));
            }
            Ok(())
        }
        Command::Analyze { input, json } => {
            let result = analysis::analyze(&input)?;
            if json {
                println!("{}", output::render(ResultType::Analysis, &result)?);
            } else {
                println!("{}", output::format_analysis(&result));
            }
            Ok(())
        }
        Command::Process {
            inputs,
            output_dir,
            fail_fast,
            json,
            no_progress,
        } => {
            let config = effective_config(global)?;
            handle_process(&config, &inputs, output_dir, fail_fast, json, !no_progress && !global.quiet)
        }
        Command::Model { action } => handle_model_command(action, &effective_config(global)?),
        Command::Config { action } => handle_config_command(action),
    }
}

fn handle_process(
    config: &Config,
    inputs: &[PathBuf],
    output_dir: Option<PathBuf>,
    fail_fast: bool,
    json: bool,
    progress: bool,
) -> Result<()> {
    let files = collect_input_files(inputs)?;
    if files.is_empty() {
        return Err(Error::NoInputFiles);
    }
    info!("Found {} audio file(s) to process", files.len());

    let pipeline = Pipeline::from_config(config)?;
    let options = ProcessOptions {
        output_root: output_dir.unwrap_or_else(|| pipeline.stems_dir().to_path_buf()),
        fail_fast,
        progress: progress && !json,
    };
    let summary = pipeline.process(&files, &options)?;

    if json {
        println!("{}", output::render(ResultType::Process, &summary)?);
    } else {
        println!("{}", output::format_summary(&summary));
    }

    if summary.failed > 0 {
        return Err(Error::ProcessFailed {
            failed: summary.failed,
            total: summary.files.len(),
        });
    }
    Ok(())
}

fn handle_model_command(action: ModelAction, config: &Config) -> Result<()> {
    let model = SeparationModel::from_config(&config.model)?;

    match action {
        ModelAction::Ensure => {
            model.ensure()?;
            println!("Model ready: {}", model.dir().display());
            Ok(())
        }
        ModelAction::Status { json } => {
            let status = ModelStatus {
                dir: model.dir().to_path_buf(),
                provisioned: model.is_provisioned(),
                url: model.url().map(str::to_string),
            };
            if json {
                println!("{}", output::render(ResultType::ModelStatus, &status)?);
            } else {
                println!("Model directory: {}", status.dir.display());
                println!(
                    "Provisioned: {}",
                    if status.provisioned { "yes" } else { "no" }
                );
                println!("Source: {}", status.url.as_deref().unwrap_or("(none)"));
            }
            Ok(())
        }
        ModelAction::Path => {
            println!("{}", model.dir().display());
            Ok(())
        }
    }
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = active_config_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let saved_path = save_default_config(&Config::default())?;
                println!("Created configuration file: {}", saved_path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            let text =
                toml::to_string_pretty(&config).map_err(|e| Error::ConfigSerialize { source: e })?;
            print!("{text}");
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", active_config_path()?.display());
            Ok(())
        }
    }
}
