//! CLI argument definitions.

use crate::cli::validators::parse_model_url;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Split songs into vocal and accompaniment stems and detect tempo and key.
#[derive(Debug, Parser)]
#[command(name = "stemsplit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options accepted by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Separation model directory (overrides config).
    #[arg(long, global = true, env = "STEMSPLIT_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Model archive URL fetched when the model directory is empty; empty disables.
    #[arg(long, global = true, env = "STEMSPLIT_MODEL_URL", value_parser = parse_model_url)]
    pub model_url: Option<String>,

    /// Suppress informational output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split a file into vocals and accompaniment.
    Separate {
        /// Input audio file.
        input: PathBuf,
        /// Output root; stems land in <DIR>/<name>/<name>/.
        #[arg(short, long, env = "STEMS_DIR")]
        output_dir: Option<PathBuf>,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Detect tempo and key of a file.
    Analyze {
        /// Input audio file.
        input: PathBuf,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Separate and analyze files or directories.
    Process {
        /// Input files or directories.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output root for stems.
        #[arg(short, long, env = "STEMS_DIR")]
        output_dir: Option<PathBuf>,
        /// Stop at the first failure.
        #[arg(long)]
        fail_fast: bool,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
        /// Disable the progress bar.
        #[arg(long)]
        no_progress: bool,
    },
    /// Manage the separation model.
    Model {
        /// Model action to perform.
        #[command(subcommand)]
        action: ModelAction,
    },
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Model subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ModelAction {
    /// Download and unpack the model if the directory is empty.
    Ensure,
    /// Show whether the model is present.
    Status {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Print the model directory.
    Path,
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_separate() {
        let cli = Cli::try_parse_from(["stemsplit", "separate", "song.ogg", "-o", "out"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Separate { ref input, ref output_dir, json: false }
                if input == &PathBuf::from("song.ogg")
                    && output_dir.as_deref() == Some(std::path::Path::new("out"))
        ));
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["stemsplit", "analyze", "a.wav", "--json", "-vv"]).unwrap();
        assert_eq!(cli.global.verbose, 2);
        assert!(matches!(cli.command, Command::Analyze { json: true, .. }));
    }

    #[test]
    fn test_cli_process_requires_inputs() {
        assert!(Cli::try_parse_from(["stemsplit", "process"]).is_err());
        let cli = Cli::try_parse_from(["stemsplit", "process", "a.wav", "b.wav", "--fail-fast"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Process {
                fail_fast: true,
                ref inputs,
                ..
            } if inputs.len() == 2
        ));
    }

    #[test]
    fn test_cli_rejects_bad_model_url() {
        assert!(
            Cli::try_parse_from(["stemsplit", "model", "ensure", "--model-url", "ftp://x"])
                .is_err()
        );
    }

    #[test]
    fn test_cli_parse_config_subcommand() {
        let cli = Cli::try_parse_from(["stemsplit", "config", "show"]);
        assert!(cli.is_ok());
    }
}
