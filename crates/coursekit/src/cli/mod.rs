//! Command-line interface for coursekit.
//!
//! This module provides the CLI structure for the `ckit` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AnalyzeCommand, CipherCommand, CipherFileArgs, ConfigCommand, DrawCommand, PatternCommand,
    ShiftArgs, WeatherCommand,
};

use crate::cipher::CipherPaths;
use crate::config::CipherConfig;
use crate::logging::Verbosity;

/// ckit - three small coursework programs
///
/// A two-key letter cipher, a weather station CSV analysis and a recursive
/// Koch polygon renderer.
#[derive(Debug, Parser)]
#[command(name = "ckit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encrypt, decrypt and verify text files
    #[command(subcommand)]
    Cipher(CipherCommand),

    /// Analyze weather station temperatures
    #[command(subcommand)]
    Weather(WeatherCommand),

    /// Draw recursive polygon patterns
    #[command(subcommand)]
    Pattern(PatternCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

impl CipherFileArgs {
    /// Resolve file paths, preferring flags over configured values.
    #[must_use]
    pub fn resolve(&self, config: &CipherConfig) -> CipherPaths {
        let pick = |flag: &Option<PathBuf>, fallback: &PathBuf| {
            flag.clone().unwrap_or_else(|| fallback.clone())
        };
        CipherPaths {
            raw: pick(&self.raw, &config.raw_file),
            encrypted: pick(&self.encrypted, &config.encrypted_file),
            meta: pick(&self.meta, &config.meta_file),
            decrypted: pick(&self.decrypted, &config.decrypted_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "ckit");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(
            parse(&["ckit", "-q", "config", "path"]).verbosity(),
            Verbosity::Quiet
        );
        assert_eq!(
            parse(&["ckit", "config", "path"]).verbosity(),
            Verbosity::Normal
        );
        assert_eq!(
            parse(&["ckit", "-v", "config", "path"]).verbosity(),
            Verbosity::Verbose
        );
        assert_eq!(
            parse(&["ckit", "-vv", "config", "path"]).verbosity(),
            Verbosity::Trace
        );
    }

    #[test]
    fn test_parse_cipher_run_with_negative_shift() {
        let cli = parse(&["ckit", "cipher", "run", "--shift1", "-3", "--shift2", "7"]);
        match cli.command {
            Command::Cipher(CipherCommand::Run { shifts, .. }) => {
                assert_eq!(shifts.shift1, Some(-3));
                assert_eq!(shifts.shift2, Some(7));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_cipher_verify_files() {
        let cli = parse(&["ckit", "cipher", "verify", "--raw", "in.txt"]);
        match cli.command {
            Command::Cipher(CipherCommand::Verify { files }) => {
                assert_eq!(files.raw, Some(PathBuf::from("in.txt")));
                assert!(files.decrypted.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_weather_analyze() {
        let cli = parse(&["ckit", "weather", "analyze", "-d", "data", "--json"]);
        match cli.command {
            Command::Weather(WeatherCommand::Analyze(cmd)) => {
                assert_eq!(cmd.data_dir, Some(PathBuf::from("data")));
                assert!(cmd.out_dir.is_none());
                assert!(cmd.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_pattern_draw() {
        let cli = parse(&[
            "ckit", "pattern", "draw", "-s", "5", "-l", "120.5", "-d", "2", "-o", "out.svg",
        ]);
        match cli.command {
            Command::Pattern(PatternCommand::Draw(cmd)) => {
                assert_eq!(cmd.sides, Some(5));
                assert_eq!(cmd.side_length, Some(120.5));
                assert_eq!(cmd.depth, Some(2));
                assert_eq!(cmd.output, Some(PathBuf::from("out.svg")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["ckit", "-c", "/custom/config.toml", "config", "show"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_resolve_cipher_paths() {
        let files = CipherFileArgs {
            raw: Some(PathBuf::from("mine.txt")),
            ..CipherFileArgs::default()
        };
        let paths = files.resolve(&CipherConfig::default());

        assert_eq!(paths.raw, PathBuf::from("mine.txt"));
        assert_eq!(paths.encrypted, PathBuf::from("encrypted_text.txt"));
        assert_eq!(paths.meta, PathBuf::from("encrypted_text_meta.json"));
        assert_eq!(paths.decrypted, PathBuf::from("decrypted_text.txt"));
    }
}
