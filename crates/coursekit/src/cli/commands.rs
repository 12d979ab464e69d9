//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Keys shared by every cipher subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct ShiftArgs {
    /// First key (overrides `cipher.shift1`)
    #[arg(long, allow_negative_numbers = true)]
    pub shift1: Option<i64>,

    /// Second key (overrides `cipher.shift2`)
    #[arg(long, allow_negative_numbers = true)]
    pub shift2: Option<i64>,
}

/// File locations shared by every cipher subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct CipherFileArgs {
    /// Plaintext input
    #[arg(long, value_name = "FILE")]
    pub raw: Option<PathBuf>,

    /// Ciphertext file
    #[arg(long, value_name = "FILE")]
    pub encrypted: Option<PathBuf>,

    /// Class metadata file
    #[arg(long, value_name = "FILE")]
    pub meta: Option<PathBuf>,

    /// Decrypted output
    #[arg(long, value_name = "FILE")]
    pub decrypted: Option<PathBuf>,
}

/// Cipher commands.
#[derive(Debug, Subcommand)]
pub enum CipherCommand {
    /// Encrypt the plaintext file and write class metadata
    Encrypt {
        #[command(flatten)]
        shifts: ShiftArgs,
        #[command(flatten)]
        files: CipherFileArgs,
    },

    /// Decrypt the ciphertext, using metadata when available
    Decrypt {
        #[command(flatten)]
        shifts: ShiftArgs,
        #[command(flatten)]
        files: CipherFileArgs,
    },

    /// Compare the decrypted output with the original plaintext
    Verify {
        #[command(flatten)]
        files: CipherFileArgs,
    },

    /// Encrypt, decrypt and verify in one go
    Run {
        #[command(flatten)]
        shifts: ShiftArgs,
        #[command(flatten)]
        files: CipherFileArgs,
    },
}

/// Weather commands.
#[derive(Debug, Subcommand)]
pub enum WeatherCommand {
    /// Analyze every CSV file in the data folder
    Analyze(AnalyzeCommand),
}

/// Weather analyze arguments.
#[derive(Debug, Args)]
pub struct AnalyzeCommand {
    /// Folder holding the station CSV files
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Folder to write the reports to
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Also print the full analysis as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Pattern commands.
#[derive(Debug, Subcommand)]
pub enum PatternCommand {
    /// Draw a Koch polygon to an SVG file
    Draw(DrawCommand),
}

/// Pattern draw arguments.
#[derive(Debug, Args)]
pub struct DrawCommand {
    /// Number of polygon sides (at least 3)
    #[arg(short, long)]
    pub sides: Option<u32>,

    /// Side length in canvas units
    #[arg(short = 'l', long)]
    pub side_length: Option<f64>,

    /// Recursion depth
    #[arg(short, long)]
    pub depth: Option<u32>,

    /// SVG output path
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to config file (uses default if not specified)
        file: Option<PathBuf>,
    },
}
