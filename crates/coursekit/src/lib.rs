//! `coursekit` - three small, independent coursework programs
//!
//! - [`cipher`]: a two-key letter substitution cipher with exact, metadata
//!   driven decryption and a brute-force fallback.
//! - [`weather`]: seasonal averages, global range and station stability from
//!   monthly temperature CSV files.
//! - [`pattern`]: a Koch-curve polygon drawn with a turtle cursor and
//!   rendered to SVG.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cipher;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pattern;
pub mod weather;

pub use cipher::{CharClass, Shifts};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use pattern::{PatternLimits, PatternSpec, Pen, Turtle};
pub use weather::{Analysis, Analyzer};
