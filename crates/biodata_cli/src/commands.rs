//! Command-line surface.

use biodata_core::MeasurementKind;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "biodata")]
#[command(about = "Record biometric measurements and print their JSON snapshot.")]
pub struct CommandLine {
    /// Log level (trace|debug|info|warn|error); falls back to BIODATA_LOG
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// Absolute directory for rotated log files instead of stderr
    #[arg(long, global = true)]
    pub log_dir: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate one measurement and print the resulting entity
    #[command(alias = "r")]
    Record {
        /// Measurement kind, e.g. HeartRate, Weight, ABOBloodType
        kind: MeasurementKind,
        /// Measured value; omit for an unmeasured sample of a nullable kind
        #[arg(allow_hyphen_values = true)]
        value: Option<String>,
        /// Unit label, compared case-sensitively
        unit: Option<String>,
        /// Start of the measured window, Unix epoch seconds
        #[arg(long)]
        start: Option<String>,
        /// End of the measured window, Unix epoch seconds
        #[arg(long)]
        finish: Option<String>,
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// List supported kinds with their allowed units and values
    #[command(alias = "k")]
    Kinds,
    /// Print the core crate version
    Version,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
