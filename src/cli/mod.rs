pub mod generate;
pub mod init;
pub mod interactive;
pub mod parties;
pub mod status;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::error::{Result, SlipError};
use crate::pipeline::Warnings;
use crate::settings::{load_settings, Settings};

pub(crate) fn parse_date_arg(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| SlipError::InvalidDate(raw.trim().to_string()))
}

/// Settings file, then environment, then command-line flags.
pub(crate) fn resolve_settings(cli: &Cli) -> Settings {
    let mut settings = load_settings();
    settings.apply_env(|key| std::env::var(key).ok());
    if let Some(p) = &cli.dockets {
        settings.dockets_path = p.clone();
    }
    if let Some(p) = &cli.parties {
        settings.parties_path = p.clone();
    }
    if let Some(e) = &cli.encoding {
        settings.encoding = e.clone();
    }
    if let Some(l) = &cli.logo {
        settings.logo_path = Some(l.clone());
    }
    settings
}

pub(crate) fn print_warnings(warnings: &Warnings) {
    if warnings.is_clean() {
        return;
    }
    if warnings.malformed_rows > 0 {
        println!(
            "{}",
            format!("Skipped {} malformed rows.", warnings.malformed_rows).yellow()
        );
    }
    if warnings.invalid_dates > 0 {
        println!(
            "{}",
            format!("Skipped {} dockets with unreadable dates.", warnings.invalid_dates).yellow()
        );
    }
}

/// Write the finished PDF; nothing touches disk until rendering succeeded.
pub(crate) fn write_pdf(bytes: &[u8], path: &PathBuf) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[derive(Parser)]
#[command(
    name = "slipgen",
    version,
    about = "Print courier receipt slips from legacy docket and party tables."
)]
pub struct Cli {
    /// Docket table (default: DLCHLN.DBF, or $DLCHLN_PATH)
    #[arg(long, global = true)]
    pub dockets: Option<String>,
    /// Party master table (default: PRTMST.DBF, or $PRTMST_PATH)
    #[arg(long, global = true)]
    pub parties: Option<String>,
    /// Text encoding of the tables, e.g. windows-1252, latin1, utf-8
    #[arg(long, global = true)]
    pub encoding: Option<String>,
    /// Logo image printed on each slip (PNG or JPEG)
    #[arg(long, global = true)]
    pub logo: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a PDF of receipt slips for a date range.
    Generate {
        /// Start date: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: String,
        /// End date: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: String,
        /// Party code (default: all parties)
        #[arg(long)]
        party: Option<String>,
        /// Output file path (default: <output dir>/<generated name>)
        #[arg(long, conflicts_with = "output_dir")]
        output: Option<String>,
        /// Directory for the generated file
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
        /// List the matching dockets without writing a PDF
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// List parties available for selection.
    Parties,
    /// Show configuration and check both tables can be read.
    Status,
    /// Prompt for dates and party, then generate.
    Interactive {
        /// Directory for the generated file
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
    },
    /// Save the current configuration (including overrides) as the defaults.
    Init,
}
