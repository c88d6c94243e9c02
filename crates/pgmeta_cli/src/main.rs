//! pgmeta CLI
//!
//! Inspect PostgreSQL control files and WAL segment headers without a
//! running server.
//!
//! # Commands
//!
//! - `control` - Decode `pg_control` from a file or data directory
//! - `wal` - Decode the first page header of a WAL segment
//! - `check` - Check that a WAL segment belongs to a cluster
//! - `versions` - List supported PostgreSQL releases
//! - `lsn` - Name the WAL segment holding an LSN

mod commands;

use clap::{Parser, Subcommand};
use pgmeta_core::{Lsn, PgVersion, WAL_SEGMENT_SIZE_DEFAULT};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// PostgreSQL control file and WAL header inspector.
#[derive(Parser)]
#[command(name = "pgmeta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(global = true, short, long, default_value = "text")]
    format: String,

    /// Decode as this PostgreSQL release instead of detecting it (e.g. 9.6, 17)
    #[arg(global = true, long)]
    pg_version: Option<PgVersion>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode pg_control
    Control {
        /// Path to pg_control or a data directory
        path: PathBuf,
    },

    /// Decode the first page header of a WAL segment
    Wal {
        /// Path to the WAL segment
        path: PathBuf,
    },

    /// Check that a WAL segment belongs to a cluster
    Check {
        /// Data directory
        pgdata: PathBuf,

        /// WAL segment path, or a segment name inside the WAL directory
        segment: PathBuf,
    },

    /// List supported PostgreSQL releases
    Versions,

    /// Name the WAL segment holding an LSN
    Lsn {
        /// LSN in X/X form
        lsn: Lsn,

        /// Timeline
        #[arg(short, long, default_value = "1")]
        timeline: u32,

        /// WAL segment size in bytes
        #[arg(short, long, default_value_t = WAL_SEGMENT_SIZE_DEFAULT)]
        segment_size: u32,
    },
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let format = cli.format.as_str();
    match cli.command {
        Commands::Control { path } => commands::control::run(&path, cli.pg_version, format),
        Commands::Wal { path } => commands::wal::run(&path, cli.pg_version, format),
        Commands::Check { pgdata, segment } => {
            commands::check::run(&pgdata, &segment, cli.pg_version, format)
        }
        Commands::Versions => commands::versions::run(format),
        Commands::Lsn {
            lsn,
            timeline,
            segment_size,
        } => commands::lsn::run(lsn, timeline, segment_size, format),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pgmeta: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pgmeta",
            "control",
            "/data",
            "--pg-version",
            "9.6",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.pg_version, Some(PgVersion::V96));
        assert_eq!(cli.format, "json");
        assert!(matches!(cli.command, Commands::Control { .. }));
    }

    #[test]
    fn rejects_bad_version() {
        assert!(Cli::try_parse_from(["pgmeta", "--pg-version", "nine", "versions"]).is_err());
    }

    #[test]
    fn lsn_defaults() {
        let cli = Cli::try_parse_from(["pgmeta", "lsn", "0/16B3748"]).unwrap();
        match cli.command {
            Commands::Lsn {
                lsn,
                timeline,
                segment_size,
            } => {
                assert_eq!(lsn, Lsn::new(0x016B_3748));
                assert_eq!(timeline, 1);
                assert_eq!(segment_size, WAL_SEGMENT_SIZE_DEFAULT);
            }
            _ => panic!("expected lsn command"),
        }
    }
}
