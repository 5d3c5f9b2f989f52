//! Command-line interface definitions and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Answers five business questions over a retail products/sales dataset
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for salescope.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for the generated artifacts
    #[arg(short, long, global = true, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Compute all five questions and write their artifacts
    Run {
        /// Products catalog CSV
        #[arg(long, value_name = "FILE")]
        products: Option<PathBuf>,

        /// Sales CSV
        #[arg(long, value_name = "FILE")]
        sales: Option<PathBuf>,
    },

    /// Render charts and text panels from previously written artifacts
    Render,

    /// Write a default salescope.toml in the current directory
    InitConfig,
}

impl Args {
    /// Log level derived from the verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_overrides() {
        let args = Args::parse_from([
            "salescope",
            "run",
            "--products",
            "p.csv",
            "--sales",
            "s.csv",
            "-o",
            "out",
        ]);

        assert_eq!(
            args.command,
            Command::Run {
                products: Some(PathBuf::from("p.csv")),
                sales: Some(PathBuf::from("s.csv")),
            }
        );
        assert_eq!(args.output, Some(PathBuf::from("out")));
        assert_eq!(args.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_level_flags() {
        let args = Args::parse_from(["salescope", "-v", "render"]);
        assert_eq!(args.command, Command::Render);
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        let args = Args::parse_from(["salescope", "render", "--quiet"]);
        assert_eq!(args.log_level(), tracing::Level::ERROR);

        assert!(Args::try_parse_from(["salescope", "render", "-q", "-v"]).is_err());
    }
}
