//! Command line definition

use anyhow::Result;
use clap::{Parser, Subcommand};
use daily_planner::config::PlannerConfig;
use daily_planner::fields::FieldName;
use daily_planner::observability::{self, LogFormat, ObservabilityConfig};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::commands::{
    EditCommand, QuoteCommand, ResetCommand, SendCommand, ServeCommand, SetCommand, ShowCommand,
};

/// Terminal daily planner
#[derive(Debug, Parser)]
#[command(name = "daily-planner")]
#[command(version)]
#[command(about = "Plan your day, then email yourself a snapshot", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to the standard locations)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Install the tracing subscriber
    ///
    /// The server logs at `info` in its usual format. Planner commands log
    /// compact warnings to stderr so they do not interleave with output.
    pub fn init_logging(&self) {
        let config = match self.command {
            Commands::Serve { .. } => ObservabilityConfig::default(),
            _ => ObservabilityConfig::default()
                .with_default_filter("warn")
                .with_format(LogFormat::Compact),
        };
        // a subscriber may already be installed when embedded
        let _ = observability::init_with(&config);
    }

    /// Load configuration from `--config` or the standard locations
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source cannot be parsed
    pub fn load_config(&self) -> Result<PlannerConfig> {
        match &self.config {
            Some(path) => PlannerConfig::load_from(path),
            None => PlannerConfig::load(),
        }
    }
}

/// Planner commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the image upload server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the planner
    Show {
        /// Print the stored fields as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set one planner field
    Set {
        /// Field name (name, email, date, priorities, todo, notes, quote)
        field: FieldName,

        /// New value
        value: String,
    },

    /// Edit every field interactively
    Edit,

    /// Print the quote of the day
    Quote {
        /// Discard the stored quote and fetch a new one
        #[arg(short, long)]
        refresh: bool,
    },

    /// Render the planner and email it
    Send {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Clear every field
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Commands {
    /// Run the command
    ///
    /// Returns `false` when the command ran but did not achieve its goal,
    /// for instance a failed send. The user has already been told why.
    ///
    /// # Errors
    ///
    /// Returns an error if the planner store cannot be opened or the
    /// server fails
    pub async fn execute(self, config: PlannerConfig) -> Result<bool> {
        match self {
            Self::Serve { host, port } => ServeCommand { host, port }.execute(config).await,
            Self::Show { json } => ShowCommand { json }.execute(config).await,
            Self::Set { field, value } => SetCommand { field, value }.execute(config),
            Self::Edit => EditCommand.execute(config).await,
            Self::Quote { refresh } => QuoteCommand { refresh }.execute(config).await,
            Self::Send { yes } => SendCommand { yes }.execute(config).await,
            Self::Reset { yes } => ResetCommand { yes }.execute(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_set() {
        let cli = Cli::try_parse_from(["daily-planner", "set", "todo", "buy milk"]).unwrap();
        match cli.command {
            Commands::Set { field, value } => {
                assert_eq!(field, FieldName::Todo);
                assert_eq!(value, "buy milk");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(Cli::try_parse_from(["daily-planner", "set", "mood", "great"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["daily-planner", "send", "--yes", "--config", "planner.toml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("planner.toml")));
        assert!(matches!(cli.command, Commands::Send { yes: true }));
    }
}
