//! CLI command definitions and subcommands

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::{BudgetTier, TravelStyle, TripStatus};

/// TripPlanner - itinerary generation pipeline
#[derive(Parser)]
#[command(
    name = "tp",
    about = "Generate day-by-day trip itineraries with a multi-stage LLM pipeline",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage trips
    Trip {
        #[command(subcommand)]
        command: TripCommand,
    },

    /// Run the generation pipeline for a trip
    Generate {
        /// Trip ID
        id: String,

        /// Caller credential (optionally prefixed with "Bearer ")
        #[arg(short, long, env = "TP_TOKEN", hide_env_values = true)]
        token: String,
    },
}

/// Trip management subcommands
#[derive(Debug, Subcommand)]
pub enum TripCommand {
    /// Create a draft trip
    Create {
        /// Owning user ID
        #[arg(short, long)]
        owner: String,

        /// Destination name
        #[arg(short, long)]
        destination: String,

        /// First day of the trip (YYYY-MM-DD)
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,

        /// Last day of the trip (YYYY-MM-DD)
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,

        /// Budget tier (low, medium, high)
        #[arg(short, long)]
        budget: BudgetTier,

        /// Travel style (adventure, relaxation, cultural, nightlife)
        #[arg(short, long)]
        style: TravelStyle,

        /// Number of travelers
        #[arg(short, long, default_value = "1")]
        group_size: u32,
    },

    /// Show a trip with its itinerary
    Show {
        /// Trip ID
        id: String,
    },

    /// List trips, most recently updated first
    List {
        /// Only trips owned by this user
        #[arg(short, long)]
        owner: Option<String>,

        /// Only trips in this status
        #[arg(short, long)]
        status: Option<TripStatus>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_trip_create() {
        let cli = Cli::try_parse_from([
            "tp",
            "trip",
            "create",
            "--owner",
            "alice",
            "--destination",
            "Paris",
            "--start",
            "2025-06-01",
            "--end",
            "2025-06-05",
            "--budget",
            "HIGH",
            "--style",
            "adventure",
            "--group-size",
            "2",
        ])
        .unwrap();

        match cli.command {
            Command::Trip {
                command:
                    TripCommand::Create {
                        budget,
                        style,
                        start,
                        group_size,
                        ..
                    },
            } => {
                assert_eq!(budget, BudgetTier::High);
                assert_eq!(style, TravelStyle::Adventure);
                assert_eq!(start, NaiveDate::from_ymd_opt(2025, 6, 1));
                assert_eq!(group_size, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_start_requires_end() {
        let result = Cli::try_parse_from([
            "tp",
            "trip",
            "create",
            "-o",
            "alice",
            "-d",
            "Paris",
            "--start",
            "2025-06-01",
            "-b",
            "low",
            "-s",
            "cultural",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_list_status() {
        let cli = Cli::try_parse_from(["tp", "trip", "list", "--status", "curating_activities"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Trip {
                command: TripCommand::List {
                    status: Some(TripStatus::CuratingActivities),
                    ..
                }
            }
        ));
        assert!(Cli::try_parse_from(["tp", "trip", "list", "--status", "failed"]).is_err());
    }

    #[test]
    fn test_generate_token_flag() {
        let cli = Cli::try_parse_from(["tp", "generate", "some-id", "--token", "tok-alice"]).unwrap();
        match cli.command {
            Command::Generate { id, token } => {
                assert_eq!(id, "some-id");
                assert_eq!(token, "tok-alice");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
