//! TripPlanner - itinerary generation pipeline
//!
//! CLI entry point for creating trips and running generation.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info};

use tripplanner::auth::StaticAuthenticator;
use tripplanner::cli::{Cli, Command, TripCommand};
use tripplanner::config::Config;
use tripplanner::domain::{ItineraryDocument, Trip, TripId, TripRequest, TripStatus, UserId};
use tripplanner::llm::create_client;
use tripplanner::pipeline::{Pipeline, PipelineError, PipelineSettings};
use tripplanner::prompts::PromptLoader;
use tripplanner::state::{StateEvent, StateManager};
use tripplanner::travel::create_travel_client;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Logging isn't initialized yet, so nothing here can trace
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripplanner")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("tp.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Trip { command } => cmd_trip(&config, command).await,
        Command::Generate { id, token } => cmd_generate(&config, &id, &token).await,
    }
}

fn spawn_state(config: &Config) -> Result<StateManager> {
    let store_path = PathBuf::from(&config.storage.store_dir);
    debug!(?store_path, "spawn_state: called");
    StateManager::spawn(&store_path).context(format!("Failed to open trip store at {}", store_path.display()))
}

async fn cmd_trip(config: &Config, command: TripCommand) -> Result<()> {
    debug!(?command, "cmd_trip: called");
    let state = spawn_state(config)?;

    match command {
        TripCommand::Create {
            owner,
            destination,
            start,
            end,
            budget,
            style,
            group_size,
        } => {
            let request = TripRequest {
                destination,
                start_date: start,
                end_date: end,
                budget_tier: budget,
                travel_style: style,
                group_size,
            };
            let trip = Trip::new(&UserId::new(owner), request).context("Invalid trip request")?;
            let id = state.create_trip(trip).await?;
            println!("{} {}", "Created trip".green(), id.bold());
        }
        TripCommand::Show { id } => {
            let id = TripId::parse(&id)?.to_string();
            match state.get_trip(&id).await? {
                Some(trip) => print_trip(&trip),
                None => eyre::bail!("Trip not found: {}", id),
            }
        }
        TripCommand::List { owner, status } => {
            let trips = state.list_trips(owner, status).await?;
            if trips.is_empty() {
                println!("No trips found");
            } else {
                println!("{:<38} {:<24} {:<8} {:<12} {}", "ID", "STATUS", "BUDGET", "STYLE", "DESTINATION");
                println!("{}", "-".repeat(96));
                for trip in trips {
                    println!(
                        "{:<38} {:<24} {:<8} {:<12} {}",
                        trip.id,
                        colored_status(trip.status),
                        trip.budget_tier,
                        trip.travel_style,
                        trip.destination
                    );
                }
            }
        }
    }

    Ok(())
}

async fn cmd_generate(config: &Config, id: &str, token: &str) -> Result<()> {
    debug!(%id, "cmd_generate: called");
    config.validate()?;

    let state = spawn_state(config)?;
    let llm = create_client(&config.llm)?;
    let travel = create_travel_client(&config.travel);
    let auth = Arc::new(StaticAuthenticator::from_config(&config.auth));
    let prompts = PromptLoader::new(config.pipeline.prompts_dir.as_ref());
    let pipeline = Pipeline::new(
        llm,
        travel,
        state.clone(),
        auth,
        prompts,
        PipelineSettings::from_config(config),
    );

    let events = state.subscribe_events();
    let (done_tx, done_rx) = oneshot::channel();
    let printer = tokio::spawn(print_events(events, done_rx));

    let result = pipeline.generate(id, token).await;
    let _ = done_tx.send(());
    let _ = printer.await;

    match result {
        Ok(trip) => {
            println!();
            print_trip(&trip);
            Ok(())
        }
        Err(e) => {
            eprintln!("\n{} {}", "✗ Generation failed:".red().bold(), e);
            if let Some(retry_after) = e.llm_error().and_then(|le| le.retry_after()) {
                eprintln!("{} retry after {:?}", "⚠ Rate limited,".yellow(), retry_after);
            }
            if let PipelineError::Stage { .. } = e
                && let Ok(Some(trip)) = state.get_trip(&TripId::parse(id)?.to_string()).await
                && trip.status.is_processing()
            {
                eprintln!(
                    "Trip left at status: {} (run `tp generate` again to restart)",
                    colored_status(trip.status)
                );
            }
            std::process::exit(1);
        }
    }
}

/// Print status transitions as the store persists them
///
/// Runs until `done` fires, then drains whatever is still queued.
async fn print_events(mut events: broadcast::Receiver<StateEvent>, mut done: oneshot::Receiver<()>) {
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => print_event(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "print_events: lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = &mut done => {
                while let Ok(event) = events.try_recv() {
                    print_event(&event);
                }
                break;
            }
        }
    }
}

fn print_event(event: &StateEvent) {
    match event {
        StateEvent::TripStatusChanged { status, .. } => {
            println!("{} {}", "→".cyan(), colored_status(*status));
        }
        StateEvent::ItineraryWritten { structured: true, .. } => {
            println!("{} itinerary written", "✓".green());
        }
        StateEvent::ItineraryWritten { structured: false, .. } => {
            println!("{} itinerary could not be parsed, raw text stored", "⚠".yellow());
        }
        StateEvent::TripCreated { .. } => {}
    }
}

fn colored_status(status: TripStatus) -> colored::ColoredString {
    match status {
        s if s.is_processing() => s.as_str().yellow(),
        TripStatus::Completed => status.as_str().green(),
        _ => status.as_str().normal(),
    }
}

fn print_trip(trip: &Trip) {
    println!("{}", trip.destination.bold());
    println!("  ID:      {}", trip.id);
    println!("  Owner:   {}", trip.owner_id);
    println!("  Status:  {}", colored_status(trip.status));
    match trip.dates() {
        Some((start, end)) => println!("  Dates:   {} to {}", start, end),
        None => println!("  Dates:   flexible"),
    }
    println!("  Budget:  {}", trip.budget_tier);
    println!("  Style:   {}", trip.travel_style);
    println!("  Group:   {}", trip.group_size);

    let Some(doc) = &trip.itinerary else {
        return;
    };
    println!();

    match doc {
        ItineraryDocument::Degraded(degraded) => {
            println!("{} ({})", "Unstructured itinerary".yellow(), degraded.error);
            println!("{}", degraded.raw_itinerary);
        }
        ItineraryDocument::Structured(_) => {
            let Some(itinerary) = doc.as_itinerary() else {
                println!("{}", doc.summary().unwrap_or("Itinerary without day plan"));
                return;
            };
            if let Some(summary) = &itinerary.summary {
                println!("{}", summary);
            }
            if let Some(cost) = &itinerary.total_estimated_cost {
                println!("Estimated cost: {}", cost);
            }
            for (position, day) in itinerary.days.iter().enumerate() {
                let number = if day.day == 0 { position as u32 + 1 } else { day.day };
                println!();
                println!(
                    "{} {}",
                    format!("Day {}", number).bold(),
                    day.title.as_deref().unwrap_or("")
                );
                for activity in &day.activities {
                    println!(
                        "  {:<10} {}{}",
                        activity.time.as_deref().unwrap_or(""),
                        activity.activity.as_deref().unwrap_or(""),
                        activity
                            .location
                            .as_deref()
                            .map(|l| format!(" @ {}", l))
                            .unwrap_or_default()
                    );
                }
            }
            if !itinerary.tips.is_empty() {
                println!();
                println!("{}", "Tips".bold());
                for tip in &itinerary.tips {
                    println!("  - {}", tip);
                }
            }
        }
    }
}
