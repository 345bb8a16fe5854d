use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "playtime-ctl")]
#[command(about = "Playtime screen-time control tool for parents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current enforcement state and counters
    Status,

    /// Daily playback quota
    Limit {
        #[command(subcommand)]
        action: LimitAction,
    },

    /// Allowed time-of-day window
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },

    /// Parent PIN management
    Pin {
        #[command(subcommand)]
        action: PinAction,
    },

    /// PIN-gated overrides of today's restrictions
    Allow {
        #[command(subcommand)]
        action: AllowAction,
    },

    /// Recent playback sessions
    Sessions,
}

#[derive(Subcommand)]
enum LimitAction {
    /// Set the daily limit in minutes and enable enforcement
    Set { minutes: u32 },
    On,
    Off,
}

#[derive(Subcommand)]
enum ScheduleAction {
    /// Set the allowed window (24-hour HH:mm, start before end)
    Set { start: String, end: String },
    On,
    Off,
}

#[derive(Subcommand)]
enum PinAction {
    /// Set or replace the parent PIN
    Set,
}

#[derive(Subcommand)]
enum AllowAction {
    /// Grant extra minutes today
    Extend { minutes: u32 },
    /// Reset today's usage counter to zero
    Reset,
    /// Disable quota enforcement entirely
    Off,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Status => commands::status::show().await?,
        Commands::Limit { action } => match action {
            LimitAction::Set { minutes } => commands::limit::set(minutes).await?,
            LimitAction::On => commands::limit::set_enabled(true).await?,
            LimitAction::Off => commands::limit::set_enabled(false).await?,
        },
        Commands::Schedule { action } => match action {
            ScheduleAction::Set { start, end } => commands::schedule::set(&start, &end).await?,
            ScheduleAction::On => commands::schedule::set_enabled(true).await?,
            ScheduleAction::Off => commands::schedule::set_enabled(false).await?,
        },
        Commands::Pin { action } => match action {
            PinAction::Set => commands::pin::set().await?,
        },
        Commands::Allow { action } => match action {
            AllowAction::Extend { minutes } => commands::allow::extend(minutes).await?,
            AllowAction::Reset => commands::allow::reset().await?,
            AllowAction::Off => commands::allow::disable().await?,
        },
        Commands::Sessions => commands::sessions::list().await?,
    }

    Ok(())
}
