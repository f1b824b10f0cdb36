mod alert;
mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use opcal_core::transport::ProviderRemote;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "opcal")]
#[command(about = "Operational calendar: unified agenda, recurring appointments, local reminders")]
struct Cli {
    /// Remote transport name (resolves to the opcal-remote-<NAME> binary)
    #[arg(long, global = true, default_value = "crm")]
    remote: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the agenda for a date window, grouped by day
    Agenda {
        /// Window start (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Window end (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Text filter over title, description, location, and start value
        #[arg(short, long)]
        query: Option<String>,

        /// Only all-day entries
        #[arg(long)]
        all_day: bool,

        /// Only entries with a location
        #[arg(long)]
        with_location: bool,

        /// Hide activation entries
        #[arg(long)]
        no_activations: bool,

        /// Sort newest first
        #[arg(long)]
        desc: bool,
    },
    /// Create an appointment, optionally as a recurring series
    New {
        title: String,

        /// Start date/time (e.g. "2026-03-20T15:00", or "2026-03-20" for all-day)
        #[arg(short, long)]
        start: String,

        /// End date/time
        #[arg(short, long)]
        end: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        /// Hex color (e.g. "#3b82f6")
        #[arg(long)]
        color: Option<String>,

        /// Repeat frequency: daily, weekly, or monthly
        #[arg(long)]
        every: Option<String>,

        /// Repeat every N units of the frequency
        #[arg(long, default_value_t = 1)]
        interval: u32,

        /// Number of occurrences (mutually exclusive with --until)
        #[arg(long, conflicts_with = "until")]
        count: Option<u32>,

        /// Last possible occurrence date (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,

        /// Weekdays for weekly repeats (e.g. "mon,wed,fri")
        #[arg(long)]
        on: Option<String>,
    },
    /// Move an appointment to a new start/end
    Move {
        id: String,

        /// New start date/time
        #[arg(short, long)]
        start: String,

        /// New end date/time
        #[arg(short, long)]
        end: Option<String>,

        /// Make the appointment all-day
        #[arg(long)]
        all_day: bool,
    },
    /// Delete an appointment
    Delete { id: String },
    /// Show the notification inbox
    Inbox {
        /// Mark one notification read
        #[arg(long)]
        mark_read: Option<String>,

        /// Mark every notification read
        #[arg(long)]
        mark_all_read: bool,
    },
    /// Run the reminder loop for the current window
    Watch {
        /// Reminder lead times in minutes, comma-separated
        #[arg(long, default_value = "15")]
        remind: String,

        /// Show a desktop notification when a reminder fires
        #[arg(long)]
        system_alerts: bool,
    },
    /// Show or toggle privacy mode
    Privacy {
        /// "on" or "off"; omit to show the current state
        state: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let remote = ProviderRemote::from_name(&cli.remote);

    match cli.command {
        Commands::Agenda {
            from,
            to,
            query,
            all_day,
            with_location,
            no_activations,
            desc,
        } => {
            commands::agenda::run(
                remote,
                from.as_deref(),
                to.as_deref(),
                query.unwrap_or_default(),
                all_day,
                with_location,
                no_activations,
                desc,
            )
            .await
        }
        Commands::New {
            title,
            start,
            end,
            description,
            location,
            color,
            every,
            interval,
            count,
            until,
            on,
        } => {
            commands::new::run(
                remote,
                commands::new::NewArgs {
                    title,
                    start,
                    end,
                    description,
                    location,
                    color,
                    every,
                    interval,
                    count,
                    until,
                    on,
                },
            )
            .await
        }
        Commands::Move {
            id,
            start,
            end,
            all_day,
        } => commands::move_event::run(remote, &id, &start, end.as_deref(), all_day).await,
        Commands::Delete { id } => commands::delete::run(remote, &id).await,
        Commands::Inbox {
            mark_read,
            mark_all_read,
        } => commands::inbox::run(remote, mark_read.as_deref(), mark_all_read).await,
        Commands::Watch {
            remind,
            system_alerts,
        } => commands::watch::run(remote, &remind, system_alerts).await,
        Commands::Privacy { state } => commands::privacy::run(state.as_deref()),
    }
}
