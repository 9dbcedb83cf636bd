mod app;
mod dialogs;
mod render;
mod singleton;
mod utils;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use gridcal_core::{AppConfig, Authenticator, CredentialStore, EventAggregator, SessionController};
use gridcal_provider_google::{GoogleCalendar, GoogleOAuth, app_config};
use owo_colors::OwoColorize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::app::Exit;
use crate::singleton::InstanceLock;
use crate::utils::tui::with_spinner;

#[derive(Parser)]
#[command(name = "gridcal")]
#[command(about = "Browse and edit your Google Calendar as a month grid")]
struct Cli {
    /// Date to open on (YYYY-MM-DD, default today)
    #[arg(long)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Forget the saved Google sign-in
    Logout,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Some(Commands::Logout) => logout(),
        None => run(cli.date).await,
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,gridcal=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn logout() -> Result<()> {
    let store = CredentialStore::new(CredentialStore::default_path()?);

    if store.remove()? {
        println!("{}", "Logged out.".green());
    } else {
        println!("{}", "Not logged in.".dimmed());
    }

    Ok(())
}

async fn run(date: Option<NaiveDate>) -> Result<()> {
    let lock = InstanceLock::acquire()?;
    debug!("Holding {}", lock.path().display());

    let config = AppConfig::load()?;
    let credentials = app_config::load()?;
    let store = CredentialStore::new(CredentialStore::default_path()?);

    // Sign in up front so a consent prompt never lands in the middle of the grid
    let auth = Authenticator::new(store.clone(), GoogleOAuth::new(credentials.clone()));
    auth.get_valid_credential()
        .await
        .context("Could not sign in to Google Calendar")?;

    let tz = local_timezone();
    let selected = date.unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive());
    info!("Opening {} in {} on {}", config.calendar_id, tz, selected);

    let calendar = GoogleCalendar::new(auth, credentials);
    let aggregator = EventAggregator::new(calendar, config.calendar_id.clone(), config.holiday_overlay(), tz);

    let session = with_spinner(
        "Loading calendar...",
        SessionController::start(aggregator, store, selected),
    )
    .await?;

    match app::run(session).await? {
        Exit::Quit => Ok(()),
        Exit::Restart => {
            drop(lock);
            relaunch()
        }
    }
}

fn local_timezone() -> Tz {
    match iana_time_zone::get_timezone() {
        Ok(name) => name.parse().unwrap_or_else(|_| {
            warn!("Unknown local time zone '{}', using UTC", name);
            Tz::UTC
        }),
        Err(e) => {
            warn!("Could not determine local time zone ({}), using UTC", e);
            Tz::UTC
        }
    }
}

/// Start this binary over with the same arguments.
fn relaunch() -> Result<()> {
    let exe = std::env::current_exe().context("Could not locate the gridcal binary")?;
    let args: Vec<_> = std::env::args_os().skip(1).collect();
    info!("Restarting {}", exe.display());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // Only returns on failure
        let err = std::process::Command::new(&exe).args(&args).exec();
        Err(err).with_context(|| format!("Failed to restart {}", exe.display()))
    }

    #[cfg(not(unix))]
    {
        let status = std::process::Command::new(&exe)
            .args(&args)
            .status()
            .with_context(|| format!("Failed to restart {}", exe.display()))?;
        std::process::exit(status.code().unwrap_or(0));
    }
}
