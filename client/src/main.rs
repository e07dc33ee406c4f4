use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wardwatch_client::{
    api::{ApiClient, CredentialStore},
    config::Config,
    models::activity::DEFAULT_ACTIVITY_ICON,
    repositories::{ActivityLog, RecordOutcome, SessionStore},
    services::{
        device, AuthService, HttpLocationProbe, LocationProbe, SessionManager,
        StaticLocationProbe,
    },
    storage::ClientStorage,
    utils::time::{now_millis, time_ago},
};

#[derive(Parser)]
#[command(name = "wardwatch-session")]
#[command(about = "Sign in to the WardWatch dashboard and inspect this device's sessions", long_about = None)]
struct Cli {
    /// Skip the geolocation lookup and record "Unknown Location"
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and start tracking a session for this device
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Keep the credentials after the session scope is cleared
        #[arg(long)]
        remember: bool,
    },
    /// Sign out and remove this device's current session
    Logout,
    /// Show the signed-in user after checking the token with the backend
    Whoami,
    /// List active sessions
    Sessions,
    /// List recent login attempts
    History,
    /// Remove one session by id
    Terminate { id: String },
    /// Remove every session except the current one
    TerminateOthers,
    /// Show the activity feed
    Activity,
    /// Add an entry to the activity feed
    LogActivity {
        action: String,

        #[arg(long, default_value = DEFAULT_ACTIVITY_ICON)]
        icon: String,
    },
    /// Empty the activity feed
    ClearActivity,
    /// Drop malformed entries from the activity feed
    CleanActivity,
}

fn build(config: &Config, offline: bool) -> anyhow::Result<AuthService> {
    let storage = ClientStorage::on_disk(&config.storage_dir);
    let credentials = CredentialStore::new(storage.clone());
    let api = ApiClient::new(config, credentials.clone())?;

    let probe: Arc<dyn LocationProbe> = if offline {
        Arc::new(StaticLocationProbe::unknown(config.time_zone))
    } else {
        Arc::new(HttpLocationProbe::new(config)?)
    };
    let sessions = SessionManager::new(
        SessionStore::new(storage.persistent()),
        probe,
        config.user_agent.clone(),
    )
    .with_heartbeat_interval(config.heartbeat_interval);

    Ok(AuthService::new(
        api,
        credentials,
        Arc::new(sessions),
        ActivityLog::new(storage.persistent()),
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wardwatch_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    tracing::debug!(
        api_base_url = %config.api_base_url,
        storage_dir = %config.storage_dir.display(),
        time_zone = %config.time_zone,
        fingerprint = %device::fingerprint(&config.user_agent, &config.language, config.time_zone.name()),
        "Loaded configuration from environment/.env"
    );

    let auth = build(&config, cli.offline)?;
    let sessions = auth.sessions();

    match cli.command {
        Commands::Login {
            email,
            password,
            remember,
        } => {
            let user = auth.login(&email, &password, remember).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
            if let Some(session) = sessions.current_session() {
                println!("Session {} ({}, {})", session.id, session.device, session.location);
            }
        }
        Commands::Logout => {
            sessions.resume_current();
            auth.logout();
            println!("Signed out");
        }
        Commands::Whoami => {
            let state = auth.restore().await;
            match state.user {
                Some(user) => println!("{} <{}> ({})", user.name, user.email, user.role),
                None => println!("Not signed in"),
            }
        }
        Commands::Sessions => {
            let list = sessions.store().list_sessions();
            if list.is_empty() {
                println!("No active sessions");
            }
            for session in list {
                println!(
                    "{} {}  {}  {}  {}  last active {}",
                    if session.current { "*" } else { " " },
                    session.id,
                    session.device,
                    session.os,
                    session.location,
                    time_ago(session.last_active.timestamp_millis()),
                );
            }
        }
        Commands::History => {
            for entry in sessions.store().list_login_history() {
                println!(
                    "{}  {:?}  {}  {}  {}",
                    entry.timestamp.with_timezone(&config.time_zone).format("%Y-%m-%d %H:%M"),
                    entry.status,
                    entry.device,
                    entry.location,
                    entry.ip,
                );
            }
        }
        Commands::Terminate { id } => {
            sessions.resume_current();
            if sessions.terminate_session(&id)? {
                println!("Terminated {}", id);
            } else {
                println!("No session with id {}", id);
            }
        }
        Commands::TerminateOthers => {
            if sessions.resume_current().is_none() {
                anyhow::bail!("No current session on this device");
            }
            let removed = sessions.terminate_all_other_sessions()?;
            println!("Terminated {} other session(s)", removed);
        }
        Commands::Activity => {
            let feed = auth.activity().query_with_time_ago(now_millis());
            if feed.is_empty() {
                println!("No recent activity");
            }
            for view in feed {
                println!("{} {}  ({})", view.entry.icon, view.entry.action, view.time_ago);
            }
        }
        Commands::LogActivity { action, icon } => {
            match auth.activity().record(&action, &icon)? {
                RecordOutcome::Recorded(_) => println!("Logged \"{}\"", action),
                RecordOutcome::Duplicate => println!("Skipped duplicate \"{}\"", action),
            }
        }
        Commands::ClearActivity => {
            auth.activity().clear()?;
            println!("Activity cleared");
        }
        Commands::CleanActivity => {
            let report = auth.activity().clean()?;
            println!("Kept {} of {} entries", report.after, report.before);
        }
    }

    Ok(())
}
