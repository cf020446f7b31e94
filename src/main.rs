mod aggregate;
mod cli;
#[cfg(feature = "sqlite")]
mod db;
mod error;
mod fmt;
mod models;
mod password;
#[cfg(feature = "sqlite")]
mod records;
mod session;
mod settings;
mod storage;
#[cfg(feature = "sqlite")]
mod users;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_env("TALLY_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    let (settings, unreadable) = match settings::load_settings() {
        Ok(s) => (s, None),
        Err(e) => (settings::Settings::default(), Some(e)),
    };
    init_tracing(&settings.log_level);
    if let Some(e) = unreadable {
        warn!(error = %e, "unreadable settings, using defaults");
    }

    let result = match cli.command {
        Commands::Init { data_dir, backend } => cli::init::run(settings, data_dir, backend),
        Commands::Login {
            username,
            password_stdin,
        } => cli::auth::login(&settings, username, password_stdin),
        Commands::Logout => cli::auth::logout(),
        Commands::Add {
            date,
            record_type,
            amount,
            note,
        } => cli::records::add(&settings, &date, &record_type, amount, note),
        Commands::List { record_type, month } => cli::records::list(&settings, record_type, month),
        Commands::Edit {
            id,
            date,
            record_type,
            amount,
            note,
        } => cli::records::edit(&settings, id, date, record_type, amount, note),
        Commands::Delete { id, yes } => cli::records::delete(&settings, id, yes),
        Commands::Dashboard { json } => cli::dashboard::run(&settings, json),
        Commands::Status => cli::status::run(&settings),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
