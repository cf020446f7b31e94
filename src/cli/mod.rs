pub mod auth;
pub mod dashboard;
pub mod init;
pub mod records;
pub mod status;

use std::io::{BufRead, Write};
use std::path::Path;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::settings::Settings;
use crate::storage::{select_backend, HostCapabilities, StorageFacade};

/// Split `YYYY-MM` into its parts; anything else yields `(None, None)`.
pub(crate) fn parse_month_opt(month: &Option<String>) -> (Option<i32>, Option<u32>) {
    if let Some(m) = month {
        let parts: Vec<&str> = m.split('-').collect();
        if parts.len() == 2 {
            let year = parts[0].parse().ok();
            let month = parts[1].parse().ok();
            return (year, month);
        }
    }
    (None, None)
}

/// Ask a yes/no question on stderr; only `y` or `yes` answers true.
pub(crate) fn confirm(prompt: &str, input: &mut impl BufRead) -> Result<bool> {
    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Select the backend for this host and initialize it before any CRUD call.
pub(crate) fn open_storage(settings: &Settings) -> Result<StorageFacade> {
    let caps = HostCapabilities::detect(settings.backend);
    let backend = select_backend(&caps, Path::new(&settings.data_dir));
    StorageFacade::open(backend)
}

#[derive(Parser)]
#[command(name = "tally", about = "Track income and expenses from the terminal.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and storage backend, then initialize the store.
    Init {
        /// Path for tally data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Storage backend: auto, sqlite, local
        #[arg(long)]
        backend: Option<String>,
    },
    /// Log in. Required before viewing or changing records.
    Login {
        /// Username (prompted when omitted)
        #[arg(long)]
        username: Option<String>,
        /// Read the password from the first line of stdin instead of prompting
        #[arg(long = "password-stdin")]
        password_stdin: bool,
    },
    /// Log out and clear the session flag.
    Logout,
    /// Add an income or expense record.
    Add {
        /// Date: YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Record type: income, expense
        #[arg(long = "type")]
        record_type: String,
        /// Non-negative amount
        #[arg(long)]
        amount: f64,
        /// Free-text note, used as the category
        #[arg(long)]
        note: Option<String>,
    },
    /// List records.
    List {
        /// Only show this type: income, expense
        #[arg(long = "type")]
        record_type: Option<String>,
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
    },
    /// Change fields of an existing record.
    Edit {
        /// Record ID (shown in `tally list`)
        id: i64,
        #[arg(long)]
        date: Option<String>,
        #[arg(long = "type")]
        record_type: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete a record by ID.
    Delete {
        /// Record ID (shown in `tally list`)
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Totals, expense distribution and monthly trend.
    Dashboard {
        /// Print the chart series as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show settings, backend and session state.
    Status,
}
