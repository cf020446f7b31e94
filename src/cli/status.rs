use std::path::PathBuf;

use crate::cli::open_storage;
use crate::error::Result;
use crate::session::{session_state, SessionFlag, SessionState};
use crate::settings::{settings_file_exists, Settings};
use crate::storage::{local, HostCapabilities};

pub fn run(settings: &Settings) -> Result<()> {
    let data_dir = PathBuf::from(&settings.data_dir);
    let caps = HostCapabilities::detect(settings.backend);
    let state = session_state(&SessionFlag::default_location());

    println!("Data dir:   {}", data_dir.display());
    println!(
        "Backend:    {} (native bridge: {})",
        format!("{:?}", settings.backend).to_lowercase(),
        caps.native_bridge
    );
    println!("Currency:   {}", if settings.currency.is_empty() { "(none)" } else { settings.currency.as_str() });
    println!(
        "Session:    {}",
        match state {
            SessionState::LoggedIn => "logged in",
            SessionState::LoggedOut => "logged out",
        }
    );

    if !settings_file_exists() || !store_exists(&data_dir) {
        println!();
        println!("Store not found. Run `tally init` to set up.");
        return Ok(());
    }

    let storage = open_storage(settings)?;
    println!("Store:      {}", storage.kind());
    if state == SessionState::LoggedIn {
        let count = storage.get_records()?.len();
        println!();
        println!("Records:    {count}");
    }
    Ok(())
}

fn store_exists(data_dir: &std::path::Path) -> bool {
    #[cfg(feature = "sqlite")]
    {
        if data_dir.join(crate::storage::sqlite::DB_FILE).exists() {
            return true;
        }
    }
    data_dir.join(local::STORE_FILE).exists()
}
