use std::path::PathBuf;

use crate::cli::open_storage;
use crate::error::Result;
use crate::settings::{save_settings, settings_file_exists, shellexpand_path, BackendChoice, Settings};

pub fn run(mut settings: Settings, data_dir: Option<String>, backend: Option<String>) -> Result<()> {

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    } else if !settings_file_exists() {
        // First run: offer to change the data dir
        println!("Data directory [{}]: ", settings.data_dir);
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        let chosen = input.trim();
        if !chosen.is_empty() {
            settings.data_dir = shellexpand_path(chosen);
        }
    }
    if let Some(b) = backend {
        settings.backend = b.parse::<BackendChoice>()?;
    }

    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    let storage = open_storage(&settings)?;

    println!(
        "Initialized tally at {} ({} backend)",
        resolved.display(),
        storage.kind()
    );
    println!("Run `tally login` to get started.");
    Ok(())
}
