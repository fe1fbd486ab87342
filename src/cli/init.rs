use std::path::PathBuf;

use colored::Colorize;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};
use crate::store::SqliteStore;

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }

    let dir = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&dir)?;
    let fresh = !settings.db_path().exists();
    SqliteStore::open(&settings.db_path())?;
    save_settings(&settings)?;
    tracing::info!(data_dir = %dir.display(), fresh, "initialized");

    if fresh {
        println!("{} {}", "Initialized".green().bold(), dir.display());
    } else {
        println!("{} {}", "Already initialized".yellow(), dir.display());
    }
    println!("Next: purse accounts add <name>");
    Ok(())
}
