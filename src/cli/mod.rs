pub mod accounts;
pub mod categories;
pub mod complete;
pub mod entry;
pub mod init;
pub mod schedule;
pub mod schedule_window;

use clap::{Parser, Subcommand};

use crate::error::{PurseError, Result};
use crate::settings::Settings;
use crate::store::SqliteStore;

/// Open the configured database with the current account applied.
pub(crate) fn open_store(settings: &Settings) -> Result<SqliteStore> {
    let path = settings.db_path();
    if !path.exists() {
        return Err(PurseError::Other(
            "Database not found. Run `purse init` first.".into(),
        ));
    }
    Ok(SqliteStore::open(&path)?.with_current_account(settings.current_account))
}

#[derive(Parser)]
#[command(name = "purse", about = "Personal finance in the terminal.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for purse data (default: ~/Documents/purse)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Print the category completion for a prefix.
    Complete {
        prefix: String,
        /// Account whose transactions rank first (default: current account)
        #[arg(long)]
        account: Option<String>,
    },
    /// Manage scheduled transactions.
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
    /// Enter transactions for the current account.
    Entry,
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add a new account.
    Add {
        name: String,
        /// Currency symbol for this account (default: settings locale)
        #[arg(long)]
        currency: Option<String>,
        /// Print the currency symbol after the amount
        #[arg(long)]
        suffix: bool,
    },
    /// List all accounts.
    List,
    /// Close an account; its scheduled transactions are hidden.
    Close { name: String },
    /// Reopen a closed account.
    Reopen { name: String },
    /// Make an account the current one.
    Select { name: String },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// Add a category.
    Add {
        name: String,
        /// spending or deposit
        #[arg(long = "type", default_value = "spending")]
        kind: String,
    },
    /// List all categories.
    List,
    /// Normalize a category name and show the transaction type it implies.
    Check { name: String },
}

#[derive(Subcommand)]
pub enum ScheduleCommands {
    /// Schedule a recurring transaction.
    Add {
        payee: String,
        amount: f64,
        /// Category; repeat with --split for split transactions
        #[arg(long, default_value = "Uncategorized")]
        category: String,
        /// Extra split as CATEGORY=AMOUNT
        #[arg(long = "split")]
        splits: Vec<String>,
        /// weekly, monthly, quarterly or annually
        #[arg(long, default_value = "monthly")]
        interval: String,
        /// First due date (YYYY-MM-DD, default: today)
        #[arg(long = "next-due")]
        next_due: Option<String>,
        /// Number of payments left; 0 repeats forever
        #[arg(long, default_value_t = 0)]
        count: i64,
        #[arg(long, default_value = "")]
        memo: String,
        /// Account name (default: current account)
        #[arg(long)]
        account: Option<String>,
    },
    /// List scheduled transactions of open accounts.
    List,
    /// Remove a scheduled transaction and all of its splits.
    Remove { id: i64 },
    /// Browse scheduled transactions interactively.
    Browse,
}
