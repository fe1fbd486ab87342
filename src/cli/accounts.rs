use colored::Colorize;
use comfy_table::{Cell, Table};

use super::open_store;
use crate::error::Result;
use crate::locale::Locale;
use crate::models::AccountStatus;
use crate::settings::{load_settings, save_settings};

pub fn add(name: &str, currency: Option<&str>, suffix: bool) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;
    let locale = currency.map(|symbol| Locale {
        currency_symbol: symbol.to_string(),
        currency_prefix: !suffix,
        ..settings.locale.clone()
    });
    let id = store.add_account(name, locale.as_ref())?;
    println!("Added account: {} (id {id})", name.trim());

    if settings.current_account.is_none() {
        let mut settings = settings;
        settings.current_account = Some(id);
        save_settings(&settings)?;
        println!("{} is now the current account", name.trim().bold());
    }
    Ok(())
}

pub fn list() -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;
    let accounts = store.list_accounts()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Status", "Currency", ""]);
    for account in accounts {
        let status = if account.is_open() {
            account.status.as_str().green().to_string()
        } else {
            account.status.as_str().red().to_string()
        };
        let currency = account
            .locale_or(&settings.locale)
            .currency_symbol
            .clone();
        let marker = if settings.current_account == Some(account.id) {
            "current"
        } else {
            ""
        };
        table.add_row(vec![
            Cell::new(account.id),
            Cell::new(account.name),
            Cell::new(status),
            Cell::new(currency),
            Cell::new(marker),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}

pub fn set_status(name: &str, status: AccountStatus) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;
    let account = store.find_account(name)?;
    store.set_account_status(account.id, status)?;
    println!("{}: {}", account.name, status.as_str());
    Ok(())
}

pub fn select(name: &str) -> Result<()> {
    let mut settings = load_settings();
    let store = open_store(&settings)?;
    let account = store.find_account(name)?;
    settings.current_account = Some(account.id);
    save_settings(&settings)?;
    println!("Current account: {}", account.name.bold());
    Ok(())
}
