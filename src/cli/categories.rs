use colored::Colorize;
use comfy_table::{Cell, Table};

use super::open_store;
use crate::category_box::{CategoryBox, MissingCategoryChoice};
use crate::error::{PurseError, Result};
use crate::models::{CategoryKind, TransactionType};
use crate::settings::load_settings;
use crate::store::Store;

pub fn add(name: &str, kind: &str) -> Result<()> {
    let kind = CategoryKind::parse(kind).ok_or_else(|| {
        PurseError::InvalidInput(format!("Unknown category type '{kind}' (use spending or deposit)"))
    })?;
    let store = open_store(&load_settings())?;
    store.add_category(name, kind)?;
    println!("Added category: {} ({})", name.trim(), kind.as_str());
    Ok(())
}

pub fn list() -> Result<()> {
    let store = open_store(&load_settings())?;
    let mut table = Table::new();
    table.set_header(vec!["Name", "Type"]);
    for cat in store.categories()? {
        let kind = match cat.kind {
            CategoryKind::Deposit => cat.kind.as_str().green().to_string(),
            CategoryKind::Spending => cat.kind.as_str().red().to_string(),
        };
        table.add_row(vec![Cell::new(cat.name), Cell::new(kind)]);
    }
    println!("Categories\n{table}");
    Ok(())
}

/// Run a name through the same normalization the entry form applies.
pub fn check(name: &str) -> Result<()> {
    let store = open_store(&load_settings())?;
    let mut field = CategoryBox::new(&store, false);
    field.set_text(name);
    if !field.validate(|| MissingCategoryChoice::Cancel)? {
        return Err(PurseError::InvalidInput("Category name is empty".into()));
    }
    match field.kind() {
        Some(kind) => println!("{} -> {}", field.text().bold(), type_label(kind)),
        None => println!(
            "{} -> {} (not a known category)",
            field.text().bold(),
            type_label(TransactionType::Withdrawal)
        ),
    }
    Ok(())
}

fn type_label(kind: TransactionType) -> String {
    match kind {
        TransactionType::Deposit => kind.code().green().to_string(),
        TransactionType::Withdrawal => kind.code().red().to_string(),
    }
}
