use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Cell, Table};

use super::open_store;
use super::schedule_window::ScheduleListWindow;
use crate::error::{PurseError, Result};
use crate::locale::capitalize_each_word;
use crate::models::{Interval, NewScheduled, Split, TransactionType};
use crate::schedule::{dedup_adjacent, ScheduleListView, ScheduleRow};
use crate::settings::load_settings;
use crate::store::{SqliteStore, Store};
use crate::tui::run_window;

pub struct AddArgs<'a> {
    pub payee: &'a str,
    pub amount: f64,
    pub category: &'a str,
    pub splits: &'a [String],
    pub interval: &'a str,
    pub next_due: Option<&'a str>,
    pub count: i64,
    pub memo: &'a str,
    pub account: Option<&'a str>,
}

/// Parse `CATEGORY=AMOUNT`.
fn parse_split(text: &str) -> Result<(String, f64)> {
    let (category, amount) = text
        .rsplit_once('=')
        .ok_or_else(|| PurseError::InvalidInput(format!("Split '{text}' is not CATEGORY=AMOUNT")))?;
    let amount = amount
        .trim()
        .parse::<f64>()
        .map_err(|_| PurseError::InvalidInput(format!("Not an amount: '{amount}'")))?;
    Ok((capitalize_each_word(category.trim()), amount))
}

fn type_for_category(store: &SqliteStore, category: &str) -> Result<TransactionType> {
    let wanted = category.to_lowercase();
    Ok(store
        .categories()?
        .into_iter()
        .find(|c| c.name.to_lowercase() == wanted)
        .map(|c| TransactionType::from_category_kind(c.kind))
        .unwrap_or(TransactionType::Withdrawal))
}

pub fn add(args: AddArgs<'_>) -> Result<()> {
    let store = open_store(&load_settings())?;
    let account = match args.account {
        Some(name) => store.find_account(name)?,
        None => store.current_account()?.ok_or_else(|| {
            PurseError::Other("No account selected. Pass --account or run `purse accounts select`.".into())
        })?,
    };

    let interval = Interval::parse(args.interval);
    if interval == Interval::Unknown {
        return Err(PurseError::InvalidInput(format!(
            "Unknown interval '{}' (use weekly, monthly, quarterly or annually)",
            args.interval
        )));
    }
    let today = chrono::Local::now().date_naive();
    let next_due = match args.next_due {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| PurseError::InvalidInput(format!("Not a date (YYYY-MM-DD): '{s}'")))?,
        None => today,
    };

    let category = capitalize_each_word(args.category.trim());
    let tx_type = type_for_category(&store, &category)?;
    let signed = |amount: f64| match tx_type {
        TransactionType::Deposit => amount.abs(),
        TransactionType::Withdrawal => -amount.abs(),
    };

    let mut splits = vec![Split {
        category,
        amount: signed(args.amount),
        memo: args.memo.to_string(),
    }];
    for text in args.splits {
        let (category, amount) = parse_split(text)?;
        splits.push(Split {
            category,
            amount: signed(amount),
            memo: String::new(),
        });
    }

    let id = store.add_scheduled(&NewScheduled {
        account_id: account.id,
        date: today,
        tx_type,
        payee: args.payee.trim().to_string(),
        memo: args.memo.to_string(),
        splits,
        next_due,
        count: args.count.max(0),
        interval,
    })?;
    println!("Scheduled {} for {} (id {id})", args.payee.trim().bold(), account.name);
    Ok(())
}

pub fn list() -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Account", "Payee", "Amount", "Payments", "Frequency", "Next payment", "Memo"]);
    let mut shown = 0;
    for id in dedup_adjacent(store.open_scheduled_ids()?) {
        let Some(txn) = store.scheduled_transaction(id)? else {
            continue;
        };
        let row = ScheduleRow::format(&txn, &settings.locale);
        let amount = match txn.tx_type {
            TransactionType::Deposit => row.amount.green().to_string(),
            TransactionType::Withdrawal => row.amount.red().to_string(),
        };
        table.add_row(vec![
            Cell::new(txn.id),
            Cell::new(&txn.account.name),
            Cell::new(&row.payee),
            Cell::new(amount),
            Cell::new(&row.repeats),
            Cell::new(&row.frequency),
            Cell::new(&row.next_payment),
            Cell::new(&row.memo),
        ]);
        shown += 1;
    }
    if shown == 0 {
        println!("No scheduled transactions.");
        return Ok(());
    }
    println!("Scheduled transactions\n{table}");
    Ok(())
}

pub fn remove(id: i64) -> Result<()> {
    let store = open_store(&load_settings())?;
    let Some(txn) = store.scheduled_transaction(id)? else {
        return Err(PurseError::InvalidInput(format!("No scheduled transaction with ID {id}")));
    };
    store.remove_scheduled_transaction(id)?;
    println!("Removed scheduled transaction {id} ({})", txn.payee);
    Ok(())
}

pub fn browse() -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;
    let view = ScheduleListView::new(&store, settings.locale.clone())?;
    let mut window = ScheduleListWindow::new(view);
    run_window(&mut window)
}
