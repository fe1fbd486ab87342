mod category_box;
mod cli;
mod db;
mod error;
mod events;
mod locale;
mod logging;
mod models;
mod schedule;
mod settings;
mod store;
#[cfg(test)]
mod testing;
mod tui;

use std::path::Path;

use clap::{CommandFactory, Parser};

use cli::{AccountsCommands, CategoriesCommands, Cli, Commands, ScheduleCommands};
use models::AccountStatus;

fn main() {
    let cli = Cli::parse();

    let settings = settings::load_settings();
    let data_dir = Path::new(&settings.data_dir);
    if data_dir.is_dir() {
        logging::init_tracing(data_dir);
    }

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        println!();
        return;
    };

    let result = match command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add {
                name,
                currency,
                suffix,
            } => cli::accounts::add(&name, currency.as_deref(), suffix),
            AccountsCommands::List => cli::accounts::list(),
            AccountsCommands::Close { name } => cli::accounts::set_status(&name, AccountStatus::Closed),
            AccountsCommands::Reopen { name } => cli::accounts::set_status(&name, AccountStatus::Open),
            AccountsCommands::Select { name } => cli::accounts::select(&name),
        },
        Commands::Categories { command } => match command {
            CategoriesCommands::Add { name, kind } => cli::categories::add(&name, &kind),
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Check { name } => cli::categories::check(&name),
        },
        Commands::Complete { prefix, account } => cli::complete::run(&prefix, account.as_deref()),
        Commands::Schedule { command } => match command {
            ScheduleCommands::Add {
                payee,
                amount,
                category,
                splits,
                interval,
                next_due,
                count,
                memo,
                account,
            } => cli::schedule::add(cli::schedule::AddArgs {
                payee: &payee,
                amount,
                category: &category,
                splits: &splits,
                interval: &interval,
                next_due: next_due.as_deref(),
                count,
                memo: &memo,
                account: account.as_deref(),
            }),
            ScheduleCommands::List => cli::schedule::list(),
            ScheduleCommands::Remove { id } => cli::schedule::remove(id),
            ScheduleCommands::Browse => cli::schedule::browse(),
        },
        Commands::Entry => cli::entry::run(&settings),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
