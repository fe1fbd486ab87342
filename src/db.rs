use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL DEFAULT 'open',
    currency_symbol TEXT,
    currency_prefix INTEGER,
    currency_separator TEXT,
    currency_decimal TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS categories (
    name TEXT NOT NULL UNIQUE COLLATE NOCASE,
    kind TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    account_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    type TEXT NOT NULL,
    payee TEXT NOT NULL,
    amount REAL NOT NULL,
    category TEXT,
    memo TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (account_id) REFERENCES accounts(id)
);

CREATE TABLE IF NOT EXISTS scheduled (
    id INTEGER PRIMARY KEY,
    trans_id INTEGER NOT NULL,
    account_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    type TEXT NOT NULL,
    payee TEXT NOT NULL,
    amount REAL NOT NULL,
    category TEXT,
    memo TEXT,
    next_due TEXT NOT NULL,
    count INTEGER NOT NULL DEFAULT 0,
    interval TEXT NOT NULL,
    FOREIGN KEY (account_id) REFERENCES accounts(id)
);

CREATE INDEX IF NOT EXISTS idx_scheduled_trans_id ON scheduled(trans_id);
";

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    // Deposits
    ("Salary", "deposit"),
    ("Interest", "deposit"),
    ("Gifts Received", "deposit"),
    ("Refunds", "deposit"),
    // Spending
    ("Car", "spending"),
    ("Clothing", "spending"),
    ("Eating Out", "spending"),
    ("Entertainment", "spending"),
    ("Groceries", "spending"),
    ("Health Care", "spending"),
    ("Insurance", "spending"),
    ("Rent", "spending"),
    ("Taxes", "spending"),
    ("Transfer", "spending"),
    ("Uncategorized", "spending"),
    ("Utilities", "spending"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |row| row.get(0))?;
    if count == 0 {
        for (name, kind) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT INTO categories (name, kind) VALUES (?1, ?2)",
                rusqlite::params![name, kind],
            )?;
        }
    }
    Ok(())
}
