use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::db::{get_connection, init_db};
use crate::error::{PurseError, Result};
use crate::locale::Locale;
use crate::models::{
    Account, AccountStatus, Category, CategoryKind, Interval, NewScheduled, NewTransaction,
    ScheduledTransaction, Split, TransactionType,
};

/// Database access used by the UI components. Handed to each component when
/// it is built so tests can substitute their own.
pub trait Store {
    /// The account the user is working in, if any.
    fn current_account(&self) -> Result<Option<Account>>;

    /// All categories, ordered by name ascending.
    fn categories(&self) -> Result<Vec<Category>>;

    /// Best completion for `input` from the account's category corpus.
    /// Returns only the part beyond what was typed, or an empty string.
    fn autocomplete_category(&self, account: &Account, input: &str) -> Result<String>;

    /// Number of scheduled rows (one per split) belonging to open accounts.
    fn open_scheduled_count(&self) -> Result<i64>;

    /// Scheduled transaction ids of open accounts, one entry per split row,
    /// ordered by id.
    fn open_scheduled_ids(&self) -> Result<Vec<i64>>;

    fn scheduled_transaction(&self, id: i64) -> Result<Option<ScheduledTransaction>>;

    fn remove_scheduled_transaction(&self, id: i64) -> Result<()>;
}

pub struct SqliteStore {
    conn: Connection,
    current_account: Option<i64>,
}

const ACCOUNT_COLUMNS: &str = "id, name, status, currency_symbol, currency_prefix, currency_separator, currency_decimal";

fn account_from_row(row: &Row, offset: usize) -> rusqlite::Result<Account> {
    let status: String = row.get(offset + 2)?;
    let symbol: Option<String> = row.get(offset + 3)?;
    let prefix: Option<bool> = row.get(offset + 4)?;
    let separator: Option<String> = row.get(offset + 5)?;
    let decimal: Option<String> = row.get(offset + 6)?;
    let locale = symbol.map(|currency_symbol| {
        let defaults = Locale::default();
        Locale {
            currency_symbol,
            currency_prefix: prefix.unwrap_or(defaults.currency_prefix),
            thousands_separator: separator.unwrap_or(defaults.thousands_separator),
            decimal_separator: decimal.unwrap_or(defaults.decimal_separator),
            date_format: defaults.date_format,
        }
    });
    Ok(Account {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        status: AccountStatus::parse(&status),
        locale,
    })
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| PurseError::InvalidInput(format!("bad date '{text}': {e}")))
}

/// Remainder of `candidate` past `input` when `input` is a case-insensitive
/// prefix of it and something is left over.
fn completion_suffix(candidate: &str, input: &str) -> Option<String> {
    let typed = input.chars().count();
    if candidate.chars().count() <= typed {
        return None;
    }
    let is_prefix = candidate
        .chars()
        .zip(input.chars())
        .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()));
    if is_prefix {
        Some(candidate.chars().skip(typed).collect())
    } else {
        None
    }
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = get_connection(db_path)?;
        init_db(&conn)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            current_account: None,
        }
    }

    pub fn with_current_account(mut self, account_id: Option<i64>) -> Self {
        self.current_account = account_id;
        self
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn add_account(&self, name: &str, locale: Option<&Locale>) -> Result<i64> {
        if name.trim().is_empty() {
            return Err(PurseError::InvalidInput("Account name is required".into()));
        }
        self.conn.execute(
            "INSERT INTO accounts (name, status, currency_symbol, currency_prefix, currency_separator, currency_decimal) \
             VALUES (?1, 'open', ?2, ?3, ?4, ?5)",
            rusqlite::params![
                name.trim(),
                locale.map(|l| l.currency_symbol.as_str()),
                locale.map(|l| l.currency_prefix),
                locale.map(|l| l.thousands_separator.as_str()),
                locale.map(|l| l.decimal_separator.as_str()),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, name, "account added");
        Ok(id)
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY name ASC"))?;
        let accounts = stmt
            .query_map([], |row| account_from_row(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(accounts)
    }

    pub fn account(&self, id: i64) -> Result<Option<Account>> {
        let account = self
            .conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
                [id],
                |row| account_from_row(row, 0),
            )
            .optional()?;
        Ok(account)
    }

    pub fn find_account(&self, name: &str) -> Result<Account> {
        self.conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE name = ?1 COLLATE NOCASE"),
                [name],
                |row| account_from_row(row, 0),
            )
            .optional()?
            .ok_or_else(|| PurseError::UnknownAccount(name.to_string()))
    }

    pub fn set_account_status(&self, id: i64, status: AccountStatus) -> Result<()> {
        self.conn.execute(
            "UPDATE accounts SET status = ?1 WHERE id = ?2",
            rusqlite::params![status.as_str(), id],
        )?;
        Ok(())
    }

    pub fn add_category(&self, name: &str, kind: CategoryKind) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PurseError::InvalidInput("Category name is required".into()));
        }
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = ?1)",
            [name],
            |row| row.get(0),
        )?;
        if exists {
            return Err(PurseError::InvalidInput(format!(
                "Category name already exists: {name}"
            )));
        }
        self.conn.execute(
            "INSERT INTO categories (name, kind) VALUES (?1, ?2)",
            rusqlite::params![name, kind.as_str()],
        )?;
        Ok(())
    }

    pub fn add_transaction(&self, txn: &NewTransaction) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO transactions (account_id, date, type, payee, amount, category, memo) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                txn.account_id,
                txn.date.format("%Y-%m-%d").to_string(),
                txn.tx_type.code(),
                txn.payee,
                txn.amount,
                txn.category,
                txn.memo,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert one row per split under a fresh transaction id.
    pub fn add_scheduled(&self, sched: &NewScheduled) -> Result<i64> {
        if sched.splits.is_empty() {
            return Err(PurseError::InvalidInput(
                "A scheduled transaction needs at least one split".into(),
            ));
        }
        let trans_id: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(trans_id), 0) + 1 FROM scheduled",
            [],
            |row| row.get(0),
        )?;
        let tx = self.conn.unchecked_transaction()?;
        for split in &sched.splits {
            tx.execute(
                "INSERT INTO scheduled (trans_id, account_id, date, type, payee, amount, category, memo, next_due, count, interval) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                rusqlite::params![
                    trans_id,
                    sched.account_id,
                    sched.date.format("%Y-%m-%d").to_string(),
                    sched.tx_type.code(),
                    sched.payee,
                    split.amount,
                    split.category,
                    split.memo,
                    sched.next_due.format("%Y-%m-%d").to_string(),
                    sched.count,
                    sched.interval.as_str(),
                ],
            )?;
        }
        tx.commit()?;
        tracing::info!(trans_id, splits = sched.splits.len(), "scheduled transaction added");
        Ok(trans_id)
    }

    fn account_categories(&self, account_id: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT category FROM transactions \
             WHERE account_id = ?1 AND category IS NOT NULL AND category != '' \
             ORDER BY category ASC",
        )?;
        let names = stmt
            .query_map([account_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

impl Store for SqliteStore {
    fn current_account(&self) -> Result<Option<Account>> {
        match self.current_account {
            Some(id) => self.account(id),
            None => Ok(None),
        }
    }

    fn categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, kind FROM categories ORDER BY name ASC")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows
            .into_iter()
            .map(|(name, kind)| Category {
                name,
                kind: CategoryKind::parse(&kind).unwrap_or(CategoryKind::Spending),
            })
            .collect())
    }

    fn autocomplete_category(&self, account: &Account, input: &str) -> Result<String> {
        if input.is_empty() {
            return Ok(String::new());
        }
        // Categories the account already uses win over the global list.
        let own = self.account_categories(account.id)?;
        let global = self.categories()?.into_iter().map(|c| c.name);
        let suggestion = own
            .into_iter()
            .chain(global)
            .find_map(|candidate| completion_suffix(&candidate, input))
            .unwrap_or_default();
        tracing::trace!(account = account.id, input, %suggestion, "category autocomplete");
        Ok(suggestion)
    }

    fn open_scheduled_count(&self) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM scheduled AS a LEFT JOIN accounts AS b ON a.account_id = b.id \
             WHERE lower(b.status) = 'open'",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn open_scheduled_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.trans_id FROM scheduled AS a LEFT JOIN accounts AS b ON a.account_id = b.id \
             WHERE lower(b.status) = 'open' ORDER BY a.trans_id ASC, a.id ASC",
        )?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    fn scheduled_transaction(&self, id: i64) -> Result<Option<ScheduledTransaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT s.date, s.type, s.payee, s.amount, s.category, s.memo, s.next_due, s.count, s.interval, \
             {} FROM scheduled s JOIN accounts a ON s.account_id = a.id \
             WHERE s.trans_id = ?1 ORDER BY s.id ASC",
            ACCOUNT_COLUMNS
                .split(", ")
                .map(|c| format!("a.{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        ))?;

        struct SplitRow {
            date: String,
            tx_type: String,
            payee: String,
            amount: f64,
            category: Option<String>,
            memo: Option<String>,
            next_due: String,
            count: i64,
            interval: String,
            account: Account,
        }

        let rows = stmt
            .query_map([id], |row| {
                Ok(SplitRow {
                    date: row.get(0)?,
                    tx_type: row.get(1)?,
                    payee: row.get(2)?,
                    amount: row.get(3)?,
                    category: row.get(4)?,
                    memo: row.get(5)?,
                    next_due: row.get(6)?,
                    count: row.get(7)?,
                    interval: row.get(8)?,
                    account: account_from_row(row, 9)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };

        let splits: Vec<Split> = rows
            .iter()
            .map(|r| Split {
                category: r.category.clone().unwrap_or_default(),
                amount: r.amount,
                memo: r.memo.clone().unwrap_or_default(),
            })
            .collect();

        Ok(Some(ScheduledTransaction {
            id,
            account: first.account.clone(),
            date: parse_date(&first.date)?,
            tx_type: TransactionType::from_code(&first.tx_type),
            payee: first.payee.clone(),
            amount: splits.iter().map(|s| s.amount).sum(),
            memo: first.memo.clone().unwrap_or_default(),
            splits,
            next_due: parse_date(&first.next_due)?,
            count: first.count,
            interval: Interval::parse(&first.interval),
        }))
    }

    fn remove_scheduled_transaction(&self, id: i64) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM scheduled WHERE trans_id = ?1", [id])?;
        tracing::info!(trans_id = id, rows = removed, "scheduled transaction removed");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    pub(crate) fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub(crate) fn schedule(account_id: i64, payee: &str, splits: &[(&str, f64)]) -> NewScheduled {
        NewScheduled {
            account_id,
            date: date("2025-01-01"),
            tx_type: TransactionType::Withdrawal,
            payee: payee.to_string(),
            memo: String::new(),
            splits: splits
                .iter()
                .map(|(category, amount)| Split {
                    category: category.to_string(),
                    amount: *amount,
                    memo: String::new(),
                })
                .collect(),
            next_due: date("2025-02-01"),
            count: 0,
            interval: Interval::Monthly,
        }
    }

    #[test]
    fn test_categories_sorted_by_name() {
        let (_dir, store) = test_store();
        let cats = store.categories().unwrap();
        let names: Vec<&str> = cats.iter().map(|c| c.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_by_key(|n| n.to_lowercase());
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_add_category_rejects_case_insensitive_duplicate() {
        let (_dir, store) = test_store();
        assert!(store.add_category("groceries", CategoryKind::Spending).is_err());
        store.add_category("Pets", CategoryKind::Spending).unwrap();
    }

    #[test]
    fn test_autocomplete_returns_suffix() {
        let (_dir, store) = test_store();
        let id = store.add_account("Checking", None).unwrap();
        let account = store.account(id).unwrap().unwrap();
        assert_eq!(store.autocomplete_category(&account, "Gro").unwrap(), "ceries");
        assert_eq!(store.autocomplete_category(&account, "gro").unwrap(), "ceries");
        assert_eq!(store.autocomplete_category(&account, "Groceries").unwrap(), "");
        assert_eq!(store.autocomplete_category(&account, "Zzz").unwrap(), "");
        assert_eq!(store.autocomplete_category(&account, "").unwrap(), "");
    }

    #[test]
    fn test_autocomplete_prefers_account_categories() {
        let (_dir, store) = test_store();
        let id = store.add_account("Checking", None).unwrap();
        store
            .add_transaction(&NewTransaction {
                account_id: id,
                date: date("2025-01-05"),
                tx_type: TransactionType::Withdrawal,
                payee: "Hardware Store".to_string(),
                amount: -12.0,
                category: "Garden Supplies".to_string(),
                memo: String::new(),
            })
            .unwrap();
        let account = store.account(id).unwrap().unwrap();
        // "Gifts Received" sorts first globally, but the account has used "Garden Supplies".
        assert_eq!(store.autocomplete_category(&account, "G").unwrap(), "arden Supplies");
    }

    #[test]
    fn test_current_account() {
        let (dir, store) = test_store();
        assert!(store.current_account().unwrap().is_none());
        let id = store.add_account("Savings", None).unwrap();
        drop(store);
        let store = SqliteStore::open(&dir.path().join("test.db"))
            .unwrap()
            .with_current_account(Some(id));
        assert_eq!(store.current_account().unwrap().unwrap().name, "Savings");
    }

    #[test]
    fn test_splits_share_one_id_and_are_summed() {
        let (_dir, store) = test_store();
        let acct = store.add_account("Checking", None).unwrap();
        let id = store
            .add_scheduled(&schedule(acct, "Utility Co", &[("Utilities", -40.0), ("Taxes", -2.5)]))
            .unwrap();
        assert_eq!(store.open_scheduled_count().unwrap(), 2);
        assert_eq!(store.open_scheduled_ids().unwrap(), vec![id, id]);
        let txn = store.scheduled_transaction(id).unwrap().unwrap();
        assert_eq!(txn.splits.len(), 2);
        assert!((txn.amount - -42.5).abs() < 1e-9);
        assert_eq!(txn.interval, Interval::Monthly);
        assert_eq!(txn.account.name, "Checking");
    }

    #[test]
    fn test_closed_accounts_are_filtered() {
        let (_dir, store) = test_store();
        let open = store.add_account("Checking", None).unwrap();
        let closed = store.add_account("Old Card", None).unwrap();
        store.add_scheduled(&schedule(open, "Landlord", &[("Rent", -900.0)])).unwrap();
        store.add_scheduled(&schedule(closed, "Gym", &[("Health Care", -30.0)])).unwrap();
        store.set_account_status(closed, AccountStatus::Closed).unwrap();
        assert_eq!(store.open_scheduled_count().unwrap(), 1);
        assert_eq!(store.open_scheduled_ids().unwrap().len(), 1);
    }

    #[test]
    fn test_status_match_is_case_insensitive() {
        let (_dir, store) = test_store();
        let acct = store.add_account("Checking", None).unwrap();
        store
            .conn()
            .execute("UPDATE accounts SET status = 'Open' WHERE id = ?1", [acct])
            .unwrap();
        store.add_scheduled(&schedule(acct, "Landlord", &[("Rent", -900.0)])).unwrap();
        assert_eq!(store.open_scheduled_count().unwrap(), 1);
    }

    #[test]
    fn test_remove_scheduled_deletes_all_splits() {
        let (_dir, store) = test_store();
        let acct = store.add_account("Checking", None).unwrap();
        let id = store
            .add_scheduled(&schedule(acct, "Utility Co", &[("Utilities", -40.0), ("Taxes", -2.5)]))
            .unwrap();
        store.remove_scheduled_transaction(id).unwrap();
        assert!(store.scheduled_transaction(id).unwrap().is_none());
        assert_eq!(store.open_scheduled_count().unwrap(), 0);
    }

    #[test]
    fn test_account_locale_roundtrip() {
        let (_dir, store) = test_store();
        let euro = Locale {
            currency_symbol: "€".to_string(),
            currency_prefix: false,
            ..Locale::default()
        };
        let id = store.add_account("Girokonto", Some(&euro)).unwrap();
        let plain = store.add_account("Checking", None).unwrap();
        let account = store.account(id).unwrap().unwrap();
        assert_eq!(account.locale.as_ref().unwrap().currency_symbol, "€");
        assert!(!account.locale.unwrap().currency_prefix);
        assert!(store.account(plain).unwrap().unwrap().locale.is_none());
        assert_eq!(store.find_account("girokonto").unwrap().id, id);
        assert!(matches!(
            store.find_account("nope"),
            Err(PurseError::UnknownAccount(_))
        ));
    }
}
