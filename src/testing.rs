//! In-memory `Store` for component tests.

use std::cell::RefCell;

use chrono::NaiveDate;

use crate::error::{PurseError, Result};
use crate::models::{
    Account, AccountStatus, Category, Interval, ScheduledTransaction, Split, TransactionType,
};
use crate::store::Store;

#[derive(Default)]
pub struct FakeStore {
    pub account: Option<Account>,
    pub categories: Vec<Category>,
    /// Ids as the list query would stream them, duplicates included.
    pub id_stream: Vec<i64>,
    pub records: Vec<ScheduledTransaction>,
    /// Ids whose fetch errors out instead of returning a record.
    pub broken: Vec<i64>,
    pub autocomplete_calls: RefCell<Vec<String>>,
    pub deletes: RefCell<Vec<i64>>,
}

pub fn account(id: i64, name: &str) -> Account {
    Account {
        id,
        name: name.to_string(),
        status: AccountStatus::Open,
        locale: None,
    }
}

pub fn scheduled(id: i64, payee: &str, amount: f64, count: i64, interval: Interval) -> ScheduledTransaction {
    let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    ScheduledTransaction {
        id,
        account: account(1, "Checking"),
        date,
        tx_type: TransactionType::Withdrawal,
        payee: payee.to_string(),
        amount,
        memo: format!("memo {id}"),
        splits: vec![Split {
            category: "Utilities".to_string(),
            amount,
            memo: String::new(),
        }],
        next_due: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        count,
        interval,
    }
}

impl FakeStore {
    fn live_ids(&self) -> Vec<i64> {
        let deleted = self.deletes.borrow();
        self.id_stream
            .iter()
            .copied()
            .filter(|id| !deleted.contains(id))
            .collect()
    }
}

impl Store for FakeStore {
    fn current_account(&self) -> Result<Option<Account>> {
        Ok(self.account.clone())
    }

    fn categories(&self) -> Result<Vec<Category>> {
        let mut cats = self.categories.clone();
        cats.sort_by_key(|c| c.name.to_lowercase());
        Ok(cats)
    }

    fn autocomplete_category(&self, _account: &Account, input: &str) -> Result<String> {
        self.autocomplete_calls.borrow_mut().push(input.to_string());
        let typed = input.chars().count();
        let lower = input.to_lowercase();
        Ok(self
            .categories()?
            .into_iter()
            .find(|c| c.name.to_lowercase().starts_with(&lower) && c.name.chars().count() > typed)
            .map(|c| c.name.chars().skip(typed).collect())
            .unwrap_or_default())
    }

    fn open_scheduled_count(&self) -> Result<i64> {
        Ok(self.live_ids().len() as i64)
    }

    fn open_scheduled_ids(&self) -> Result<Vec<i64>> {
        Ok(self.live_ids())
    }

    fn scheduled_transaction(&self, id: i64) -> Result<Option<ScheduledTransaction>> {
        if self.broken.contains(&id) {
            return Err(PurseError::Other(format!("corrupt record {id}")));
        }
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    fn remove_scheduled_transaction(&self, id: i64) -> Result<()> {
        self.deletes.borrow_mut().push(id);
        Ok(())
    }
}
