use chrono::NaiveDate;

use crate::locale::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Open,
    Closed,
}

impl AccountStatus {
    /// Status text is matched case-insensitively; anything but "open" is closed.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("open") {
            AccountStatus::Open
        } else {
            AccountStatus::Closed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Open => "open",
            AccountStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub status: AccountStatus,
    /// `None` means the account follows the application default.
    pub locale: Option<Locale>,
}

impl Account {
    pub fn is_open(&self) -> bool {
        self.status == AccountStatus::Open
    }

    pub fn locale_or<'a>(&'a self, default: &'a Locale) -> &'a Locale {
        self.locale.as_ref().unwrap_or(default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Spending,
    Deposit,
}

impl CategoryKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "spending" | "expense" => Some(CategoryKind::Spending),
            "deposit" | "income" => Some(CategoryKind::Deposit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Spending => "spending",
            CategoryKind::Deposit => "deposit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub kind: CategoryKind,
}

/// Transaction-type marker derived from a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl TransactionType {
    pub fn code(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEP",
            TransactionType::Withdrawal => "ATM",
        }
    }

    pub fn from_code(code: &str) -> Self {
        if code.eq_ignore_ascii_case("DEP") {
            TransactionType::Deposit
        } else {
            TransactionType::Withdrawal
        }
    }

    pub fn from_category_kind(kind: CategoryKind) -> Self {
        match kind {
            CategoryKind::Spending => TransactionType::Withdrawal,
            CategoryKind::Deposit => TransactionType::Deposit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Weekly,
    Monthly,
    Quarterly,
    Annually,
    Unknown,
}

impl Interval {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Interval::Weekly,
            "monthly" => Interval::Monthly,
            "quarterly" => Interval::Quarterly,
            "annually" | "yearly" => Interval::Annually,
            _ => Interval::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
            Interval::Quarterly => "quarterly",
            Interval::Annually => "annually",
            Interval::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Interval::Weekly => "Weekly",
            Interval::Monthly => "Monthly",
            Interval::Quarterly => "Quarterly",
            Interval::Annually => "Annually",
            Interval::Unknown => "Unknown",
        }
    }
}

/// One category/amount/memo line of a scheduled transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub category: String,
    pub amount: f64,
    pub memo: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTransaction {
    pub id: i64,
    pub account: Account,
    pub date: NaiveDate,
    pub tx_type: TransactionType,
    pub payee: String,
    /// Sum of the split amounts.
    pub amount: f64,
    pub memo: String,
    pub splits: Vec<Split>,
    pub next_due: NaiveDate,
    /// Remaining repetitions; zero or less repeats forever.
    pub count: i64,
    pub interval: Interval,
}

/// Input for creating a scheduled transaction. Splits default to a single
/// line carrying the whole amount.
#[derive(Debug, Clone)]
pub struct NewScheduled {
    pub account_id: i64,
    pub date: NaiveDate,
    pub tx_type: TransactionType,
    pub payee: String,
    pub memo: String,
    pub splits: Vec<Split>,
    pub next_due: NaiveDate,
    pub count: i64,
    pub interval: Interval,
}

/// A ledger row as written by the entry form.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: i64,
    pub date: NaiveDate,
    pub tx_type: TransactionType,
    pub payee: String,
    /// Signed: deposits positive, withdrawals negative.
    pub amount: f64,
    pub category: String,
    pub memo: String,
}
