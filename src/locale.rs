use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Currency and date conventions. Accounts may carry their own; the
/// application-wide default lives in settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locale {
    pub currency_symbol: String,
    /// Symbol goes before the number ("$1.00") rather than after ("1,00€").
    pub currency_prefix: bool,
    pub thousands_separator: String,
    pub decimal_separator: String,
    pub date_format: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            currency_prefix: true,
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl Locale {
    /// Format an amount with grouping and the currency symbol: $1,234.56
    pub fn currency_to_string(&self, val: f64) -> String {
        let negative = val < 0.0;
        let cents = format!("{:.2}", val.abs());
        let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

        let mut grouped = String::new();
        let digits: Vec<char> = int_part.chars().collect();
        for (i, c) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push_str(&self.thousands_separator);
            }
            grouped.push(*c);
        }

        let number = format!("{grouped}{}{dec_part}", self.decimal_separator);
        let sign = if negative { "-" } else { "" };
        if self.currency_prefix {
            format!("{sign}{}{number}", self.currency_symbol)
        } else {
            format!("{sign}{number}{}", self.currency_symbol)
        }
    }

    pub fn date_to_string(&self, date: NaiveDate) -> String {
        let fmt = if valid_date_format(&self.date_format) {
            self.date_format.as_str()
        } else {
            DEFAULT_DATE_FORMAT
        };
        date.format(fmt).to_string()
    }
}

fn valid_date_format(fmt: &str) -> bool {
    !fmt.is_empty() && !StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error))
}

/// Upper-case the first letter of every whitespace-separated word. The rest
/// of each word is left alone so acronyms survive ("atm fees" -> "Atm Fees",
/// "ATM fees" -> "ATM Fees").
pub fn capitalize_each_word(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.push(c);
        }
    }
    out
}
