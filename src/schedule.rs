use ratatui::text::Span;

use crate::error::Result;
use crate::events::{Key, Modifiers, MouseButton, UiEvents, UiMessage};
use crate::locale::Locale;
use crate::models::ScheduledTransaction;
use crate::store::Store;

pub const WINDOW_TITLE: &str = "Scheduled transactions";
pub const REMOVE_LABEL: &str = "Remove";
pub const UNLIMITED_LABEL: &str = "Unlimited";

const AMOUNT_SAMPLE: &str = "$000,000.00";
const MEMO_SAMPLE: &str = "This is a relatively long memo text";

// Column bounds, in terminal cells.
const COLUMN_MIN: u16 = 3;
const COLUMN_MAX: u16 = 30;
const PAYEE_DEFAULT: u16 = 10;
const PAYEE_PADDING: u16 = 3;
// Space between columns plus the table border.
const COLUMN_SPACING: u16 = 1;
const TABLE_BORDER: u16 = 2;
// Preferred window width.
const BUTTON_PADDING: u16 = 5;
const CONTENT_PADDING: u16 = 4;
const MIN_WINDOW_WIDTH: u16 = 40;

pub fn text_width(s: &str) -> u16 {
    Span::raw(s).width().min(u16::MAX as usize) as u16
}

/// Width of a push button drawn as `[ Label ]`.
pub fn button_width(label: &str) -> u16 {
    text_width(label).saturating_add(4)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub title: &'static str,
    pub width: u16,
}

impl Column {
    fn new(title: &'static str, width: u16) -> Self {
        Self {
            title,
            width: width.clamp(COLUMN_MIN, COLUMN_MAX),
        }
    }
}

/// One formatted line of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub payee: String,
    pub amount: String,
    pub repeats: String,
    pub frequency: String,
    pub next_payment: String,
    pub memo: String,
}

impl ScheduleRow {
    pub fn format(txn: &ScheduledTransaction, default_locale: &Locale) -> Self {
        let amount = txn
            .account
            .locale_or(default_locale)
            .currency_to_string(txn.amount.abs());
        let repeats = if txn.count > 0 {
            txn.count.to_string()
        } else {
            UNLIMITED_LABEL.to_string()
        };
        Self {
            payee: txn.payee.clone(),
            amount,
            repeats,
            frequency: txn.interval.label().to_string(),
            next_payment: default_locale.date_to_string(txn.next_due),
            memo: txn.memo.clone(),
        }
    }

    pub fn cells(&self) -> [&str; 6] {
        [
            self.payee.as_str(),
            self.amount.as_str(),
            self.repeats.as_str(),
            self.frequency.as_str(),
            self.next_payment.as_str(),
            self.memo.as_str(),
        ]
    }
}

/// Drop an id when it repeats the one kept just before it. Split rows of one
/// scheduled transaction arrive next to each other; ids that recur further
/// apart are kept.
pub fn dedup_adjacent(ids: Vec<i64>) -> Vec<i64> {
    let mut kept: Vec<i64> = Vec::with_capacity(ids.len());
    for id in ids {
        if kept.last() != Some(&id) {
            kept.push(id);
        }
    }
    kept
}

/// Scheduled transactions of all open accounts. `transactions` and `rows`
/// always have the same length and order.
pub struct ScheduleListView<'a, S: Store + ?Sized> {
    store: &'a S,
    locale: Locale,
    columns: Vec<Column>,
    transactions: Vec<ScheduledTransaction>,
    rows: Vec<ScheduleRow>,
    selection: Option<usize>,
    showing_popup: bool,
    popup_row: Option<usize>,
    best_width: u16,
    focused: bool,
}

impl<'a, S: Store + ?Sized> ScheduleListView<'a, S> {
    pub fn new(store: &'a S, locale: Locale) -> Result<Self> {
        let columns = vec![
            Column::new("Payee", PAYEE_DEFAULT),
            Column::new(
                "Amount",
                text_width(AMOUNT_SAMPLE).max(text_width("Amount")) + 2,
            ),
            Column::new("Repeats", text_width("Repeats") + 3),
            Column::new("Frequency", text_width("Frequency") + 3),
            Column::new("Next payment", text_width("Next payment") + 2),
            Column::new("Memo", text_width(MEMO_SAMPLE)),
        ];
        let mut view = Self {
            store,
            locale,
            columns,
            transactions: Vec::new(),
            rows: Vec::new(),
            selection: None,
            showing_popup: false,
            popup_row: None,
            best_width: 0,
            focused: false,
        };
        let content_width = view.refresh()?;
        view.best_width = (button_width(REMOVE_LABEL) * 2 + BUTTON_PADDING)
            .max(content_width + CONTENT_PADDING)
            .max(MIN_WINDOW_WIDTH);
        Ok(view)
    }

    /// Reload everything from the store. Returns the table's preferred width,
    /// or zero when there is nothing scheduled.
    pub fn refresh(&mut self) -> Result<u16> {
        self.transactions.clear();
        self.rows.clear();
        self.selection = None;

        let count = self.store.open_scheduled_count()?;
        if count < 1 {
            return Ok(0);
        }

        let ids = dedup_adjacent(self.store.open_scheduled_ids()?);

        let mut max_payee = 0u16;
        for id in ids {
            match self.store.scheduled_transaction(id) {
                Ok(Some(txn)) => {
                    max_payee = max_payee.max(text_width(&txn.payee));
                    self.transactions.push(txn);
                }
                Ok(None) => tracing::warn!(id, "scheduled transaction vanished, skipping"),
                Err(e) => tracing::warn!(id, "could not load scheduled transaction: {e}"),
            }
        }

        self.rows = self
            .transactions
            .iter()
            .map(|txn| ScheduleRow::format(txn, &self.locale))
            .collect();

        self.columns[0].width = max_payee.saturating_add(PAYEE_PADDING).clamp(COLUMN_MIN, COLUMN_MAX);
        Ok(self.preferred_width())
    }

    fn preferred_width(&self) -> u16 {
        let cols: u16 = self.columns.iter().map(|c| c.width).sum();
        let gaps = COLUMN_SPACING * (self.columns.len() as u16).saturating_sub(1);
        cols + gaps + TABLE_BORDER
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    pub fn transactions(&self) -> &[ScheduledTransaction] {
        &self.transactions
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub fn best_width(&self) -> u16 {
        self.best_width
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_showing_popup(&self) -> bool {
        self.showing_popup
    }

    /// Row the context menu was opened on.
    pub fn popup_row(&self) -> Option<usize> {
        self.popup_row
    }

    /// The view was put in a window: take focus and report the size the
    /// window should take, keeping its height.
    pub fn attached(&mut self, current_height: u16) -> (u16, u16) {
        self.focused = true;
        (self.best_width, current_height)
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.selection = index.filter(|i| *i < self.rows.len());
    }

    /// Delete the selected scheduled transaction. Nothing selected is a no-op.
    pub fn remove_selected(&mut self) -> Result<bool> {
        let Some(index) = self.selection else {
            return Ok(false);
        };
        let Some(txn) = self.transactions.get(index) else {
            return Ok(false);
        };
        self.store.remove_scheduled_transaction(txn.id)?;
        self.transactions.remove(index);
        self.rows.remove(index);
        self.selection = if self.rows.is_empty() {
            None
        } else {
            Some(index.min(self.rows.len() - 1))
        };
        Ok(true)
    }

    /// Open the one-item context menu unless it is already up.
    pub fn show_popup(&mut self) -> bool {
        if self.showing_popup || self.rows.is_empty() {
            return false;
        }
        self.showing_popup = true;
        self.popup_row = self.selection;
        true
    }

    pub fn close_context(&mut self) {
        self.showing_popup = false;
        self.popup_row = None;
    }

    fn move_selection(&mut self, down: bool) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        self.selection = Some(match (self.selection, down) {
            (None, _) => 0,
            (Some(i), true) => (i + 1).min(last),
            (Some(i), false) => i.saturating_sub(1),
        });
    }
}

impl<S: Store + ?Sized> UiEvents for ScheduleListView<'_, S> {
    fn on_key_press(&mut self, key: Key, _modifiers: Modifiers) -> Result<Option<UiMessage>> {
        if self.showing_popup {
            match key {
                Key::Enter => {
                    self.on_button_activated(UiMessage::RemoveItem)?;
                    self.on_button_activated(UiMessage::CloseContext)?;
                }
                Key::Esc => self.on_button_activated(UiMessage::CloseContext)?,
                _ => {}
            }
            return Ok(None);
        }
        match key {
            Key::Up => {
                self.move_selection(false);
                Ok(Some(UiMessage::Selection))
            }
            Key::Down => {
                self.move_selection(true);
                Ok(Some(UiMessage::Selection))
            }
            Key::Delete | Key::Char('d') => {
                self.on_button_activated(UiMessage::RemoveItem)?;
                Ok(None)
            }
            Key::Char('m') => {
                self.show_popup();
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn on_selection_changed(&mut self, index: Option<usize>, button: MouseButton) -> Result<()> {
        self.select(index);
        if button == MouseButton::Secondary && self.selection.is_some() {
            self.show_popup();
        }
        Ok(())
    }

    fn on_button_activated(&mut self, message: UiMessage) -> Result<()> {
        match message {
            UiMessage::RemoveItem => {
                self.remove_selected()?;
            }
            UiMessage::CloseContext => self.close_context(),
            _ => {}
        }
        Ok(())
    }
}
