use chrono::NaiveDate;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::open_store;
use crate::category_box::{
    CategoryBox, MissingCategoryChoice, MISSING_CATEGORY_TEXT, MISSING_CATEGORY_TITLE,
};
use crate::error::{PurseError, Result};
use crate::events::{key_from_event, Key, Modifiers, UiMessage};
use crate::models::{Account, NewTransaction, TransactionType};
use crate::settings::Settings;
use crate::store::{SqliteStore, Store};
use crate::tui::{
    run_window, Window, WindowAction, BORDER_STYLE, FOCUSED_STYLE, FOOTER_STYLE, GHOST_STYLE,
    HEADER_STYLE, STATUS_STYLE,
};

const PAYEE: usize = 0;
const AMOUNT: usize = 1;
const CATEGORY: usize = 2;
const MEMO: usize = 3;
const FIELD_LABELS: [&str; 4] = ["Payee", "Amount", "Category", "Memo"];

/// Transaction entry form for the current account.
pub struct EntryForm<'a> {
    store: &'a SqliteStore,
    account: Account,
    date: NaiveDate,
    payee: String,
    amount: String,
    category: CategoryBox<'a, SqliteStore>,
    memo: String,
    focused: usize,
    /// Three-way prompt shown when committing without a category.
    prompt: Option<usize>,
    status: Option<String>,
    saved: usize,
}

impl<'a> EntryForm<'a> {
    pub fn new(store: &'a SqliteStore, account: Account, enter_navigation: bool, date: NaiveDate) -> Self {
        Self {
            store,
            account,
            date,
            payee: String::new(),
            amount: String::new(),
            category: CategoryBox::new(store, enter_navigation),
            memo: String::new(),
            focused: PAYEE,
            prompt: None,
            status: None,
            saved: 0,
        }
    }

    pub fn saved(&self) -> usize {
        self.saved
    }

    fn text_field(&mut self, index: usize) -> Option<&mut String> {
        match index {
            PAYEE => Some(&mut self.payee),
            AMOUNT => Some(&mut self.amount),
            MEMO => Some(&mut self.memo),
            _ => None,
        }
    }

    fn next_field(&mut self) {
        self.focused = (self.focused + 1) % FIELD_LABELS.len();
    }

    fn previous_field(&mut self) {
        self.focused = (self.focused + FIELD_LABELS.len() - 1) % FIELD_LABELS.len();
    }

    fn commit(&mut self) -> Result<()> {
        if self.payee.trim().is_empty() {
            self.status = Some("Payee is required".into());
            self.focused = PAYEE;
            return Ok(());
        }
        if parse_amount(&self.amount).is_none() {
            self.status = Some(format!("Not an amount: '{}'", self.amount.trim()));
            self.focused = AMOUNT;
            return Ok(());
        }
        self.category.accept_ghost();
        if self.category.text().trim().is_empty() {
            self.prompt = Some(MissingCategoryChoice::ALL.len() - 1);
            return Ok(());
        }
        // Never asks: the field is not empty.
        self.finish(MissingCategoryChoice::Cancel)
    }

    fn finish(&mut self, choice: MissingCategoryChoice) -> Result<()> {
        if !self.category.validate(|| choice)? {
            self.status = Some("Transaction not saved".into());
            self.focused = CATEGORY;
            return Ok(());
        }
        let amount = parse_amount(&self.amount)
            .ok_or_else(|| PurseError::InvalidInput(format!("Not an amount: '{}'", self.amount)))?;
        let tx_type = self.category.kind().unwrap_or(TransactionType::Withdrawal);
        let signed = match tx_type {
            TransactionType::Deposit => amount.abs(),
            TransactionType::Withdrawal => -amount.abs(),
        };
        self.store.add_transaction(&NewTransaction {
            account_id: self.account.id,
            date: self.date,
            tx_type,
            payee: self.payee.trim().to_string(),
            amount: signed,
            category: self.category.text().to_string(),
            memo: self.memo.trim().to_string(),
        })?;
        tracing::info!(account = self.account.id, payee = %self.payee, "transaction entered");

        self.saved += 1;
        self.status = Some(format!(
            "Saved {} {} ({})",
            self.payee.trim(),
            self.category.text(),
            tx_type.code()
        ));
        self.payee.clear();
        self.amount.clear();
        self.memo.clear();
        self.category.clear();
        self.focused = PAYEE;
        Ok(())
    }

    fn handle_prompt_key(&mut self, key: Key, selected: usize) -> Result<()> {
        let count = MissingCategoryChoice::ALL.len();
        match key {
            Key::Left | Key::BackTab => self.prompt = Some((selected + count - 1) % count),
            Key::Right | Key::Tab => self.prompt = Some((selected + 1) % count),
            Key::Enter => {
                self.prompt = None;
                self.finish(MissingCategoryChoice::ALL[selected])?;
            }
            Key::Esc => {
                self.prompt = None;
                self.finish(MissingCategoryChoice::Cancel)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_message(&mut self, message: UiMessage) -> Result<()> {
        match message {
            UiMessage::NextField => self.next_field(),
            UiMessage::PreviousField => self.previous_field(),
            UiMessage::EnterNavigation => {
                if self.focused == MEMO {
                    self.commit()?;
                } else {
                    self.next_field();
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn key(&mut self, key: Key, modifiers: Modifiers) -> Result<WindowAction> {
        if let Some(selected) = self.prompt {
            self.handle_prompt_key(key, selected)?;
            return Ok(WindowAction::Continue);
        }
        self.status = None;

        if key == Key::Esc {
            return Ok(WindowAction::Close);
        }

        if self.focused == CATEGORY {
            match self.category.handle_key(key, modifiers) {
                Some(message) => self.handle_message(message)?,
                None if key == Key::Enter => self.commit()?,
                None => {}
            }
            return Ok(WindowAction::Continue);
        }

        match key {
            Key::Tab | Key::Down => self.next_field(),
            Key::BackTab | Key::Up => self.previous_field(),
            Key::Enter => {
                if self.focused == MEMO {
                    self.commit()?;
                } else {
                    self.next_field();
                }
            }
            Key::Backspace => {
                if let Some(field) = self.text_field(self.focused) {
                    field.pop();
                }
            }
            _ => {
                if let (Some(c), false) = (key.printable(), modifiers.is_shortcut()) {
                    if let Some(field) = self.text_field(self.focused) {
                        field.push(c);
                    }
                }
            }
        }
        Ok(WindowAction::Continue)
    }

    fn field_line(&self, index: usize) -> Line<'static> {
        let focused = index == self.focused && self.prompt.is_none();
        let label_style = if focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let value_style = if focused { FOCUSED_STYLE } else { Style::default() };
        let mut spans = vec![Span::styled(format!("   {:<10} ", FIELD_LABELS[index]), label_style)];
        match index {
            CATEGORY => {
                let text = self.category.text();
                let caret = if focused { Some(self.category.caret()) } else { None };
                match caret {
                    Some(at) if at < text.chars().count() => {
                        let before: String = text.chars().take(at).collect();
                        let under: String = text.chars().skip(at).take(1).collect();
                        let after: String = text.chars().skip(at + 1).collect();
                        spans.push(Span::styled(before, value_style));
                        spans.push(Span::styled(under, value_style.add_modifier(Modifier::REVERSED)));
                        spans.push(Span::styled(after, value_style));
                    }
                    _ => {
                        spans.push(Span::styled(text.to_string(), value_style));
                        if let Some(ghost) = self.category.ghost() {
                            spans.push(Span::styled(ghost.to_string(), GHOST_STYLE));
                        } else if focused {
                            spans.push(Span::styled("_", value_style));
                        }
                    }
                }
            }
            PAYEE => spans.push(Span::styled(self.payee.clone(), value_style)),
            AMOUNT => spans.push(Span::styled(self.amount.clone(), value_style)),
            _ => spans.push(Span::styled(self.memo.clone(), value_style)),
        }
        if focused && index != CATEGORY {
            spans.push(Span::styled("_", value_style));
        }
        Line::from(spans)
    }
}

fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | ' '))
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl Window for EntryForm<'_> {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [header_area, sep, content_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(format!(" New transaction: {}", self.account.name)).style(HEADER_STYLE),
            header_area,
        );
        let sep_line = "\u{2501}".repeat(area.width as usize);
        frame.render_widget(Paragraph::new(sep_line.as_str()).style(BORDER_STYLE), sep);

        let mut lines = vec![
            Line::from(""),
            Line::from(format!("   {:<10} {}", "Date", self.date.format("%Y-%m-%d"))),
        ];
        lines.extend((0..FIELD_LABELS.len()).map(|i| self.field_line(i)));
        if let Some(msg) = &self.status {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(format!("   {msg}"), STATUS_STYLE)));
        }

        let [form_area, prompt_area] =
            Layout::vertical([Constraint::Length(lines.len() as u16), Constraint::Fill(1)])
                .areas(content_area);
        frame.render_widget(Paragraph::new(lines), form_area);

        if let Some(selected) = self.prompt {
            let buttons: Vec<Span> = MissingCategoryChoice::ALL
                .iter()
                .enumerate()
                .flat_map(|(i, choice)| {
                    let style = if i == selected {
                        Style::default().add_modifier(Modifier::REVERSED)
                    } else {
                        Style::default()
                    };
                    [Span::styled(format!(" {} ", choice.label()), style), Span::raw("  ")]
                })
                .collect();
            let prompt = Paragraph::new(vec![
                Line::from(MISSING_CATEGORY_TEXT),
                Line::from(""),
                Line::from(buttons),
            ])
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(STATUS_STYLE)
                    .title(format!(" {MISSING_CATEGORY_TITLE} ")),
            );
            frame.render_widget(prompt, prompt_area);
        }

        let hints = if self.prompt.is_some() {
            " Left/Right=choose  Enter=confirm  Esc=cancel"
        } else {
            " Tab=next field  Shift-Tab=previous  Right=accept suggestion  Enter=save  Esc=quit"
        };
        frame.render_widget(Paragraph::new(hints).style(FOOTER_STYLE), hints_area);
    }

    fn handle_key(&mut self, event: KeyEvent) -> Result<WindowAction> {
        match key_from_event(&event) {
            Some((key, modifiers)) => self.key(key, modifiers),
            None => Ok(WindowAction::Continue),
        }
    }
}

pub fn run(settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;
    let account = store.current_account()?.ok_or_else(|| {
        PurseError::Other("No account selected. Run `purse accounts select <name>` first.".into())
    })?;
    if !account.is_open() {
        return Err(PurseError::Other(format!("Account '{}' is closed", account.name)));
    }
    let today = chrono::Local::now().date_naive();
    let mut form = EntryForm::new(&store, account, settings.enter_navigation, today);
    run_window(&mut form)?;
    println!("Entered {} transaction(s).", form.saved());
    Ok(())
}
