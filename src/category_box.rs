use crate::error::Result;
use crate::events::{FilterResult, Key, Modifiers, MouseButton, UiEvents, UiMessage};
use crate::locale::capitalize_each_word;
use crate::models::TransactionType;
use crate::store::Store;

pub const CATEGORY_CHAR_LIMIT: usize = 32;
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Answer to "this transaction has no category, what is it?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingCategoryChoice {
    Income,
    Spending,
    Cancel,
}

impl MissingCategoryChoice {
    pub const ALL: [MissingCategoryChoice; 3] = [
        MissingCategoryChoice::Income,
        MissingCategoryChoice::Spending,
        MissingCategoryChoice::Cancel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MissingCategoryChoice::Income => "Income",
            MissingCategoryChoice::Spending => "Spending",
            MissingCategoryChoice::Cancel => "Cancel",
        }
    }
}

pub const MISSING_CATEGORY_TITLE: &str = "Category is missing";
pub const MISSING_CATEGORY_TEXT: &str = "Do you really want to add this transaction without a category? \
Even then, you need to select a transaction type, 'income' or 'spending'.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome {
    pub result: FilterResult,
    pub message: Option<UiMessage>,
}

impl KeyOutcome {
    fn dispatch() -> Self {
        Self {
            result: FilterResult::Dispatch,
            message: None,
        }
    }

    fn skip(message: UiMessage) -> Self {
        Self {
            result: FilterResult::Skip,
            message: Some(message),
        }
    }
}

/// Category text field. Typing at the end of the field offers the rest of a
/// matching category as selected "ghost" text; committing normalizes the
/// name and works out whether the transaction is a deposit or a withdrawal.
pub struct CategoryBox<'a, S: Store + ?Sized> {
    store: &'a S,
    text: String,
    /// Caret position in chars.
    caret: usize,
    ghost: Option<String>,
    kind: Option<TransactionType>,
    enter_navigation: bool,
}

impl<'a, S: Store + ?Sized> CategoryBox<'a, S> {
    pub fn new(store: &'a S, enter_navigation: bool) -> Self {
        Self {
            store,
            text: String::new(),
            caret: 0,
            ghost: None,
            kind: None,
            enter_navigation,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ghost(&self) -> Option<&str> {
        self.ghost.as_deref()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Deposit/withdrawal marker set by [`validate`](Self::validate).
    pub fn kind(&self) -> Option<TransactionType> {
        self.kind
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.chars().take(CATEGORY_CHAR_LIMIT).collect();
        self.caret = self.len();
        self.ghost = None;
    }

    pub fn clear(&mut self) {
        self.set_text("");
        self.kind = None;
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Keep the suggestion as real text.
    pub fn accept_ghost(&mut self) {
        if let Some(ghost) = self.ghost.take() {
            let room = CATEGORY_CHAR_LIMIT.saturating_sub(self.len());
            self.text.extend(ghost.chars().take(room));
            self.caret = self.len();
        }
    }

    /// Decide what happens to a keystroke before the field sees it.
    pub fn filter_key(&mut self, key: Key, modifiers: Modifiers) -> KeyOutcome {
        match key {
            Key::Tab if modifiers.shift => return KeyOutcome::skip(UiMessage::PreviousField),
            Key::Tab => return KeyOutcome::skip(UiMessage::NextField),
            Key::BackTab => return KeyOutcome::skip(UiMessage::PreviousField),
            Key::Enter if self.enter_navigation => {
                return KeyOutcome::skip(UiMessage::EnterNavigation)
            }
            _ => {}
        }

        let Some(c) = key.printable() else {
            return KeyOutcome::dispatch();
        };
        if modifiers.is_shortcut() {
            return KeyOutcome::dispatch();
        }

        let account = match self.store.current_account() {
            Ok(Some(account)) => account,
            Ok(None) => return KeyOutcome::dispatch(),
            Err(e) => {
                tracing::warn!("current account lookup failed: {e}");
                return KeyOutcome::dispatch();
            }
        };

        let mut outcome = KeyOutcome::dispatch();
        if self.caret == self.len() {
            self.ghost = None;
            let mut pending = self.text.clone();
            pending.push(c);
            match self.store.autocomplete_category(&account, &pending) {
                Ok(suggestion) if !suggestion.is_empty() => {
                    outcome.message = Some(UiMessage::CategoryAutocomplete {
                        start: self.len() + 1,
                        text: suggestion,
                    });
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(input = %pending, "category autocomplete failed: {e}"),
            }
        }
        outcome
    }

    /// Default text-field editing.
    pub fn dispatch_key(&mut self, key: Key, modifiers: Modifiers) {
        match key {
            Key::Char(_) if modifiers.is_shortcut() => {}
            Key::Char(_) => {
                if let Some(c) = key.printable() {
                    if self.len() < CATEGORY_CHAR_LIMIT {
                        let at = self.byte_index(self.caret);
                        self.text.insert(at, c);
                        self.caret += 1;
                    }
                }
            }
            Key::Backspace => {
                if self.ghost.take().is_none() && self.caret > 0 {
                    let at = self.byte_index(self.caret - 1);
                    self.text.remove(at);
                    self.caret -= 1;
                }
            }
            Key::Delete => {
                if self.ghost.take().is_none() && self.caret < self.len() {
                    let at = self.byte_index(self.caret);
                    self.text.remove(at);
                }
            }
            Key::Left => {
                self.ghost = None;
                self.caret = self.caret.saturating_sub(1);
            }
            Key::Right => {
                if self.ghost.is_some() {
                    self.accept_ghost();
                } else {
                    self.caret = (self.caret + 1).min(self.len());
                }
            }
            Key::Home => {
                self.ghost = None;
                self.caret = 0;
            }
            Key::End => {
                self.accept_ghost();
                self.caret = self.len();
            }
            _ => {}
        }
    }

    /// Act on a message addressed to the field itself.
    pub fn apply(&mut self, message: &UiMessage) {
        if let UiMessage::CategoryAutocomplete { start, text } = message {
            // The typed character may have been refused by the length limit.
            if *start == self.len() && self.caret == self.len() {
                self.ghost = Some(text.clone());
            }
        }
    }

    /// Filter, edit, and apply autocompletion. Navigation requests are
    /// returned for the owner to act on.
    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> Option<UiMessage> {
        let outcome = self.filter_key(key, modifiers);
        if outcome.result == FilterResult::Dispatch {
            self.dispatch_key(key, modifiers);
        }
        match outcome.message {
            Some(msg @ UiMessage::CategoryAutocomplete { .. }) => {
                self.apply(&msg);
                None
            }
            Some(msg) => {
                self.accept_ghost();
                Some(msg)
            }
            None => None,
        }
    }

    /// Check the field before a transaction is saved. `ask` is consulted only
    /// when the field is empty. Returns `Ok(false)` when the user backs out.
    pub fn validate<F>(&mut self, ask: F) -> Result<bool>
    where
        F: FnOnce() -> MissingCategoryChoice,
    {
        self.accept_ghost();
        if self.text.trim().is_empty() {
            return Ok(match ask() {
                MissingCategoryChoice::Income => {
                    self.kind = Some(TransactionType::Deposit);
                    self.set_text(UNCATEGORIZED);
                    true
                }
                MissingCategoryChoice::Spending => {
                    self.kind = Some(TransactionType::Withdrawal);
                    self.set_text(UNCATEGORIZED);
                    true
                }
                MissingCategoryChoice::Cancel => false,
            });
        }

        let category = capitalize_each_word(self.text.trim());
        self.set_text(&category);
        // Capitalizing can lengthen the text past the limit; use what was kept.
        let stored = self.text.clone();
        self.set_type_from_category(&stored)?;
        Ok(true)
    }

    /// First category (by name) matching case-insensitively decides the
    /// marker. Unknown names leave it untouched.
    pub fn set_type_from_category(&mut self, category: &str) -> Result<()> {
        let wanted = category.to_lowercase();
        if let Some(found) = self
            .store
            .categories()?
            .into_iter()
            .find(|c| c.name.to_lowercase() == wanted)
        {
            self.kind = Some(TransactionType::from_category_kind(found.kind));
        }
        Ok(())
    }
}

impl<S: Store + ?Sized> UiEvents for CategoryBox<'_, S> {
    fn on_key_press(&mut self, key: Key, modifiers: Modifiers) -> Result<Option<UiMessage>> {
        Ok(self.handle_key(key, modifiers))
    }

    fn on_selection_changed(&mut self, _index: Option<usize>, _button: MouseButton) -> Result<()> {
        Ok(())
    }

    fn on_button_activated(&mut self, message: UiMessage) -> Result<()> {
        self.apply(&message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryKind};
    use crate::testing::{account, FakeStore};

    fn store_with_account() -> FakeStore {
        FakeStore {
            account: Some(account(1, "Checking")),
            categories: vec![
                Category {
                    name: "Groceries".into(),
                    kind: CategoryKind::Spending,
                },
                Category {
                    name: "Salary".into(),
                    kind: CategoryKind::Deposit,
                },
            ],
            ..FakeStore::default()
        }
    }

    fn type_str<S: Store>(field: &mut CategoryBox<'_, S>, s: &str) {
        for c in s.chars() {
            field.handle_key(Key::Char(c), Modifiers::NONE);
        }
    }

    #[test]
    fn test_tab_requests_next_field_and_is_consumed() {
        let store = store_with_account();
        let mut field = CategoryBox::new(&store, false);
        let outcome = field.filter_key(Key::Tab, Modifiers::NONE);
        assert_eq!(outcome.result, FilterResult::Skip);
        assert_eq!(outcome.message, Some(UiMessage::NextField));
        assert_eq!(field.handle_key(Key::Tab, Modifiers::NONE), Some(UiMessage::NextField));
        assert_eq!(field.text(), "");
    }

    #[test]
    fn test_shift_tab_requests_previous_field() {
        let store = store_with_account();
        let mut field = CategoryBox::new(&store, false);
        let outcome = field.filter_key(Key::Tab, Modifiers::SHIFT);
        assert_eq!(outcome.message, Some(UiMessage::PreviousField));
        let outcome = field.filter_key(Key::BackTab, Modifiers::SHIFT);
        assert_eq!(outcome, KeyOutcome::skip(UiMessage::PreviousField));
    }

    #[test]
    fn test_enter_navigation_only_when_enabled() {
        let store = store_with_account();
        let mut plain = CategoryBox::new(&store, false);
        assert_eq!(plain.filter_key(Key::Enter, Modifiers::NONE), KeyOutcome::dispatch());
        let mut nav = CategoryBox::new(&store, true);
        assert_eq!(
            nav.filter_key(Key::Enter, Modifiers::NONE),
            KeyOutcome::skip(UiMessage::EnterNavigation)
        );
    }

    #[test]
    fn test_control_chars_and_shortcuts_pass_through() {
        let store = store_with_account();
        let mut field = CategoryBox::new(&store, false);
        field.set_text("Gr");
        assert_eq!(field.filter_key(Key::Char('\u{8}'), Modifiers::NONE), KeyOutcome::dispatch());
        assert_eq!(field.filter_key(Key::Char('o'), Modifiers::COMMAND), KeyOutcome::dispatch());
        assert!(field.ghost().is_none());
    }

    #[test]
    fn test_autocomplete_offers_rest_of_category() {
        let store = store_with_account();
        let mut field = CategoryBox::new(&store, false);
        field.set_text("Gr");
        let outcome = field.filter_key(Key::Char('o'), Modifiers::NONE);
        assert_eq!(outcome.result, FilterResult::Dispatch);
        assert_eq!(
            outcome.message,
            Some(UiMessage::CategoryAutocomplete {
                start: "Gro".len(),
                text: "ceries".into()
            })
        );
    }

    #[test]
    fn test_typed_char_lands_before_ghost_text() {
        let store = store_with_account();
        let mut field = CategoryBox::new(&store, false);
        type_str(&mut field, "Gro");
        assert_eq!(field.text(), "Gro");
        assert_eq!(field.ghost(), Some("ceries"));
        field.handle_key(Key::Right, Modifiers::NONE);
        assert_eq!(field.text(), "Groceries");
        assert!(field.ghost().is_none());
    }

    #[test]
    fn test_backspace_drops_ghost_first() {
        let store = store_with_account();
        let mut field = CategoryBox::new(&store, false);
        type_str(&mut field, "Sal");
        assert_eq!(field.ghost(), Some("ary"));
        field.handle_key(Key::Backspace, Modifiers::NONE);
        assert_eq!(field.text(), "Sal");
        assert!(field.ghost().is_none());
    }

    #[test]
    fn test_no_account_means_no_autocomplete() {
        let store = FakeStore {
            account: None,
            ..store_with_account()
        };
        let mut field = CategoryBox::new(&store, false);
        type_str(&mut field, "Gro");
        assert_eq!(field.text(), "Gro");
        assert!(field.ghost().is_none());
        assert!(store.autocomplete_calls.borrow().is_empty());
    }

    #[test]
    fn test_no_lookup_when_caret_is_not_at_end() {
        let store = store_with_account();
        let mut field = CategoryBox::new(&store, false);
        field.set_text("Gceries");
        field.handle_key(Key::Home, Modifiers::NONE);
        field.handle_key(Key::Right, Modifiers::NONE);
        field.handle_key(Key::Char('r'), Modifiers::NONE);
        field.handle_key(Key::Char('o'), Modifiers::NONE);
        assert_eq!(field.text(), "Groceries");
        assert!(store.autocomplete_calls.borrow().is_empty());
    }

    #[test]
    fn test_character_limit() {
        let store = FakeStore::default();
        let mut field = CategoryBox::new(&store, false);
        type_str(&mut field, &"x".repeat(40));
        assert_eq!(field.text().chars().count(), CATEGORY_CHAR_LIMIT);
    }

    #[test]
    fn test_validate_known_category_sets_type() {
        let store = store_with_account();
        let mut field = CategoryBox::new(&store, false);
        field.set_text("groceries");
        assert!(field.validate(|| panic!("should not ask")).unwrap());
        assert_eq!(field.text(), "Groceries");
        assert_eq!(field.kind(), Some(TransactionType::Withdrawal));

        field.set_text("SALARY");
        assert!(field.validate(|| MissingCategoryChoice::Cancel).unwrap());
        assert_eq!(field.kind(), Some(TransactionType::Deposit));
    }

    #[test]
    fn test_validate_unknown_category_leaves_type_unset() {
        let store = store_with_account();
        let mut field = CategoryBox::new(&store, false);
        field.set_text("pet food");
        assert!(field.validate(|| MissingCategoryChoice::Cancel).unwrap());
        assert_eq!(field.text(), "Pet Food");
        assert_eq!(field.kind(), None);
    }

    #[test]
    fn test_validate_empty_spending() {
        let store = store_with_account();
        let mut field = CategoryBox::new(&store, false);
        assert!(field.validate(|| MissingCategoryChoice::Spending).unwrap());
        assert_eq!(field.text(), UNCATEGORIZED);
        assert_eq!(field.kind(), Some(TransactionType::Withdrawal));
        assert_eq!(field.kind().unwrap().code(), "ATM");
    }

    #[test]
    fn test_validate_empty_income() {
        let store = store_with_account();
        let mut field = CategoryBox::new(&store, false);
        assert!(field.validate(|| MissingCategoryChoice::Income).unwrap());
        assert_eq!(field.text(), UNCATEGORIZED);
        assert_eq!(field.kind().unwrap().code(), "DEP");
    }

    #[test]
    fn test_validate_empty_cancel_leaves_field_alone() {
        let store = store_with_account();
        let mut field = CategoryBox::new(&store, false);
        assert!(!field.validate(|| MissingCategoryChoice::Cancel).unwrap());
        assert_eq!(field.text(), "");
        assert_eq!(field.kind(), None);
    }

    #[test]
    fn test_validate_types_the_text_kept_after_capitalizing() {
        // "ß" capitalizes to "SS", pushing the last char past the limit.
        let kept = format!("SS{}", "\u{df}".repeat(CATEGORY_CHAR_LIMIT - 2));
        let store = FakeStore {
            categories: vec![Category {
                name: kept.clone(),
                kind: CategoryKind::Deposit,
            }],
            ..FakeStore::default()
        };
        let mut field = CategoryBox::new(&store, false);
        field.set_text(&"\u{df}".repeat(CATEGORY_CHAR_LIMIT));
        assert!(field.validate(|| MissingCategoryChoice::Cancel).unwrap());
        assert_eq!(field.text(), kept);
        assert_eq!(field.kind(), Some(TransactionType::Deposit));
    }

    #[test]
    fn test_validate_keeps_ghost_text() {
        let store = store_with_account();
        let mut field = CategoryBox::new(&store, false);
        type_str(&mut field, "gro");
        assert!(field.validate(|| MissingCategoryChoice::Cancel).unwrap());
        assert_eq!(field.text(), "Groceries");
        assert_eq!(field.kind(), Some(TransactionType::Withdrawal));
    }
}
