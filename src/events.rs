//! Toolkit-neutral UI events and the messages components send to their owner.
//!
//! Components never talk to the terminal directly: the screen translates
//! crossterm input into these types and acts on the messages that come back.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton as CtMouseButton};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Tab,
    BackTab,
    Enter,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Esc,
}

impl Key {
    /// The character a key would insert, if it is in the printable range.
    pub fn printable(&self) -> Option<char> {
        match self {
            Key::Char(c) if (*c as u32) >= 32 && *c != '\u{7f}' => Some(*c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    /// Shortcut modifier (Ctrl in a terminal).
    pub command: bool,
    /// Alt.
    pub option: bool,
    /// Super/Meta.
    pub control: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        command: false,
        option: false,
        control: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        command: false,
        option: false,
        control: false,
    };

    pub const COMMAND: Modifiers = Modifiers {
        shift: false,
        command: true,
        option: false,
        control: false,
    };

    /// A bare shortcut chord: reserved for the application, never text.
    pub fn is_shortcut(&self) -> bool {
        self.command && !self.shift && !self.option && !self.control
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(m: KeyModifiers) -> Self {
        Modifiers {
            shift: m.contains(KeyModifiers::SHIFT),
            command: m.contains(KeyModifiers::CONTROL),
            option: m.contains(KeyModifiers::ALT),
            control: m.intersects(KeyModifiers::SUPER | KeyModifiers::META),
        }
    }
}

/// Translate a crossterm key event; keys we have no use for map to `None`.
pub fn key_from_event(event: &KeyEvent) -> Option<(Key, Modifiers)> {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Esc => Key::Esc,
        _ => return None,
    };
    Some((key, event.modifiers.into()))
}

/// What a key filter wants done with the keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// Let the field handle the key normally.
    Dispatch,
    /// The filter consumed the key.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiMessage {
    NextField,
    PreviousField,
    EnterNavigation,
    /// Show `text` as a selected suggestion starting at char offset `start`.
    CategoryAutocomplete { start: usize, text: String },
    RemoveItem,
    Selection,
    CloseContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Tertiary,
}

impl From<CtMouseButton> for MouseButton {
    fn from(b: CtMouseButton) -> Self {
        match b {
            CtMouseButton::Left => MouseButton::Primary,
            CtMouseButton::Right => MouseButton::Secondary,
            CtMouseButton::Middle => MouseButton::Tertiary,
        }
    }
}

/// The input capabilities a component exposes to whatever front end hosts it.
pub trait UiEvents {
    /// Handle a keystroke; may hand a notification back to the owner.
    fn on_key_press(&mut self, key: Key, modifiers: Modifiers) -> Result<Option<UiMessage>>;

    /// A row was selected (or the selection cleared) with the given button.
    fn on_selection_changed(&mut self, index: Option<usize>, button: MouseButton) -> Result<()>;

    /// A button or menu item carrying `message` was activated.
    fn on_button_activated(&mut self, message: UiMessage) -> Result<()>;
}
