use std::io::stdout;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEvent,
};
use crossterm::execute;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::Frame;

use crate::error::Result;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const BORDER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

pub const FOCUSED_STYLE: Style = Style::new().fg(Color::Cyan);

/// Autocomplete suggestion shown after the caret.
pub const GHOST_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Gray);

pub const STATUS_STYLE: Style = Style::new().fg(Color::Yellow);

pub enum WindowAction {
    Continue,
    Close,
}

/// A full-screen interactive screen driven by [`run_window`].
pub trait Window {
    /// Called once with the terminal size before the first draw.
    fn attached(&mut self, _size: Size) {}
    fn draw(&mut self, frame: &mut Frame);
    fn handle_key(&mut self, key: KeyEvent) -> Result<WindowAction>;
    fn handle_mouse(&mut self, _mouse: MouseEvent) -> Result<WindowAction> {
        Ok(WindowAction::Continue)
    }
}

pub fn contains(area: Rect, column: u16, row: u16) -> bool {
    area.contains(Position::new(column, row))
}

/// Center a `width` x `height` box inside `area`, clipped to it.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Run an interactive window with mouse support. Sets up the terminal, event
/// loop, and panic hook, then restores the terminal on exit.
pub fn run_window(window: &mut dyn Window) -> Result<()> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableMouseCapture)?;

    let result: Result<()> = (|| {
        window.attached(terminal.size()?);
        loop {
            terminal.draw(|frame| window.draw(frame))?;

            let action = match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c')
                    {
                        return Ok(());
                    }
                    window.handle_key(key)?
                }
                Event::Mouse(mouse) => window.handle_mouse(mouse)?,
                _ => WindowAction::Continue,
            };
            if let WindowAction::Close = action {
                return Ok(());
            }
        }
    })();

    let _ = execute!(stdout(), DisableMouseCapture);
    drop(terminal);
    ratatui::restore();
    result
}
