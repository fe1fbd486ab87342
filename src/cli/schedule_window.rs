use std::sync::mpsc::{channel, Receiver, Sender};

use crossterm::event::{KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect, Size},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::error::Result;
use crate::events::{key_from_event, Key, MouseButton, UiEvents, UiMessage};
use crate::schedule::{button_width, ScheduleListView, REMOVE_LABEL, WINDOW_TITLE};
use crate::store::Store;
use crate::tui::{
    centered, contains, Window, WindowAction, BORDER_STYLE, FOOTER_STYLE, HEADER_STYLE,
    SELECTED_STYLE,
};

const HELP_HINT: &str = " Up/Down=select  d=remove  m/right-click=menu  Esc=close";
const MENU_WIDTH: u16 = 12;
const MENU_HEIGHT: u16 = 3;

/// One-item popup menu. Dropping it tells the owning view the menu is gone.
pub struct ScheduleContext {
    area: Rect,
    target: Sender<UiMessage>,
}

impl ScheduleContext {
    pub fn new(area: Rect, target: Sender<UiMessage>) -> Self {
        Self { area, target }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    fn draw(&self, frame: &mut Frame) {
        frame.render_widget(Clear, self.area);
        let item = Paragraph::new(Line::from(Span::styled(
            format!(" {REMOVE_LABEL:<width$}", width = (MENU_WIDTH - 3) as usize),
            SELECTED_STYLE,
        )))
        .block(Block::default().borders(Borders::ALL).border_style(BORDER_STYLE));
        frame.render_widget(item, self.area);
    }
}

impl Drop for ScheduleContext {
    fn drop(&mut self) {
        let _ = self.target.send(UiMessage::CloseContext);
    }
}

/// Window hosting a single [`ScheduleListView`].
pub struct ScheduleListWindow<'a, S: Store + ?Sized> {
    view: ScheduleListView<'a, S>,
    table_state: TableState,
    context: Option<ScheduleContext>,
    context_tx: Sender<UiMessage>,
    context_rx: Receiver<UiMessage>,
    /// Preferred size; set once the view is attached.
    size: Option<(u16, u16)>,
    // Hit-test areas from the last draw.
    body_area: Rect,
    remove_area: Rect,
    menu_column: Option<u16>,
}

impl<'a, S: Store + ?Sized> ScheduleListWindow<'a, S> {
    pub fn new(view: ScheduleListView<'a, S>) -> Self {
        let (context_tx, context_rx) = channel();
        Self {
            view,
            table_state: TableState::default(),
            context: None,
            context_tx,
            context_rx,
            size: None,
            body_area: Rect::default(),
            remove_area: Rect::default(),
            menu_column: None,
        }
    }

    pub fn view(&self) -> &ScheduleListView<'a, S> {
        &self.view
    }

    /// Deliver pending closing notifications, then create or tear down the
    /// popup to match the view's state.
    fn sync_context(&mut self) -> Result<()> {
        self.deliver_context_messages()?;
        if self.view.is_showing_popup() && self.context.is_none() {
            let area = self.menu_area();
            self.context = Some(ScheduleContext::new(area, self.context_tx.clone()));
        } else if !self.view.is_showing_popup() && self.context.take().is_some() {
            self.deliver_context_messages()?;
        }
        Ok(())
    }

    fn deliver_context_messages(&mut self) -> Result<()> {
        while let Ok(message) = self.context_rx.try_recv() {
            self.view.on_button_activated(message)?;
        }
        Ok(())
    }

    fn close_context(&mut self) -> Result<()> {
        self.context = None;
        self.menu_column = None;
        self.sync_context()
    }

    fn menu_area(&self) -> Rect {
        let row = self.view.popup_row().unwrap_or(0);
        let visible = row.saturating_sub(self.table_state.offset()) as u16;
        let x = self
            .menu_column
            .unwrap_or(self.body_area.x)
            .saturating_add(2);
        let y = self.body_area.y.saturating_add(visible).saturating_add(1);
        Rect::new(x, y, MENU_WIDTH, MENU_HEIGHT)
    }

    fn row_at(&self, row: u16) -> Option<usize> {
        if row < self.body_area.y {
            return None;
        }
        Some(self.table_state.offset() + (row - self.body_area.y) as usize)
    }
}

impl<S: Store + ?Sized> Window for ScheduleListWindow<'_, S> {
    fn attached(&mut self, size: Size) {
        self.size = Some(self.view.attached(size.height));
    }

    fn draw(&mut self, frame: &mut Frame) {
        let screen = frame.area();
        let (width, height) = self.size.unwrap_or((screen.width, screen.height));
        let area = centered(screen, width, height);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(BORDER_STYLE)
            .title(Span::styled(format!(" {WINDOW_TITLE} "), HEADER_STYLE));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [table_area, buttons_area, hints_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let columns = self.view.columns();
        let header = Row::new(columns.iter().map(|c| Cell::from(c.title))).style(
            Style::default()
                .fg(ratatui::style::Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );
        let rows = self
            .view
            .rows()
            .iter()
            .map(|r| Row::new(r.cells().map(|s| Cell::from(s.to_string()))));
        let widths: Vec<Constraint> = columns.iter().map(|c| Constraint::Length(c.width)).collect();

        if self.view.rows().is_empty() {
            frame.render_widget(
                Paragraph::new(vec![
                    Line::from(""),
                    Line::from("   No scheduled transactions."),
                ]),
                table_area,
            );
        } else {
            let table = Table::new(rows, widths)
                .header(header)
                .column_spacing(1)
                .row_highlight_style(SELECTED_STYLE);
            self.table_state.select(self.view.selection());
            frame.render_stateful_widget(table, table_area, &mut self.table_state);
        }
        self.body_area = Rect {
            y: table_area.y + 1,
            height: table_area.height.saturating_sub(1),
            ..table_area
        };

        let label = format!("[ {REMOVE_LABEL} ]");
        let [remove_area] = Layout::horizontal([Constraint::Length(button_width(REMOVE_LABEL))])
            .flex(Flex::End)
            .areas(buttons_area);
        let button_style = if self.view.selection().is_some() {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            FOOTER_STYLE
        };
        frame.render_widget(Paragraph::new(label).style(button_style), remove_area);
        self.remove_area = remove_area;

        frame.render_widget(Paragraph::new(HELP_HINT).style(FOOTER_STYLE), hints_area);

        if let Some(context) = &self.context {
            context.draw(frame);
        }
    }

    fn handle_key(&mut self, event: KeyEvent) -> Result<WindowAction> {
        let Some((key, modifiers)) = key_from_event(&event) else {
            return Ok(WindowAction::Continue);
        };

        if self.context.is_some() {
            match key {
                Key::Enter => {
                    self.view.on_button_activated(UiMessage::RemoveItem)?;
                    self.close_context()?;
                }
                Key::Esc => self.close_context()?,
                _ => {}
            }
            return Ok(WindowAction::Continue);
        }

        match key {
            Key::Esc | Key::Char('q') => return Ok(WindowAction::Close),
            _ => {
                self.view.on_key_press(key, modifiers)?;
            }
        }
        self.sync_context()?;
        Ok(WindowAction::Continue)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<WindowAction> {
        match mouse.kind {
            MouseEventKind::Down(button) => {
                if let Some(context) = &self.context {
                    let on_item = contains(context.area(), mouse.column, mouse.row);
                    if on_item && MouseButton::from(button) == MouseButton::Primary {
                        self.view.on_button_activated(UiMessage::RemoveItem)?;
                    }
                    self.close_context()?;
                    return Ok(WindowAction::Continue);
                }

                if contains(self.remove_area, mouse.column, mouse.row) {
                    self.view.on_button_activated(UiMessage::RemoveItem)?;
                } else if contains(self.body_area, mouse.column, mouse.row) {
                    if let Some(index) = self.row_at(mouse.row) {
                        if index < self.view.rows().len() {
                            self.menu_column = Some(mouse.column);
                            self.view.on_selection_changed(Some(index), button.into())?;
                        }
                    }
                }
            }
            MouseEventKind::ScrollDown if self.context.is_none() => {
                self.view.on_key_press(Key::Down, Default::default())?;
            }
            MouseEventKind::ScrollUp if self.context.is_none() => {
                self.view.on_key_press(Key::Up, Default::default())?;
            }
            _ => {}
        }
        self.sync_context()?;
        Ok(WindowAction::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use crate::models::Interval;
    use crate::testing::{scheduled, FakeStore};
    use crossterm::event::{KeyCode, KeyModifiers, MouseButton as CtMouseButton};

    fn store() -> FakeStore {
        FakeStore {
            records: vec![
                scheduled(1, "Landlord", -900.0, 0, Interval::Monthly),
                scheduled(2, "Gym", -30.0, 6, Interval::Weekly),
            ],
            id_stream: vec![1, 2],
            ..FakeStore::default()
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(button: CtMouseButton, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(button),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn window(store: &FakeStore) -> ScheduleListWindow<'_, FakeStore> {
        let view = ScheduleListView::new(store, Locale::default()).unwrap();
        let mut window = ScheduleListWindow::new(view);
        window.attached(Size::new(120, 30));
        window.body_area = Rect::new(0, 3, 100, 10);
        window.remove_area = Rect::new(80, 20, 10, 1);
        window
    }

    #[test]
    fn test_empty_list_still_opens_with_notice() {
        let store = FakeStore::default();
        let mut w = window(&store);
        let mut terminal = ratatui::Terminal::new(ratatui::backend::TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| w.draw(frame)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("No scheduled transactions."));
        assert!(screen.contains(WINDOW_TITLE));
    }

    #[test]
    fn test_attached_focuses_view() {
        let store = store();
        let w = window(&store);
        assert!(w.view().is_focused());
        assert_eq!(w.size.unwrap().1, 30);
    }

    #[test]
    fn test_escape_closes_window() {
        let store = store();
        let mut w = window(&store);
        assert!(matches!(w.handle_key(key(KeyCode::Esc)).unwrap(), WindowAction::Close));
    }

    #[test]
    fn test_right_click_opens_context_and_escape_closes_it() {
        let store = store();
        let mut w = window(&store);
        w.handle_mouse(click(CtMouseButton::Right, 5, 4)).unwrap();
        assert_eq!(w.view().selection(), Some(1));
        assert!(w.context.is_some());
        assert!(w.view().is_showing_popup());

        // Escape dismisses the menu, not the window.
        assert!(matches!(w.handle_key(key(KeyCode::Esc)).unwrap(), WindowAction::Continue));
        assert!(w.context.is_none());
        assert!(!w.view().is_showing_popup());
    }

    #[test]
    fn test_context_menu_click_removes_row() {
        let store = store();
        let mut w = window(&store);
        w.handle_mouse(click(CtMouseButton::Right, 5, 3)).unwrap();
        let area = w.context.as_ref().unwrap().area();
        w.handle_mouse(click(CtMouseButton::Left, area.x + 1, area.y + 1)).unwrap();
        assert_eq!(*store.deletes.borrow(), vec![1]);
        assert_eq!(w.view().rows().len(), 1);
        assert!(!w.view().is_showing_popup());
    }

    #[test]
    fn test_click_outside_menu_only_closes_it() {
        let store = store();
        let mut w = window(&store);
        w.handle_mouse(click(CtMouseButton::Right, 5, 3)).unwrap();
        w.handle_mouse(click(CtMouseButton::Left, 119, 29)).unwrap();
        assert!(store.deletes.borrow().is_empty());
        assert!(!w.view().is_showing_popup());
    }

    #[test]
    fn test_remove_button() {
        let store = store();
        let mut w = window(&store);
        w.handle_mouse(click(CtMouseButton::Left, 80, 20)).unwrap();
        assert!(store.deletes.borrow().is_empty());
        w.handle_mouse(click(CtMouseButton::Left, 5, 3)).unwrap();
        w.handle_mouse(click(CtMouseButton::Left, 81, 20)).unwrap();
        assert_eq!(*store.deletes.borrow(), vec![1]);
    }

    #[test]
    fn test_click_below_last_row_is_ignored() {
        let store = store();
        let mut w = window(&store);
        w.handle_mouse(click(CtMouseButton::Right, 5, 9)).unwrap();
        assert_eq!(w.view().selection(), None);
        assert!(w.context.is_none());
    }
}
