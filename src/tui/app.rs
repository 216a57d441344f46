//! Main application logic for the terminal user interface.
//!
//! The screen is a contact list above a result box and a command box. Every
//! change to the address book goes through `Logic::execute` on the typed
//! command; the keyboard only edits the command box, recalls history and
//! scrolls the list.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::command::ALL_USAGES;
use crate::logic::Logic;
use crate::person::Person;
use crate::tui::{
    colors::{tag_color, DARK_GREEN, ERROR_RED},
    enums::{AppState, Outcome},
    input::InputField,
    utils::centered_rect,
};

const WELCOME: &str = "Welcome! Type a command below and press Enter. Try `help` to see every command.";

/// First visible column of the command box, keeping the cursor inside a
/// box `width` columns wide.
fn input_offset(cursor: usize, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    cursor.saturating_sub(width - 1)
}

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    logic: Logic,
    input: InputField,
    result_text: String,
    outcome: Outcome,
    list_state: ListState,
    should_quit: bool,
}

impl App {
    pub fn new(logic: Logic) -> Self {
        let mut list_state = ListState::default();
        if !logic.filtered_persons().is_empty() {
            list_state.select(Some(0));
        }
        App {
            state: AppState::ContactList,
            logic,
            input: InputField::new(),
            result_text: WELCOME.to_string(),
            outcome: Outcome::Success,
            list_state,
            should_quit: false,
        }
    }

    /// Run the command box contents through the command pipeline.
    fn submit(&mut self) {
        let line = self.input.value.clone();
        if line.trim().is_empty() {
            return;
        }
        match self.logic.execute(&line) {
            Ok(result) => {
                self.result_text = result.feedback;
                self.outcome = Outcome::Success;
                self.input.clear();
                if result.show_help {
                    self.state = AppState::Help;
                }
                if result.exit {
                    self.should_quit = true;
                }
            }
            Err(e) => {
                // Keep the text so the user can fix it.
                self.result_text = e.to_string();
                self.outcome = Outcome::Failure;
            }
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.logic.filtered_persons().len();
        let selected = match (len, self.list_state.selected()) {
            (0, _) => None,
            (_, None) => Some(0),
            (n, Some(i)) => Some(i.min(n - 1)),
        };
        self.list_state.select(selected);
    }

    fn scroll(&mut self, forward: bool) {
        let len = self.logic.filtered_persons().len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = if forward { (current + 1).min(len - 1) } else { current.saturating_sub(1) };
        self.list_state.select(Some(next));
    }

    fn recall(&mut self, older: bool) {
        let history = self.logic.input_history_mut();
        let entry = if older { history.previous() } else { history.next() };
        if let Some(text) = entry.map(str::to_string) {
            self.input.set_value(&text);
        }
    }

    /// Handle a key press. Returns true when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        match self.state {
            AppState::Help => {
                if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.state = AppState::ContactList;
                }
            }
            AppState::ContactList => match code {
                KeyCode::Esc => return true,
                KeyCode::Enter => self.submit(),
                KeyCode::Up => self.recall(true),
                KeyCode::Down => self.recall(false),
                KeyCode::PageUp => self.scroll(false),
                KeyCode::PageDown => self.scroll(true),
                KeyCode::Left => self.input.move_cursor_left(),
                KeyCode::Right => self.input.move_cursor_right(),
                KeyCode::Home => self.input.move_cursor_home(),
                KeyCode::End => self.input.move_cursor_end(),
                KeyCode::Backspace => self.input.handle_backspace(),
                KeyCode::Delete => self.input.handle_delete(),
                KeyCode::Char(c) => self.input.handle_char(c),
                _ => {}
            },
        }
        self.should_quit
    }

    /// Poll for and handle keyboard events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers));
                }
            }
        }
        Ok(false)
    }

    fn person_item(index: usize, person: &Person) -> ListItem<'static> {
        let mut first = vec![Span::styled(
            format!("{}. {}", index + 1, person.name),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        for tag in &person.tags {
            first.push(Span::raw(" "));
            first.push(Span::styled(
                format!(" {} ", tag),
                Style::default().bg(tag_color(tag.as_str())).fg(Color::White),
            ));
        }
        ListItem::new(vec![
            Line::from(first),
            Line::from(format!("    Phone:   {}", person.phone)),
            Line::from(format!("    Address: {}", person.address)),
            Line::from(format!("    Email:   {}", person.email)),
            Line::from(""),
        ])
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let book = self.logic.address_book();
        let mut spans = vec![
            Span::styled("ADDRESS BOOK", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("{} contacts", book.len()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ];
        for (tag, count) in book.tag_counts() {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!(" {} {} ", tag, count),
                Style::default().bg(tag_color(tag.as_str())).fg(Color::White),
            ));
        }
        let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_person_list(&mut self, f: &mut Frame, area: Rect) {
        let persons = self.logic.filtered_persons();
        let shown = persons.len();
        let items: Vec<ListItem> = persons
            .iter()
            .enumerate()
            .map(|(i, p)| Self::person_item(i, p))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Contacts ({}/{})",
                shown,
                self.logic.address_book().len()
            )))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol(">> ");
        f.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn render_result(&self, f: &mut Frame, area: Rect) {
        let style = match self.outcome {
            Outcome::Success => Style::default(),
            Outcome::Failure => Style::default().fg(ERROR_RED),
        };
        let result = Paragraph::new(self.result_text.as_str())
            .style(style)
            .block(Block::default().borders(Borders::ALL).title("Result"))
            .wrap(Wrap { trim: false });
        f.render_widget(result, area);
    }

    fn render_command_box(&self, f: &mut Frame, area: Rect) {
        let style = match self.outcome {
            Outcome::Failure if !self.input.value.is_empty() => Style::default().fg(ERROR_RED),
            _ => Style::default(),
        };
        let width = area.width.saturating_sub(2) as usize;
        let offset = input_offset(self.input.cursor, width);
        let command = Paragraph::new(self.input.value.as_str())
            .style(style)
            .scroll((0, offset as u16))
            .block(Block::default().borders(Borders::ALL).title("Command"));
        f.render_widget(command, area);
        if self.state == AppState::ContactList && width > 0 {
            let x = (self.input.cursor - offset) as u16;
            f.set_cursor_position((area.x + 1 + x, area.y + 1));
        }
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = format!(
            "{} | Up/Down history | PgUp/PgDn scroll | Esc quit",
            self.logic.book_path().display()
        );
        let status = Paragraph::new(text)
            .style(Style::default().bg(DARK_GREEN).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(80, 80, area);
        let mut lines = vec![
            Line::from(Span::styled("Commands", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
        ];
        for usage in ALL_USAGES {
            for (i, part) in usage.lines().enumerate() {
                let style = if i == 0 { Style::default().fg(Color::Cyan) } else { Style::default() };
                lines.push(Line::from(Span::styled(part.to_string(), style)));
            }
            lines.push(Line::from(""));
        }
        let help = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Help - Esc to return"))
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, area);
        f.render_widget(help, area);
    }

    fn render(&mut self, f: &mut Frame) {
        let area = f.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(6),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_header(f, chunks[0]);
        self.render_person_list(f, chunks[1]);
        self.render_result(f, chunks[2]);
        self.render_command_box(f, chunks[3]);
        self.render_status_bar(f, chunks[4]);

        if self.state == AppState::Help {
            self.render_help(f, area);
        }
    }

    /// Main event loop: draw, then handle input, until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_book::AddressBook;
    use ratatui::backend::TestBackend;

    fn app(dir: &std::path::Path) -> App {
        App::new(Logic::new(AddressBook::sample(), dir.join("contacts.json"), 10))
    }

    fn type_line(app: &mut App, line: &str) -> bool {
        for c in line.chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE)
    }

    #[test]
    fn test_successful_command_clears_box() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        type_line(&mut app, "find alex");
        assert!(app.input.value.is_empty());
        assert_eq!(app.outcome, Outcome::Success);
        assert_eq!(app.result_text, "1 persons listed!");
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn test_failed_command_keeps_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        type_line(&mut app, "delete 99");
        assert_eq!(app.input.value, "delete 99");
        assert_eq!(app.outcome, Outcome::Failure);
        assert_eq!(app.result_text, "The person index provided is invalid");
    }

    #[test]
    fn test_up_down_recall() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        type_line(&mut app, "list");
        type_line(&mut app, "find bernice");
        app.handle_key(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(app.input.value, "find bernice");
        app.handle_key(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(app.input.value, "list");
        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(app.input.value, "");
    }

    #[test]
    fn test_help_and_exit() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        assert!(!type_line(&mut app, "help"));
        assert_eq!(app.state, AppState::Help);
        app.handle_key(KeyCode::Char('x'), KeyModifiers::NONE);
        assert!(app.input.value.is_empty());
        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.state, AppState::ContactList);
        assert!(type_line(&mut app, "exit"));
    }

    #[test]
    fn test_ctrl_c_quits() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        assert!(app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
    }

    #[test]
    fn test_selection_follows_list_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        for _ in 0..10 {
            app.handle_key(KeyCode::PageDown, KeyModifiers::NONE);
        }
        assert_eq!(app.list_state.selected(), Some(5));
        type_line(&mut app, "clear");
        assert_eq!(app.list_state.selected(), None);
        type_line(&mut app, "undo");
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn test_input_offset_keeps_cursor_visible() {
        assert_eq!(input_offset(5, 20), 0);
        assert_eq!(input_offset(19, 20), 0);
        assert_eq!(input_offset(20, 20), 1);
        assert_eq!(input_offset(45, 20), 26);
        assert_eq!(input_offset(3, 0), 0);
    }

    #[test]
    fn test_long_input_cursor_stays_in_box() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        let line = "find ".to_string() + &"x".repeat(60) + "END";
        for c in line.chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        let mut terminal = Terminal::new(TestBackend::new(30, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let cursor = terminal.get_cursor_position().unwrap();
        assert!(cursor.x < 29);
        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("xEND"));
    }

    #[test]
    fn test_render_shows_contacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("ADDRESS BOOK"));
        assert!(text.contains("1. Alex Yeoh"));
        assert!(text.contains(" friends 2 "));
    }
}
