use anyhow::Result;
use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind};
use std::sync::Arc;
use std::time::Duration;

use mapty::config::Config;
use mapty::geolocation::FixedGeolocator;
use mapty::session::{
    EventReceiver, FormField, SessionController, SessionEvent, SessionView, channel,
};
use mapty::store::JsonFileStore;
use mapty::workout::{ListEntry, WorkoutType};

use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::map_view::TerminalMap;

const MAP_HELP: &str = "arrows: move | +/-: zoom | enter: add workout here | tab: list | R: reset | q: quit";
const FORM_HELP: &str = "up/down: field | left/right: type | enter: save | esc: back to map";
const LIST_HELP: &str = "j/k: navigate | enter: show on map | tab: map | R: reset | q: quit";

/// Workout list and alert line of the terminal UI.
#[derive(Default)]
struct TuiView {
    entries: Vec<ListEntry>,
    alert: Option<String>,
}

impl SessionView for TuiView {
    fn alert(&mut self, message: &str) {
        self.alert = Some(message.to_string());
    }

    fn render_workout(&mut self, entry: &ListEntry) {
        self.entries.push(entry.clone());
    }

    fn clear_workouts(&mut self) {
        self.entries.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Map,
    Form,
    List,
}

struct App {
    session: SessionController<TerminalMap, JsonFileStore, TuiView>,
    events: EventReceiver,
    focus: Focus,
    /// Index into the list as displayed, newest first.
    selected: usize,
}

impl App {
    fn new(config: &Config) -> Self {
        let (tx, events) = channel();
        let session = SessionController::new(
            TerminalMap::new(),
            JsonFileStore::new(&config.store_path),
            TuiView::default(),
            Arc::new(FixedGeolocator::new(config.home)),
            tx,
            config.session(),
        );
        Self {
            session,
            events,
            focus: Focus::Map,
            selected: 0,
        }
    }

    fn handle(&mut self, event: SessionEvent) {
        self.session.handle(event);

        if self.session.form().is_visible() && self.focus == Focus::Map {
            self.focus = Focus::Form;
        } else if self.session.form().is_hidden() && self.focus == Focus::Form {
            self.focus = Focus::Map;
        }

        let len = self.session.view().entries.len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Handles everything the background tasks and the map posted.
    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.handle(event);
        }
    }

    fn selected_id(&self) -> Option<String> {
        let entries = &self.session.view().entries;
        entries
            .iter()
            .rev()
            .nth(self.selected)
            .map(|entry| entry.id.clone())
    }

    /// Returns `false` once the user asked to quit.
    fn on_key(&mut self, key: KeyEvent) -> bool {
        self.session.view_mut().alert = None;

        match self.focus {
            Focus::Form => self.on_form_key(key.code),
            Focus::Map => match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => return false,
                KeyCode::Char('R') => self.handle(SessionEvent::Reset),
                KeyCode::Up => self.session.map_mut().move_cursor(1, 0),
                KeyCode::Down => self.session.map_mut().move_cursor(-1, 0),
                KeyCode::Left => self.session.map_mut().move_cursor(0, -1),
                KeyCode::Right => self.session.map_mut().move_cursor(0, 1),
                KeyCode::Char('+') | KeyCode::Char('=') => self.session.map_mut().zoom_in(),
                KeyCode::Char('-') => self.session.map_mut().zoom_out(),
                KeyCode::Enter => {
                    self.session.map().click();
                }
                KeyCode::Tab => self.focus = Focus::List,
                _ => {}
            },
            Focus::List => match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => return false,
                KeyCode::Char('R') => self.handle(SessionEvent::Reset),
                KeyCode::Char('j') | KeyCode::Down => {
                    let len = self.session.view().entries.len();
                    if len > 0 && self.selected < len - 1 {
                        self.selected += 1;
                    }
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.selected = self.selected.saturating_sub(1);
                }
                KeyCode::Enter => {
                    if let Some(id) = self.selected_id() {
                        self.handle(SessionEvent::WorkoutSelected(id));
                    }
                }
                KeyCode::Tab => {
                    self.focus = if self.session.form().is_visible() {
                        Focus::Form
                    } else {
                        Focus::Map
                    };
                }
                _ => {}
            },
        }
        true
    }

    fn on_form_key(&mut self, code: KeyCode) {
        let focused = self.session.form().focused();
        match code {
            KeyCode::Esc => self.focus = Focus::Map,
            KeyCode::Tab => self.focus = Focus::List,
            KeyCode::Up | KeyCode::BackTab => self.session.form_mut().focus_prev(),
            KeyCode::Down => self.session.form_mut().focus_next(),
            KeyCode::Left | KeyCode::Right if focused == FormField::Type => {
                let next = self.session.form().workout_type().toggled();
                self.handle(SessionEvent::TypeSelected(next));
            }
            KeyCode::Enter => self.handle(SessionEvent::SubmitForm),
            KeyCode::Backspace => {
                if let Some(value) = self.session.form_mut().value_mut(focused) {
                    value.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(value) = self.session.form_mut().value_mut(focused) {
                    value.push(c);
                }
            }
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let rows = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

        let header = Paragraph::new("Mapty - Workout Map")
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, rows[0]);

        let columns =
            Layout::horizontal([Constraint::Length(46), Constraint::Min(20)]).split(rows[1]);

        let form_height = if self.session.form().is_visible() { 6 } else { 0 };
        let sidebar = Layout::vertical([Constraint::Length(form_height), Constraint::Min(1)])
            .split(columns[0]);

        if form_height > 0 {
            self.draw_form(frame, sidebar[0]);
        }
        self.draw_workouts(frame, sidebar[1]);
        self.session
            .map()
            .render(frame, columns[1], self.focus == Focus::Map);

        let (status, style) = match &self.session.view().alert {
            Some(alert) => (alert.as_str(), Style::default().fg(Color::Red)),
            None => {
                let help = match self.focus {
                    Focus::Map => MAP_HELP,
                    Focus::Form => FORM_HELP,
                    Focus::List => LIST_HELP,
                };
                (help, Style::default().fg(Color::White))
            }
        };
        let footer = Paragraph::new(status)
            .style(style)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        frame.render_widget(footer, rows[2]);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect) {
        let form = self.session.form();
        let focused = self.focus == Focus::Form;

        let lines: Vec<Line> = form
            .visible_fields()
            .iter()
            .map(|field| {
                let value = match field {
                    FormField::Type => Span::raw(format!("< {} >", form.value(*field))),
                    _ if form.value(*field).is_empty() => Span::styled(
                        field.placeholder(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    _ => Span::raw(form.value(*field).to_string()),
                };
                let label_style = if focused && form.focused() == *field {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::styled(format!("{:<10}", field.label()), label_style),
                    Span::raw(" "),
                    value,
                ])
            })
            .collect();

        let border = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title("New Workout"),
        );
        frame.render_widget(widget, area);
    }

    fn draw_workouts(&self, frame: &mut Frame, area: Rect) {
        let entries = &self.session.view().entries;
        let focused = self.focus == Focus::List;
        let border = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };

        if entries.is_empty() {
            let empty = Paragraph::new(
                "No workouts yet.\nMove the cursor on the map and press Enter to add one!",
            )
            .style(Style::default().fg(Color::Gray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title("Workouts"),
            );
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = entries
            .iter()
            .rev()
            .map(|entry| {
                let accent = match entry.workout_type {
                    WorkoutType::Running => Color::Green,
                    WorkoutType::Cycling => Color::LightRed,
                };
                let details = entry
                    .details
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join("  ");
                ListItem::new(vec![
                    Line::styled(
                        entry.title.clone(),
                        Style::default().fg(accent).add_modifier(Modifier::BOLD),
                    ),
                    Line::raw(details),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(format!("Workouts ({} total)", entries.len())),
            )
            .highlight_style(Style::default().bg(Color::DarkGray));

        let mut state = ListState::default();
        if focused {
            state.select(Some(self.selected));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }
}

pub async fn run(mut terminal: DefaultTerminal, config: &Config) -> Result<()> {
    let mut app = App::new(config);
    app.session.start();

    loop {
        app.drain_events();
        terminal.draw(|frame| app.draw(frame))?;

        if event::poll(Duration::from_millis(100))? {
            if let event::Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !app.on_key(key) {
                    return Ok(());
                }
            }
        }
        tokio::task::yield_now().await;
    }
}
