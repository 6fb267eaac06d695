//! Terminal front-end
//!
//! Renders the table, the sorted view, and the status line from scheduler
//! snapshots, and maps key presses onto insert, random fill, and search.

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use hashviz::{Error, Scheduler, SearchMode, VisualizerSnapshot};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use std::io;
use std::time::Duration;
use tracing::{debug, warn};

const CELLS_PER_ROW: usize = 10;
const CELL_WIDTH: usize = 6;

/// Which text field receives typed characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Insert,
    Search,
}

/// Input state owned by the front-end
#[derive(Debug, Clone, Default)]
pub struct App {
    pub insert_input: String,
    pub search_input: String,
    pub focus: Focus,
}

impl App {
    fn focused_input(&mut self) -> &mut String {
        match self.focus {
            Focus::Insert => &mut self.insert_input,
            Focus::Search => &mut self.search_input,
        }
    }
}

pub fn run_app(app: &mut App, scheduler: &Scheduler) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(error) = execute!(stdout, terminal::EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(error).context("enter alternate screen");
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut result = Ok(());
    loop {
        let snapshot = scheduler.snapshot();
        if let Err(error) = terminal.draw(|frame| render(frame, app, &snapshot)) {
            result = Err(error).context("draw frame");
            break;
        }

        // Short poll so timer-driven highlights show up between key presses
        let has_event = match event::poll(Duration::from_millis(50)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }

        match event::read().context("read event") {
            Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                if handle_key_event(app, scheduler, key) {
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    restore_terminal(result)
}

/// Leave raw mode and the alternate screen, attempting both even if one
/// fails.
fn restore_terminal(result: Result<()>) -> Result<()> {
    let raw = disable_raw_mode().context("disable raw mode");
    let screen = execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen");
    first_error(result, [raw, screen])
}

/// The loop's own error wins; teardown failures after it are only logged.
fn first_error<const N: usize>(result: Result<()>, teardown: [Result<()>; N]) -> Result<()> {
    let mut outcome = result;
    for step in teardown {
        if let Err(error) = step {
            warn!(error = %format!("{:#}", error), "terminal teardown failed");
            if outcome.is_ok() {
                outcome = Err(error);
            }
        }
    }
    outcome
}

/// Apply one key press. Returns `true` when the app should quit.
pub fn handle_key_event(app: &mut App, scheduler: &Scheduler, key: KeyEvent) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => return true,
        (KeyCode::Tab, _) | (KeyCode::BackTab, _) => {
            app.focus = match app.focus {
                Focus::Insert => Focus::Search,
                Focus::Search => Focus::Insert,
            };
            return false;
        }
        _ => {}
    }

    // Controls stay disabled until the running search finishes
    if scheduler.is_searching() {
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
            scheduler.random_fill();
        }
        (KeyCode::Char('b'), KeyModifiers::CONTROL) => {
            scheduler.set_mode(scheduler.snapshot().mode.toggle());
        }
        (KeyCode::Enter, _) => submit(app, scheduler),
        (KeyCode::Backspace, _) => {
            app.focused_input().pop();
        }
        (KeyCode::Char(c), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
            if c.is_ascii_digit() || c == '-' || c == '+' {
                app.focused_input().push(c);
            }
        }
        _ => {}
    }

    false
}

fn submit(app: &mut App, scheduler: &Scheduler) {
    let outcome = match app.focus {
        Focus::Insert => scheduler.insert_text(&app.insert_input).map(|_| app.insert_input.clear()),
        Focus::Search => {
            let mode = scheduler.snapshot().mode;
            scheduler.search_text(&app.search_input, mode).map(|_| ())
        }
    };

    match outcome {
        Ok(()) => {}
        Err(Error::InvalidNumericInput(raw)) => debug!(raw = %raw, "ignored non-numeric input"),
        Err(err) => warn!(%err, "action failed"),
    }
}

fn highlight_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn cell(text: String, highlighted: bool) -> Span<'static> {
    let text = format!("{:^width$}", text, width = CELL_WIDTH);
    if highlighted {
        Span::styled(text, highlight_style())
    } else {
        Span::raw(text)
    }
}

fn table_lines(snapshot: &VisualizerSnapshot) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (row, chunk) in snapshot.slots.chunks(CELLS_PER_ROW).enumerate() {
        let base = row * CELLS_PER_ROW;
        let labels: Vec<Span> = (0..chunk.len())
            .map(|i| {
                Span::styled(
                    format!("{:^width$}", base + i, width = CELL_WIDTH),
                    Style::default().fg(Color::DarkGray),
                )
            })
            .collect();
        let values: Vec<Span> = chunk
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                let text = slot.map_or_else(|| "–".to_string(), |value| value.to_string());
                cell(text, snapshot.highlight.table_index == Some(base + i))
            })
            .collect();
        lines.push(Line::from(labels));
        lines.push(Line::from(values));
    }
    lines
}

fn sorted_lines(snapshot: &VisualizerSnapshot) -> Vec<Line<'static>> {
    if snapshot.sorted.is_empty() {
        return vec![Line::from(Span::styled(
            "(empty)",
            Style::default().fg(Color::DarkGray),
        ))];
    }
    snapshot
        .sorted
        .chunks(CELLS_PER_ROW)
        .enumerate()
        .map(|(row, chunk)| {
            let spans: Vec<Span> = chunk
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    let index = row * CELLS_PER_ROW + i;
                    cell(value.to_string(), snapshot.highlight.sorted_index == Some(index))
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn status_text(snapshot: &VisualizerSnapshot) -> String {
    let elapsed = snapshot
        .elapsed_ms
        .map(|ms| format!(" | {} steps, {} ms", snapshot.steps, ms))
        .unwrap_or_default();
    match (snapshot.result_message(), snapshot.target) {
        (Some(message), _) => format!("{}{}", message, elapsed),
        (None, Some(target)) if snapshot.searching => {
            format!("Searching for {} ({} search){}", target, snapshot.mode, elapsed)
        }
        _ => String::new(),
    }
}

fn input_line(label: &str, value: &str, focused: bool) -> Span<'static> {
    let text = format!(" {}: {}{} ", label, value, if focused { "_" } else { "" });
    if focused {
        Span::styled(text, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    } else {
        Span::raw(text)
    }
}

fn render(frame: &mut ratatui::Frame<'_>, app: &App, snapshot: &VisualizerSnapshot) {
    let sorted_rows = snapshot.sorted.len().div_ceil(CELLS_PER_ROW).max(1) as u16;
    let sorted_height = if snapshot.mode == SearchMode::Binary {
        sorted_rows + 2
    } else {
        0
    };
    let table_rows = (snapshot.slots.len().div_ceil(CELLS_PER_ROW) * 2) as u16;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(table_rows + 2),
            Constraint::Length(sorted_height),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(frame.area());

    let disabled = if snapshot.searching { "  (searching…)" } else { "" };
    let inputs = Line::from(vec![
        input_line("insert", &app.insert_input, app.focus == Focus::Insert),
        input_line("search", &app.search_input, app.focus == Focus::Search),
        Span::raw(format!(" mode: {} search{}", snapshot.mode, disabled)),
    ]);
    let inputs = Paragraph::new(inputs)
        .block(Block::default().title("Hash Table Visualizer").borders(Borders::ALL));
    frame.render_widget(inputs, layout[0]);

    let table = Paragraph::new(table_lines(snapshot))
        .block(Block::default().title("table (value mod 30)").borders(Borders::ALL));
    frame.render_widget(table, layout[1]);

    if snapshot.mode == SearchMode::Binary {
        let sorted = Paragraph::new(sorted_lines(snapshot))
            .block(Block::default().title("sorted array for binary search").borders(Borders::ALL));
        frame.render_widget(sorted, layout[2]);
    }

    let status = Paragraph::new(status_text(snapshot))
        .style(Style::default().fg(Color::Magenta))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);

    let help = Paragraph::new("tab switch field | enter run | ctrl-r random fill | ctrl-b toggle mode | esc quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, layout[4]);
}
