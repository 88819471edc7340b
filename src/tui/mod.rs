//! Ratatui-based terminal dashboard.
//!
//! A settings panel holds the start/end dates of the selected range; the body
//! shows one of the five dashboard panels full-size.

use std::io;
use std::time::Duration;

use chrono::{Months, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs},
};
use tracing::{debug, info};

use crate::app::pipeline::{self, DashboardReport};
use crate::domain::{DashboardConfig, DateRange, Panel};
use crate::error::AppError;
use crate::io::ingest::Datasets;

mod plotters_chart;

use plotters_chart::PanelChart;

/// Start the TUI.
///
/// Data is loaded before the terminal is taken over, so input errors print
/// normally and exit with their own code.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    let datasets = pipeline::load(&config)?;
    let mut app = App::new(datasets, &config)?;
    info!(range = %app.report.window.range, "starting dashboard");

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Which end of the range a settings row edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Start,
    End,
}

impl Field {
    const ALL: [Field; 2] = [Field::Start, Field::End];

    fn label(self) -> &'static str {
        match self {
            Field::Start => "Start",
            Field::End => "End",
        }
    }
}

/// A date adjustment bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Days(i64),
    Months(i32),
}

/// Move `date` by `step`, clamped to `bounds`.
fn shift_date(date: NaiveDate, step: Step, bounds: DateRange) -> NaiveDate {
    let moved = match step {
        Step::Days(n) => date.checked_add_signed(chrono::Duration::days(n)),
        Step::Months(n) if n >= 0 => date.checked_add_months(Months::new(n.unsigned_abs())),
        Step::Months(n) => date.checked_sub_months(Months::new(n.unsigned_abs())),
    };
    bounds.clamp(moved.unwrap_or(date))
}

/// Replace one end of `current`, clamped to `bounds`.
///
/// Returns an error when the result would be inverted.
fn with_field(current: DateRange, bounds: DateRange, field: Field, date: NaiveDate) -> Result<DateRange, AppError> {
    let date = bounds.clamp(date);
    match field {
        Field::Start => DateRange::new(date, current.end()),
        Field::End => DateRange::new(current.start(), date),
    }
}

struct App {
    datasets: Datasets,
    report: DashboardReport,
    panel: Panel,
    selected_field: usize,
    editing: Option<String>,
    status: String,
}

impl App {
    fn new(datasets: Datasets, config: &DashboardConfig) -> Result<Self, AppError> {
        let report = pipeline::build_report(&datasets, config)?;
        Ok(Self {
            datasets,
            report,
            panel: Panel::ActualVsForecast,
            selected_field: 0,
            editing: None,
            status: "Ready.".to_string(),
        })
    }

    fn field(&self) -> Field {
        Field::ALL[self.selected_field.min(Field::ALL.len() - 1)]
    }

    fn field_value(&self, field: Field) -> NaiveDate {
        let range = self.report.window.range;
        match field {
            Field::Start => range.start(),
            Field::End => range.end(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        if self.editing.is_some() {
            return self.handle_date_edit(code);
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < Field::ALL.len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.step_field(Step::Days(-1))?,
            KeyCode::Right => self.step_field(Step::Days(1))?,
            KeyCode::Char('[') => self.step_field(Step::Months(-1))?,
            KeyCode::Char(']') => self.step_field(Step::Months(1))?,
            KeyCode::Enter => {
                let field = self.field();
                self.editing = Some(self.field_value(field).format("%Y-%m-%d").to_string());
                self.status = format!("Editing {} (YYYY-MM-DD). Enter to apply, Esc to cancel.", field.label());
            }
            KeyCode::Char('0') => {
                self.apply_range(self.report.bounds)?;
                self.status = format!("Range reset to {}", self.report.bounds);
            }
            KeyCode::Tab => self.panel = self.panel.next(),
            KeyCode::BackTab => self.panel = self.panel.prev(),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                if let Some(panel) = Panel::from_index(idx) {
                    self.panel = panel;
                }
            }
            _ => {}
        }

        Ok(false)
    }

    fn handle_date_edit(&mut self, code: KeyCode) -> Result<bool, AppError> {
        let Some(buffer) = self.editing.as_mut() else {
            return Ok(false);
        };
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let text = buffer.trim().to_string();
                self.editing = None;
                match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
                    Ok(date) => self.set_field(self.field(), date)?,
                    Err(e) => self.status = format!("Invalid date '{text}': {e}"),
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                buffer.push(c);
            }
            _ => {}
        }
        Ok(false)
    }

    fn step_field(&mut self, step: Step) -> Result<(), AppError> {
        let field = self.field();
        let date = shift_date(self.field_value(field), step, self.report.bounds);
        self.set_field(field, date)
    }

    fn set_field(&mut self, field: Field, date: NaiveDate) -> Result<(), AppError> {
        match with_field(self.report.window.range, self.report.bounds, field, date) {
            Ok(range) => {
                self.apply_range(range)?;
                self.status = format!("{}: {}", field.label(), self.field_value(field));
            }
            Err(err) => {
                debug!(%err, "refused range change");
                self.status = err.message().to_string();
            }
        }
        Ok(())
    }

    fn apply_range(&mut self, range: DateRange) -> Result<(), AppError> {
        if range == self.report.window.range {
            return Ok(());
        }
        self.report = self.report.with_range(&self.datasets, range)?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(6),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);
        self.draw_chart(frame, chunks[2]);
        self.draw_settings(frame, chunks[3]);
        self.draw_footer(frame, chunks[4]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let violations = self.report.band_violations.len();
        let violation_style = if violations == 0 {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::Red)
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("salesdash", Style::default().fg(Color::Cyan)),
                Span::raw(" | Sales History & Forecast"),
            ]),
            Line::from(vec![
                Span::styled(
                    format!(
                        "transactions: {} | actuals: {} | forecast: {} | range: {} | ",
                        self.datasets.transactions.len(),
                        self.datasets.actuals.len(),
                        self.datasets.forecast.len(),
                        self.report.window.range,
                    ),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(format!("band violations: {violations}"), violation_style),
            ]),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<String> = Panel::ALL
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{} {}", i + 1, p.title()))
            .collect();
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL))
            .select(self.panel.index())
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title(self.panel.title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        frame.render_widget(
            PanelChart {
                report: &self.report,
                panel: self.panel,
            },
            inner,
        );
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items: Vec<ListItem> = Field::ALL
            .iter()
            .map(|&f| ListItem::new(format!("{}: {}", f.label(), self.field_value(f))))
            .collect();
        items.push(ListItem::new(format!("Bounds: {}", self.report.bounds)));

        let list = List::new(items)
            .block(Block::default().title("Range").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if let Some(buffer) = &self.editing {
            let hint = Paragraph::new(format!("{}: {buffer}_", self.field().label()))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ field  ←/→ ±1 day  [/] ±1 month  Enter edit  0 reset  Tab/1-5 panel  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::tests::{d, sample_config, sample_datasets};

    fn app() -> App {
        App::new(sample_datasets(), &sample_config(None, None)).unwrap()
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for &k in keys {
            assert!(!app.handle_key(k).unwrap());
        }
    }

    #[test]
    fn shift_date_clamps_to_bounds() {
        let bounds = DateRange::new(d(2024, 1, 1), d(2024, 3, 1)).unwrap();
        assert_eq!(shift_date(d(2024, 1, 1), Step::Days(-1), bounds), d(2024, 1, 1));
        assert_eq!(shift_date(d(2024, 1, 1), Step::Days(1), bounds), d(2024, 1, 2));
        assert_eq!(shift_date(d(2024, 1, 31), Step::Months(1), bounds), d(2024, 2, 29));
        assert_eq!(shift_date(d(2024, 2, 15), Step::Months(1), bounds), d(2024, 3, 1));
        assert_eq!(shift_date(d(2024, 2, 15), Step::Months(-1), bounds), d(2024, 1, 15));
    }

    #[test]
    fn with_field_refuses_inverted_ranges() {
        let bounds = DateRange::new(d(2024, 1, 1), d(2024, 3, 1)).unwrap();
        let current = DateRange::new(d(2024, 1, 10), d(2024, 1, 20)).unwrap();
        assert!(with_field(current, bounds, Field::Start, d(2024, 1, 21)).is_err());
        let r = with_field(current, bounds, Field::End, d(2030, 1, 1)).unwrap();
        assert_eq!(r.end(), d(2024, 3, 1));
    }

    #[test]
    fn arrows_move_the_selected_field() {
        let mut app = app();
        press(&mut app, &[KeyCode::Right, KeyCode::Down, KeyCode::Char('[')]);
        assert_eq!(app.report.window.range.start(), d(2024, 1, 2));
        assert_eq!(app.report.window.range.end(), d(2024, 2, 1));
        assert_eq!(app.report.window.actual.len(), 2);
    }

    #[test]
    fn typed_dates_are_clamped_and_applied() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.editing.as_deref(), Some("2024-01-01"));
        app.editing = Some(String::new());
        for c in "2024-02-01".chars() {
            press(&mut app, &[KeyCode::Char(c)]);
        }
        press(&mut app, &[KeyCode::Enter]);
        assert!(app.editing.is_none());
        assert_eq!(app.report.window.range.start(), d(2024, 2, 1));

        press(&mut app, &[KeyCode::Enter]);
        app.editing = Some("1999-01-01".to_string());
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.report.window.range.start(), d(2024, 1, 1));
    }

    #[test]
    fn inverted_change_keeps_previous_report() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter]);
        app.editing = Some("2024-03-01".to_string());
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.report.window.range.start(), d(2024, 3, 1));

        // Moving the end before the start is refused.
        press(&mut app, &[KeyCode::Down, KeyCode::Char('[')]);
        assert_eq!(app.report.window.range.end(), d(2024, 3, 1));
        assert_eq!(app.report.window.forecast.len(), 1);
        assert!(app.status.contains("after"), "{}", app.status);
    }

    #[test]
    fn malformed_typed_date_sets_status() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter]);
        app.editing = Some("2024-13-01".to_string());
        press(&mut app, &[KeyCode::Enter]);
        assert!(app.status.starts_with("Invalid date"), "{}", app.status);
        assert_eq!(app.report.window.range, app.report.bounds);
    }

    #[test]
    fn escape_cancels_an_edit_and_reset_restores_bounds() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter, KeyCode::Char('x'), KeyCode::Esc]);
        assert!(app.editing.is_none());

        press(&mut app, &[KeyCode::Right, KeyCode::Right, KeyCode::Char('0')]);
        assert_eq!(app.report.window.range, app.report.bounds);
    }

    #[test]
    fn panel_keys_cycle_and_jump() {
        let mut app = app();
        press(&mut app, &[KeyCode::Tab, KeyCode::Tab]);
        assert_eq!(app.panel, Panel::Distributions);
        press(&mut app, &[KeyCode::BackTab]);
        assert_eq!(app.panel, Panel::SalesTrend);
        press(&mut app, &[KeyCode::Char('5')]);
        assert_eq!(app.panel, Panel::MonthlyAverage);
    }

    #[test]
    fn q_and_escape_quit() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
        assert!(app.handle_key(KeyCode::Esc).unwrap());
    }
}
