//! Status screen, the home screen.
//!
//! Layout:
//! ┌─ Overall ─────────────────────────────────────────┐
//! │ badge + message, data timestamp, local refresh age │
//! └───────────────────────────────────────────────────┘
//!   stale / notice banner (only when needed)
//! ┌─ Platform ────────────────────────────────────────┐
//! │ Total Users │ Builds Shared │ Tickets │ Partners   │
//! └───────────────────────────────────────────────────┘
//! ┌─ Components ──────────────────────────────────────┐
//! │ name                        state        updated   │
//! └───────────────────────────────────────────────────┘
//!   Incidents / Scheduled maintenance (only when non-empty)

use std::sync::Arc;
use std::time::Instant;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Wrap};

use statusdeck_core::{Board, Incident, PlatformStats};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::status_indicator;
use crate::widgets::time_fmt;

#[derive(Default)]
pub struct StatusScreen {
    focused: bool,
    board: Option<Arc<Board>>,
    /// Latest delivery failure; cleared by the next good delivery.
    error: Option<String>,
    /// Local clock of the last good delivery, distinct from the data's own
    /// timestamp.
    last_refresh: Option<Instant>,
    refreshing: bool,
}

enum Section<'a> {
    Header,
    Banner,
    Metrics(&'a PlatformStats),
    Components,
    Incidents(&'static str, &'a [Incident]),
}

impl StatusScreen {
    pub fn new() -> Self {
        Self::default()
    }

    fn panel(&self, title: &str) -> Block<'static> {
        Block::default()
            .title(format!(" {title} "))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            })
    }

    fn refresh_age(&self) -> String {
        self.last_refresh
            .map_or_else(|| "never".into(), |t| time_fmt::fmt_age(t.elapsed()))
    }

    fn render_placeholder(&self, frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
        let block = self.panel("Status");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let y_offset = inner.height.saturating_sub(height) / 2;
        let centered = Rect {
            x: inner.x,
            y: inner.y + y_offset,
            width: inner.width,
            height: height.min(inner.height),
        };
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            centered,
        );
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, board: &Board) {
        let block = self.panel("Overall");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut headline = vec![
            Span::raw(" "),
            status_indicator::overall_span(board.overall, board.vocabulary),
        ];
        if let Some(message) = &board.message {
            headline.push(Span::styled(format!("  {message}"), theme::table_row()));
        }

        let mut meta = vec![
            Span::styled(" Updated ", theme::muted()),
            Span::styled(time_fmt::fmt_stamp(board.last_updated), theme::table_row()),
            Span::styled("  ·  Refreshed ", theme::muted()),
            Span::styled(self.refresh_age(), theme::table_row()),
        ];
        if self.refreshing {
            meta.push(Span::styled("  ·  refreshing…", Style::default().fg(theme::INFO_BLUE)));
        }

        frame.render_widget(
            Paragraph::new(vec![Line::from(headline), Line::from(meta)]),
            inner,
        );
    }

    fn render_banner(&self, frame: &mut Frame, area: Rect, board: &Board) {
        let line = if let Some(error) = &self.error {
            Line::from(vec![
                Span::styled(
                    format!(" ▲ {error}"),
                    Style::default()
                        .fg(theme::ERROR_RED)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" · showing data from {}", self.refresh_age()),
                    theme::muted(),
                ),
            ])
        } else if let Some(notice) = &board.notice {
            Line::from(Span::styled(
                format!(" ● {notice}"),
                Style::default().fg(theme::INFO_BLUE),
            ))
        } else {
            return;
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_metrics(&self, frame: &mut Frame, area: Rect, stats: &PlatformStats) {
        let block = self.panel("Platform");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let headline = stats.headline();
        let columns = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(inner);
        for ((label, value), column) in headline.iter().zip(columns.iter()) {
            let lines = vec![
                Line::from(Span::styled((*value).to_owned(), theme::metric_value())),
                Line::from(Span::styled(*label, theme::muted())),
            ];
            frame.render_widget(
                Paragraph::new(lines).alignment(Alignment::Center),
                *column,
            );
        }
    }

    fn render_components(&self, frame: &mut Frame, area: Rect, board: &Board) {
        let block = self.panel(&format!("Components ({})", board.components.len()));

        let header = Row::new(vec!["Service", "State", "Updated"]).style(theme::table_header());
        let rows: Vec<Row> = board
            .components
            .iter()
            .map(|c| {
                Row::new(vec![
                    Cell::from(c.name.clone()),
                    Cell::from(status_indicator::state_span(c.state, board.vocabulary)),
                    Cell::from(time_fmt::fmt_clock(c.last_updated)),
                ])
                .style(theme::table_row())
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Fill(1),
                Constraint::Length(18),
                Constraint::Length(8),
            ],
        )
        .header(header)
        .block(block);

        frame.render_widget(table, area);
    }

    fn render_incidents(&self, frame: &mut Frame, area: Rect, title: &str, items: &[Incident]) {
        let block = self.panel(&format!("{title} ({})", items.len()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        frame.render_widget(
            Paragraph::new(incident_lines(items)).wrap(Wrap { trim: true }),
            inner,
        );
    }
}

fn incident_lines(items: &[Incident]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for incident in items {
        lines.push(Line::from(vec![
            Span::raw(" "),
            status_indicator::incident_span(incident.state),
            Span::styled(
                format!("  {}", incident.title),
                Style::default()
                    .fg(theme::DIM_WHITE)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", time_fmt::fmt_stamp(incident.updated_at.or(incident.created_at))),
                theme::muted(),
            ),
        ]));
        if let Some(description) = &incident.description {
            lines.push(Line::from(Span::styled(
                format!("   {description}"),
                theme::muted(),
            )));
        }
    }
    lines
}

fn rows_height(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(2)
}

impl Component for StatusScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.code == KeyCode::Char('r') {
            self.refreshing = true;
            return Ok(Some(Action::RequestRefresh));
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::BoardUpdated(board) => {
                self.board = Some(Arc::clone(board));
                self.error = None;
                self.last_refresh = Some(Instant::now());
                self.refreshing = false;
            }
            Action::FeedFailed(message) => {
                self.error = Some(message.clone());
                self.refreshing = false;
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(board) = self.board.as_deref() else {
            let lines = match &self.error {
                None => vec![Line::from(Span::styled("Loading status…", theme::muted()))],
                Some(error) => vec![
                    Line::from(Span::styled(
                        error.clone(),
                        Style::default()
                            .fg(theme::ERROR_RED)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("Press ", theme::key_hint()),
                        Span::styled("r", theme::key_hint_key()),
                        Span::styled(" to retry", theme::key_hint()),
                    ]),
                ],
            };
            self.render_placeholder(frame, area, lines);
            return;
        };

        let mut sections = vec![(Constraint::Length(4), Section::Header)];
        if self.error.is_some() || board.notice.is_some() {
            sections.push((Constraint::Length(1), Section::Banner));
        }
        if let Some(stats) = &board.stats {
            sections.push((Constraint::Length(4), Section::Metrics(stats)));
        }
        sections.push((Constraint::Min(3), Section::Components));
        if !board.incidents.is_empty() {
            let height = rows_height(incident_lines(&board.incidents).len());
            sections.push((
                Constraint::Length(height),
                Section::Incidents("Incidents", &board.incidents),
            ));
        }
        if !board.maintenance.is_empty() {
            let height = rows_height(incident_lines(&board.maintenance).len());
            sections.push((
                Constraint::Length(height),
                Section::Incidents("Scheduled maintenance", &board.maintenance),
            ));
        }

        let areas = Layout::vertical(sections.iter().map(|(c, _)| *c)).split(area);
        for ((_, section), section_area) in sections.iter().zip(areas.iter()) {
            let section_area = *section_area;
            match section {
                Section::Header => self.render_header(frame, section_area, board),
                Section::Banner => self.render_banner(frame, section_area, board),
                Section::Metrics(stats) => self.render_metrics(frame, section_area, stats),
                Section::Components => self.render_components(frame, section_area, board),
                Section::Incidents(title, items) => {
                    self.render_incidents(frame, section_area, title, items);
                }
            }
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn key_hints(&self) -> &'static str {
        "r refresh"
    }
}
