//! Editor screen: change one service's state at a time.
//!
//! `j/k` picks a row, `←/→` (or `h/l`) cycles the row's selector through
//! the four states, `Enter` applies. The row flips to the requested state
//! immediately and the mutation runs in the background; a failure puts the
//! prior state back and raises an error toast.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use statusdeck_core::appearance;
use statusdeck_core::{EditorModel, ServiceState, ServiceStatus, SourceKind, Vocabulary};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::{status_indicator, time_fmt};

pub struct EditorScreen {
    focused: bool,
    /// Why editing is unavailable, for sources that can't mutate.
    disabled: Option<&'static str>,
    model: EditorModel,
    selected: usize,
    /// Selector value for the selected row; `None` shows the row's state.
    choice: Option<ServiceState>,
    error: Option<String>,
}

impl EditorScreen {
    pub fn new(can_mutate: bool, kind: SourceKind) -> Self {
        let disabled = match (can_mutate, kind) {
            (true, _) => None,
            (false, SourceKind::Polling) => {
                Some("The polling source is read-only. Start with --source live to edit services.")
            }
            (false, SourceKind::Live) => {
                Some("Live backend not configured. Run `statusdeck config init` to set it up.")
            }
        };
        Self {
            focused: false,
            disabled,
            model: EditorModel::new(),
            selected: 0,
            choice: None,
            error: None,
        }
    }

    fn selected_row(&self) -> Option<&ServiceStatus> {
        self.model.rows().get(self.selected)
    }

    fn select(&mut self, index: usize) {
        let last = self.model.rows().len().saturating_sub(1);
        let index = index.min(last);
        if index != self.selected {
            self.selected = index;
            self.choice = None;
        }
    }

    fn cycle(&mut self, forward: bool) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if self.model.is_updating(&row.id) {
            return;
        }
        let current = self.choice.unwrap_or(row.state);
        self.choice = Some(if forward { current.next() } else { current.prev() });
    }

    /// Apply the selector optimistically and hand the mutation to the app.
    fn apply(&mut self) -> Option<Action> {
        let state = self.choice?;
        let id = self.selected_row()?.id.clone();
        let edit = self.model.begin(&id, state)?;
        self.choice = None;
        Some(Action::RequestStatusChange {
            id: edit.id,
            state: edit.requested,
        })
    }

    fn panel(&self) -> Block<'static> {
        Block::default()
            .title(" Service Editor ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            })
    }

    fn selector_cell(&self, row: &ServiceStatus) -> Cell<'static> {
        let shown = self.choice.unwrap_or(row.state);
        let look = appearance::service(Some(shown), Vocabulary::Table);
        let style = if shown == row.state {
            theme::muted()
        } else {
            Style::default()
                .fg(theme::tone_color(look.tone))
                .add_modifier(Modifier::BOLD)
        };
        Cell::from(Line::from(vec![
            Span::styled("◀ ", theme::key_hint_key()),
            Span::styled(look.label, style),
            Span::styled(" ▶", theme::key_hint_key()),
        ]))
    }

    fn render_rows(&self, frame: &mut Frame, area: Rect) {
        let header =
            Row::new(vec!["Service", "State", "Updated", "Change to"]).style(theme::table_header());
        let rows: Vec<Row> = self
            .model
            .rows()
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let mut state = vec![status_indicator::state_span(Some(row.state), Vocabulary::Table)];
                if self.model.is_updating(&row.id) {
                    state.push(Span::styled(" updating…", Style::default().fg(theme::INFO_BLUE)));
                }
                let selector = if idx == self.selected && !self.model.is_updating(&row.id) {
                    self.selector_cell(row)
                } else {
                    Cell::from("")
                };
                Row::new(vec![
                    Cell::from(row.name.clone()),
                    Cell::from(Line::from(state)),
                    Cell::from(time_fmt::fmt_clock(Some(row.updated_at))),
                    selector,
                ])
                .style(theme::table_row())
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Fill(1),
                Constraint::Length(28),
                Constraint::Length(8),
                Constraint::Length(22),
            ],
        )
        .header(header)
        .row_highlight_style(theme::table_selected())
        .highlight_symbol("▸ ");

        let mut state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }
}

fn centered_message(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let y_offset = area.height.saturating_sub(height) / 2;
    let centered = Rect {
        x: area.x,
        y: area.y + y_offset,
        width: area.width,
        height: height.min(area.height),
    };
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered,
    );
}

impl Component for EditorScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.disabled.is_some() {
            return Ok(None);
        }
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.select(self.selected.saturating_add(1)),
            KeyCode::Char('k') | KeyCode::Up => self.select(self.selected.saturating_sub(1)),
            KeyCode::Char('l') | KeyCode::Right => self.cycle(true),
            KeyCode::Char('h') | KeyCode::Left => self.cycle(false),
            KeyCode::Enter => return Ok(self.apply()),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if self.disabled.is_some() {
            return Ok(None);
        }
        match action {
            Action::BoardUpdated(board) => {
                self.model.load(board.services.clone());
                self.select(self.selected);
                self.error = None;
            }
            Action::FeedFailed(message) => {
                self.error = Some(message.clone());
            }
            Action::StatusChangeFinished { id, state, ok } => {
                if self.model.finish(id, *ok).is_none() {
                    return Ok(None);
                }
                let name = self
                    .model
                    .row(id)
                    .map_or_else(|| id.to_string(), |row| row.name.clone());
                let notification = if *ok {
                    Notification::success(format!("{name} set to {state}"))
                } else {
                    Notification::error(format!("Failed to update {name}, change reverted"))
                };
                return Ok(Some(Action::Notify(notification)));
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = self.panel();
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(reason) = self.disabled {
            centered_message(
                frame,
                inner,
                vec![
                    Line::from(Span::styled(
                        "Editing unavailable",
                        Style::default()
                            .fg(theme::WARNING_YELLOW)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(Span::styled(reason, theme::muted())),
                ],
            );
            return;
        }

        if !self.model.is_loaded() {
            let line = match &self.error {
                Some(error) => Line::from(Span::styled(
                    error.clone(),
                    Style::default().fg(theme::ERROR_RED),
                )),
                None => Line::from(Span::styled("Loading services…", theme::muted())),
            };
            centered_message(frame, inner, vec![line]);
            return;
        }

        if self.model.rows().is_empty() {
            centered_message(
                frame,
                inner,
                vec![Line::from(Span::styled("No services found", theme::muted()))],
            );
            return;
        }

        let [summary_area, table_area] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(1)]).areas(inner);

        let mut summary = vec![
            Span::styled(" Overall ", theme::muted()),
            status_indicator::overall_span(Some(self.model.overall()), Vocabulary::Table),
        ];
        if self.model.has_pending() {
            summary.push(Span::styled(
                "  ·  saving changes…",
                Style::default().fg(theme::INFO_BLUE),
            ));
        }
        if let Some(error) = &self.error {
            summary.push(Span::styled(
                format!("  ·  {error}"),
                Style::default().fg(theme::ERROR_RED),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(summary)), summary_area);

        self.render_rows(frame, table_area);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn key_hints(&self) -> &'static str {
        if self.disabled.is_some() {
            "read-only"
        } else {
            "j/k select  ←/→ change  Enter apply"
        }
    }
}
