//! Application core: event loop, screen management and action dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use statusdeck_core::{SourceKind, StatusSource};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::data_bridge;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

/// How long a toast stays up.
const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    source: Arc<dyn StatusSource>,
    running: bool,
    help_visible: bool,
    notification: Option<(Notification, Instant)>,
    /// Components and background tasks dispatch through this.
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Stops the data bridge on exit.
    cancel: CancellationToken,
}

impl App {
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let mut screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens(source.can_mutate(), source.kind())
                .into_iter()
                .collect();
        if let Some(screen) = screens.get_mut(&ScreenId::Status) {
            screen.set_focused(true);
        }

        Self {
            active_screen: ScreenId::Status,
            screens,
            source,
            running: true,
            help_visible: false,
            notification: None,
            action_tx,
            action_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// Run the main event loop until quit.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        tokio::spawn(data_bridge::spawn_data_bridge(
            Arc::clone(&self.source),
            self.action_tx.clone(),
            self.cancel.clone(),
        ));

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize | Event::Render => self.action_tx.send(Action::Render)?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
            }

            // Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Global keys are handled here; everything else goes to the active
    /// screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),

            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),

            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='2')) => {
                let n = u8::try_from(c).unwrap_or(b'0') - b'0';
                if let Some(screen) = ScreenId::from_number(n) {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }

            (KeyModifiers::NONE, KeyCode::Tab) | (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }

            (KeyModifiers::NONE, KeyCode::Esc) if self.notification.is_some() => {
                return Ok(Some(Action::DismissNotification));
            }

            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    /// Process a single action: update app state, run commands, and
    /// propagate data to the screens.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::RequestRefresh => {
                debug!("manual refresh requested");
                data_bridge::spawn_refresh(Arc::clone(&self.source));
            }

            Action::RequestStatusChange { id, state } => {
                info!(%id, %state, "requesting status change");
                data_bridge::spawn_mutation(
                    Arc::clone(&self.source),
                    id.clone(),
                    *state,
                    self.action_tx.clone(),
                );
            }

            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }

            Action::DismissNotification => {
                self.notification = None;
            }

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() >= NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
            }

            // Render is handled in the main loop
            Action::Render => {}

            // Data reaches every screen so inactive ones stay current
            Action::BoardUpdated(_) | Action::FeedFailed(_) | Action::StatusChangeFinished { .. } => {
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let [content_area, tab_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, content_area);
        }

        self.render_tab_bar(frame, tab_area);
        self.render_status_bar(frame, status_area);

        if let Some((notification, _)) = &self.notification {
            render_notification(frame, content_area, notification);
        }

        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(format!(" {} {} ", id.number(), id.label()), style))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    /// Source indicator plus key hints for the active screen.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let source_indicator = match (self.source.kind(), self.source.can_mutate()) {
            (SourceKind::Polling, _) => {
                Span::styled("● polling", Style::default().fg(theme::INFO_BLUE))
            }
            (SourceKind::Live, true) => {
                Span::styled("● live", Style::default().fg(theme::SUCCESS_GREEN))
            }
            (SourceKind::Live, false) => Span::styled(
                "○ live (not configured)",
                Style::default().fg(theme::WARNING_YELLOW),
            ),
        };

        let screen_hints = self
            .screens
            .get(&self.active_screen)
            .map(|s| s.key_hints())
            .filter(|hints| !hints.is_empty())
            .map(|hints| format!(" │ {hints}"))
            .unwrap_or_default();

        let line = Line::from(vec![
            Span::raw(" "),
            source_indicator,
            Span::styled(screen_hints, theme::key_hint()),
            Span::styled(" │ 1-2 screens  ? help  q quit", theme::key_hint()),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Toast in the bottom-right corner of the content area.
fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let color = match notification.level {
        NotificationLevel::Success => theme::SUCCESS_GREEN,
        NotificationLevel::Error => theme::ERROR_RED,
    };

    let text_width = u16::try_from(notification.message.chars().count()).unwrap_or(u16::MAX);
    let width = text_width.saturating_add(4).min(area.width);
    let height = 3u16.min(area.height);
    let toast_area = Rect::new(
        area.x + area.width.saturating_sub(width),
        area.y + area.height.saturating_sub(height),
        width,
        height,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color));

    frame.render_widget(Clear, toast_area);
    frame.render_widget(
        Paragraph::new(Span::styled(
            notification.message.clone(),
            Style::default().fg(color),
        ))
        .wrap(Wrap { trim: true })
        .block(block),
        toast_area,
    );
}

/// Keyboard shortcuts, centered on screen.
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_width = 52u16.min(area.width.saturating_sub(4));
    let help_height = 16u16.min(area.height.saturating_sub(4));

    let x = area.width.saturating_sub(help_width) / 2;
    let y = area.height.saturating_sub(help_height) / 2;
    let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        help_area,
    );

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let entry = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(what, theme::key_hint()),
        ])
    };

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("  Global", Style::default().fg(theme::ACCENT_CYAN))),
        entry("1-2 Tab", "Switch screen"),
        entry("?", "This help"),
        entry("Esc", "Dismiss notification"),
        entry("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled("  Status", Style::default().fg(theme::ACCENT_CYAN))),
        entry("r", "Refresh now"),
        Line::from(""),
        Line::from(Span::styled("  Editor", Style::default().fg(theme::ACCENT_CYAN))),
        entry("j/k ↑/↓", "Select service"),
        entry("h/l ←/→", "Change state"),
        entry("Enter", "Apply change"),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use ratatui::{Terminal, backend::TestBackend};
    use statusdeck_core::{
        Board, BoardCallback, CoreError, ServiceId, ServiceState, ServiceStatus, Subscription,
    };
    use tokio::sync::Notify;

    use super::*;

    struct FakeSource {
        kind: SourceKind,
        can_mutate: bool,
        mutate_ok: bool,
        mutations: Mutex<Vec<(ServiceId, ServiceState)>>,
        refreshed: Notify,
    }

    impl FakeSource {
        fn new(kind: SourceKind, can_mutate: bool, mutate_ok: bool) -> Arc<Self> {
            Arc::new(Self {
                kind,
                can_mutate,
                mutate_ok,
                mutations: Mutex::new(Vec::new()),
                refreshed: Notify::new(),
            })
        }
    }

    #[async_trait]
    impl StatusSource for FakeSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        fn can_mutate(&self) -> bool {
            self.can_mutate
        }

        async fn fetch_board(&self) -> Result<Board, CoreError> {
            Ok(Board::from_services(rows()))
        }

        fn subscribe(&self, _on_change: BoardCallback) -> Subscription {
            Subscription::inert("fake")
        }

        async fn mutate(&self, id: &ServiceId, state: ServiceState) -> bool {
            self.mutations.lock().unwrap().push((id.clone(), state));
            self.mutate_ok
        }

        async fn refresh_now(&self) {
            self.refreshed.notify_one();
        }
    }

    fn rows() -> Vec<ServiceStatus> {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        vec![
            ServiceStatus {
                id: "1".into(),
                name: "API".into(),
                state: ServiceState::Operational,
                updated_at: at,
            },
            ServiceStatus {
                id: "2".into(),
                name: "Database".into(),
                state: ServiceState::Maintenance,
                updated_at: at,
            },
        ]
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn draw(app: &App) -> String {
        let (width, height) = (100u16, 30u16);
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .chunks(usize::from(width))
            .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn deliver(app: &mut App) {
        app.process_action(&Action::BoardUpdated(Arc::new(Board::from_services(rows()))))
            .unwrap();
    }

    #[tokio::test]
    async fn global_keys_map_to_actions() {
        let mut app = App::new(FakeSource::new(SourceKind::Polling, false, false));

        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('q'))).unwrap(),
            Some(Action::Quit)
        ));
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('2'))).unwrap(),
            Some(Action::SwitchScreen(ScreenId::Editor))
        ));
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Tab)).unwrap(),
            Some(Action::SwitchScreen(ScreenId::Editor))
        ));
        // screen keys fall through to the status screen
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('r'))).unwrap(),
            Some(Action::RequestRefresh)
        ));
    }

    #[tokio::test]
    async fn deliveries_reach_both_screens() {
        let mut app = App::new(FakeSource::new(SourceKind::Live, true, true));
        deliver(&mut app);

        let status = draw(&app);
        assert!(status.contains("Components (2)"), "{status}");
        assert!(status.contains("● live"));
        assert!(status.contains("r refresh"));

        app.process_action(&Action::SwitchScreen(ScreenId::Editor))
            .unwrap();
        let editor = draw(&app);
        assert!(editor.contains("Service Editor"), "{editor}");
        assert!(editor.contains("◀ Operational ▶"));
        assert!(editor.contains("Enter apply"));
    }

    #[tokio::test]
    async fn refresh_reaches_the_source() {
        let source = FakeSource::new(SourceKind::Polling, false, false);
        let shared: Arc<dyn StatusSource> = Arc::<FakeSource>::clone(&source);
        let mut app = App::new(shared);

        app.process_action(&Action::RequestRefresh).unwrap();
        tokio::time::timeout(Duration::from_secs(2), source.refreshed.notified())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_mutation_reverts_with_error_toast() {
        let source = FakeSource::new(SourceKind::Live, true, false);
        let shared: Arc<dyn StatusSource> = Arc::<FakeSource>::clone(&source);
        let mut app = App::new(shared);
        deliver(&mut app);
        app.process_action(&Action::SwitchScreen(ScreenId::Editor))
            .unwrap();

        assert!(app.handle_key_event(key(KeyCode::Char('l'))).unwrap().is_none());
        let request = app.handle_key_event(key(KeyCode::Enter)).unwrap().unwrap();
        app.process_action(&request).unwrap();
        assert!(draw(&app).contains("updating…"));

        let finished = app.action_rx.recv().await.unwrap();
        assert!(matches!(
            finished,
            Action::StatusChangeFinished { ok: false, .. }
        ));
        app.process_action(&finished).unwrap();

        let toast = app.action_rx.recv().await.unwrap();
        app.process_action(&toast).unwrap();

        let text = draw(&app);
        assert!(text.contains("Failed to update API"), "{text}");
        assert!(!text.contains("updating…"));
        assert_eq!(
            *source.mutations.lock().unwrap(),
            vec![(ServiceId::from("1"), ServiceState::PartialOutage)]
        );

        app.process_action(&Action::DismissNotification).unwrap();
        assert!(!draw(&app).contains("Failed to update API"));
    }

    #[tokio::test]
    async fn polling_source_keeps_editor_read_only() {
        let mut app = App::new(FakeSource::new(SourceKind::Polling, false, false));
        deliver(&mut app);
        app.process_action(&Action::SwitchScreen(ScreenId::Editor))
            .unwrap();

        assert!(app.handle_key_event(key(KeyCode::Enter)).unwrap().is_none());
        let text = draw(&app);
        assert!(text.contains("Editing unavailable"), "{text}");
        assert!(text.contains("● polling"));
    }

    #[tokio::test]
    async fn help_overlay_captures_keys() {
        let mut app = App::new(FakeSource::new(SourceKind::Polling, false, false));
        app.process_action(&Action::ToggleHelp).unwrap();
        assert!(draw(&app).contains("Keyboard Shortcuts"));

        // q does not quit while help is open
        assert!(app.handle_key_event(key(KeyCode::Char('q'))).unwrap().is_none());
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::ToggleHelp)
        ));
    }
}
