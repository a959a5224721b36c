//! Palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

use statusdeck_core::Tone;

// ── Core Palette ──────────────────────────────────────────────────────

pub const ACCENT_PURPLE: Color = Color::Rgb(189, 147, 249); // #bd93f9
pub const ACCENT_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const WARNING_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const CAUTION_ORANGE: Color = Color::Rgb(255, 184, 108); // #ffb86c
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363
pub const INFO_BLUE: Color = Color::Rgb(139, 233, 253); // #8be9fd

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29

/// Palette color for a semantic tone.
pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Success => SUCCESS_GREEN,
        Tone::Warning => WARNING_YELLOW,
        Tone::Caution => CAUTION_ORANGE,
        Tone::Danger => ERROR_RED,
        Tone::Info => INFO_BLUE,
        Tone::Neutral => BORDER_GRAY,
    }
}

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(ACCENT_CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ACCENT_PURPLE)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(ACCENT_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(ACCENT_PURPLE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default()
        .fg(ACCENT_PURPLE)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(ACCENT_CYAN).add_modifier(Modifier::BOLD)
}

/// Large metric values on the status screen.
pub fn metric_value() -> Style {
    Style::default().fg(ACCENT_CYAN).add_modifier(Modifier::BOLD)
}

/// Secondary text: timestamps, descriptions.
pub fn muted() -> Style {
    Style::default().fg(BORDER_GRAY)
}
