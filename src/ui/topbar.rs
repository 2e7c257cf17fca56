//! Header line: sequence name, save state and zoom.

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const MIN_ZOOM: u16 = 50;
pub const MAX_ZOOM: u16 = 200;
pub const ZOOM_STEP: u16 = 10;
pub const DEFAULT_ZOOM: u16 = 100;

/// Canvas zoom in percent, kept within `MIN_ZOOM..=MAX_ZOOM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zoom(u16);

impl Default for Zoom {
    fn default() -> Self {
        Zoom(DEFAULT_ZOOM)
    }
}

impl Zoom {
    /// Out-of-range values are clamped; off-step values snap down
    pub fn new(percent: u16) -> Self {
        let clamped = percent.clamp(MIN_ZOOM, MAX_ZOOM);
        Zoom(clamped - (clamped - MIN_ZOOM) % ZOOM_STEP)
    }

    pub fn percent(&self) -> u16 {
        self.0
    }

    pub fn zoom_in(&mut self) {
        self.0 = (self.0 + ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.0 = self.0.saturating_sub(ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn reset(&mut self) {
        self.0 = DEFAULT_ZOOM;
    }
}

/// What the top bar shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopBarState<'a> {
    pub name: &'a str,
    pub is_new: bool,
    pub is_modified: bool,
    pub is_loading: bool,
    pub save_pending: bool,
    pub last_saved: Option<DateTime<Utc>>,
    pub invalid_steps: usize,
    pub autosave: bool,
    pub zoom: Zoom,
}

/// Save state text, e.g. `Unsaved changes` or `Saved 14:02:11`
pub fn save_status(state: &TopBarState) -> String {
    if state.is_loading {
        return "Loading...".to_string();
    }
    if state.save_pending {
        return "Saving...".to_string();
    }
    if state.is_modified {
        return "Unsaved changes".to_string();
    }
    match state.last_saved {
        Some(at) => format!("Saved {}", at.with_timezone(&Local).format("%H:%M:%S")),
        None if state.is_new => "Not saved yet".to_string(),
        None => "No changes".to_string(),
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &TopBarState) {
    let status_color = if state.save_pending || state.is_loading {
        Color::Cyan
    } else if state.is_modified {
        Color::Yellow
    } else {
        Color::Green
    };

    let name = if state.name.trim().is_empty() {
        "Untitled sequence"
    } else {
        state.name
    };

    let mut spans = vec![
        Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(if state.is_new { " (new)" } else { "" }),
        Span::raw("  "),
        Span::styled(save_status(state), Style::default().fg(status_color)),
    ];
    if state.invalid_steps > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} step(s) need attention", state.invalid_steps),
            Style::default().fg(Color::Red),
        ));
    }
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!(
            "Auto-save {}",
            if state.autosave { "on" } else { "off" }
        ),
        Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::raw(format!("  Zoom {}%", state.zoom.percent())));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Sequence ")
                .border_style(Style::default().fg(Color::Blue)),
        ),
        area,
    );
}
