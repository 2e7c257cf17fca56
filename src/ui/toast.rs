//! Transient notifications shown in the bottom-right corner.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastLevel {
    fn color(&self) -> Color {
        match self {
            ToastLevel::Info => Color::Cyan,
            ToastLevel::Success => Color::Green,
            ToastLevel::Warning => Color::Yellow,
            ToastLevel::Error => Color::Red,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ToastLevel::Info => " Info ",
            ToastLevel::Success => " Saved ",
            ToastLevel::Warning => " Warning ",
            ToastLevel::Error => " Error ",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    created: Instant,
}

pub struct Toasts {
    items: VecDeque<Toast>,
    duration: Duration,
}

impl Toasts {
    pub fn new(duration: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            duration,
        }
    }

    pub fn push(&mut self, level: ToastLevel, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(?level, %message, "Toast");
        self.items.push_back(Toast {
            message,
            level,
            created: Instant::now(),
        });
        while self.items.len() > MAX_VISIBLE {
            self.items.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message);
    }

    /// Drop expired toasts
    pub fn prune(&mut self) {
        let duration = self.duration;
        self.items.retain(|t| t.created.elapsed() < duration);
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.items.back()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let width = (area.width / 3).clamp(24, 60).min(area.width);
        let mut bottom = area.height.saturating_sub(1);

        for toast in self.items.iter().rev() {
            let inner_width = width.saturating_sub(2).max(1) as usize;
            let lines = toast
                .message
                .lines()
                .map(|l| l.chars().count().div_ceil(inner_width).max(1))
                .sum::<usize>() as u16;
            let height = (lines + 2).min(bottom);
            if height < 3 {
                break;
            }
            let rect = Rect {
                x: area.width.saturating_sub(width + 1),
                y: bottom - height,
                width,
                height,
            };
            bottom -= height;

            let style = Style::default().fg(toast.level.color());
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(toast.message.as_str())
                    .wrap(Wrap { trim: true })
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(style)
                            .title(toast.level.title()),
                    ),
                rect,
            );
        }
    }
}
