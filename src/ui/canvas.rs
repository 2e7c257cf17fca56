//! Step list: one card per step, in position order.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use super::topbar::Zoom;
use crate::sequence::{SequenceStep, StepKind};

/// Display data for one card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSummary {
    pub title: &'static str,
    pub preview: String,
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl CardSummary {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// `✓` or `✗ 2`
    pub fn marker(&self) -> String {
        if self.is_valid {
            "✓".to_string()
        } else {
            format!("✗ {}", self.error_count())
        }
    }
}

pub fn card_summary(step: &SequenceStep) -> CardSummary {
    CardSummary {
        title: step.step_type().label(),
        preview: preview(&step.kind),
        is_valid: step.is_valid,
        errors: step.errors.clone(),
    }
}

fn preview(kind: &StepKind) -> String {
    match kind {
        StepKind::Email(email) => {
            let mut text = if email.subject.trim().is_empty() {
                "No subject".to_string()
            } else {
                email.subject.trim().to_string()
            };
            if email.is_manual {
                text.push_str(" [manual]");
            }
            if let Some(split) = &email.distribution {
                let parts: Vec<String> = split.iter().map(u32::to_string).collect();
                text.push_str(&format!(" (A/B {})", parts.join("/")));
            }
            text
        }
        StepKind::Wait(wait) => match wait.wait_days {
            Some(1) => "Wait 1 day".to_string(),
            Some(days) => format!("Wait {} days", days),
            None => "No duration set".to_string(),
        },
        StepKind::Manual(manual) => first_line(&manual.instructions)
            .unwrap_or("No instructions")
            .to_string(),
        StepKind::Conditional(conditional) => first_line(&conditional.condition)
            .unwrap_or("No condition")
            .to_string(),
        StepKind::Other { step_type, .. } => format!("Type \"{}\" (read-only)", step_type),
    }
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|l| !l.is_empty())
}

/// Cut `text` to `max` characters, ending in `…` when shortened
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// How much of each card is drawn at a zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardDetail {
    TitleOnly,
    Preview,
    Full,
}

impl CardDetail {
    pub fn for_zoom(zoom: Zoom) -> Self {
        match zoom.percent() {
            p if p < 80 => CardDetail::TitleOnly,
            p if p < 150 => CardDetail::Preview,
            _ => CardDetail::Full,
        }
    }
}

fn card_lines(
    index: usize,
    summary: &CardSummary,
    detail: CardDetail,
    width: usize,
) -> Vec<Line<'static>> {
    let marker_style = if summary.is_valid {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{:>2}. ", index + 1), Style::default().fg(Color::DarkGray)),
        Span::styled(summary.title, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(summary.marker(), marker_style),
    ])];

    if detail != CardDetail::TitleOnly {
        lines.push(Line::from(Span::raw(format!(
            "    {}",
            truncate(&summary.preview, width.saturating_sub(4))
        ))));
    }
    if detail == CardDetail::Full {
        for error in &summary.errors {
            lines.push(Line::from(Span::styled(
                format!("    - {}", error),
                Style::default().fg(Color::Red),
            )));
        }
    }
    lines
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    steps: &[SequenceStep],
    selected: Option<usize>,
    zoom: Zoom,
    focused: bool,
) {
    let detail = CardDetail::for_zoom(zoom);
    let width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = steps
        .iter()
        .enumerate()
        .map(|(i, step)| ListItem::new(card_lines(i, &card_summary(step), detail, width)))
        .collect();

    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Steps ({}) ", steps.len()))
                .border_style(Style::default().fg(border)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(selected);
    frame.render_stateful_widget(list, area, &mut state);
}
