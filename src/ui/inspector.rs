//! Field list for the selected step.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::canvas::truncate;
use crate::sequence::{SequenceStep, StepKind};

/// Selectable option in a picker (sender, template, merge tag, CC)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOption {
    pub id: String,
    pub label: String,
}

impl PickerOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectorField {
    Subject,
    Body,
    MergeTag,
    Senders,
    AddCc,
    RemoveCc,
    Manual,
    Templates,
    /// Share of the n-th template
    Distribution(usize),
    WaitDays,
    Instructions,
    Condition,
}

/// What Enter does on a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEditor {
    SingleLine,
    MultiLine,
    Picker,
    Toggle,
}

impl InspectorField {
    pub fn label(&self) -> String {
        match self {
            InspectorField::Subject => "Subject".to_string(),
            InspectorField::Body => "Body".to_string(),
            InspectorField::MergeTag => "Insert merge tag".to_string(),
            InspectorField::Senders => "Senders".to_string(),
            InspectorField::AddCc => "Add CC".to_string(),
            InspectorField::RemoveCc => "Remove CC".to_string(),
            InspectorField::Manual => "Manual send".to_string(),
            InspectorField::Templates => "Templates".to_string(),
            InspectorField::Distribution(i) => format!("Variant {}", variant_letter(*i)),
            InspectorField::WaitDays => "Wait (days)".to_string(),
            InspectorField::Instructions => "Instructions".to_string(),
            InspectorField::Condition => "Condition".to_string(),
        }
    }

    /// `has_options`: whether a picker would have anything to show
    pub fn editor(&self, has_options: bool) -> FieldEditor {
        match self {
            InspectorField::Body | InspectorField::Instructions => FieldEditor::MultiLine,
            InspectorField::Manual => FieldEditor::Toggle,
            InspectorField::MergeTag | InspectorField::RemoveCc => FieldEditor::Picker,
            InspectorField::Senders | InspectorField::Templates if has_options => {
                FieldEditor::Picker
            }
            _ => FieldEditor::SingleLine,
        }
    }
}

pub fn variant_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// Fields offered for a step, in display order
pub fn fields_for(step: &SequenceStep) -> Vec<InspectorField> {
    match &step.kind {
        StepKind::Email(email) => {
            let mut fields = vec![
                InspectorField::Subject,
                InspectorField::Body,
                InspectorField::MergeTag,
                InspectorField::Senders,
                InspectorField::AddCc,
            ];
            if !email.cc_emails.is_empty() {
                fields.push(InspectorField::RemoveCc);
            }
            fields.push(InspectorField::Manual);
            fields.push(InspectorField::Templates);
            if let Some(split) = &email.distribution {
                fields.extend((0..split.len()).map(InspectorField::Distribution));
            }
            fields
        }
        StepKind::Wait(_) => vec![InspectorField::WaitDays],
        StepKind::Manual(_) => vec![InspectorField::Instructions],
        StepKind::Conditional(_) => vec![InspectorField::Condition],
        StepKind::Other { .. } => Vec::new(),
    }
}

fn label_for(options: &[PickerOption], id: &str) -> String {
    options
        .iter()
        .find(|o| o.id == id)
        .map(|o| o.label.clone())
        .unwrap_or_else(|| id.to_string())
}

/// Current value as shown next to the label
pub fn field_value(
    step: &SequenceStep,
    field: InspectorField,
    senders: &[PickerOption],
    templates: &[PickerOption],
) -> String {
    let or_none = |s: String| if s.is_empty() { "-".to_string() } else { s };
    match (&step.kind, field) {
        (StepKind::Email(email), InspectorField::Subject) => or_none(email.subject.clone()),
        (StepKind::Email(email), InspectorField::Body) => {
            or_none(email.body.lines().next().unwrap_or("").to_string())
        }
        (StepKind::Email(email), InspectorField::Senders) => or_none(
            email
                .sender_ids
                .iter()
                .map(|id| label_for(senders, id))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        (StepKind::Email(email), InspectorField::RemoveCc)
        | (StepKind::Email(email), InspectorField::AddCc) => or_none(email.cc_emails.join(", ")),
        (StepKind::Email(email), InspectorField::Manual) => {
            (if email.is_manual { "yes" } else { "no" }).to_string()
        }
        (StepKind::Email(email), InspectorField::Templates) => or_none(
            email
                .template_ids
                .iter()
                .map(|id| label_for(templates, id))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        (StepKind::Email(email), InspectorField::Distribution(i)) => email
            .distribution
            .as_ref()
            .and_then(|d| d.get(i))
            .map(|v| format!("{}%", v))
            .unwrap_or_else(|| "-".to_string()),
        (StepKind::Wait(wait), InspectorField::WaitDays) => wait
            .wait_days
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
        (StepKind::Manual(manual), InspectorField::Instructions) => {
            or_none(manual.instructions.lines().next().unwrap_or("").to_string())
        }
        (StepKind::Conditional(c), InspectorField::Condition) => or_none(c.condition.clone()),
        _ => String::new(),
    }
}

/// Text a field's input box starts with
pub fn initial_input(step: &SequenceStep, field: InspectorField) -> String {
    match (&step.kind, field) {
        (StepKind::Email(email), InspectorField::Subject) => email.subject.clone(),
        (StepKind::Email(email), InspectorField::Body) => email.body.clone(),
        (StepKind::Email(email), InspectorField::Distribution(i)) => email
            .distribution
            .as_ref()
            .and_then(|d| d.get(i))
            .map(|v| v.to_string())
            .unwrap_or_default(),
        (StepKind::Wait(wait), InspectorField::WaitDays) => {
            wait.wait_days.map(|d| d.to_string()).unwrap_or_default()
        }
        (StepKind::Manual(manual), InspectorField::Instructions) => manual.instructions.clone(),
        (StepKind::Conditional(c), InspectorField::Condition) => c.condition.clone(),
        _ => String::new(),
    }
}

pub struct InspectorView<'a> {
    pub step: Option<&'a SequenceStep>,
    pub cursor: usize,
    pub focused: bool,
    pub senders: &'a [PickerOption],
    pub templates: &'a [PickerOption],
}

pub fn render(frame: &mut Frame, area: Rect, view: &InspectorView) {
    let border = if view.focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let Some(step) = view.step else {
        frame.render_widget(
            Paragraph::new("Select a step to edit it").block(block.title(" Inspector ")),
            area,
        );
        return;
    };

    let block = block.title(format!(" {} ", step.step_type().label()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let error_height = if step.errors.is_empty() {
        0
    } else {
        step.errors.len() as u16 + 1
    };
    let list_area = Rect {
        height: inner.height.saturating_sub(error_height),
        ..inner
    };
    let value_width = inner.width.saturating_sub(20) as usize;

    let items: Vec<ListItem> = fields_for(step)
        .into_iter()
        .map(|field| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<16}", field.label()),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(truncate(
                    &field_value(step, field, view.senders, view.templates),
                    value_width,
                )),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if view.focused {
        state.select(Some(view.cursor));
    }
    frame.render_stateful_widget(
        List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> "),
        list_area,
        &mut state,
    );

    if error_height > 0 {
        let errors_area = Rect {
            y: inner.y + list_area.height,
            height: error_height,
            ..inner
        };
        let lines: Vec<Line> = step
            .errors
            .iter()
            .map(|e| Line::from(Span::styled(format!("! {}", e), Style::default().fg(Color::Red))))
            .collect();
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), errors_area);
    }
}
