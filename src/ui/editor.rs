//! Sequence editor screen: owns the store and maps keys to store actions.
//!
//! Network work (saving, loading pickers) is left to the caller; key
//! handling returns an [`EditorCommand`] when it needs one.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::time::Duration;
use tui_textarea::TextArea;

use super::canvas;
use super::centered_rect;
use super::inspector::{
    self as inspector_view, FieldEditor, InspectorField, InspectorView, PickerOption,
};
use super::keybindings::{footer_hint, shortcuts_by_category_for_context, ShortcutContext};
use super::toast::Toasts;
use super::topbar::{self, TopBarState, Zoom};
use crate::sequence::inspector::{self, MERGE_TAGS};
use crate::sequence::{
    DragEnd, SaveError, SaveOutcome, SaveTarget, SequenceStep, SequenceStore, StepPatch, StepType,
};

/// Work the editor asks its owner to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    None,
    Save,
    ToggleAutoSave,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputTarget {
    Field(InspectorField),
    Name,
}

struct InputState {
    target: InputTarget,
    multiline: bool,
    textarea: TextArea<'static>,
}

struct PickerState {
    field: InspectorField,
    options: Vec<PickerOption>,
    cursor: usize,
}

enum Mode {
    Canvas,
    Inspector,
    Input(InputState),
    Picker(PickerState),
}

pub struct SequenceEditor {
    store: SequenceStore,
    name: String,
    template_id: Option<String>,
    mode: Mode,
    field_cursor: usize,
    zoom: Zoom,
    show_help: bool,
    /// First `q` with unsaved changes only warns
    quit_armed: bool,
    autosave_enabled: bool,
    save_pending: bool,
    senders: Vec<PickerOption>,
    templates: Vec<PickerOption>,
    pub toasts: Toasts,
}

impl SequenceEditor {
    pub fn new(store: SequenceStore, target: SaveTarget, toast_duration: Duration) -> Self {
        let (name, template_id) = match target {
            SaveTarget::New { name } => (name, None),
            SaveTarget::Existing { template_id } => (String::new(), Some(template_id)),
        };
        let mut editor = Self {
            store,
            name,
            template_id,
            mode: Mode::Canvas,
            field_cursor: 0,
            zoom: Zoom::default(),
            show_help: false,
            quit_armed: false,
            autosave_enabled: false,
            save_pending: false,
            senders: Vec::new(),
            templates: Vec::new(),
            toasts: Toasts::new(toast_duration),
        };
        editor.ensure_selection();
        editor
    }

    pub fn store(&self) -> &SequenceStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SequenceStore {
        &mut self.store
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: Zoom) {
        self.zoom = zoom;
    }

    pub fn set_senders(&mut self, senders: Vec<PickerOption>) {
        self.senders = senders;
    }

    pub fn set_templates(&mut self, templates: Vec<PickerOption>) {
        self.templates = templates;
    }

    /// Mirror of owner state shown in the top bar
    pub fn set_status(&mut self, autosave_enabled: bool, save_pending: bool) {
        self.autosave_enabled = autosave_enabled;
        self.save_pending = save_pending;
    }

    pub fn context(&self) -> ShortcutContext {
        match self.mode {
            Mode::Canvas => ShortcutContext::Canvas,
            Mode::Inspector => ShortcutContext::Inspector,
            Mode::Input(_) => ShortcutContext::Input,
            Mode::Picker(_) => ShortcutContext::Picker,
        }
    }

    /// Where the next save goes: the loaded template, or a new one named
    /// after the sequence
    pub fn save_target(&self) -> SaveTarget {
        match &self.template_id {
            Some(id) => SaveTarget::Existing {
                template_id: id.clone(),
            },
            None => SaveTarget::New {
                name: self.name.clone(),
            },
        }
    }

    /// Report a finished save; a created template becomes the save target
    pub fn save_finished(&mut self, result: &Result<SaveOutcome, SaveError>) {
        match result {
            Ok(outcome) => {
                self.template_id = Some(outcome.template_id.clone());
                self.quit_armed = false;
                if outcome.created {
                    self.toasts
                        .success(format!("Created sequence \"{}\"", self.name.trim()));
                } else {
                    self.toasts
                        .success(format!("Saved {} step(s)", outcome.step_count));
                }
                if !outcome.marked_saved {
                    self.toasts.info("Edits made during the save are still unsaved");
                }
            }
            Err(SaveError::InProgress) => self.toasts.info("A save is already running"),
            Err(SaveError::MissingName) => {
                self.toasts.warning("Give the sequence a name first");
                self.open_input(InputTarget::Name);
            }
            Err(e) => self.toasts.error(e.to_string()),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorCommand {
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return EditorCommand::None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let quit_armed = std::mem::take(&mut self.quit_armed);

        match self.mode {
            Mode::Canvas => self.handle_canvas_key(key, ctrl, quit_armed),
            Mode::Inspector => self.handle_inspector_key(key, ctrl),
            Mode::Input(_) => {
                self.handle_input_key(key, ctrl);
                EditorCommand::None
            }
            Mode::Picker(_) => {
                self.handle_picker_key(key);
                EditorCommand::None
            }
        }
    }

    fn handle_canvas_key(&mut self, key: KeyEvent, ctrl: bool, quit_armed: bool) -> EditorCommand {
        match key.code {
            KeyCode::Char('s') if ctrl => return EditorCommand::Save,
            KeyCode::Char('c') if ctrl => return EditorCommand::Quit,
            KeyCode::Char('q') => {
                if !self.store.is_modified() || quit_armed {
                    return EditorCommand::Quit;
                }
                self.quit_armed = true;
                self.toasts
                    .warning("Unsaved changes. Press q again to quit without saving");
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('s') => return EditorCommand::Save,
            KeyCode::Char('A') => return EditorCommand::ToggleAutoSave,
            KeyCode::Char('n') => {
                if self.template_id.is_none() {
                    self.open_input(InputTarget::Name);
                } else {
                    self.toasts.info("Saved sequences are renamed from the template list");
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.select_relative(1),
            KeyCode::Char('k') | KeyCode::Up => self.select_relative(-1),
            KeyCode::Enter | KeyCode::Tab => {
                if self.store.selected_step().is_some() {
                    self.field_cursor = 0;
                    self.mode = Mode::Inspector;
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom.zoom_in(),
            KeyCode::Char('-') => self.zoom.zoom_out(),
            KeyCode::Char('0') => self.zoom.reset(),
            KeyCode::Char('e') => self.add_step(StepType::Email),
            KeyCode::Char('w') => self.add_step(StepType::Wait),
            KeyCode::Char('m') => self.add_step(StepType::Manual),
            KeyCode::Char('c') => self.add_step(StepType::Conditional),
            KeyCode::Char('J') => self.move_selected(1),
            KeyCode::Char('K') => self.move_selected(-1),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            _ => {}
        }
        EditorCommand::None
    }

    fn handle_inspector_key(&mut self, key: KeyEvent, ctrl: bool) -> EditorCommand {
        let Some(step) = self.store.selected_step() else {
            self.mode = Mode::Canvas;
            return EditorCommand::None;
        };
        let fields = inspector_view::fields_for(step);
        if self.field_cursor >= fields.len() {
            self.field_cursor = fields.len().saturating_sub(1);
        }

        match key.code {
            KeyCode::Char('s') if ctrl => return EditorCommand::Save,
            KeyCode::Esc | KeyCode::Tab => self.mode = Mode::Canvas,
            KeyCode::Char('j') | KeyCode::Down => {
                if self.field_cursor + 1 < fields.len() {
                    self.field_cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.field_cursor = self.field_cursor.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(field) = fields.get(self.field_cursor).copied() {
                    self.activate_field(field);
                }
            }
            _ => {}
        }
        EditorCommand::None
    }

    fn handle_input_key(&mut self, key: KeyEvent, ctrl: bool) {
        let Mode::Input(input) = &mut self.mode else {
            return;
        };
        let multiline = input.multiline;
        match key.code {
            KeyCode::Esc => self.close_overlay(),
            KeyCode::Char('s') if ctrl => self.commit_input(),
            KeyCode::Enter if !multiline => self.commit_input(),
            _ => {
                if let Mode::Input(input) = &mut self.mode {
                    input.textarea.input(key);
                }
            }
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let Mode::Picker(picker) = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.close_overlay(),
            KeyCode::Char('j') | KeyCode::Down => {
                if picker.cursor + 1 < picker.options.len() {
                    picker.cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => picker.cursor = picker.cursor.saturating_sub(1),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let field = picker.field;
                if let Some(option) = picker.options.get(picker.cursor).cloned() {
                    self.choose_option(field, &option.id);
                }
            }
            _ => {}
        }
    }

    fn close_overlay(&mut self) {
        self.mode = if self.store.selected_step().is_some() {
            Mode::Inspector
        } else {
            Mode::Canvas
        };
    }

    fn ensure_selection(&mut self) {
        if self.store.selected_step().is_none() {
            let first = self.store.steps().first().map(|s| s.id.clone());
            self.store.select_step(first.as_deref());
        }
    }

    fn selected_index(&self) -> Option<usize> {
        let id = self.store.state().selected_step_id.as_deref()?;
        self.store.index_of(id)
    }

    fn select_relative(&mut self, delta: isize) {
        let count = self.store.steps().len();
        if count == 0 {
            return;
        }
        let next = match self.selected_index() {
            Some(i) => (i as isize + delta).clamp(0, count as isize - 1) as usize,
            None => 0,
        };
        let id = self.store.steps()[next].id.clone();
        self.store.select_step(Some(&id));
    }

    fn add_step(&mut self, step_type: StepType) {
        let after = match self.store.selected_step() {
            Some(step) => i64::from(step.position),
            None => self.store.steps().len() as i64 - 1,
        };
        self.store.add_step(step_type, after);
        self.toasts.info(format!("Added {} step", step_type.label()));
    }

    /// Keyboard drag: drop the selected card onto its neighbour
    fn move_selected(&mut self, delta: isize) {
        let Some(index) = self.selected_index() else {
            return;
        };
        let target = index as isize + delta;
        let steps = self.store.steps();
        if target < 0 || target as usize >= steps.len() {
            return;
        }
        let drag = DragEnd::new(steps[index].id.clone(), Some(steps[target as usize].id.clone()));
        self.store.handle_drag_end(&drag);
    }

    fn delete_selected(&mut self) {
        let Some(index) = self.selected_index() else {
            return;
        };
        let id = self.store.steps()[index].id.clone();
        let label = self.store.steps()[index].step_type().label();
        self.store.delete_step(&id);

        let remaining = self.store.steps().len();
        if remaining > 0 {
            let next = self.store.steps()[index.min(remaining - 1)].id.clone();
            self.store.select_step(Some(&next));
        }
        self.toasts.info(format!("Deleted {} step", label));
    }

    fn picker_options(&self, field: InspectorField) -> Vec<PickerOption> {
        match field {
            InspectorField::MergeTag => MERGE_TAGS
                .iter()
                .map(|(tag, label)| PickerOption::new(*tag, format!("{}  {}", label, tag)))
                .collect(),
            InspectorField::Senders => self.senders.clone(),
            InspectorField::Templates => self.templates.clone(),
            InspectorField::RemoveCc => self
                .store
                .selected_step()
                .and_then(SequenceStep::as_email)
                .map(|email| {
                    email
                        .cc_emails
                        .iter()
                        .map(|cc| PickerOption::new(cc.clone(), cc.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn activate_field(&mut self, field: InspectorField) {
        let options = self.picker_options(field);
        match field.editor(!options.is_empty()) {
            FieldEditor::Toggle => {
                if let Some(email) = self.store.selected_step().and_then(SequenceStep::as_email) {
                    let patch = inspector::toggle_manual(email);
                    self.apply(patch);
                }
            }
            FieldEditor::Picker => {
                if options.is_empty() {
                    self.toasts.info("Nothing to choose from");
                    return;
                }
                self.mode = Mode::Picker(PickerState {
                    field,
                    options,
                    cursor: 0,
                });
            }
            FieldEditor::SingleLine | FieldEditor::MultiLine => {
                self.open_input(InputTarget::Field(field));
            }
        }
    }

    fn open_input(&mut self, target: InputTarget) {
        let (initial, multiline, title) = match target {
            InputTarget::Name => (self.name.clone(), false, "Sequence name".to_string()),
            InputTarget::Field(field) => {
                let initial = self
                    .store
                    .selected_step()
                    .map(|step| inspector_view::initial_input(step, field))
                    .unwrap_or_default();
                let multiline = field.editor(false) == FieldEditor::MultiLine;
                let title = match field {
                    InspectorField::Senders => "Sender id (toggles)".to_string(),
                    InspectorField::Templates => "Template id (toggles)".to_string(),
                    other => other.label(),
                };
                (initial, multiline, title)
            }
        };

        let mut textarea = TextArea::from(initial.lines().map(String::from).collect::<Vec<_>>());
        textarea.move_cursor(tui_textarea::CursorMove::Bottom);
        textarea.move_cursor(tui_textarea::CursorMove::End);
        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title))
                .border_style(Style::default().fg(Color::Cyan)),
        );
        self.mode = Mode::Input(InputState {
            target,
            multiline,
            textarea,
        });
    }

    fn commit_input(&mut self) {
        let Mode::Input(input) = std::mem::replace(&mut self.mode, Mode::Canvas) else {
            return;
        };
        let text = input.textarea.lines().join("\n");

        match input.target {
            InputTarget::Name => {
                self.name = text.trim().to_string();
                self.mode = Mode::Canvas;
                return;
            }
            InputTarget::Field(field) => {
                self.close_overlay();
                match self.patch_from_input(field, &text) {
                    Ok(Some(patch)) => self.apply(patch),
                    Ok(None) => {}
                    Err(message) => self.toasts.error(message),
                }
            }
        }
    }

    fn patch_from_input(&self, field: InspectorField, text: &str) -> Result<Option<StepPatch>, String> {
        let Some(step) = self.store.selected_step() else {
            return Ok(None);
        };
        let email = step.as_email();
        let patch = match field {
            InspectorField::Subject => inspector::set_subject(text.trim()),
            InspectorField::Body => inspector::set_body(text),
            InspectorField::WaitDays => inspector::set_wait_days(text).map_err(|e| e.to_string())?,
            InspectorField::Instructions => inspector::set_instructions(text),
            InspectorField::Condition => inspector::set_condition(text.trim()),
            InspectorField::AddCc => match email {
                Some(email) => inspector::add_cc(email, text).map_err(|e| e.to_string())?,
                None => return Ok(None),
            },
            InspectorField::Senders | InspectorField::Templates => {
                let (Some(email), id) = (email, text.trim()) else {
                    return Ok(None);
                };
                if id.is_empty() {
                    return Ok(None);
                }
                if field == InspectorField::Senders {
                    inspector::toggle_sender(email, id)
                } else {
                    inspector::toggle_template(email, id)
                }
            }
            InspectorField::Distribution(index) => {
                let value: u32 = text
                    .trim()
                    .parse()
                    .map_err(|_| "Share must be a whole percentage".to_string())?;
                if value > 100 {
                    return Err("Share must be between 0 and 100".to_string());
                }
                match email.and_then(|e| inspector::set_distribution_value(e, index, value)) {
                    Some(patch) => patch,
                    None => return Ok(None),
                }
            }
            InspectorField::MergeTag | InspectorField::RemoveCc | InspectorField::Manual => {
                return Ok(None)
            }
        };
        Ok(Some(patch))
    }

    fn choose_option(&mut self, field: InspectorField, id: &str) {
        let Some(email) = self.store.selected_step().and_then(SequenceStep::as_email) else {
            self.close_overlay();
            return;
        };

        let patch = match field {
            InspectorField::MergeTag => match inspector::insert_merge_tag(email, id) {
                Ok(patch) => patch,
                Err(e) => {
                    self.toasts.error(e.to_string());
                    return;
                }
            },
            InspectorField::Senders => inspector::toggle_sender(email, id),
            InspectorField::Templates => inspector::toggle_template(email, id),
            InspectorField::RemoveCc => inspector::remove_cc(email, id),
            _ => return,
        };
        self.apply(patch);

        // Multi-select pickers stay open
        match field {
            InspectorField::Senders | InspectorField::Templates => {}
            InspectorField::RemoveCc => {
                let options = self.picker_options(field);
                match &mut self.mode {
                    Mode::Picker(picker) if !options.is_empty() => {
                        picker.cursor = picker.cursor.min(options.len() - 1);
                        picker.options = options;
                    }
                    _ => self.close_overlay(),
                }
            }
            _ => self.close_overlay(),
        }
    }

    fn apply(&mut self, patch: StepPatch) {
        if let Some(id) = self.store.state().selected_step_id.clone() {
            self.store.update_step(&id, patch);
        }
    }

    fn is_chosen(&self, field: InspectorField, id: &str) -> bool {
        let Some(email) = self.store.selected_step().and_then(SequenceStep::as_email) else {
            return false;
        };
        match field {
            InspectorField::Senders => email.sender_ids.iter().any(|s| s == id),
            InspectorField::Templates => email.template_ids.iter().any(|t| t == id),
            _ => false,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let state = self.store.state();
        topbar::render(
            frame,
            chunks[0],
            &TopBarState {
                name: &self.name,
                is_new: self.template_id.is_none(),
                is_modified: state.is_modified,
                is_loading: state.is_loading,
                save_pending: self.save_pending,
                last_saved: state.last_saved,
                invalid_steps: self.store.invalid_count(),
                autosave: self.autosave_enabled,
                zoom: self.zoom,
            },
        );

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        canvas::render(
            frame,
            body[0],
            self.store.steps(),
            self.selected_index(),
            self.zoom,
            matches!(self.mode, Mode::Canvas),
        );
        inspector_view::render(
            frame,
            body[1],
            &InspectorView {
                step: self.store.selected_step(),
                cursor: self.field_cursor,
                focused: !matches!(self.mode, Mode::Canvas),
                senders: &self.senders,
                templates: &self.templates,
            },
        );

        frame.render_widget(
            Paragraph::new(footer_hint(self.context(), 6))
                .style(Style::default().fg(Color::DarkGray)),
            chunks[2],
        );

        match &self.mode {
            Mode::Input(input) => {
                let area = if input.multiline {
                    centered_rect(70, 60, frame.area())
                } else {
                    Rect {
                        height: 3,
                        ..centered_rect(60, 20, frame.area())
                    }
                };
                frame.render_widget(Clear, area);
                frame.render_widget(&input.textarea, area);
            }
            Mode::Picker(picker) => self.render_picker(frame, picker),
            Mode::Canvas | Mode::Inspector => {}
        }

        if self.show_help {
            render_help(frame);
        }
        self.toasts.render(frame);
    }

    fn render_picker(&self, frame: &mut Frame, picker: &PickerState) {
        let area = centered_rect(50, 50, frame.area());
        frame.render_widget(Clear, area);

        let multi = matches!(picker.field, InspectorField::Senders | InspectorField::Templates);
        let items: Vec<ListItem> = picker
            .options
            .iter()
            .map(|option| {
                let prefix = if !multi {
                    ""
                } else if self.is_chosen(picker.field, &option.id) {
                    "[x] "
                } else {
                    "[ ] "
                };
                ListItem::new(format!("{}{}", prefix, option.label))
            })
            .collect();

        let mut state = ListState::default();
        state.select(Some(picker.cursor));
        frame.render_stateful_widget(
            List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!(" {} ", picker.field.label()))
                        .border_style(Style::default().fg(Color::Cyan)),
                )
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
            area,
            &mut state,
        );
    }
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![];
    for context in ShortcutContext::all() {
        lines.push(Line::from(Span::styled(
            context.display_name(),
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Color::Cyan),
        )));
        for (_, shortcuts) in shortcuts_by_category_for_context(*context) {
            for shortcut in shortcuts {
                lines.push(Line::from(vec![
                    Span::styled(
                        shortcut.key_display_padded(),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::raw(shortcut.description),
                ]));
            }
        }
        lines.push(Line::from(""));
    }

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Keyboard Shortcuts "),
        ),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::StepKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(editor: &mut SequenceEditor, text: &str) {
        for c in text.chars() {
            editor.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn new_editor() -> SequenceEditor {
        let mut store = SequenceStore::new();
        store.reset_to_empty();
        SequenceEditor::new(
            store,
            SaveTarget::New {
                name: "Welcome".to_string(),
            },
            Duration::from_secs(5),
        )
    }

    fn selected_email(editor: &SequenceEditor) -> crate::sequence::step::EmailStep {
        editor
            .store()
            .selected_step()
            .and_then(SequenceStep::as_email)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_starts_with_first_step_selected() {
        let editor = new_editor();
        assert_eq!(editor.store().steps().len(), 1);
        assert!(editor.store().selected_step().is_some());
        assert_eq!(editor.context(), ShortcutContext::Canvas);
    }

    #[test]
    fn test_add_steps_after_selection() {
        let mut editor = new_editor();
        editor.handle_key(key(KeyCode::Char('w')));
        editor.handle_key(key(KeyCode::Char('e')));

        let types: Vec<_> = editor.store().steps().iter().map(|s| s.step_type()).collect();
        assert_eq!(types, vec![StepType::Email, StepType::Wait, StepType::Email]);
        assert_eq!(editor.selected_index(), Some(2));
    }

    #[test]
    fn test_keyboard_move_reorders() {
        let mut editor = new_editor();
        editor.handle_key(key(KeyCode::Char('w')));
        editor.handle_key(key(KeyCode::Char('K')));

        let types: Vec<_> = editor.store().steps().iter().map(|s| s.step_type()).collect();
        assert_eq!(types, vec![StepType::Wait, StepType::Email]);
        assert_eq!(editor.selected_index(), Some(0));
        let positions: Vec<_> = editor.store().steps().iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1]);

        // Already first: nothing happens
        let revision = editor.store().revision();
        editor.handle_key(key(KeyCode::Char('K')));
        assert_eq!(editor.store().revision(), revision);
    }

    #[test]
    fn test_delete_selects_neighbour() {
        let mut editor = new_editor();
        editor.handle_key(key(KeyCode::Char('w')));
        editor.handle_key(key(KeyCode::Char('d')));
        assert_eq!(editor.store().steps().len(), 1);
        assert_eq!(editor.selected_index(), Some(0));
    }

    #[test]
    fn test_edit_subject_through_inspector() {
        let mut editor = new_editor();
        editor.handle_key(key(KeyCode::Enter));
        assert_eq!(editor.context(), ShortcutContext::Inspector);

        editor.handle_key(key(KeyCode::Enter));
        assert_eq!(editor.context(), ShortcutContext::Input);
        type_text(&mut editor, "Hello");
        editor.handle_key(key(KeyCode::Enter));

        assert_eq!(editor.context(), ShortcutContext::Inspector);
        assert_eq!(selected_email(&editor).subject, "Hello");
        assert!(editor.store().is_modified());
    }

    #[test]
    fn test_body_is_multiline_and_commits_with_ctrl_s() {
        let mut editor = new_editor();
        editor.handle_key(key(KeyCode::Enter));
        editor.handle_key(key(KeyCode::Down));
        editor.handle_key(key(KeyCode::Enter));
        type_text(&mut editor, "Hi");
        editor.handle_key(key(KeyCode::Enter));
        type_text(&mut editor, "there");
        assert_eq!(editor.context(), ShortcutContext::Input);

        editor.handle_key(ctrl('s'));
        assert_eq!(selected_email(&editor).body, "Hi\nthere");
    }

    #[test]
    fn test_escape_discards_input() {
        let mut editor = new_editor();
        editor.handle_key(key(KeyCode::Enter));
        editor.handle_key(key(KeyCode::Enter));
        type_text(&mut editor, "Draft");
        editor.handle_key(key(KeyCode::Esc));
        assert_eq!(selected_email(&editor).subject, "");
    }

    #[test]
    fn test_merge_tag_picker_appends_tag() {
        let mut editor = new_editor();
        editor.handle_key(key(KeyCode::Enter));
        editor.handle_key(key(KeyCode::Down));
        editor.handle_key(key(KeyCode::Down));
        editor.handle_key(key(KeyCode::Enter));
        assert_eq!(editor.context(), ShortcutContext::Picker);
        editor.handle_key(key(KeyCode::Enter));

        assert_eq!(selected_email(&editor).body, "{{firstName}}");
        assert_eq!(editor.context(), ShortcutContext::Inspector);
    }

    #[test]
    fn test_sender_picker_toggles_and_stays_open() {
        let mut editor = new_editor();
        editor.set_senders(vec![
            PickerOption::new("s1", "Ada"),
            PickerOption::new("s2", "Bob"),
        ]);
        editor.handle_key(key(KeyCode::Enter));
        for _ in 0..3 {
            editor.handle_key(key(KeyCode::Down));
        }
        editor.handle_key(key(KeyCode::Enter));
        editor.handle_key(key(KeyCode::Enter));
        editor.handle_key(key(KeyCode::Down));
        editor.handle_key(key(KeyCode::Char(' ')));

        assert_eq!(editor.context(), ShortcutContext::Picker);
        assert_eq!(selected_email(&editor).sender_ids, vec!["s1", "s2"]);
        assert!(editor.is_chosen(InspectorField::Senders, "s2"));
    }

    #[test]
    fn test_invalid_wait_input_is_rejected() {
        let mut editor = new_editor();
        editor.handle_key(key(KeyCode::Char('w')));
        editor.handle_key(key(KeyCode::Enter));
        editor.handle_key(key(KeyCode::Enter));
        editor.handle_key(key(KeyCode::Backspace));
        type_text(&mut editor, "45");
        editor.handle_key(key(KeyCode::Enter));

        let wait = editor.store().selected_step().and_then(|s| s.as_wait()).unwrap();
        assert_eq!(wait.wait_days, Some(1));
        assert!(editor.toasts.latest().unwrap().message.contains("between 1 and 30"));
    }

    #[test]
    fn test_quit_needs_confirmation_when_modified() {
        let mut editor = new_editor();
        assert_eq!(editor.handle_key(key(KeyCode::Char('q'))), EditorCommand::Quit);

        editor.handle_key(key(KeyCode::Char('w')));
        assert_eq!(editor.handle_key(key(KeyCode::Char('q'))), EditorCommand::None);
        assert_eq!(editor.handle_key(key(KeyCode::Char('q'))), EditorCommand::Quit);
    }

    #[test]
    fn test_any_other_key_disarms_quit() {
        let mut editor = new_editor();
        editor.handle_key(key(KeyCode::Char('w')));
        editor.handle_key(key(KeyCode::Char('q')));
        editor.handle_key(key(KeyCode::Char('j')));
        assert_eq!(editor.handle_key(key(KeyCode::Char('q'))), EditorCommand::None);
    }

    #[test]
    fn test_save_and_zoom_keys() {
        let mut editor = new_editor();
        assert_eq!(editor.handle_key(ctrl('s')), EditorCommand::Save);
        assert_eq!(editor.handle_key(key(KeyCode::Char('A'))), EditorCommand::ToggleAutoSave);

        editor.handle_key(key(KeyCode::Char('+')));
        assert_eq!(editor.zoom().percent(), 110);
        editor.handle_key(key(KeyCode::Char('0')));
        assert_eq!(editor.zoom().percent(), 100);
    }

    #[test]
    fn test_save_target_follows_outcome() {
        let mut editor = new_editor();
        assert_eq!(
            editor.save_target(),
            SaveTarget::New {
                name: "Welcome".to_string()
            }
        );

        editor.save_finished(&Ok(SaveOutcome {
            template_id: "tpl-9".to_string(),
            created: true,
            saved_at: chrono::Utc::now(),
            step_count: 1,
            marked_saved: true,
        }));
        assert_eq!(
            editor.save_target(),
            SaveTarget::Existing {
                template_id: "tpl-9".to_string()
            }
        );
    }

    #[test]
    fn test_missing_name_opens_rename() {
        let mut editor = new_editor();
        editor.save_finished(&Err(SaveError::MissingName));
        assert_eq!(editor.context(), ShortcutContext::Input);
        type_text(&mut editor, " Onboarding");
        editor.handle_key(key(KeyCode::Enter));
        assert_eq!(editor.name(), "Welcome Onboarding");
    }

    #[test]
    fn test_help_swallows_keys() {
        let mut editor = new_editor();
        editor.handle_key(key(KeyCode::Char('?')));
        editor.handle_key(key(KeyCode::Char('w')));
        assert_eq!(editor.store().steps().len(), 1);
        editor.handle_key(key(KeyCode::Esc));
        editor.handle_key(key(KeyCode::Char('w')));
        assert!(matches!(
            editor.store().steps()[1].kind,
            StepKind::Wait(_)
        ));
    }
}
