use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use std::time::Duration;

use crate::api::{ApiError, Services};
use crate::config::Config;
use crate::sequence::save::load_into;
use crate::sequence::{
    AutoSaveTimer, SaveError, SaveOutcome, SaveTarget, SequenceSaver, SequenceStore,
};
use crate::ui::topbar::Zoom;
use crate::ui::{install_panic_hook, EditorCommand, PickerOption, SequenceEditor, TerminalGuard};

/// Templates fetched for the picker in one request
const TEMPLATE_PICKER_SIZE: u32 = 100;

/// Interactive sequence editor session
pub struct App {
    config: Config,
    services: Services,
    editor: SequenceEditor,
    saver: SequenceSaver,
    autosave: AutoSaveTimer,
    should_quit: bool,
}

impl App {
    /// Load the sequence behind `target` and the picker data
    pub async fn open(config: Config, mut services: Services, target: SaveTarget) -> Result<Self> {
        let mut store = SequenceStore::new();
        let mut name = String::new();

        match &target {
            SaveTarget::Existing { template_id } => {
                let result = load_into(&mut store, &services.api, template_id).await;
                services
                    .track(result)
                    .with_context(|| format!("Failed to load sequence {}", template_id))?;

                let template = services.api.get_template(template_id).await;
                match services.track(template) {
                    Ok(template) => name = template.name,
                    Err(e) => tracing::warn!(template_id, error = %e, "Could not load template name"),
                }
            }
            SaveTarget::New { .. } => store.reset_to_empty(),
        }

        let mut editor = SequenceEditor::new(
            store,
            target,
            Duration::from_millis(config.ui.toast_duration_ms),
        );
        if !name.is_empty() {
            editor.set_name(name);
        }
        editor.set_zoom(Zoom::new(config.ui.default_zoom));

        let autosave = AutoSaveTimer::new(&config.autosave);
        let mut app = Self {
            config,
            services,
            editor,
            saver: SequenceSaver::new(),
            autosave,
            should_quit: false,
        };
        app.load_pickers().await;
        Ok(app)
    }

    /// Senders and content templates for the inspector pickers.
    ///
    /// Failures leave the pickers empty; ids can still be typed in.
    async fn load_pickers(&mut self) {
        let senders = self.services.api.list_senders().await;
        match self.services.track(senders) {
            Ok(senders) => self.editor.set_senders(
                senders
                    .iter()
                    .map(|s| PickerOption::new(s.id.clone(), s.label()))
                    .collect(),
            ),
            Err(e) => self.report_api_error("Could not load senders", &e),
        }

        let templates = self
            .services
            .api
            .list_templates(1, TEMPLATE_PICKER_SIZE)
            .await;
        match self.services.track(templates) {
            Ok(page) => self.editor.set_templates(
                page.items
                    .into_iter()
                    .filter(|t| t.template_type.as_deref() != Some("sequence"))
                    .map(|t| PickerOption::new(t.id, t.name))
                    .collect(),
            ),
            Err(e) => self.report_api_error("Could not load templates", &e),
        }
    }

    pub fn editor(&self) -> &SequenceEditor {
        &self.editor
    }

    pub async fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let (_guard, mut terminal) = TerminalGuard::enter()?;

        let tick_rate = Duration::from_millis(self.config.ui.refresh_rate_ms);

        while !self.should_quit {
            self.editor
                .set_status(self.autosave.is_enabled(), self.saver.is_pending());
            self.editor.toasts.prune();

            terminal.draw(|f| self.editor.render(f))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        let command = self.editor.handle_key(key);
                        self.handle_command(command).await;
                    }
                }
            }

            self.run_autosave().await;
        }

        terminal.show_cursor()?;
        Ok(())
    }

    async fn handle_command(&mut self, command: EditorCommand) {
        match command {
            EditorCommand::None => {}
            EditorCommand::Save => {
                let result = self.save().await;
                self.autosave
                    .record_attempt(result.as_ref().err().map(ToString::to_string));
            }
            EditorCommand::ToggleAutoSave => {
                let enabled = !self.autosave.is_enabled();
                self.autosave.set_enabled(enabled);
                self.editor
                    .toasts
                    .info(format!("Auto-save {}", if enabled { "on" } else { "off" }));
            }
            EditorCommand::Quit => self.should_quit = true,
        }
    }

    /// Save when the auto-save interval has passed with unsaved edits.
    ///
    /// Invalid steps skip the attempt quietly; backend failures are shown.
    async fn run_autosave(&mut self) {
        if !self
            .autosave
            .should_save(self.editor.store().is_modified(), self.saver.is_pending())
        {
            return;
        }

        let target = self.editor.save_target();
        let result = self
            .saver
            .save(self.editor.store_mut(), &self.services.api, target)
            .await;

        self.autosave
            .record_attempt(result.as_ref().err().map(ToString::to_string));
        match &result {
            Err(SaveError::Invalid(_)) | Err(SaveError::MissingName) => {
                tracing::debug!("Auto-save skipped, sequence not ready");
            }
            _ => self.after_save(&result),
        }
    }

    async fn save(&mut self) -> Result<(), SaveError> {
        let target = self.editor.save_target();
        let result = self
            .saver
            .save(self.editor.store_mut(), &self.services.api, target)
            .await;
        self.after_save(&result);
        result.map(|_| ())
    }

    fn after_save(&mut self, result: &Result<SaveOutcome, SaveError>) {
        if let Err(e) = result {
            if let Some(api_error) = e.api_error() {
                let tracked = self.services.record_error(api_error.clone());
                if tracked.needs_login() {
                    self.editor
                        .toasts
                        .error("Session expired. Run `outreach login` and try again");
                    return;
                }
            }
        } else {
            self.services.clear_auth_failures(crate::api::client::SERVICE_NAME);
        }
        self.editor.save_finished(result);
    }

    fn report_api_error(&mut self, context: &str, error: &ApiError) {
        tracing::warn!(error = %error, "{}", context);
        self.editor.toasts.warning(format!("{}: {}", context, error));
    }
}
