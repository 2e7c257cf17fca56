//! Persisting a sequence to the backend.
//!
//! A save runs in three phases so the network part never holds the store:
//!
//! 1. [`SequenceSaver::begin`] validates the whole sequence, claims the
//!    pending flag and snapshots the steps together with the store revision.
//! 2. [`SequenceSaver::persist`] creates the parent template if needed and
//!    replaces the template's sequence.
//! 3. [`SequenceSaver::finish`] releases the pending flag and marks the store
//!    saved, unless the user edited the sequence while the request was out.
//!
//! Creating the template and writing its sequence are two separate calls.
//! If the second fails the template stays behind with no steps; there is no
//! rollback.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::step::SequenceStep;
use super::store::SequenceStore;
use super::validation::validate_for_save;
use crate::api::ApiError;

/// Backend operations the saver needs
#[async_trait]
pub trait SequenceBackend: Send + Sync {
    /// Create an empty sequence template, returning its id
    async fn create_sequence_template(&self, name: &str) -> Result<String, ApiError>;

    /// Fetch a template's steps; a template without a sequence yields none
    async fn load_sequence(&self, template_id: &str) -> Result<Vec<SequenceStep>, ApiError>;

    /// Replace a template's steps
    async fn save_sequence(&self, template_id: &str, steps: &[SequenceStep])
        -> Result<(), ApiError>;
}

/// Where a save goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// Create a template with this name first
    New { name: String },
    Existing { template_id: String },
}

impl SaveTarget {
    pub fn template_id(&self) -> Option<&str> {
        match self {
            SaveTarget::New { .. } => None,
            SaveTarget::Existing { template_id } => Some(template_id),
        }
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save already in progress")]
    InProgress,
    #[error("{}", .0.join("\n"))]
    Invalid(Vec<String>),
    #[error("sequence name is required")]
    MissingName,
    #[error("failed to create template: {0}")]
    CreateTemplate(#[source] ApiError),
    #[error("failed to save sequence to template {template_id}: {source}")]
    Persist {
        template_id: String,
        #[source]
        source: ApiError,
    },
}

impl SaveError {
    /// Underlying API error, if the failure came from the backend
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            SaveError::CreateTemplate(e) => Some(e),
            SaveError::Persist { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Snapshot of one in-flight save
#[derive(Debug, Clone)]
pub struct SaveTicket {
    pub generation: u64,
    pub revision: u64,
    pub target: SaveTarget,
    pub steps: Vec<SequenceStep>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub template_id: String,
    /// A new template was created by this save
    pub created: bool,
    pub saved_at: DateTime<Utc>,
    pub step_count: usize,
    /// False when the store changed during the save and stays modified
    pub marked_saved: bool,
}

/// Coordinates saves for one store: at most one in flight at a time
#[derive(Debug, Default)]
pub struct SequenceSaver {
    pending: bool,
    generation: u64,
}

impl SequenceSaver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Generation of the most recent save started
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Validate and claim the pending flag
    pub fn begin(
        &mut self,
        store: &SequenceStore,
        target: SaveTarget,
    ) -> Result<SaveTicket, SaveError> {
        if self.pending {
            return Err(SaveError::InProgress);
        }

        let errors = validate_for_save(store.steps());
        if !errors.is_empty() {
            return Err(SaveError::Invalid(errors));
        }

        let target = match target {
            SaveTarget::New { name } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(SaveError::MissingName);
                }
                SaveTarget::New {
                    name: name.to_string(),
                }
            }
            existing => existing,
        };

        self.pending = true;
        self.generation += 1;
        Ok(SaveTicket {
            generation: self.generation,
            revision: store.revision(),
            target,
            steps: store.steps().to_vec(),
        })
    }

    /// Network half of the save. Returns the template id written to.
    pub async fn persist(
        backend: &dyn SequenceBackend,
        ticket: &SaveTicket,
    ) -> Result<String, SaveError> {
        let template_id = match &ticket.target {
            SaveTarget::Existing { template_id } => template_id.clone(),
            SaveTarget::New { name } => {
                let id = backend
                    .create_sequence_template(name)
                    .await
                    .map_err(SaveError::CreateTemplate)?;
                tracing::info!(template_id = %id, name = %name, "Created sequence template");
                id
            }
        };

        backend
            .save_sequence(&template_id, &ticket.steps)
            .await
            .map_err(|source| SaveError::Persist {
                template_id: template_id.clone(),
                source,
            })?;

        Ok(template_id)
    }

    /// Release the pending flag and apply the result to the store
    pub fn finish(
        &mut self,
        store: &mut SequenceStore,
        ticket: SaveTicket,
        result: Result<String, SaveError>,
    ) -> Result<SaveOutcome, SaveError> {
        if ticket.generation == self.generation {
            self.pending = false;
        }

        let template_id = match result {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(generation = ticket.generation, error = %e, "Sequence save failed");
                return Err(e);
            }
        };

        let saved_at = Utc::now();
        let marked_saved = store.revision() == ticket.revision;
        if marked_saved {
            store.mark_saved(saved_at);
        } else {
            tracing::debug!(
                generation = ticket.generation,
                submitted = ticket.revision,
                current = store.revision(),
                "Sequence changed during save, keeping modified flag"
            );
        }

        tracing::info!(
            template_id = %template_id,
            steps = ticket.steps.len(),
            "Sequence saved"
        );

        Ok(SaveOutcome {
            created: matches!(ticket.target, SaveTarget::New { .. }),
            template_id,
            saved_at,
            step_count: ticket.steps.len(),
            marked_saved,
        })
    }

    /// Run a complete save against `backend`
    pub async fn save(
        &mut self,
        store: &mut SequenceStore,
        backend: &dyn SequenceBackend,
        target: SaveTarget,
    ) -> Result<SaveOutcome, SaveError> {
        let ticket = self.begin(store, target)?;
        let result = Self::persist(backend, &ticket).await;
        self.finish(store, ticket, result)
    }
}

/// Load a template's sequence into `store`, toggling the loading flag
pub async fn load_into(
    store: &mut SequenceStore,
    backend: &dyn SequenceBackend,
    template_id: &str,
) -> Result<usize, ApiError> {
    store.set_loading(true);
    let result = backend.load_sequence(template_id).await;
    store.set_loading(false);

    let steps = result?;
    let count = steps.len();
    if steps.is_empty() {
        store.reset_to_empty();
    } else {
        store.set_steps(steps);
    }
    tracing::debug!(template_id, steps = count, "Loaded sequence");
    Ok(count)
}
