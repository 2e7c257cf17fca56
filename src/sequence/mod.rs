//! Multi-step email sequence editing: step model, reducer store,
//! validation, reordering and persistence.

pub mod autosave;
pub mod distribution;
pub mod inspector;
pub mod reorder;
pub mod save;
pub mod step;
pub mod store;
pub mod validation;

pub use autosave::AutoSaveTimer;
pub use reorder::DragEnd;
pub use save::{SaveError, SaveOutcome, SaveTarget, SequenceBackend, SequenceSaver};
pub use step::{SequenceStep, StepId, StepKind, StepPatch, StepType};
pub use store::{SequenceAction, SequenceState, SequenceStore};
pub use validation::{validate_for_save, validate_step, Validation};
