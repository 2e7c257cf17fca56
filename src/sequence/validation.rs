//! Step and sequence validation rules.
//!
//! [`validate_step`] is the single source of the cached `is_valid` /
//! `errors` fields on a step. [`validate_for_save`] checks the cross-step
//! limits that only apply when a whole sequence is persisted.

use super::step::{SequenceStep, StepKind, MIN_WAIT_DAYS};

pub const SUBJECT_REQUIRED: &str = "Subject is required";
pub const BODY_REQUIRED: &str = "Body content is required";
pub const SENDER_REQUIRED: &str = "Sender is required";
pub const WAIT_TOO_SHORT: &str = "Wait time must be at least 1 day";
/// Placeholder error a brand-new email step starts with
pub const CONTENT_REQUIRED: &str = "Content is required";

pub const MAX_SENDERS_PER_STEP: usize = 5;
pub const MAX_TEMPLATES_PER_STEP: usize = 3;

/// Result of validating one step
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate a single step. Pure; depends only on the step's content.
pub fn validate_step(step: &SequenceStep) -> Validation {
    let mut errors = Vec::new();

    match &step.kind {
        StepKind::Email(email) => {
            if email.subject.trim().is_empty() {
                errors.push(SUBJECT_REQUIRED.to_string());
            }
            if email.body.trim().is_empty() {
                errors.push(BODY_REQUIRED.to_string());
            }
            if !email.has_sender() {
                errors.push(SENDER_REQUIRED.to_string());
            }
        }
        StepKind::Wait(wait) => {
            if wait.wait_days.map_or(true, |days| days < MIN_WAIT_DAYS) {
                errors.push(WAIT_TOO_SHORT.to_string());
            }
        }
        // No rules defined for these
        StepKind::Manual(_) | StepKind::Conditional(_) | StepKind::Other { .. } => {}
    }

    Validation::from_errors(errors)
}

/// Write the validation result into the step's cached fields
pub fn revalidate(step: &mut SequenceStep) {
    let Validation { is_valid, errors } = validate_step(step);
    step.is_valid = is_valid;
    step.errors = errors;
}

/// Check the per-step sender and template limits that gate a save.
///
/// Returns one `"Step {n}: {message}"` entry per violation, in step order
/// (`n` is 1-based). An empty result means the sequence may be saved.
pub fn validate_for_save(steps: &[SequenceStep]) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, step) in steps.iter().enumerate() {
        let StepKind::Email(email) = &step.kind else {
            continue;
        };
        let n = index + 1;

        if !email.has_sender() {
            errors.push(format!("Step {}: At least one sender is required", n));
        }
        if email.sender_ids.len() > MAX_SENDERS_PER_STEP {
            errors.push(format!(
                "Step {}: Maximum {} senders allowed",
                n, MAX_SENDERS_PER_STEP
            ));
        }
        if email.template_ids.is_empty() {
            errors.push(format!("Step {}: At least one template is required", n));
        }
        if email.template_ids.len() > MAX_TEMPLATES_PER_STEP {
            errors.push(format!(
                "Step {}: Maximum {} templates allowed per step",
                n, MAX_TEMPLATES_PER_STEP
            ));
        }
    }

    errors
}
