//! Edit helpers behind the inspector panel.
//!
//! Each helper looks at the current step content and returns the
//! [`StepPatch`] to dispatch. Input that must never reach the store
//! (blank CC addresses, out-of-range waits) is rejected here.

use thiserror::Error;

use super::distribution::{for_template_count, rebalance};
use super::step::{EmailStep, StepPatch, MAX_WAIT_DAYS, MIN_WAIT_DAYS};

/// Merge tags offered by the body editor, with their display labels
pub const MERGE_TAGS: &[(&str, &str)] = &[
    ("{{firstName}}", "First name"),
    ("{{lastName}}", "Last name"),
    ("{{company}}", "Company"),
    ("{{email}}", "Email"),
    ("{{website}}", "Website"),
    ("{{picture}}", "Picture"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Wait time must be a whole number of days")]
    NotANumber,
    #[error("Wait time must be between 1 and 30 days")]
    WaitOutOfRange,
    #[error("CC address is empty")]
    EmptyAddress,
    #[error("{0} is already in CC")]
    DuplicateAddress(String),
    #[error("Unknown merge tag {0}")]
    UnknownMergeTag(String),
}

pub fn set_subject(subject: impl Into<String>) -> StepPatch {
    StepPatch::default().subject(subject)
}

pub fn set_body(body: impl Into<String>) -> StepPatch {
    StepPatch::default().body(body)
}

/// Append a merge tag to the end of the body
pub fn insert_merge_tag(email: &EmailStep, tag: &str) -> Result<StepPatch, InputError> {
    if !MERGE_TAGS.iter().any(|(t, _)| *t == tag) {
        return Err(InputError::UnknownMergeTag(tag.to_string()));
    }
    Ok(set_body(format!("{}{}", email.body, tag)))
}

pub fn add_cc(email: &EmailStep, input: &str) -> Result<StepPatch, InputError> {
    let address = input.trim();
    if address.is_empty() {
        return Err(InputError::EmptyAddress);
    }
    if email.cc_emails.iter().any(|cc| cc == address) {
        return Err(InputError::DuplicateAddress(address.to_string()));
    }
    let mut cc_emails = email.cc_emails.clone();
    cc_emails.push(address.to_string());
    Ok(StepPatch {
        cc_emails: Some(cc_emails),
        ..StepPatch::default()
    })
}

pub fn remove_cc(email: &EmailStep, address: &str) -> StepPatch {
    StepPatch {
        cc_emails: Some(
            email
                .cc_emails
                .iter()
                .filter(|cc| *cc != address)
                .cloned()
                .collect(),
        ),
        ..StepPatch::default()
    }
}

pub fn toggle_manual(email: &EmailStep) -> StepPatch {
    StepPatch {
        is_manual: Some(!email.is_manual),
        ..StepPatch::default()
    }
}

/// Add `sender_id` to the step's senders, or remove it if already there
pub fn toggle_sender(email: &EmailStep, sender_id: &str) -> StepPatch {
    let mut sender_ids = email.sender_ids.clone();
    if let Some(index) = sender_ids.iter().position(|s| s == sender_id) {
        sender_ids.remove(index);
    } else {
        sender_ids.push(sender_id.to_string());
    }
    StepPatch::default().senders(sender_ids)
}

/// Add or remove a template; the A/B split resets to even whenever the
/// template list changes
pub fn toggle_template(email: &EmailStep, template_id: &str) -> StepPatch {
    let mut template_ids = email.template_ids.clone();
    if let Some(index) = template_ids.iter().position(|t| t == template_id) {
        template_ids.remove(index);
    } else {
        template_ids.push(template_id.to_string());
    }
    StepPatch {
        distribution: Some(for_template_count(template_ids.len())),
        template_ids: Some(template_ids),
        ..StepPatch::default()
    }
}

/// Set one variant's share; returns `None` when the step has no split
pub fn set_distribution_value(email: &EmailStep, index: usize, value: u32) -> Option<StepPatch> {
    let current = email.distribution.as_ref()?;
    if index >= current.len() {
        return None;
    }
    Some(StepPatch {
        distribution: Some(Some(rebalance(current, index, value))),
        ..StepPatch::default()
    })
}

/// Parse the wait input box
pub fn parse_wait_days(input: &str) -> Result<u32, InputError> {
    let days: u32 = input.trim().parse().map_err(|_| InputError::NotANumber)?;
    if !(MIN_WAIT_DAYS..=MAX_WAIT_DAYS).contains(&days) {
        return Err(InputError::WaitOutOfRange);
    }
    Ok(days)
}

pub fn set_wait_days(input: &str) -> Result<StepPatch, InputError> {
    parse_wait_days(input).map(|days| StepPatch::default().wait_days(Some(days)))
}

pub fn set_instructions(instructions: impl Into<String>) -> StepPatch {
    StepPatch {
        instructions: Some(instructions.into()),
        ..StepPatch::default()
    }
}

pub fn set_condition(condition: impl Into<String>) -> StepPatch {
    StepPatch {
        condition: Some(condition.into()),
        ..StepPatch::default()
    }
}
