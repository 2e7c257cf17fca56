//! Step model for email sequences.
//!
//! A sequence is an ordered list of [`SequenceStep`]s. Each step carries a
//! stable id, an explicit position and a tagged payload ([`StepKind`]).
//! Validation results are cached on the step but never serialized.

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Opaque step identifier, stable for the lifetime of a step
pub type StepId = String;

/// Lowest accepted wait, in days
pub const MIN_WAIT_DAYS: u32 = 1;
/// Highest wait the inspector accepts, in days
pub const MAX_WAIT_DAYS: u32 = 30;

/// Generate a fresh, unique step id
pub fn new_step_id() -> StepId {
    format!("step-{}", Uuid::new_v4())
}

/// Discriminant of a step, used when creating new steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Email,
    Wait,
    Manual,
    Conditional,
    /// Loaded from the backend with a type this client does not edit
    Other,
}

impl StepType {
    /// Card title shown on the canvas
    pub fn label(&self) -> &'static str {
        match self {
            StepType::Email => "Email",
            StepType::Wait => "Wait",
            StepType::Manual => "Manual task",
            StepType::Conditional => "Condition",
            StepType::Other => "Other step",
        }
    }

    /// Parse from the CLI / wire name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "email" => Some(StepType::Email),
            "wait" => Some(StepType::Wait),
            "manual" => Some(StepType::Manual),
            "conditional" | "condition" => Some(StepType::Conditional),
            _ => None,
        }
    }

    /// Payload a freshly added step of this type starts with
    pub fn default_kind(&self) -> StepKind {
        match self {
            StepType::Email => StepKind::Email(EmailStep::default()),
            StepType::Wait => StepKind::Wait(WaitStep {
                wait_days: Some(MIN_WAIT_DAYS),
            }),
            StepType::Manual => StepKind::Manual(ManualStep::default()),
            StepType::Conditional => StepKind::Conditional(ConditionalStep::default()),
            StepType::Other => StepKind::Other {
                step_type: "other".to_string(),
                fields: Map::new(),
            },
        }
    }

    /// Types a user can add
    pub fn all() -> &'static [StepType] {
        &[
            StepType::Email,
            StepType::Wait,
            StepType::Manual,
            StepType::Conditional,
        ]
    }
}

/// Email send step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailStep {
    /// Sender identities; the first one is the primary "from"
    #[serde(default, alias = "senders")]
    pub sender_ids: Vec<String>,
    #[serde(default)]
    pub subject: String,
    /// Body text, may contain merge tags such as `{{firstName}}`
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub cc_emails: Vec<String>,
    /// Do not auto-send; a human has to act on this step
    #[serde(default)]
    pub is_manual: bool,
    #[serde(default)]
    pub template_ids: Vec<String>,
    /// A/B split across `template_ids`, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Vec<u32>>,
}

impl EmailStep {
    pub fn primary_sender(&self) -> Option<&str> {
        self.sender_ids.first().map(String::as_str)
    }

    /// At least one non-blank sender id
    pub fn has_sender(&self) -> bool {
        self.sender_ids.iter().any(|s| !s.trim().is_empty())
    }
}

/// Timed pause between two sends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitStep {
    #[serde(default)]
    pub wait_days: Option<u32>,
}

/// Task a person has to complete before the sequence continues
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualStep {
    #[serde(default)]
    pub instructions: String,
}

/// Branch point evaluated by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalStep {
    #[serde(default)]
    pub condition: String,
}

/// Tagged payload of a step (`"type"` on the wire).
///
/// Types this client does not model are kept as [`StepKind::Other`] with
/// their fields untouched, so saving writes them back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    Email(EmailStep),
    Wait(WaitStep),
    Manual(ManualStep),
    Conditional(ConditionalStep),
    Other {
        step_type: String,
        fields: Map<String, Value>,
    },
}

#[derive(Serialize)]
struct Tagged<'a, T: Serialize> {
    #[serde(rename = "type")]
    step_type: &'a str,
    #[serde(flatten)]
    fields: &'a T,
}

impl Serialize for StepKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StepKind::Email(email) => Tagged {
                step_type: "email",
                fields: email,
            }
            .serialize(serializer),
            StepKind::Wait(wait) => Tagged {
                step_type: "wait",
                fields: wait,
            }
            .serialize(serializer),
            StepKind::Manual(manual) => Tagged {
                step_type: "manual",
                fields: manual,
            }
            .serialize(serializer),
            StepKind::Conditional(conditional) => Tagged {
                step_type: "conditional",
                fields: conditional,
            }
            .serialize(serializer),
            StepKind::Other { step_type, fields } => Tagged { step_type, fields }.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for StepKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::deserialize(deserializer)?;
        let step_type = match fields.remove("type") {
            Some(Value::String(step_type)) => step_type,
            Some(other) => {
                return Err(de::Error::invalid_type(
                    de::Unexpected::Other(&other.to_string()),
                    &"a step type string",
                ))
            }
            None => return Err(de::Error::missing_field("type")),
        };

        match step_type.as_str() {
            "email" => payload(fields).map(StepKind::Email),
            "wait" => payload(fields).map(StepKind::Wait),
            "manual" => payload(fields).map(StepKind::Manual),
            "conditional" => payload(fields).map(StepKind::Conditional),
            _ => Ok(StepKind::Other { step_type, fields }),
        }
    }
}

fn payload<T: DeserializeOwned, E: de::Error>(fields: Map<String, Value>) -> Result<T, E> {
    serde_json::from_value(Value::Object(fields)).map_err(E::custom)
}

impl StepKind {
    pub fn step_type(&self) -> StepType {
        match self {
            StepKind::Email(_) => StepType::Email,
            StepKind::Wait(_) => StepType::Wait,
            StepKind::Manual(_) => StepType::Manual,
            StepKind::Conditional(_) => StepType::Conditional,
            StepKind::Other { .. } => StepType::Other,
        }
    }
}

/// One unit in a sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceStep {
    pub id: StepId,
    #[serde(default)]
    pub position: u32,
    #[serde(flatten)]
    pub kind: StepKind,
    /// Cached result of the last validation
    #[serde(skip)]
    pub is_valid: bool,
    #[serde(skip)]
    pub errors: Vec<String>,
}

impl SequenceStep {
    /// Create a step with a fresh id and the default payload for `step_type`.
    ///
    /// Validation fields are left empty; the store fills them in.
    pub fn new(step_type: StepType, position: u32) -> Self {
        Self {
            id: new_step_id(),
            position,
            kind: step_type.default_kind(),
            is_valid: false,
            errors: Vec::new(),
        }
    }

    pub fn step_type(&self) -> StepType {
        self.kind.step_type()
    }

    pub fn as_email(&self) -> Option<&EmailStep> {
        match &self.kind {
            StepKind::Email(email) => Some(email),
            _ => None,
        }
    }

    pub fn as_wait(&self) -> Option<&WaitStep> {
        match &self.kind {
            StepKind::Wait(wait) => Some(wait),
            _ => None,
        }
    }

    /// Merge the fields present in `patch` into this step.
    ///
    /// Fields that do not belong to this step's variant are ignored.
    pub fn apply(&mut self, patch: StepPatch) {
        match &mut self.kind {
            StepKind::Email(email) => {
                if let Some(sender_ids) = patch.sender_ids {
                    email.sender_ids = sender_ids;
                }
                if let Some(subject) = patch.subject {
                    email.subject = subject;
                }
                if let Some(body) = patch.body {
                    email.body = body;
                }
                if let Some(cc_emails) = patch.cc_emails {
                    email.cc_emails = cc_emails;
                }
                if let Some(is_manual) = patch.is_manual {
                    email.is_manual = is_manual;
                }
                if let Some(template_ids) = patch.template_ids {
                    email.template_ids = template_ids;
                }
                if let Some(distribution) = patch.distribution {
                    email.distribution = distribution;
                }
            }
            StepKind::Wait(wait) => {
                if let Some(wait_days) = patch.wait_days {
                    wait.wait_days = wait_days;
                }
            }
            StepKind::Manual(manual) => {
                if let Some(instructions) = patch.instructions {
                    manual.instructions = instructions;
                }
            }
            StepKind::Conditional(conditional) => {
                if let Some(condition) = patch.condition {
                    conditional.condition = condition;
                }
            }
            StepKind::Other { .. } => {}
        }
    }
}

/// Partial update for a step. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepPatch {
    pub sender_ids: Option<Vec<String>>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub cc_emails: Option<Vec<String>>,
    pub is_manual: Option<bool>,
    pub template_ids: Option<Vec<String>>,
    pub distribution: Option<Option<Vec<u32>>>,
    pub wait_days: Option<Option<u32>>,
    pub instructions: Option<String>,
    pub condition: Option<String>,
}

impl StepPatch {
    pub fn is_empty(&self) -> bool {
        *self == StepPatch::default()
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Replace the sender list with a single sender
    pub fn sender(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_ids = Some(vec![sender_id.into()]);
        self
    }

    pub fn senders(mut self, sender_ids: Vec<String>) -> Self {
        self.sender_ids = Some(sender_ids);
        self
    }

    pub fn templates(mut self, template_ids: Vec<String>) -> Self {
        self.template_ids = Some(template_ids);
        self
    }

    pub fn wait_days(mut self, days: Option<u32>) -> Self {
        self.wait_days = Some(days);
        self
    }
}
