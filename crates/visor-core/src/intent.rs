use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::DomainError;
use crate::id::IntentId;
use crate::validate;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentStatus {
    Active,
    Inactive,
    Suggested,
}

impl IntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentStatus::Active => "ACTIVE",
            IntentStatus::Inactive => "INACTIVE",
            IntentStatus::Suggested => "SUGGESTED",
        }
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(IntentStatus::Active),
            "INACTIVE" => Ok(IntentStatus::Inactive),
            "SUGGESTED" => Ok(IntentStatus::Suggested),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

/// A labeled classification record with lifecycle status and a default /
/// non-default ownership flag.
///
/// Instances only come out of the validating constructors below, so a
/// partially-invalid `Intent` never exists. Mutation is copy-on-write: every
/// updater returns a fresh validated instance with `updated_at_ms` advanced,
/// leaving the original untouched. `is_default` is fixed for the entity's
/// life; there is deliberately no updater for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    id: IntentId,
    label: String,
    description: String,
    status: IntentStatus,
    synonyms: Vec<String>,
    example_phrases: Vec<String>,
    is_default: bool,
    created_at_ms: u64,
    updated_at_ms: u64,
}

/// Partial update for [`Intent::update`]. Unset fields carry over unchanged.
#[derive(Debug, Clone, Default)]
pub struct IntentPatch {
    pub label: Option<String>,
    pub description: Option<String>,
    pub status: Option<IntentStatus>,
    pub synonyms: Option<Vec<String>>,
    pub example_phrases: Option<Vec<String>>,
}

impl Intent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: IntentId,
        label: &str,
        description: &str,
        status: IntentStatus,
        synonyms: Vec<String>,
        example_phrases: Vec<String>,
        is_default: bool,
    ) -> Result<Self, DomainError> {
        let label = validate::label(label)?;
        let now = now_ms();
        Ok(Self {
            id,
            label,
            description: description.to_string(),
            status,
            synonyms,
            example_phrases,
            is_default,
            created_at_ms: now,
            updated_at_ms: now,
        })
    }

    /// Creation-time factory: additionally rejects INACTIVE, which is only
    /// reachable via update.
    #[allow(clippy::too_many_arguments)]
    pub fn new_for_creation(
        id: IntentId,
        label: &str,
        description: &str,
        status: IntentStatus,
        synonyms: Vec<String>,
        example_phrases: Vec<String>,
        is_default: bool,
    ) -> Result<Self, DomainError> {
        validate::status_for_creation(status)?;
        Self::new(
            id,
            label,
            description,
            status,
            synonyms,
            example_phrases,
            is_default,
        )
    }

    /// Rebuilds a previously-persisted intent. The stored data was validated
    /// on the way in, but the label rule is re-checked defensively.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: IntentId,
        label: String,
        description: String,
        status: IntentStatus,
        synonyms: Vec<String>,
        example_phrases: Vec<String>,
        is_default: bool,
        created_at_ms: u64,
        updated_at_ms: u64,
    ) -> Result<Self, DomainError> {
        let label = validate::label(&label)?;
        Ok(Self {
            id,
            label,
            description,
            status,
            synonyms,
            example_phrases,
            is_default,
            created_at_ms,
            updated_at_ms,
        })
    }

    pub fn id(&self) -> IntentId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> IntentStatus {
        self.status
    }

    pub fn synonyms(&self) -> &[String] {
        &self.synonyms
    }

    pub fn example_phrases(&self) -> &[String] {
        &self.example_phrases
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    pub fn updated_at_ms(&self) -> u64 {
        self.updated_at_ms
    }

    /// Returns a new instance with the patch applied. Fields absent from the
    /// patch carry over; `updated_at_ms` never moves backwards.
    pub fn update(&self, patch: IntentPatch) -> Result<Self, DomainError> {
        let label = match &patch.label {
            Some(raw) => validate::label(raw)?,
            None => self.label.clone(),
        };
        Ok(Self {
            id: self.id,
            label,
            description: patch
                .description
                .unwrap_or_else(|| self.description.clone()),
            status: patch.status.unwrap_or(self.status),
            synonyms: patch.synonyms.unwrap_or_else(|| self.synonyms.clone()),
            example_phrases: patch
                .example_phrases
                .unwrap_or_else(|| self.example_phrases.clone()),
            is_default: self.is_default,
            created_at_ms: self.created_at_ms,
            updated_at_ms: now_ms().max(self.updated_at_ms),
        })
    }

    pub fn with_label(&self, label: &str) -> Result<Self, DomainError> {
        self.update(IntentPatch {
            label: Some(label.to_string()),
            ..IntentPatch::default()
        })
    }

    pub fn with_description(&self, description: &str) -> Result<Self, DomainError> {
        self.update(IntentPatch {
            description: Some(description.to_string()),
            ..IntentPatch::default()
        })
    }

    pub fn with_status(&self, status: IntentStatus) -> Result<Self, DomainError> {
        self.update(IntentPatch {
            status: Some(status),
            ..IntentPatch::default()
        })
    }

    pub fn with_synonyms(&self, synonyms: Vec<String>) -> Result<Self, DomainError> {
        self.update(IntentPatch {
            synonyms: Some(synonyms),
            ..IntentPatch::default()
        })
    }

    pub fn with_example_phrases(&self, example_phrases: Vec<String>) -> Result<Self, DomainError> {
        self.update(IntentPatch {
            example_phrases: Some(example_phrases),
            ..IntentPatch::default()
        })
    }
}
