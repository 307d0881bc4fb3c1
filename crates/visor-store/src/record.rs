use serde::{Deserialize, Serialize};

use visor_core::{DomainError, Intent, IntentId, IntentStatus};

/// On-disk shape of an intent. Kept separate from the entity so every load
/// goes back through `Intent::reconstitute` and its validation.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct IntentRecord {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub example_phrases: Vec<String>,
    pub is_default: bool,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl IntentRecord {
    pub fn from_intent(intent: &Intent) -> Self {
        Self {
            id: intent.id().to_string(),
            label: intent.label().to_string(),
            description: intent.description().to_string(),
            status: intent.status().as_str().to_string(),
            synonyms: intent.synonyms().to_vec(),
            example_phrases: intent.example_phrases().to_vec(),
            is_default: intent.is_default(),
            created_at_ms: intent.created_at_ms(),
            updated_at_ms: intent.updated_at_ms(),
        }
    }

    pub fn into_intent(self) -> Result<Intent, DomainError> {
        let id = IntentId::from_string(&self.id)?;
        let status: IntentStatus = self.status.parse()?;
        Intent::reconstitute(
            id,
            self.label,
            self.description,
            status,
            self.synonyms,
            self.example_phrases,
            self.is_default,
            self.created_at_ms,
            self.updated_at_ms,
        )
    }
}
