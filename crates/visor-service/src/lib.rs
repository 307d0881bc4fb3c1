//! Application workflows over the intent domain: creation, listing, updates
//! with scope rebinding, deletion, and the link/exclude operations. Each
//! method runs the domain pre-checks in the order the visibility model
//! requires, so a failed validation never leaves a record behind.

use std::sync::Arc;

use visor_core::directory::ensure_scope_exists_for_non_default_intent;
use visor_core::{
    relationship, uniqueness, DomainError, Intent, IntentId, IntentPatch, IntentRepository,
    IntentStatus, ScopeDirectory, ScopeId,
};

/// Input for the creation workflows.
#[derive(Debug, Clone)]
pub struct IntentDraft {
    pub label: String,
    pub description: String,
    pub status: IntentStatus,
    pub synonyms: Vec<String>,
    pub example_phrases: Vec<String>,
}

impl IntentDraft {
    pub fn new(label: impl Into<String>, status: IntentStatus) -> Self {
        Self {
            label: label.into(),
            description: String::new(),
            status,
            synonyms: Vec::new(),
            example_phrases: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn synonyms(mut self, synonyms: Vec<String>) -> Self {
        self.synonyms = synonyms;
        self
    }

    pub fn example_phrases(mut self, example_phrases: Vec<String>) -> Self {
        self.example_phrases = example_phrases;
        self
    }
}

pub struct IntentService {
    repo: Arc<dyn IntentRepository>,
    directory: Arc<dyn ScopeDirectory>,
}

impl IntentService {
    pub fn new(repo: Arc<dyn IntentRepository>, directory: Arc<dyn ScopeDirectory>) -> Self {
        Self { repo, directory }
    }

    /// Creates a shared default intent, implicitly visible to every scope.
    /// No scope validation and no link records.
    pub async fn create_default_intent(&self, draft: IntentDraft) -> Result<Intent, DomainError> {
        uniqueness::ensure_label_is_unique(self.repo.as_ref(), &draft.label, None).await?;
        let intent = Intent::new_for_creation(
            IntentId::new(),
            &draft.label,
            &draft.description,
            draft.status,
            draft.synonyms,
            draft.example_phrases,
            true,
        )?;
        let created = self.repo.create(&intent).await?;
        tracing::info!(id = %created.id(), label = created.label(), "default intent created");
        Ok(created)
    }

    /// Creates a non-default intent owned by the given scopes. Every distinct
    /// scope must exist; the set must be non-empty after de-duplication.
    pub async fn create_scoped_intent(
        &self,
        draft: IntentDraft,
        scopes: &[ScopeId],
    ) -> Result<Intent, DomainError> {
        let scopes = relationship::dedup_scopes(scopes);
        if scopes.is_empty() {
            return Err(DomainError::NoScopesGiven);
        }
        for scope in &scopes {
            ensure_scope_exists_for_non_default_intent(self.directory.as_ref(), scope).await?;
        }
        uniqueness::ensure_label_is_unique(self.repo.as_ref(), &draft.label, None).await?;

        let intent = Intent::new_for_creation(
            IntentId::new(),
            &draft.label,
            &draft.description,
            draft.status,
            draft.synonyms,
            draft.example_phrases,
            false,
        )?;
        let created = self.repo.create(&intent).await?;
        for scope in &scopes {
            relationship::link(self.repo.as_ref(), created.id(), scope).await?;
        }
        tracing::info!(
            id = %created.id(),
            label = created.label(),
            scopes = scopes.len(),
            "scoped intent created"
        );
        Ok(created)
    }

    pub async fn get_intent(&self, id: IntentId) -> Result<Intent, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::IntentNotFound(id))
    }

    pub async fn list_all(&self) -> Result<Vec<Intent>, DomainError> {
        self.repo.find_all().await
    }

    pub async fn list_default(&self) -> Result<Vec<Intent>, DomainError> {
        self.repo.find_all_default().await
    }

    /// The effective visible-intent set for a scope: defaults minus
    /// exclusions, plus explicit links.
    pub async fn list_for_scope(&self, scope: &ScopeId) -> Result<Vec<Intent>, DomainError> {
        self.repo.find_intents_for_scope(scope).await
    }

    /// Applies a field patch and, when `scopes` is given, rebinds the
    /// intent's scope set by symmetric difference (unlink the removed,
    /// validate and link the added, leave the rest alone).
    pub async fn update_intent(
        &self,
        id: IntentId,
        patch: IntentPatch,
        scopes: Option<&[ScopeId]>,
    ) -> Result<Intent, DomainError> {
        let existing = self.get_intent(id).await?;

        if let Some(label) = &patch.label {
            if label.trim() != existing.label() {
                uniqueness::ensure_label_is_unique_for_update(self.repo.as_ref(), label, id)
                    .await?;
            }
        }

        let updated = existing.update(patch)?;
        let updated = self.repo.update(&updated).await?;

        if let Some(scopes) = scopes {
            relationship::rebind(self.repo.as_ref(), self.directory.as_ref(), &updated, scopes)
                .await?;
        }
        tracing::info!(id = %updated.id(), "intent updated");
        Ok(updated)
    }

    /// Deletes the intent; the repository cascades its links and exclusions.
    pub async fn delete_intent(&self, id: IntentId) -> Result<(), DomainError> {
        self.get_intent(id).await?;
        self.repo.delete(id).await?;
        tracing::info!(id = %id, "intent deleted");
        Ok(())
    }

    /// Grants a scope access. For a default intent this only clears an
    /// exclusion if one exists (default visibility is implicit, no link
    /// record is written); for a non-default intent it links, idempotently.
    pub async fn link_intent(&self, id: IntentId, scope: &ScopeId) -> Result<(), DomainError> {
        let intent = self.get_intent(id).await?;
        if !relationship::requires_explicit_linking(&intent) {
            if self.repo.is_excluded(id, scope).await? {
                self.repo.remove_exclusion(id, scope).await?;
            }
            return Ok(());
        }
        relationship::link(self.repo.as_ref(), id, scope).await
    }

    /// Opts a scope out of a default intent. Errors on non-default intents
    /// and on duplicate exclusion.
    pub async fn exclude_intent(&self, id: IntentId, scope: &ScopeId) -> Result<(), DomainError> {
        let intent = self.get_intent(id).await?;
        relationship::ensure_can_be_excluded(&intent)?;
        relationship::exclude(self.repo.as_ref(), id, scope).await
    }
}
