use std::collections::HashSet;

use async_trait::async_trait;

use crate::access;
use crate::error::DomainError;
use crate::id::{IntentId, ScopeId};
use crate::intent::Intent;

/// Persistence boundary the domain services are written against.
///
/// The relationship rows behave as if backed by unique constraints: `link` on
/// an existing pair is a no-op, `exclude` on an existing pair fails with
/// [`DomainError::AlreadyExcluded`], and duplicate labels fail `create` /
/// `update` with [`DomainError::LabelTaken`] even when the service-level
/// pre-checks raced. Deleting an intent cascades its links and exclusions.
#[async_trait]
pub trait IntentRepository: Send + Sync {
    async fn create(&self, intent: &Intent) -> Result<Intent, DomainError>;
    async fn find_by_id(&self, id: IntentId) -> Result<Option<Intent>, DomainError>;
    async fn find_by_label(&self, label: &str) -> Result<Option<Intent>, DomainError>;
    async fn find_all(&self) -> Result<Vec<Intent>, DomainError>;
    async fn find_all_default(&self) -> Result<Vec<Intent>, DomainError>;
    async fn update(&self, intent: &Intent) -> Result<Intent, DomainError>;
    async fn delete(&self, id: IntentId) -> Result<(), DomainError>;

    async fn link(&self, intent: IntentId, scope: &ScopeId) -> Result<(), DomainError>;
    async fn unlink(&self, intent: IntentId, scope: &ScopeId) -> Result<(), DomainError>;
    async fn exclude(&self, intent: IntentId, scope: &ScopeId) -> Result<(), DomainError>;
    async fn remove_exclusion(&self, intent: IntentId, scope: &ScopeId)
        -> Result<(), DomainError>;

    async fn is_linked(&self, intent: IntentId, scope: &ScopeId) -> Result<bool, DomainError>;
    async fn is_excluded(&self, intent: IntentId, scope: &ScopeId) -> Result<bool, DomainError>;

    async fn linked_ids(&self, scope: &ScopeId) -> Result<HashSet<IntentId>, DomainError>;
    async fn excluded_ids(&self, scope: &ScopeId) -> Result<HashSet<IntentId>, DomainError>;
    async fn scope_ids_for_intent(&self, intent: IntentId) -> Result<Vec<ScopeId>, DomainError>;

    /// The "list intents visible to this scope" query: the full population
    /// plus the scope's two id sets, filtered in memory.
    async fn find_intents_for_scope(&self, scope: &ScopeId) -> Result<Vec<Intent>, DomainError> {
        let intents = self.find_all().await?;
        let linked = self.linked_ids(scope).await?;
        let excluded = self.excluded_ids(scope).await?;
        Ok(access::filter_by_access(intents, &linked, &excluded))
    }
}
