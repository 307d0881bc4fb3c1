use async_trait::async_trait;

use crate::error::DomainError;
use crate::id::ScopeId;

/// Existence check against whatever system of record owns scopes. Production
/// deployments answer this with an outbound HTTP call; the core only needs
/// the predicate.
#[async_trait]
pub trait ScopeDirectory: Send + Sync {
    async fn exists(&self, scope: &ScopeId) -> Result<bool, DomainError>;
}

/// A non-default intent may only be bound to a scope that actually exists.
/// Called once per distinct scope id before creation-time binding or a
/// rebind. Default intents carry no ownership records and skip this entirely.
pub async fn ensure_scope_exists_for_non_default_intent(
    directory: &dyn ScopeDirectory,
    scope: &ScopeId,
) -> Result<(), DomainError> {
    if !directory.exists(scope).await? {
        return Err(DomainError::ScopeNotFound(scope.clone()));
    }
    Ok(())
}
