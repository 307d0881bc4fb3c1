//! Link/exclude state machine between an intent and a scope.
//!
//! Per (scope, intent) pair the state is Unrelated, Linked, or Excluded,
//! interpreted together with the intent's default flag: a non-default intent
//! only moves Unrelated ⇄ Linked, a default intent only Unrelated ⇄ Excluded.
//! Linking is a monotonic "ensure" operation and is idempotent; excluding is
//! a one-shot transition that errors on duplicate application. The asymmetry
//! is intentional.

use std::collections::HashSet;

use crate::directory::{ensure_scope_exists_for_non_default_intent, ScopeDirectory};
use crate::error::DomainError;
use crate::id::{IntentId, ScopeId};
use crate::intent::Intent;
use crate::repository::IntentRepository;

/// Only default intents can be excluded; a non-default intent is simply never
/// linked in the first place.
pub fn ensure_can_be_excluded(intent: &Intent) -> Result<(), DomainError> {
    if !intent.is_default() {
        return Err(DomainError::ExcludeNonDefault(intent.id()));
    }
    Ok(())
}

/// Default intents are implicitly visible everywhere and need no link record.
pub fn requires_explicit_linking(intent: &Intent) -> bool {
    !intent.is_default()
}

/// Links an intent to a scope. An existing exclusion is removed first
/// (linking implicitly un-excludes); an existing link makes this a no-op.
pub async fn link(
    repo: &dyn IntentRepository,
    intent: IntentId,
    scope: &ScopeId,
) -> Result<(), DomainError> {
    if repo.is_excluded(intent, scope).await? {
        repo.remove_exclusion(intent, scope).await?;
    }
    if !repo.is_linked(intent, scope).await? {
        repo.link(intent, scope).await?;
    }
    Ok(())
}

/// Excludes an intent from a scope. Errors if the exclusion already exists;
/// callers are forced to check state or handle the conflict.
pub async fn exclude(
    repo: &dyn IntentRepository,
    intent: IntentId,
    scope: &ScopeId,
) -> Result<(), DomainError> {
    if repo.is_excluded(intent, scope).await? {
        return Err(DomainError::AlreadyExcluded {
            intent,
            scope: scope.clone(),
        });
    }
    repo.exclude(intent, scope).await
}

/// De-duplicates scope ids by identifier string, preserving first-seen order.
pub fn dedup_scopes(scopes: &[ScopeId]) -> Vec<ScopeId> {
    let mut seen = HashSet::new();
    scopes
        .iter()
        .filter(|scope| seen.insert(scope.as_str().to_string()))
        .cloned()
        .collect()
}

/// Rebinds an intent to a new scope set by symmetric difference against the
/// currently-bound set: scopes only in the old set are unlinked, scopes only
/// in the new set are existence-validated (skipped for default intents) and
/// then linked, scopes in both are untouched.
pub async fn rebind(
    repo: &dyn IntentRepository,
    directory: &dyn ScopeDirectory,
    intent: &Intent,
    desired: &[ScopeId],
) -> Result<(), DomainError> {
    let desired = dedup_scopes(desired);
    let current: HashSet<ScopeId> = repo
        .scope_ids_for_intent(intent.id())
        .await?
        .into_iter()
        .collect();
    let desired_set: HashSet<ScopeId> = desired.iter().cloned().collect();

    for scope in current.iter().filter(|s| !desired_set.contains(*s)) {
        repo.unlink(intent.id(), scope).await?;
    }
    for scope in desired.iter().filter(|s| !current.contains(*s)) {
        if requires_explicit_linking(intent) {
            ensure_scope_exists_for_non_default_intent(directory, scope).await?;
        }
        link(repo, intent.id(), scope).await?;
    }
    Ok(())
}
