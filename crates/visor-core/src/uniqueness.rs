//! Global label uniqueness policy. Stateless: a pure pre-check over a
//! repository lookup, consulted before every create and before every
//! label-changing update. Under concurrent creations the store's label index
//! is the final arbiter; this check exists for early rejection.

use crate::error::DomainError;
use crate::id::IntentId;
use crate::repository::IntentRepository;

pub async fn ensure_label_is_unique(
    repo: &dyn IntentRepository,
    label: &str,
    exclude: Option<IntentId>,
) -> Result<(), DomainError> {
    let existing = repo.find_by_label(label.trim()).await?;
    if let Some(existing) = existing {
        if exclude != Some(existing.id()) {
            return Err(DomainError::LabelTaken(label.trim().to_string()));
        }
    }
    Ok(())
}

/// Update-time variant: an intent may keep its own label.
pub async fn ensure_label_is_unique_for_update(
    repo: &dyn IntentRepository,
    label: &str,
    current: IntentId,
) -> Result<(), DomainError> {
    ensure_label_is_unique(repo, label, Some(current)).await
}
