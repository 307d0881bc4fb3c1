//! Single validation path shared by every construction route into an
//! [`Intent`](crate::intent::Intent): the factory, reconstitution from
//! storage, and updates all call these, so the rules cannot drift.

use crate::error::DomainError;
use crate::intent::IntentStatus;

/// Trims and validates a label. Returns the trimmed form, which is the only
/// form ever stored or compared.
pub fn label(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyLabel);
    }
    Ok(trimmed.to_string())
}

/// Creation accepts only ACTIVE and SUGGESTED; INACTIVE is reachable through
/// updates alone.
pub fn status_for_creation(status: IntentStatus) -> Result<(), DomainError> {
    if status == IntentStatus::Inactive {
        return Err(DomainError::StatusNotCreatable(status));
    }
    Ok(())
}
