use async_trait::async_trait;
use serde::Deserialize;

use visor_core::{DomainError, ScopeDirectory, ScopeId};

/// What `exists` reports when the scope service cannot be reached or answers
/// with garbage. Treating a failure as "scope absent" blocks writes instead
/// of admitting phantom scopes, but it must be an explicit choice; failing
/// hard is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Propagate the transport failure as a hard error.
    #[default]
    Error,
    /// Log and report the scope as absent.
    FailClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRecord {
    pub id: String,
    pub name: String,
}

/// Response envelope of the scope service: `{ "success": bool, "data": { "id", "name" } }`.
#[derive(Debug, Deserialize)]
struct ScopeEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScopeData>,
}

#[derive(Debug, Deserialize)]
struct ScopeData {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
}

fn record_from_envelope(envelope: ScopeEnvelope) -> Option<ScopeRecord> {
    if !envelope.success {
        return None;
    }
    let data = envelope.data?;
    if data.id.is_empty() || data.name.is_empty() {
        return None;
    }
    Some(ScopeRecord {
        id: data.id,
        name: data.name,
    })
}

#[derive(Debug, Clone)]
pub struct HttpScopeDirectory {
    base_url: String,
    client: reqwest::Client,
    failure_mode: FailureMode,
}

impl HttpScopeDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_failure_mode(base_url, FailureMode::default())
    }

    pub fn with_failure_mode(base_url: impl Into<String>, failure_mode: FailureMode) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            failure_mode,
        }
    }

    /// `GET {base_url}/{scope_id}`. 404 means the scope is absent; any other
    /// non-success status is a directory failure.
    pub async fn find_by_id(&self, scope: &ScopeId) -> Result<Option<ScopeRecord>, DomainError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), scope);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::Directory(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(DomainError::Directory(format!(
                "scope service returned {} for {scope}",
                response.status()
            )));
        }

        let envelope: ScopeEnvelope = response
            .json()
            .await
            .map_err(|e| DomainError::Directory(e.to_string()))?;
        let record = record_from_envelope(envelope);
        if record.is_none() {
            tracing::warn!(%scope, "scope service answered 2xx without a usable record");
        }
        Ok(record)
    }
}

#[async_trait]
impl ScopeDirectory for HttpScopeDirectory {
    async fn exists(&self, scope: &ScopeId) -> Result<bool, DomainError> {
        match self.find_by_id(scope).await {
            Ok(record) => Ok(record.is_some()),
            Err(err) => match self.failure_mode {
                FailureMode::Error => Err(err),
                FailureMode::FailClosed => {
                    tracing::warn!(%scope, %err, "scope lookup failed, treating scope as absent");
                    Ok(false)
                }
            },
        }
    }
}
