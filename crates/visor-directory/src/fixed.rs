use std::collections::HashSet;

use async_trait::async_trait;

use visor_core::{DomainError, ScopeDirectory, ScopeId};

/// Directory backed by a fixed set of known scope ids.
#[derive(Debug, Clone, Default)]
pub struct StaticScopeDirectory {
    scopes: HashSet<ScopeId>,
}

impl StaticScopeDirectory {
    pub fn new(scopes: impl IntoIterator<Item = ScopeId>) -> Self {
        Self {
            scopes: scopes.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, scope: ScopeId) {
        self.scopes.insert(scope);
    }
}

#[async_trait]
impl ScopeDirectory for StaticScopeDirectory {
    async fn exists(&self, scope: &ScopeId) -> Result<bool, DomainError> {
        Ok(self.scopes.contains(scope))
    }
}
