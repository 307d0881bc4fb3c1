//! redb-backed implementation of the [`IntentRepository`] contract.
//!
//! Four tables: the intent records, a label index, and one table each for
//! link and exclusion pairs. The label index and the composite pair keys are
//! the final arbiters for the uniqueness rules — the service-level pre-checks
//! only exist for early rejection, so every conflict is re-detected here
//! inside the write transaction that would violate it.

mod record;

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};

use visor_core::{DomainError, Intent, IntentId, IntentRepository, ScopeId};

use crate::record::IntentRecord;

const INTENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("intents");
const LABELS: TableDefinition<&str, &str> = TableDefinition::new("labels");
// (scope id, intent id) composite keys; pair uniqueness comes from the key.
const LINKS: TableDefinition<(&str, &str), ()> = TableDefinition::new("links");
const EXCLUSIONS: TableDefinition<(&str, &str), ()> = TableDefinition::new("exclusions");

fn storage<E: fmt::Display>(e: E) -> DomainError {
    DomainError::Storage(e.to_string())
}

pub struct IntentStore {
    db: Database,
}

impl IntentStore {
    /// Opens (creating if absent) the database at `path` and ensures all
    /// tables exist so read transactions never race table creation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let db = Database::create(path).map_err(storage)?;
        let txn = db.begin_write().map_err(storage)?;
        {
            txn.open_table(INTENTS).map_err(storage)?;
            txn.open_table(LABELS).map_err(storage)?;
            txn.open_table(LINKS).map_err(storage)?;
            txn.open_table(EXCLUSIONS).map_err(storage)?;
        }
        txn.commit().map_err(storage)?;
        Ok(Self { db })
    }

    fn load_all(&self, defaults_only: bool) -> Result<Vec<Intent>, DomainError> {
        let txn = self.db.begin_read().map_err(storage)?;
        let table = txn.open_table(INTENTS).map_err(storage)?;
        let mut intents = Vec::new();
        for entry in table.iter().map_err(storage)? {
            let (_, value) = entry.map_err(storage)?;
            let record: IntentRecord = serde_json::from_slice(value.value()).map_err(storage)?;
            if defaults_only && !record.is_default {
                continue;
            }
            intents.push(record.into_intent()?);
        }
        // newest first
        intents.sort_by(|a, b| b.created_at_ms().cmp(&a.created_at_ms()));
        Ok(intents)
    }

    fn pair_exists(
        &self,
        table: TableDefinition<(&str, &str), ()>,
        intent: IntentId,
        scope: &ScopeId,
    ) -> Result<bool, DomainError> {
        let txn = self.db.begin_read().map_err(storage)?;
        let table = txn.open_table(table).map_err(storage)?;
        let hit = table
            .get((scope.as_str(), intent.to_string().as_str()))
            .map_err(storage)?;
        Ok(hit.is_some())
    }

    fn ids_for_scope(
        &self,
        table: TableDefinition<(&str, &str), ()>,
        scope: &ScopeId,
    ) -> Result<HashSet<IntentId>, DomainError> {
        let txn = self.db.begin_read().map_err(storage)?;
        let table = txn.open_table(table).map_err(storage)?;
        let mut ids = HashSet::new();
        for entry in table.range((scope.as_str(), "")..).map_err(storage)? {
            let (key, _) = entry.map_err(storage)?;
            let (entry_scope, intent) = key.value();
            if entry_scope != scope.as_str() {
                break;
            }
            ids.insert(IntentId::from_string(intent).map_err(storage)?);
        }
        Ok(ids)
    }

    fn remove_pair(
        &self,
        table: TableDefinition<(&str, &str), ()>,
        intent: IntentId,
        scope: &ScopeId,
    ) -> Result<(), DomainError> {
        let txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = txn.open_table(table).map_err(storage)?;
            table
                .remove((scope.as_str(), intent.to_string().as_str()))
                .map_err(storage)?;
        }
        txn.commit().map_err(storage)
    }
}

#[async_trait]
impl IntentRepository for IntentStore {
    async fn create(&self, intent: &Intent) -> Result<Intent, DomainError> {
        let record = IntentRecord::from_intent(intent);
        let payload = serde_json::to_vec(&record).map_err(storage)?;
        let txn = self.db.begin_write().map_err(storage)?;
        {
            let mut labels = txn.open_table(LABELS).map_err(storage)?;
            let occupant = labels
                .get(intent.label())
                .map_err(storage)?
                .map(|g| g.value().to_string());
            if occupant.is_some_and(|id| id != record.id) {
                return Err(DomainError::LabelTaken(intent.label().to_string()));
            }
            labels
                .insert(intent.label(), record.id.as_str())
                .map_err(storage)?;

            let mut intents = txn.open_table(INTENTS).map_err(storage)?;
            intents
                .insert(record.id.as_str(), payload.as_slice())
                .map_err(storage)?;
        }
        txn.commit().map_err(storage)?;
        tracing::debug!(id = %intent.id(), label = intent.label(), "intent created");
        Ok(intent.clone())
    }

    async fn find_by_id(&self, id: IntentId) -> Result<Option<Intent>, DomainError> {
        let txn = self.db.begin_read().map_err(storage)?;
        let table = txn.open_table(INTENTS).map_err(storage)?;
        let Some(value) = table.get(id.to_string().as_str()).map_err(storage)? else {
            return Ok(None);
        };
        let record: IntentRecord = serde_json::from_slice(value.value()).map_err(storage)?;
        Ok(Some(record.into_intent()?))
    }

    async fn find_by_label(&self, label: &str) -> Result<Option<Intent>, DomainError> {
        let txn = self.db.begin_read().map_err(storage)?;
        let labels = txn.open_table(LABELS).map_err(storage)?;
        let Some(id) = labels
            .get(label)
            .map_err(storage)?
            .map(|g| g.value().to_string())
        else {
            return Ok(None);
        };
        let intents = txn.open_table(INTENTS).map_err(storage)?;
        let Some(value) = intents.get(id.as_str()).map_err(storage)? else {
            return Ok(None);
        };
        let record: IntentRecord = serde_json::from_slice(value.value()).map_err(storage)?;
        Ok(Some(record.into_intent()?))
    }

    async fn find_all(&self) -> Result<Vec<Intent>, DomainError> {
        self.load_all(false)
    }

    async fn find_all_default(&self) -> Result<Vec<Intent>, DomainError> {
        self.load_all(true)
    }

    async fn update(&self, intent: &Intent) -> Result<Intent, DomainError> {
        let record = IntentRecord::from_intent(intent);
        let payload = serde_json::to_vec(&record).map_err(storage)?;
        let txn = self.db.begin_write().map_err(storage)?;
        {
            let mut intents = txn.open_table(INTENTS).map_err(storage)?;
            let prior = intents
                .get(record.id.as_str())
                .map_err(storage)?
                .map(|g| g.value().to_vec());
            let Some(prior) = prior else {
                return Err(DomainError::IntentNotFound(intent.id()));
            };
            let prior: IntentRecord = serde_json::from_slice(&prior).map_err(storage)?;

            if prior.label != record.label {
                let mut labels = txn.open_table(LABELS).map_err(storage)?;
                let occupant = labels
                    .get(record.label.as_str())
                    .map_err(storage)?
                    .map(|g| g.value().to_string());
                if occupant.is_some_and(|id| id != record.id) {
                    return Err(DomainError::LabelTaken(record.label.clone()));
                }
                labels.remove(prior.label.as_str()).map_err(storage)?;
                labels
                    .insert(record.label.as_str(), record.id.as_str())
                    .map_err(storage)?;
            }

            intents
                .insert(record.id.as_str(), payload.as_slice())
                .map_err(storage)?;
        }
        txn.commit().map_err(storage)?;
        tracing::debug!(id = %intent.id(), "intent updated");
        Ok(intent.clone())
    }

    async fn delete(&self, id: IntentId) -> Result<(), DomainError> {
        let id_str = id.to_string();
        let txn = self.db.begin_write().map_err(storage)?;
        {
            let mut intents = txn.open_table(INTENTS).map_err(storage)?;
            let prior = intents
                .remove(id_str.as_str())
                .map_err(storage)?
                .map(|g| g.value().to_vec());
            let Some(prior) = prior else {
                // nothing stored for this id; removal is idempotent
                return Ok(());
            };
            let prior: IntentRecord = serde_json::from_slice(&prior).map_err(storage)?;

            let mut labels = txn.open_table(LABELS).map_err(storage)?;
            labels.remove(prior.label.as_str()).map_err(storage)?;

            // cascade: drop every link and exclusion row for this intent
            for def in [LINKS, EXCLUSIONS] {
                let mut table = txn.open_table(def).map_err(storage)?;
                let mut doomed = Vec::new();
                for entry in table.iter().map_err(storage)? {
                    let (key, _) = entry.map_err(storage)?;
                    let (scope, intent) = key.value();
                    if intent == id_str {
                        doomed.push(scope.to_string());
                    }
                }
                for scope in doomed {
                    table
                        .remove((scope.as_str(), id_str.as_str()))
                        .map_err(storage)?;
                }
            }
        }
        txn.commit().map_err(storage)?;
        tracing::debug!(id = %id, "intent deleted");
        Ok(())
    }

    async fn link(&self, intent: IntentId, scope: &ScopeId) -> Result<(), DomainError> {
        let txn = self.db.begin_write().map_err(storage)?;
        {
            let mut links = txn.open_table(LINKS).map_err(storage)?;
            links
                .insert((scope.as_str(), intent.to_string().as_str()), ())
                .map_err(storage)?;
        }
        txn.commit().map_err(storage)?;
        tracing::debug!(intent = %intent, scope = %scope, "link stored");
        Ok(())
    }

    async fn unlink(&self, intent: IntentId, scope: &ScopeId) -> Result<(), DomainError> {
        self.remove_pair(LINKS, intent, scope)
    }

    async fn exclude(&self, intent: IntentId, scope: &ScopeId) -> Result<(), DomainError> {
        let txn = self.db.begin_write().map_err(storage)?;
        {
            let mut exclusions = txn.open_table(EXCLUSIONS).map_err(storage)?;
            let previous = exclusions
                .insert((scope.as_str(), intent.to_string().as_str()), ())
                .map_err(storage)?;
            if previous.is_some() {
                return Err(DomainError::AlreadyExcluded {
                    intent,
                    scope: scope.clone(),
                });
            }
        }
        txn.commit().map_err(storage)?;
        tracing::debug!(intent = %intent, scope = %scope, "exclusion stored");
        Ok(())
    }

    async fn remove_exclusion(
        &self,
        intent: IntentId,
        scope: &ScopeId,
    ) -> Result<(), DomainError> {
        self.remove_pair(EXCLUSIONS, intent, scope)
    }

    async fn is_linked(&self, intent: IntentId, scope: &ScopeId) -> Result<bool, DomainError> {
        self.pair_exists(LINKS, intent, scope)
    }

    async fn is_excluded(&self, intent: IntentId, scope: &ScopeId) -> Result<bool, DomainError> {
        self.pair_exists(EXCLUSIONS, intent, scope)
    }

    async fn linked_ids(&self, scope: &ScopeId) -> Result<HashSet<IntentId>, DomainError> {
        self.ids_for_scope(LINKS, scope)
    }

    async fn excluded_ids(&self, scope: &ScopeId) -> Result<HashSet<IntentId>, DomainError> {
        self.ids_for_scope(EXCLUSIONS, scope)
    }

    async fn scope_ids_for_intent(&self, intent: IntentId) -> Result<Vec<ScopeId>, DomainError> {
        // no reverse index is kept; scan the link table
        let id_str = intent.to_string();
        let txn = self.db.begin_read().map_err(storage)?;
        let links = txn.open_table(LINKS).map_err(storage)?;
        let mut scopes = Vec::new();
        for entry in links.iter().map_err(storage)? {
            let (key, _) = entry.map_err(storage)?;
            let (scope, linked_intent) = key.value();
            if linked_intent == id_str {
                scopes.push(ScopeId::new(scope)?);
            }
        }
        Ok(scopes)
    }
}
