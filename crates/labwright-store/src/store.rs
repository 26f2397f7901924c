//! Process-wide catalog state with an explicit lifecycle
//!
//! The catalog is loaded once, handed to resolution runs as read-only
//! snapshots, and only edited or reloaded while no run is in flight.

use crate::docs::slots_from_doc;
use crate::{JsonCatalogFile, LoadError, StoreError};
use labwright_domain::{
    item_key, Attributes, Catalog, CatalogIssue, CatalogItem, CatalogSource, Category,
};
use std::sync::{Arc, Mutex, MutexGuard};

struct State {
    catalog: Arc<Catalog>,
    active: usize,
}

/// Owner of the loaded catalog
///
/// Cloning the store is cheap; clones share the same catalog and the same
/// in-flight run count.
pub struct CatalogStore<S = JsonCatalogFile> {
    source: Arc<S>,
    state: Arc<Mutex<State>>,
}

impl<S> Clone for CatalogStore<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
        }
    }
}

/// Read-only view of the catalog held for the duration of one run
///
/// While any snapshot is alive, edits and reloads are refused. Dropping the
/// snapshot releases it.
pub struct CatalogSnapshot {
    catalog: Arc<Catalog>,
    state: Arc<Mutex<State>>,
}

impl CatalogSnapshot {
    /// The catalog as it was when the snapshot was taken
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Shared handle to the snapshot's catalog
    pub fn shared(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }
}

impl Drop for CatalogSnapshot {
    fn drop(&mut self) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.active = state.active.saturating_sub(1);
    }
}

impl<S> CatalogStore<S>
where
    S: CatalogSource<Error = LoadError>,
{
    /// Load the catalog from `source`
    pub fn open(source: S) -> Result<Self, StoreError> {
        let catalog = source.load()?;
        tracing::info!(items = catalog.len(), "Catalog loaded");
        Ok(Self::with_catalog(source, catalog))
    }

    /// Wrap an already-built catalog (nothing is read from `source`)
    pub fn with_catalog(source: S, catalog: Catalog) -> Self {
        Self {
            source: Arc::new(source),
            state: Arc::new(Mutex::new(State {
                catalog: Arc::new(catalog),
                active: 0,
            })),
        }
    }

    /// The persistence collaborator
    pub fn source(&self) -> &S {
        &self.source
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn lock_idle(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        let state = self.lock()?;
        if state.active > 0 {
            tracing::warn!(active = state.active, "Catalog edit refused while runs are in flight");
            return Err(StoreError::Busy(state.active));
        }
        Ok(state)
    }

    /// Take a read-only snapshot for a resolution run
    pub fn snapshot(&self) -> Result<CatalogSnapshot, StoreError> {
        let mut state = self.lock()?;
        state.active += 1;
        Ok(CatalogSnapshot {
            catalog: Arc::clone(&state.catalog),
            state: Arc::clone(&self.state),
        })
    }

    /// Current catalog for read-only browsing (does not block edits)
    pub fn current(&self) -> Result<Arc<Catalog>, StoreError> {
        Ok(Arc::clone(&self.lock()?.catalog))
    }

    /// Number of snapshots currently held
    pub fn active_runs(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.active)
    }

    /// Re-read the catalog from the source
    ///
    /// Returns the number of items loaded.
    pub fn reload(&self) -> Result<usize, StoreError> {
        let mut state = self.lock_idle()?;
        let catalog = self.source.load()?;
        let count = catalog.len();
        state.catalog = Arc::new(catalog);
        tracing::info!(items = count, "Catalog reloaded");
        Ok(count)
    }

    /// Add an item or replace the one with the same name
    ///
    /// The edit is rejected if it would introduce structural problems.
    pub fn upsert(&self, item: CatalogItem) -> Result<Option<CatalogItem>, StoreError> {
        let mut state = self.lock_idle()?;
        let mut next = (*state.catalog).clone();
        let key = item.key();
        let replaced = next.upsert(item)?;

        let issues: Vec<_> = next
            .validate()
            .into_iter()
            .filter(|issue| issue_item_key(issue) == key)
            .collect();
        if !issues.is_empty() {
            return Err(StoreError::Invalid(issues));
        }

        state.catalog = Arc::new(next);
        Ok(replaced)
    }

    /// Add or update an item whose requirements come from documentation
    ///
    /// Each requirement found in `doc_text` becomes a slot (see
    /// [`slots_from_doc`]). Returns the stored item.
    pub fn ingest_documentation(
        &self,
        name: &str,
        category: Category,
        attributes: Attributes,
        doc_text: &str,
    ) -> Result<CatalogItem, StoreError> {
        let slots = {
            let state = self.lock_idle()?;
            slots_from_doc(doc_text, &state.catalog)
        };

        let mut item = CatalogItem::new(name.trim(), category)
            .with_attributes(attributes)
            .with_doc_text(doc_text);
        item.slots = slots;

        tracing::info!(item = %item.name, slots = item.slots.len(), "Ingested documentation");
        self.upsert(item.clone())?;
        Ok(item)
    }

    /// Remove an item
    ///
    /// Refused if other items still name it as a candidate.
    pub fn remove(&self, name: &str) -> Result<CatalogItem, StoreError> {
        let mut state = self.lock_idle()?;
        let mut next = (*state.catalog).clone();
        let removed = next.remove(name)?;
        let key = removed.key();

        let issues: Vec<_> = next
            .validate()
            .into_iter()
            .filter(|issue| {
                matches!(issue, CatalogIssue::DanglingCandidate { candidate, .. } if item_key(candidate) == key)
            })
            .collect();
        if !issues.is_empty() {
            return Err(StoreError::Invalid(issues));
        }

        state.catalog = Arc::new(next);
        Ok(removed)
    }

    /// Persist the current catalog through the source
    pub fn save(&self) -> Result<(), StoreError> {
        let catalog = self.current()?;
        self.source.save(&catalog)?;
        Ok(())
    }
}

fn issue_item_key(issue: &CatalogIssue) -> String {
    match issue {
        CatalogIssue::DanglingCandidate { item, .. }
        | CatalogIssue::ZeroQuantity { item, .. }
        | CatalogIssue::DuplicateSlot { item, .. } => item_key(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labwright_domain::RequirementSlot;

    fn store() -> CatalogStore {
        let catalog = Catalog::from_items([
            CatalogItem::new("LiquidHandler", Category::System)
                .with_slot(RequirementSlot::new("head", ["96-Channel Head"])),
            CatalogItem::new("96-Channel Head", Category::Module),
        ])
        .unwrap();
        CatalogStore::with_catalog(JsonCatalogFile::new("unused.json"), catalog)
    }

    #[test]
    fn test_snapshot_blocks_edits_until_dropped() {
        let store = store();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(store.active_runs().unwrap(), 1);

        let err = store
            .upsert(CatalogItem::new("Steel", Category::RawMaterial))
            .unwrap_err();
        assert!(matches!(err, StoreError::Busy(1)));

        drop(snapshot);
        assert_eq!(store.active_runs().unwrap(), 0);
        assert!(store
            .upsert(CatalogItem::new("Steel", Category::RawMaterial))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_edits() {
        let store = store();
        let before = store.current().unwrap();
        store
            .upsert(CatalogItem::new("Steel", Category::RawMaterial))
            .unwrap();
        assert_eq!(before.len(), 2);
        assert_eq!(store.current().unwrap().len(), 3);
    }

    #[test]
    fn test_upsert_rejects_dangling_candidate() {
        let store = store();
        let bad = CatalogItem::new("Pump", Category::Component)
            .with_slot(RequirementSlot::new("seal", ["Ghost Seal"]));
        assert!(matches!(store.upsert(bad), Err(StoreError::Invalid(_))));
        assert!(!store.current().unwrap().contains("Pump"));
    }

    #[test]
    fn test_remove_referenced_item_is_refused() {
        let store = store();
        assert!(matches!(
            store.remove("96-channel head"),
            Err(StoreError::Invalid(_))
        ));
        assert_eq!(store.remove("LiquidHandler").unwrap().name, "LiquidHandler");
    }

    #[test]
    fn test_remove_ignores_unrelated_issues() {
        let catalog = Catalog::from_items([
            CatalogItem::new("Pump", Category::Component)
                .with_slot(RequirementSlot::new("seal", ["Ghost Seal"])),
            CatalogItem::new("Steel", Category::RawMaterial),
        ])
        .unwrap();
        let store = CatalogStore::with_catalog(JsonCatalogFile::new("unused.json"), catalog);

        assert_eq!(store.remove("steel").unwrap().name, "Steel");
        assert!(!store.current().unwrap().contains("Steel"));
        assert!(store.current().unwrap().contains("Pump"));
    }

    #[test]
    fn test_ingest_documentation() {
        let store = store();
        let item = store
            .ingest_documentation(
                "Compact Handler",
                Category::System,
                Attributes::new(),
                "Requires: [96-Channel Head, Power Supply]",
            )
            .unwrap();

        assert_eq!(item.slots.len(), 2);
        assert_eq!(item.slots[0].candidates, vec!["96-Channel Head".to_string()]);
        assert_eq!(item.slots[1].category, Some(Category::parse("Power Supply")));
        assert!(store.current().unwrap().contains("compact handler"));
    }
}
