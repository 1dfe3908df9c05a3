//! Snapshot persistence seam and the in-memory store.

use crate::snapshot::ReportSnapshot;
use creative_core::{AccountScope, InsightsError, InsightsResult};
use dashmap::DashMap;
use uuid::Uuid;

/// Append-only snapshot storage, chained per account scope.
pub trait SnapshotStore: Send + Sync {
    /// Append a snapshot. Rejects it unless it links to the current latest
    /// snapshot of its scope.
    fn insert(&self, snapshot: ReportSnapshot) -> InsightsResult<()>;

    fn latest(&self, scope: &AccountScope) -> InsightsResult<Option<ReportSnapshot>>;

    fn get(&self, id: &Uuid) -> InsightsResult<Option<ReportSnapshot>>;

    /// Newest first.
    fn list(&self, scope: &AccountScope) -> InsightsResult<Vec<ReportSnapshot>>;
}

/// Check that `snapshot` extends the chain whose head is `latest`.
pub fn check_chain(latest: Option<&ReportSnapshot>, snapshot: &ReportSnapshot) -> InsightsResult<()> {
    let head = latest.map(|s| s.id);
    if snapshot.previous_snapshot_id != head {
        return Err(InsightsError::Storage(format!(
            "snapshot {} for scope {} links to {:?} but the latest is {:?}",
            snapshot.id, snapshot.scope, snapshot.previous_snapshot_id, head
        )));
    }
    Ok(())
}

#[derive(Default)]
pub struct InMemorySnapshotStore {
    by_scope: DashMap<AccountScope, Vec<ReportSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_scope.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn insert(&self, snapshot: ReportSnapshot) -> InsightsResult<()> {
        let mut chain = self.by_scope.entry(snapshot.scope.clone()).or_default();
        check_chain(chain.last(), &snapshot)?;
        chain.push(snapshot);
        Ok(())
    }

    fn latest(&self, scope: &AccountScope) -> InsightsResult<Option<ReportSnapshot>> {
        Ok(self
            .by_scope
            .get(scope)
            .and_then(|chain| chain.last().cloned()))
    }

    fn get(&self, id: &Uuid) -> InsightsResult<Option<ReportSnapshot>> {
        Ok(self
            .by_scope
            .iter()
            .find_map(|chain| chain.iter().find(|s| s.id == *id).cloned()))
    }

    fn list(&self, scope: &AccountScope) -> InsightsResult<Vec<ReportSnapshot>> {
        Ok(self
            .by_scope
            .get(scope)
            .map(|chain| chain.iter().rev().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{SnapshotGenerator, SnapshotOutcome};
    use chrono::Utc;
    use creative_core::{Creative, CurrencyFormatter, GoalConfig};

    fn build(scope: &AccountScope, previous: Option<&ReportSnapshot>) -> ReportSnapshot {
        let creatives = vec![Creative {
            spend: 100.0,
            account_id: scope.account_id().unwrap_or_default().to_string(),
            ..Creative::new("a")
        }];
        let generator = SnapshotGenerator::new(GoalConfig::default(), CurrencyFormatter::default());
        match generator.generate(scope, &creatives, previous, Utc::now()) {
            SnapshotOutcome::Created(snapshot) => *snapshot,
            SnapshotOutcome::NoData => panic!("expected a snapshot"),
        }
    }

    #[test]
    fn test_insert_and_read_back() {
        let store = InMemorySnapshotStore::new();
        let scope = AccountScope::account("acct-1");
        let first = build(&scope, None);
        store.insert(first.clone()).unwrap();
        let second = build(&scope, Some(&first));
        store.insert(second.clone()).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.latest(&scope).unwrap().map(|s| s.id), Some(second.id));
        assert_eq!(store.get(&first.id).unwrap(), Some(first.clone()));
        let ids: Vec<Uuid> = store.list(&scope).unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_scopes_are_independent() {
        let store = InMemorySnapshotStore::new();
        let all = AccountScope::all();
        let acct = AccountScope::account("acct-1");
        store.insert(build(&all, None)).unwrap();
        store.insert(build(&acct, None)).unwrap();
        assert_eq!(store.list(&all).unwrap().len(), 1);
        assert_eq!(store.list(&acct).unwrap().len(), 1);
        assert!(store.latest(&AccountScope::account("other")).unwrap().is_none());
    }

    #[test]
    fn test_rejects_broken_chain() {
        let store = InMemorySnapshotStore::new();
        let scope = AccountScope::all();
        let first = build(&scope, None);
        store.insert(first.clone()).unwrap();

        // a second head that ignores the existing one
        let stale = build(&scope, None);
        let err = store.insert(stale).unwrap_err();
        assert!(matches!(err, InsightsError::Storage(_)));
        assert_eq!(store.len(), 1);
    }
}
