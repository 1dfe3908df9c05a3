//! Collaborator seams: where creatives, settings, and currency come from.
//!
//! The analytics core never reaches for a database on its own: callers hand
//! it implementations of these traits. In-memory implementations are
//! provided for tests, the CLI, and embedding.

use crate::error::{InsightsError, InsightsResult};
use crate::types::{AccountScope, Creative};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::warn;

/// Yields raw creative records, optionally filtered by account.
pub trait CreativeRepository: Send + Sync {
    fn creatives(&self, scope: &AccountScope) -> InsightsResult<Vec<Creative>>;
}

/// Yields string-valued settings consumed by the goal resolver.
pub trait SettingsProvider: Send + Sync {
    fn settings(&self) -> InsightsResult<HashMap<String, String>>;
}

/// Yields the currency code used for display formatting.
pub trait CurrencyProvider: Send + Sync {
    fn currency_code(&self, scope: &AccountScope) -> InsightsResult<Option<String>>;
}

// ─── In-memory implementations ──────────────────────────────────────────────

/// Creative store that validates records on the way in.
#[derive(Default)]
pub struct InMemoryCreativeRepository {
    creatives: RwLock<CreativeIndex>,
}

/// Records in first-insert order, with an id lookup for replacement.
#[derive(Default)]
struct CreativeIndex {
    records: Vec<Creative>,
    positions: HashMap<String, usize>,
}

impl InMemoryCreativeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace (by id) a creative after validating it.
    pub fn upsert(&self, creative: Creative) -> InsightsResult<()> {
        if let Err(err) = creative.validate() {
            metrics::counter!("insights.creatives.rejected").increment(1);
            return Err(err);
        }
        let mut index = self.creatives.write();
        let existing = index.positions.get(&creative.id).copied();
        match existing {
            Some(pos) => index.records[pos] = creative,
            None => {
                let pos = index.records.len();
                index.positions.insert(creative.id.clone(), pos);
                index.records.push(creative);
            }
        }
        Ok(())
    }

    /// Load a batch, skipping invalid records. Returns how many were rejected.
    pub fn load(&self, batch: impl IntoIterator<Item = Creative>) -> usize {
        let mut rejected = 0;
        for creative in batch {
            let id = creative.id.clone();
            if let Err(err) = self.upsert(creative) {
                warn!(creative_id = %id, error = %err, "Rejected creative record");
                rejected += 1;
            }
        }
        rejected
    }

    pub fn len(&self) -> usize {
        self.creatives.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatives.read().records.is_empty()
    }
}

impl CreativeRepository for InMemoryCreativeRepository {
    fn creatives(&self, scope: &AccountScope) -> InsightsResult<Vec<Creative>> {
        Ok(self
            .creatives
            .read()
            .records
            .iter()
            .filter(|c| scope.matches(c))
            .cloned()
            .collect())
    }
}

/// Fixed key/value settings.
#[derive(Default)]
pub struct StaticSettings {
    values: RwLock<HashMap<String, String>>,
}

impl StaticSettings {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.write().insert(key.into(), value.into());
    }
}

impl SettingsProvider for StaticSettings {
    fn settings(&self) -> InsightsResult<HashMap<String, String>> {
        Ok(self.values.read().clone())
    }
}

/// Per-account currency codes with a fallback for unscoped reads.
pub struct AccountCurrencies {
    default_code: String,
    by_account: HashMap<String, String>,
}

impl AccountCurrencies {
    pub fn new(default_code: impl Into<String>) -> Self {
        Self {
            default_code: default_code.into(),
            by_account: HashMap::new(),
        }
    }

    pub fn with_account(mut self, account_id: impl Into<String>, code: impl Into<String>) -> Self {
        self.by_account.insert(account_id.into(), code.into());
        self
    }
}

impl CurrencyProvider for AccountCurrencies {
    fn currency_code(&self, scope: &AccountScope) -> InsightsResult<Option<String>> {
        let code = scope
            .account_id()
            .and_then(|id| self.by_account.get(id))
            .unwrap_or(&self.default_code);
        if code.trim().is_empty() {
            return Err(InsightsError::Config("currency code is empty".into()));
        }
        Ok(Some(code.clone()))
    }
}
