//! Service facade: resolves goal and currency per call, reads creatives
//! through the repository, and runs the analytics over them.

use crate::snapshot::{ReportSnapshot, SnapshotGenerator, SnapshotOutcome};
use crate::store::SnapshotStore;
use chrono::{DateTime, Utc};
use creative_analytics::{
    CohortScorer, KillScaleClassifier, KillScaleReport, PriorityGenerator, PriorityReport,
    WinRateReport,
};
use creative_core::{
    AccountScope, Creative, CreativeRepository, CurrencyFormatter, CurrencyProvider, GoalConfig,
    InsightsResult, SettingsProvider,
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Everything one analytical call needs, resolved once up front.
struct CallContext {
    config: GoalConfig,
    fmt: CurrencyFormatter,
    creatives: Vec<Creative>,
}

pub struct InsightsService {
    creatives: Arc<dyn CreativeRepository>,
    settings: Arc<dyn SettingsProvider>,
    currencies: Arc<dyn CurrencyProvider>,
    snapshots: Arc<dyn SnapshotStore>,
}

impl InsightsService {
    pub fn new(
        creatives: Arc<dyn CreativeRepository>,
        settings: Arc<dyn SettingsProvider>,
        currencies: Arc<dyn CurrencyProvider>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            creatives,
            settings,
            currencies,
            snapshots,
        }
    }

    fn context(&self, scope: &AccountScope) -> InsightsResult<CallContext> {
        let config = GoalConfig::resolve(&self.settings.settings()?);
        let code = self.currencies.currency_code(scope)?;
        let fmt = code
            .as_deref()
            .map(CurrencyFormatter::new)
            .unwrap_or_default();
        let creatives = self.creatives.creatives(scope)?;
        debug!(
            scope = %scope,
            goal = %config.goal,
            currency = fmt.code(),
            creatives = creatives.len(),
            "Resolved call context"
        );
        Ok(CallContext {
            config,
            fmt,
            creatives,
        })
    }

    /// Cohort win rates.
    pub fn win_rates(&self, scope: &AccountScope) -> InsightsResult<WinRateReport> {
        let ctx = self.context(scope)?;
        Ok(CohortScorer::new(ctx.config, ctx.fmt).score(&ctx.creatives))
    }

    /// Scale / watch / kill buckets.
    pub fn kill_scale(&self, scope: &AccountScope) -> InsightsResult<KillScaleReport> {
        let ctx = self.context(scope)?;
        Ok(KillScaleClassifier::new(ctx.config, ctx.fmt).classify(&ctx.creatives))
    }

    /// Full, untruncated priority backlog.
    pub fn iteration_priorities(&self, scope: &AccountScope) -> InsightsResult<PriorityReport> {
        let ctx = self.context(scope)?;
        Ok(PriorityGenerator::new(ctx.config, ctx.fmt).generate(&ctx.creatives))
    }

    pub fn generate_snapshot(&self, scope: &AccountScope) -> InsightsResult<SnapshotOutcome> {
        self.generate_snapshot_at(scope, Utc::now())
    }

    /// Build and persist a snapshot chained to the latest one in `scope`.
    /// Callers must not run two of these concurrently for one scope; the
    /// store rejects the loser.
    pub fn generate_snapshot_at(
        &self,
        scope: &AccountScope,
        created_at: DateTime<Utc>,
    ) -> InsightsResult<SnapshotOutcome> {
        let ctx = self.context(scope)?;
        let previous = self.snapshots.latest(scope)?;

        let outcome = SnapshotGenerator::new(ctx.config, ctx.fmt).generate(
            scope,
            &ctx.creatives,
            previous.as_ref(),
            created_at,
        );

        match &outcome {
            SnapshotOutcome::Created(snapshot) => {
                self.snapshots.insert(snapshot.as_ref().clone())?;
                metrics::counter!("insights.snapshots.generated").increment(1);
                info!(
                    scope = %scope,
                    snapshot_id = %snapshot.id,
                    previous_snapshot_id = ?snapshot.previous_snapshot_id,
                    total_spend = snapshot.totals.total_spend,
                    creatives = snapshot.totals.creative_count,
                    "Snapshot generated"
                );
            }
            SnapshotOutcome::NoData => {
                metrics::counter!("insights.snapshots.no_data").increment(1);
                info!(scope = %scope, "No delivering creatives, snapshot not created");
            }
        }
        Ok(outcome)
    }

    /// Stored snapshots for a scope, newest first.
    pub fn snapshots(&self, scope: &AccountScope) -> InsightsResult<Vec<ReportSnapshot>> {
        self.snapshots.list(scope)
    }

    pub fn snapshot(&self, id: &Uuid) -> InsightsResult<Option<ReportSnapshot>> {
        self.snapshots.get(id)
    }
}
