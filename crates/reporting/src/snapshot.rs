//! Point-in-time report snapshots: totals, rollups, performers, and
//! recommendations bundled once and never mutated afterwards.

use crate::comparison::SnapshotComparison;
use crate::creative_mix::{creative_mix, CreativeMix};
use crate::funnel::{funnel_breakdown, FunnelStageSummary};
use crate::performers::{rank_performers, PerformerCard};
use chrono::{DateTime, NaiveDate, Utc};
use creative_analytics::goal_metric::primary_metric;
use creative_analytics::kill_scale::{Classification, KillScaleSummary};
use creative_analytics::{
    CohortScorer, CohortWinRate, KillScaleClassifier, Priority, PriorityGenerator,
};
use creative_core::types::{ratio, round2};
use creative_core::{
    AccountScope, Creative, CurrencyFormatter, FunnelStage, Goal, GoalConfig, InsightsResult,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Entries kept per recommendation list.
pub const RECOMMENDATIONS_LISTED: usize = 5;

// ─── Types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTotals {
    pub total_spend: f64,
    pub total_impressions: u64,
    /// Total purchase value over total spend.
    pub avg_roas: f64,
    /// Unweighted mean of creative CTRs.
    pub avg_ctr: f64,
    /// Total spend over total conversions.
    pub avg_cpa: f64,
    pub creative_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedMetrics {
    pub total_purchase_value: f64,
    pub total_clicks: u64,
    pub total_conversions: u64,
    pub total_purchases: u64,
    pub total_leads: u64,
    pub avg_cpc: f64,
    pub avg_cpm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingWindow {
    /// Earliest `date_start`.
    pub start: Option<NaiveDate>,
    /// Latest `date_stop`, or `date_start` for creatives still running.
    pub end: Option<NaiveDate>,
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
    pub stage: FunnelStage,
    pub total: usize,
    pub winners: usize,
    pub win_rate: u32,
}

impl From<&CohortWinRate> for CohortSummary {
    fn from(c: &CohortWinRate) -> Self {
        Self {
            stage: c.stage,
            total: c.total,
            winners: c.winners,
            win_rate: c.win_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub id: String,
    pub ad_name: String,
    pub metric: String,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub scale: Vec<RecommendationEntry>,
    pub kill: Vec<RecommendationEntry>,
    pub iteration_priorities: Vec<Priority>,
    pub summary: KillScaleSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub id: Uuid,
    pub scope: AccountScope,
    pub goal: Goal,
    pub created_at: DateTime<Utc>,
    pub totals: SnapshotTotals,
    pub detailed_metrics: DetailedMetrics,
    pub window: ReportingWindow,
    pub funnel_breakdown: Vec<FunnelStageSummary>,
    pub creative_mix: CreativeMix,
    pub cohorts: Vec<CohortSummary>,
    pub top_performers: Vec<PerformerCard>,
    pub bottom_performers: Vec<PerformerCard>,
    pub recommendations: Recommendations,
    pub previous_snapshot_id: Option<Uuid>,
    pub comparison: Option<SnapshotComparison>,
}

impl ReportSnapshot {
    pub fn to_json_pretty(&self) -> InsightsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of a "generate snapshot" call.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotOutcome {
    Created(Box<ReportSnapshot>),
    /// Nothing in scope has delivered; nothing was built.
    NoData,
}

// ─── Generator ──────────────────────────────────────────────────────────────

/// Builds snapshots. Holds no state; persistence is the caller's job.
pub struct SnapshotGenerator {
    config: GoalConfig,
    fmt: CurrencyFormatter,
}

impl SnapshotGenerator {
    pub fn new(config: GoalConfig, fmt: CurrencyFormatter) -> Self {
        Self { config, fmt }
    }

    pub fn generate(
        &self,
        scope: &AccountScope,
        creatives: &[Creative],
        previous: Option<&ReportSnapshot>,
        created_at: DateTime<Utc>,
    ) -> SnapshotOutcome {
        let delivering: Vec<&Creative> = creatives.iter().filter(|c| c.is_delivering()).collect();
        if delivering.is_empty() {
            debug!(scope = %scope, "No delivering creatives, skipping snapshot");
            return SnapshotOutcome::NoData;
        }

        let goal = self.config.goal;
        let totals = totals(&delivering);
        let comparison = previous.map(|p| SnapshotComparison::between(&totals, &p.totals));

        let win_rates = CohortScorer::new(self.config.clone(), self.fmt.clone()).score(creatives);
        let kill_scale =
            KillScaleClassifier::new(self.config.clone(), self.fmt.clone()).classify(creatives);
        let mut priorities =
            PriorityGenerator::new(self.config.clone(), self.fmt.clone()).generate(creatives);
        priorities.priorities.truncate(RECOMMENDATIONS_LISTED);

        let performers = rank_performers(goal, self.config.spend_threshold, &delivering);

        let snapshot = ReportSnapshot {
            id: Uuid::new_v4(),
            scope: scope.clone(),
            goal,
            created_at,
            detailed_metrics: detailed_metrics(&delivering),
            window: ReportingWindow {
                start: delivering.iter().filter_map(|c| c.date_start).min(),
                end: delivering
                    .iter()
                    .filter_map(|c| c.date_stop.or(c.date_start))
                    .max(),
                days: self.config.date_range_days,
            },
            funnel_breakdown: funnel_breakdown(&delivering),
            creative_mix: creative_mix(goal, &delivering),
            cohorts: win_rates.cohorts.iter().map(CohortSummary::from).collect(),
            top_performers: performers.top,
            bottom_performers: performers.bottom,
            recommendations: Recommendations {
                scale: self.entries(&kill_scale.scale),
                kill: self.entries(&kill_scale.kill),
                iteration_priorities: priorities.priorities,
                summary: kill_scale.summary,
            },
            previous_snapshot_id: previous.map(|p| p.id),
            comparison,
            totals,
        };

        debug!(
            scope = %scope,
            snapshot_id = %snapshot.id,
            goal = %goal,
            creatives = snapshot.totals.creative_count,
            chained = snapshot.previous_snapshot_id.is_some(),
            "Snapshot built"
        );

        SnapshotOutcome::Created(Box::new(snapshot))
    }

    fn entries(&self, bucket: &[Classification]) -> Vec<RecommendationEntry> {
        bucket
            .iter()
            .take(RECOMMENDATIONS_LISTED)
            .map(|c| RecommendationEntry {
                id: c.creative.id.clone(),
                ad_name: c.creative.display_name().to_string(),
                metric: primary_metric(self.config.goal, &c.creative, &self.fmt),
                rationale: c.rationale.clone(),
            })
            .collect()
    }
}

fn totals(delivering: &[&Creative]) -> SnapshotTotals {
    let spend: f64 = delivering.iter().map(|c| c.spend).sum();
    let purchase_value: f64 = delivering.iter().map(|c| c.purchase_value).sum();
    let conversions: u64 = delivering.iter().map(|c| c.conversions).sum();
    let ctr_sum: f64 = delivering.iter().map(|c| c.ctr).sum();

    SnapshotTotals {
        total_spend: round2(spend),
        total_impressions: delivering.iter().map(|c| c.impressions).sum(),
        avg_roas: round2(ratio(purchase_value, spend)),
        avg_ctr: round2(ratio(ctr_sum, delivering.len() as f64)),
        avg_cpa: round2(ratio(spend, conversions as f64)),
        creative_count: delivering.len(),
    }
}

fn detailed_metrics(delivering: &[&Creative]) -> DetailedMetrics {
    let spend: f64 = delivering.iter().map(|c| c.spend).sum();
    let clicks: u64 = delivering.iter().map(|c| c.clicks).sum();
    let impressions: u64 = delivering.iter().map(|c| c.impressions).sum();

    DetailedMetrics {
        total_purchase_value: round2(delivering.iter().map(|c| c.purchase_value).sum()),
        total_clicks: clicks,
        total_conversions: delivering.iter().map(|c| c.conversions).sum(),
        total_purchases: delivering.iter().map(|c| c.purchases).sum(),
        total_leads: delivering.iter().map(|c| c.leads).sum(),
        avg_cpc: round2(ratio(spend, clicks as f64)),
        avg_cpm: round2(ratio(spend, impressions as f64) * 1000.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn generator() -> SnapshotGenerator {
        SnapshotGenerator::new(GoalConfig::default(), CurrencyFormatter::default())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn creative(id: &str, spend: f64, purchase_value: f64, conversions: u64) -> Creative {
        Creative {
            spend,
            purchase_value,
            conversions,
            impressions: 10_000,
            clicks: 100,
            ..Creative::new(id)
        }
        .with_derived_rates()
    }

    fn created(outcome: SnapshotOutcome) -> ReportSnapshot {
        match outcome {
            SnapshotOutcome::Created(snapshot) => *snapshot,
            SnapshotOutcome::NoData => panic!("expected a snapshot"),
        }
    }

    #[test]
    fn test_no_delivery_is_no_data() {
        let items = vec![creative("idle", 0.0, 0.0, 0)];
        let outcome = generator().generate(&AccountScope::all(), &items, None, now());
        assert_eq!(outcome, SnapshotOutcome::NoData);
        let outcome = generator().generate(&AccountScope::all(), &[], None, now());
        assert_eq!(outcome, SnapshotOutcome::NoData);
    }

    #[test]
    fn test_totals_and_detail() {
        let items = vec![
            creative("a", 600.0, 1800.0, 20),
            creative("b", 400.0, 200.0, 0),
            creative("idle", 0.0, 0.0, 0),
        ];
        let snapshot = created(generator().generate(&AccountScope::all(), &items, None, now()));

        let t = &snapshot.totals;
        assert_eq!(t.total_spend, 1000.0);
        assert_eq!(t.total_impressions, 20_000);
        assert_eq!(t.avg_roas, 2.0);
        assert_eq!(t.avg_ctr, 1.0);
        assert_eq!(t.avg_cpa, 50.0);
        assert_eq!(t.creative_count, 2);

        let d = &snapshot.detailed_metrics;
        assert_eq!(d.total_purchase_value, 2000.0);
        assert_eq!(d.total_clicks, 200);
        assert_eq!(d.avg_cpc, 5.0);
        assert_eq!(d.avg_cpm, 50.0);

        assert_eq!(snapshot.previous_snapshot_id, None);
        assert_eq!(snapshot.comparison, None);
        assert_eq!(snapshot.created_at, now());
        assert_eq!(snapshot.top_performers[0].id, "a");
        assert_eq!(snapshot.bottom_performers[0].id, "b");
    }

    #[test]
    fn test_chains_to_previous_snapshot() {
        let first = created(generator().generate(
            &AccountScope::all(),
            &[creative("a", 1000.0, 2000.0, 10)],
            None,
            now(),
        ));
        let second = created(generator().generate(
            &AccountScope::all(),
            &[creative("a", 1200.0, 2400.0, 10)],
            Some(&first),
            now(),
        ));

        assert_eq!(second.previous_snapshot_id, Some(first.id));
        let cmp = second.comparison.expect("comparison");
        assert_eq!(cmp.spend_delta, 200.0);
        assert_eq!(cmp.spend_pct, Some(20.0));
        assert_eq!(cmp.roas_delta, 0.0);
        assert_eq!(cmp.cpa_delta, 20.0);
        assert_eq!(cmp.creative_delta, 0);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_window_spans_delivery_dates() {
        let items = vec![
            Creative {
                date_start: Some(day(3)),
                date_stop: Some(day(20)),
                ..creative("a", 100.0, 0.0, 0)
            },
            Creative {
                date_start: Some(day(1)),
                ..creative("b", 100.0, 0.0, 0)
            },
            Creative {
                date_start: Some(day(12)),
                ..creative("c", 100.0, 0.0, 0)
            },
        ];
        let snapshot = created(generator().generate(&AccountScope::all(), &items, None, now()));
        assert_eq!(snapshot.window.start, Some(day(1)));
        assert_eq!(snapshot.window.end, Some(day(20)));
        assert_eq!(snapshot.window.days, 30);
    }

    #[test]
    fn test_recommendations_are_capped() {
        // roas 0.1 is below half the 2.0 target: every creative is a kill
        let items: Vec<Creative> = (0..8)
            .map(|i| creative(&format!("k{i}"), 100.0 + i as f64, 10.0, 0))
            .collect();
        let snapshot = created(generator().generate(&AccountScope::all(), &items, None, now()));
        let recs = &snapshot.recommendations;
        assert_eq!(recs.summary.kill_count, 8);
        assert_eq!(recs.kill.len(), RECOMMENDATIONS_LISTED);
        assert_eq!(recs.kill[0].id, "k7");
        assert!(recs.kill[0].metric.starts_with("ROAS: "));
        assert!(recs.scale.is_empty());
        assert!(recs.iteration_priorities.len() <= RECOMMENDATIONS_LISTED);
    }

    #[test]
    fn test_json_export() {
        let snapshot = created(generator().generate(
            &AccountScope::account("acct-1"),
            &[creative("a", 100.0, 300.0, 2)],
            None,
            now(),
        ));
        let json = snapshot.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["scope"], "acct-1");
        assert_eq!(value["goal"], "roas");
        assert_eq!(value["totals"]["total_spend"], 100.0);
        assert!(value["comparison"].is_null());
    }
}
