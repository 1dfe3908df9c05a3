//! Funnel-stage rollups: spend share and spend-weighted delivery rates per
//! stage.

use creative_core::types::{ratio, round2};
use creative_core::{Creative, FunnelStage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStageSummary {
    pub stage: FunnelStage,
    pub creative_count: usize,
    pub spend: f64,
    /// Share of total spend, one decimal place.
    pub spend_share_pct: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub roas: f64,
    pub cpa: f64,
}

#[derive(Default)]
struct StageTotals {
    count: usize,
    spend: f64,
    impressions: u64,
    clicks: u64,
    conversions: u64,
    purchase_value: f64,
}

/// One row per stage with delivery, highest spend first.
pub fn funnel_breakdown(delivering: &[&Creative]) -> Vec<FunnelStageSummary> {
    let total_spend: f64 = delivering.iter().map(|c| c.spend).sum();

    let mut rows: Vec<FunnelStageSummary> = FunnelStage::ordered()
        .into_iter()
        .filter_map(|stage| {
            let totals = delivering
                .iter()
                .filter(|c| c.funnel_stage == stage)
                .fold(StageTotals::default(), |mut t, c| {
                    t.count += 1;
                    t.spend += c.spend;
                    t.impressions += c.impressions;
                    t.clicks += c.clicks;
                    t.conversions += c.conversions;
                    t.purchase_value += c.purchase_value;
                    t
                });
            (totals.count > 0).then(|| summarize(stage, &totals, total_spend))
        })
        .collect();

    rows.sort_by(|a, b| b.spend.total_cmp(&a.spend));
    rows
}

fn summarize(stage: FunnelStage, t: &StageTotals, total_spend: f64) -> FunnelStageSummary {
    let impressions = t.impressions as f64;
    let clicks = t.clicks as f64;
    FunnelStageSummary {
        stage,
        creative_count: t.count,
        spend: round2(t.spend),
        spend_share_pct: (ratio(t.spend, total_spend) * 1000.0).round() / 10.0,
        impressions: t.impressions,
        clicks: t.clicks,
        conversions: t.conversions,
        ctr: round2(ratio(clicks, impressions) * 100.0),
        cpc: round2(ratio(t.spend, clicks)),
        cpm: round2(ratio(t.spend, impressions) * 1000.0),
        roas: round2(ratio(t.purchase_value, t.spend)),
        cpa: round2(ratio(t.spend, t.conversions as f64)),
    }
}
