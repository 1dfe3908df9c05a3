//! Cohort-relative win-rate scoring.
//!
//! Every delivering creative gets a 0–100 score from a weighted blend of two
//! percentile ranks, computed only against creatives in the same funnel-stage
//! cohort. Which metrics are blended depends on the cohort, and for BOF and
//! unclassified creatives on the campaign goal:
//!
//! | cohort            | blend                                   |
//! |-------------------|-----------------------------------------|
//! | TOF               | 0.6 CTR + 0.4 (−CPM)                    |
//! | MOF               | 0.5 (−CPC) + 0.5 CTR                    |
//! | BOF, lead_gen     | 0.6 (−CPA) + 0.4 CTR, or 0.5 CTR alone  |
//! | BOF, traffic      | 0.6 CTR + 0.4 (−CPC)                    |
//! | BOF, roas         | 0.6 ROAS + 0.4 (−CPA), or flat credit   |
//!
//! Lower-is-better metrics are negated before ranking.

use crate::stats::{mean, PercentileIndex};
use creative_core::types::{ratio, round2};
use creative_core::{Creative, CurrencyFormatter, FunnelStage, Goal, GoalConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scores at or above this mark a winner.
pub const WINNER_SCORE: u32 = 70;
/// How many scored creatives each cohort surfaces to callers.
pub const SURFACED_PER_COHORT: usize = 20;
/// Secondary-term credit for ROAS-goal creatives with no CPA. A tunable,
/// not derived from anything.
pub const ROAS_NO_CPA_CREDIT: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCreative {
    #[serde(flatten)]
    pub creative: Creative,
    pub score: u32,
    pub primary_metric: String,
    pub secondary_metric: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineMetric {
    pub label: String,
    pub value: f64,
    pub formatted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortWinRate {
    pub stage: FunnelStage,
    pub total: usize,
    pub winners: usize,
    pub win_rate: u32,
    pub headline_metric: HeadlineMetric,
    /// Spend-weighted ROAS for the ROAS goal, 0 otherwise.
    pub blended_roas: f64,
    pub total_spend: f64,
    /// Highest-scoring creatives first, capped at [`SURFACED_PER_COHORT`].
    pub creatives: Vec<ScoredCreative>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinRateReport {
    pub goal: Goal,
    /// Non-empty cohorts in TOF, MOF, BOF, unclassified order.
    pub cohorts: Vec<CohortWinRate>,
}

impl WinRateReport {
    pub fn cohort(&self, stage: FunnelStage) -> Option<&CohortWinRate> {
        self.cohorts.iter().find(|c| c.stage == stage)
    }
}

/// Stateless scorer bound to one call's goal configuration.
pub struct CohortScorer {
    config: GoalConfig,
    fmt: CurrencyFormatter,
}

impl CohortScorer {
    pub fn new(config: GoalConfig, fmt: CurrencyFormatter) -> Self {
        Self { config, fmt }
    }

    pub fn score(&self, creatives: &[Creative]) -> WinRateReport {
        let cohorts = FunnelStage::ordered()
            .into_iter()
            .filter_map(|stage| {
                let items: Vec<&Creative> = creatives
                    .iter()
                    .filter(|c| c.is_delivering() && c.funnel_stage == stage)
                    .collect();
                if items.is_empty() {
                    None
                } else {
                    Some(self.score_cohort(stage, &items))
                }
            })
            .collect();

        WinRateReport {
            goal: self.config.goal,
            cohorts,
        }
    }

    fn score_cohort(&self, stage: FunnelStage, items: &[&Creative]) -> CohortWinRate {
        let mut scored = self.score_members(stage, items);
        scored.sort_by(|a, b| b.score.cmp(&a.score));

        let total = items.len();
        let winners = scored.iter().filter(|c| c.score >= WINNER_SCORE).count();
        let total_spend: f64 = items.iter().map(|c| c.spend).sum();
        let headline_metric = self.headline(items, total_spend);
        let blended_roas = match self.config.goal {
            Goal::Roas => headline_metric.value,
            Goal::LeadGen | Goal::Traffic => 0.0,
        };

        debug!(
            stage = %stage,
            total,
            winners,
            goal = %self.config.goal,
            "Cohort scored"
        );

        scored.truncate(SURFACED_PER_COHORT);
        CohortWinRate {
            stage,
            total,
            winners,
            win_rate: (winners as f64 / total as f64 * 100.0).round() as u32,
            headline_metric,
            blended_roas,
            total_spend: round2(total_spend),
            creatives: scored,
        }
    }

    fn score_members(&self, stage: FunnelStage, items: &[&Creative]) -> Vec<ScoredCreative> {
        let fmt = &self.fmt;
        let ctr_index = PercentileIndex::new(items.iter().map(|c| c.ctr));

        match (stage, self.config.goal) {
            (FunnelStage::Tof, _) => {
                let cpm_index = PercentileIndex::new(items.iter().map(|c| -c.cpm));
                items
                    .iter()
                    .map(|c| {
                        let raw = 0.6 * ctr_index.rank(c.ctr) + 0.4 * cpm_index.rank(-c.cpm);
                        scored(
                            c,
                            raw,
                            format!("CTR: {:.2}%", c.ctr),
                            format!("CPM: {}", fmt.format(c.cpm)),
                        )
                    })
                    .collect()
            }
            (FunnelStage::Mof, _) => {
                let cpc_index = PercentileIndex::new(items.iter().map(|c| -c.cpc));
                items
                    .iter()
                    .map(|c| {
                        let raw = 0.5 * cpc_index.rank(-c.cpc) + 0.5 * ctr_index.rank(c.ctr);
                        scored(
                            c,
                            raw,
                            format!("CPC: {}", fmt.format(c.cpc)),
                            format!("CTR: {:.2}%", c.ctr),
                        )
                    })
                    .collect()
            }
            (_, Goal::LeadGen) => {
                let cpa_index = converting_cpa_index(items);
                items
                    .iter()
                    .map(|c| {
                        if c.cpa > 0.0 {
                            let raw = 0.6 * cpa_index.rank(-c.cpa) + 0.4 * ctr_index.rank(c.ctr);
                            scored(
                                c,
                                raw,
                                format!("CPA: {}", fmt.format(c.cpa)),
                                format!("CTR: {:.2}%", c.ctr),
                            )
                        } else {
                            // No conversions: half-weighted CTR only.
                            let raw = 0.5 * ctr_index.rank(c.ctr);
                            scored(
                                c,
                                raw,
                                "No conversions".to_string(),
                                format!("CTR: {:.2}%", c.ctr),
                            )
                        }
                    })
                    .collect()
            }
            (_, Goal::Traffic) => {
                let cpc_index = PercentileIndex::new(items.iter().map(|c| -c.cpc));
                items
                    .iter()
                    .map(|c| {
                        let raw = 0.6 * ctr_index.rank(c.ctr) + 0.4 * cpc_index.rank(-c.cpc);
                        scored(
                            c,
                            raw,
                            format!("CTR: {:.2}%", c.ctr),
                            format!("CPC: {}", fmt.format(c.cpc)),
                        )
                    })
                    .collect()
            }
            (_, Goal::Roas) => {
                let roas_index = PercentileIndex::new(items.iter().map(|c| c.roas));
                let cpa_index = converting_cpa_index(items);
                items
                    .iter()
                    .map(|c| {
                        let cpa_term = if c.cpa > 0.0 {
                            0.4 * cpa_index.rank(-c.cpa)
                        } else {
                            ROAS_NO_CPA_CREDIT
                        };
                        let raw = 0.6 * roas_index.rank(c.roas) + cpa_term;
                        let secondary = if c.cpa > 0.0 {
                            format!("CPA: {}", fmt.format(c.cpa))
                        } else {
                            "No purchases".to_string()
                        };
                        scored(c, raw, format!("ROAS: {:.2}x", c.roas), secondary)
                    })
                    .collect()
            }
        }
    }

    fn headline(&self, items: &[&Creative], total_spend: f64) -> HeadlineMetric {
        match self.config.goal {
            Goal::LeadGen => {
                let value = mean(items.iter().filter(|c| c.cpa > 0.0).map(|c| c.cpa));
                HeadlineMetric {
                    label: "Avg CPA".into(),
                    value,
                    formatted: self.fmt.format(value),
                }
            }
            Goal::Traffic => {
                let value = mean(items.iter().map(|c| c.ctr));
                HeadlineMetric {
                    label: "Avg CTR".into(),
                    value,
                    formatted: format!("{value:.2}%"),
                }
            }
            Goal::Roas => {
                let revenue: f64 = items.iter().map(|c| c.purchase_value).sum();
                let value = ratio(revenue, total_spend);
                HeadlineMetric {
                    label: "Blended ROAS".into(),
                    value,
                    formatted: format!("{value:.2}x"),
                }
            }
        }
    }
}

/// Negated CPAs of converting creatives only.
fn converting_cpa_index(items: &[&Creative]) -> PercentileIndex {
    PercentileIndex::new(items.iter().filter(|c| c.cpa > 0.0).map(|c| -c.cpa))
}

fn scored(creative: &Creative, raw: f64, primary: String, secondary: String) -> ScoredCreative {
    ScoredCreative {
        creative: creative.clone(),
        score: raw.round().clamp(0.0, 100.0) as u32,
        primary_metric: primary,
        secondary_metric: secondary,
    }
}
