//! Scale / Watch / Kill classification with human-readable rationale.

use crate::stats::{mean, median};
use creative_core::types::round2;
use creative_core::{Creative, CurrencyFormatter, Goal, GoalConfig};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Lead-gen CPA beyond this multiple of target is a kill.
pub const KILL_CPA_MULTIPLIER: f64 = 1.5;
/// ROAS below this fraction of target is a kill.
pub const KILL_ROAS_FRACTION: f64 = 0.5;
/// Traffic CTR must beat the median by this factor to scale.
pub const SCALE_CTR_LIFT: f64 = 1.3;
/// Traffic CTR below this fraction of the median is a kill.
pub const KILL_CTR_FRACTION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Scale,
    Watch,
    Kill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(flatten)]
    pub creative: Creative,
    pub category: Category,
    pub rationale: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KillScaleSummary {
    pub total: usize,
    pub scale_count: usize,
    pub watch_count: usize,
    pub kill_count: usize,
    pub scale_spend: f64,
    pub kill_spend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillScaleReport {
    pub goal: Goal,
    pub median_ctr: f64,
    pub scale: Vec<Classification>,
    pub watch: Vec<Classification>,
    pub kill: Vec<Classification>,
    pub summary: KillScaleSummary,
}

/// Account-wide reference values, computed once per call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountBaseline {
    /// Median CTR over every delivering creative in scope.
    pub median_ctr: f64,
    /// Mean CPC over delivering creatives with a CPC.
    pub avg_cpc: f64,
}

impl AccountBaseline {
    pub fn from_creatives(delivering: &[&Creative]) -> Self {
        Self {
            median_ctr: median(delivering.iter().map(|c| c.ctr)),
            avg_cpc: mean(delivering.iter().filter(|c| c.cpc > 0.0).map(|c| c.cpc)),
        }
    }
}

pub struct KillScaleClassifier {
    config: GoalConfig,
    fmt: CurrencyFormatter,
}

impl KillScaleClassifier {
    pub fn new(config: GoalConfig, fmt: CurrencyFormatter) -> Self {
        Self { config, fmt }
    }

    pub fn classify(&self, creatives: &[Creative]) -> KillScaleReport {
        let delivering: Vec<&Creative> = creatives.iter().filter(|c| c.is_delivering()).collect();
        let baseline = AccountBaseline::from_creatives(&delivering);

        let mut scale = Vec::new();
        let mut watch = Vec::new();
        let mut kill = Vec::new();

        for creative in &delivering {
            let (category, rationale) = self.classify_one(creative, &baseline);
            let entry = Classification {
                creative: (*creative).clone(),
                category,
                rationale,
            };
            match category {
                Category::Scale => scale.push(entry),
                Category::Watch => watch.push(entry),
                Category::Kill => kill.push(entry),
            }
        }

        let goal = self.config.goal;
        scale.sort_by(|a, b| scale_order(goal, &a.creative, &b.creative));
        watch.sort_by(|a, b| b.creative.spend.total_cmp(&a.creative.spend));
        kill.sort_by(|a, b| b.creative.spend.total_cmp(&a.creative.spend));

        let summary = KillScaleSummary {
            total: delivering.len(),
            scale_count: scale.len(),
            watch_count: watch.len(),
            kill_count: kill.len(),
            scale_spend: round2(scale.iter().map(|c| c.creative.spend).sum()),
            kill_spend: round2(kill.iter().map(|c| c.creative.spend).sum()),
        };

        debug!(
            goal = %goal,
            total = summary.total,
            scale = summary.scale_count,
            watch = summary.watch_count,
            kill = summary.kill_count,
            "Creatives classified"
        );

        KillScaleReport {
            goal,
            median_ctr: baseline.median_ctr,
            scale,
            watch,
            kill,
            summary,
        }
    }

    /// First matching rule wins.
    pub fn classify_one(&self, c: &Creative, baseline: &AccountBaseline) -> (Category, String) {
        let fmt = &self.fmt;
        let cfg = &self.config;

        if c.spend < cfg.spend_threshold {
            return (
                Category::Watch,
                format!(
                    "Insufficient spend ({} < {} threshold). Needs more data.",
                    fmt.format(c.spend),
                    fmt.format(cfg.spend_threshold)
                ),
            );
        }

        match cfg.goal {
            Goal::LeadGen => self.classify_lead_gen(c, baseline),
            Goal::Traffic => self.classify_traffic(c, baseline),
            Goal::Roas => self.classify_roas(c, baseline),
        }
    }

    fn classify_lead_gen(&self, c: &Creative, baseline: &AccountBaseline) -> (Category, String) {
        let fmt = &self.fmt;
        let target = self.config.cpa_threshold;

        if c.cpa > 0.0 && c.cpa <= target && c.ctr >= baseline.median_ctr {
            return (
                Category::Scale,
                format!(
                    "CPA {} beats {} target. CTR {:.2}% above median. Strong performer.",
                    fmt.format(c.cpa),
                    fmt.format(target),
                    c.ctr
                ),
            );
        }

        if c.cpa == 0.0 {
            if c.spend > self.config.high_spend_floor() {
                return (
                    Category::Kill,
                    format!(
                        "{} spent with no conversions. High spend, zero results.",
                        fmt.format(c.spend)
                    ),
                );
            }
            return (
                Category::Watch,
                format!(
                    "No conversions yet with {} spend. CTR {:.2}%. Needs more data.",
                    fmt.format(c.spend),
                    c.ctr
                ),
            );
        }

        if c.cpa > target * KILL_CPA_MULTIPLIER {
            return (
                Category::Kill,
                format!(
                    "CPA {} is 50%+ above {} target. {} spent inefficiently.",
                    fmt.format(c.cpa),
                    fmt.format(target),
                    fmt.format(c.spend)
                ),
            );
        }

        let rationale = if c.cpa <= target {
            format!(
                "CPA {} meets target but CTR {:.2}% below median. Mixed signals.",
                fmt.format(c.cpa),
                c.ctr
            )
        } else {
            format!(
                "CPA {} is above {} target but within range. Could improve.",
                fmt.format(c.cpa),
                fmt.format(target)
            )
        };
        (Category::Watch, rationale)
    }

    fn classify_traffic(&self, c: &Creative, baseline: &AccountBaseline) -> (Category, String) {
        let fmt = &self.fmt;
        let median_ctr = baseline.median_ctr;

        if c.ctr >= median_ctr * SCALE_CTR_LIFT && c.cpc <= baseline.avg_cpc {
            (
                Category::Scale,
                format!(
                    "CTR {:.2}% well above median ({:.2}%). CPC {} efficient.",
                    c.ctr,
                    median_ctr,
                    fmt.format(c.cpc)
                ),
            )
        } else if c.ctr < median_ctr * KILL_CTR_FRACTION {
            (
                Category::Kill,
                format!(
                    "CTR {:.2}% far below median ({:.2}%). {} spent with low engagement.",
                    c.ctr,
                    median_ctr,
                    fmt.format(c.spend)
                ),
            )
        } else {
            (
                Category::Watch,
                format!(
                    "CTR {:.2}% near median ({:.2}%). CPC {}. Room to optimize.",
                    c.ctr,
                    median_ctr,
                    fmt.format(c.cpc)
                ),
            )
        }
    }

    fn classify_roas(&self, c: &Creative, baseline: &AccountBaseline) -> (Category, String) {
        let fmt = &self.fmt;
        let target = self.config.roas_threshold;

        if c.roas >= target && c.ctr >= baseline.median_ctr {
            (
                Category::Scale,
                format!(
                    "ROAS {:.2}x meets {}x target. CTR {:.2}% above median.",
                    c.roas, target, c.ctr
                ),
            )
        } else if c.roas < target * KILL_ROAS_FRACTION {
            (
                Category::Kill,
                format!(
                    "ROAS {:.2}x below 50% of {}x target. {} spent with poor returns.",
                    c.roas,
                    target,
                    fmt.format(c.spend)
                ),
            )
        } else if c.roas >= target {
            (
                Category::Watch,
                format!(
                    "ROAS {:.2}x meets target but CTR {:.2}% below median. Mixed signals.",
                    c.roas, c.ctr
                ),
            )
        } else {
            (
                Category::Watch,
                format!(
                    "ROAS {:.2}x below {}x target but above 50%. Could improve.",
                    c.roas, target
                ),
            )
        }
    }
}

/// Scale bucket ordering: cheapest CPA, highest CTR, or highest ROAS first.
fn scale_order(goal: Goal, a: &Creative, b: &Creative) -> Ordering {
    match goal {
        Goal::LeadGen => cpa_or_infinity(a).total_cmp(&cpa_or_infinity(b)),
        Goal::Traffic => b.ctr.total_cmp(&a.ctr),
        Goal::Roas => b.roas.total_cmp(&a.roas),
    }
}

fn cpa_or_infinity(c: &Creative) -> f64 {
    if c.cpa > 0.0 {
        c.cpa
    } else {
        f64::INFINITY
    }
}
