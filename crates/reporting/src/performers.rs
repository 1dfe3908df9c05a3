//! Top and bottom performers by the goal metric.

use creative_analytics::goal_metric::best_first;
use creative_core::{Creative, FunnelStage, Goal};
use serde::{Deserialize, Serialize};

/// Cards listed at each end of the ranking.
pub const PERFORMERS_LISTED: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformerCard {
    pub id: String,
    pub ad_name: Option<String>,
    pub ad_type: Option<String>,
    pub funnel_stage: FunnelStage,
    pub spend: f64,
    pub roas: f64,
    pub ctr: f64,
    pub cpa: f64,
    pub purchases: u64,
    pub leads: u64,
    pub conversions: u64,
    pub clicks: u64,
}

impl From<&Creative> for PerformerCard {
    fn from(c: &Creative) -> Self {
        Self {
            id: c.id.clone(),
            ad_name: c.ad_name.clone(),
            ad_type: c.ad_type.clone(),
            funnel_stage: c.funnel_stage,
            spend: c.spend,
            roas: c.roas,
            ctr: c.ctr,
            cpa: c.cpa,
            purchases: c.purchases,
            leads: c.leads,
            conversions: c.conversions,
            clicks: c.clicks,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Performers {
    pub top: Vec<PerformerCard>,
    /// Worst first.
    pub bottom: Vec<PerformerCard>,
}

/// Rank creatives at or above the spend floor. With fewer than ten
/// qualifying creatives the two lists overlap.
pub fn rank_performers(goal: Goal, spend_threshold: f64, delivering: &[&Creative]) -> Performers {
    let mut qualified: Vec<&Creative> = delivering
        .iter()
        .copied()
        .filter(|c| c.spend >= spend_threshold)
        .collect();
    qualified.sort_by(|a, b| best_first(goal, a, b));

    let top = qualified
        .iter()
        .take(PERFORMERS_LISTED)
        .map(|c| PerformerCard::from(*c))
        .collect();
    let bottom = qualified
        .iter()
        .rev()
        .take(PERFORMERS_LISTED)
        .map(|c| PerformerCard::from(*c))
        .collect();

    Performers { top, bottom }
}
