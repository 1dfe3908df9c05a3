//! Creative-mix rollups per tag dimension and the best-performing tag
//! combination.

use creative_analytics::goal_metric::average_metric;
use creative_analytics::stats::group_in_order;
use creative_core::types::round2;
use creative_core::{Creative, CreativeTags, Goal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A combination needs at least this many creatives behind it.
pub const MIN_COMBINATION_SUPPORT: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixEntry {
    pub value: String,
    pub count: usize,
    pub spend: f64,
    pub avg_roas: f64,
    pub avg_ctr: f64,
    /// Mean over creatives with conversions.
    pub avg_cpa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestCombination {
    pub asset_type: String,
    pub visual_format: String,
    pub messaging_angle: String,
    pub hook_tactic: String,
    pub count: usize,
    pub spend: f64,
    pub avg_roas: f64,
    pub avg_ctr: f64,
    pub avg_cpa: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreativeMix {
    pub asset_type: Vec<MixEntry>,
    pub visual_format: Vec<MixEntry>,
    pub messaging_angle: Vec<MixEntry>,
    pub hook_tactic: Vec<MixEntry>,
    pub best_combination: Option<BestCombination>,
}

struct GroupStats {
    count: usize,
    spend: f64,
    avg_roas: f64,
    avg_ctr: f64,
    avg_cpa: f64,
}

impl GroupStats {
    fn of(items: &[&Creative]) -> Self {
        Self {
            count: items.len(),
            spend: round2(items.iter().map(|c| c.spend).sum()),
            avg_roas: round2(average_metric(Goal::Roas, items)),
            avg_ctr: round2(average_metric(Goal::Traffic, items)),
            avg_cpa: round2(average_metric(Goal::LeadGen, items)),
        }
    }
}

/// Rollups over delivering creatives whose tagging has completed.
pub fn creative_mix(goal: Goal, delivering: &[&Creative]) -> CreativeMix {
    let tagged: Vec<&Creative> = delivering
        .iter()
        .copied()
        .filter(|c| c.completed_tags().is_some())
        .collect();

    CreativeMix {
        asset_type: dimension(&tagged, |t| t.asset_type.as_deref()),
        visual_format: dimension(&tagged, |t| t.visual_format.as_deref()),
        messaging_angle: dimension(&tagged, |t| t.messaging_angle.as_deref()),
        hook_tactic: dimension(&tagged, |t| t.hook_tactic.as_deref()),
        best_combination: best_combination(goal, &tagged),
    }
}

fn dimension<F>(tagged: &[&Creative], key: F) -> Vec<MixEntry>
where
    F: Fn(&CreativeTags) -> Option<&str>,
{
    let mut entries: Vec<MixEntry> = group_in_order(tagged, |c| key(&c.tags))
        .into_iter()
        .map(|(value, items)| {
            let stats = GroupStats::of(&items);
            MixEntry {
                value,
                count: stats.count,
                spend: stats.spend,
                avg_roas: stats.avg_roas,
                avg_ctr: stats.avg_ctr,
                avg_cpa: stats.avg_cpa,
            }
        })
        .collect();
    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.spend.total_cmp(&a.spend))
    });
    entries
}

/// Highest-scoring fully tagged combination with enough support. Ties keep
/// the first combination seen.
pub fn best_combination(goal: Goal, tagged: &[&Creative]) -> Option<BestCombination> {
    let mut positions: HashMap<[&str; 4], usize> = HashMap::new();
    let mut groups: Vec<([&str; 4], Vec<&Creative>)> = Vec::new();
    for c in tagged {
        let Some(key) = combination_key(&c.tags) else {
            continue;
        };
        match positions.get(&key) {
            Some(&idx) => groups[idx].1.push(*c),
            None => {
                positions.insert(key, groups.len());
                groups.push((key, vec![*c]));
            }
        }
    }

    let mut best: Option<(f64, BestCombination)> = None;
    for (key, items) in groups {
        if items.len() < MIN_COMBINATION_SUPPORT {
            continue;
        }
        let stats = GroupStats::of(&items);
        let score = match goal {
            Goal::Roas => stats.avg_roas,
            Goal::Traffic => stats.avg_ctr,
            // lower CPA wins; groups without conversions never do
            Goal::LeadGen if stats.avg_cpa > 0.0 => -stats.avg_cpa,
            Goal::LeadGen => continue,
        };
        if best.as_ref().is_some_and(|(top, _)| score <= *top) {
            continue;
        }
        let [asset_type, visual_format, messaging_angle, hook_tactic] = key.map(str::to_string);
        best = Some((
            score,
            BestCombination {
                asset_type,
                visual_format,
                messaging_angle,
                hook_tactic,
                count: stats.count,
                spend: stats.spend,
                avg_roas: stats.avg_roas,
                avg_ctr: stats.avg_ctr,
                avg_cpa: stats.avg_cpa,
            },
        ));
    }
    best.map(|(_, combo)| combo)
}

fn combination_key(tags: &CreativeTags) -> Option<[&str; 4]> {
    fn non_empty(v: &Option<String>) -> Option<&str> {
        v.as_deref().filter(|s| !s.is_empty())
    }
    Some([
        non_empty(&tags.asset_type)?,
        non_empty(&tags.visual_format)?,
        non_empty(&tags.messaging_angle)?,
        non_empty(&tags.hook_tactic)?,
    ])
}
