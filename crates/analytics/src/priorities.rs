//! Iteration priorities: untested angle/format and format/hook combinations
//! among proven groups, plus high-spend underperformers worth optimizing.

use crate::goal_metric::{
    average_metric, format_average, impact_score, is_good_average, to_score, ROAS_GOOD_AVERAGE,
    TRAFFIC_GOOD_CTR,
};
use crate::stats::{distinct_in_order, group_in_order};
use creative_core::{Creative, CurrencyFormatter, Goal, GoalConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hook tactics every proven format is checked against.
pub const HOOK_TACTICS: [&str; 6] = [
    "Question",
    "Bold Claim",
    "Statistic",
    "Story",
    "Problem Statement",
    "Curiosity Gap",
];

/// How many untested options a description lists.
const SUGGESTIONS_LISTED: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityKind {
    AngleExpansion,
    HookVariation,
    Optimization,
}

/// A creative a priority was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityReference {
    pub id: String,
    pub ad_name: Option<String>,
    pub ad_type: Option<String>,
    pub roas: f64,
    pub cpa: f64,
    pub ctr: f64,
}

impl From<&Creative> for PriorityReference {
    fn from(c: &Creative) -> Self {
        Self {
            id: c.id.clone(),
            ad_name: c.ad_name.clone(),
            ad_type: c.ad_type.clone(),
            roas: c.roas,
            cpa: c.cpa,
            ctr: c.ctr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Priority {
    #[serde(rename = "type")]
    pub kind: PriorityKind,
    pub title: String,
    pub description: String,
    /// Impact estimate, only meaningful relative to other priorities.
    pub score: u64,
    pub based_on: Vec<PriorityReference>,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityReport {
    pub goal: Goal,
    pub priorities: Vec<Priority>,
}

pub struct PriorityGenerator {
    config: GoalConfig,
    fmt: CurrencyFormatter,
}

impl PriorityGenerator {
    pub fn new(config: GoalConfig, fmt: CurrencyFormatter) -> Self {
        Self { config, fmt }
    }

    /// Ranked backlog, highest score first. Not truncated.
    pub fn generate(&self, creatives: &[Creative]) -> PriorityReport {
        let eligible: Vec<&Creative> = creatives
            .iter()
            .filter(|c| {
                c.is_delivering()
                    && c.spend >= self.config.spend_threshold
                    && c.completed_tags().is_some()
            })
            .collect();

        let mut priorities = Vec::new();
        if !eligible.is_empty() {
            priorities.extend(self.angle_expansions(&eligible));
            priorities.extend(self.hook_variations(&eligible));
            priorities.extend(self.optimizations(&eligible));
        }
        priorities.sort_by(|a, b| b.score.cmp(&a.score));

        debug!(
            goal = %self.config.goal,
            eligible = eligible.len(),
            priorities = priorities.len(),
            "Iteration priorities generated"
        );

        PriorityReport {
            goal: self.config.goal,
            priorities,
        }
    }

    fn angle_expansions(&self, eligible: &[&Creative]) -> Vec<Priority> {
        let goal = self.config.goal;
        let all_formats = distinct_in_order(eligible.iter().copied(), |c: &Creative| {
            c.tags.visual_format.as_deref()
        });

        let mut out = Vec::new();
        for (angle, items) in group_in_order(eligible, |c| c.tags.messaging_angle.as_deref()) {
            let avg = average_metric(goal, &items);
            if !is_good_average(&self.config, avg) {
                continue;
            }
            let formats = distinct_in_order(items.iter().copied(), |c: &Creative| {
                c.tags.visual_format.as_deref()
            });
            let untested: Vec<&str> = all_formats
                .iter()
                .filter(|f| !formats.contains(f))
                .map(String::as_str)
                .collect();
            let Some(first) = untested.first() else {
                continue;
            };

            let total_spend: f64 = items.iter().map(|c| c.spend).sum();
            out.push(Priority {
                kind: PriorityKind::AngleExpansion,
                title: format!("Test \"{angle}\" in new formats"),
                description: format!(
                    "\"{angle}\" messaging averages {} across {}. Try it in: {}.",
                    format_average(goal, avg, &self.fmt),
                    formats.join(", "),
                    listed(&untested)
                ),
                score: impact_score(goal, avg, total_spend),
                based_on: items.iter().map(|c| PriorityReference::from(*c)).collect(),
                suggestion: format!("Create a {first} ad using \"{angle}\" messaging"),
            });
        }
        out
    }

    fn hook_variations(&self, eligible: &[&Creative]) -> Vec<Priority> {
        let goal = self.config.goal;

        let mut out = Vec::new();
        for (format, items) in group_in_order(eligible, |c| c.tags.visual_format.as_deref()) {
            let avg = average_metric(goal, &items);
            if !is_good_average(&self.config, avg) {
                continue;
            }
            let hooks = distinct_in_order(items.iter().copied(), |c: &Creative| {
                c.tags.hook_tactic.as_deref()
            });
            let untested: Vec<&str> = HOOK_TACTICS
                .iter()
                .copied()
                .filter(|h| !hooks.iter().any(|tested| tested == h))
                .collect();
            let Some(first) = untested.first() else {
                continue;
            };

            let total_spend: f64 = items.iter().map(|c| c.spend).sum();
            out.push(Priority {
                kind: PriorityKind::HookVariation,
                title: format!("New hooks for \"{format}\" format"),
                description: format!(
                    "\"{format}\" averages {}. Tested hooks: {}. Try: {}.",
                    format_average(goal, avg, &self.fmt),
                    hooks.join(", "),
                    listed(&untested)
                ),
                score: impact_score(goal, avg, total_spend),
                based_on: items.iter().map(|c| PriorityReference::from(*c)).collect(),
                suggestion: format!("Create a {format} ad with a \"{first}\" hook"),
            });
        }
        out
    }

    fn optimizations(&self, eligible: &[&Creative]) -> Vec<Priority> {
        let goal = self.config.goal;
        let floor = self.config.high_spend_floor();

        eligible
            .iter()
            .filter(|c| c.spend > floor && self.is_underperforming(c))
            .map(|c| {
                let metric = match goal {
                    Goal::LeadGen if c.cpa == 0.0 => "no conversions".to_string(),
                    Goal::LeadGen => format_average(goal, c.cpa, &self.fmt),
                    Goal::Traffic => format_average(goal, c.ctr, &self.fmt),
                    Goal::Roas => format_average(goal, c.roas, &self.fmt),
                };
                let suggestion = match c.tags.hook_tactic.as_deref() {
                    Some(hook) if !hook.is_empty() => {
                        format!("Try a different hook (currently \"{hook}\") or adjust the offer")
                    }
                    _ => "Test a stronger hook or clearer offer".to_string(),
                };
                Priority {
                    kind: PriorityKind::Optimization,
                    title: format!("Optimize \"{}\"", c.display_name()),
                    description: format!(
                        "{} spent at {metric}. High spend makes even small improvements impactful.",
                        self.fmt.format(c.spend)
                    ),
                    score: optimization_score(goal, c),
                    based_on: vec![PriorityReference::from(*c)],
                    suggestion,
                }
            })
            .collect()
    }

    fn is_underperforming(&self, c: &Creative) -> bool {
        match self.config.goal {
            Goal::LeadGen => c.cpa == 0.0 || c.cpa > self.config.cpa_threshold,
            Goal::Traffic => c.ctr < TRAFFIC_GOOD_CTR,
            Goal::Roas => c.roas > 0.0 && c.roas < ROAS_GOOD_AVERAGE,
        }
    }
}

/// Spend scaled by how far the creative sits from a good result.
///
/// Each goal measures the gap on its own metric: traffic uses the CTR
/// shortfall against [`TRAFFIC_GOOD_CTR`], not the ROAS shortfall, which
/// says nothing about a click-driven campaign.
fn optimization_score(goal: Goal, c: &Creative) -> u64 {
    let raw = match goal {
        Goal::LeadGen => c.spend / c.cpa.max(1.0),
        Goal::Traffic => c.spend * (TRAFFIC_GOOD_CTR - c.ctr),
        Goal::Roas => c.spend * (ROAS_GOOD_AVERAGE - c.roas),
    };
    to_score(raw)
}

fn listed(options: &[&str]) -> String {
    options
        .iter()
        .take(SUGGESTIONS_LISTED)
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}
