//! Typed goal configuration resolved from raw key/value settings.

use crate::types::Goal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

pub const CAMPAIGN_GOAL_KEY: &str = "campaign_goal";
pub const ROAS_THRESHOLD_KEY: &str = "winner_roas_threshold";
pub const CPA_THRESHOLD_KEY: &str = "winner_cpa_threshold";
pub const SPEND_THRESHOLD_KEY: &str = "iteration_spend_threshold";
pub const DATE_RANGE_DAYS_KEY: &str = "date_range_days";

pub const DEFAULT_ROAS_THRESHOLD: f64 = 2.0;
pub const DEFAULT_CPA_THRESHOLD: f64 = 30.0;
pub const DEFAULT_SPEND_THRESHOLD: f64 = 50.0;
pub const DEFAULT_DATE_RANGE_DAYS: u32 = 30;

/// Goal and winner thresholds for one analytical call. Built fresh from the
/// settings source each time and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    pub goal: Goal,
    pub roas_threshold: f64,
    pub cpa_threshold: f64,
    pub spend_threshold: f64,
    pub date_range_days: u32,
}

impl GoalConfig {
    /// Resolve from raw settings. Missing, unparsable, or non-positive
    /// numbers fall back to the defaults; this never fails.
    pub fn resolve(settings: &HashMap<String, String>) -> Self {
        let goal = settings
            .get(CAMPAIGN_GOAL_KEY)
            .map(|value| Goal::parse(value))
            .unwrap_or_default();

        let config = Self {
            goal,
            roas_threshold: positive_f64(settings, ROAS_THRESHOLD_KEY, DEFAULT_ROAS_THRESHOLD),
            cpa_threshold: positive_f64(settings, CPA_THRESHOLD_KEY, DEFAULT_CPA_THRESHOLD),
            spend_threshold: positive_f64(settings, SPEND_THRESHOLD_KEY, DEFAULT_SPEND_THRESHOLD),
            date_range_days: settings
                .get(DATE_RANGE_DAYS_KEY)
                .and_then(|value| value.trim().parse::<u32>().ok())
                .filter(|days| *days > 0)
                .unwrap_or(DEFAULT_DATE_RANGE_DAYS),
        };

        debug!(
            goal = %config.goal,
            roas_threshold = config.roas_threshold,
            cpa_threshold = config.cpa_threshold,
            spend_threshold = config.spend_threshold,
            "Goal config resolved"
        );
        config
    }

    /// Spend above which a non-converting creative is treated as a money sink.
    pub fn high_spend_floor(&self) -> f64 {
        self.spend_threshold * 3.0
    }
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            goal: Goal::Roas,
            roas_threshold: DEFAULT_ROAS_THRESHOLD,
            cpa_threshold: DEFAULT_CPA_THRESHOLD,
            spend_threshold: DEFAULT_SPEND_THRESHOLD,
            date_range_days: DEFAULT_DATE_RANGE_DAYS,
        }
    }
}

fn positive_f64(settings: &HashMap<String, String>, key: &str, default: f64) -> f64 {
    settings
        .get(key)
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(default)
}
