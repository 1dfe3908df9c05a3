//! Goal-specific metric selection, formatting, and "good performer" rules.

use crate::stats::mean;
use creative_core::{Creative, CurrencyFormatter, Goal, GoalConfig};
use std::cmp::Ordering;

/// Average CTR (percent) above which a traffic group counts as proven.
pub const TRAFFIC_GOOD_CTR: f64 = 2.0;
/// Average ROAS above which a ROAS group counts as proven.
pub const ROAS_GOOD_AVERAGE: f64 = 1.5;
/// Lead-gen groups count as proven up to this multiple of the CPA target.
pub const LEAD_GEN_CPA_TOLERANCE: f64 = 1.5;

/// The single number a goal judges a creative by.
pub fn metric_value(goal: Goal, creative: &Creative) -> f64 {
    match goal {
        Goal::LeadGen => creative.cpa,
        Goal::Traffic => creative.ctr,
        Goal::Roas => creative.roas,
    }
}

/// Group average of the goal metric. Lead-gen ignores creatives without
/// conversions.
pub fn average_metric(goal: Goal, items: &[&Creative]) -> f64 {
    match goal {
        Goal::LeadGen => mean(items.iter().filter(|c| c.cpa > 0.0).map(|c| c.cpa)),
        Goal::Traffic => mean(items.iter().map(|c| c.ctr)),
        Goal::Roas => mean(items.iter().map(|c| c.roas)),
    }
}

/// Whether a group average marks a proven angle or format.
pub fn is_good_average(config: &GoalConfig, average: f64) -> bool {
    match config.goal {
        Goal::LeadGen => average > 0.0 && average <= config.cpa_threshold * LEAD_GEN_CPA_TOLERANCE,
        Goal::Traffic => average > TRAFFIC_GOOD_CTR,
        Goal::Roas => average > ROAS_GOOD_AVERAGE,
    }
}

/// Spend-weighted impact of a proven group, used only for ranking.
pub fn impact_score(goal: Goal, average: f64, total_spend: f64) -> u64 {
    let raw = match goal {
        Goal::LeadGen if average > 0.0 => total_spend / average,
        Goal::LeadGen => 0.0,
        Goal::Traffic | Goal::Roas => average * total_spend / 100.0,
    };
    to_score(raw)
}

/// Round to a non-negative integer score.
pub fn to_score(raw: f64) -> u64 {
    if raw.is_finite() && raw > 0.0 {
        raw.round() as u64
    } else {
        0
    }
}

/// "$12.00 CPA" / "2.40% CTR" / "3.10x ROAS".
pub fn format_average(goal: Goal, value: f64, fmt: &CurrencyFormatter) -> String {
    match goal {
        Goal::LeadGen => format!("{} CPA", fmt.format(value)),
        Goal::Traffic => format!("{value:.2}% CTR"),
        Goal::Roas => format!("{value:.2}x ROAS"),
    }
}

/// Headline metric text for a single creative, e.g. "ROAS: 2.50x".
pub fn primary_metric(goal: Goal, creative: &Creative, fmt: &CurrencyFormatter) -> String {
    match goal {
        Goal::LeadGen if creative.cpa > 0.0 => format!("CPA: {}", fmt.format(creative.cpa)),
        Goal::LeadGen => "No conversions".to_string(),
        Goal::Traffic => format!("CTR: {:.2}%", creative.ctr),
        Goal::Roas => format!("ROAS: {:.2}x", creative.roas),
    }
}

/// Best-first ordering by the goal metric. Lead-gen puts creatives without
/// conversions last, higher spend first among them.
pub fn best_first(goal: Goal, a: &Creative, b: &Creative) -> Ordering {
    match goal {
        Goal::LeadGen => match (a.cpa > 0.0, b.cpa > 0.0) {
            (true, true) => a.cpa.total_cmp(&b.cpa),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => b.spend.total_cmp(&a.spend),
        },
        Goal::Traffic => b.ctr.total_cmp(&a.ctr),
        Goal::Roas => b.roas.total_cmp(&a.roas),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creative(id: &str, spend: f64, cpa: f64, ctr: f64, roas: f64) -> Creative {
        Creative {
            spend,
            cpa,
            ctr,
            roas,
            ..Creative::new(id)
        }
    }

    #[test]
    fn test_lead_gen_average_skips_zero_cpa() {
        let a = creative("a", 100.0, 20.0, 1.0, 0.0);
        let b = creative("b", 100.0, 0.0, 1.0, 0.0);
        let c = creative("c", 100.0, 40.0, 1.0, 0.0);
        assert_eq!(average_metric(Goal::LeadGen, &[&a, &b, &c]), 30.0);
        assert_eq!(average_metric(Goal::LeadGen, &[&b]), 0.0);
    }

    #[test]
    fn test_good_average_rules() {
        let mut config = GoalConfig::default();
        assert!(is_good_average(&config, 1.6));
        assert!(!is_good_average(&config, 1.5));

        config.goal = Goal::Traffic;
        assert!(is_good_average(&config, 2.1));
        assert!(!is_good_average(&config, 2.0));

        config.goal = Goal::LeadGen;
        assert!(is_good_average(&config, 45.0));
        assert!(!is_good_average(&config, 45.5));
        assert!(!is_good_average(&config, 0.0));
    }

    #[test]
    fn test_impact_score() {
        assert_eq!(impact_score(Goal::LeadGen, 25.0, 1000.0), 40);
        assert_eq!(impact_score(Goal::LeadGen, 0.0, 1000.0), 0);
        assert_eq!(impact_score(Goal::Roas, 2.5, 1000.0), 25);
        assert_eq!(impact_score(Goal::Traffic, 3.0, 500.0), 15);
    }

    #[test]
    fn test_best_first_lead_gen_puts_zero_cpa_last() {
        let mut items = vec![
            creative("none-small", 60.0, 0.0, 1.0, 0.0),
            creative("expensive", 100.0, 50.0, 1.0, 0.0),
            creative("none-big", 300.0, 0.0, 1.0, 0.0),
            creative("cheap", 100.0, 10.0, 1.0, 0.0),
        ];
        items.sort_by(|a, b| best_first(Goal::LeadGen, a, b));
        let ids: Vec<&str> = items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["cheap", "expensive", "none-big", "none-small"]);
    }

    #[test]
    fn test_primary_metric_text() {
        let fmt = CurrencyFormatter::default();
        let c = creative("a", 100.0, 12.5, 1.234, 2.5);
        assert_eq!(primary_metric(Goal::LeadGen, &c, &fmt), "CPA: $12.50");
        assert_eq!(primary_metric(Goal::Traffic, &c, &fmt), "CTR: 1.23%");
        assert_eq!(primary_metric(Goal::Roas, &c, &fmt), "ROAS: 2.50x");
        let none = creative("b", 100.0, 0.0, 1.0, 0.0);
        assert_eq!(primary_metric(Goal::LeadGen, &none, &fmt), "No conversions");
    }
}
