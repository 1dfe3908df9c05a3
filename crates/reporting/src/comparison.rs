//! Deltas between a new snapshot and the one before it in the same scope.

use crate::snapshot::SnapshotTotals;
use creative_core::types::round2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotComparison {
    pub spend_delta: f64,
    /// Percentage change in spend; `None` when the previous spend was zero.
    pub spend_pct: Option<f64>,
    pub roas_delta: f64,
    pub ctr_delta: f64,
    pub cpa_delta: f64,
    pub creative_delta: i64,
}

impl SnapshotComparison {
    /// Both sides are rounded totals as stored, so a comparison can be
    /// recomputed from two persisted snapshots alone.
    pub fn between(current: &SnapshotTotals, previous: &SnapshotTotals) -> Self {
        let spend_delta = current.total_spend - previous.total_spend;
        let spend_pct = (previous.total_spend > 0.0)
            .then(|| round2(spend_delta * 100.0 / previous.total_spend));

        Self {
            spend_delta: round2(spend_delta),
            spend_pct,
            roas_delta: round2(current.avg_roas - previous.avg_roas),
            ctr_delta: round2(current.avg_ctr - previous.avg_ctr),
            cpa_delta: round2(current.avg_cpa - previous.avg_cpa),
            creative_delta: current.creative_count as i64 - previous.creative_count as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(spend: f64, roas: f64, ctr: f64, cpa: f64, count: usize) -> SnapshotTotals {
        SnapshotTotals {
            total_spend: spend,
            total_impressions: 0,
            avg_roas: roas,
            avg_ctr: ctr,
            avg_cpa: cpa,
            creative_count: count,
        }
    }

    #[test]
    fn test_spend_growth() {
        let cmp = SnapshotComparison::between(
            &totals(1200.0, 2.1, 1.5, 20.0, 8),
            &totals(1000.0, 1.8, 1.2, 25.0, 10),
        );
        assert_eq!(cmp.spend_delta, 200.0);
        assert_eq!(cmp.spend_pct, Some(20.0));
        assert_eq!(cmp.roas_delta, 0.3);
        assert_eq!(cmp.ctr_delta, 0.3);
        assert_eq!(cmp.cpa_delta, -5.0);
        assert_eq!(cmp.creative_delta, -2);
    }

    #[test]
    fn test_zero_previous_spend_has_no_percentage() {
        let cmp = SnapshotComparison::between(
            &totals(50.0, 0.0, 0.0, 0.0, 1),
            &totals(0.0, 0.0, 0.0, 0.0, 0),
        );
        assert_eq!(cmp.spend_delta, 50.0);
        assert_eq!(cmp.spend_pct, None);
    }
}
