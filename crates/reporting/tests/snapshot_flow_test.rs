//! Integration test for the full insights flow: scoring, classification,
//! priorities, and a chained pair of report snapshots.

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use creative_analytics::{Category, PriorityKind};
    use creative_core::repository::{AccountCurrencies, InMemoryCreativeRepository, StaticSettings};
    use creative_core::{AccountScope, AnalysisStatus, Creative, CreativeTags, FunnelStage};
    use creative_reporting::{InMemorySnapshotStore, InsightsService, SnapshotOutcome};
    use std::collections::HashMap;
    use std::sync::Arc;

    const ACCOUNT: &str = "act_1001";

    /// Two TOF prospecting ads and three BOF conversion ads, all tagged.
    fn sample_creatives(spend_scale: f64) -> Vec<Creative> {
        let tagged = |id: &str,
                      stage: FunnelStage,
                      spend: f64,
                      (impressions, clicks, conversions, value): (u64, u64, u64, f64),
                      (format, angle, hook): (&str, &str, &str)| {
            Creative {
                account_id: ACCOUNT.to_string(),
                ad_name: Some(format!("{angle} / {format}")),
                ad_type: Some("image".to_string()),
                spend: spend * spend_scale,
                impressions,
                clicks,
                conversions,
                purchases: conversions,
                purchase_value: value * spend_scale,
                funnel_stage: stage,
                analysis_status: AnalysisStatus::Completed,
                tags: CreativeTags {
                    asset_type: Some("Image".to_string()),
                    visual_format: Some(format.to_string()),
                    messaging_angle: Some(angle.to_string()),
                    hook_tactic: Some(hook.to_string()),
                    offer_type: None,
                },
                ..Creative::new(id)
            }
            .with_derived_rates()
        };

        vec![
            tagged("tof-a", FunnelStage::Tof, 100.0, (25_000, 1_000, 2, 250.0), ("UGC", "Pain", "Question")),
            tagged("tof-b", FunnelStage::Tof, 100.0, (10_000, 200, 1, 80.0), ("Static", "Benefit", "Story")),
            tagged("bof-a", FunnelStage::Bof, 200.0, (8_000, 320, 8, 600.0), ("UGC", "Pain", "Statistic")),
            tagged("bof-b", FunnelStage::Bof, 250.0, (9_000, 180, 3, 150.0), ("Static", "Benefit", "Story")),
            tagged("bof-c", FunnelStage::Bof, 350.0, (12_000, 120, 2, 280.0), ("Carousel", "Urgency", "Bold Claim")),
        ]
    }

    fn service(creatives: Vec<Creative>, store: Arc<InMemorySnapshotStore>) -> InsightsService {
        let repo = InMemoryCreativeRepository::new();
        assert_eq!(repo.load(creatives), 0);
        let settings: HashMap<String, String> = [
            ("campaign_goal", "roas"),
            ("winner_roas_threshold", "2.0"),
            ("iteration_spend_threshold", "50"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        InsightsService::new(
            Arc::new(repo),
            Arc::new(StaticSettings::new(settings)),
            Arc::new(AccountCurrencies::new("USD")),
            store,
        )
    }

    #[test]
    fn test_read_operations() {
        let svc = service(sample_creatives(1.0), Arc::new(InMemorySnapshotStore::new()));
        let scope = AccountScope::account(ACCOUNT);

        let win_rates = svc.win_rates(&scope).unwrap();
        let stages: Vec<FunnelStage> = win_rates.cohorts.iter().map(|c| c.stage).collect();
        assert_eq!(stages, vec![FunnelStage::Tof, FunnelStage::Bof]);
        let tof = win_rates.cohort(FunnelStage::Tof).unwrap();
        // tof-a has the higher CTR and the lower CPM of the pair
        assert_eq!(tof.creatives[0].creative.id, "tof-a");
        assert_eq!(tof.creatives[0].score, 50);
        assert_eq!(tof.creatives[1].score, 0);

        let kill_scale = svc.kill_scale(&scope).unwrap();
        let s = &kill_scale.summary;
        assert_eq!(s.total, 5);
        assert_eq!(s.scale_count + s.watch_count + s.kill_count, 5);
        // bof-a: roas 3.0, ctr 4% is above the median
        assert_eq!(kill_scale.scale[0].creative.id, "bof-a");
        assert_eq!(kill_scale.scale[0].category, Category::Scale);
        // bof-b: roas 0.6 is under half the target
        assert!(kill_scale.kill.iter().any(|c| c.creative.id == "bof-b"));

        let priorities = svc.iteration_priorities(&scope).unwrap();
        assert!(priorities
            .priorities
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
        assert!(priorities
            .priorities
            .iter()
            .any(|p| p.kind == PriorityKind::AngleExpansion && p.title.contains("Pain")));
        // identical input, identical backlog
        assert_eq!(priorities, svc.iteration_priorities(&scope).unwrap());
    }

    #[test]
    fn test_snapshot_chain_reports_deltas() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let scope = AccountScope::account(ACCOUNT);
        let first_at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let second_at = Utc.with_ymd_and_hms(2026, 3, 8, 9, 0, 0).unwrap();

        // 1000 spend, then the same mix at 1.2x
        let first = match service(sample_creatives(1.0), store.clone())
            .generate_snapshot_at(&scope, first_at)
            .unwrap()
        {
            SnapshotOutcome::Created(s) => s,
            SnapshotOutcome::NoData => panic!("expected a snapshot"),
        };
        assert_eq!(first.totals.total_spend, 1000.0);
        assert!(first.comparison.is_none());

        let svc = service(sample_creatives(1.2), store.clone());
        let second = match svc.generate_snapshot_at(&scope, second_at).unwrap() {
            SnapshotOutcome::Created(s) => s,
            SnapshotOutcome::NoData => panic!("expected a snapshot"),
        };
        assert_eq!(second.totals.total_spend, 1200.0);
        assert_eq!(second.previous_snapshot_id, Some(first.id));

        let cmp = second.comparison.as_ref().unwrap();
        assert_eq!(cmp.spend_delta, 200.0);
        assert_eq!(cmp.spend_pct, Some(20.0));
        assert_eq!(cmp.creative_delta, 0);
        assert_eq!(cmp.roas_delta, 0.0);

        let listed: Vec<_> = svc.snapshots(&scope).unwrap().iter().map(|s| s.id).collect();
        assert_eq!(listed, vec![second.id, first.id]);
        assert_eq!(svc.snapshot(&first.id).unwrap().map(|s| s.created_at), Some(first_at));

        // rollups are present and ordered
        assert_eq!(second.funnel_breakdown[0].stage, FunnelStage::Bof);
        assert_eq!(second.top_performers[0].id, "bof-a");
        // tof-b and bof-b are the only tag combination with two creatives
        let best = second.creative_mix.best_combination.as_ref().unwrap();
        assert_eq!(best.messaging_angle, "Benefit");
        assert_eq!(best.count, 2);
        assert_eq!(second.cohorts.len(), 2);
    }

    #[test]
    fn test_empty_account_reports_no_data() {
        let svc = service(sample_creatives(1.0), Arc::new(InMemorySnapshotStore::new()));
        let scope = AccountScope::account("act_unknown");
        assert_eq!(svc.generate_snapshot(&scope).unwrap(), SnapshotOutcome::NoData);
        assert!(svc.win_rates(&scope).unwrap().cohorts.is_empty());
        assert_eq!(svc.kill_scale(&scope).unwrap().summary.total, 0);
        assert!(svc.iteration_priorities(&scope).unwrap().priorities.is_empty());
    }
}
