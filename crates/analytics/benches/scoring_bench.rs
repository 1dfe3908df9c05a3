//! Benchmarks for cohort scoring and classification.
//! Run with: cargo bench -p creative-analytics

use creative_analytics::{CohortScorer, KillScaleClassifier, PriorityGenerator};
use creative_core::{AnalysisStatus, Creative, CreativeTags, CurrencyFormatter, FunnelStage, GoalConfig};

const STAGES: [FunnelStage; 4] = [
    FunnelStage::Tof,
    FunnelStage::Mof,
    FunnelStage::Bof,
    FunnelStage::Unclassified,
];
const FORMATS: [&str; 4] = ["Video", "Static", "Carousel", "UGC"];
const ANGLES: [&str; 5] = ["Pain", "Social Proof", "Urgency", "Benefit", "Authority"];

fn create_test_creatives(n: usize) -> Vec<Creative> {
    (0..n)
        .map(|i| {
            Creative {
                spend: 20.0 + (i % 97) as f64 * 7.5,
                impressions: 5_000 + (i as u64 * 131) % 40_000,
                clicks: 40 + (i as u64 * 17) % 900,
                conversions: (i as u64 * 7) % 25,
                purchase_value: (i % 53) as f64 * 31.0,
                funnel_stage: STAGES[i % STAGES.len()],
                analysis_status: AnalysisStatus::Completed,
                tags: CreativeTags {
                    visual_format: Some(FORMATS[i % FORMATS.len()].to_string()),
                    messaging_angle: Some(ANGLES[i % ANGLES.len()].to_string()),
                    ..CreativeTags::default()
                },
                ..Creative::new(format!("creative-{:05}", i))
            }
            .with_derived_rates()
        })
        .collect()
}

fn bench<F: FnMut()>(name: &str, iterations: u32, mut f: F) {
    // Warmup
    for _ in 0..10 {
        f();
    }

    let start = std::time::Instant::now();
    for _ in 0..iterations {
        f();
    }
    let elapsed = start.elapsed();

    println!("=== {} ===", name);
    println!("Iterations:  {}", iterations);
    println!("Total time:  {:?}", elapsed);
    println!("Per call:    {:?}", elapsed / iterations);
}

fn main() {
    let creatives = create_test_creatives(2_000);
    let config = GoalConfig::default();
    let fmt = CurrencyFormatter::default();

    let scorer = CohortScorer::new(config.clone(), fmt.clone());
    bench("Cohort win rates", 200, || {
        std::hint::black_box(scorer.score(&creatives));
    });

    let classifier = KillScaleClassifier::new(config.clone(), fmt.clone());
    bench("Kill / scale", 200, || {
        std::hint::black_box(classifier.classify(&creatives));
    });

    let generator = PriorityGenerator::new(config, fmt);
    bench("Iteration priorities", 200, || {
        std::hint::black_box(generator.generate(&creatives));
    });

    println!("Creatives:   {}", creatives.len());
}
