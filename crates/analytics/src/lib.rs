//! Creative scoring and classification: cohort win rates, scale/watch/kill
//! buckets, and iteration priorities, all pure functions over a creative set.

pub mod goal_metric;
pub mod kill_scale;
pub mod priorities;
pub mod stats;
pub mod win_rate;

pub use kill_scale::{Category, Classification, KillScaleClassifier, KillScaleReport};
pub use priorities::{Priority, PriorityGenerator, PriorityKind, PriorityReport};
pub use win_rate::{CohortScorer, CohortWinRate, WinRateReport};
