//! Creative performance reporting: funnel and creative-mix rollups,
//! performer rankings, chained report snapshots, and the service facade
//! that ties the analytics to their collaborators.

pub mod comparison;
pub mod creative_mix;
pub mod funnel;
pub mod performers;
pub mod service;
pub mod snapshot;
pub mod store;

pub use comparison::SnapshotComparison;
pub use creative_mix::{BestCombination, CreativeMix};
pub use funnel::FunnelStageSummary;
pub use performers::PerformerCard;
pub use service::InsightsService;
pub use snapshot::{ReportSnapshot, SnapshotGenerator, SnapshotOutcome};
pub use store::{InMemorySnapshotStore, SnapshotStore};
