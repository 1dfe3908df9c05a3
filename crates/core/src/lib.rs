//! Shared model for creative performance analytics: creative records, goal
//! configuration, currency formatting, and the collaborator seams the
//! analytics core reads through.

pub mod config;
pub mod currency;
pub mod error;
pub mod goal;
pub mod repository;
pub mod types;

pub use config::AppConfig;
pub use currency::CurrencyFormatter;
pub use error::{InsightsError, InsightsResult};
pub use goal::GoalConfig;
pub use repository::{CreativeRepository, CurrencyProvider, SettingsProvider};
pub use types::{AccountScope, AnalysisStatus, Creative, CreativeTags, FunnelStage, Goal};
