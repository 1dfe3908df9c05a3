use crate::error::{InsightsError, InsightsResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Divide, treating a zero (or non-finite) result as "no data".
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Round to two decimal places, the precision used for persisted money values.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Optimization goal that selects the metric every judgment is made on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    #[default]
    Roas,
    LeadGen,
    Traffic,
}

impl Goal {
    /// Case-insensitive, surrounding whitespace ignored. Unrecognised goal
    /// strings fall back to ROAS.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "lead_gen" => Self::LeadGen,
            "traffic" => Self::Traffic,
            _ => Self::Roas,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Roas => "roas",
            Self::LeadGen => "lead_gen",
            Self::Traffic => "traffic",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Roas => "ROAS",
            Self::LeadGen => "Lead Generation",
            Self::Traffic => "Traffic",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Funnel-stage cohort a creative is scored within.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum FunnelStage {
    Tof,
    Mof,
    Bof,
    #[default]
    Unclassified,
}

impl FunnelStage {
    pub const fn ordered() -> [Self; 4] {
        [Self::Tof, Self::Mof, Self::Bof, Self::Unclassified]
    }

    /// Case-insensitive, surrounding whitespace ignored. Anything other than
    /// TOF/MOF/BOF lands in the unclassified cohort.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "TOF" => Self::Tof,
            "MOF" => Self::Mof,
            "BOF" => Self::Bof,
            _ => Self::Unclassified,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tof => "TOF",
            Self::Mof => "MOF",
            Self::Bof => "BOF",
            Self::Unclassified => "unclassified",
        }
    }
}

impl From<Option<String>> for FunnelStage {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Self::parse).unwrap_or_default()
    }
}

impl From<FunnelStage> for String {
    fn from(stage: FunnelStage) -> Self {
        stage.as_str().to_string()
    }
}

impl fmt::Display for FunnelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    #[default]
    Pending,
    Completed,
}

/// Attributes assigned by upstream creative analysis. Every field stays
/// `None` until analysis has run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeTags {
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub visual_format: Option<String>,
    #[serde(default)]
    pub messaging_angle: Option<String>,
    #[serde(default)]
    pub hook_tactic: Option<String>,
    #[serde(default)]
    pub offer_type: Option<String>,
}

/// One paid-ad creative's delivery and tagging record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Creative {
    pub id: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub ad_name: Option<String>,
    #[serde(default)]
    pub ad_type: Option<String>,

    // Delivery measures
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub purchases: u64,
    #[serde(default)]
    pub leads: u64,
    #[serde(default)]
    pub conversions: u64,
    #[serde(default)]
    pub purchase_value: f64,

    // Derived rates; zero means "no data"
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub cpc: f64,
    #[serde(default)]
    pub cpm: f64,
    #[serde(default)]
    pub roas: f64,
    #[serde(default)]
    pub cpa: f64,

    #[serde(default)]
    pub funnel_stage: FunnelStage,
    #[serde(flatten)]
    pub tags: CreativeTags,
    #[serde(default)]
    pub analysis_status: AnalysisStatus,

    #[serde(default)]
    pub date_start: Option<NaiveDate>,
    #[serde(default)]
    pub date_stop: Option<NaiveDate>,
}

impl Creative {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Spend is the precondition for every analytical computation.
    pub fn is_delivering(&self) -> bool {
        self.spend > 0.0
    }

    /// Tags are only meaningful once analysis has completed.
    pub fn completed_tags(&self) -> Option<&CreativeTags> {
        match self.analysis_status {
            AnalysisStatus::Completed => Some(&self.tags),
            AnalysisStatus::Pending => None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.ad_name.as_deref().unwrap_or("Untitled")
    }

    /// Recompute ctr/cpc/cpm/roas/cpa from the raw counts.
    pub fn with_derived_rates(mut self) -> Self {
        let impressions = self.impressions as f64;
        let clicks = self.clicks as f64;
        self.ctr = ratio(clicks, impressions) * 100.0;
        self.cpc = ratio(self.spend, clicks);
        self.cpm = ratio(self.spend, impressions) * 1000.0;
        self.roas = ratio(self.purchase_value, self.spend);
        self.cpa = ratio(self.spend, self.conversions as f64);
        self
    }

    /// Reject records that break the non-negative, finite measure invariant.
    pub fn validate(&self) -> InsightsResult<()> {
        if self.id.trim().is_empty() {
            return Err(InsightsError::Validation("creative id is empty".into()));
        }
        let measures = [
            ("spend", self.spend),
            ("purchase_value", self.purchase_value),
            ("ctr", self.ctr),
            ("cpc", self.cpc),
            ("cpm", self.cpm),
            ("roas", self.roas),
            ("cpa", self.cpa),
        ];
        for (name, value) in measures {
            if !value.is_finite() || value < 0.0 {
                return Err(InsightsError::Validation(format!(
                    "creative {}: {name} must be a finite non-negative number, got {value}",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

/// Optional account filter applied to every read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountScope(Option<String>);

impl AccountScope {
    pub fn all() -> Self {
        Self(None)
    }

    pub fn account(id: impl Into<String>) -> Self {
        Self(Some(id.into()))
    }

    pub fn account_id(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn matches(&self, creative: &Creative) -> bool {
        self.0.as_deref().is_none_or(|id| creative.account_id == id)
    }
}

impl From<Option<String>> for AccountScope {
    fn from(value: Option<String>) -> Self {
        Self(value)
    }
}

impl fmt::Display for AccountScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_deref().unwrap_or("all"))
    }
}
