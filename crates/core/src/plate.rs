//! Plates (the per-item decision record) and the cook report.
//!
//! Field names serialize in camelCase so reports can be handed to
//! dashboards and log pipelines unchanged.

use crate::recipe::PriorityTag;
use serde::{Deserialize, Serialize};

/// What the planner did with an order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    /// The first order item under a budget; always served.
    ForcedInclude,
    Included,
    Dropped,
}

impl Decision {
    pub fn is_served(&self) -> bool {
        !matches!(self, Self::Dropped)
    }
}

/// One consumed ingredient in a lineage edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRef {
    pub token: String,
    /// Sub-path the ingredient was consumed through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
}

/// How one token was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageEdge {
    pub token: String,
    /// Recipe name, or `"pantry"` for caller-supplied values.
    pub provider_name: String,
    pub deps: Vec<DependencyRef>,
}

/// The decision record for one order item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plate {
    pub token: String,
    pub decision: Decision,
    pub reason: String,
    pub served_detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_tag: Option<PriorityTag>,
    pub priority_score: f64,
    pub was_compressed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_note: Option<String>,
    /// Cost of the baseline rendering.
    pub original_cost: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressed_cost: Option<usize>,
    /// Cost actually charged against the budget (0 when dropped).
    pub cost: usize,
    pub running_total_before: usize,
    pub running_total_after: usize,
    pub lineage: Vec<LineageEdge>,
}

/// The outcome of one cook call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookReport {
    /// Every served rendering, in order, each followed by a newline.
    pub context: String,
    pub total_tokens: usize,
    pub budget: Option<usize>,
    /// Present only when an explanation was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plates: Option<Vec<Plate>>,
}

impl CookReport {
    /// Plates that were dropped, if plates were recorded.
    pub fn dropped(&self) -> impl Iterator<Item = &Plate> {
        self.plates
            .iter()
            .flatten()
            .filter(|p| p.decision == Decision::Dropped)
    }

    /// Budget utilization percentage (0.0–100.0+), if a budget was given.
    pub fn utilization_pct(&self) -> Option<f32> {
        self.budget
            .filter(|b| *b > 0)
            .map(|b| (self.total_tokens as f32 / b as f32) * 100.0)
    }
}
