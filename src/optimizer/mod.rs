pub mod upgrades;
pub mod whatif;

use serde::{Deserialize, Serialize};

use crate::scheduler::PlanRun;
use crate::solver::TraceKind;
use crate::types::Tier;

pub use upgrades::{attribute_gain, build_upgrade_bundles, Attribution};
pub use whatif::{apply_bundles, simulate_upgrades};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierChange {
    pub worker: String,
    #[serde(default)]
    pub id: String,
    pub current: Option<Tier>,
    pub target: Tier,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BundleScope {
    Room,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpgradeBundle {
    pub scope: BundleScope,
    pub changes: Vec<TierChange>,
    pub gain: f64,
    pub rooms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub via: Vec<String>,
    pub boost_related: bool,
    pub source: Option<TraceKind>,
}

impl UpgradeBundle {
    pub fn is_single(&self) -> bool {
        self.changes.len() == 1
    }

    pub fn summary(&self) -> String {
        self.changes
            .iter()
            .map(|c| match c.current {
                Some(tier) => format!("{} {}->{}", c.worker, tier, c.target),
                None => format!("{} (not owned)->{}", c.worker, c.target),
            })
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WhatIfResult {
    pub changes_applied: Vec<TierChange>,
    pub before_total: f64,
    pub after_total: f64,
    pub rooms_improved: Vec<String>,
    pub rooms_reduced: Vec<String>,
    pub net_gain: f64,
    pub after: PlanRun,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub current: PlanRun,
    pub potential: PlanRun,
    pub bundles: Vec<UpgradeBundle>,
}
