pub mod compiler;
pub mod facility;
pub mod loader;
pub mod schema;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{FacilityRequirements, RoomRequirement, Tier, Workplace, WorkplaceKind};

pub use compiler::{compile_rules, parse_token};
pub use facility::compile_facility_rules;
pub use schema::{RuleTable, Scenario};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleShape {
    Combination,
    Individual,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleFamily {
    Automation,
    Generic,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynergyRule {
    pub workers: Vec<String>,
    pub kind: WorkplaceKind,
    pub synergy: f64,
    pub description: String,
    pub min_tiers: BTreeMap<String, Tier>,
    pub max_tiers: BTreeMap<String, Tier>,
    pub facilities: FacilityRequirements,
    pub shape: RuleShape,
    pub priority: i32,
    pub products: Vec<String>,
    pub system: Option<String>,
    pub family: RuleFamily,
    pub reserve: Vec<RoomRequirement>,
    pub after: Vec<String>,
}

impl SynergyRule {
    pub fn min_tier(&self, worker: &str) -> Tier {
        self.min_tiers.get(worker).copied().unwrap_or(0)
    }

    pub fn matches_product(&self, product: Option<&str>) -> bool {
        if self.products.is_empty() {
            return true;
        }
        product.is_some_and(|p| self.products.iter().any(|rp| rp == p))
    }

    pub fn applies_to(&self, workplace: &Workplace) -> bool {
        self.kind == workplace.kind && self.matches_product(workplace.product.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SharedFacilityRule {
    pub workers: Vec<String>,
    pub description: String,
    pub bonus: f64,
    pub priority: i32,
    pub group: Option<String>,
    pub min_tiers: BTreeMap<String, Tier>,
}

#[derive(Debug, Clone, Default)]
pub struct CompiledRules {
    pub synergy: Vec<Arc<SynergyRule>>,
    pub facility: Vec<SharedFacilityRule>,
}

impl CompiledRules {
    pub fn for_workplace<'a>(
        &'a self,
        workplace: &'a Workplace,
    ) -> impl Iterator<Item = &'a Arc<SynergyRule>> + 'a {
        self.synergy.iter().filter(move |r| r.applies_to(workplace))
    }

    pub fn of_kind(&self, kind: WorkplaceKind) -> impl Iterator<Item = &Arc<SynergyRule>> {
        self.synergy.iter().filter(move |r| r.kind == kind)
    }
}
