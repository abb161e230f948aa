pub mod candidates;
pub mod evaluator;
pub mod facility;
pub mod workplace;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::rules::{CompiledRules, SynergyRule};
use crate::types::{FacilityRequirements, Roster, Workplace};

pub use facility::{fill_control_center, FacilityAdmissions};
pub use workplace::solve_workplace;

#[derive(Debug, Clone, Copy)]
pub struct SolveContext<'a> {
    pub rules: &'a CompiledRules,
    pub roster: &'a Roster,
    pub config: &'a SolverConfig,
    pub neutral_worker: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    System,
    Generic,
    Individual,
}

#[derive(Debug, Clone)]
pub struct TraceEntry {
    pub rule: Arc<SynergyRule>,
    pub workers: Vec<String>,
    pub contribution: f64,
    pub kind: TraceKind,
}

#[derive(Debug, Clone)]
pub struct AssignmentResult {
    pub workplace: Workplace,
    pub workers: Vec<String>,
    pub total_efficiency: f64,
    pub synergy_efficiency: f64,
    pub applied: Vec<String>,
    pub applied_rules: Vec<Arc<SynergyRule>>,
    pub facilities: FacilityRequirements,
    pub trace: Vec<TraceEntry>,
}

impl AssignmentResult {
    pub fn empty(workplace: &Workplace) -> Self {
        Self {
            workplace: workplace.clone(),
            workers: Vec::new(),
            total_efficiency: workplace.base_efficiency,
            synergy_efficiency: 0.0,
            applied: Vec::new(),
            applied_rules: Vec::new(),
            facilities: FacilityRequirements::default(),
            trace: Vec::new(),
        }
    }

    pub fn is_autofill(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn open_slots(&self) -> usize {
        self.workplace.capacity.saturating_sub(self.workers.len())
    }
}
