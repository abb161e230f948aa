use serde::{Deserialize, Serialize};

use crate::solver::AssignmentResult;
use crate::types::Gating;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoomPlan {
    pub operators: Vec<String>,
    pub autofill: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

impl RoomPlan {
    pub fn seated(operators: Vec<String>) -> Self {
        Self {
            autofill: operators.is_empty(),
            operators,
            product: None,
        }
    }

    pub fn from_result(result: &AssignmentResult) -> Self {
        Self {
            operators: result.workers.clone(),
            autofill: result.is_autofill(),
            product: result.workplace.product.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoomPlans {
    pub trading: Vec<RoomPlan>,
    pub manufacture: Vec<RoomPlan>,
    pub control: Vec<RoomPlan>,
    pub power: Vec<RoomPlan>,
    pub meeting: Vec<RoomPlan>,
    pub hire: Vec<RoomPlan>,
    pub dormitory: Vec<RoomPlan>,
    pub processing: Vec<RoomPlan>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoostPlan {
    pub enable: bool,
    pub target: String,
    pub order: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DronePlan {
    pub enable: bool,
    pub room: String,
    pub index: usize,
    pub order: String,
}

impl DronePlan {
    pub fn disabled(order: &str) -> Self {
        Self {
            enable: false,
            room: String::new(),
            index: 0,
            order: order.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShiftPlan {
    pub name: String,
    pub boost: BoostPlan,
    pub rooms: RoomPlans,
    pub drones: DronePlan,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_rules: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanRun {
    pub mode: Gating,
    pub title: String,
    pub description: String,
    pub layout_code: String,
    pub boost_targets: Vec<String>,
    pub plans: Vec<ShiftPlan>,
    #[serde(skip)]
    pub results: Vec<AssignmentResult>,
}

impl PlanRun {
    pub fn total_efficiency(&self) -> f64 {
        self.results.iter().map(|r| r.total_efficiency).sum()
    }

    pub fn shift_count(&self) -> usize {
        self.plans.len()
    }

    pub fn rooms_per_shift(&self) -> usize {
        (self.results.len() / self.shift_count().max(1)).max(1)
    }

    pub fn results_by_shift(&self) -> impl Iterator<Item = (usize, &AssignmentResult)> {
        let per_shift = self.rooms_per_shift();
        self.results.iter().enumerate().map(move |(i, r)| (i / per_shift, r))
    }
}

pub fn title_for(mode: Gating) -> (&'static str, &'static str) {
    match mode {
        Gating::Current => (
            "Best plan at current proficiency",
            "Built from each worker's actual tier.",
        ),
        Gating::Ignored => (
            "Potential plan",
            "Tier requirements ignored; only ownership limits the plan.",
        ),
    }
}
