use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ledger::ResourceLedger;
use crate::solver::{AssignmentResult, SolveContext};
use crate::types::{Gating, RoomRequirement};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacilityAdmissions {
    pub control_center: Vec<String>,
    pub dormitory: Vec<String>,
    pub hire: Vec<String>,
    pub processing: Vec<String>,
}

impl FacilityAdmissions {
    pub fn admit(&mut self, result: &AssignmentResult, ledger: &mut ResourceLedger, ceiling: u32) {
        let facilities = &result.facilities;
        admit_list(&facilities.control_center, &mut self.control_center, ledger, ceiling);
        admit_list(&facilities.dormitory, &mut self.dormitory, ledger, ceiling);
        admit_list(&facilities.processing, &mut self.processing, ledger, ceiling);
        admit_list(&facilities.hire, &mut self.hire, ledger, ceiling);
    }
}

fn admit_list(
    requirements: &[RoomRequirement],
    target: &mut Vec<String>,
    ledger: &mut ResourceLedger,
    ceiling: u32,
) {
    for req in requirements {
        if ledger.is_shift_used(&req.worker) || ledger.usage(&req.worker) >= ceiling {
            continue;
        }
        ledger.commit(&req.worker, None);
        target.push(req.worker.clone());
    }
}

/// Tops up the control center from the shared-facility rules in one
/// priority-ordered pass. Groups already represented by a seated worker
/// are closed. Returns the descriptions of the rules applied.
pub fn fill_control_center(
    ctx: &SolveContext<'_>,
    seated: &mut Vec<String>,
    ledger: &mut ResourceLedger,
    gating: Gating,
) -> Vec<String> {
    let rules = &ctx.rules.facility;
    let mut remaining = ctx.config.control_center_capacity.saturating_sub(seated.len());
    let mut applied = Vec::new();
    if remaining == 0 {
        return applied;
    }

    let mut used_groups: BTreeSet<&str> = rules
        .iter()
        .filter(|rule| rule.workers.iter().any(|w| seated.contains(w)))
        .filter_map(|rule| rule.group.as_deref())
        .collect();

    for rule in rules {
        if remaining == 0 {
            break;
        }
        if rule.workers.is_empty() || rule.workers.len() > remaining {
            continue;
        }
        if rule.group.as_deref().is_some_and(|g| used_groups.contains(g)) {
            continue;
        }
        let seatable = rule.workers.iter().all(|name| {
            ctx.roster.owned(name).is_some_and(|worker| {
                !ledger.is_shift_used(name)
                    && ledger.usage(name) < ctx.config.fatigue_ceiling
                    && (!gating.enforced()
                        || worker.tier >= rule.min_tiers.get(name).copied().unwrap_or(0))
            })
        });
        if !seatable {
            continue;
        }

        for name in &rule.workers {
            ledger.commit(name, None);
            seated.push(name.clone());
        }
        remaining -= rule.workers.len();
        if let Some(group) = rule.group.as_deref() {
            used_groups.insert(group);
        }
        debug!("control center: {}", rule.description);
        applied.push(rule.description.clone());
    }
    applied
}
