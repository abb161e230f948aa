use std::collections::BTreeSet;

use thiserror::Error;

use crate::ledger::ResourceLedger;
use crate::rules::{RuleFamily, SynergyRule};
use crate::solver::candidates::Candidate;
use crate::solver::SolveContext;
use crate::types::{Gating, RoomRequirement, Tier, Workplace, WorkplaceKind, MAX_TIER};

#[derive(Debug, Clone)]
pub struct WorkplaceState {
    pub used: BTreeSet<String>,
    pub remaining: usize,
    pub has_automation: bool,
    pub has_generic: bool,
}

impl WorkplaceState {
    pub fn new(capacity: usize) -> Self {
        Self {
            used: BTreeSet::new(),
            remaining: capacity,
            has_automation: false,
            has_generic: false,
        }
    }

    pub fn record_family(&mut self, family: RuleFamily) {
        match family {
            RuleFamily::Automation => self.has_automation = true,
            RuleFamily::Generic => self.has_generic = true,
            RuleFamily::Neutral => {}
        }
    }

    fn excludes(&self, family: RuleFamily) -> bool {
        match family {
            RuleFamily::Automation => self.has_generic,
            RuleFamily::Generic => self.has_automation,
            RuleFamily::Neutral => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("needs {needed} slots, {remaining} left")]
    OverCapacity { needed: usize, remaining: usize },
    #[error("family excluded by an earlier commit")]
    FamilyExcluded,
    #[error("{0} is not owned")]
    NotOwned(String),
    #[error("{0} already works this shift")]
    ShiftUsed(String),
    #[error("{0} already seated here")]
    UsedHere(String),
    #[error("{0} reached its fatigue ceiling")]
    Exhausted(String),
    #[error("{worker} below tier {required}")]
    BelowTier { worker: String, required: Tier },
    #[error("{worker} above tier {limit}")]
    AboveTier { worker: String, limit: Tier },
    #[error("side requirement on {0} cannot be met")]
    Facility(String),
    #[error("reserved partner {0} unavailable")]
    Reserve(String),
    #[error("{0} not yet placed in production")]
    After(String),
}

pub fn check_candidate(
    ctx: &SolveContext<'_>,
    workplace: &Workplace,
    candidate: &Candidate<'_>,
    state: &WorkplaceState,
    ledger: &ResourceLedger,
    gating: Gating,
) -> Result<(), Rejection> {
    let rule = candidate.rule.as_ref();

    if candidate.len() > state.remaining {
        return Err(Rejection::OverCapacity {
            needed: candidate.len(),
            remaining: state.remaining,
        });
    }
    if state.excludes(rule.family) {
        return Err(Rejection::FamilyExcluded);
    }

    for &name in &candidate.workers {
        let worker = ctx
            .roster
            .owned(name)
            .ok_or_else(|| Rejection::NotOwned(name.to_string()))?;
        if state.used.contains(name) {
            return Err(Rejection::UsedHere(name.to_string()));
        }
        if ledger.is_shift_used(name) {
            return Err(Rejection::ShiftUsed(name.to_string()));
        }
        if ledger.is_exhausted(name, Some(workplace.kind)) {
            return Err(Rejection::Exhausted(name.to_string()));
        }
        if gating.enforced() {
            let required = rule.min_tier(name);
            if worker.tier < required {
                return Err(Rejection::BelowTier {
                    worker: name.to_string(),
                    required,
                });
            }
            if let Some(&limit) = rule.max_tiers.get(name) {
                if worker.tier > limit {
                    return Err(Rejection::AboveTier {
                        worker: name.to_string(),
                        limit,
                    });
                }
            }
        }
    }

    for (_, req) in rule.facilities.iter() {
        if !facility_requirement_met(ctx, req, ledger, gating) {
            return Err(Rejection::Facility(req.worker.clone()));
        }
    }

    for req in &rule.reserve {
        if !partner_available(ctx, req, candidate, state, ledger, gating) {
            return Err(Rejection::Reserve(req.worker.clone()));
        }
    }

    if let Some(missing) = rule.after.iter().find(|w| !ledger.placed_in_production(w)) {
        return Err(Rejection::After(missing.clone()));
    }

    Ok(())
}

pub fn facility_requirement_met(
    ctx: &SolveContext<'_>,
    req: &RoomRequirement,
    ledger: &ResourceLedger,
    gating: Gating,
) -> bool {
    let Some(worker) = ctx.roster.owned(&req.worker) else {
        return false;
    };
    if gating.enforced() && worker.tier < req.min_tier {
        return false;
    }
    ledger.usage(&req.worker) < ctx.config.fatigue_ceiling
}

fn partner_available(
    ctx: &SolveContext<'_>,
    req: &RoomRequirement,
    candidate: &Candidate<'_>,
    state: &WorkplaceState,
    ledger: &ResourceLedger,
    gating: Gating,
) -> bool {
    let Some(worker) = ctx.roster.owned(&req.worker) else {
        return false;
    };
    if candidate.contains(&req.worker)
        || state.used.contains(&req.worker)
        || ledger.is_shift_used(&req.worker)
        || ledger.is_exhausted(&req.worker, Some(WorkplaceKind::Trading))
    {
        return false;
    }
    !gating.enforced() || worker.tier >= req.min_tier
}

pub fn contribution(
    ctx: &SolveContext<'_>,
    workplace: &Workplace,
    candidate: &Candidate<'_>,
    gating: Gating,
) -> f64 {
    let rule = candidate.rule.as_ref();
    if workplace.kind != WorkplaceKind::Meeting {
        return rule.synergy;
    }
    let occupants: f64 = candidate
        .workers
        .iter()
        .map(|&name| {
            let current = ctx.roster.get(name).map_or(0, |w| w.tier);
            ctx.config.meeting_per_occupant + tier_bonus(ctx, scored_tier(rule, name, current, gating))
        })
        .sum();
    rule.synergy + occupants
}

fn scored_tier(rule: &SynergyRule, worker: &str, current: Tier, gating: Gating) -> Tier {
    match gating {
        Gating::Current => current,
        Gating::Ignored => current.max(rule.min_tier(worker)),
    }
}

fn tier_bonus(ctx: &SolveContext<'_>, tier: Tier) -> f64 {
    ctx.config.meeting_tier_bonus[usize::from(tier.min(MAX_TIER))]
}

/// An automation group that leaves slots open spreads its value over the
/// whole remainder unless the neutral filler can still take those slots.
pub fn slot_score(
    ctx: &SolveContext<'_>,
    workplace: &Workplace,
    candidate: &Candidate<'_>,
    contribution: f64,
    state: &WorkplaceState,
    ledger: &ResourceLedger,
) -> f64 {
    let seats = candidate.len().max(1);
    let strands_slots = candidate.rule.family == RuleFamily::Automation
        && workplace.kind.is_production()
        && seats < state.remaining;
    if strands_slots && !neutral_available(ctx, candidate, state, ledger) {
        return contribution / state.remaining as f64;
    }
    contribution / seats as f64
}

fn neutral_available(
    ctx: &SolveContext<'_>,
    candidate: &Candidate<'_>,
    state: &WorkplaceState,
    ledger: &ResourceLedger,
) -> bool {
    let Some(neutral) = ctx.neutral_worker else {
        return false;
    };
    if candidate.contains(neutral) {
        return true;
    }
    ctx.roster.owned(neutral).is_some()
        && !state.used.contains(neutral)
        && !ledger.is_shift_used(neutral)
        && ledger.usage(neutral) < ctx.config.fatigue_ceiling
}
