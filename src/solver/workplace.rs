use std::sync::Arc;

use tracing::debug;

use crate::ledger::ResourceLedger;
use crate::solver::candidates::{candidates_for, Candidate};
use crate::solver::evaluator::{check_candidate, contribution, slot_score, WorkplaceState};
use crate::solver::{AssignmentResult, SolveContext, TraceEntry, TraceKind};
use crate::types::{Gating, Workplace};

struct Pick<'a> {
    candidate: Candidate<'a>,
    contribution: f64,
    score: f64,
}

/// Each round takes the best per-slot candidate still admissible; a
/// zero score still seats. Ties keep the candidate seen first. Open
/// slots are left for auto-fill.
pub fn solve_workplace(
    ctx: &SolveContext<'_>,
    workplace: &Workplace,
    ledger: &mut ResourceLedger,
    gating: Gating,
) -> AssignmentResult {
    let candidates = candidates_for(ctx.rules, workplace);
    let mut state = WorkplaceState::new(workplace.capacity);
    let mut result = AssignmentResult::empty(workplace);

    while state.remaining > 0 {
        let Some(pick) = best_candidate(ctx, workplace, &candidates, &state, ledger, gating) else {
            break;
        };
        if pick.score < 0.0 {
            break;
        }
        commit(&pick, workplace, &mut state, ledger, &mut result);
    }

    debug!(
        "{}: {} seated, efficiency {:.2}",
        workplace.id,
        result.workers.len(),
        result.total_efficiency
    );
    result
}

fn best_candidate<'a>(
    ctx: &SolveContext<'_>,
    workplace: &Workplace,
    candidates: &[Candidate<'a>],
    state: &WorkplaceState,
    ledger: &ResourceLedger,
    gating: Gating,
) -> Option<Pick<'a>> {
    let mut best: Option<Pick<'a>> = None;
    for candidate in candidates {
        if let Err(reason) = check_candidate(ctx, workplace, candidate, state, ledger, gating) {
            debug!("{}: skip {}: {reason}", workplace.id, candidate.rule.description);
            continue;
        }
        let value = contribution(ctx, workplace, candidate, gating);
        let score = slot_score(ctx, workplace, candidate, value, state, ledger);
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(Pick {
                candidate: candidate.clone(),
                contribution: value,
                score,
            });
        }
    }
    best
}

fn commit(
    pick: &Pick<'_>,
    workplace: &Workplace,
    state: &mut WorkplaceState,
    ledger: &mut ResourceLedger,
    result: &mut AssignmentResult,
) {
    let rule = pick.candidate.rule;
    let workers: Vec<String> = pick.candidate.workers.iter().map(|w| w.to_string()).collect();

    for worker in &workers {
        ledger.commit(worker, Some(workplace.kind));
        state.used.insert(worker.clone());
    }
    state.remaining -= workers.len();
    state.record_family(rule.family);

    let description = match pick.candidate.kind {
        TraceKind::Individual => format!("{}({})", rule.description, workers.join(", ")),
        TraceKind::System | TraceKind::Generic => rule.description.clone(),
    };
    debug!("{}: commit {description} (+{:.2})", workplace.id, pick.contribution);

    result.workers.extend(workers.iter().cloned());
    result.synergy_efficiency += pick.contribution;
    result.total_efficiency = workplace.base_efficiency + result.synergy_efficiency;
    result.applied.push(description);
    result.applied_rules.push(Arc::clone(rule));
    result.facilities.extend(&rule.facilities);
    result.trace.push(TraceEntry {
        rule: Arc::clone(rule),
        workers,
        contribution: pick.contribution,
        kind: pick.candidate.kind,
    });
}
