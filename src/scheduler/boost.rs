use crate::rules::CompiledRules;
use crate::types::{Gating, Roster, WorkplaceKind, MAX_TIER};

pub fn booster_ready(roster: &Roster, booster: Option<&str>, gating: Gating) -> bool {
    booster
        .and_then(|name| roster.owned(name))
        .is_some_and(|worker| !gating.enforced() || worker.tier >= MAX_TIER)
}

/// Picks up to `max` boost targets. Preferred candidates count only when
/// owned at the top tier; the rest are filled by summed trading-rule
/// value per seat, highest first.
pub fn select_boost_targets(
    rules: &CompiledRules,
    roster: &Roster,
    preferred: &[String],
    max: usize,
) -> Vec<String> {
    let mut selected: Vec<String> = preferred
        .iter()
        .filter(|name| roster.owned(name).is_some_and(|w| w.tier >= MAX_TIER))
        .take(max)
        .cloned()
        .collect();
    if selected.len() >= max {
        return selected;
    }

    let mut scores: Vec<(String, f64)> = Vec::new();
    for rule in rules.of_kind(WorkplaceKind::Trading) {
        if rule.workers.is_empty() {
            continue;
        }
        let share = rule.synergy / rule.workers.len() as f64;
        for worker in &rule.workers {
            if roster.owned(worker).is_none() || selected.contains(worker) {
                continue;
            }
            match scores.iter_mut().find(|(name, _)| name == worker) {
                Some((_, score)) => *score += share,
                None => scores.push((worker.clone(), share)),
            }
        }
    }
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    let room = max - selected.len();
    selected.extend(scores.into_iter().take(room).map(|(name, _)| name));
    selected
}
