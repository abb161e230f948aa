use tracing::{debug, info};

use crate::optimizer::{TierChange, UpgradeBundle, WhatIfResult};
use crate::scheduler::{PlanRun, Planner};
use crate::solver::AssignmentResult;
use crate::types::{Gating, Roster};

/// Clone of `roster` with every bundle change applied in order. Changes
/// that would not raise a worker, or name a worker the roster lacks, are
/// skipped.
pub fn apply_bundles(roster: &Roster, bundles: &[UpgradeBundle]) -> (Roster, Vec<TierChange>) {
    let mut changed = roster.clone();
    let mut applied = Vec::new();
    for change in bundles.iter().flat_map(|b| b.changes.iter()) {
        let already = changed
            .get(&change.worker)
            .is_some_and(|w| w.tier >= change.target);
        if already {
            continue;
        }
        match changed.raise_tier(&change.id, &change.worker, change.target) {
            Some(previous) => {
                debug!("{}: tier {} -> {}", change.worker, previous, change.target);
                applied.push(change.clone());
            }
            None => debug!("{} is not on the roster, skipping", change.worker),
        }
    }
    (changed, applied)
}

pub fn simulate_upgrades(planner: &Planner, bundles: &[UpgradeBundle]) -> WhatIfResult {
    let before = planner.run(Gating::Current);
    let (roster, changes_applied) = apply_bundles(planner.roster(), bundles);
    let after = planner.with_roster(roster).run(Gating::Current);

    let rooms_improved = changed_rooms(&before, &after, |old, new| new > old);
    let rooms_reduced = changed_rooms(&before, &after, |old, new| new < old);
    let before_total = before.total_efficiency();
    let after_total = after.total_efficiency();
    info!(
        "applied {} tier changes: {:.2} -> {:.2}",
        changes_applied.len(),
        before_total,
        after_total
    );

    WhatIfResult {
        changes_applied,
        before_total,
        after_total,
        rooms_improved,
        rooms_reduced,
        net_gain: after_total - before_total,
        after,
    }
}

fn changed_rooms(before: &PlanRun, after: &PlanRun, keep: impl Fn(f64, f64) -> bool) -> Vec<String> {
    before
        .results
        .iter()
        .zip(after.results_by_shift())
        .filter(|(old, (_, new))| keep(old.total_efficiency, new.total_efficiency))
        .map(|(_, (shift, new))| room_label(shift, new))
        .collect()
}

pub fn room_label(shift: usize, result: &AssignmentResult) -> String {
    format!("Shift {} / {}", shift + 1, result.workplace.name)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::Config;
    use crate::optimizer::BundleScope;
    use crate::rules::{RuleTable, Scenario};
    use crate::types::Worker;

    fn planner() -> Planner {
        let table: RuleTable = serde_json::from_value(json!({
            "workplaces": {"manufacturing_stations": [{"max_operators": 3, "base_efficiency": 100}]},
            "combination_rules": {"manufacturing_station": {"generic": [
                {"combo": ["Able/1", "Baker/1"], "efficiency": 20}
            ]}}
        }))
        .expect("table");
        let scenario: Scenario = serde_json::from_value(json!({
            "trading_stations": 0,
            "manufacturing_stations": 1,
            "products": {"trading": [], "manufacturing": [{"product": "Pure Gold", "count": 1}]}
        }))
        .expect("scenario");
        let roster = Roster::from_workers(vec![Worker::new("Able", 1), Worker::new("Baker", 0)]);
        Planner::new(&table, roster, scenario, &Config::default()).expect("planner")
    }

    fn bundle(worker: &str, current: u8, target: u8) -> UpgradeBundle {
        UpgradeBundle {
            scope: BundleScope::Room,
            changes: vec![TierChange {
                worker: worker.into(),
                id: worker.into(),
                current: Some(current),
                target,
            }],
            gain: 20.0,
            rooms: vec!["Manufacturing 1".into()],
            via: Vec::new(),
            boost_related: false,
            source: None,
        }
    }

    #[test]
    fn applying_suggested_bundle_recovers_gain() {
        let planner = planner();
        let bundles = planner.compare().bundles;
        assert_eq!(bundles.len(), 1);

        let result = simulate_upgrades(&planner, &bundles);
        assert_eq!(result.changes_applied.len(), 1);
        assert!((result.before_total - 300.0).abs() < 1e-9);
        assert!((result.after_total - 340.0).abs() < 1e-9);
        assert!((result.net_gain - 40.0).abs() < 1e-9);
        assert_eq!(
            result.rooms_improved,
            vec!["Shift 1 / Manufacturing 1", "Shift 2 / Manufacturing 1"]
        );
        assert!(result.rooms_reduced.is_empty());
    }

    #[test]
    fn apply_skips_unknown_and_non_raising_changes() {
        let planner = planner();
        let bundles = vec![
            bundle("Able", 1, 1),
            bundle("Ghost", 0, 2),
            bundle("Baker", 0, 2),
            bundle("Baker", 0, 1),
        ];
        let (roster, applied) = apply_bundles(planner.roster(), &bundles);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].worker, "Baker");
        assert_eq!(roster.get("Baker").map(|w| w.tier), Some(2));
        assert_eq!(planner.roster().get("Baker").map(|w| w.tier), Some(0));
    }
}
