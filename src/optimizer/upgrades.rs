use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::config::{BoostConfig, UpgradeConfig};
use crate::optimizer::{BundleScope, TierChange, UpgradeBundle};
use crate::scheduler::PlanRun;
use crate::solver::{AssignmentResult, TraceKind};
use crate::types::{Roster, Tier, MAX_TIER};

#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    pub changes: Vec<TierChange>,
    pub gain: f64,
    pub kind: TraceKind,
}

impl Attribution {
    fn key(&self) -> Vec<(String, Tier)> {
        self.changes
            .iter()
            .map(|c| (c.worker.clone(), c.target))
            .collect()
    }
}

struct Merged {
    changes: Vec<TierChange>,
    gain: f64,
    rooms: BTreeSet<String>,
    boost_related: bool,
    source: TraceKind,
}

/// Splits `gain` across the traced rules of `result` that need upgrades.
/// Shares sum to `gain` whenever at least one rule contributes.
pub fn attribute_gain(result: &AssignmentResult, gain: f64, roster: &Roster) -> Vec<Attribution> {
    let mut pending = Vec::new();
    for entry in &result.trace {
        let mut needed: BTreeMap<&str, Tier> = BTreeMap::new();
        for worker in &entry.workers {
            let tier = entry.rule.min_tier(worker);
            if tier > 0 {
                let slot = needed.entry(worker.as_str()).or_insert(0);
                *slot = (*slot).max(tier);
            }
        }
        for (_, req) in entry.rule.facilities.iter() {
            let slot = needed.entry(req.worker.as_str()).or_insert(0);
            *slot = (*slot).max(req.min_tier);
        }

        let changes: Vec<TierChange> = needed
            .into_iter()
            .filter_map(|(name, target)| {
                let worker = roster.get(name)?;
                (worker.tier < target).then(|| TierChange {
                    worker: worker.name.clone(),
                    id: worker.id.clone(),
                    current: Some(worker.tier),
                    target,
                })
            })
            .collect();
        if !changes.is_empty() {
            pending.push((changes, entry.contribution, entry.kind));
        }
    }

    let denominator: f64 = pending.iter().map(|(_, contribution, _)| contribution).sum();
    if denominator <= 0.0 {
        return Vec::new();
    }
    pending
        .into_iter()
        .map(|(changes, contribution, kind)| Attribution {
            changes,
            gain: gain * contribution / denominator,
            kind,
        })
        .collect()
}

pub fn build_upgrade_bundles(
    current: &PlanRun,
    potential: &PlanRun,
    roster: &Roster,
    config: &UpgradeConfig,
    boost: &BoostConfig,
) -> Vec<UpgradeBundle> {
    if current.results.len() != potential.results.len() {
        warn!(
            "run shapes differ ({} vs {} room solves), no upgrade suggestions",
            current.results.len(),
            potential.results.len()
        );
        return Vec::new();
    }

    let targets: BTreeSet<&str> = potential.boost_targets.iter().map(String::as_str).collect();
    let mut merged: BTreeMap<Vec<(String, Tier)>, Merged> = BTreeMap::new();
    let mut boost_gain = 0.0;
    let mut boost_rooms = BTreeSet::new();

    for (before, after) in current.results.iter().zip(&potential.results) {
        let gain = after.total_efficiency - before.total_efficiency;
        if gain <= config.gain_threshold {
            continue;
        }
        let room = after.workplace.name.clone();
        let boosted = after.workers.iter().any(|w| targets.contains(w.as_str()));
        if boosted {
            boost_gain += gain;
            boost_rooms.insert(room.clone());
        }

        for share in attribute_gain(after, gain, roster) {
            debug!("{room}: {:.2} credited to {:?}", share.gain, share.key());
            let entry = merged.entry(share.key()).or_insert_with(|| Merged {
                changes: share.changes.clone(),
                gain: 0.0,
                rooms: BTreeSet::new(),
                boost_related: false,
                source: share.kind,
            });
            entry.gain = entry.gain.max(share.gain);
            entry.rooms.insert(room.clone());
            entry.boost_related |= boosted;
        }
    }

    let booster = boost.booster.as_deref();
    let boost_counts = boost_gain > config.system_gain_threshold;
    let mut bundles = Vec::new();

    if let (Some(name), true) = (booster, boost_counts) {
        let worker = roster.get(name);
        let current_tier = worker.filter(|w| w.owned).map(|w| w.tier);
        if current_tier.map_or(true, |tier| tier < MAX_TIER) {
            bundles.push(UpgradeBundle {
                scope: BundleScope::System,
                changes: vec![TierChange {
                    worker: name.to_string(),
                    id: worker.map(|w| w.id.clone()).unwrap_or_default(),
                    current: current_tier,
                    target: MAX_TIER,
                }],
                gain: boost_gain,
                rooms: boost_rooms.into_iter().collect(),
                via: potential.boost_targets.clone(),
                boost_related: true,
                source: None,
            });
        }
    }

    for (_, entry) in merged {
        let booster_only = entry.changes.len() == 1 && Some(entry.changes[0].worker.as_str()) == booster;
        if booster_only && boost_counts {
            continue;
        }
        bundles.push(UpgradeBundle {
            scope: BundleScope::Room,
            changes: entry.changes,
            gain: entry.gain,
            rooms: entry.rooms.into_iter().collect(),
            via: Vec::new(),
            boost_related: entry.boost_related,
            source: Some(entry.source),
        });
    }

    bundles.sort_by(|a, b| b.gain.total_cmp(&a.gain));
    bundles
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::Config;
    use crate::rules::{RuleTable, Scenario};
    use crate::scheduler::Planner;
    use crate::types::{Gating, Worker};

    fn single_room_scenario() -> Scenario {
        serde_json::from_value(json!({
            "trading_stations": 0,
            "manufacturing_stations": 1,
            "products": {"trading": [], "manufacturing": [{"product": "Pure Gold", "count": 1}]}
        }))
        .expect("scenario")
    }

    #[test]
    fn single_shortfall_yields_one_bundle_with_room_gain() {
        let table: RuleTable = serde_json::from_value(json!({
            "workplaces": {"manufacturing_stations": [{"max_operators": 3, "base_efficiency": 100}]},
            "combination_rules": {"manufacturing_station": {"generic": [
                {"combo": ["Able/1", "Baker/1"], "efficiency": 20}
            ]}}
        }))
        .expect("table");
        let roster = Roster::from_workers(vec![
            Worker::new("Able", 1),
            Worker::new("Baker", 0),
            Worker::new("Cole", 0),
            Worker::new("Dane", 0),
            Worker::new("Eve", 0),
        ]);
        let planner =
            Planner::new(&table, roster, single_room_scenario(), &Config::default()).expect("planner");
        let comparison = planner.compare();

        assert!(comparison.current.results.iter().all(|r| r.trace.is_empty()));
        let first = &comparison.potential.results[0];
        assert_eq!(first.trace.len(), 1);
        assert_eq!(first.total_efficiency, 120.0);

        assert_eq!(comparison.bundles.len(), 1);
        let bundle = &comparison.bundles[0];
        assert_eq!(bundle.scope, BundleScope::Room);
        assert_eq!(
            bundle.changes,
            vec![TierChange {
                worker: "Baker".into(),
                id: "Baker".into(),
                current: Some(0),
                target: 1,
            }]
        );
        assert!((bundle.gain - 20.0).abs() < 1e-9);
        assert_eq!(bundle.rooms, vec!["Manufacturing 1"]);
    }

    #[test]
    fn shared_requirement_takes_max_gain_and_unions_rooms() {
        let table: RuleTable = serde_json::from_value(json!({
            "workplaces": {"manufacturing_stations": [{"max_operators": 3, "base_efficiency": 0}]},
            "combination_rules": {"manufacturing_station": {"generic": [
                {"combo": ["Gold1"], "efficiency": 30, "product": "Pure Gold", "control_center": ["Warden/2"]},
                {"combo": ["Rec1"], "efficiency": 18, "product": "Battle Record", "control_center": ["Warden/2"]}
            ]}}
        }))
        .expect("table");
        let roster = Roster::from_workers(vec![
            Worker::new("Gold1", 0),
            Worker::new("Rec1", 0),
            Worker::new("Warden", 1),
        ]);
        let scenario: Scenario = serde_json::from_value(json!({
            "trading_stations": 0,
            "manufacturing_stations": 2,
            "products": {"trading": [], "manufacturing": [
                {"product": "Pure Gold", "count": 1},
                {"product": "Battle Record", "count": 1}
            ]}
        }))
        .expect("scenario");
        let planner = Planner::new(&table, roster, scenario, &Config::default()).expect("planner");
        let comparison = planner.compare();

        assert_eq!(comparison.bundles.len(), 1);
        let bundle = &comparison.bundles[0];
        assert_eq!(bundle.changes[0].worker, "Warden");
        assert_eq!(bundle.changes[0].target, 2);
        assert!((bundle.gain - 30.0).abs() < 1e-9);
        assert_eq!(bundle.rooms, vec!["Manufacturing 1", "Manufacturing 2"]);
    }

    #[test]
    fn shares_conserve_room_gain() {
        let table: RuleTable = serde_json::from_value(json!({
            "combination_rules": {"trading_station": {"generic": [
                {"combo": ["A/2"], "efficiency": 30},
                {"combo": ["B/1"], "efficiency": 10},
                {"combo": ["C"], "efficiency": 5}
            ]}}
        }))
        .expect("table");
        let scenario = Scenario {
            trading_stations: 1,
            manufacturing_stations: 0,
            ..Scenario::default()
        };
        let roster = Roster::from_workers(vec![
            Worker::new("A", 0),
            Worker::new("B", 0),
            Worker::new("C", 0),
        ]);
        let planner = Planner::new(&table, roster.clone(), scenario, &Config::default()).expect("planner");
        let potential = planner.run(Gating::Ignored);
        let room = &potential.results[0];
        assert_eq!(room.trace.len(), 3);

        let shares = attribute_gain(room, 36.0, &roster);
        assert_eq!(shares.len(), 2);
        let total: f64 = shares.iter().map(|s| s.gain).sum();
        assert!((total - 36.0).abs() < 1e-9);
        assert!((shares[0].gain - 27.0).abs() < 1e-9);
    }

    #[test]
    fn booster_gets_system_bundle_and_no_room_duplicate() {
        let table: RuleTable = serde_json::from_value(json!({
            "workplaces": {"trading_stations": [{"max_operators": 1, "base_efficiency": 0}]},
            "combination_rules": {"trading_station": {"generic": [
                {"combo": ["Star"], "efficiency": 30, "control_center": ["Booster/2"]}
            ]}}
        }))
        .expect("table");
        let roster = Roster::from_workers(vec![Worker::new("Star", 2), Worker::new("Booster", 1)]);
        let mut scenario = Scenario {
            trading_stations: 1,
            manufacturing_stations: 0,
            ..Scenario::default()
        };
        scenario.support_boost.enable = true;
        let mut config = Config::default();
        config.boost.booster = Some("Booster".into());

        let planner = Planner::new(&table, roster, scenario, &config).expect("planner");
        let comparison = planner.compare();
        assert!(comparison.current.boost_targets.is_empty());
        assert_eq!(comparison.potential.boost_targets, vec!["Star"]);

        assert_eq!(comparison.bundles.len(), 1);
        let bundle = &comparison.bundles[0];
        assert_eq!(bundle.scope, BundleScope::System);
        assert_eq!(bundle.changes[0].worker, "Booster");
        assert_eq!(bundle.changes[0].current, Some(1));
        // The booster itself tires after two shifts.
        assert!((bundle.gain - 60.0).abs() < 1e-9);
        assert_eq!(bundle.rooms, vec!["Trading 1"]);
        assert_eq!(bundle.via, vec!["Star"]);
        assert!(bundle.boost_related);
    }

    #[test]
    fn mismatched_shapes_give_no_bundles() {
        let planner = Planner::new(
            &RuleTable::default(),
            Roster::default(),
            single_room_scenario(),
            &Config::default(),
        )
        .expect("planner");
        let current = planner.run(Gating::Current);
        let mut potential = planner.run(Gating::Ignored);
        potential.results.pop();
        let bundles = build_upgrade_bundles(
            &current,
            &potential,
            planner.roster(),
            &UpgradeConfig::default(),
            &BoostConfig::default(),
        );
        assert!(bundles.is_empty());
    }
}
