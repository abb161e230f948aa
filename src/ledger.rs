use std::collections::{BTreeMap, BTreeSet};

use crate::config::SolverConfig;
use crate::types::WorkplaceKind;

const BOOSTED_KIND: WorkplaceKind = WorkplaceKind::Trading;

#[derive(Debug, Clone)]
pub struct ResourceLedger {
    usage: BTreeMap<String, u32>,
    shift_used: BTreeSet<String>,
    production_placed: BTreeSet<String>,
    boost_targets: BTreeSet<String>,
    fatigue_ceiling: u32,
    boosted_ceiling: u32,
}

impl ResourceLedger {
    pub fn new(config: &SolverConfig, boost_targets: &[String]) -> Self {
        Self {
            usage: BTreeMap::new(),
            shift_used: BTreeSet::new(),
            production_placed: BTreeSet::new(),
            boost_targets: boost_targets.iter().cloned().collect(),
            fatigue_ceiling: config.fatigue_ceiling,
            boosted_ceiling: config.boosted_ceiling,
        }
    }

    pub fn start_shift(&mut self) {
        self.shift_used.clear();
        self.production_placed.clear();
    }

    pub fn usage(&self, worker: &str) -> u32 {
        self.usage.get(worker).copied().unwrap_or(0)
    }

    /// `kind` is the workplace the worker would sit in; `None` for
    /// auxiliary facilities, which never get the boosted ceiling.
    pub fn ceiling_for(&self, worker: &str, kind: Option<WorkplaceKind>) -> u32 {
        if kind == Some(BOOSTED_KIND) && self.boost_targets.contains(worker) {
            self.boosted_ceiling
        } else {
            self.fatigue_ceiling
        }
    }

    pub fn is_exhausted(&self, worker: &str, kind: Option<WorkplaceKind>) -> bool {
        self.usage(worker) >= self.ceiling_for(worker, kind)
    }

    pub fn is_shift_used(&self, worker: &str) -> bool {
        self.shift_used.contains(worker)
    }

    pub fn placed_in_production(&self, worker: &str) -> bool {
        self.production_placed.contains(worker)
    }

    pub fn commit(&mut self, worker: &str, kind: Option<WorkplaceKind>) {
        *self.usage.entry(worker.to_string()).or_insert(0) += 1;
        self.shift_used.insert(worker.to_string());
        if kind.is_some_and(|k| k.is_production()) {
            self.production_placed.insert(worker.to_string());
        }
    }

    pub fn is_boost_target(&self, worker: &str) -> bool {
        self.boost_targets.contains(worker)
    }

    pub fn boost_targets(&self) -> impl Iterator<Item = &String> {
        self.boost_targets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(targets: &[&str]) -> ResourceLedger {
        let targets: Vec<String> = targets.iter().map(|t| t.to_string()).collect();
        ResourceLedger::new(&SolverConfig::default(), &targets)
    }

    #[test]
    fn boosted_ceiling_only_in_trading() {
        let ledger = ledger(&["Boosted"]);
        assert_eq!(ledger.ceiling_for("Boosted", Some(WorkplaceKind::Trading)), 3);
        assert_eq!(ledger.ceiling_for("Boosted", Some(WorkplaceKind::Manufacturing)), 2);
        assert_eq!(ledger.ceiling_for("Boosted", None), 2);
        assert_eq!(ledger.ceiling_for("Plain", Some(WorkplaceKind::Trading)), 2);
        assert!(ledger.is_boost_target("Boosted"));
    }

    #[test]
    fn fatigue_persists_across_shifts() {
        let mut ledger = ledger(&[]);
        ledger.commit("A", Some(WorkplaceKind::Manufacturing));
        assert!(ledger.is_shift_used("A"));
        assert!(ledger.placed_in_production("A"));
        ledger.start_shift();
        assert!(!ledger.is_shift_used("A"));
        assert!(!ledger.placed_in_production("A"));
        ledger.commit("A", None);
        assert!(!ledger.placed_in_production("A"));
        assert_eq!(ledger.usage("A"), 2);
        assert!(ledger.is_exhausted("A", None));
    }
}
