use std::sync::Arc;

use crate::rules::{CompiledRules, RuleShape, SynergyRule};
use crate::solver::TraceKind;
use crate::types::Workplace;

#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub rule: &'a Arc<SynergyRule>,
    pub workers: Vec<&'a str>,
    pub kind: TraceKind,
}

impl Candidate<'_> {
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn contains(&self, worker: &str) -> bool {
        self.workers.iter().any(|w| *w == worker)
    }
}

pub fn candidates_for<'a>(rules: &'a CompiledRules, workplace: &'a Workplace) -> Vec<Candidate<'a>> {
    let (system, generic): (Vec<_>, Vec<_>) = rules
        .for_workplace(workplace)
        .partition(|rule| rule.system.is_some());

    system
        .into_iter()
        .chain(generic)
        .flat_map(expand)
        .collect()
}

fn expand(rule: &Arc<SynergyRule>) -> Vec<Candidate<'_>> {
    match rule.shape {
        RuleShape::Combination if rule.workers.is_empty() => Vec::new(),
        RuleShape::Combination => vec![Candidate {
            rule,
            workers: rule.workers.iter().map(String::as_str).collect(),
            kind: if rule.system.is_some() {
                TraceKind::System
            } else {
                TraceKind::Generic
            },
        }],
        RuleShape::Individual => rule
            .workers
            .iter()
            .map(|worker| Candidate {
                rule,
                workers: vec![worker.as_str()],
                kind: TraceKind::Individual,
            })
            .collect(),
    }
}
