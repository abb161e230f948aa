use std::collections::BTreeMap;

use crate::error::Result;
use crate::rules::compiler::parse_token;
use crate::rules::schema::RawFacilityRule;
use crate::rules::SharedFacilityRule;

pub fn compile_facility_rules(raw: &[RawFacilityRule]) -> Result<Vec<SharedFacilityRule>> {
    let mut rules = Vec::new();

    for entry in raw {
        let tokens = entry
            .operators
            .as_ref()
            .map(|ops| ops.tokens())
            .unwrap_or_default();

        if entry.apply_each {
            for token in tokens {
                let (name, tier) = parse_token(token)?;
                let mut min_tiers = BTreeMap::new();
                if tier > 0 {
                    min_tiers.insert(name.clone(), tier);
                }
                rules.push(SharedFacilityRule {
                    workers: vec![name],
                    description: entry.description.clone(),
                    bonus: entry.efficiency,
                    priority: entry.priority,
                    group: entry.group.clone(),
                    min_tiers,
                });
            }
        } else {
            let mut workers = Vec::with_capacity(tokens.len());
            let mut min_tiers = BTreeMap::new();
            for token in tokens {
                let (name, tier) = parse_token(token)?;
                if tier > 0 {
                    min_tiers.insert(name.clone(), tier);
                }
                workers.push(name);
            }
            rules.push(SharedFacilityRule {
                workers,
                description: entry.description.clone(),
                bonus: entry.efficiency,
                priority: entry.priority,
                group: entry.group.clone(),
                min_tiers,
            });
        }
    }

    rules.sort_by(|a, b| b.priority.cmp(&a.priority).then(b.bonus.total_cmp(&a.bonus)));
    Ok(rules)
}
