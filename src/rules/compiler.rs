use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{CompileMode, CompilerConfig, DependencyConfig};
use crate::error::{PlannerError, Result};
use crate::rules::facility::compile_facility_rules;
use crate::rules::schema::{RawCombo, RawSystem, RuleTable, Scenario};
use crate::rules::{CompiledRules, RuleFamily, RuleShape, SynergyRule};
use crate::types::{FacilityRequirements, RoomRequirement, Tier, WorkplaceKind, MAX_TIER};

/// Splits `"name"` or `"name/tier"`; the tier defaults to 0.
pub fn parse_token(token: &str) -> Result<(String, Tier)> {
    match token.split_once('/') {
        Some((name, tier)) => {
            let tier: Tier = tier
                .trim()
                .parse()
                .map_err(|_| PlannerError::InvalidToken(token.to_string()))?;
            if tier > MAX_TIER {
                return Err(PlannerError::InvalidToken(token.to_string()));
            }
            Ok((name.trim().to_string(), tier))
        }
        None => Ok((token.trim().to_string(), 0)),
    }
}

fn parse_requirements(tokens: &[String]) -> Result<Vec<RoomRequirement>> {
    tokens
        .iter()
        .map(|t| {
            parse_token(t).map(|(worker, min_tier)| RoomRequirement { worker, min_tier })
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
struct BaseCombo {
    workers: Vec<String>,
    min_tiers: BTreeMap<String, Tier>,
    products: Vec<String>,
}

impl BaseCombo {
    fn parse(tokens: &[String], products: Vec<String>) -> Result<Self> {
        let mut base = Self {
            products,
            ..Self::default()
        };
        for token in tokens {
            let (name, tier) = parse_token(token)?;
            if tier > 0 {
                base.min_tiers.insert(name.clone(), tier);
            }
            base.workers.push(name);
        }
        Ok(base)
    }
}

struct EntryContext<'a> {
    kind: WorkplaceKind,
    kind_key: &'a str,
    system: &'a str,
    index: usize,
    compound: bool,
}

pub fn compile_rules(
    table: &RuleTable,
    scenario: &Scenario,
    config: &CompilerConfig,
) -> Result<CompiledRules> {
    let mut synergy = Vec::new();

    for (kind_key, systems) in &table.combination_rules {
        let kind = match WorkplaceKind::from_str(kind_key) {
            Ok(kind) => kind,
            Err(err) => match config.mode {
                CompileMode::Strict => {
                    return Err(PlannerError::UnknownWorkplaceType(kind_key.clone()))
                }
                CompileMode::Lenient => {
                    warn!("dropping rules for {kind_key}: {err}");
                    continue;
                }
            },
        };

        for (system, raw) in systems {
            match raw {
                RawSystem::List(entries) => {
                    for (index, entry) in entries.iter().enumerate() {
                        let ctx = EntryContext {
                            kind,
                            kind_key,
                            system,
                            index,
                            compound: false,
                        };
                        synergy.push(build_rule(&ctx, entry, None, config)?);
                    }
                }
                RawSystem::Compound(compound) => {
                    let products = compound
                        .product
                        .clone()
                        .map(|p| p.into_vec())
                        .unwrap_or_default();
                    let base = BaseCombo::parse(&compound.base_combo, products)?;
                    for (index, entry) in compound.rules.iter().enumerate() {
                        let ctx = EntryContext {
                            kind,
                            kind_key,
                            system,
                            index,
                            compound: true,
                        };
                        synergy.push(build_rule(&ctx, entry, Some(&base), config)?);
                    }
                }
            }
        }
    }

    scale_neutral_rule(&mut synergy, scenario, config);
    for dependency in &config.dependencies {
        attach_dependency(&mut synergy, dependency, config.mode)?;
    }

    synergy.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(b.synergy.total_cmp(&a.synergy))
    });
    debug!("compiled {} synergy rules", synergy.len());

    Ok(CompiledRules {
        synergy: synergy.into_iter().map(Arc::new).collect(),
        facility: compile_facility_rules(&table.control_center_rules)?,
    })
}

fn build_rule(
    ctx: &EntryContext<'_>,
    entry: &RawCombo,
    base: Option<&BaseCombo>,
    config: &CompilerConfig,
) -> Result<SynergyRule> {
    let synergy = entry.efficiency.ok_or_else(|| PlannerError::MalformedRule {
        workplace: ctx.kind_key.to_string(),
        system: ctx.system.to_string(),
        entry: ctx.index,
        reason: "missing efficiency".to_string(),
    })?;

    let mut workers = base.map(|b| b.workers.clone()).unwrap_or_default();
    let mut min_tiers = base.map(|b| b.min_tiers.clone()).unwrap_or_default();
    for token in &entry.combo {
        let (name, tier) = parse_token(token)?;
        if tier > 0 {
            min_tiers.insert(name.clone(), tier);
        }
        workers.push(name);
    }

    let products = match (&entry.product, base) {
        (Some(p), _) => p.clone().into_vec(),
        (None, Some(b)) => b.products.clone(),
        (None, None) => Vec::new(),
    };

    let description = if entry.apply_each && !ctx.compound {
        ctx.system.to_string()
    } else {
        format!("{} - {}", ctx.system, workers.join(", "))
    };

    let family = if ctx.system.contains(config.automation_marker.as_str()) {
        RuleFamily::Automation
    } else if config
        .neutral_worker
        .as_ref()
        .is_some_and(|n| workers.contains(n))
    {
        RuleFamily::Neutral
    } else {
        RuleFamily::Generic
    };

    let system = if ctx.system == config.generic_system {
        None
    } else {
        Some(ctx.system.to_string())
    };

    Ok(SynergyRule {
        workers,
        kind: ctx.kind,
        synergy,
        description,
        min_tiers,
        max_tiers: entry.max_tier.clone(),
        facilities: FacilityRequirements {
            control_center: parse_requirements(&entry.control_center)?,
            dormitory: parse_requirements(&entry.dormitory)?,
            power_station: parse_requirements(&entry.power_station)?,
            hire: parse_requirements(&entry.hire)?,
            processing: parse_requirements(&entry.process)?,
        },
        shape: if entry.apply_each {
            RuleShape::Individual
        } else {
            RuleShape::Combination
        },
        priority: entry.priority,
        products,
        system,
        family,
        reserve: parse_requirements(&entry.reserve)?,
        after: entry.after.clone(),
    })
}

fn scale_neutral_rule(rules: &mut [SynergyRule], scenario: &Scenario, config: &CompilerConfig) {
    let Some(neutral) = config.neutral_worker.as_deref() else {
        return;
    };
    if let Some(rule) = rules
        .iter_mut()
        .find(|r| r.kind == WorkplaceKind::Manufacturing && r.workers == [neutral])
    {
        rule.synergy = scenario.trading_stations as f64 * config.neutral_per_trading_station;
        debug!("scaled {} to {}", rule.description, rule.synergy);
    }
}

fn attach_dependency(
    rules: &mut [SynergyRule],
    dependency: &DependencyConfig,
    mode: CompileMode,
) -> Result<()> {
    let kind = match WorkplaceKind::from_str(&dependency.workplace) {
        Ok(kind) => kind,
        Err(err) => match mode {
            CompileMode::Strict => {
                return Err(PlannerError::UnknownWorkplaceType(
                    dependency.workplace.clone(),
                ))
            }
            CompileMode::Lenient => {
                warn!("ignoring dependency: {err}");
                return Ok(());
            }
        },
    };
    let reserve = parse_requirements(&dependency.reserve)?;

    for rule in rules.iter_mut().filter(|r| r.kind == kind) {
        let triggered = rule.workers.iter().any(|w| dependency.trigger.contains(w));
        let above = dependency.min_synergy.map_or(true, |min| rule.synergy > min);
        if triggered && above {
            rule.reserve.extend(reserve.iter().cloned());
            rule.after.extend(dependency.after.iter().cloned());
        }
    }
    Ok(())
}
