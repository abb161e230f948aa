use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::optimizer::{BundleScope, Comparison, UpgradeBundle, WhatIfResult};
use crate::rules::{RuleFamily, SynergyRule};
use crate::scheduler::PlanRun;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

pub fn render_plan_table(run: &PlanRun) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Shift",
        "Room",
        "Product",
        "Workers",
        "Efficiency",
        "Rules",
    ]);

    for (shift, result) in run.results_by_shift() {
        let workers = if result.is_autofill() {
            Cell::new("auto-fill").fg(Color::DarkGrey)
        } else {
            Cell::new(result.workers.join(", "))
        };
        table.add_row(Row::from(vec![
            Cell::new(shift + 1),
            Cell::new(&result.workplace.name),
            Cell::new(result.workplace.product.as_deref().unwrap_or("-")),
            workers,
            Cell::new(format!("{:.1}", result.total_efficiency)),
            Cell::new(or_dash(&result.applied)),
        ]));
    }
    for (shift, plan) in run.plans.iter().enumerate() {
        let seated: Vec<String> = plan
            .rooms
            .control
            .iter()
            .flat_map(|room| room.operators.iter().cloned())
            .collect();
        table.add_row(vec![
            (shift + 1).to_string(),
            "Control Center".to_string(),
            "-".to_string(),
            or_dash(&seated),
            "-".to_string(),
            or_dash(&plan.control_rules),
        ]);
    }

    let mut out = format!("{} ({})\n", run.title, run.layout_code);
    out.push_str(&table.to_string());
    out.push_str(&format!("\nTotal efficiency: {:.2}", run.total_efficiency()));
    if !run.boost_targets.is_empty() {
        out.push_str(&format!("\nBoost targets: {}", run.boost_targets.join(", ")));
    }
    out
}

pub fn render_bundles_table(bundles: &[UpgradeBundle]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Rank", "Upgrade", "Scope", "Gain", "Rooms", "Boost"]);

    for (idx, bundle) in bundles.iter().enumerate() {
        let scope = match bundle.scope {
            BundleScope::Room => Cell::new("room"),
            BundleScope::System => Cell::new("system").fg(Color::Cyan),
        };
        let rooms = if bundle.via.is_empty() {
            or_dash(&bundle.rooms)
        } else {
            format!("{} (via {})", or_dash(&bundle.rooms), bundle.via.join(", "))
        };
        table.add_row(Row::from(vec![
            Cell::new(idx + 1),
            Cell::new(bundle.summary()),
            scope,
            Cell::new(format!("+{:.1}", bundle.gain)).fg(Color::Green),
            Cell::new(rooms),
            Cell::new(if bundle.boost_related { "yes" } else { "" }),
        ]));
    }
    table.to_string()
}

pub fn render_comparison_table(comparison: &Comparison) -> String {
    let mut table = new_table();
    table.set_header(vec!["Run", "Layout", "Boost Targets", "Total Efficiency"]);
    for run in [&comparison.current, &comparison.potential] {
        table.add_row(vec![
            run.title.clone(),
            run.layout_code.clone(),
            or_dash(&run.boost_targets),
            format!("{:.2}", run.total_efficiency()),
        ]);
    }

    let gap = comparison.potential.total_efficiency() - comparison.current.total_efficiency();
    let mut out = table.to_string();
    out.push_str(&format!("\nGap to potential: {gap:+.2}\n"));
    if comparison.bundles.is_empty() {
        out.push_str("No upgrades would raise efficiency.");
    } else {
        out.push_str(&render_bundles_table(&comparison.bundles));
    }
    out
}

pub fn render_whatif_table(result: &WhatIfResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Worker", "From", "To"]);
    for change in &result.changes_applied {
        table.add_row(vec![
            change.worker.clone(),
            change
                .current
                .map(|t| t.to_string())
                .unwrap_or_else(|| "not owned".to_string()),
            change.target.to_string(),
        ]);
    }

    let mut footer = String::new();
    footer.push_str(&table.to_string());
    footer.push_str(&format!(
        "\nEfficiency: {:.2} -> {:.2} ({:+.2})\nRooms improved: {:?}\nRooms reduced: {:?}",
        result.before_total,
        result.after_total,
        result.net_gain,
        result.rooms_improved,
        result.rooms_reduced
    ));
    footer
}

pub fn render_rules_table(rules: &[&SynergyRule]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Workplace",
        "Rule",
        "Tiers",
        "Synergy",
        "Priority",
        "Family",
        "Products",
    ]);
    for rule in rules {
        let tiers = rule
            .min_tiers
            .iter()
            .map(|(worker, tier)| format!("{worker}/{tier}"))
            .collect::<Vec<_>>();
        let family = match rule.family {
            RuleFamily::Automation => Cell::new("automation").fg(Color::Yellow),
            RuleFamily::Generic => Cell::new("generic"),
            RuleFamily::Neutral => Cell::new("neutral").fg(Color::DarkGrey),
        };
        table.add_row(Row::from(vec![
            Cell::new(rule.kind),
            Cell::new(&rule.description),
            Cell::new(or_dash(&tiers)),
            Cell::new(format!("{:.1}", rule.synergy)),
            Cell::new(rule.priority),
            family,
            Cell::new(or_dash(&rule.products)),
        ]));
    }
    table.to_string()
}
