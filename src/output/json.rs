use anyhow::Result;
use serde::Serialize;

use crate::scheduler::{PlanRun, ShiftPlan};

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[derive(Debug, Serialize)]
struct PlanExport<'a> {
    title: &'a str,
    description: &'a str,
    plans: &'a [ShiftPlan],
}

pub fn render_plan_export(run: &PlanRun) -> Result<String> {
    render_json(&PlanExport {
        title: &run.title,
        description: &run.description,
        plans: &run.plans,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::rules::{RuleTable, Scenario};
    use crate::scheduler::Planner;
    use crate::types::{Gating, Roster};

    #[test]
    fn export_keeps_only_client_fields() {
        let planner = Planner::new(
            &RuleTable::default(),
            Roster::default(),
            Scenario::default(),
            &Config::default(),
        )
        .expect("planner");
        let run = planner.run(Gating::Current);
        let value: serde_json::Value =
            serde_json::from_str(&render_plan_export(&run).expect("export")).expect("json");
        let object = value.as_object().expect("object");
        assert_eq!(object.len(), 3);
        assert_eq!(value["plans"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["plans"][0]["name"], "Shift 1");
        assert!(value.get("boost_targets").is_none());
    }
}
