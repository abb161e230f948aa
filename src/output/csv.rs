use anyhow::Result;

use crate::optimizer::{BundleScope, UpgradeBundle};
use crate::scheduler::PlanRun;

pub fn plan_to_csv(run: &PlanRun) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "shift",
        "room_id",
        "product",
        "workers",
        "total_efficiency",
        "synergy_efficiency",
    ])?;
    for (shift, result) in run.results_by_shift() {
        writer.write_record([
            (shift + 1).to_string(),
            result.workplace.id.clone(),
            result.workplace.product.clone().unwrap_or_default(),
            result.workers.join(";"),
            format!("{:.2}", result.total_efficiency),
            format!("{:.2}", result.synergy_efficiency),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn bundles_to_csv(bundles: &[UpgradeBundle]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["rank", "upgrade", "scope", "gain", "rooms", "boost_related"])?;
    for (idx, bundle) in bundles.iter().enumerate() {
        let scope = match bundle.scope {
            BundleScope::Room => "room",
            BundleScope::System => "system",
        };
        writer.write_record([
            (idx + 1).to_string(),
            bundle.summary(),
            scope.to_string(),
            format!("{:.2}", bundle.gain),
            bundle.rooms.join(";"),
            bundle.boost_related.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::TierChange;

    #[test]
    fn bundle_rows_follow_rank_order() {
        let bundles = vec![UpgradeBundle {
            scope: BundleScope::System,
            changes: vec![TierChange {
                worker: "Booster".into(),
                id: "b1".into(),
                current: None,
                target: 2,
            }],
            gain: 42.5,
            rooms: vec!["Trading 1".into(), "Trading 2".into()],
            via: vec!["Star".into()],
            boost_related: true,
            source: None,
        }];
        let out = bundles_to_csv(&bundles).expect("csv");
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("rank,upgrade,scope,gain,rooms,boost_related"));
        assert_eq!(
            lines.next(),
            Some("1,Booster (not owned)->2,system,42.50,Trading 1;Trading 2,true")
        );
    }
}
