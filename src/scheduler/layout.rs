use crate::rules::schema::{ProductQuota, RawRoom, RuleTable, Scenario};
use crate::types::{Workplace, WorkplaceKind};

const DEFAULT_CAPACITY: usize = 3;
const DEFAULT_BASE_EFFICIENCY: f64 = 100.0;

#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub manufacturing: Vec<Workplace>,
    pub trading: Vec<Workplace>,
    pub meeting: Option<Workplace>,
    pub power: Vec<Workplace>,
}

impl Layout {
    pub fn build(table: &RuleTable, scenario: &Scenario) -> Self {
        let rooms = &table.workplaces;
        let mut manufacturing = stamp(
            WorkplaceKind::Manufacturing,
            rooms.manufacturing_stations.first(),
            scenario.manufacturing_stations,
        );
        let mut trading = stamp(
            WorkplaceKind::Trading,
            rooms.trading_stations.first(),
            scenario.trading_stations,
        );
        assign_products(&mut manufacturing, &scenario.products.manufacturing);
        assign_products(&mut trading, &scenario.products.trading);

        let meeting = rooms.meeting_room.as_ref().map(|raw| Workplace {
            id: raw.id.clone().unwrap_or_else(|| "meeting_room".to_string()),
            name: raw.name.clone().unwrap_or_else(|| "Meeting Room".to_string()),
            kind: WorkplaceKind::Meeting,
            capacity: raw.max_operators,
            base_efficiency: raw.base_efficiency,
            product: None,
        });

        let power = rooms
            .power_station
            .iter()
            .enumerate()
            .map(|(i, raw)| Workplace {
                id: raw.id.clone().unwrap_or_else(|| format!("power_{}", i + 1)),
                name: raw.name.clone().unwrap_or_else(|| format!("Power {}", i + 1)),
                kind: WorkplaceKind::Power,
                capacity: raw.max_operators,
                base_efficiency: raw.base_efficiency,
                product: None,
            })
            .collect();

        Self {
            manufacturing,
            trading,
            meeting,
            power,
        }
    }

    pub fn code(&self) -> String {
        format!(
            "{}{}{}",
            self.trading.len(),
            self.manufacturing.len(),
            self.power.len()
        )
    }
}

fn stamp(kind: WorkplaceKind, template: Option<&RawRoom>, count: usize) -> Vec<Workplace> {
    let (capacity, base_efficiency) = template.map_or(
        (DEFAULT_CAPACITY, DEFAULT_BASE_EFFICIENCY),
        |raw| (raw.max_operators, raw.base_efficiency),
    );
    let prefix = match kind {
        WorkplaceKind::Trading => "trading",
        _ => "manufacturing",
    };
    (1..=count)
        .map(|i| Workplace {
            id: format!("{prefix}_{i}"),
            name: format!("{kind} {i}"),
            kind,
            capacity,
            base_efficiency,
            product: None,
        })
        .collect()
}

fn assign_products(stations: &mut [Workplace], quotas: &[ProductQuota]) {
    let mut products = quotas
        .iter()
        .flat_map(|q| std::iter::repeat(q.product.as_str()).take(q.count));
    for station in stations {
        station.product = products.next().map(str::to_string);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn stamps_stations_and_spreads_quotas() {
        let table: RuleTable = serde_json::from_value(json!({
            "workplaces": {
                "trading_stations": [{"max_operators": 3, "base_efficiency": 100}],
                "meeting_room": {"id": "meeting", "name": "Reception", "max_operators": 2, "base_efficiency": 0},
                "power_station": [
                    {"max_operators": 1, "base_efficiency": 0},
                    {"id": "power_b", "max_operators": 1, "base_efficiency": 0}
                ]
            }
        }))
        .expect("table");
        let scenario: Scenario = serde_json::from_value(json!({
            "trading_stations": 2,
            "manufacturing_stations": 4,
            "products": {
                "trading": [{"product": "LMD", "count": 2}],
                "manufacturing": [
                    {"product": "Pure Gold", "count": 2},
                    {"product": "Battle Record", "count": 1}
                ]
            }
        }))
        .expect("scenario");

        let layout = Layout::build(&table, &scenario);
        assert_eq!(layout.code(), "242");
        assert_eq!(layout.trading[1].id, "trading_2");
        assert_eq!(layout.trading[1].name, "Trading 2");
        assert_eq!(layout.manufacturing[0].capacity, DEFAULT_CAPACITY);
        let products: Vec<_> = layout
            .manufacturing
            .iter()
            .map(|w| w.product.as_deref())
            .collect();
        assert_eq!(
            products,
            vec![Some("Pure Gold"), Some("Pure Gold"), Some("Battle Record"), None]
        );
        assert_eq!(layout.meeting.as_ref().map(|m| m.name.as_str()), Some("Reception"));
        assert_eq!(layout.power[0].id, "power_1");
        assert_eq!(layout.power[1].id, "power_b");
    }

    #[test]
    fn zero_trading_stations_is_allowed() {
        let scenario = Scenario {
            trading_stations: 0,
            ..Scenario::default()
        };
        let layout = Layout::build(&RuleTable::default(), &scenario);
        assert!(layout.trading.is_empty());
        assert!(layout.meeting.is_none());
        assert_eq!(layout.code(), "030");
    }
}
