use crate::rules::schema::DroneSetting;
use crate::scheduler::plan::{DronePlan, RoomPlan, RoomPlans};
use crate::types::SHIFT_COUNT;

pub fn assign_drones(setting: &DroneSetting, rooms: &RoomPlans, shift: usize) -> DronePlan {
    if !setting.enable || setting.targets.is_empty() {
        return DronePlan::disabled(&setting.order);
    }
    let target = if setting.targets.len() == SHIFT_COUNT {
        &setting.targets[shift % SHIFT_COUNT]
    } else {
        &setting.targets[0]
    };

    let found = find_product(&rooms.trading, target)
        .map(|index| ("trading", index))
        .or_else(|| find_product(&rooms.manufacture, target).map(|index| ("manufacture", index)));

    match found {
        Some((room, index)) => DronePlan {
            enable: true,
            room: room.to_string(),
            index,
            order: setting.order.clone(),
        },
        None => DronePlan::disabled(&setting.order),
    }
}

fn find_product(rooms: &[RoomPlan], product: &str) -> Option<usize> {
    rooms
        .iter()
        .position(|room| room.product.as_deref() == Some(product))
        .map(|i| i + 1)
}
