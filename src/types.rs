use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Tier = u8;

pub const MAX_TIER: Tier = 2;

pub const SHIFT_COUNT: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Worker {
    pub id: String,
    pub name: String,
    #[serde(alias = "elite")]
    pub tier: Tier,
    #[serde(default)]
    pub level: u32,
    #[serde(alias = "own")]
    pub owned: bool,
    #[serde(default)]
    pub potential: u8,
    #[serde(default)]
    pub rarity: u8,
}

impl Worker {
    pub fn new(name: impl Into<String>, tier: Tier) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            tier,
            level: 1,
            owned: true,
            potential: 0,
            rarity: 0,
        }
    }

    pub fn unowned(mut self) -> Self {
        self.owned = false;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    order: Vec<String>,
    by_name: BTreeMap<String, Worker>,
}

impl Roster {
    pub fn from_workers(workers: Vec<Worker>) -> Self {
        let mut roster = Self::default();
        for worker in workers {
            if !roster.by_name.contains_key(&worker.name) {
                roster.order.push(worker.name.clone());
            }
            roster.by_name.insert(worker.name.clone(), worker);
        }
        roster
    }

    pub fn get(&self, name: &str) -> Option<&Worker> {
        self.by_name.get(name)
    }

    pub fn owned(&self, name: &str) -> Option<&Worker> {
        self.by_name.get(name).filter(|w| w.owned)
    }

    pub fn owned_workers(&self) -> impl Iterator<Item = &Worker> {
        self.workers().filter(|w| w.owned)
    }

    pub fn workers(&self) -> impl Iterator<Item = &Worker> {
        self.order.iter().filter_map(|name| self.by_name.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn raise_tier(&mut self, id: &str, name: &str, target: Tier) -> Option<Tier> {
        let key = self
            .by_name
            .values()
            .find(|w| !id.is_empty() && w.id == id)
            .or_else(|| self.by_name.get(name))
            .map(|w| w.name.clone())?;
        let worker = self.by_name.get_mut(&key)?;
        let previous = worker.tier;
        worker.tier = target;
        worker.level = 1;
        Some(previous)
    }

    pub fn to_vec(&self) -> Vec<Worker> {
        self.workers().cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WorkplaceKind {
    Manufacturing,
    Trading,
    Meeting,
    Power,
}

impl WorkplaceKind {
    pub const ALL: [WorkplaceKind; 4] = [
        WorkplaceKind::Manufacturing,
        WorkplaceKind::Trading,
        WorkplaceKind::Meeting,
        WorkplaceKind::Power,
    ];

    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Manufacturing => "manufacturing_station",
            Self::Trading => "trading_station",
            Self::Meeting => "meeting_room",
            Self::Power => "power_station",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Manufacturing | Self::Trading)
    }
}

impl Display for WorkplaceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Manufacturing => "Manufacturing",
            Self::Trading => "Trading",
            Self::Meeting => "Meeting",
            Self::Power => "Power",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown workplace kind: {0}")]
pub struct WorkplaceKindParseError(pub String);

impl FromStr for WorkplaceKind {
    type Err = WorkplaceKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "manufacturing_station" | "manufacturing" | "manufacture" | "factory" => {
                Ok(Self::Manufacturing)
            }
            "trading_station" | "trading" | "trade" => Ok(Self::Trading),
            "meeting_room" | "meeting" | "reception" => Ok(Self::Meeting),
            "power_station" | "power" => Ok(Self::Power),
            _ => Err(WorkplaceKindParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    ControlCenter,
    Dormitory,
    PowerStation,
    Hire,
    Processing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomRequirement {
    pub worker: String,
    pub min_tier: Tier,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacilityRequirements {
    pub control_center: Vec<RoomRequirement>,
    pub dormitory: Vec<RoomRequirement>,
    pub power_station: Vec<RoomRequirement>,
    pub hire: Vec<RoomRequirement>,
    pub processing: Vec<RoomRequirement>,
}

impl FacilityRequirements {
    pub fn list(&self, kind: FacilityKind) -> &[RoomRequirement] {
        match kind {
            FacilityKind::ControlCenter => &self.control_center,
            FacilityKind::Dormitory => &self.dormitory,
            FacilityKind::PowerStation => &self.power_station,
            FacilityKind::Hire => &self.hire,
            FacilityKind::Processing => &self.processing,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FacilityKind, &RoomRequirement)> {
        [
            FacilityKind::ControlCenter,
            FacilityKind::Dormitory,
            FacilityKind::PowerStation,
            FacilityKind::Hire,
            FacilityKind::Processing,
        ]
        .into_iter()
        .flat_map(move |kind| self.list(kind).iter().map(move |req| (kind, req)))
    }

    pub fn extend(&mut self, other: &FacilityRequirements) {
        self.control_center.extend(other.control_center.iter().cloned());
        self.dormitory.extend(other.dormitory.iter().cloned());
        self.power_station.extend(other.power_station.iter().cloned());
        self.hire.extend(other.hire.iter().cloned());
        self.processing.extend(other.processing.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workplace {
    pub id: String,
    pub name: String,
    pub kind: WorkplaceKind,
    pub capacity: usize,
    pub base_efficiency: f64,
    pub product: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gating {
    Current,
    Ignored,
}

impl Gating {
    pub fn enforced(self) -> bool {
        matches!(self, Self::Current)
    }
}
