use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Tier;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleTable {
    #[serde(default)]
    pub workplaces: WorkplaceLayout,
    #[serde(default)]
    pub combination_rules: BTreeMap<String, BTreeMap<String, RawSystem>>,
    #[serde(default)]
    pub control_center_rules: Vec<RawFacilityRule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkplaceLayout {
    #[serde(default)]
    pub trading_stations: Vec<RawRoom>,
    #[serde(default)]
    pub manufacturing_stations: Vec<RawRoom>,
    #[serde(default)]
    pub meeting_room: Option<RawRoom>,
    #[serde(default)]
    pub power_station: Vec<RawRoom>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRoom {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "capacity")]
    pub max_operators: usize,
    #[serde(default)]
    pub base_efficiency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSystem {
    List(Vec<RawCombo>),
    Compound(RawCompound),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCompound {
    #[serde(default)]
    pub base_combo: Vec<String>,
    #[serde(default)]
    pub product: Option<ProductList>,
    #[serde(default)]
    pub rules: Vec<RawCombo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCombo {
    #[serde(default)]
    pub combo: Vec<String>,
    #[serde(default)]
    pub efficiency: Option<f64>,
    #[serde(default)]
    pub control_center: Vec<String>,
    #[serde(default)]
    pub dormitory: Vec<String>,
    #[serde(default)]
    pub power_station: Vec<String>,
    #[serde(default)]
    pub hire: Vec<String>,
    #[serde(default)]
    pub process: Vec<String>,
    #[serde(default)]
    pub apply_each: bool,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub product: Option<ProductList>,
    #[serde(default)]
    pub max_tier: BTreeMap<String, Tier>,
    #[serde(default)]
    pub reserve: Vec<String>,
    #[serde(default)]
    pub after: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ProductList {
    One(String),
    Many(Vec<String>),
}

impl ProductList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(p) => vec![p],
            Self::Many(ps) => ps,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFacilityRule {
    #[serde(default, alias = "operator")]
    pub operators: Option<WorkerList>,
    #[serde(default)]
    pub apply_each: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub efficiency: f64,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WorkerList {
    One(String),
    Many(Vec<String>),
}

impl WorkerList {
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            Self::One(t) => vec![t.as_str()],
            Self::Many(ts) => ts.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_station_count", alias = "trading_stations_count")]
    pub trading_stations: usize,
    #[serde(
        default = "default_station_count",
        alias = "manufacturing_stations_count"
    )]
    pub manufacturing_stations: usize,
    #[serde(default)]
    pub products: ProductPlan,
    #[serde(default)]
    pub support_boost: SupportBoostSetting,
    #[serde(default)]
    pub drones: DroneSetting,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductQuota {
    pub product: String,
    pub count: usize,
}

impl ProductQuota {
    pub fn new(product: impl Into<String>, count: usize) -> Self {
        Self {
            product: product.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductPlan {
    #[serde(default)]
    pub trading: Vec<ProductQuota>,
    #[serde(default)]
    pub manufacturing: Vec<ProductQuota>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SupportBoostSetting {
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DroneSetting {
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default = "default_drone_order")]
    pub order: String,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            trading_stations: default_station_count(),
            manufacturing_stations: default_station_count(),
            products: ProductPlan::default(),
            support_boost: SupportBoostSetting::default(),
            drones: DroneSetting::default(),
        }
    }
}

impl Default for ProductPlan {
    fn default() -> Self {
        Self {
            trading: vec![ProductQuota::new("LMD", 3)],
            manufacturing: vec![ProductQuota::new("Pure Gold", 3)],
        }
    }
}

impl Default for DroneSetting {
    fn default() -> Self {
        Self {
            enable: false,
            targets: Vec::new(),
            order: default_drone_order(),
        }
    }
}

fn default_station_count() -> usize {
    3
}

fn default_drone_order() -> String {
    "pre".to_string()
}
