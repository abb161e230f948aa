use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub inputs: InputsConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub boost: BoostConfig,
    #[serde(default)]
    pub upgrades: UpgradeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    #[serde(default = "default_rules_path")]
    pub rules_path: String,
    #[serde(default = "default_roster_path")]
    pub roster_path: String,
    #[serde(default = "default_scenario_path")]
    pub scenario_path: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompileMode {
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default)]
    pub mode: CompileMode,
    #[serde(default = "default_generic_system")]
    pub generic_system: String,
    #[serde(default = "default_automation_marker")]
    pub automation_marker: String,
    #[serde(default)]
    pub neutral_worker: Option<String>,
    #[serde(default = "default_neutral_per_trading_station")]
    pub neutral_per_trading_station: f64,
    #[serde(default)]
    pub dependencies: Vec<DependencyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DependencyConfig {
    pub workplace: String,
    pub trigger: Vec<String>,
    #[serde(default)]
    pub min_synergy: Option<f64>,
    #[serde(default)]
    pub reserve: Vec<String>,
    #[serde(default)]
    pub after: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_fatigue_ceiling")]
    pub fatigue_ceiling: u32,
    #[serde(default = "default_boosted_ceiling")]
    pub boosted_ceiling: u32,
    #[serde(default = "default_meeting_per_occupant")]
    pub meeting_per_occupant: f64,
    #[serde(default = "default_meeting_tier_bonus")]
    pub meeting_tier_bonus: [f64; 3],
    #[serde(default = "default_control_center_capacity")]
    pub control_center_capacity: usize,
    #[serde(default = "default_dormitory_count")]
    pub dormitory_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostConfig {
    #[serde(default)]
    pub booster: Option<String>,
    #[serde(default)]
    pub preferred: Vec<String>,
    #[serde(default = "default_max_targets")]
    pub max_targets: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeConfig {
    #[serde(default = "default_gain_threshold")]
    pub gain_threshold: f64,
    #[serde(default = "default_system_gain_threshold")]
    pub system_gain_threshold: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub rules_path: Option<String>,
    pub roster_path: Option<String>,
    pub scenario_path: Option<String>,
    pub strict: bool,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/shift-planner/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(rules_path) = overrides.rules_path {
            self.inputs.rules_path = rules_path;
        }
        if let Some(roster_path) = overrides.roster_path {
            self.inputs.roster_path = roster_path;
        }
        if let Some(scenario_path) = overrides.scenario_path {
            self.inputs.scenario_path = scenario_path;
        }
        if overrides.strict {
            self.compiler.mode = CompileMode::Strict;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_rules_path(&self) -> PathBuf {
        expand_tilde(&self.inputs.rules_path)
    }

    pub fn resolved_roster_path(&self) -> PathBuf {
        expand_tilde(&self.inputs.roster_path)
    }

    pub fn resolved_scenario_path(&self) -> PathBuf {
        expand_tilde(&self.inputs.scenario_path)
    }

    pub fn default_template() -> String {
        let template = r#"[inputs]
rules_path = "rules.json"
roster_path = "roster.json"
scenario_path = "scenario.json"

[compiler]
mode = "lenient"
generic_system = "generic"
automation_marker = "automation"
# neutral_worker = "Purestream"
neutral_per_trading_station = 20.0

# [[compiler.dependencies]]
# workplace = "manufacturing_station"
# trigger = ["Rosmontis"]
# min_synergy = 200.0
# reserve = ["Blacknight/2", "Nothing/2"]

[solver]
fatigue_ceiling = 2
boosted_ceiling = 3
meeting_per_occupant = 5.0
meeting_tier_bonus = [0.0, 8.0, 16.0]
control_center_capacity = 5
dormitory_count = 4

[boost]
# booster = "Fiammetta"
preferred = []
max_targets = 3

[upgrades]
gain_threshold = 0.001
system_gain_threshold = 0.01
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            rules_path: default_rules_path(),
            roster_path: default_roster_path(),
            scenario_path: default_scenario_path(),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            mode: CompileMode::default(),
            generic_system: default_generic_system(),
            automation_marker: default_automation_marker(),
            neutral_worker: None,
            neutral_per_trading_station: default_neutral_per_trading_station(),
            dependencies: Vec::new(),
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            fatigue_ceiling: default_fatigue_ceiling(),
            boosted_ceiling: default_boosted_ceiling(),
            meeting_per_occupant: default_meeting_per_occupant(),
            meeting_tier_bonus: default_meeting_tier_bonus(),
            control_center_capacity: default_control_center_capacity(),
            dormitory_count: default_dormitory_count(),
        }
    }
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            booster: None,
            preferred: Vec::new(),
            max_targets: default_max_targets(),
        }
    }
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            gain_threshold: default_gain_threshold(),
            system_gain_threshold: default_system_gain_threshold(),
        }
    }
}

fn default_rules_path() -> String {
    "rules.json".to_string()
}

fn default_roster_path() -> String {
    "roster.json".to_string()
}

fn default_scenario_path() -> String {
    "scenario.json".to_string()
}

fn default_generic_system() -> String {
    "generic".to_string()
}

fn default_automation_marker() -> String {
    "automation".to_string()
}

fn default_neutral_per_trading_station() -> f64 {
    20.0
}

fn default_fatigue_ceiling() -> u32 {
    2
}

fn default_boosted_ceiling() -> u32 {
    3
}

fn default_meeting_per_occupant() -> f64 {
    5.0
}

fn default_meeting_tier_bonus() -> [f64; 3] {
    [0.0, 8.0, 16.0]
}

fn default_control_center_capacity() -> usize {
    5
}

fn default_dormitory_count() -> usize {
    4
}

fn default_max_targets() -> usize {
    3
}

fn default_gain_threshold() -> f64 {
    0.001
}

fn default_system_gain_threshold() -> f64 {
    0.01
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_round_trips_to_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).expect("template parses");
        assert_eq!(parsed.solver.fatigue_ceiling, 2);
        assert_eq!(parsed.solver.boosted_ceiling, 3);
        assert_eq!(parsed.compiler.mode, CompileMode::Lenient);
        assert_eq!(parsed.compiler.generic_system, "generic");
        assert!(parsed.compiler.neutral_worker.is_none());
        assert!((parsed.upgrades.gain_threshold - 0.001).abs() < 1e-12);
    }

    #[test]
    fn partial_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str(
            r#"
[compiler]
mode = "strict"
neutral_worker = "Filler"

[[compiler.dependencies]]
workplace = "trading_station"
trigger = ["A", "B"]
after = ["C"]
"#,
        )
        .expect("config parses");
        assert_eq!(parsed.compiler.mode, CompileMode::Strict);
        assert_eq!(parsed.compiler.neutral_worker.as_deref(), Some("Filler"));
        assert_eq!(parsed.compiler.dependencies.len(), 1);
        assert!(parsed.compiler.dependencies[0].reserve.is_empty());
        assert_eq!(parsed.solver.control_center_capacity, 5);
        assert_eq!(parsed.boost.max_targets, 3);
    }

    #[test]
    fn missing_file_yields_default_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load(Some(&dir.path().join("absent.toml"))).expect("load");
        assert_eq!(config.inputs.rules_path, "rules.json");
    }

    #[test]
    fn overrides_replace_paths_and_mode() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            rules_path: Some("r.json".into()),
            roster_path: None,
            scenario_path: Some("s.json".into()),
            strict: true,
        });
        assert_eq!(config.inputs.rules_path, "r.json");
        assert_eq!(config.inputs.roster_path, "roster.json");
        assert_eq!(config.inputs.scenario_path, "s.json");
        assert_eq!(config.compiler.mode, CompileMode::Strict);
    }
}
