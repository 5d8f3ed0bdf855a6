//! Application configuration for cyclusgen.
//!
//! User config lives at `~/.cyclusgen/cyclusgen.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CyclusGenError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "cyclusgen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".cyclusgen";

/// Status substrings that mark a unit as not operating (matched lowercase).
pub const DEFAULT_EXCLUDED_STATUS: [&str; 6] =
    ["cancel", "defer", "review", "suspend", "under", "permanent"];

/// Units at or below this net capacity are research reactors and dropped.
pub const DEFAULT_MIN_CAPACITY_MWE: f64 = 100.0;

// ---------------------------------------------------------------------------
// Config structs (matching cyclusgen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scenario defaults.
    #[serde(default)]
    pub scenario: ScenarioDefaults,

    /// Fleet filtering policy.
    #[serde(default)]
    pub fleet: FleetConfig,

    /// Template overrides.
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Special generation modes.
    #[serde(default)]
    pub special: SpecialModes,
}

/// `[scenario]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDefaults {
    /// Simulation start date (`YYYY-MM-DD`, `YYYYMMDD`, `MM/DD/YYYY` or `YYYY`).
    #[serde(default = "default_start_date")]
    pub start_date: String,

    /// Simulation duration in months.
    #[serde(default = "default_duration")]
    pub duration: u32,

    /// Lifetime in months assumed for units without a shutdown date.
    #[serde(default = "default_assumed_lifetime")]
    pub assumed_lifetime: i32,

    /// Whether to deploy the reprocessing facility.
    #[serde(default = "default_true")]
    pub reprocessing: bool,

    /// Output document path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for ScenarioDefaults {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            duration: default_duration(),
            assumed_lifetime: default_assumed_lifetime(),
            reprocessing: true,
            output: default_output(),
        }
    }
}

fn default_start_date() -> String {
    "2020-01-01".into()
}
fn default_duration() -> u32 {
    1200
}
fn default_assumed_lifetime() -> i32 {
    720
}
fn default_true() -> bool {
    true
}
fn default_output() -> String {
    "complete_input.xml".into()
}

/// `[fleet]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Countries to include when none are given on the command line.
    #[serde(default)]
    pub countries: Vec<String>,

    /// Status substrings marking non-operating units.
    #[serde(default = "default_excluded_status")]
    pub exclude_status: Vec<String>,

    /// Units at or below this net capacity (MWe) are dropped.
    #[serde(default = "default_min_capacity")]
    pub min_capacity_mwe: f64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            countries: Vec::new(),
            exclude_status: default_excluded_status(),
            min_capacity_mwe: DEFAULT_MIN_CAPACITY_MWE,
        }
    }
}

fn default_excluded_status() -> Vec<String> {
    DEFAULT_EXCLUDED_STATUS.iter().map(|s| s.to_string()).collect()
}
fn default_min_capacity() -> f64 {
    DEFAULT_MIN_CAPACITY_MWE
}

/// `[templates]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Directory whose files override the built-in templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

/// `[special]` section: alternate generation modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialModes {
    /// Light-water prototypes use the depletion-coupled (Cyborg) reactor template.
    #[serde(default)]
    pub cyborg: bool,

    /// Light-water prototypes use the F33 library template, and the
    /// `f33_reactor` archetype is spliced into the archetype list.
    #[serde(default)]
    pub f33: bool,
}

impl SpecialModes {
    /// Combine two mode sets; a mode is on if either side enables it.
    pub fn union(self, other: Self) -> Self {
        Self {
            cyborg: self.cyborg || other.cyborg,
            f33: self.f33 || other.f33,
        }
    }
}

impl FromStr for SpecialModes {
    type Err = CyclusGenError;

    /// Parse a comma or whitespace separated token list, e.g. `"cyborg,f33"`.
    fn from_str(s: &str) -> Result<Self> {
        let mut modes = Self::default();
        for token in s.split([',', ' ']).map(str::trim).filter(|t| !t.is_empty()) {
            match token.to_ascii_lowercase().as_str() {
                "cyborg" => modes.cyborg = true,
                "f33" => modes.f33 = true,
                other => {
                    return Err(CyclusGenError::config(format!(
                        "unknown special mode '{other}': expected 'cyborg' or 'f33'"
                    )));
                }
            }
        }
        Ok(modes)
    }
}

// ---------------------------------------------------------------------------
// Runtime config (merged from config file + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime fleet filter, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Requested countries, in output order.
    pub countries: Vec<String>,
    /// Lowercase status substrings marking non-operating units.
    pub exclude_status: Vec<String>,
    /// Minimum net capacity, exclusive.
    pub min_capacity_mwe: f64,
}

impl From<&AppConfig> for FilterConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            countries: config.fleet.countries.clone(),
            exclude_status: config
                .fleet
                .exclude_status
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            min_capacity_mwe: config.fleet.min_capacity_mwe,
        }
    }
}

/// Everything one generation run needs.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Fleet CSV path.
    pub csv_path: PathBuf,
    /// Simulation start date.
    pub start: NaiveDate,
    /// Simulation duration in months.
    pub duration: u32,
    /// Fleet filter.
    pub filter: FilterConfig,
    /// Lifetime in months assumed for units without a shutdown date.
    pub assumed_lifetime: i32,
    /// Whether to deploy the reprocessing facility.
    pub reprocessing: bool,
    /// Output document path.
    pub output: PathBuf,
    /// Template override directory.
    pub template_dir: Option<PathBuf>,
    /// Special generation modes.
    pub special: SpecialModes,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.cyclusgen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CyclusGenError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.cyclusgen/cyclusgen.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CyclusGenError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        CyclusGenError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CyclusGenError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CyclusGenError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CyclusGenError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("start_date"));
        assert!(toml_str.contains("assumed_lifetime = 720"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.scenario.duration, 1200);
        assert_eq!(parsed.fleet.exclude_status.len(), 6);
        assert!(parsed.scenario.reprocessing);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[scenario]
start_date = "1965-01-01"
reprocessing = false

[fleet]
countries = ["France", "Belgium"]

[special]
f33 = true
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.scenario.start_date, "1965-01-01");
        assert!(!config.scenario.reprocessing);
        assert_eq!(config.scenario.assumed_lifetime, 720);
        assert_eq!(config.fleet.countries, vec!["France", "Belgium"]);
        assert_eq!(config.fleet.min_capacity_mwe, 100.0);
        assert!(config.special.f33);
        assert!(!config.special.cyborg);
    }

    #[test]
    fn filter_config_lowercases_markers() {
        let mut app = AppConfig::default();
        app.fleet.exclude_status = vec!["Mothballed".into()];
        let filter = FilterConfig::from(&app);
        assert_eq!(filter.exclude_status, vec!["mothballed"]);
        assert_eq!(filter.min_capacity_mwe, 100.0);
    }

    #[test]
    fn special_modes_from_tokens() {
        let modes: SpecialModes = "cyborg, f33".parse().unwrap();
        assert!(modes.cyborg && modes.f33);

        let modes: SpecialModes = "".parse().unwrap();
        assert_eq!(modes, SpecialModes::default());

        let err = "turbo".parse::<SpecialModes>().unwrap_err();
        assert!(err.to_string().contains("unknown special mode 'turbo'"));
    }

    #[test]
    fn special_modes_union() {
        let a = SpecialModes { cyborg: true, f33: false };
        let b = SpecialModes { cyborg: false, f33: true };
        assert_eq!(a.union(b), SpecialModes { cyborg: true, f33: true });
    }
}
