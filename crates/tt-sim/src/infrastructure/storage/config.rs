//! TOML layout description and simulator settings.
//!
//! The file describes the devices of a layout, the behavior of the simulated
//! turnout motors, and a script of touches to replay.  Every section is
//! optional: a missing file or an empty one yields an empty layout that runs
//! with default settings.
//!
//! ```toml
//! [simulation]
//! log_level = "debug"
//! tick_ms = 50
//! max_ticks = 40
//!
//! [motor]
//! transit_ticks = 4
//! report_middle = true
//!
//! [[points]]
//! id = 1
//! way = "right_hand"
//!
//! [[double_points]]
//! top_id = 10
//! bottom_id = 11
//! way = "left_hand"
//! size = "large_no_sync"
//!
//! [[decouplers]]
//! id = 0
//!
//! [[signals]]
//! direction = "forward"
//!
//! [[script]]
//! tick = 2
//! touch_double = { id = 10, quadrant = 1 }
//! ```
//!
//! The file path is resolved from the first command-line argument, then the
//! `TT_SIM_CONFIG` environment variable, then `tt-sim.toml` in the working
//! directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tt_core::{
    DecouplerId, Direction, DoublePointSize, PointId, Position, SemaphoreState, Way,
};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "TT_SIM_CONFIG";

/// Config file used when neither the command line nor the environment name one.
pub const DEFAULT_CONFIG_FILE: &str = "tt-sim.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level simulator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub motor: MotorConfig,
    #[serde(default)]
    pub points: Vec<PointEntry>,
    #[serde(default)]
    pub double_points: Vec<DoublePointEntry>,
    #[serde(default)]
    pub decouplers: Vec<DecouplerEntry>,
    #[serde(default)]
    pub signals: Vec<SignalEntry>,
    #[serde(default)]
    pub script: Vec<ScriptEntry>,
}

/// Pacing and logging of the simulation loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Wall-clock length of one tick in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Number of ticks to run; `0` runs until Ctrl-C.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

/// Behavior of the simulated turnout motors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MotorConfig {
    /// Ticks a motor spends in transit before reporting arrival.
    #[serde(default = "default_transit_ticks")]
    pub transit_ticks: u32,
    /// Whether a motor reports `Middle` as soon as it starts moving.
    #[serde(default = "default_true")]
    pub report_middle: bool,
}

/// A single point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointEntry {
    pub id: PointId,
    #[serde(default)]
    pub way: Way,
    #[serde(default)]
    pub in_diagonal: bool,
    #[serde(default)]
    pub out_diagonal: bool,
    #[serde(default)]
    pub reversed: bool,
}

/// A double point registered under two identifiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoublePointEntry {
    pub top_id: PointId,
    pub bottom_id: PointId,
    #[serde(default)]
    pub way: Way,
    #[serde(default)]
    pub size: DoublePointSize,
    #[serde(default)]
    pub reversed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecouplerEntry {
    pub id: DecouplerId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SignalEntry {
    #[serde(default)]
    pub direction: Direction,
}

/// One scripted interaction, replayed at `tick`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptEntry {
    pub tick: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

/// What a script entry does.
///
/// Each variant is written as a key of the `[[script]]` table, e.g.
/// `toggle_point = 3` or `wish = { id = 3, position = "diagonal" }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ScriptAction {
    /// Touch a point as a user would.
    TogglePoint(PointId),
    /// Touch one quadrant (raw index `0..=3`) of a double point.
    TouchDouble { id: PointId, quadrant: u8 },
    ToggleDecoupler(DecouplerId),
    /// Command a point directly, bypassing the touch layer.
    Wish { id: PointId, position: Position },
    /// Set the aspect of the signal at insertion index `index`.
    Signal { index: usize, state: SemaphoreState },
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_tick_ms() -> u64 {
    50
}
fn default_max_ticks() -> u64 {
    200
}
fn default_transit_ticks() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            tick_ms: default_tick_ms(),
            max_ticks: default_max_ticks(),
        }
    }
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            transit_ticks: default_transit_ticks(),
            report_middle: default_true(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the config file path from the command line and the environment.
pub fn resolve_config_path(cli_arg: Option<OsString>) -> PathBuf {
    pick_config_path(cli_arg, std::env::var_os(CONFIG_ENV_VAR))
}

fn pick_config_path(cli_arg: Option<OsString>, env_value: Option<OsString>) -> PathBuf {
    cli_arg
        .or(env_value)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Loads `SimConfig` from `path`, returning `SimConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<SimConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: SimConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SimConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &SimConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
