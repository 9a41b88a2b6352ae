//! Engine configuration.
//!
//! Loaded from JSON; every field is optional and falls back to the default
//! shown below.
//!
//! ```json
//! {
//!   "profile": {
//!     "base_weights": {
//!       "motorway": 1.0, "trunk": 1.2, "primary": 1.3, "secondary": 1.4,
//!       "tertiary": 1.5, "residential": 1.6, "unclassified": 1.8
//!     },
//!     "rush_hours": [8, 9, 17, 18, 19],
//!     "rush_multiplier": 1.5
//!   },
//!   "utc_offset_secs": 0,
//!   "cache_ttl_secs": 3600,
//!   "data_dir": null
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use rr_core::{CoreError, CoreResult, Hour};
use rr_graph::TrafficProfile;

/// Default lifetime of a cached road graph.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

const MAX_UTC_OFFSET_SECS: i32 = 14 * 3600;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Class weights and rush-hour window.
    pub profile: TrafficProfile,

    /// Local time offset from UTC, used when no hour is given explicitly.
    /// Bengaluru is `19800` (+05:30).
    pub utc_offset_secs: i32,

    /// How long a loaded graph stays cached.  `None` caches for the life of
    /// the process.
    pub cache_ttl_secs: Option<u64>,

    /// Root directory of per-place CSV graph exports.
    pub data_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile:         TrafficProfile::default(),
            utc_offset_secs: 0,
            cache_ttl_secs:  Some(DEFAULT_CACHE_TTL_SECS),
            data_dir:        None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.profile
            .validate()
            .map_err(|e| CoreError::Config(e.to_string()))?;
        if self.utc_offset_secs.unsigned_abs() > MAX_UTC_OFFSET_SECS.unsigned_abs() {
            return Err(CoreError::Config(format!(
                "utc_offset_secs {} is outside ±{MAX_UTC_OFFSET_SECS}",
                self.utc_offset_secs
            )));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    /// Local hour of day at `at`.
    pub fn hour_at(&self, at: SystemTime) -> Hour {
        let unix_secs = match at.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        };
        Hour::from_unix_secs(unix_secs, self.utc_offset_secs)
    }

    /// Local hour of day right now.
    pub fn current_hour(&self) -> Hour {
        self.hour_at(SystemTime::now())
    }
}
