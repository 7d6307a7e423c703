//! Configuration resolution for Parkgrid.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/parkgrid/settings.json)
//! 3. Project config (.parkgrid/settings.json)
//! 4. Environment variables
//! 5. CLI arguments (highest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete Parkgrid client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL including the version prefix.
    pub base_url: String,
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api/v1".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Third-party mapping/geocoding configuration. Each provider is optional at
/// runtime; failures degrade the feature, never the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Reverse-geocoding endpoint (Nominatim-compatible).
    pub reverse_geocode_url: String,
    /// User-Agent sent to the reverse geocoder (required by OSM policy).
    pub user_agent: String,
    /// Map center used when no point is selected yet (Dhaka).
    pub fallback_lat: f64,
    pub fallback_lng: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            reverse_geocode_url: "https://nominatim.openstreetmap.org/reverse".to_string(),
            user_agent: "parkgrid/0.1".to_string(),
            fallback_lat: 23.8103,
            fallback_lng: 90.4125,
        }
    }
}

/// Search defaults. The radius is a request hint only; the backend clamps
/// and echoes the effective value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub default_radius_m: f64,
    /// Length of the pre-filled search window, in hours.
    pub default_window_hours: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_m: 1500.0,
            default_window_hours: 1,
        }
    }
}

/// Configuration source priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    Default = 0,
    Global = 1,
    Project = 2,
    Environment = 3,
    Cli = 4,
}

/// Load configuration with hierarchical resolution.
pub fn load_config(project_dir: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    // Load global config
    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    // Load project config
    if let Some(dir) = project_dir {
        let project_path = dir.join(".parkgrid").join("settings.json");
        if project_path.exists() {
            let project = load_config_file(&project_path)?;
            merge_config(&mut config, project);
        }
    }

    // Apply environment overrides
    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".parkgrid").join("settings.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/parkgrid/settings.json"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("parkgrid").join("settings.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    base.api = overlay.api;
    base.map = overlay.map;
    base.search = overlay.search;
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("PARKGRID_API_BASE") {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("PARKGRID_LOG_LEVEL") {
        config.api.log_level = val;
    }
    if let Ok(val) = std::env::var("PARKGRID_RADIUS_M") {
        if let Ok(n) = val.parse() {
            config.search.default_radius_m = n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_api_base_matches_local_backend() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000/api/v1");
    }

    #[test]
    fn default_radius_is_1500m() {
        let config = Config::default();
        assert!((config.search.default_radius_m - 1500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn default_fallback_center_is_dhaka() {
        let config = Config::default();
        assert!((config.map.fallback_lat - 23.8103).abs() < 1e-9);
        assert!((config.map.fallback_lng - 90.4125).abs() < 1e-9);
    }

    #[test]
    fn config_roundtrip_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let loaded: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.api.base_url, config.api.base_url);
    }

    #[test]
    fn partial_config_file_fills_defaults() {
        let json = r#"{"api": {"base_url": "https://api.parkgrid.example/v1", "log_level": "debug"}}"#;
        let loaded: Config = serde_json::from_str(json).unwrap();
        assert_eq!(loaded.api.base_url, "https://api.parkgrid.example/v1");
        assert!((loaded.search.default_radius_m - 1500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn project_config_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join(".parkgrid");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(
            project.join("settings.json"),
            r#"{"search": {"default_radius_m": 800, "default_window_hours": 2}}"#,
        )
        .unwrap();
        let config = load_config(Some(dir.path())).unwrap();
        assert!((config.search.default_radius_m - 800.0).abs() < f64::EPSILON);
        assert_eq!(config.search.default_window_hours, 2);
    }

    #[test]
    fn source_priority_ordering() {
        assert!(ConfigSource::Cli > ConfigSource::Environment);
        assert!(ConfigSource::Environment > ConfigSource::Project);
        assert!(ConfigSource::Project > ConfigSource::Global);
        assert!(ConfigSource::Global > ConfigSource::Default);
    }
}
