//! Runtime configuration.
//!
//! Every component receives the values it needs from a [`Config`] at construction,
//! so tests can run several configurations side by side.
use crate::error::Error;
use crate::error::Result;
use std::path::PathBuf;
use std::time::Duration;

/// ETRS89 / UTM zone 32N. All area and slope math happens here.
pub const WORKING_CRS: u32 = 25832;
/// WGS84. Only used for map display.
pub const DISPLAY_CRS: u32 = 4326;
/// Upper bound on region area in square kilometres.
pub const MAX_AREA_KM2: f64 = 200.0;
/// Region used when the caller names none.
pub const DEFAULT_REGION: &str = "wuppertal_center";
/// Directory holding stage templates.
pub const QUERY_DIR: &str = "queries";
/// Per-stage execution bound.
pub const STAGE_TIMEOUT: Duration = Duration::from_secs(600);
/// Default HTTP bind address for the hosting binary.
pub const BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub working_crs: u32,
    pub display_crs: u32,
    pub max_area_km2: f64,
    pub default_region: String,
    pub database_url: Option<String>,
    pub queries: PathBuf,
    pub stage_timeout: Duration,
    pub advisory_lock: bool,
    pub regions_file: Option<PathBuf>,
    pub bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            working_crs: WORKING_CRS,
            display_crs: DISPLAY_CRS,
            max_area_km2: MAX_AREA_KM2,
            default_region: DEFAULT_REGION.to_string(),
            database_url: None,
            queries: PathBuf::from(QUERY_DIR),
            stage_timeout: STAGE_TIMEOUT,
            advisory_lock: true,
            regions_file: None,
            bind: BIND_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each recognised key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = lookup("WORKING_CRS") {
            config.working_crs = parse("WORKING_CRS", &v)?;
        }
        if let Some(v) = lookup("DISPLAY_CRS") {
            config.display_crs = parse("DISPLAY_CRS", &v)?;
        }
        if let Some(v) = lookup("MAX_AREA_KM2") {
            config.max_area_km2 = parse("MAX_AREA_KM2", &v)?;
        }
        if let Some(v) = lookup("REGION") {
            config.default_region = v;
        }
        if let Some(v) = lookup("DB_URL") {
            config.database_url = Some(v);
        }
        if let Some(v) = lookup("QUERY_DIR") {
            config.queries = PathBuf::from(v);
        }
        if let Some(v) = lookup("STAGE_TIMEOUT") {
            config.stage_timeout = parse_duration(&v)
                .ok_or_else(|| Error::Config(format!("STAGE_TIMEOUT: invalid duration {:?}", v)))?;
        }
        if let Some(v) = lookup("ADVISORY_LOCK") {
            config.advisory_lock = parse("ADVISORY_LOCK", &v)?;
        }
        if let Some(v) = lookup("REGIONS_FILE") {
            config.regions_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("BIND_ADDR") {
            config.bind = v;
        }
        if !(config.max_area_km2 > 0.) {
            return Err(Error::Config(format!(
                "MAX_AREA_KM2 must be positive, got {}",
                config.max_area_km2
            )));
        }
        Ok(config)
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| Error::Config("DB_URL must be set".to_string()))
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| Error::Config(format!("{}: {}", key, e)))
}

/// Parse duration string like "30s", "5m", "2h", "1d" into Duration.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (num, unit) = s.split_at(s.len().saturating_sub(1));
    let value: u64 = num.parse().ok()?;
    match unit {
        "s" => Some(Duration::from_secs(value)),
        "m" => Some(Duration::from_secs(value * 60)),
        "h" => Some(Duration::from_secs(value * 3600)),
        "d" => Some(Duration::from_secs(value * 86400)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.working_crs, 25832);
        assert_eq!(config.display_crs, 4326);
        assert!(config.database_url().is_err());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("WORKING_CRS", "32632"),
            ("MAX_AREA_KM2", "50"),
            ("REGION", "koeln_center"),
            ("STAGE_TIMEOUT", "30s"),
            ("ADVISORY_LOCK", "false"),
        ]))
        .unwrap();
        assert_eq!(config.working_crs, 32632);
        assert_eq!(config.max_area_km2, 50.);
        assert_eq!(config.default_region, "koeln_center");
        assert_eq!(config.stage_timeout, Duration::from_secs(30));
        assert!(!config.advisory_lock);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(Config::from_lookup(lookup(&[("WORKING_CRS", "EPSG:25832")])).is_err());
        assert!(Config::from_lookup(lookup(&[("STAGE_TIMEOUT", "soon")])).is_err());
        assert!(Config::from_lookup(lookup(&[("MAX_AREA_KM2", "-1")])).is_err());
    }

    #[test]
    fn durations_parse_by_unit() {
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
        assert_eq!(parse_duration("1d"), Some(Duration::from_secs(86400)));
        assert_eq!(parse_duration("10x"), None);
    }
}
