use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::controls::{SelectorDefaults, SelectorField};
use crate::data::loader::DataSource;
use crate::data::model::{Continent, Metric};
use crate::data::query::DEFAULT_TOP_N;
use crate::data::store::OutlierPolicy;
use crate::error::{DashResult, DashboardError};

// ---------------------------------------------------------------------------
// Environment variables
// ---------------------------------------------------------------------------

pub const ENV_CONFIG: &str = "GAPMINDER_DASH_CONFIG";
pub const ENV_DATA: &str = "GAPMINDER_DASH_DATA";
pub const ENV_CONTINENT: &str = "GAPMINDER_DASH_CONTINENT";
pub const ENV_YEAR: &str = "GAPMINDER_DASH_YEAR";
pub const ENV_METRIC: &str = "GAPMINDER_DASH_METRIC";
pub const ENV_TOP_N: &str = "GAPMINDER_DASH_TOP_N";

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

/// Startup configuration. Missing JSON fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset file; the bundled synthetic sample when absent.
    pub data_path: Option<PathBuf>,
    /// Kept as text so an unknown name is reported against the dataset.
    pub default_continent: Option<String>,
    pub default_year: Option<i32>,
    pub default_metric: String,
    pub top_n: usize,
    pub outlier_policy: OutlierPolicy,
    pub clean_columns: Vec<Metric>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            default_continent: Some(Continent::Asia.to_string()),
            default_year: Some(1952),
            default_metric: Metric::LifeExpectancy.to_string(),
            top_n: DEFAULT_TOP_N,
            outlier_policy: OutlierPolicy::Charts,
            clean_columns: Metric::ALL.to_vec(),
        }
    }
}

impl DashboardConfig {
    /// Defaults, then the JSON file named by `GAPMINDER_DASH_CONFIG`, then
    /// the individual environment overrides.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`load`](Self::load) with an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup(ENV_CONFIG) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(path) = lookup(ENV_DATA) {
            config.data_path = Some(PathBuf::from(path));
        }
        if let Some(continent) = lookup(ENV_CONTINENT) {
            config.default_continent = Some(continent);
        }
        if let Some(year) = lookup(ENV_YEAR) {
            let year = year
                .trim()
                .parse()
                .with_context(|| format!("{ENV_YEAR}='{year}' is not a year"))?;
            config.default_year = Some(year);
        }
        if let Some(metric) = lookup(ENV_METRIC) {
            config.default_metric = metric;
        }
        if let Some(top_n) = lookup(ENV_TOP_N) {
            config.top_n = top_n
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TOP_N}='{top_n}' is not a count"))?;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn data_source(&self) -> DataSource {
        match &self.data_path {
            Some(path) => DataSource::File(path.clone()),
            None => DataSource::Sample,
        }
    }

    /// Parse the configured default selectors. Whether they exist in the
    /// dataset is checked by the control panel.
    pub fn selector_defaults(&self) -> DashResult<SelectorDefaults> {
        let continent = self
            .default_continent
            .as_deref()
            .map(|name| {
                name.parse::<Continent>()
                    .map_err(|_| DashboardError::InvalidDefaultSelector {
                        field: SelectorField::Continent,
                        value: name.to_string(),
                    })
            })
            .transpose()?;

        let metric = self
            .default_metric
            .parse::<Metric>()
            .map_err(|_| DashboardError::InvalidDefaultSelector {
                field: SelectorField::Metric,
                value: self.default_metric.clone(),
            })?;

        Ok(SelectorDefaults {
            continent,
            year: self.default_year,
            metric: Some(metric),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_dashboard_startup_view() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
        let defaults = config.selector_defaults().unwrap();
        assert_eq!(defaults.continent, Some(Continent::Asia));
        assert_eq!(defaults.year, Some(1952));
        assert_eq!(defaults.metric, Some(Metric::LifeExpectancy));
        assert_eq!(config.top_n, 15);
        assert_eq!(config.data_source(), DataSource::Sample);
    }

    #[test]
    fn env_overrides_apply() {
        let config = DashboardConfig::from_lookup(lookup(&[
            (ENV_CONTINENT, "Europe"),
            (ENV_YEAR, "2007"),
            (ENV_METRIC, "GDP per Capita"),
            (ENV_TOP_N, "5"),
            (ENV_DATA, "/tmp/gapminder.parquet"),
        ]))
        .unwrap();
        let defaults = config.selector_defaults().unwrap();
        assert_eq!(defaults.continent, Some(Continent::Europe));
        assert_eq!(defaults.year, Some(2007));
        assert_eq!(defaults.metric, Some(Metric::GdpPerCapita));
        assert_eq!(config.top_n, 5);
        assert_eq!(
            config.data_source(),
            DataSource::File(PathBuf::from("/tmp/gapminder.parquet"))
        );
    }

    #[test]
    fn bad_year_is_an_error() {
        assert!(DashboardConfig::from_lookup(lookup(&[(ENV_YEAR, "nineteen")])).is_err());
    }

    #[test]
    fn unknown_names_are_invalid_defaults() {
        let config = DashboardConfig {
            default_continent: Some("Atlantis".into()),
            ..Default::default()
        };
        assert!(matches!(
            config.selector_defaults(),
            Err(DashboardError::InvalidDefaultSelector { field: SelectorField::Continent, .. })
        ));

        let config = DashboardConfig {
            default_metric: "Area".into(),
            ..Default::default()
        };
        assert!(config.selector_defaults().is_err());
    }

    #[test]
    fn partial_json_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "top_n": 10, "outlier_policy": "off" }}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = DashboardConfig::from_lookup(lookup(&[(ENV_CONFIG, path.as_str())])).unwrap();
        assert_eq!(config.top_n, 10);
        assert_eq!(config.outlier_policy, OutlierPolicy::Off);
        assert_eq!(config.default_year, Some(1952));
        assert_eq!(config.clean_columns, Metric::ALL.to_vec());
    }
}
