use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::clean::clean;
use super::loader::{load, DataSource};
use super::model::{Dataset, Metric};
use crate::error::DashResult;

// ---------------------------------------------------------------------------
// Outlier policy
// ---------------------------------------------------------------------------

/// Which views read the outlier-filtered copy of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierPolicy {
    /// Every view reads the raw table.
    Off,
    /// Bar charts and the map read the cleaned table, the data table stays raw.
    #[default]
    Charts,
    /// Every view reads the cleaned table.
    All,
}

impl OutlierPolicy {
    pub const ALL: [OutlierPolicy; 3] = [OutlierPolicy::Off, OutlierPolicy::Charts, OutlierPolicy::All];
}

impl fmt::Display for OutlierPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlierPolicy::Off => write!(f, "off"),
            OutlierPolicy::Charts => write!(f, "charts"),
            OutlierPolicy::All => write!(f, "all"),
        }
    }
}

/// The two kinds of consumer that may see different tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Chart,
    Table,
}

// ---------------------------------------------------------------------------
// DatasetStore – owned handle to the raw and cleaned tables
// ---------------------------------------------------------------------------

/// Created once, read-only afterwards. Both tables are behind `Arc` so chart
/// slots can read them from worker threads.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    source: DataSource,
    raw: Arc<Dataset>,
    cleaned: Arc<Dataset>,
    policy: OutlierPolicy,
    clean_columns: Vec<Metric>,
}

impl DatasetStore {
    /// Load `source` and build the cleaned copy before anything can query it.
    pub fn open(source: DataSource, policy: OutlierPolicy, clean_columns: &[Metric]) -> DashResult<Self> {
        let raw = load(&source)?;
        Ok(Self::from_dataset(source, raw, policy, clean_columns))
    }

    pub fn from_dataset(
        source: DataSource,
        raw: Dataset,
        policy: OutlierPolicy,
        clean_columns: &[Metric],
    ) -> Self {
        let cleaned = clean(&raw, clean_columns);
        log::info!(
            "Dataset store ready: {} rows raw, {} rows after outlier removal on {:?}",
            raw.len(),
            cleaned.len(),
            clean_columns
        );
        DatasetStore {
            source,
            raw: Arc::new(raw),
            cleaned: Arc::new(cleaned),
            policy,
            clean_columns: clean_columns.to_vec(),
        }
    }

    /// Same tables, different policy. Nothing is recomputed.
    pub fn with_policy(&self, policy: OutlierPolicy) -> Self {
        DatasetStore {
            policy,
            ..self.clone()
        }
    }

    /// The table a given view should read under the current policy.
    pub fn dataset_for(&self, view: View) -> &Arc<Dataset> {
        match (self.policy, view) {
            (OutlierPolicy::Off, _) => &self.raw,
            (OutlierPolicy::Charts, View::Table) => &self.raw,
            (OutlierPolicy::Charts, View::Chart) | (OutlierPolicy::All, _) => &self.cleaned,
        }
    }

    pub fn raw(&self) -> &Arc<Dataset> {
        &self.raw
    }

    pub fn cleaned(&self) -> &Arc<Dataset> {
        &self.cleaned
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn policy(&self) -> OutlierPolicy {
        self.policy
    }

    pub fn clean_columns(&self) -> &[Metric] {
        &self.clean_columns
    }
}
