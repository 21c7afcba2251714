use std::collections::BTreeMap;
use std::path::Path;

use crate::binder::{ChartSlot, ReactiveBinder};
use crate::chart::ChartSpec;
use crate::config::DashboardConfig;
use crate::controls::SelectorChange;
use crate::data::loader::DataSource;
use crate::data::store::{DatasetStore, OutlierPolicy};
use crate::error::DashResult;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Selector state, dataset store and chart recomputation.
    pub binder: ReactiveBinder,

    /// Charts as last published by the binder; what the tabs draw.
    pub displayed: BTreeMap<ChartSlot, ChartSpec>,

    /// Tab currently shown in the central panel.
    pub active_tab: ChartSlot,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

/// Shown while the dashboard runs on the compiled-in sample.
pub const SAMPLE_NOTICE: &str =
    "Showing synthetic sample data. Use File → Open to load the Gapminder table.";

impl AppState {
    /// Load the configured dataset and build every chart. Fails when the data
    /// is unavailable or a default selector is not in the dataset.
    pub fn new(config: &DashboardConfig) -> DashResult<Self> {
        let store = DatasetStore::open(
            config.data_source(),
            config.outlier_policy,
            &config.clean_columns,
        )?;
        let binder = ReactiveBinder::new(store, config.selector_defaults()?, config.top_n)?;

        let mut displayed: BTreeMap<ChartSlot, ChartSpec> = BTreeMap::new();
        binder.publish_all(&mut displayed);

        let status_message = match binder.store().source() {
            DataSource::Sample => Some(SAMPLE_NOTICE.to_string()),
            DataSource::File(_) => None,
        };

        Ok(Self {
            binder,
            displayed,
            active_tab: ChartSlot::Population,
            status_message,
        })
    }

    /// Forward a selector change from a widget. Rejections end up in the
    /// status line.
    pub fn select(&mut self, change: SelectorChange) {
        let outcomes = self.binder.dispatch(change, &mut self.displayed);
        self.status_message = outcomes
            .into_iter()
            .filter_map(Result::err)
            .map(|e| e.to_string())
            .last();
    }

    /// Switch the outlier policy and redraw.
    pub fn set_policy(&mut self, policy: OutlierPolicy) {
        self.binder.set_policy(policy, &mut self.displayed);
    }

    /// Replace the dataset with the contents of `path`.
    pub fn load_path(&mut self, path: &Path) -> DashResult<()> {
        let store = DatasetStore::open(
            DataSource::File(path.to_path_buf()),
            self.binder.store().policy(),
            self.binder.store().clean_columns(),
        )?;
        let stale = self.binder.reload(store, &mut self.displayed)?;
        self.status_message = if stale.is_empty() {
            None
        } else {
            Some(
                stale
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        };
        Ok(())
    }

    /// The chart shown in the active tab.
    pub fn active_chart(&self) -> Option<&ChartSpec> {
        self.displayed.get(&self.active_tab)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::model::{Continent, Metric};

    #[test]
    fn new_state_displays_every_slot() {
        let state = AppState::new(&DashboardConfig::default()).unwrap();
        assert_eq!(state.displayed.len(), ChartSlot::ALL.len());
        assert_eq!(state.status_message.as_deref(), Some(SAMPLE_NOTICE));
        assert_eq!(state.binder.selectors().continent, Continent::Asia);
        assert_eq!(
            state.active_chart().map(|c| c.title().to_string()),
            Some("Population for Asia in 1952".to_string())
        );
    }

    #[test]
    fn rejected_selection_sets_status() {
        let mut state = AppState::new(&DashboardConfig::default()).unwrap();
        state.select(SelectorChange::Year(1800));
        assert!(state.status_message.is_some());
        state.select(SelectorChange::Year(2007));
        assert!(state.status_message.is_none());
    }

    #[test]
    fn loading_a_smaller_file_clamps_and_reports() {
        let mut state = AppState::new(&DashboardConfig::default()).unwrap();
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(
            file,
            "Country,Continent,Year,Population,GDP per Capita,Life Expectancy,ISO Alpha Country Code"
        )
        .unwrap();
        writeln!(file, "Chile,Americas,1960,7000000,4000.0,57.0,CHL").unwrap();
        writeln!(file, "Peru,Americas,1960,10000000,3000.0,48.0,PER").unwrap();

        state.load_path(file.path()).unwrap();
        assert_eq!(state.binder.selectors().continent, Continent::Americas);
        assert_eq!(state.binder.selectors().year, 1960);
        assert!(state.status_message.as_deref().unwrap_or("").contains("no longer available"));
        assert_eq!(state.binder.store().clean_columns(), Metric::ALL.as_slice());
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = AppState::new(&DashboardConfig::default()).unwrap();
        let before = state.binder.store().raw().len();
        assert!(state.load_path(Path::new("/no/such/file.csv")).is_err());
        assert_eq!(state.binder.store().raw().len(), before);
    }
}
