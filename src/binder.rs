use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use rayon::prelude::*;

use crate::chart::builders::{bar_title, build_choropleth, build_ranked_bar_chart, build_table};
use crate::chart::ChartSpec;
use crate::controls::{ControlPanel, SelectorChange, SelectorDefaults, SelectorField, SelectorState};
use crate::data::model::{Domain, Metric};
use crate::data::query::{filter_by_continent_year, filter_by_year, top_n_by_metric};
use crate::data::store::{DatasetStore, OutlierPolicy, View};
use crate::error::{DashResult, DashboardError};

// ---------------------------------------------------------------------------
// Chart slots
// ---------------------------------------------------------------------------

/// A place on the dashboard that shows one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChartSlot {
    Table,
    Population,
    GdpPerCapita,
    LifeExpectancy,
    Map,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 5] = [
        ChartSlot::Table,
        ChartSlot::Population,
        ChartSlot::GdpPerCapita,
        ChartSlot::LifeExpectancy,
        ChartSlot::Map,
    ];

    /// Tab label.
    pub fn label(&self) -> &'static str {
        match self {
            ChartSlot::Table => "Dataset",
            ChartSlot::Population => "Population",
            ChartSlot::GdpPerCapita => "GDP per Capita",
            ChartSlot::LifeExpectancy => "Life Expectancy",
            ChartSlot::Map => "World Map",
        }
    }

    /// Selector fields this slot's chart is computed from.
    pub fn depends_on(&self) -> &'static [SelectorField] {
        match self {
            ChartSlot::Table => &[],
            ChartSlot::Population | ChartSlot::GdpPerCapita | ChartSlot::LifeExpectancy => {
                &[SelectorField::Continent, SelectorField::Year]
            }
            ChartSlot::Map => &[SelectorField::Metric, SelectorField::Year],
        }
    }

    /// Slots whose chart must be rebuilt when `field` changes.
    pub fn dependents(field: SelectorField) -> Vec<ChartSlot> {
        ChartSlot::ALL
            .into_iter()
            .filter(|slot| slot.depends_on().contains(&field))
            .collect()
    }
}

impl fmt::Display for ChartSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Build the chart for one slot. Pure: depends only on its arguments.
pub fn compute_slot(
    store: &DatasetStore,
    selectors: &SelectorState,
    top_n: usize,
    slot: ChartSlot,
) -> ChartSpec {
    match slot {
        ChartSlot::Table => build_table(store.dataset_for(View::Table)),
        ChartSlot::Map => {
            let rows = filter_by_year(store.dataset_for(View::Chart), selectors.year);
            build_choropleth(&rows, selectors.metric, selectors.year)
        }
        ChartSlot::Population => ranked_bar(store, selectors, top_n, Metric::Population),
        ChartSlot::GdpPerCapita => ranked_bar(store, selectors, top_n, Metric::GdpPerCapita),
        ChartSlot::LifeExpectancy => ranked_bar(store, selectors, top_n, Metric::LifeExpectancy),
    }
}

fn ranked_bar(store: &DatasetStore, selectors: &SelectorState, top_n: usize, metric: Metric) -> ChartSpec {
    let rows = filter_by_continent_year(
        store.dataset_for(View::Chart),
        selectors.continent,
        selectors.year,
    );
    let top = top_n_by_metric(&rows, metric, top_n);
    build_ranked_bar_chart(&top, metric, bar_title(metric, selectors.continent, selectors.year))
}

/// Build `slots` in parallel. Keyed by slot, so the result does not depend
/// on which worker finishes first.
pub fn compute_slots(
    store: &DatasetStore,
    selectors: &SelectorState,
    top_n: usize,
    slots: &[ChartSlot],
) -> BTreeMap<ChartSlot, ChartSpec> {
    slots
        .par_iter()
        .map(|slot| (*slot, compute_slot(store, selectors, top_n, *slot)))
        .collect()
}

// ---------------------------------------------------------------------------
// Display side
// ---------------------------------------------------------------------------

/// Receives freshly built charts.
pub trait ChartSink {
    fn publish(&mut self, slot: ChartSlot, spec: &ChartSpec);
}

impl ChartSink for BTreeMap<ChartSlot, ChartSpec> {
    fn publish(&mut self, slot: ChartSlot, spec: &ChartSpec) {
        self.insert(slot, spec.clone());
    }
}

// ---------------------------------------------------------------------------
// Reactive binder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinderPhase {
    Idle,
    Updating,
}

/// Result of processing one selector change.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub change: SelectorChange,
    pub selectors: SelectorState,
    /// Slots rebuilt and published, in slot order.
    pub recomputed: Vec<ChartSlot>,
}

/// Handle for posting selector changes, including from inside a listener
/// while an update is in flight.
#[derive(Clone)]
pub struct SelectorSender {
    inbox: Rc<RefCell<VecDeque<SelectorChange>>>,
    phase: Rc<Cell<BinderPhase>>,
}

impl SelectorSender {
    /// Queue a change. It is processed after the in-flight update, or on the
    /// next [`ReactiveBinder::pump`] when the binder is idle.
    pub fn post(&self, change: SelectorChange) {
        self.inbox.borrow_mut().push_back(change);
    }
}

/// Wires selector changes to chart recomputation.
///
/// Changes are processed strictly one at a time in arrival order. A change
/// posted while `Updating` waits in the queue and gets its own update.
pub struct ReactiveBinder {
    store: DatasetStore,
    panel: ControlPanel,
    top_n: usize,
    charts: BTreeMap<ChartSlot, ChartSpec>,
    inbox: Rc<RefCell<VecDeque<SelectorChange>>>,
    phase: Rc<Cell<BinderPhase>>,
}

impl ReactiveBinder {
    /// Validate `defaults` against the raw dataset and build every chart.
    pub fn new(store: DatasetStore, defaults: SelectorDefaults, top_n: usize) -> DashResult<Self> {
        let panel = ControlPanel::new(store.raw().domain().clone(), defaults)?;
        let charts = compute_slots(&store, panel.state(), top_n, &ChartSlot::ALL);
        Ok(ReactiveBinder {
            store,
            panel,
            top_n,
            charts,
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            phase: Rc::new(Cell::new(BinderPhase::Idle)),
        })
    }

    pub fn sender(&self) -> SelectorSender {
        SelectorSender {
            inbox: Rc::clone(&self.inbox),
            phase: Rc::clone(&self.phase),
        }
    }

    pub fn phase(&self) -> BinderPhase {
        self.phase.get()
    }

    pub fn selectors(&self) -> &SelectorState {
        self.panel.state()
    }

    /// Values the selectors may take.
    pub fn domain(&self) -> &Domain {
        self.panel.domain()
    }

    pub fn panel_mut(&mut self) -> &mut ControlPanel {
        &mut self.panel
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Currently displayed charts.
    pub fn charts(&self) -> &BTreeMap<ChartSlot, ChartSpec> {
        &self.charts
    }

    pub fn chart(&self, slot: ChartSlot) -> Option<&ChartSpec> {
        self.charts.get(&slot)
    }

    /// Push every current chart to `sink`, e.g. a freshly attached display.
    pub fn publish_all(&self, sink: &mut dyn ChartSink) {
        for (slot, spec) in &self.charts {
            sink.publish(*slot, spec);
        }
    }

    /// Queue `change` and process the queue.
    pub fn dispatch(&mut self, change: SelectorChange, sink: &mut dyn ChartSink) -> Vec<DashResult<Update>> {
        self.sender().post(change);
        self.pump(sink)
    }

    /// Process queued changes in FIFO order until the queue is empty.
    pub fn pump(&mut self, sink: &mut dyn ChartSink) -> Vec<DashResult<Update>> {
        let mut outcomes = Vec::new();
        if self.phase.get() == BinderPhase::Updating {
            return outcomes;
        }

        loop {
            let next = self.inbox.borrow_mut().pop_front();
            let Some(change) = next else {
                break;
            };

            self.phase.set(BinderPhase::Updating);
            let result = self.process(change);
            self.phase.set(BinderPhase::Idle);

            if let Ok(update) = &result {
                for slot in &update.recomputed {
                    if let Some(spec) = self.charts.get(slot) {
                        sink.publish(*slot, spec);
                    }
                }
            }
            outcomes.push(result);
        }
        outcomes
    }

    fn process(&mut self, change: SelectorChange) -> DashResult<Update> {
        let changed = self.panel.apply(change)?;
        let recomputed = if changed {
            ChartSlot::dependents(change.field())
        } else {
            Vec::new()
        };

        let selectors = *self.panel.state();
        let fresh = compute_slots(&self.store, &selectors, self.top_n, &recomputed);
        self.charts.extend(fresh);

        log::debug!("{change:?} -> rebuilt {recomputed:?}");
        Ok(Update {
            change,
            selectors,
            recomputed,
        })
    }

    /// Switch to a newly loaded store. Stale selectors are clamped and
    /// returned; every slot is rebuilt.
    pub fn reload(&mut self, store: DatasetStore, sink: &mut dyn ChartSink) -> DashResult<Vec<DashboardError>> {
        let stale = self.panel.rebind(store.raw().domain().clone())?;
        self.store = store;
        self.rebuild_all(sink);
        Ok(stale)
    }

    /// Change which views read the cleaned table and rebuild every slot.
    pub fn set_policy(&mut self, policy: OutlierPolicy, sink: &mut dyn ChartSink) {
        if policy == self.store.policy() {
            return;
        }
        self.store = self.store.with_policy(policy);
        self.rebuild_all(sink);
    }

    fn rebuild_all(&mut self, sink: &mut dyn ChartSink) {
        self.phase.set(BinderPhase::Updating);
        self.charts = compute_slots(&self.store, self.panel.state(), self.top_n, &ChartSlot::ALL);
        self.phase.set(BinderPhase::Idle);
        self.publish_all(sink);
    }
}
