use std::fmt;

use serde::Serialize;

use crate::data::model::{Continent, Domain, Metric};
use crate::error::{DashResult, DashboardError};

// ---------------------------------------------------------------------------
// Selector state
// ---------------------------------------------------------------------------

/// The three UI selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SelectorField {
    Continent,
    Year,
    Metric,
}

impl fmt::Display for SelectorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorField::Continent => write!(f, "continent"),
            SelectorField::Year => write!(f, "year"),
            SelectorField::Metric => write!(f, "metric"),
        }
    }
}

/// Current selection. Always inside the domain of the loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SelectorState {
    pub continent: Continent,
    pub year: i32,
    pub metric: Metric,
}

/// A discrete change event from the interaction surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorChange {
    Continent(Continent),
    Year(i32),
    Metric(Metric),
}

impl SelectorChange {
    pub fn field(&self) -> SelectorField {
        match self {
            SelectorChange::Continent(_) => SelectorField::Continent,
            SelectorChange::Year(_) => SelectorField::Year,
            SelectorChange::Metric(_) => SelectorField::Metric,
        }
    }
}

/// Initial selector values. `None` picks the first domain value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectorDefaults {
    pub continent: Option<Continent>,
    pub year: Option<i32>,
    pub metric: Option<Metric>,
}

// ---------------------------------------------------------------------------
// Control panel
// ---------------------------------------------------------------------------

pub type Listener = Box<dyn FnMut(&SelectorState, SelectorField)>;

/// Holds the selector state, validates changes against the dataset domain and
/// notifies listeners with the full new state.
pub struct ControlPanel {
    state: SelectorState,
    domain: Domain,
    listeners: Vec<Listener>,
}

impl fmt::Debug for ControlPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlPanel")
            .field("state", &self.state)
            .field("domain", &self.domain)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ControlPanel {
    /// Validate `defaults` against `domain`.
    pub fn new(domain: Domain, defaults: SelectorDefaults) -> DashResult<Self> {
        let continent = match defaults.continent {
            Some(c) if domain.contains_continent(c) => c,
            Some(c) => {
                return Err(DashboardError::InvalidDefaultSelector {
                    field: SelectorField::Continent,
                    value: c.to_string(),
                })
            }
            None => domain.continents.first().copied().ok_or_else(|| {
                DashboardError::InvalidDefaultSelector {
                    field: SelectorField::Continent,
                    value: "<none>".into(),
                }
            })?,
        };

        let year = match defaults.year {
            Some(y) if domain.contains_year(y) => y,
            Some(y) => {
                return Err(DashboardError::InvalidDefaultSelector {
                    field: SelectorField::Year,
                    value: y.to_string(),
                })
            }
            None => domain.years.first().copied().ok_or_else(|| {
                DashboardError::InvalidDefaultSelector {
                    field: SelectorField::Year,
                    value: "<none>".into(),
                }
            })?,
        };

        let state = SelectorState {
            continent,
            year,
            metric: defaults.metric.unwrap_or(Metric::LifeExpectancy),
        };
        log::debug!("Control panel initialised with {state:?}");

        Ok(ControlPanel {
            state,
            domain,
            listeners: Vec::new(),
        })
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Register a listener called after every accepted change.
    pub fn subscribe(&mut self, listener: impl FnMut(&SelectorState, SelectorField) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Apply one change. Out-of-domain values are rejected and leave the state
    /// untouched. Returns whether the value actually changed.
    pub fn apply(&mut self, change: SelectorChange) -> DashResult<bool> {
        let before = self.state;
        match change {
            SelectorChange::Continent(c) => {
                if !self.domain.contains_continent(c) {
                    return Err(self.reject(change.field(), c.to_string()));
                }
                self.state.continent = c;
            }
            SelectorChange::Year(y) => {
                if !self.domain.contains_year(y) {
                    return Err(self.reject(change.field(), y.to_string()));
                }
                self.state.year = y;
            }
            SelectorChange::Metric(m) => self.state.metric = m,
        }

        let field = change.field();
        for listener in &mut self.listeners {
            listener(&self.state, field);
        }
        Ok(before != self.state)
    }

    fn reject(&self, field: SelectorField, value: String) -> DashboardError {
        log::warn!("Rejected {field} '{value}': not in dataset domain");
        DashboardError::SelectorOutOfDomain { field, value }
    }

    /// Swap in the domain of a reloaded dataset. Selectors that are no longer
    /// valid are clamped (first continent, nearest year) and reported.
    ///
    /// Listeners hear about each clamped field once, after every clamp has
    /// been applied, so they always see the final state.
    pub fn rebind(&mut self, domain: Domain) -> DashResult<Vec<DashboardError>> {
        let mut stale = Vec::new();
        let mut clamped = Vec::new();

        if !domain.contains_continent(self.state.continent) {
            let replacement = domain.continents.first().copied().ok_or_else(|| {
                DashboardError::InvalidDefaultSelector {
                    field: SelectorField::Continent,
                    value: "<none>".into(),
                }
            })?;
            stale.push(DashboardError::StaleSelector {
                field: SelectorField::Continent,
                value: self.state.continent.to_string(),
                replacement: replacement.to_string(),
            });
            self.state.continent = replacement;
            clamped.push(SelectorField::Continent);
        }

        if !domain.contains_year(self.state.year) {
            let replacement = domain.nearest_year(self.state.year).ok_or_else(|| {
                DashboardError::InvalidDefaultSelector {
                    field: SelectorField::Year,
                    value: "<none>".into(),
                }
            })?;
            stale.push(DashboardError::StaleSelector {
                field: SelectorField::Year,
                value: self.state.year.to_string(),
                replacement: replacement.to_string(),
            });
            self.state.year = replacement;
            clamped.push(SelectorField::Year);
        }

        for err in &stale {
            log::warn!("{err}");
        }
        self.domain = domain;

        for field in clamped {
            for listener in &mut self.listeners {
                listener(&self.state, field);
            }
        }
        Ok(stale)
    }
}
