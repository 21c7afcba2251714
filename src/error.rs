use thiserror::Error;

use crate::controls::SelectorField;

/// Errors surfaced by the dashboard core.
///
/// Loader internals use `anyhow`; everything that crosses into the
/// control panel, binder or UI is one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// The dataset could not be read or failed validation. Fatal at startup.
    #[error("dataset unavailable ({source_name}): {reason}")]
    DataUnavailable { source_name: String, reason: String },

    /// A configured default selector is not part of the loaded dataset.
    #[error("default {field} '{value}' is not present in the dataset")]
    InvalidDefaultSelector { field: SelectorField, value: String },

    /// A selector change referenced a value outside the dataset domain.
    #[error("{field} '{value}' is not present in the dataset")]
    SelectorOutOfDomain { field: SelectorField, value: String },

    /// A selector became invalid after a reload and was clamped.
    #[error("{field} '{value}' is no longer available, switched to '{replacement}'")]
    StaleSelector {
        field: SelectorField,
        value: String,
        replacement: String,
    },
}

impl DashboardError {
    pub fn data_unavailable(source_name: impl Into<String>, err: &anyhow::Error) -> Self {
        DashboardError::DataUnavailable {
            source_name: source_name.into(),
            reason: format!("{err:#}"),
        }
    }

    /// Whether the dashboard can keep running after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DashboardError::SelectorOutOfDomain { .. } | DashboardError::StaleSelector { .. }
        )
    }
}

pub type DashResult<T> = std::result::Result<T, DashboardError>;
