//! Chart layer: rows in, declarative [`ChartSpec`]s out.
//!
//! Builders never filter or sort. Whatever rows they are handed are drawn in
//! the order given, so chart shape is a function of the rows alone.

pub mod builders;
pub mod spec;

pub use spec::{ChartKind, ChartSpec};
