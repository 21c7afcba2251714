use serde::Serialize;

use crate::color::{DivergingScale, Rgb};
use crate::data::model::Metric;

// ---------------------------------------------------------------------------
// ChartSpec – declarative, renderer-neutral chart description
// ---------------------------------------------------------------------------

/// The kinds of chart the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    RankedBar,
    Choropleth,
    Table,
}

/// One chart, fully described by data. Rebuilt wholesale on every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartSpec {
    RankedBar(BarChartSpec),
    Choropleth(ChoroplethSpec),
    Table(TableSpec),
    /// The query behind the chart matched no rows.
    NoData(NoDataSpec),
}

impl ChartSpec {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartSpec::RankedBar(_) => ChartKind::RankedBar,
            ChartSpec::Choropleth(_) => ChartKind::Choropleth,
            ChartSpec::Table(_) => ChartKind::Table,
            ChartSpec::NoData(spec) => spec.kind,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ChartSpec::RankedBar(spec) => &spec.title,
            ChartSpec::Choropleth(spec) => &spec.title,
            ChartSpec::Table(_) => "",
            ChartSpec::NoData(spec) => &spec.title,
        }
    }

    /// Whether this is the explicit "no data" state.
    pub fn is_empty(&self) -> bool {
        matches!(self, ChartSpec::NoData(_))
    }

    /// Pretty JSON for handing the spec to an external renderer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// -- Ranked bar chart --

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub category: String,
    pub value: f64,
    pub color: Rgb,
    /// Text drawn on the bar.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartSpec {
    pub title: String,
    /// Axis title of the category axis.
    pub category_axis: String,
    pub metric: Metric,
    /// In display order; the builder does not re-sort.
    pub bars: Vec<Bar>,
}

// -- Choropleth --

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    /// ISO-3 country code, the location key.
    pub iso_alpha: String,
    pub country: String,
    pub value: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethSpec {
    pub title: String,
    pub metric: Metric,
    pub year: i32,
    pub location_mode: &'static str,
    pub scale: DivergingScale,
    /// `[min, max]` of the metric over `regions`.
    pub color_domain: (f64, f64),
    pub hover_fields: Vec<String>,
    pub regions: Vec<Region>,
}

// -- Table --

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSpec {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// -- No data --

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoDataSpec {
    pub kind: ChartKind,
    pub title: String,
    pub message: String,
}
