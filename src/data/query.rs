use std::cmp::Ordering;

use super::model::{Continent, Dataset, Metric, Row};

// ---------------------------------------------------------------------------
// Query engine: pure row selection and ranking
// ---------------------------------------------------------------------------

/// Number of bars in a ranked chart.
pub const DEFAULT_TOP_N: usize = 15;

/// Rows matching both `continent` and `year`, in dataset order.
pub fn filter_by_continent_year(dataset: &Dataset, continent: Continent, year: i32) -> Vec<Row> {
    dataset
        .rows()
        .iter()
        .filter(|r| r.continent == continent && r.year == year)
        .cloned()
        .collect()
}

/// Rows for `year` across every continent, in dataset order.
pub fn filter_by_year(dataset: &Dataset, year: i32) -> Vec<Row> {
    dataset
        .rows()
        .iter()
        .filter(|r| r.year == year)
        .cloned()
        .collect()
}

/// Total order used for ranking: `metric` descending, then country name
/// ascending, then ISO code ascending.
pub fn rank_order(metric: Metric, a: &Row, b: &Row) -> Ordering {
    metric
        .value(b)
        .total_cmp(&metric.value(a))
        .then_with(|| a.country.cmp(&b.country))
        .then_with(|| a.iso_alpha.cmp(&b.iso_alpha))
}

/// The `n` highest rows by `metric`, ordered by [`rank_order`].
pub fn top_n_by_metric(rows: &[Row], metric: Metric, n: usize) -> Vec<Row> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(|a, b| rank_order(metric, a, b));
    ranked.truncate(n);
    ranked
}
