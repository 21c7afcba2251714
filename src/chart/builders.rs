use super::spec::{
    Bar, BarChartSpec, ChartKind, ChartSpec, ChoroplethSpec, NoDataSpec, Region, TableSpec,
};
use crate::color::{CategoryColors, DivergingScale};
use crate::data::model::{Continent, Dataset, Metric, Row, COLUMNS, COL_COUNTRY};

const NO_DATA_MESSAGE: &str = "No data for the current selection";

/// Title of a ranked bar chart, e.g. `"Population for Asia in 1952"`.
pub fn bar_title(metric: Metric, continent: Continent, year: i32) -> String {
    format!("{metric} for {continent} in {year}")
}

/// Title of the map, e.g. `"Life Expectancy Choropleth Map [2007]"`.
pub fn map_title(metric: Metric, year: i32) -> String {
    format!("{metric} Choropleth Map [{year}]")
}

/// Short human label for a bar value.
pub fn format_value(metric: Metric, value: f64) -> String {
    match metric {
        Metric::Population => {
            let abs = value.abs();
            if abs >= 1e9 {
                format!("{:.2}B", value / 1e9)
            } else if abs >= 1e6 {
                format!("{:.2}M", value / 1e6)
            } else if abs >= 1e3 {
                format!("{:.1}k", value / 1e3)
            } else {
                format!("{value:.0}")
            }
        }
        Metric::GdpPerCapita => format!("{value:.0}"),
        Metric::LifeExpectancy => format!("{value:.1}"),
    }
}

fn no_data(kind: ChartKind, title: String) -> ChartSpec {
    ChartSpec::NoData(NoDataSpec {
        kind,
        title,
        message: NO_DATA_MESSAGE.to_string(),
    })
}

/// One bar per row, in the order given, coloured per country.
pub fn build_ranked_bar_chart(rows: &[Row], metric: Metric, title: String) -> ChartSpec {
    if rows.is_empty() {
        return no_data(ChartKind::RankedBar, title);
    }

    let colors = CategoryColors::new(rows.iter().map(|r| r.country.as_str()));
    let bars = rows
        .iter()
        .map(|r| {
            let value = metric.value(r);
            Bar {
                category: r.country.clone(),
                value,
                color: colors.color_for(&r.country),
                label: format_value(metric, value),
            }
        })
        .collect();

    ChartSpec::RankedBar(BarChartSpec {
        title,
        category_axis: COL_COUNTRY.to_string(),
        metric,
        bars,
    })
}

/// One region per row keyed by ISO-3 code, coloured on the RdYlBu scale.
pub fn build_choropleth(rows: &[Row], metric: Metric, year: i32) -> ChartSpec {
    let title = map_title(metric, year);
    if rows.is_empty() {
        return no_data(ChartKind::Choropleth, title);
    }

    let (min, max) = rows
        .iter()
        .map(|r| metric.value(r))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let scale = DivergingScale::RdYlBu;

    let regions = rows
        .iter()
        .map(|r| {
            let value = metric.value(r);
            Region {
                iso_alpha: r.iso_alpha.clone(),
                country: r.country.clone(),
                value,
                color: scale.color_for(value, min, max),
            }
        })
        .collect();

    ChartSpec::Choropleth(ChoroplethSpec {
        title,
        metric,
        year,
        location_mode: "ISO-3",
        scale,
        color_domain: (min, max),
        hover_fields: vec![COL_COUNTRY.to_string(), metric.column().to_string()],
        regions,
    })
}

/// Every row of `dataset`, columns in schema order.
pub fn build_table(dataset: &Dataset) -> ChartSpec {
    if dataset.is_empty() {
        return no_data(ChartKind::Table, String::new());
    }
    ChartSpec::Table(TableSpec {
        columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows: dataset.rows().iter().map(|r| r.cells().to_vec()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::row;

    fn asia_rows() -> Vec<Row> {
        vec![
            row("India", Continent::Asia, 1952, 1200, 500.0, 37.0),
            row("Japan", Continent::Asia, 1952, 500, 3200.0, 63.0),
            row("Nepal", Continent::Asia, 1952, 300, 540.0, 36.0),
        ]
    }

    #[test]
    fn bar_chart_keeps_row_order() {
        let mut rows = asia_rows();
        rows.reverse();
        let spec = build_ranked_bar_chart(&rows, Metric::Population, bar_title(Metric::Population, Continent::Asia, 1952));
        let ChartSpec::RankedBar(bar) = spec else {
            panic!("expected a bar chart");
        };
        let names: Vec<&str> = bar.bars.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(names, vec!["Nepal", "Japan", "India"]);
        assert_eq!(bar.title, "Population for Asia in 1952");
        assert_eq!(bar.category_axis, "Country");
        assert_eq!(bar.bars[2].value, 1200.0);
    }

    #[test]
    fn bar_colours_are_distinct_per_country() {
        let spec = build_ranked_bar_chart(&asia_rows(), Metric::GdpPerCapita, String::from("t"));
        let ChartSpec::RankedBar(bar) = spec else {
            panic!("expected a bar chart");
        };
        assert_ne!(bar.bars[0].color, bar.bars[1].color);
        assert_ne!(bar.bars[1].color, bar.bars[2].color);
    }

    #[test]
    fn empty_rows_give_no_data_specs() {
        let bar = build_ranked_bar_chart(&[], Metric::Population, "Population for Oceania in 1952".into());
        assert!(bar.is_empty());
        assert_eq!(bar.kind(), ChartKind::RankedBar);
        assert_eq!(bar.title(), "Population for Oceania in 1952");

        let map = build_choropleth(&[], Metric::LifeExpectancy, 1800);
        assert!(map.is_empty());
        assert_eq!(map.kind(), ChartKind::Choropleth);

        let table = build_table(&Dataset::from_rows(Vec::new()).unwrap());
        assert!(table.is_empty());
    }

    #[test]
    fn choropleth_keys_regions_by_iso_code() {
        let spec = build_choropleth(&asia_rows(), Metric::LifeExpectancy, 1952);
        let ChartSpec::Choropleth(map) = spec else {
            panic!("expected a choropleth");
        };
        assert_eq!(map.title, "Life Expectancy Choropleth Map [1952]");
        assert_eq!(map.location_mode, "ISO-3");
        assert_eq!(map.scale, DivergingScale::RdYlBu);
        assert_eq!(map.color_domain, (36.0, 63.0));
        assert_eq!(map.regions.len(), 3);
        assert_eq!(map.regions[0].iso_alpha, "IND");
        // lowest value at the red end, highest at the blue end
        assert_eq!(map.regions[2].color, DivergingScale::RdYlBu.sample(0.0));
        assert_eq!(map.regions[1].color, DivergingScale::RdYlBu.sample(1.0));
        assert_eq!(map.hover_fields, vec!["Country", "Life Expectancy"]);
    }

    #[test]
    fn table_has_all_columns_in_schema_order() {
        let ds = Dataset::from_rows(asia_rows()).unwrap();
        let ChartSpec::Table(table) = build_table(&ds) else {
            panic!("expected a table");
        };
        assert_eq!(table.columns, COLUMNS.to_vec());
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0][0], "India");
        assert_eq!(table.rows[0][1], "Asia");
        assert_eq!(table.rows[0][6], "IND");
    }

    #[test]
    fn value_labels_are_compact() {
        assert_eq!(format_value(Metric::Population, 1_318_683_096.0), "1.32B");
        assert_eq!(format_value(Metric::Population, 8_425_333.0), "8.43M");
        assert_eq!(format_value(Metric::LifeExpectancy, 43.828), "43.8");
    }

    #[test]
    fn specs_serialize_with_a_type_tag() {
        let json = build_choropleth(&asia_rows(), Metric::Population, 1952).to_json().unwrap();
        assert!(json.contains("\"type\": \"choropleth\""));
        assert!(json.contains("\"ISO-3\""));
    }
}
