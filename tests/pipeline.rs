use std::collections::BTreeMap;

use gapminder_dash::binder::{compute_slots, ChartSlot, ReactiveBinder};
use gapminder_dash::chart::builders::{bar_title, build_ranked_bar_chart};
use gapminder_dash::chart::ChartSpec;
use gapminder_dash::controls::{SelectorChange, SelectorDefaults};
use gapminder_dash::data::loader::DataSource;
use gapminder_dash::data::model::{Continent, Dataset, Metric, Row};
use gapminder_dash::data::query::{filter_by_continent_year, top_n_by_metric};
use gapminder_dash::data::store::{DatasetStore, OutlierPolicy};
use gapminder_dash::error::DashboardError;

fn obs(country: &str, iso: &str, continent: Continent, year: i32, population: u64) -> Row {
    Row {
        country: country.to_string(),
        continent,
        year,
        population,
        gdp_per_capita: 1000.0,
        life_expectancy: 50.0,
        iso_alpha: iso.to_string(),
    }
}

fn small_store() -> DatasetStore {
    let rows = vec![
        obs("Japan", "JPN", Continent::Asia, 1952, 500),
        obs("Nepal", "NPL", Continent::Asia, 1952, 300),
        obs("India", "IND", Continent::Asia, 1952, 1200),
        obs("Chile", "CHL", Continent::Americas, 1952, 700),
        obs("Japan", "JPN", Continent::Asia, 1957, 520),
    ];
    let dataset = Dataset::from_rows(rows).unwrap();
    DatasetStore::from_dataset(DataSource::Sample, dataset, OutlierPolicy::Off, &Metric::ALL)
}

#[test]
fn asia_1952_top_two_by_population() {
    let store = small_store();
    let rows = filter_by_continent_year(store.raw(), Continent::Asia, 1952);
    let top = top_n_by_metric(&rows, Metric::Population, 2);
    let pops: Vec<u64> = top.iter().map(|r| r.population).collect();
    assert_eq!(pops, vec![1200, 500]);

    let spec = build_ranked_bar_chart(&top, Metric::Population, bar_title(Metric::Population, Continent::Asia, 1952));
    let ChartSpec::RankedBar(bar) = spec else {
        panic!("expected a bar chart");
    };
    assert_eq!(bar.bars.len(), 2);
    assert_eq!(bar.bars[0].category, "India");
}

#[test]
fn year_change_updates_dependents_and_keeps_metric() {
    let mut binder = ReactiveBinder::new(
        small_store(),
        SelectorDefaults {
            continent: Some(Continent::Asia),
            year: Some(1952),
            metric: Some(Metric::GdpPerCapita),
        },
        15,
    )
    .unwrap();
    let table_before = binder.chart(ChartSlot::Table).cloned();

    let mut shown: BTreeMap<ChartSlot, ChartSpec> = BTreeMap::new();
    let outcomes = binder.dispatch(SelectorChange::Year(1957), &mut shown);
    assert!(outcomes.iter().all(Result::is_ok));
    assert_eq!(binder.selectors().metric, Metric::GdpPerCapita);
    assert_eq!(
        shown.keys().copied().collect::<Vec<_>>(),
        vec![
            ChartSlot::Population,
            ChartSlot::GdpPerCapita,
            ChartSlot::LifeExpectancy,
            ChartSlot::Map
        ]
    );
    assert_eq!(binder.chart(ChartSlot::Table).cloned(), table_before);

    // Every chart equals a fresh computation from the same inputs.
    let fresh = compute_slots(binder.store(), binder.selectors(), 15, &ChartSlot::ALL);
    assert_eq!(binder.charts(), &fresh);
}

#[test]
fn empty_selection_renders_no_data() {
    let mut binder = ReactiveBinder::new(
        small_store(),
        SelectorDefaults {
            continent: Some(Continent::Americas),
            year: Some(1957),
            metric: None,
        },
        15,
    )
    .unwrap();
    let population = binder.chart(ChartSlot::Population).unwrap();
    assert!(population.is_empty());
    assert_eq!(population.title(), "Population for Americas in 1957");
    assert!(!binder.chart(ChartSlot::Map).unwrap().is_empty());

    let mut shown: BTreeMap<ChartSlot, ChartSpec> = BTreeMap::new();
    binder.dispatch(SelectorChange::Year(1952), &mut shown);
    assert!(!shown[&ChartSlot::Population].is_empty());
}

#[test]
fn bad_default_and_missing_source_are_fatal() {
    let err = ReactiveBinder::new(
        small_store(),
        SelectorDefaults {
            continent: Some(Continent::Oceania),
            ..Default::default()
        },
        15,
    )
    .err()
    .unwrap();
    assert!(matches!(err, DashboardError::InvalidDefaultSelector { .. }));
    assert!(!err.is_recoverable());

    let err = DatasetStore::open(
        DataSource::File("/missing/gapminder.csv".into()),
        OutlierPolicy::Charts,
        &Metric::ALL,
    )
    .unwrap_err();
    assert!(matches!(err, DashboardError::DataUnavailable { .. }));
}
