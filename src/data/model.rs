use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column names of the source table
// ---------------------------------------------------------------------------

pub const COL_COUNTRY: &str = "Country";
pub const COL_CONTINENT: &str = "Continent";
pub const COL_YEAR: &str = "Year";
pub const COL_POPULATION: &str = "Population";
pub const COL_GDP_PER_CAPITA: &str = "GDP per Capita";
pub const COL_LIFE_EXPECTANCY: &str = "Life Expectancy";
pub const COL_ISO_ALPHA: &str = "ISO Alpha Country Code";

/// All columns in schema order. The data table uses this order too.
pub const COLUMNS: [&str; 7] = [
    COL_COUNTRY,
    COL_CONTINENT,
    COL_YEAR,
    COL_POPULATION,
    COL_GDP_PER_CAPITA,
    COL_LIFE_EXPECTANCY,
    COL_ISO_ALPHA,
];

// ---------------------------------------------------------------------------
// Continent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Continent {
    Africa,
    Americas,
    Asia,
    Europe,
    Oceania,
}

impl Continent {
    /// Alphabetical order, which is also the `Ord` order.
    pub const ALL: [Continent; 5] = [
        Continent::Africa,
        Continent::Americas,
        Continent::Asia,
        Continent::Europe,
        Continent::Oceania,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Americas => "Americas",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::Oceania => "Oceania",
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Continent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Continent::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("unknown continent '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// The numeric columns a chart can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "Population")]
    Population,
    #[serde(rename = "GDP per Capita")]
    GdpPerCapita,
    #[serde(rename = "Life Expectancy")]
    LifeExpectancy,
}

impl Metric {
    pub const ALL: [Metric; 3] = [
        Metric::Population,
        Metric::GdpPerCapita,
        Metric::LifeExpectancy,
    ];

    /// Column name in the source table; also used as the chart label.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Population => COL_POPULATION,
            Metric::GdpPerCapita => COL_GDP_PER_CAPITA,
            Metric::LifeExpectancy => COL_LIFE_EXPECTANCY,
        }
    }

    /// Read this metric from a row.
    pub fn value(&self, row: &Row) -> f64 {
        match self {
            Metric::Population => row.population as f64,
            Metric::GdpPerCapita => row.gdp_per_capita,
            Metric::LifeExpectancy => row.life_expectancy,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Metric::ALL
            .iter()
            .copied()
            .find(|m| {
                m.column().eq_ignore_ascii_case(wanted)
                    || format!("{m:?}").eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| anyhow::anyhow!("unknown metric '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Row – one country-year observation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Continent")]
    pub continent: Continent,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Population")]
    pub population: u64,
    #[serde(rename = "GDP per Capita")]
    pub gdp_per_capita: f64,
    #[serde(rename = "Life Expectancy")]
    pub life_expectancy: f64,
    #[serde(rename = "ISO Alpha Country Code")]
    pub iso_alpha: String,
}

impl Row {
    /// Check the value bounds a loaded row must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.country.trim().is_empty() {
            bail!("empty country name");
        }
        if !(self.gdp_per_capita.is_finite() && self.gdp_per_capita >= 0.0) {
            bail!(
                "{}: GDP per capita {} must be finite and >= 0",
                self.country,
                self.gdp_per_capita
            );
        }
        if !(self.life_expectancy.is_finite() && (0.0..=100.0).contains(&self.life_expectancy)) {
            bail!(
                "{}: life expectancy {} must lie in [0, 100]",
                self.country,
                self.life_expectancy
            );
        }
        if self.iso_alpha.len() != 3 || !self.iso_alpha.bytes().all(|b| b.is_ascii_uppercase()) {
            bail!(
                "{}: '{}' is not an ISO-3 country code",
                self.country,
                self.iso_alpha
            );
        }
        Ok(())
    }

    /// Cell texts in [`COLUMNS`] order.
    pub fn cells(&self) -> [String; 7] {
        [
            self.country.clone(),
            self.continent.to_string(),
            self.year.to_string(),
            self.population.to_string(),
            format!("{:.4}", self.gdp_per_capita),
            format!("{:.3}", self.life_expectancy),
            self.iso_alpha.clone(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Domain – the selector values present in a dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Domain {
    pub continents: BTreeSet<Continent>,
    pub years: BTreeSet<i32>,
}

impl Domain {
    pub fn contains_continent(&self, continent: Continent) -> bool {
        self.continents.contains(&continent)
    }

    pub fn contains_year(&self, year: i32) -> bool {
        self.years.contains(&year)
    }

    /// Nearest present year; ties go to the earlier year.
    pub fn nearest_year(&self, year: i32) -> Option<i32> {
        self.years
            .iter()
            .copied()
            .min_by_key(|y| ((*y as i64 - year as i64).abs(), *y))
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Ordered, immutable sequence of rows with its pre-computed domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    rows: Vec<Row>,
    domain: Domain,
}

impl Dataset {
    /// Validate the rows and build the domain index.
    pub fn from_rows(rows: Vec<Row>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            row.validate()
                .map_err(|e| anyhow::anyhow!("row {i}: {e}"))?;
        }
        Ok(Self::from_validated(rows))
    }

    /// Build from rows already known to be valid, e.g. a subset of a dataset.
    pub(crate) fn from_validated(rows: Vec<Row>) -> Self {
        let mut domain = Domain::default();
        for row in &rows {
            domain.continents.insert(row.continent);
            domain.years.insert(row.year);
        }
        Dataset { rows, domain }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn row(country: &str, continent: Continent, year: i32, pop: u64, gdp: f64, le: f64) -> Row {
        let iso: String = country
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .chain("XXX".chars())
            .take(3)
            .collect::<String>()
            .to_ascii_uppercase();
        Row {
            country: country.to_string(),
            continent,
            year,
            population: pop,
            gdp_per_capita: gdp,
            life_expectancy: le,
            iso_alpha: iso,
        }
    }

    #[test]
    fn continent_parses_case_insensitively() {
        assert_eq!("asia".parse::<Continent>().unwrap(), Continent::Asia);
        assert_eq!(" Europe ".parse::<Continent>().unwrap(), Continent::Europe);
        assert!("Atlantis".parse::<Continent>().is_err());
    }

    #[test]
    fn metric_parses_column_and_variant_names() {
        assert_eq!("GDP per Capita".parse::<Metric>().unwrap(), Metric::GdpPerCapita);
        assert_eq!("lifeexpectancy".parse::<Metric>().unwrap(), Metric::LifeExpectancy);
        assert!("Area".parse::<Metric>().is_err());
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let mut r = row("Chile", Continent::Americas, 1952, 10, 1.0, 50.0);
        assert!(r.validate().is_ok());

        r.life_expectancy = 120.0;
        assert!(r.validate().is_err());

        r.life_expectancy = 50.0;
        r.gdp_per_capita = f64::NAN;
        assert!(r.validate().is_err());

        r.gdp_per_capita = 1.0;
        r.iso_alpha = "cl".into();
        assert!(r.validate().is_err());
    }

    #[test]
    fn domain_collects_continents_and_years() {
        let ds = Dataset::from_rows(vec![
            row("Chile", Continent::Americas, 1957, 1, 1.0, 50.0),
            row("Chad", Continent::Africa, 1952, 1, 1.0, 40.0),
        ])
        .unwrap();
        assert_eq!(
            ds.domain().continents.iter().copied().collect::<Vec<_>>(),
            vec![Continent::Africa, Continent::Americas]
        );
        assert_eq!(ds.domain().nearest_year(1955), Some(1957));
        assert_eq!(ds.domain().nearest_year(1954), Some(1952));
        assert_eq!(ds.domain().nearest_year(1900), Some(1952));
    }
}
