use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// (country, continent, ISO-3, population 1952, GDP per capita 1952, life expectancy 1952)
const COUNTRIES: &[(&str, &str, &str, f64, f64, f64)] = &[
    ("Aldoria", "Africa", "ALD", 9.0e6, 900.0, 38.0),
    ("Baruma", "Africa", "BAR", 21.0e6, 450.0, 35.0),
    ("Cendra", "Africa", "CEN", 3.5e6, 2100.0, 44.0),
    ("Dovania", "Americas", "DOV", 14.0e6, 5200.0, 58.0),
    ("Estrela", "Americas", "EST", 40.0e6, 2400.0, 50.0),
    ("Fjordhavn", "Europe", "FJO", 4.2e6, 9000.0, 71.0),
    ("Galvia", "Europe", "GAL", 33.0e6, 5600.0, 65.0),
    ("Harnland", "Europe", "HAR", 61.0e6, 7400.0, 68.0),
    ("Isora", "Asia", "ISO", 120.0e6, 700.0, 41.0),
    ("Jintai", "Asia", "JIN", 300.0e6, 420.0, 43.0),
    ("Kesh", "Asia", "KES", 6.0e6, 1800.0, 47.0),
    ("Lumeria", "Oceania", "LUM", 7.5e6, 9800.0, 69.0),
    ("Marovia", "Oceania", "MAR", 1.8e6, 8700.0, 68.5),
];

/// `mean + std_dev * z` for a standard-normal draw `z`.
fn gauss(rng: &mut StdRng, noise: &Normal<f64>, mean: f64, std_dev: f64) -> f64 {
    mean + std_dev * noise.sample(rng)
}

fn main() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0, 1.0).context("building noise distribution")?;
    let years: Vec<i32> = (1952..=2007).step_by(5).collect();

    let mut all_country = Vec::new();
    let mut all_continent = Vec::new();
    let mut all_year = Vec::new();
    let mut all_pop = Vec::new();
    let mut all_gdp = Vec::new();
    let mut all_life = Vec::new();
    let mut all_iso = Vec::new();

    for &(country, continent, iso, pop0, gdp0, life0) in COUNTRIES {
        let pop_growth = gauss(&mut rng, &noise, 0.018, 0.006);
        let gdp_growth = gauss(&mut rng, &noise, 0.022, 0.010);
        let life_gain = gauss(&mut rng, &noise, 0.30, 0.08);

        for (step, &year) in years.iter().enumerate() {
            let t = (step * 5) as f64;
            let pop = pop0 * (pop_growth * t).exp() * (1.0 + gauss(&mut rng, &noise, 0.0, 0.01));
            let gdp = gdp0 * (gdp_growth * t).exp() * (1.0 + gauss(&mut rng, &noise, 0.0, 0.04));
            let life = (life0 + life_gain * t + gauss(&mut rng, &noise, 0.0, 0.6)).clamp(20.0, 90.0);

            all_country.push(country);
            all_continent.push(continent);
            all_year.push(year);
            all_pop.push(pop.max(0.0).round() as i64);
            all_gdp.push(gdp.max(0.0));
            all_life.push(life);
            all_iso.push(iso);
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("Country", DataType::Utf8, false),
        Field::new("Continent", DataType::Utf8, false),
        Field::new("Year", DataType::Int32, false),
        Field::new("Population", DataType::Int64, false),
        Field::new("GDP per Capita", DataType::Float64, false),
        Field::new("Life Expectancy", DataType::Float64, false),
        Field::new("ISO Alpha Country Code", DataType::Utf8, false),
    ]));

    let n_rows = all_year.len();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(all_country)),
            Arc::new(StringArray::from(all_continent)),
            Arc::new(Int32Array::from(all_year)),
            Arc::new(Int64Array::from(all_pop)),
            Arc::new(Float64Array::from(all_gdp)),
            Arc::new(Float64Array::from(all_life)),
            Arc::new(StringArray::from(all_iso)),
        ],
    )
    .context("building record batch")?;

    // Write Parquet
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_gapminder.parquet".to_string());
    let file = std::fs::File::create(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    println!(
        "Wrote {n_rows} rows ({} countries x {} years) to {output_path}",
        COUNTRIES.len(),
        years.len()
    );
    Ok(())
}
