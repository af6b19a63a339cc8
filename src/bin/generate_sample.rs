use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use clap::{Parser, ValueEnum};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Parquet,
}

/// Write a synthetic dataset shaped like the OWID COVID-19 export.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Args {
    #[arg(long, default_value = "owid-covid-data.csv")]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// (iso_code, continent, location, population, wave peaks as (day, height, width))
type Country = (&'static str, &'static str, &'static str, i64, [(f64, f64, f64); 3]);

const COUNTRIES: [Country; 8] = [
    ("IRL", "Europe", "Ireland", 5_023_108, [(300.0, 6000.0, 25.0), (520.0, 2500.0, 40.0), (660.0, 20000.0, 20.0)]),
    ("FRA", "Europe", "France", 67_422_000, [(240.0, 45000.0, 30.0), (400.0, 35000.0, 35.0), (670.0, 300000.0, 20.0)]),
    ("DEU", "Europe", "Germany", 83_408_554, [(290.0, 25000.0, 30.0), (410.0, 20000.0, 30.0), (640.0, 80000.0, 30.0)]),
    ("ESP", "Europe", "Spain", 47_486_727, [(250.0, 20000.0, 25.0), (320.0, 35000.0, 20.0), (665.0, 120000.0, 18.0)]),
    ("USA", "North America", "United States", 336_997_624, [(130.0, 60000.0, 30.0), (310.0, 250000.0, 35.0), (680.0, 800000.0, 20.0)]),
    ("BRA", "South America", "Brazil", 214_326_223, [(150.0, 40000.0, 45.0), (440.0, 75000.0, 40.0), (700.0, 180000.0, 18.0)]),
    ("IND", "Asia", "India", 1_407_563_842, [(200.0, 90000.0, 35.0), (430.0, 380000.0, 18.0), (690.0, 300000.0, 15.0)]),
    ("ZAF", "Africa", "South Africa", 59_392_255, [(140.0, 12000.0, 20.0), (300.0, 18000.0, 20.0), (640.0, 22000.0, 15.0)]),
];

/// Days before the first reported figure, per country.
const REPORTING_LAG_DAYS: usize = 5;

#[derive(Serialize)]
struct Row {
    iso_code: &'static str,
    continent: &'static str,
    location: &'static str,
    date: String,
    total_cases: Option<f64>,
    new_cases: Option<f64>,
    total_deaths: Option<f64>,
    new_deaths: Option<f64>,
    population: i64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let first = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap_or_default();
    let last = NaiveDate::from_ymd_opt(2022, 2, 28).unwrap_or_default();
    let days = (last - first).num_days() as usize + 1;

    let mut rows = Vec::with_capacity(days * COUNTRIES.len());
    for &(iso_code, continent, location, population, waves) in &COUNTRIES {
        let mut total_cases = 0.0;
        let mut total_deaths = 0.0;
        let mut recent_cases = [0.0f64; 14];

        for day in 0..days {
            let date = (first + Duration::days(day as i64)).format("%Y-%m-%d").to_string();
            let t = day as f64;

            let expected: f64 = waves.iter().map(|&(mu, h, w)| gaussian(t, mu, w, h)).sum();
            let new_cases = (expected * (1.0 + rng.gauss(0.0, 0.15))).max(0.0).round();
            let lagged = recent_cases[day % recent_cases.len()];
            let new_deaths = (lagged * 0.012 * (1.0 + rng.gauss(0.0, 0.2))).max(0.0).round();
            recent_cases[day % recent_cases.len()] = new_cases;

            total_cases += new_cases;
            total_deaths += new_deaths;

            let reported = day >= REPORTING_LAG_DAYS;
            rows.push(Row {
                iso_code,
                continent,
                location,
                date,
                total_cases: reported.then_some(total_cases),
                new_cases: reported.then_some(new_cases),
                total_deaths: reported.then_some(total_deaths),
                new_deaths: reported.then_some(new_deaths),
                population,
            });
        }
    }
    rows
}

fn write_csv(rows: &[Row], out: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(out).with_context(|| format!("creating {}", out.display()))?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(rows: &[Row], out: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("iso_code", DataType::Utf8, false),
        Field::new("continent", DataType::Utf8, false),
        Field::new("location", DataType::Utf8, false),
        Field::new("date", DataType::Utf8, false),
        Field::new("total_cases", DataType::Float64, true),
        Field::new("new_cases", DataType::Float64, true),
        Field::new("total_deaths", DataType::Float64, true),
        Field::new("new_deaths", DataType::Float64, true),
        Field::new("population", DataType::Int64, false),
    ]));

    let text = |values: Vec<&str>| Arc::new(StringArray::from(values)) as ArrayRef;
    let number = |values: Vec<Option<f64>>| Arc::new(Float64Array::from(values)) as ArrayRef;

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text(rows.iter().map(|r| r.iso_code).collect()),
            text(rows.iter().map(|r| r.continent).collect()),
            text(rows.iter().map(|r| r.location).collect()),
            text(rows.iter().map(|r| r.date.as_str()).collect()),
            number(rows.iter().map(|r| r.total_cases).collect()),
            number(rows.iter().map(|r| r.new_cases).collect()),
            number(rows.iter().map(|r| r.total_deaths).collect()),
            number(rows.iter().map(|r| r.new_deaths).collect()),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.population))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(out).with_context(|| format!("creating {}", out.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating Parquet writer")?;
    writer.write(&batch).context("writing Parquet batch")?;
    writer.close().context("closing Parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let rows = generate(&mut rng);

    match args.format {
        OutputFormat::Csv => write_csv(&rows, &args.out)?,
        OutputFormat::Parquet => write_parquet(&rows, &args.out)?,
    }

    println!(
        "Wrote {} rows for {} countries to {}",
        rows.len(),
        COUNTRIES.len(),
        args.out.display()
    );
    Ok(())
}
