use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use parquet::arrow::ArrowWriter;

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
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
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

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

struct Sale {
    date: NaiveDateTime,
    country: Option<&'static str>,
    customer: String,
    product: &'static str,
    quantity: i64,
    total: f64,
}

const COUNTRIES: &[&str] = &["United Kingdom", "France", "Germany", "Spain", "Australia", "USA"];

const PRODUCTS: &[(&str, f64)] = &[
    ("WHITE HANGING HEART T-LIGHT HOLDER", 2.55),
    ("REGENCY CAKESTAND 3 TIER", 12.75),
    ("JUMBO BAG RED RETROSPOT", 1.95),
    ("PARTY BUNTING", 4.95),
    ("LUNCH BAG RED RETROSPOT", 1.65),
    ("ASSORTED COLOUR BIRD ORNAMENT", 1.69),
    ("SET OF 3 CAKE TINS PANTRY DESIGN", 4.95),
    ("PACK OF 72 RETROSPOT CAKE CASES", 0.55),
];

fn generate(rows: usize, rng: &mut SimpleRng) -> Vec<Sale> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .expect("valid start date");
    let customers: Vec<String> = (0..120).map(|i| (12_346 + i * 7).to_string()).collect();

    (0..rows)
        .map(|i| {
            let date = start
                + Duration::days(rng.below(730) as i64)
                + Duration::minutes(rng.below(10 * 60) as i64);
            let (product, unit_price) = *rng.pick(PRODUCTS);
            let quantity = 1 + rng.below(24) as i64;
            // Every 50th row lacks a country, like exports with incomplete addresses.
            let country = (i % 50 != 49).then(|| *rng.pick(COUNTRIES));
            Sale {
                date,
                country,
                customer: rng.pick(&customers).clone(),
                product,
                quantity,
                total: (quantity as f64 * unit_price * 100.0).round() / 100.0,
            }
        })
        .collect()
}

fn write_csv(path: &str, sales: &[Sale]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["Date", "Pais", "IdCliente", "Descripcion", "Cantidad", "Total"])?;
    for s in sales {
        writer.write_record([
            s.date.format("%Y-%m-%d %H:%M:%S").to_string(),
            s.country.unwrap_or_default().to_string(),
            s.customer.clone(),
            s.product.to_string(),
            s.quantity.to_string(),
            format!("{:.2}", s.total),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &str, sales: &[Sale]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Date", DataType::Timestamp(TimeUnit::Millisecond, None), false),
        Field::new("Pais", DataType::Utf8, true),
        Field::new("IdCliente", DataType::Utf8, false),
        Field::new("Descripcion", DataType::Utf8, false),
        Field::new("Cantidad", DataType::Int64, false),
        Field::new("Total", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(TimestampMillisecondArray::from(
                sales
                    .iter()
                    .map(|s| s.date.and_utc().timestamp_millis())
                    .collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                sales.iter().map(|s| s.country).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                sales.iter().map(|s| s.customer.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                sales.iter().map(|s| s.product).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                sales.iter().map(|s| s.quantity).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                sales.iter().map(|s| s.total).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let rows: usize = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("row count must be a number, got '{arg}'"))?,
        None => 2_000,
    };

    let mut rng = SimpleRng::new(42);
    let sales = generate(rows, &mut rng);

    write_csv("sample_ventas.csv", &sales)?;
    write_parquet("sample_ventas.parquet", &sales)?;

    println!("Wrote {rows} sales to sample_ventas.csv and sample_ventas.parquet");
    Ok(())
}
