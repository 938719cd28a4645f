use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

// Standard cut-offs for each indicator.

fn fcs_category(score: f64) -> &'static str {
    if score > 35.0 {
        "Acceptable"
    } else if score > 21.0 {
        "Borderline"
    } else {
        "Poor"
    }
}

fn rcsi_category(score: f64) -> &'static str {
    match score as u32 {
        0..=3 => "None",
        4..=18 => "Stressed",
        _ => "Crisis +",
    }
}

fn hhs_category(score: f64) -> &'static str {
    match score as u32 {
        0 => "None",
        1 => "Stressed",
        2..=3 => "Crisis",
        4 => "Emergency",
        _ => "Catastrophe",
    }
}

fn lcs_category(severity: f64) -> &'static str {
    match severity {
        s if s < 0.25 => "None",
        s if s < 0.5 => "Stressed",
        s if s < 0.75 => "Crisis",
        _ => "Emergency",
    }
}

#[derive(Default)]
struct Columns {
    user_id: Vec<String>,
    obs_date: Vec<String>,
    region: Vec<String>,
    district: Vec<String>,
    location: Vec<String>,
    zone: Vec<String>,
    year: Vec<f64>,
    month: Vec<i64>,
    fcs: Vec<f64>,
    fcs_cat: Vec<&'static str>,
    rcsi: Vec<f64>,
    rcsi_cat: Vec<&'static str>,
    hhs: Vec<f64>,
    hhs_cat: Vec<Option<&'static str>>,
    lcs_cat: Vec<&'static str>,
}

fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "FS_indicators.parquet".to_string());
    let mut rng = SimpleRng::new(42);

    // (region, districts, baseline severity 0..1)
    let regions: [(&str, &[&str], f64); 4] = [
        ("Central", &["Central-01", "Central-02", "Central-03"], 0.25),
        ("Eastern", &["Eastern-01", "Eastern-02"], 0.45),
        ("Northern", &["Northern-01", "Northern-02", "Northern-03", "Northern-04"], 0.65),
        ("Western", &["Western-01", "Western-02"], 0.35),
    ];
    let locations = ["Urban", "Rural", "Camp"];
    let zones = ["Agro-pastoral", "Pastoral", "Riverine", "Urban"];

    let mut cols = Columns::default();
    let mut user_id: u64 = 1000;

    for year in 2020..=2023 {
        for month in 1..=12i64 {
            // Lean season peaks mid-year.
            let seasonal = 0.15 * (std::f64::consts::PI * (month as f64 - 1.0) / 11.0).sin();
            for &(region, districts, baseline) in &regions {
                // The northern surveys only started in 2021.
                if region == "Northern" && year == 2020 {
                    continue;
                }
                for &district in districts {
                    for _ in 0..8 {
                        let severity =
                            (baseline + seasonal + rng.gauss(0.0, 0.15)).clamp(0.0, 1.0);

                        let fcs = (75.0 - 60.0 * severity + rng.gauss(0.0, 8.0)).clamp(0.0, 112.0);
                        let rcsi = (40.0 * severity + rng.gauss(0.0, 4.0)).clamp(0.0, 56.0).round();
                        let hhs = (6.0 * severity + rng.gauss(0.0, 0.8)).clamp(0.0, 6.0).round();

                        user_id += 1;
                        cols.user_id.push(user_id.to_string());
                        let day = 1 + rng.next_u64() % 28;
                        cols.obs_date.push(format!("{year}-{month:02}-{day:02}"));
                        cols.region.push(region.to_string());
                        cols.district.push(district.to_string());
                        cols.location.push(rng.pick(&locations).to_string());
                        cols.zone.push(rng.pick(&zones).to_string());
                        cols.year.push(year as f64);
                        cols.month.push(month);
                        cols.fcs.push(fcs);
                        cols.fcs_cat.push(fcs_category(fcs));
                        cols.rcsi.push(rcsi);
                        cols.rcsi_cat.push(rcsi_category(rcsi));
                        cols.hhs.push(hhs);
                        // A few HHS modules were skipped in the field.
                        cols.hhs_cat
                            .push((rng.next_f64() > 0.03).then(|| hhs_category(hhs)));
                        cols.lcs_cat.push(lcs_category(
                            (severity + rng.gauss(0.0, 0.1)).clamp(0.0, 1.0),
                        ));
                    }
                }
            }
        }
    }

    let households = cols.user_id.len();
    let text = |values: Vec<String>| -> ArrayRef { Arc::new(StringArray::from(values)) };
    let labels = |values: Vec<&str>| -> ArrayRef { Arc::new(StringArray::from(values)) };
    let floats = |values: Vec<f64>| -> ArrayRef { Arc::new(Float64Array::from(values)) };

    // Year is stored as a float, the way SPSS exports it.
    let columns: Vec<(&str, ArrayRef)> = vec![
        ("UserId", text(cols.user_id)),
        ("ObsDate", text(cols.obs_date)),
        ("ADMIN1Name", text(cols.region)),
        ("ADM2", text(cols.district)),
        ("Location", text(cols.location)),
        ("Main_livelihood_zone", text(cols.zone)),
        ("Year", floats(cols.year)),
        ("Month", Arc::new(Int64Array::from(cols.month)) as ArrayRef),
        ("FCS", floats(cols.fcs)),
        ("FCSCat28", labels(cols.fcs_cat)),
        ("rCSI", floats(cols.rcsi)),
        ("rCSI_cat", labels(cols.rcsi_cat)),
        ("HHS", floats(cols.hhs)),
        ("HHS_IPC", Arc::new(StringArray::from(cols.hhs_cat)) as ArrayRef),
        ("Max_coping_behaviour", labels(cols.lcs_cat)),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, arr)| Field::new(*name, arr.data_type().clone(), arr.null_count() > 0))
            .collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(
        schema.clone(),
        columns.into_iter().map(|(_, arr)| arr).collect(),
    )
    .context("building record batch")?;

    // Write Parquet
    let file = std::fs::File::create(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;

    log::info!("wrote {households} households to {output_path}");
    println!("Wrote {households} households (2020–2023) to {output_path}");
    Ok(())
}
