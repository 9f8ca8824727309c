use anyhow::{Context, Result};
use serde::Serialize;

/// One synthetic survey response, serialized with the dashboard's column names.
#[derive(Debug, Serialize)]
struct SampleRow {
    #[serde(rename = "Skóli")]
    school: &'static str,
    #[serde(rename = "Ár")]
    year: i32,
    #[serde(rename = "Kyn")]
    gender: &'static str,
    #[serde(rename = "Bakgrunnur")]
    background: &'static str,
    #[serde(rename = "Fjárhagsstaða")]
    financial_status: &'static str,
    #[serde(rename = "Bekkur")]
    grade: u8,
    #[serde(rename = "Líðan")]
    wellbeing: Option<f64>,
    #[serde(rename = "Kvíði")]
    anxiety: Option<f64>,
    #[serde(rename = "Einmanaleiki")]
    loneliness: Option<f64>,
    #[serde(rename = "Skjástund")]
    screen_time: Option<f64>,
    #[serde(rename = "Tengsl við kennara")]
    teacher_relationship: Option<f64>,
    #[serde(rename = "Ánægja með skólann")]
    school_satisfaction: Option<f64>,
}

/// Seeded SplitMix64 stream; the same seed always writes the same file.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Normal draw via Box-Muller, sine branch discarded.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let radius = (-2.0 * (1.0 - self.next_f64()).ln()).sqrt();
        let angle = std::f64::consts::TAU * self.next_f64();
        mean + std_dev * radius * angle.cos()
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// A score on the 1–10 survey scale, blank about 2% of the time.
fn score(rng: &mut SampleRng, mean: f64) -> Option<f64> {
    if rng.next_f64() < 0.02 {
        return None;
    }
    let value = rng.normal(mean, 1.2).clamp(1.0, 10.0);
    Some((value * 10.0).round() / 10.0)
}

fn main() -> Result<()> {
    let mut rng = SampleRng(42);

    // (school, baseline offset) – offsets give each school its own profile.
    let schools = [
        ("Akurskóli", 0.4),
        ("Heiðarskóli", -0.2),
        ("Holtaskóli", 0.1),
        ("Myllubakkaskóli", -0.5),
        ("Njarðvíkurskóli", 0.3),
        ("Stapaskóli", 0.0),
    ];
    let years = [2021, 2022, 2023, 2024];
    let genders = ["Drengur", "Stúlka", "Kynsegin"];
    let backgrounds = ["Íslenskur", "Erlendur", "Blandaður"];
    let financial = ["Góð", "Miðlungs", "Slæm"];
    let grades = [5u8, 6, 7, 8, 9, 10];
    let students_per_year = 40;

    let output_path = "lidanargogn_sudurnes_gervi.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let mut rows = 0usize;
    for &(school, offset) in &schools {
        for (i, &year) in years.iter().enumerate() {
            // Screen time creeps up, wellbeing drifts down over the years.
            let drift = i as f64 * 0.15;
            for _ in 0..students_per_year {
                let financial_status = rng.pick(&financial);
                let hardship = if financial_status == "Slæm" { -0.6 } else { 0.0 };
                let row = SampleRow {
                    school,
                    year,
                    gender: rng.pick(&genders),
                    background: rng.pick(&backgrounds),
                    financial_status,
                    grade: rng.pick(&grades),
                    wellbeing: score(&mut rng, 7.0 + offset + hardship - drift),
                    anxiety: score(&mut rng, 4.0 - offset - hardship + drift),
                    loneliness: score(&mut rng, 3.5 - offset - hardship),
                    screen_time: score(&mut rng, 5.5 + 2.0 * drift),
                    teacher_relationship: score(&mut rng, 7.5 + offset),
                    school_satisfaction: score(&mut rng, 6.8 + offset - drift),
                };
                writer.serialize(&row).context("writing sample row")?;
                rows += 1;
            }
        }
    }
    writer.flush().context("flushing sample file")?;

    println!(
        "Wrote {rows} responses ({} schools, {} years) to {output_path}",
        schools.len(),
        years.len()
    );
    Ok(())
}
