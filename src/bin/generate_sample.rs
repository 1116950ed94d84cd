use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use serde_json::json;

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

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

const NAMES: [&str; 8] = ["Eros", "Ganymed", "Apollo", "Icarus", "Toutatis", "Bennu", "Apophis", "Didymos"];

const NEO_COUNT: usize = 200;
const APPROACH_COUNT: usize = 2000;

fn main() -> Result<()> {
    let out_dir = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| "data".into());
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    // ---- NEOs ----
    let neo_path = out_dir.join("neos.csv");
    let mut writer = csv::Writer::from_path(&neo_path).context("creating neos.csv")?;
    writer.write_record(["id", "pdes", "name", "pha", "diameter", "albedo"])?;

    let mut designations = Vec::with_capacity(NEO_COUNT);
    for i in 0..NEO_COUNT {
        let pdes = if i < NAMES.len() {
            format!("{}", 433 + i * 100)
        } else {
            format!("20{:02} {}{}", rng.below(25), (b'A' + rng.below(26) as u8) as char, i)
        };
        let name = NAMES.get(i).copied().unwrap_or("");
        // Roughly a third of the catalogue has a measured diameter.
        let diameter = if rng.next_f64() < 0.35 {
            format!("{:.3}", rng.range(0.01, 30.0))
        } else {
            String::new()
        };
        let pha = if rng.next_f64() < 0.1 { "Y" } else { "N" };

        writer.write_record([format!("a{i:07}"), pdes.clone(), name.to_string(), pha.to_string(), diameter, String::new()])?;
        designations.push(pdes);
    }
    writer.flush()?;

    // ---- Close approaches ----
    let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("building epoch")?;
    let mut minutes = 0i64;
    let mut data = Vec::with_capacity(APPROACH_COUNT);
    for _ in 0..APPROACH_COUNT {
        // Ordered by time, like the real export.
        minutes += rng.below(60 * 24 * 30) as i64;
        let time = epoch + Duration::minutes(minutes);
        let des = &designations[rng.below(designations.len() as u64) as usize];
        data.push(json!([
            des,
            "1",
            time.format("%Y-%b-%d %H:%M").to_string(),
            format!("{:.6}", rng.range(0.0005, 0.5)),
            format!("{:.4}", rng.range(1.0, 40.0)),
        ]));
    }

    let cad = json!({
        "signature": { "source": "neo-explorer generate_sample", "version": "1.0" },
        "count": APPROACH_COUNT.to_string(),
        "fields": ["des", "orbit_id", "cd", "dist", "v_rel"],
        "data": data,
    });
    let cad_path = out_dir.join("cad.json");
    fs::write(&cad_path, serde_json::to_string_pretty(&cad)?).context("writing cad.json")?;

    println!(
        "Wrote {NEO_COUNT} NEOs to {} and {APPROACH_COUNT} close approaches to {}",
        neo_path.display(),
        cad_path.display()
    );
    Ok(())
}
