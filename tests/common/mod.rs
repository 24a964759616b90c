use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::NamedTempFile;

const STATIONS: [&str; 12] = [
    "Hamburg", "Bulawayo", "Palembang", "St. John's", "Cracow", "Bridgetown", "Istanbul",
    "Roseau", "Conakry", "Abéché", "Zürich", "Ürümqi",
];

pub fn write_measurements(content: &[u8]) -> Result<NamedTempFile, anyhow::Error> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content)?;
    file.flush()?;
    Ok(file)
}

#[allow(dead_code)]
pub fn random_measurements(seed: u64, lines: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut buf = Vec::new();
    for _ in 0..lines {
        let station = STATIONS[rng.gen_range(0..STATIONS.len())];
        let value: i16 = rng.gen_range(-999..=999);
        let sign = if value < 0 { "-" } else { "" };
        let magnitude = value.unsigned_abs();
        writeln!(buf, "{station};{sign}{}.{}", magnitude / 10, magnitude % 10).unwrap();
    }
    buf
}
