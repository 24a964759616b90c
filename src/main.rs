use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use log::LevelFilter;
use mimalloc::MiMalloc;
use simple_logger::SimpleLogger;
use station_stats::{Aggregation, aggregation::available_workers};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const PATH: &str = "measurements.txt";

fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()?;

    let input = env::args_os().nth(1).map_or_else(|| PathBuf::from(PATH), PathBuf::from);
    let mut aggregation = Aggregation::new(input);
    if let Ok(threads) = env::var("THREADS") {
        let threads = threads
            .parse()
            .with_context(|| format!("Unable to parse thread count: {threads}"))?;
        aggregation.with_workers(threads);
    }
    log::info!("Processors: {}", available_workers());

    let report = aggregation.run()?;
    println!("{report}");
    Ok(())
}
