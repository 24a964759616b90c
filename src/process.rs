use std::{panic, str, thread, time::Instant};

use ahash::AHashMap;
use memchr::memchr;

use crate::{
    error::{Error, Malformed},
    records::{Record, Records},
    temperature::parse_temperature,
    StationStats,
};

/// Station name to statistics, keyed by slices of the input buffer.
pub type Stations<'a> = AHashMap<&'a [u8], StationStats>;

/// Expected number of distinct stations, used to presize the per-worker tables
const STATIONS_CAPACITY: usize = 10_000;

/// A contiguous, line-aligned part of the input.
///
/// The first byte of `data` is the first byte of a line, and unless it is the
/// last chunk of the input its final byte is `\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub offset: usize,
    pub data: &'a [u8],
}

/// Split `buf` into at most `count` non-empty chunks of roughly equal size.
///
/// Each nominal boundary is pushed forward to just past the next `\n`, so no
/// line straddles two chunks. Concatenating the chunks gives back `buf`.
pub fn split_chunks(buf: &[u8], count: usize) -> Vec<Chunk<'_>> {
    let target = buf.len().div_ceil(count.max(1)).max(1);
    let mut chunks = Vec::with_capacity(count.max(1));

    let mut start = 0;
    while start < buf.len() {
        let nominal = start + target;
        let end = if nominal >= buf.len() {
            buf.len()
        } else {
            memchr(b'\n', &buf[nominal - 1..]).map_or(buf.len(), |newline| nominal + newline)
        };
        chunks.push(Chunk {
            offset: start,
            data: &buf[start..end],
        });
        start = end;
    }
    chunks
}

/// Run the split, decode and aggregate pipeline over a single chunk.
pub fn aggregate_chunk(chunk: Chunk<'_>) -> Result<Stations<'_>, Error> {
    let mut map = Stations::with_capacity(STATIONS_CAPACITY);
    for record in Records::with_offset(chunk.data, chunk.offset) {
        let Record {
            station,
            temperature,
            offset,
        } = record?;
        let measure = parse_temperature(temperature).ok_or_else(|| {
            let token = String::from_utf8_lossy(temperature).into_owned();
            Error::malformed(offset, Malformed::Temperature(token))
        })?;

        match map.get_mut(station) {
            Some(elem) => {
                elem.observe(measure);
            }
            None => {
                if str::from_utf8(station).is_err() {
                    return Err(Error::malformed(offset, Malformed::StationName));
                }
                map.insert(station, StationStats::new(measure));
            }
        }
    }
    Ok(map)
}

/// Fold a worker's table into `outer`, consuming it.
pub fn merge_stations<'a>(outer: &mut Stations<'a>, inner: Stations<'a>) {
    for (station, stats) in inner.into_iter() {
        outer
            .entry(station)
            .and_modify(|outer_stats| *outer_stats += stats)
            .or_insert(stats);
    }
}

/// Aggregate `buf` with up to `workers` threads, one per chunk.
///
/// Every worker fills a private table; the tables are merged on the calling
/// thread once all workers are done. The first malformed record fails the
/// whole run.
pub fn aggregate(buf: &[u8], workers: usize) -> Result<Stations<'_>, Error> {
    let start = Instant::now();
    let chunks = split_chunks(buf, workers);
    log::debug!(
        "Split {} bytes into {} chunks for {} workers",
        buf.len(),
        chunks.len(),
        workers
    );

    let partials = thread::scope(|scope| {
        let handles = chunks
            .into_iter()
            .map(|chunk| scope.spawn(move || aggregate_chunk(chunk)))
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .collect::<Result<Vec<_>, Error>>()
    })?;

    let mut stations = Stations::with_capacity(STATIONS_CAPACITY);
    for partial in partials {
        merge_stations(&mut stations, partial);
    }
    log::debug!(
        "Merged {} stations in {:?}",
        stations.len(),
        start.elapsed()
    );
    Ok(stations)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    const INPUT: &[u8] = b"Hamburg;12.0\nBulawayo;8.9\nPalembang;38.8\nSt. John's;15.2\n\
Cracow;12.6\nBridgetown;26.9\nIstanbul;6.2\nRoseau;34.4\nConakry;31.2\nIstanbul;23.0\n";

    fn generate(rng: &mut StdRng, lines: usize) -> Vec<u8> {
        let stations = ["Oslo", "Lima", "Abéché", "Zürich", "Perth", "A", "Ürümqi"];
        let mut buf = Vec::new();
        for _ in 0..lines {
            let station = stations[rng.gen_range(0..stations.len())];
            let value: i16 = rng.gen_range(-999..=999);
            let sign = if value < 0 { "-" } else { "" };
            let magnitude = value.unsigned_abs();
            buf.extend_from_slice(
                format!("{station};{sign}{}.{}\n", magnitude / 10, magnitude % 10).as_bytes(),
            );
        }
        buf
    }

    fn sorted(stations: Stations<'_>) -> Vec<(&[u8], StationStats)> {
        let mut rows = stations.into_iter().collect::<Vec<_>>();
        rows.sort_unstable_by_key(|(station, _)| *station);
        rows
    }

    #[test]
    fn chunks_are_line_aligned_and_cover_input() {
        for count in 1..=12 {
            let chunks = split_chunks(INPUT, count);
            assert!(chunks.len() <= count);
            assert_eq!(chunks.concat_data(), INPUT);
            for chunk in &chunks {
                assert!(!chunk.data.is_empty());
                assert_eq!(chunk.data.last(), Some(&b'\n'));
                assert!(chunk.offset == 0 || INPUT[chunk.offset - 1] == b'\n');
            }
        }
    }

    #[test]
    fn chunks_without_trailing_newline() {
        let input = b"Oslo;1.0\nLima;2.0\nPerth;3.0";
        let chunks = split_chunks(input, 3);
        assert_eq!(chunks.concat_data(), input);
        assert_eq!(chunks.last().unwrap().data, b"Perth;3.0");
    }

    #[test]
    fn more_workers_than_lines() {
        let chunks = split_chunks(b"Oslo;1.0\n", 64);
        assert_eq!(chunks.len(), 1);
        assert!(split_chunks(b"", 8).is_empty());
    }

    #[test]
    fn aggregate_single_chunk() -> Result<(), anyhow::Error> {
        let stations = aggregate(INPUT, 1)?;
        assert_eq!(stations.len(), 9);
        let istanbul = stations[&b"Istanbul"[..]];
        assert_eq!((istanbul.min(), istanbul.max()), (62, 230));
        assert_eq!((istanbul.sum(), istanbul.count()), (292, 2));
        Ok(())
    }

    #[test]
    fn result_independent_of_worker_count() -> Result<(), anyhow::Error> {
        let mut rng = StdRng::seed_from_u64(1);
        let input = generate(&mut rng, 5_000);
        let expected = sorted(aggregate(&input, 1)?);
        for workers in [2, 3, 4, 7, 8, 16, 64] {
            assert_eq!(sorted(aggregate(&input, workers)?), expected, "workers {workers}");
        }
        Ok(())
    }

    #[test]
    fn result_independent_of_chunking_and_merge_order() -> Result<(), anyhow::Error> {
        let mut rng = StdRng::seed_from_u64(2);
        let input = generate(&mut rng, 2_000);
        let expected = sorted(aggregate(&input, 1)?);

        let line_ends = input
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte == b'\n')
            .map(|(index, _)| index + 1)
            .collect::<Vec<_>>();
        for _ in 0..20 {
            let mut cuts = (0..rng.gen_range(1..30))
                .map(|_| line_ends[rng.gen_range(0..line_ends.len())])
                .collect::<Vec<_>>();
            cuts.push(0);
            cuts.push(input.len());
            cuts.sort_unstable();
            cuts.dedup();

            let mut partials = cuts
                .windows(2)
                .map(|window| {
                    aggregate_chunk(Chunk {
                        offset: window[0],
                        data: &input[window[0]..window[1]],
                    })
                })
                .collect::<Result<Vec<_>, Error>>()?;
            // merge in reverse order of the chunks
            partials.reverse();
            let mut stations = Stations::default();
            for partial in partials {
                merge_stations(&mut stations, partial);
            }
            assert_eq!(sorted(stations), expected);
        }
        Ok(())
    }

    #[test]
    fn malformed_temperature_reports_offset() {
        let input = b"Oslo;1.0\nLima;2.0\nPerth;3.00\nRoseau;34.4\n";
        for workers in [1, 2, 4] {
            match aggregate(input, workers) {
                Err(Error::MalformedRecord { offset, reason }) => {
                    assert_eq!(offset, 18);
                    assert_eq!(reason, Malformed::Temperature("3.00".to_string()));
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn missing_separator_fails_every_worker_count() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut input = generate(&mut rng, 1_000);
        input.extend_from_slice(b"no separator here\n");
        input.extend(generate(&mut rng, 1_000));
        for workers in [1, 2, 8] {
            assert!(matches!(
                aggregate(&input, workers),
                Err(Error::MalformedRecord {
                    reason: Malformed::MissingSeparator,
                    ..
                })
            ));
        }
    }

    #[test]
    fn invalid_utf8_station() {
        let result = aggregate(b"Oslo;1.0\n\xff\xfe;2.0\n", 1);
        assert!(matches!(
            result,
            Err(Error::MalformedRecord {
                offset: 9,
                reason: Malformed::StationName
            })
        ));
    }

    trait ConcatData {
        fn concat_data(&self) -> Vec<u8>;
    }

    impl ConcatData for Vec<Chunk<'_>> {
        fn concat_data(&self) -> Vec<u8> {
            self.iter().flat_map(|chunk| chunk.data.iter().copied()).collect()
        }
    }
}
