//! Per-station minimum, mean and maximum temperatures over large
//! `station;temperature` files.
//!
//! Temperatures are decoded straight into tenths of a degree and kept as
//! integers until the report is rendered. The input is split into
//! line-aligned chunks, each chunk is aggregated by its own thread, and the
//! partial tables are merged once all threads finish.
//!
//! # Examples
//! ```
//! let input = b"Hamburg;12.0\nHamburg;14.0\nOslo;-3.5\n";
//! let report = station_stats::report(input, 2)?;
//! assert_eq!(report.to_string(), "{Hamburg=12.0/13.0/14.0, Oslo=-3.5/-3.5/-3.5}");
//! # Ok::<(), station_stats::Error>(())
//! ```

use std::ops::{Add, AddAssign};

pub mod aggregation;
pub mod error;
pub mod process;
pub mod records;
pub mod report;
pub mod temperature;

pub use aggregation::Aggregation;
pub use error::{Error, Malformed};
pub use report::{Report, ResultRow};

/// Running statistics of one station, in tenths of a degree.
///
/// The default value is the empty state: `count == 0` and `min`/`max` at the
/// opposite extremes, which makes it the identity for [StationStats::merge].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationStats {
    min: i16,
    max: i16,
    sum: i64,
    count: u64,
}

impl Default for StationStats {
    fn default() -> Self {
        Self {
            min: i16::MAX,
            max: i16::MIN,
            sum: 0,
            count: 0,
        }
    }
}

impl StationStats {
    pub fn new(item: i16) -> Self {
        Self {
            min: item,
            max: item,
            sum: item as i64,
            count: 1,
        }
    }

    #[inline]
    pub fn observe(&mut self, item: i16) {
        // once count > 0 an item cannot be below min and above max at once
        if self.count == 0 {
            self.min = item;
            self.max = item;
        } else if item < self.min {
            self.min = item;
        } else if item > self.max {
            self.max = item;
        }
        self.sum += item as i64;
        self.count += 1;
    }

    /// Combine two states as if every observation of both had been made on one.
    /// Merging with the empty state returns the other operand unchanged.
    pub fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            sum: self.sum + other.sum,
            count: self.count + other.count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn min(&self) -> i16 {
        self.min
    }

    pub fn max(&self) -> i16 {
        self.max
    }

    pub fn sum(&self) -> i64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Convert back to degrees. `None` for the empty state.
    pub fn finish(&self) -> Option<ResultRow> {
        if self.is_empty() {
            return None;
        }
        let mean = (self.sum as f64).round() / 10.0 / self.count as f64;
        Some(ResultRow::new(
            self.min as f64 / 10.0,
            mean,
            self.max as f64 / 10.0,
            self.count,
        ))
    }
}

impl Add for StationStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.merge(rhs)
    }
}

impl AddAssign for StationStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl FromIterator<i16> for StationStats {
    fn from_iter<T: IntoIterator<Item = i16>>(iter: T) -> Self {
        let mut stats = StationStats::default();
        iter.into_iter().for_each(|item| stats.observe(item));
        stats
    }
}

/// Aggregate an in-memory buffer with `workers` threads and build the sorted report.
pub fn report(buf: &[u8], workers: usize) -> Result<Report, Error> {
    let stations = process::aggregate(buf, workers)?;
    Ok(Report::new(stations))
}
