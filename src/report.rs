use std::fmt::{self, Display};

use crate::process::Stations;

/// Round to one decimal place, halves away from zero.
///
/// Never returns `-0.0`, so a mean such as `-0.04` prints as `0.0`.
pub fn round_display(value: f64) -> f64 {
    (value * 10.0).round() / 10.0 + 0.0
}

/// Final statistics of one station, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultRow {
    min: f64,
    mean: f64,
    max: f64,
    count: u64,
}

impl ResultRow {
    pub fn new(min: f64, mean: f64, max: f64, count: u64) -> ResultRow {
        ResultRow {
            min,
            mean,
            max,
            count,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Display for ResultRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}/{:.1}/{:.1}",
            round_display(self.min),
            round_display(self.mean),
            round_display(self.max)
        )
    }
}

/// Stations sorted by the bytes of their names, rendered as
/// `{name=min/mean/max, ...}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    rows: Vec<(String, ResultRow)>,
}

impl Report {
    pub fn new(stations: Stations<'_>) -> Report {
        let mut stations = stations.into_iter().collect::<Vec<_>>();
        stations.sort_unstable_by_key(|(station, _)| *station);

        // station names were checked for UTF-8 when first inserted
        let rows = stations
            .into_iter()
            .filter_map(|(station, stats)| {
                let row = stats.finish()?;
                Some((String::from_utf8_lossy(station).into_owned(), row))
            })
            .collect();
        Report { rows }
    }

    pub fn rows(&self) -> &[(String, ResultRow)] {
        &self.rows
    }

    pub fn get(&self, station: &str) -> Option<&ResultRow> {
        self.rows
            .binary_search_by(|(name, _)| name.as_bytes().cmp(station.as_bytes()))
            .ok()
            .map(|index| &self.rows[index].1)
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of measurements behind the report.
    pub fn measurements(&self) -> u64 {
        self.rows.iter().map(|(_, row)| row.count()).sum()
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, (station, row)) in self.rows.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{station}={row}")?;
        }
        write!(f, "}}")
    }
}
