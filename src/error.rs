use std::fmt::{self, Display};

use thiserror::Error;

/// Why a line of input was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Malformed {
    /// The line has no `;` between station and temperature.
    MissingSeparator,
    /// The temperature token is not of the form `-?D{1,2}.D`.
    Temperature(String),
    /// The station name is not valid UTF-8.
    StationName,
}

impl Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Malformed::MissingSeparator => write!(f, "missing ';' separator"),
            Malformed::Temperature(token) => write!(f, "invalid temperature {token:?}"),
            Malformed::StationName => write!(f, "station name is not valid UTF-8"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed record at byte offset {offset}: {reason}")]
    MalformedRecord { offset: usize, reason: Malformed },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(offset: usize, reason: Malformed) -> Error {
        Error::MalformedRecord { offset, reason }
    }
}
