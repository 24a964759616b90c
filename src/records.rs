use memchr::memchr;

use crate::error::{Error, Malformed};

/// One `station;temperature` line, borrowed from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub station: &'a [u8],
    pub temperature: &'a [u8],
    /// Byte offset of the start of the line within the whole input.
    pub offset: usize,
}

/// Splits a buffer into records, one per line.
///
/// A line without `;` yields [Error::MalformedRecord] and ends the iteration.
/// The last line does not need a trailing `\n`, and a trailing `\r` is dropped.
pub struct Records<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Records<'a> {
    pub fn new(buf: &'a [u8]) -> Records<'a> {
        Records::with_offset(buf, 0)
    }

    /// `base` is the position of `buf` within the complete input, used for error offsets.
    pub fn with_offset(buf: &'a [u8], base: usize) -> Records<'a> {
        Records { buf, pos: 0, base }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.buf.get(self.pos..).filter(|rest| !rest.is_empty())?;
        let offset = self.base + self.pos;

        let mut line = match memchr(b'\n', rest) {
            Some(end) => {
                self.pos += end + 1;
                &rest[..end]
            }
            None => {
                self.pos = self.buf.len();
                rest
            }
        };
        if let [head @ .., b'\r'] = line {
            line = head;
        }

        match memchr(b';', line) {
            Some(split) => Some(Ok(Record {
                station: &line[..split],
                temperature: &line[split + 1..],
                offset,
            })),
            None => {
                self.pos = self.buf.len();
                Some(Err(Error::malformed(offset, Malformed::MissingSeparator)))
            }
        }
    }
}
