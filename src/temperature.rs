/// Decode a temperature token of the form `-?D{1,2}.D` into tenths of a degree.
///
/// The four accepted shapes are told apart by where the `.` sits and whether
/// the token starts with `-`. Negative tokens subtract each digit from `'0'`
/// so no separate negation is needed. Anything else yields `None`.
#[inline]
pub fn parse_temperature(token: &[u8]) -> Option<i16> {
    match *token {
        // -n.f
        [b'-', ones, b'.', fraction] => Some(neg_digit(ones)? * 10 + neg_digit(fraction)?),
        // -nn.f
        [b'-', tens, ones, b'.', fraction] => {
            Some(neg_digit(tens)? * 100 + neg_digit(ones)? * 10 + neg_digit(fraction)?)
        }
        // n.f
        [ones, b'.', fraction] => Some(digit(ones)? * 10 + digit(fraction)?),
        // nn.f
        [tens, ones, b'.', fraction] => {
            Some(digit(tens)? * 100 + digit(ones)? * 10 + digit(fraction)?)
        }
        _ => None,
    }
}

#[inline]
fn digit(byte: u8) -> Option<i16> {
    byte.is_ascii_digit().then(|| (byte - b'0') as i16)
}

#[inline]
fn neg_digit(byte: u8) -> Option<i16> {
    byte.is_ascii_digit().then(|| b'0' as i16 - byte as i16)
}
