//! Locale-tolerant numeric parsing for source fields.
//!
//! French exports write decimals with a comma (`48,8566`) and sometimes
//! quote numbers as strings. Every helper here returns `None` instead of an
//! error: a bad value is a missing value.

/// Parses a decimal number, accepting `,` as the decimal separator.
///
/// Returns `None` for empty, unparseable or non-finite input.
#[must_use]
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value = trimmed.replace(',', ".").parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Parses a population count. Negative values are treated as missing.
#[must_use]
pub fn parse_population(raw: &str) -> Option<f64> {
    parse_decimal(raw).filter(|p| *p >= 0.0)
}

/// Parses how many sites a row stands for. Accepts `3`, `3.0` and `3,0`;
/// negative or fractional values are treated as missing.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_count(raw: &str) -> Option<u64> {
    let value = parse_decimal(raw)?;
    let whole = value >= 0.0 && value.fract().abs() < f64::EPSILON;
    (whole && value <= f64::from(u32::MAX)).then_some(value as u64)
}

/// Returns `true` if `(lat, lng)` lies within WGS84 bounds.
#[must_use]
pub fn in_wgs84_range(lat: f64, lng: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}
