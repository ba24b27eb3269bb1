//! Centralized validation of user-supplied options and input content.

/// Bytes inspected when deciding whether an input is text
pub const TEXT_SNIFF_LEN: usize = 8192;

/// Invalid mapping option
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be non-negative, got {value}")]
    Negative { name: &'static str, value: String },
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("{name} must lie between 0 and 1, got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },
}

/// Convert a signed residue count into a `usize`, rejecting negatives.
///
/// # Errors
///
/// Returns `ConfigError::Negative` if `value < 0`.
pub fn validate_non_negative(name: &'static str, value: i64) -> Result<usize, ConfigError> {
    usize::try_from(value).map_err(|_| ConfigError::Negative {
        name,
        value: value.to_string(),
    })
}

/// Check that `value` is a fraction in `[0, 1]`.
///
/// # Errors
///
/// Returns `ConfigError::NotFinite` for NaN or infinities and
/// `ConfigError::FractionOutOfRange` outside the unit interval.
pub fn validate_fraction(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { name, value });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::FractionOutOfRange { name, value });
    }
    Ok(value)
}

/// Check that an E-value cutoff is finite and non-negative.
///
/// # Errors
///
/// Returns `ConfigError::NotFinite` or `ConfigError::Negative`.
pub fn validate_cutoff(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { name, value });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Whether the leading bytes of `content` look like a text report.
///
/// Binary data (null bytes or a high share of control characters) is rejected
/// so that a misplaced BAM or archive fails fast instead of parsing as empty.
#[must_use]
pub fn looks_like_text(content: &[u8]) -> bool {
    let sample = &content[..content.len().min(TEXT_SNIFF_LEN)];
    if sample.contains(&0) {
        return false;
    }
    let control = sample
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\n' | b'\r' | b'\t'))
        .count();
    control * 100 <= sample.len()
}
