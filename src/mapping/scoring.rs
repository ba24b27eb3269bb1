//! Significance arithmetic shared by the merge and report code.

/// Convert a residue count to f64 for fractional comparisons
#[inline]
pub(crate) fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Combine two independent small-is-better significance values with Fisher's method.
///
/// For two inputs the chi-squared statistic has four degrees of freedom and the
/// survival function reduces to `p * (1 - ln p)` with `p = a * b`. The product is
/// taken in log space so tiny E-values do not underflow before the correction
/// term is applied. The result is never less extreme than the better input.
/// When either input is exactly zero the better input is returned unchanged.
#[must_use]
pub fn combine_significance(a: f64, b: f64) -> f64 {
    let best = a.min(b);
    if a <= 0.0 || b <= 0.0 {
        return best;
    }

    let ln_p = a.ln() + b.ln();
    let correction = 1.0 - ln_p;
    if !ln_p.is_finite() || correction <= 0.0 {
        return best;
    }

    let combined = (ln_p + correction.ln()).exp();
    if combined.is_nan() {
        best
    } else {
        combined.min(best)
    }
}

/// Format an E-value the way HMMER and the report columns do: `1.50e-05`
#[must_use]
pub fn format_significance(value: f64) -> String {
    let formatted = format!("{value:.2e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => formatted,
    }
}
