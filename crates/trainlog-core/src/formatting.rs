/// Parse a distance cell into a finite number.
///
/// Surrounding whitespace is ignored. Returns `None` for empty, non-numeric,
/// or non-finite values (`"--"`, `"nan"`, `"inf"`).
///
/// # Examples
///
/// ```
/// use trainlog_core::formatting::parse_distance;
///
/// assert_eq!(parse_distance(" 5.01 "), Some(5.01));
/// assert_eq!(parse_distance("12"), Some(12.0));
/// assert_eq!(parse_distance("--"), None);
/// ```
pub fn parse_distance(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a distance the way it is shown in the log: whole numbers keep one
/// decimal place, everything else uses the shortest exact representation.
///
/// # Examples
///
/// ```
/// use trainlog_core::formatting::format_distance;
///
/// assert_eq!(format_distance(5.0), "5.0");
/// assert_eq!(format_distance(3.25), "3.25");
/// assert_eq!(format_distance(0.1 + 0.2), "0.30000000000000004");
/// ```
pub fn format_distance(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Round `value` to `decimals` places.
///
/// Rounding is decided on the exact binary value; exact ties go to the even
/// digit. `2.675` is stored just below the tie and rounds down.
///
/// # Examples
///
/// ```
/// use trainlog_core::formatting::round_to;
///
/// assert_eq!(round_to(21.456, 2), 21.46);
/// assert_eq!(round_to(8.0, 2), 8.0);
/// assert_eq!(round_to(10.125, 2), 10.12);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

/// Join display values with the separator used in report cells.
pub fn join_cell<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(value.as_ref());
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
