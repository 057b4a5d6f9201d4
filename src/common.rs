/// Numeric helpers shared by the capacity calculators

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

pub fn round4(value: f64) -> f64 {
    round_to(value, 4)
}

/// `part / whole * 100`, or 0 when `whole` is not a positive limit.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Whole units of size `unit` that fit into `budget`.
///
/// `None` means the axis does not constrain the count (non-positive unit
/// size). A non-positive budget fits nothing. The result always satisfies
/// `count as f64 * unit <= budget`, even where the quotient rounds up.
pub fn units_within(budget: f64, unit: f64) -> Option<i64> {
    if unit <= 0.0 {
        None
    } else if budget <= 0.0 {
        Some(0)
    } else {
        let mut count = (budget / unit).floor() as i64;
        while count > 0 && count as f64 * unit > budget {
            count -= 1;
        }
        Some(count)
    }
}
