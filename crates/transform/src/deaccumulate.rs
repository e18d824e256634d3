//! Cumulative-to-incremental precipitation transform.

use metprep_calendar::DailySeries;
use metprep_tabular::RawSeries;

/// Differences a running total into per-step increments.
///
/// For `N` readings the result has `N - 1` values with
/// `out[i] = cumulative[i + 1] - cumulative[i]`; fewer than two readings
/// give an empty vector. Negative increments (counter resets) are returned
/// unchanged. A `NaN` reading makes both increments that touch it `NaN`.
pub fn deaccumulate(cumulative: &[f64]) -> Vec<f64> {
    cumulative.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Differences a dated running total.
///
/// Each increment takes the date of the later reading, so the first date
/// is dropped.
pub fn deaccumulate_series(cumulative: &DailySeries) -> DailySeries {
    let values = deaccumulate(cumulative.values());
    // Increments begin one day after the first reading.
    let start = cumulative
        .start()
        .succ_opt()
        .unwrap_or(cumulative.start());
    DailySeries::from_start(start, values)
}

/// Differences a raw cumulative column, keeping its source unit.
///
/// Unit conversion is applied afterwards with
/// [`RawSeries::into_target_units`].
pub fn deaccumulate_raw(cumulative: RawSeries) -> RawSeries {
    cumulative.map_series(|s| deaccumulate_series(&s))
}

/// Number of strictly negative increments, ignoring `NaN`.
pub fn count_negative(increments: &[f64]) -> usize {
    increments.iter().filter(|&&v| v < 0.0).count()
}
