//! Trailing spin-up window preceding a run.

use chrono::NaiveDate;
use metprep_calendar::{DailySeries, TimeAxis, add_days};
use metprep_tabular::Variable;
use tracing::debug;

use crate::error::TransformError;

/// Selects the last `lookback` days of `history` before `run_start`.
///
/// Entries dated on or after `run_start` are ignored. Precipitation must
/// already be differenced, so the row count is checked after
/// de-accumulation. The expected first day is derived independently as
/// `run_start - lookback` and compared with the slice.
///
/// # Errors
///
/// - [`TransformError::InsufficientHistory`] if fewer than `lookback`
///   entries precede `run_start`.
/// - [`TransformError::Alignment`] if the history does not end on the day
///   before `run_start`, or if the slice's first day disagrees with the
///   calendar-derived start.
pub fn extract_spinup(
    history: &DailySeries,
    variable: Variable,
    run_start: NaiveDate,
    lookback: usize,
) -> Result<DailySeries, TransformError> {
    if lookback == 0 {
        return Ok(DailySeries::from_start(run_start, Vec::new()));
    }

    let before = history.before(run_start);
    let insufficient = |available| TransformError::InsufficientHistory {
        variable: variable.name().to_string(),
        run_start,
        required: lookback,
        available,
    };

    if before.is_empty() {
        return Err(insufficient(0));
    }

    let expected_end = add_days(run_start, -1)?;
    if before.end() != Some(expected_end) {
        return Err(TransformError::Alignment {
            variable: variable.name().to_string(),
            what: "last day",
            expected: expected_end,
            found: before.end(),
        });
    }

    if before.len() < lookback {
        return Err(insufficient(before.len()));
    }

    let window = before.tail(lookback);
    let expected = TimeAxis::preceding(run_start, lookback)?;
    if window.axis() != expected {
        return Err(TransformError::Alignment {
            variable: variable.name().to_string(),
            what: "first day",
            expected: expected.start(),
            found: Some(window.start()),
        });
    }

    debug!(
        variable = %variable,
        first = %window.start(),
        n_days = window.len(),
        "extracted spin-up window"
    );

    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn drops_leading_rows() {
        // 92 rows ending 2010-12-31.
        let values: Vec<f64> = (1..=92).map(f64::from).collect();
        let history = DailySeries::from_start(ymd(2010, 10, 1), values);
        let window = extract_spinup(&history, Variable::TempMax, ymd(2011, 1, 1), 90).unwrap();
        assert_eq!(window.len(), 90);
        assert_eq!(window.values()[0], 3.0);
        assert_eq!(window.values()[89], 92.0);
        assert_eq!(window.start(), ymd(2010, 10, 3));
        assert_eq!(window.end(), Some(ymd(2010, 12, 31)));
    }

    #[test]
    fn ignores_entries_from_run_period() {
        let history = DailySeries::from_start(ymd(2010, 12, 1), vec![1.0; 62]);
        let window = extract_spinup(&history, Variable::TempMin, ymd(2011, 1, 1), 31).unwrap();
        assert_eq!(window.start(), ymd(2010, 12, 1));
        assert_eq!(window.end(), Some(ymd(2010, 12, 31)));
    }

    #[test]
    fn too_short() {
        let history = DailySeries::from_start(ymd(2010, 12, 1), vec![0.0; 31]);
        let err = extract_spinup(&history, Variable::Precipitation, ymd(2011, 1, 1), 90).unwrap_err();
        assert_eq!(
            err,
            TransformError::InsufficientHistory {
                variable: "prec".to_string(),
                run_start: ymd(2011, 1, 1),
                required: 90,
                available: 31,
            }
        );
    }

    #[test]
    fn history_entirely_after_start() {
        let history = DailySeries::from_start(ymd(2011, 1, 1), vec![0.0; 10]);
        let err = extract_spinup(&history, Variable::Precipitation, ymd(2011, 1, 1), 5).unwrap_err();
        assert!(matches!(
            err,
            TransformError::InsufficientHistory { available: 0, .. }
        ));
    }

    #[test]
    fn history_ending_early_is_misaligned() {
        let history = DailySeries::from_start(ymd(2010, 1, 1), vec![0.0; 300]);
        let err = extract_spinup(&history, Variable::TempMax, ymd(2011, 1, 1), 90).unwrap_err();
        match err {
            TransformError::Alignment {
                what,
                expected,
                found,
                ..
            } => {
                assert_eq!(what, "last day");
                assert_eq!(expected, ymd(2010, 12, 31));
                assert_eq!(found, Some(ymd(2010, 10, 27)));
            }
            other => panic!("expected Alignment, got {other:?}"),
        }
    }

    #[test]
    fn zero_lookback_is_empty() {
        let history = DailySeries::from_start(ymd(2010, 1, 1), vec![0.0; 3]);
        let window = extract_spinup(&history, Variable::TempMax, ymd(2011, 1, 1), 0).unwrap();
        assert!(window.is_empty());
    }

    #[test]
    fn window_across_leap_day() {
        let history = DailySeries::from_start(ymd(2012, 1, 1), vec![0.0; 91]);
        let window = extract_spinup(&history, Variable::TempMax, ymd(2012, 4, 1), 31).unwrap();
        assert_eq!(window.start(), ymd(2012, 3, 1));
    }
}
