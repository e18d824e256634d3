//! Daily date sequences and contiguity checks.

use chrono::NaiveDate;

use crate::error::CalendarError;

/// Generates `n_days` consecutive Gregorian dates starting at `start`.
///
/// Leap days are included. The sequence stops early only if chrono's
/// maximum date is reached.
pub fn daily_sequence(start: NaiveDate, n_days: usize) -> Vec<NaiveDate> {
    start.iter_days().take(n_days).collect()
}

/// Verifies that every date is exactly one day after its predecessor.
///
/// Duplicates and out-of-order dates are reported the same way as gaps.
///
/// # Errors
///
/// Returns [`CalendarError::Gap`] for the first offending index.
pub fn check_contiguous(dates: &[NaiveDate]) -> Result<(), CalendarError> {
    for (i, pair) in dates.windows(2).enumerate() {
        let (previous, found) = (pair[0], pair[1]);
        if previous.succ_opt() != Some(found) {
            return Err(CalendarError::Gap {
                index: i + 1,
                previous,
                found,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty() {
        assert!(daily_sequence(ymd(2010, 1, 1), 0).is_empty());
        assert!(check_contiguous(&[]).is_ok());
    }

    #[test]
    fn year_transition() {
        let dates = daily_sequence(ymd(2010, 12, 30), 4);
        assert_eq!(
            dates,
            vec![ymd(2010, 12, 30), ymd(2010, 12, 31), ymd(2011, 1, 1), ymd(2011, 1, 2)]
        );
    }

    #[test]
    fn leap_day_included() {
        let dates = daily_sequence(ymd(2012, 2, 28), 3);
        assert_eq!(dates[1], ymd(2012, 2, 29));
        assert_eq!(dates[2], ymd(2012, 3, 1));
    }

    #[test]
    fn generated_sequence_is_contiguous() {
        let dates = daily_sequence(ymd(2000, 1, 1), 1000);
        assert_eq!(dates.len(), 1000);
        assert!(check_contiguous(&dates).is_ok());
    }

    #[test]
    fn first_gap_is_reported() {
        let dates = [
            ymd(2010, 1, 1),
            ymd(2010, 1, 2),
            ymd(2010, 1, 4),
            ymd(2010, 1, 7),
        ];
        assert_eq!(
            check_contiguous(&dates).unwrap_err(),
            CalendarError::Gap {
                index: 2,
                previous: ymd(2010, 1, 2),
                found: ymd(2010, 1, 4),
            }
        );
    }

    #[test]
    fn duplicate_is_a_gap() {
        let dates = [ymd(2010, 1, 1), ymd(2010, 1, 1)];
        assert!(matches!(
            check_contiguous(&dates),
            Err(CalendarError::Gap { index: 1, .. })
        ));
    }
}
