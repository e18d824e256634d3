use chrono::NaiveDate;
use metprep_calendar::{CalendarError, TimeAxis, check_contiguous, daily_sequence};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn full_leap_year_month_boundaries() {
    let dates = daily_sequence(ymd(2012, 1, 1), 366);
    assert_eq!(dates.len(), 366);

    // Index 30: Jan 31
    assert_eq!(dates[30], ymd(2012, 1, 31));
    // Index 59: Feb 29
    assert_eq!(dates[59], ymd(2012, 2, 29));
    // Index 60: Mar 1
    assert_eq!(dates[60], ymd(2012, 3, 1));
    // Index 365: Dec 31
    assert_eq!(dates[365], ymd(2012, 12, 31));
}

#[test]
fn consecutive_dates_differ_by_one_day() {
    let axis = TimeAxis::new(ymd(2009, 10, 1), ymd(2011, 9, 30)).unwrap();
    let dates = axis.dates();
    assert_eq!(dates.len(), axis.len());
    for pair in dates.windows(2) {
        assert_eq!(pair[1].signed_duration_since(pair[0]).num_days(), 1);
    }
}

#[test]
fn axis_length_matches_inclusive_day_count() {
    for (start, end, expected) in [
        (ymd(2010, 1, 1), ymd(2010, 12, 31), 365),
        (ymd(2011, 10, 1), ymd(2012, 9, 30), 366),
        (ymd(2010, 3, 1), ymd(2010, 3, 1), 1),
    ] {
        let axis = TimeAxis::new(start, end).unwrap();
        assert_eq!(axis.len(), expected, "{start} .. {end}");
        assert_eq!(axis.end(), Some(end));
    }
}

#[test]
fn missing_calendar_day_is_rejected() {
    let mut dates = daily_sequence(ymd(2012, 2, 25), 10);
    // Drop Feb 29.
    dates.remove(4);
    assert_eq!(
        check_contiguous(&dates).unwrap_err(),
        CalendarError::Gap {
            index: 4,
            previous: ymd(2012, 2, 28),
            found: ymd(2012, 3, 1),
        }
    );
}

#[test]
fn spinup_axis_abuts_run_axis() {
    let run = TimeAxis::new(ymd(2011, 1, 1), ymd(2011, 12, 31)).unwrap();
    let spinup = TimeAxis::preceding(run.start(), 90).unwrap();
    assert_eq!(spinup.following_day().unwrap(), run.start());
    assert_eq!(spinup.len(), 90);
}
