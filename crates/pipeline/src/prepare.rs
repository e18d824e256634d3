//! Per-unit variable preparation.

use metprep_calendar::{DailySeries, TimeAxis};
use metprep_tabular::{Observations, Variable};
use metprep_transform::{count_negative, deaccumulate_raw};
use tracing::warn;

/// Series of `variable` in target units, de-accumulated when cumulative.
///
/// Returns `None` when the export has no column for `variable`.
pub(crate) fn target_series(
    obs: &Observations,
    variable: Variable,
    precip_cumulative: bool,
) -> Option<DailySeries> {
    let raw = obs.get(variable)?.clone();
    if variable == Variable::Precipitation && precip_cumulative {
        let increments = deaccumulate_raw(raw);
        let negative = count_negative(increments.series().values());
        if negative > 0 {
            warn!(
                path = %obs.path().display(),
                n_negative = negative,
                "negative precipitation increments passed through"
            );
        }
        Some(increments.into_target_units())
    } else {
        Some(raw.into_target_units())
    }
}

/// The part of `series` that falls on `axis`.
pub(crate) fn forcing_window(series: &DailySeries, axis: &TimeAxis) -> DailySeries {
    match axis.end() {
        Some(end) => series.window(axis.start(), end),
        None => DailySeries::from_start(axis.start(), Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use metprep_tabular::{ColumnMap, DateColumn, LoaderConfig, load_observations};

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn observations(rows: &[(&str, &str, &str, &str)]) -> Observations {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("site.csv");
        let mut text = String::from(
            "Site,1\nNetwork,SNOTEL\nDate,PREC.I-1 (in) ,TMAX.D-1 (degC) ,TMIN.D-1 (degC) \n",
        );
        for (d, p, hi, lo) in rows {
            text.push_str(&format!("{d},{p},{hi},{lo}\n"));
        }
        fs::write(&path, text).unwrap();
        load_observations(
            &path,
            &LoaderConfig::default(),
            &ColumnMap::default(),
            &DateColumn::default(),
        )
        .unwrap()
    }

    #[test]
    fn cumulative_precipitation_is_differenced() {
        let obs = observations(&[
            ("2010-01-01", "0.0", "1", "-1"),
            ("2010-01-02", "0.5", "2", "-2"),
            ("2010-01-03", "0.5", "3", "-3"),
            ("2010-01-04", "1.2", "4", "-4"),
        ]);
        let prec = target_series(&obs, Variable::Precipitation, true).unwrap();
        assert_eq!(prec.start(), ymd(2010, 1, 2));
        assert_eq!(prec.len(), 3);
        assert_abs_diff_eq!(prec.values()[0], 12.7, epsilon = 1e-9);
        assert_abs_diff_eq!(prec.values()[1], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(prec.values()[2], 17.78, epsilon = 1e-9);

        let tmax = target_series(&obs, Variable::TempMax, true).unwrap();
        assert_eq!(tmax.start(), ymd(2010, 1, 1));
        assert_eq!(tmax.values(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn incremental_precipitation_is_only_converted() {
        let obs = observations(&[
            ("2010-01-01", "1.0", "1", "-1"),
            ("2010-01-02", "0.0", "2", "-2"),
        ]);
        let prec = target_series(&obs, Variable::Precipitation, false).unwrap();
        assert_eq!(prec.len(), 2);
        assert_abs_diff_eq!(prec.values()[0], 25.4, epsilon = 1e-12);
    }

    #[test]
    fn counter_reset_passes_through() {
        let obs = observations(&[
            ("2010-09-30", "30.0", "1", "-1"),
            ("2010-10-01", "0.0", "2", "-2"),
        ]);
        let prec = target_series(&obs, Variable::Precipitation, true).unwrap();
        assert_abs_diff_eq!(prec.values()[0], -762.0, epsilon = 1e-9);
    }

    #[test]
    fn window_trims_to_axis() {
        let series = DailySeries::from_start(ymd(2010, 12, 30), vec![1.0, 2.0, 3.0, 4.0]);
        let axis = TimeAxis::new(ymd(2011, 1, 1), ymd(2011, 1, 31)).unwrap();
        let w = forcing_window(&series, &axis);
        assert_eq!(w.start(), ymd(2011, 1, 1));
        assert_eq!(w.values(), &[3.0, 4.0]);
    }
}
