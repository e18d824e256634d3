//! Accumulated validation of static domain attributes.
//!
//! [`ValidationCollector`] gathers every violation so one error reports all
//! offending units at once.

use crate::error::DatasetError;

/// Accumulates validation messages and converts them into a single error.
///
/// Push zero or more messages, then call [`finish`](Self::finish) with the
/// error constructor for the kind of check performed.
pub(crate) struct ValidationCollector {
    errors: Vec<String>,
}

impl ValidationCollector {
    /// Create an empty collector.
    pub(crate) fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record one validation error.
    pub(crate) fn push(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Returns `true` when no errors have been recorded.
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consume the collector and return `Ok(())` if no errors were recorded,
    /// or the error built by `make(count, details)` otherwise.
    ///
    /// The `details` string joins all messages with `"; "`.
    pub(crate) fn finish(
        self,
        make: impl FnOnce(usize, String) -> DatasetError,
    ) -> Result<(), DatasetError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(make(self.errors.len(), self.errors.join("; ")))
        }
    }
}

/// Checks that a mask value is exactly 0 or 1.
pub(crate) fn check_mask(c: &mut ValidationCollector, unit: &str, mask: f64) {
    if mask != 0.0 && mask != 1.0 {
        c.push(format!("unit {unit}: mask {mask} is not 0 or 1"));
    }
}

/// Checks elevation and, when present, centroid coordinates.
pub(crate) fn check_attributes(
    c: &mut ValidationCollector,
    unit: &str,
    elev: f64,
    lat: Option<f64>,
    lon: Option<f64>,
) {
    if !elev.is_finite() {
        c.push(format!("unit {unit}: elevation {elev} is not finite"));
    }
    if let Some(lat) = lat
        && !(-90.0..=90.0).contains(&lat)
    {
        c.push(format!("unit {unit}: latitude {lat} outside [-90, 90]"));
    }
    if let Some(lon) = lon
        && !(-180.0..=360.0).contains(&lon)
    {
        c.push(format!("unit {unit}: longitude {lon} outside [-180, 360]"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_empty_is_ok() {
        let c = ValidationCollector::new();
        assert!(c.is_empty());
        assert!(c.finish(|count, details| DatasetError::InvalidDomain { count, details }).is_ok());
    }

    #[test]
    fn collector_joins_messages() {
        let mut c = ValidationCollector::new();
        c.push("error one");
        c.push("error two");
        let err = c
            .finish(|count, details| DatasetError::InvalidMask { count, details })
            .unwrap_err();
        match err {
            DatasetError::InvalidMask { count, details } => {
                assert_eq!(count, 2);
                assert_eq!(details, "error one; error two");
            }
            other => panic!("expected InvalidMask, got {other:?}"),
        }
    }

    #[test]
    fn mask_values() {
        let mut c = ValidationCollector::new();
        check_mask(&mut c, "'a'", 0.0);
        check_mask(&mut c, "'b'", 1.0);
        assert!(c.is_empty());
        check_mask(&mut c, "'c'", 0.5);
        check_mask(&mut c, "'d'", -1.0);
        let err = c
            .finish(|count, details| DatasetError::InvalidMask { count, details })
            .unwrap_err();
        assert!(err.to_string().starts_with("2 invalid mask value(s)"));
        assert!(err.to_string().contains("unit 'c': mask 0.5"));
    }

    #[test]
    fn attribute_ranges() {
        let mut c = ValidationCollector::new();
        check_attributes(&mut c, "'a'", 1500.0, Some(44.0), Some(-114.0));
        check_attributes(&mut c, "'b'", 10.0, None, None);
        assert!(c.is_empty());

        check_attributes(&mut c, "'c'", f64::INFINITY, Some(95.0), Some(-200.0));
        let err = c
            .finish(|count, details| DatasetError::InvalidDomain { count, details })
            .unwrap_err();
        match err {
            DatasetError::InvalidDomain { count, details } => {
                assert_eq!(count, 3);
                assert!(details.contains("elevation inf is not finite"));
                assert!(details.contains("latitude 95"));
                assert!(details.contains("longitude -200"));
            }
            other => panic!("expected InvalidDomain, got {other:?}"),
        }
    }
}
