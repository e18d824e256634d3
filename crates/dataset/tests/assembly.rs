//! Integration tests: unstructured assembly through a sink.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use metprep_calendar::{DailySeries, TimeAxis};
use metprep_dataset::{
    Assembler, Dataset, DatasetError, DatasetKind, DatasetSink, DomainTable, SeriesTable,
    SpatialUnits, UnitKey,
};
use metprep_tabular::{UnitRecord, Variable};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(key: &str, elev: f64) -> UnitRecord {
    UnitRecord {
        key: key.to_string(),
        elev: Some(elev),
        mask: Some(1.0),
        lat: Some(44.0),
        lon: Some(-114.5),
    }
}

fn ids(names: &[&str]) -> SpatialUnits {
    SpatialUnits::hru(names.iter().map(|s| s.to_string()).collect()).unwrap()
}

/// Keeps persisted datasets in memory.
#[derive(Default)]
struct MemorySink {
    stored: BTreeMap<PathBuf, Dataset>,
}

#[derive(Debug, thiserror::Error)]
#[error("sink refused {0}")]
struct Refused(String);

impl DatasetSink for MemorySink {
    type Error = Refused;

    fn persist(&mut self, dataset: &Dataset, path: &Path) -> Result<(), Refused> {
        if path.as_os_str().is_empty() {
            return Err(Refused("empty path".into()));
        }
        self.stored.insert(path.to_path_buf(), dataset.clone());
        Ok(())
    }
}

#[test]
fn missing_domain_record_names_the_unit() {
    let units = ids(&["170601080101", "170601080102", "170601080103"]);
    let table = DomainTable::from_records(&[
        record("170601080101", 1500.0),
        record("170601080102", 1620.0),
    ]);

    match Assembler::new(units, &table).unwrap_err() {
        DatasetError::MissingDomainAttribute { unit, .. } => {
            assert_eq!(unit, "'170601080103'");
        }
        other => panic!("expected MissingDomainAttribute, got {other:?}"),
    }
}

#[test]
fn short_series_is_shape_mismatch() {
    let units = ids(&["a", "b"]);
    let table = DomainTable::from_records(&[record("a", 1.0), record("b", 2.0)]);
    let asm = Assembler::new(units, &table).unwrap();

    let start = ymd(2011, 1, 1);
    let axis = TimeAxis::new(start, ymd(2011, 12, 31)).unwrap();
    assert_eq!(axis.len(), 365);

    let mut series = SeriesTable::new();
    for variable in Variable::ALL {
        series.insert(
            UnitKey::Hru("a".into()),
            variable,
            DailySeries::from_start(start, vec![0.0; 365]),
        );
        let len = if variable == Variable::TempMin { 364 } else { 365 };
        series.insert(
            UnitKey::Hru("b".into()),
            variable,
            DailySeries::from_start(start, vec![0.0; len]),
        );
    }

    let err = asm.build_forcing(&series, axis).unwrap_err();
    assert_eq!(
        err,
        DatasetError::ShapeMismatch {
            variable: "t_min".to_string(),
            unit: "'b'".to_string(),
            expected: 365,
            got: 364,
        }
    );
}

#[test]
fn hru_datasets_reach_the_sink() {
    let units = ids(&["a", "b"]);
    let table = DomainTable::from_records(&[record("a", 1.0), record("b", 2.0)]);
    let asm = Assembler::new(units, &table).unwrap().with_join_key("HUC12");

    let run = TimeAxis::from_start_len(ymd(2011, 1, 1), 5);
    let spin = TimeAxis::preceding(run.start(), 3).unwrap();

    let mut forcing = SeriesTable::new();
    let mut state = SeriesTable::new();
    for key in ["a", "b"] {
        for variable in Variable::ALL {
            forcing.insert(
                UnitKey::Hru(key.into()),
                variable,
                DailySeries::from_start(run.start(), vec![1.0; 5]),
            );
            state.insert(
                UnitKey::Hru(key.into()),
                variable,
                DailySeries::from_start(spin.start(), vec![2.0; 3]),
            );
        }
    }

    let datasets = [
        asm.build_forcing(&forcing, run).unwrap(),
        asm.build_domain().unwrap(),
        asm.build_state(&state, spin, run.start(), 3).unwrap(),
    ];

    let mut sink = MemorySink::default();
    for ds in &datasets {
        let path = PathBuf::from(format!("{}.nc", ds.kind()));
        sink.persist(ds, &path).unwrap();
    }
    assert!(sink.persist(&datasets[0], Path::new("")).is_err());
    assert_eq!(sink.stored.len(), 3);

    let domain = &sink.stored[&PathBuf::from("domain.nc")];
    assert_eq!(domain.kind(), DatasetKind::Domain);
    assert_eq!(domain.attr("join_key"), Some("HUC12"));
    assert_eq!(domain.dims(), vec![("hru", 2)]);
    let lat = domain.variable("lat").unwrap();
    assert_eq!(lat.units(), "degrees_north");

    let state_ds = &sink.stored[&PathBuf::from("state.nc")];
    assert_eq!(state_ds.time().unwrap().end(), Some(ymd(2010, 12, 31)));
    assert_eq!(state_ds.dims(), vec![("time", 3), ("hru", 2)]);
}
