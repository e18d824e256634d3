//! End-to-end run: load, prepare, assemble, then persist.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use metprep_dataset::{
    Assembler, Dataset, DatasetError, DatasetSink, DomainTable, SeriesTable, SpatialUnits,
    UnitAttributes, UnitKey,
};
use metprep_io::NetcdfWriter;
use metprep_tabular::{Variable, load_unit_records};
use metprep_transform::extract_spinup;
use tracing::{debug, info, info_span};

use crate::config::{GridCell, HruLayout, Layout, PipelineConfig};
use crate::driver::{DriverConfig, write_driver_config};
use crate::error::PipelineError;
use crate::prepare::{forcing_window, target_series};
use crate::sources::SourceCache;

/// Where a unit's observations come from.
#[derive(Debug, Clone)]
struct Binding {
    key: UnitKey,
    source: Option<PathBuf>,
    history: Option<PathBuf>,
}

/// The three datasets of a run, built but not yet persisted.
#[derive(Debug, Clone)]
pub struct Assembled {
    pub forcing: Dataset,
    pub domain: Dataset,
    pub state: Dataset,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub forcing: PathBuf,
    pub domain: PathBuf,
    pub state: PathBuf,
    /// `None` when the driver configuration was not requested.
    pub driver_config: Option<PathBuf>,
    pub n_units: usize,
    pub n_active: usize,
    pub n_days: usize,
    pub n_sources: usize,
}

/// Runs the pipeline and writes NetCDF files with the configured writer.
///
/// # Errors
///
/// Any [`PipelineError`]. Nothing is written unless all three datasets
/// assemble successfully.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
    let mut writer = NetcdfWriter::new(config.writer().clone())?;
    run_with_sink(config, &mut writer)
}

/// Runs the pipeline, handing each dataset to `sink`.
///
/// # Errors
///
/// Any [`PipelineError`]. Sink failures become [`PipelineError::Persist`].
pub fn run_with_sink<S: DatasetSink>(
    config: &PipelineConfig,
    sink: &mut S,
) -> Result<PipelineReport, PipelineError> {
    let span = info_span!("run", layout = config.layout().name());
    let _guard = span.enter();

    let (assembled, n_sources) = assemble(config)?;

    let output = config.output();
    let out_dir = output.out_dir();
    std::fs::create_dir_all(out_dir).map_err(|e| PipelineError::Output {
        path: out_dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let forcing = output.forcing_path();
    let domain = output.domain_path();
    let state = output.state_path();
    persist(sink, &assembled.forcing, &forcing)?;
    persist(sink, &assembled.domain, &domain)?;
    persist(sink, &assembled.state, &state)?;

    let driver_config = if config.writes_driver_config() {
        let record = DriverConfig::build(
            config.driver(),
            config.run(),
            output,
            &assembled.forcing,
            &assembled.domain,
            &assembled.state,
        )?;
        let path = output.driver_config_path();
        write_driver_config(&path, &record)?;
        Some(path)
    } else {
        None
    };

    let report = PipelineReport {
        forcing,
        domain,
        state,
        driver_config,
        n_units: assembled.forcing.units().len(),
        n_active: assembled
            .domain
            .variable("mask")
            .and_then(|v| v.data().as_i32())
            .map_or(0, |m| m.iter().filter(|&&v| v == 1).count()),
        n_days: assembled.forcing.time().map_or(0, |t| t.len()),
        n_sources,
    };
    info!(
        n_units = report.n_units,
        n_active = report.n_active,
        n_days = report.n_days,
        "run complete"
    );
    Ok(report)
}

fn persist<S: DatasetSink>(sink: &mut S, ds: &Dataset, path: &Path) -> Result<(), PipelineError> {
    sink.persist(ds, path).map_err(|e| PipelineError::Persist {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Builds all three datasets in memory.
///
/// Also returns the number of distinct source files read.
///
/// # Errors
///
/// Any loading, transform or assembly error of the run.
pub fn assemble(config: &PipelineConfig) -> Result<(Assembled, usize), PipelineError> {
    config.validate()?;
    let run = config.run();
    let run_axis = run.axis()?;
    let spin_axis = run.spinup_axis()?;

    let (assembler, bindings) = match config.layout() {
        Layout::Grid(cells) => grid_assembler(cells)?,
        Layout::Hru(hru) => hru_assembler(hru)?,
    };

    let active: BTreeMap<&UnitKey, bool> = assembler
        .domain()
        .units()
        .iter()
        .map(|u| (&u.key, u.active))
        .collect();

    let source = config.source();
    let mut cache = SourceCache::new(source);
    let mut forcing_series = SeriesTable::new();
    let mut state_series = SeriesTable::new();

    for binding in &bindings {
        if !active.get(&binding.key).copied().unwrap_or(false) {
            debug!(unit = %assembler.units().describe(&binding.key), "skipping masked unit");
            continue;
        }
        let Some(path) = &binding.source else {
            continue;
        };

        let obs = cache.get(path)?;
        for variable in Variable::ALL {
            if let Some(series) = target_series(obs, variable, source.precip_cumulative()) {
                forcing_series.insert(
                    binding.key.clone(),
                    variable,
                    forcing_window(&series, &run_axis),
                );
            }
        }

        let history_path = binding.history.as_deref().unwrap_or(path);
        let history = cache.get(history_path)?;
        for variable in Variable::ALL {
            if let Some(series) = target_series(history, variable, source.precip_cumulative()) {
                let window = extract_spinup(&series, variable, run.start(), run.spinup_days())?;
                state_series.insert(binding.key.clone(), variable, window);
            }
        }
    }

    let forcing = assembler.build_forcing(&forcing_series, run_axis)?;
    let domain = assembler.build_domain()?;
    let state =
        assembler.build_state(&state_series, spin_axis, run.start(), run.spinup_days())?;

    Ok((
        Assembled {
            forcing,
            domain,
            state,
        },
        cache.len(),
    ))
}

fn grid_assembler(cells: &[GridCell]) -> Result<(Assembler, Vec<Binding>), PipelineError> {
    let lats = unique_sorted(cells.iter().map(|c| c.lat));
    let lons = unique_sorted(cells.iter().map(|c| c.lon));
    let units = SpatialUnits::grid(lats, lons)?;

    let mut table = DomainTable::new();
    let mut bindings = Vec::with_capacity(cells.len());
    for cell in cells {
        let key = units
            .cell_at(cell.lat, cell.lon)
            .ok_or_else(|| PipelineError::Config {
                reason: format!("cell (lat {}, lon {}) is not on the grid", cell.lat, cell.lon),
            })?;
        if table.get(&key).is_some() {
            return Err(DatasetError::DuplicateUnit {
                unit: units.describe(&key),
            }
            .into());
        }
        table.insert(key.clone(), UnitAttributes::cell(cell.elev, cell.mask));
        bindings.push(Binding {
            key,
            source: cell.source.clone(),
            history: cell.history.clone(),
        });
    }

    debug!(n_units = units.len(), n_cells = cells.len(), "grid layout");
    Ok((Assembler::new(units, &table)?, bindings))
}

fn hru_assembler(hru: &HruLayout) -> Result<(Assembler, Vec<Binding>), PipelineError> {
    let records = load_unit_records(&hru.attributes, &hru.loader, &hru.columns)?;
    let units = SpatialUnits::hru(hru.units.iter().map(|u| u.id.clone()).collect())?;
    let table = DomainTable::from_records(&records);

    let bindings = hru
        .units
        .iter()
        .map(|u| Binding {
            key: UnitKey::Hru(u.id.clone()),
            source: u.source.clone(),
            history: u.history.clone(),
        })
        .collect();

    debug!(
        n_units = hru.units.len(),
        n_records = records.len(),
        join_key = hru.columns.key(),
        "hru layout"
    );
    let assembler = Assembler::new(units, &table)?.with_join_key(hru.columns.key());
    Ok((assembler, bindings))
}

/// Distinct values in ascending order, with `-0.0` folded into `0.0`.
fn unique_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.map(|v| v + 0.0).collect();
    out.sort_by(f64::total_cmp);
    out.dedup_by(|a, b| a.total_cmp(b).is_eq());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(lat: f64, lon: f64) -> GridCell {
        GridCell {
            lat,
            lon,
            elev: 1000.0,
            mask: 1.0,
            source: None,
            history: None,
        }
    }

    #[test]
    fn unique_sorted_folds_duplicates() {
        let v = unique_sorted([44.5, 44.0, 44.5, -0.0, 0.0].into_iter());
        assert_eq!(v, vec![0.0, 44.0, 44.5]);
    }

    #[test]
    fn grid_is_product_of_coordinates() {
        let cells = [
            cell(44.0, -114.0),
            cell(44.5, -114.0),
            cell(44.0, -113.5),
            cell(44.5, -113.5),
        ];
        let (asm, bindings) = grid_assembler(&cells).unwrap();
        assert_eq!(asm.units().dims(), vec![("lat", 2), ("lon", 2)]);
        assert_eq!(bindings[2].key, UnitKey::Cell { lat: 0, lon: 1 });
    }

    #[test]
    fn duplicate_cell_is_rejected() {
        let err = grid_assembler(&[cell(44.0, -114.0), cell(44.0, -114.0)]).unwrap_err();
        assert!(
            matches!(err, PipelineError::Dataset(DatasetError::DuplicateUnit { .. })),
            "{err:?}"
        );
    }

    #[test]
    fn incomplete_product_lacks_domain() {
        // Two lats and two lons declare four cells; only three are given.
        let err = grid_assembler(&[cell(44.0, -114.0), cell(44.5, -114.0), cell(44.0, -113.5)])
            .unwrap_err();
        assert!(
            matches!(
                err,
                PipelineError::Dataset(DatasetError::MissingDomainAttribute { .. })
            ),
            "{err:?}"
        );
    }
}
