//! Driver configuration record.
//!
//! The simulation driver is configured by a flat JSON object that points at
//! the three datasets and carries its own tuning parameters. Those
//! parameters are passed through untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use metprep_dataset::{Dataset, DatasetKind};
use metprep_io::temp_path;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{OutputNames, RunPeriod};
use crate::error::PipelineError;

/// Keys written by the pipeline itself; tuning parameters may not use them.
pub const RESERVED_KEYS: &[&str] = &[
    "time_step",
    "start",
    "stop",
    "forcing",
    "domain",
    "state",
    "forcing_fmt",
    "out_dir",
    "output_prefix",
    "scheduler",
    "chunks",
    "forcing_vars",
    "state_vars",
    "domain_vars",
];

/// User-controlled part of the driver configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverSettings {
    time_step: String,
    forcing_fmt: String,
    out_dir: PathBuf,
    output_prefix: String,
    scheduler: String,
    chunks: BTreeMap<String, usize>,
    params: BTreeMap<String, Value>,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            time_step: "1440".into(),
            forcing_fmt: "netcdf".into(),
            out_dir: PathBuf::from("results"),
            output_prefix: "metsim".into(),
            scheduler: "threaded".into(),
            chunks: BTreeMap::new(),
            params: BTreeMap::new(),
        }
    }
}

impl DriverSettings {
    /// Output time step in minutes.
    pub fn with_time_step(mut self, minutes: impl Into<String>) -> Self {
        self.time_step = minutes.into();
        self
    }

    /// Directory the driver writes its own results to.
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// Prefix of the driver's result files.
    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = prefix.into();
        self
    }

    /// Driver scheduler name.
    pub fn with_scheduler(mut self, scheduler: impl Into<String>) -> Self {
        self.scheduler = scheduler.into();
        self
    }

    /// Chunk sizes per forcing dimension. Empty means one chunk per
    /// spatial dimension.
    pub fn with_chunks(mut self, chunks: BTreeMap<String, usize>) -> Self {
        self.chunks = chunks;
        self
    }

    /// Adds a pass-through tuning parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Pass-through tuning parameters.
    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    /// Chunk sizes as configured.
    pub fn chunks(&self) -> &BTreeMap<String, usize> {
        &self.chunks
    }
}

/// The record handed to the simulation driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    pub time_step: String,
    pub start: NaiveDate,
    pub stop: NaiveDate,
    pub forcing: PathBuf,
    pub domain: PathBuf,
    pub state: PathBuf,
    pub forcing_fmt: String,
    pub out_dir: PathBuf,
    pub output_prefix: String,
    pub scheduler: String,
    pub chunks: BTreeMap<String, usize>,
    pub forcing_vars: BTreeMap<String, String>,
    pub state_vars: BTreeMap<String, String>,
    pub domain_vars: BTreeMap<String, String>,
    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,
}

impl DriverConfig {
    /// Builds the record for datasets assembled over `run`.
    ///
    /// Variable maps list every data variable of the matching dataset under
    /// its own name.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Driver`] if a chunk key is not a spatial
    /// dimension of `forcing`, a chunk size is zero, or a tuning parameter
    /// uses a reserved key.
    pub fn build(
        settings: &DriverSettings,
        run: &RunPeriod,
        output: &OutputNames,
        forcing: &Dataset,
        domain: &Dataset,
        state: &Dataset,
    ) -> Result<Self, PipelineError> {
        let spatial = forcing.units().dims();
        let chunks = if settings.chunks.is_empty() {
            spatial.iter().map(|(d, n)| (d.to_string(), *n)).collect()
        } else {
            for (dim, size) in &settings.chunks {
                if !spatial.iter().any(|(d, _)| *d == dim.as_str()) {
                    let known: Vec<&str> = spatial.iter().map(|(d, _)| *d).collect();
                    return Err(PipelineError::Driver {
                        reason: format!(
                            "chunk dimension '{dim}' is not one of: {}",
                            known.join(", ")
                        ),
                    });
                }
                if *size == 0 {
                    return Err(PipelineError::Driver {
                        reason: format!("chunk size for '{dim}' must be at least 1"),
                    });
                }
            }
            settings.chunks.clone()
        };

        if let Some(key) = settings
            .params
            .keys()
            .find(|k| RESERVED_KEYS.contains(&k.as_str()))
        {
            return Err(PipelineError::Driver {
                reason: format!("parameter '{key}' collides with a generated key"),
            });
        }

        Ok(Self {
            time_step: settings.time_step.clone(),
            start: run.start(),
            stop: run.stop(),
            forcing: output.forcing_path(),
            domain: output.domain_path(),
            state: output.state_path(),
            forcing_fmt: settings.forcing_fmt.clone(),
            out_dir: settings.out_dir.clone(),
            output_prefix: settings.output_prefix.clone(),
            scheduler: settings.scheduler.clone(),
            chunks,
            forcing_vars: identity_map(forcing, DatasetKind::Forcing)?,
            state_vars: identity_map(state, DatasetKind::State)?,
            domain_vars: identity_map(domain, DatasetKind::Domain)?,
            params: settings.params.clone(),
        })
    }
}

fn identity_map(ds: &Dataset, kind: DatasetKind) -> Result<BTreeMap<String, String>, PipelineError> {
    if ds.kind() != kind {
        return Err(PipelineError::Driver {
            reason: format!("expected a {kind} dataset, got {}", ds.kind()),
        });
    }
    Ok(ds
        .variables()
        .iter()
        .map(|v| (v.name().to_string(), v.name().to_string()))
        .collect())
}

/// Writes `config` to `path` as pretty JSON, atomically.
///
/// # Errors
///
/// Returns [`PipelineError::Driver`] if serialisation fails and
/// [`PipelineError::Output`] if the file cannot be written or renamed.
pub fn write_driver_config(path: &Path, config: &DriverConfig) -> Result<(), PipelineError> {
    let mut json = serde_json::to_string_pretty(config).map_err(|e| PipelineError::Driver {
        reason: e.to_string(),
    })?;
    json.push('\n');

    let tmp = temp_path(path);
    let result = std::fs::write(&tmp, json).and_then(|()| std::fs::rename(&tmp, path));
    if let Err(e) = result {
        if tmp.exists()
            && let Err(rm) = std::fs::remove_file(&tmp)
        {
            warn!(tmp = %tmp.display(), error = %rm, "failed to remove temporary file");
        }
        return Err(PipelineError::Output {
            path: path.to_path_buf(),
            reason: e.to_string(),
        });
    }

    info!(path = %path.display(), n_params = config.params.len(), "wrote driver configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use metprep_calendar::TimeAxis;
    use metprep_dataset::{DataVariable, SpatialUnits, VariableData};
    use ndarray::{ArrayD, IxDyn};
    use serde_json::json;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn datasets() -> (Dataset, Dataset, Dataset) {
        let units = SpatialUnits::grid(vec![44.0, 44.5], vec![-114.0]).unwrap();
        let axis = TimeAxis::new(ymd(2011, 1, 1), ymd(2011, 1, 2)).unwrap();
        let spin = TimeAxis::preceding(ymd(2011, 1, 1), 2).unwrap();
        let mut forcing = Dataset::new(DatasetKind::Forcing, units.clone(), Some(axis));
        forcing
            .push_variable(DataVariable::new(
                "prec",
                &["time", "lat", "lon"],
                VariableData::F64(ArrayD::zeros(IxDyn(&[2, 2, 1]))),
                "mm",
                "precipitation",
            ))
            .unwrap();
        let domain = Dataset::new(DatasetKind::Domain, units.clone(), None);
        let state = Dataset::new(DatasetKind::State, units, Some(spin));
        (forcing, domain, state)
    }

    fn run() -> RunPeriod {
        RunPeriod::new(ymd(2011, 1, 1), ymd(2011, 1, 2)).with_spinup_days(2)
    }

    #[test]
    fn default_chunks_cover_spatial_dims() {
        let (f, d, s) = datasets();
        let out = OutputNames::default().with_out_dir("out");
        let cfg = DriverConfig::build(&DriverSettings::default(), &run(), &out, &f, &d, &s).unwrap();
        assert_eq!(cfg.chunks.get("lat"), Some(&2));
        assert_eq!(cfg.chunks.get("lon"), Some(&1));
        assert!(!cfg.chunks.contains_key("time"));
        assert_eq!(cfg.forcing, PathBuf::from("out/forcing.nc"));
        assert_eq!(cfg.forcing_vars.get("prec").map(String::as_str), Some("prec"));
        assert!(cfg.domain_vars.is_empty());
    }

    #[test]
    fn unknown_chunk_dimension() {
        let (f, d, s) = datasets();
        let settings =
            DriverSettings::default().with_chunks(BTreeMap::from([("hru".to_string(), 10)]));
        let err = DriverConfig::build(&settings, &run(), &OutputNames::default(), &f, &d, &s)
            .unwrap_err();
        assert!(err.to_string().contains("'hru'"), "{err}");
    }

    #[test]
    fn zero_chunk_size() {
        let (f, d, s) = datasets();
        let settings =
            DriverSettings::default().with_chunks(BTreeMap::from([("lat".to_string(), 0)]));
        assert!(
            DriverConfig::build(&settings, &run(), &OutputNames::default(), &f, &d, &s).is_err()
        );
    }

    #[test]
    fn reserved_parameter() {
        let (f, d, s) = datasets();
        let settings = DriverSettings::default().with_param("start", json!("2000-01-01"));
        let err = DriverConfig::build(&settings, &run(), &OutputNames::default(), &f, &d, &s)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Driver { .. }));
    }

    #[test]
    fn params_are_flattened() {
        let (f, d, s) = datasets();
        let settings = DriverSettings::default()
            .with_param("lw_type", json!("prata"))
            .with_param("rain_scalar", json!(0.75));
        let cfg =
            DriverConfig::build(&settings, &run(), &OutputNames::default(), &f, &d, &s).unwrap();

        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("metsim.json");
        write_driver_config(&path, &cfg).unwrap();
        assert!(!temp_path(&path).exists());

        let text = std::fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["lw_type"], json!("prata"));
        assert_eq!(value["rain_scalar"], json!(0.75));
        assert_eq!(value["start"], json!("2011-01-01"));
        assert_eq!(value["time_step"], json!("1440"));
        assert!(value.get("params").is_none());

        let back: DriverConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }
}
