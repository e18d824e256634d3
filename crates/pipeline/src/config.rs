//! Pipeline configuration types.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use metprep_calendar::TimeAxis;
use metprep_io::WriterConfig;
use metprep_tabular::{AttributeColumns, ColumnMap, DateColumn, LoaderConfig};

use crate::driver::DriverSettings;
use crate::error::PipelineError;

/// Default spin-up lookback in days.
pub const DEFAULT_SPINUP_DAYS: usize = 90;

/// The simulated period and its spin-up lookback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPeriod {
    start: NaiveDate,
    stop: NaiveDate,
    spinup_days: usize,
}

impl RunPeriod {
    /// Inclusive run from `start` to `stop` with the default lookback.
    pub fn new(start: NaiveDate, stop: NaiveDate) -> Self {
        Self {
            start,
            stop,
            spinup_days: DEFAULT_SPINUP_DAYS,
        }
    }

    /// Sets the spin-up lookback.
    pub fn with_spinup_days(mut self, days: usize) -> Self {
        self.spinup_days = days;
        self
    }

    /// First simulated day.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last simulated day.
    pub fn stop(&self) -> NaiveDate {
        self.stop
    }

    /// Spin-up lookback in days.
    pub fn spinup_days(&self) -> usize {
        self.spinup_days
    }

    /// Daily axis of the run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Calendar`] if `stop` precedes `start`.
    pub fn axis(&self) -> Result<TimeAxis, PipelineError> {
        Ok(TimeAxis::new(self.start, self.stop)?)
    }

    /// Daily axis of the spin-up window ending the day before `start`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Calendar`] on date overflow.
    pub fn spinup_axis(&self) -> Result<TimeAxis, PipelineError> {
        Ok(TimeAxis::preceding(self.start, self.spinup_days)?)
    }
}

/// How observation exports are read.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceOptions {
    loader: LoaderConfig,
    columns: ColumnMap,
    date: DateColumn,
    precip_cumulative: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            columns: ColumnMap::default(),
            date: DateColumn::default(),
            precip_cumulative: true,
        }
    }
}

impl SourceOptions {
    /// Sets the loader settings.
    pub fn with_loader(mut self, loader: LoaderConfig) -> Self {
        self.loader = loader;
        self
    }

    /// Sets the variable-to-column map.
    pub fn with_columns(mut self, columns: ColumnMap) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the date column.
    pub fn with_date(mut self, date: DateColumn) -> Self {
        self.date = date;
        self
    }

    /// Whether precipitation is a running total to be differenced.
    pub fn with_precip_cumulative(mut self, cumulative: bool) -> Self {
        self.precip_cumulative = cumulative;
        self
    }

    /// Loader settings.
    pub fn loader(&self) -> &LoaderConfig {
        &self.loader
    }

    /// Variable-to-column map.
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Date column.
    pub fn date(&self) -> &DateColumn {
        &self.date
    }

    /// `true` when precipitation is cumulative.
    pub fn precip_cumulative(&self) -> bool {
        self.precip_cumulative
    }
}

/// One cell of a structured run.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    /// Latitude in degrees north.
    pub lat: f64,
    /// Longitude in degrees east.
    pub lon: f64,
    /// Elevation in metres.
    pub elev: f64,
    /// 1 for active cells, 0 for masked-out cells.
    pub mask: f64,
    /// Observation export covering the run period.
    pub source: Option<PathBuf>,
    /// Export covering the spin-up window, when not `source`.
    pub history: Option<PathBuf>,
}

/// One unit of an unstructured run.
#[derive(Debug, Clone, PartialEq)]
pub struct HruUnit {
    /// Identifier matching the attribute table's join key.
    pub id: String,
    /// Observation export covering the run period.
    pub source: Option<PathBuf>,
    /// Export covering the spin-up window, when not `source`.
    pub history: Option<PathBuf>,
}

/// Unstructured units and their attribute table.
#[derive(Debug, Clone, PartialEq)]
pub struct HruLayout {
    /// Attribute CSV with one row per unit.
    pub attributes: PathBuf,
    /// How the attribute CSV is read.
    pub loader: LoaderConfig,
    /// Attribute column labels, including the join key.
    pub columns: AttributeColumns,
    /// Units in output order.
    pub units: Vec<HruUnit>,
}

/// Spatial layout of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    /// Structured lat/lon cells.
    Grid(Vec<GridCell>),
    /// Unstructured hydrologic response units.
    Hru(HruLayout),
}

impl Layout {
    /// `"grid"` or `"hru"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grid(_) => "grid",
            Self::Hru(_) => "hru",
        }
    }

    /// Number of declared units.
    pub fn len(&self) -> usize {
        match self {
            Self::Grid(cells) => cells.len(),
            Self::Hru(h) => h.units.len(),
        }
    }

    /// Returns `true` when no units are declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Output directory and file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    out_dir: PathBuf,
    forcing: String,
    domain: String,
    state: String,
    driver_config: String,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            forcing: "forcing.nc".into(),
            domain: "domain.nc".into(),
            state: "state.nc".into(),
            driver_config: "metsim.json".into(),
        }
    }
}

impl OutputNames {
    /// Sets the output directory.
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// Sets the forcing file name.
    pub fn with_forcing(mut self, name: impl Into<String>) -> Self {
        self.forcing = name.into();
        self
    }

    /// Sets the domain file name.
    pub fn with_domain(mut self, name: impl Into<String>) -> Self {
        self.domain = name.into();
        self
    }

    /// Sets the state file name.
    pub fn with_state(mut self, name: impl Into<String>) -> Self {
        self.state = name.into();
        self
    }

    /// Sets the driver configuration file name.
    pub fn with_driver_config(mut self, name: impl Into<String>) -> Self {
        self.driver_config = name.into();
        self
    }

    /// Output directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Path of the forcing file.
    pub fn forcing_path(&self) -> PathBuf {
        self.out_dir.join(&self.forcing)
    }

    /// Path of the domain file.
    pub fn domain_path(&self) -> PathBuf {
        self.out_dir.join(&self.domain)
    }

    /// Path of the state file.
    pub fn state_path(&self) -> PathBuf {
        self.out_dir.join(&self.state)
    }

    /// Path of the driver configuration record.
    pub fn driver_config_path(&self) -> PathBuf {
        self.out_dir.join(&self.driver_config)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        let names = [&self.forcing, &self.domain, &self.state, &self.driver_config];
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(PipelineError::Config {
                reason: "output file names must not be empty".to_string(),
            });
        }
        for (i, a) in names.iter().enumerate() {
            if names[i + 1..].contains(a) {
                return Err(PipelineError::Config {
                    reason: format!("output file name '{a}' is used twice"),
                });
            }
        }
        Ok(())
    }
}

/// Everything a pipeline run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    run: RunPeriod,
    layout: Layout,
    source: SourceOptions,
    output: OutputNames,
    driver: DriverSettings,
    writer: WriterConfig,
    write_driver_config: bool,
}

impl PipelineConfig {
    /// A run over `layout` with default source, output and driver settings.
    pub fn new(run: RunPeriod, layout: Layout) -> Self {
        Self {
            run,
            layout,
            source: SourceOptions::default(),
            output: OutputNames::default(),
            driver: DriverSettings::default(),
            writer: WriterConfig::default(),
            write_driver_config: true,
        }
    }

    /// Sets how exports are read.
    pub fn with_source(mut self, source: SourceOptions) -> Self {
        self.source = source;
        self
    }

    /// Sets output locations.
    pub fn with_output(mut self, output: OutputNames) -> Self {
        self.output = output;
        self
    }

    /// Sets driver configuration settings.
    pub fn with_driver(mut self, driver: DriverSettings) -> Self {
        self.driver = driver;
        self
    }

    /// Sets NetCDF writer settings.
    pub fn with_writer(mut self, writer: WriterConfig) -> Self {
        self.writer = writer;
        self
    }

    /// Enables or disables writing the driver configuration record.
    pub fn with_driver_config(mut self, enabled: bool) -> Self {
        self.write_driver_config = enabled;
        self
    }

    /// Run period.
    pub fn run(&self) -> &RunPeriod {
        &self.run
    }

    /// Spatial layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Source options.
    pub fn source(&self) -> &SourceOptions {
        &self.source
    }

    /// Output locations.
    pub fn output(&self) -> &OutputNames {
        &self.output
    }

    /// Driver settings.
    pub fn driver(&self) -> &DriverSettings {
        &self.driver
    }

    /// Writer settings.
    pub fn writer(&self) -> &WriterConfig {
        &self.writer
    }

    /// Whether the driver configuration record is written.
    pub fn writes_driver_config(&self) -> bool {
        self.write_driver_config
    }

    /// Checks the configuration before any file is read.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] for an empty layout, a zero spin-up,
    /// or clashing output names, and [`PipelineError::Calendar`] if the run
    /// stops before it starts.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.run.axis()?;
        if self.run.spinup_days == 0 {
            return Err(PipelineError::Config {
                reason: "spinup_days must be at least 1".to_string(),
            });
        }
        if self.layout.is_empty() {
            return Err(PipelineError::Config {
                reason: format!("no {} units declared", self.layout.name()),
            });
        }
        self.output.validate()?;
        self.writer.validate()?;
        Ok(())
    }
}
