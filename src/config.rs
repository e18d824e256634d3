use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level metprep configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetprepConfig {
    /// Simulated period.
    pub run: RunToml,

    /// How observation exports are read.
    #[serde(default)]
    pub source: SourceToml,

    /// Structured layout; exclusive with `hru`.
    pub grid: Option<GridToml>,

    /// Unstructured layout; exclusive with `grid`.
    pub hru: Option<HruToml>,

    /// Output file names.
    #[serde(default)]
    pub output: OutputToml,

    /// Driver configuration record.
    #[serde(default)]
    pub driver: DriverToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunToml {
    pub start: String,
    pub stop: String,
    #[serde(default = "default_spinup_days")]
    pub spinup_days: usize,
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

fn default_spinup_days() -> usize {
    metprep_pipeline::DEFAULT_SPINUP_DAYS
}
fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceToml {
    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,
    #[serde(default)]
    pub comment: Option<char>,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_date_column")]
    pub date_column: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_true")]
    pub precip_cumulative: bool,
    /// Variable name (`prec`, `t_max`, `t_min`) to column label.
    #[serde(default)]
    pub columns: Option<BTreeMap<String, String>>,
}

impl Default for SourceToml {
    fn default() -> Self {
        Self {
            skip_rows: default_skip_rows(),
            comment: None,
            delimiter: default_delimiter(),
            date_column: default_date_column(),
            date_format: default_date_format(),
            precip_cumulative: true,
            columns: None,
        }
    }
}

fn default_skip_rows() -> usize {
    2
}
fn default_delimiter() -> char {
    ','
}
fn default_date_column() -> String {
    "Date".to_string()
}
fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridToml {
    pub cells: Vec<CellToml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellToml {
    pub lat: f64,
    pub lon: f64,
    pub elev: f64,
    #[serde(default = "default_mask")]
    pub mask: f64,
    pub source: Option<PathBuf>,
    pub history: Option<PathBuf>,
}

fn default_mask() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HruToml {
    /// Attribute CSV with one row per unit.
    pub attributes: PathBuf,
    #[serde(default)]
    pub skip_rows: usize,
    #[serde(default = "default_join_key")]
    pub join_key: String,
    #[serde(default = "default_elev_column")]
    pub elev_column: String,
    #[serde(default = "default_mask_column")]
    pub mask_column: String,
    #[serde(default = "default_lat_column")]
    pub lat_column: String,
    #[serde(default = "default_lon_column")]
    pub lon_column: String,
    pub units: Vec<HruUnitToml>,
}

fn default_join_key() -> String {
    "hru".to_string()
}
fn default_elev_column() -> String {
    "elev".to_string()
}
fn default_mask_column() -> String {
    "mask".to_string()
}
fn default_lat_column() -> String {
    "lat".to_string()
}
fn default_lon_column() -> String {
    "lon".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HruUnitToml {
    pub id: String,
    pub source: Option<PathBuf>,
    pub history: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputToml {
    #[serde(default = "default_forcing")]
    pub forcing: String,
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default = "default_driver_config")]
    pub driver_config: String,
    /// zlib level 0..=9; omit or set `compress = false` for none.
    #[serde(default = "default_deflate_level")]
    pub deflate_level: u8,
    #[serde(default = "default_true")]
    pub compress: bool,
}

impl Default for OutputToml {
    fn default() -> Self {
        Self {
            forcing: default_forcing(),
            domain: default_domain(),
            state: default_state(),
            driver_config: default_driver_config(),
            deflate_level: default_deflate_level(),
            compress: true,
        }
    }
}

fn default_forcing() -> String {
    "forcing.nc".to_string()
}
fn default_domain() -> String {
    "domain.nc".to_string()
}
fn default_state() -> String {
    "state.nc".to_string()
}
fn default_driver_config() -> String {
    "metsim.json".to_string()
}
fn default_deflate_level() -> u8 {
    4
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverToml {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_time_step")]
    pub time_step: String,
    #[serde(default = "default_driver_out_dir")]
    pub out_dir: PathBuf,
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
    #[serde(default = "default_scheduler")]
    pub scheduler: String,
    #[serde(default)]
    pub chunks: BTreeMap<String, usize>,
    /// Tuning parameters copied into the record verbatim.
    #[serde(default)]
    pub params: BTreeMap<String, toml::Value>,
}

impl Default for DriverToml {
    fn default() -> Self {
        Self {
            enabled: true,
            time_step: default_time_step(),
            out_dir: default_driver_out_dir(),
            output_prefix: default_output_prefix(),
            scheduler: default_scheduler(),
            chunks: BTreeMap::new(),
            params: BTreeMap::new(),
        }
    }
}

fn default_time_step() -> String {
    "1440".to_string()
}
fn default_driver_out_dir() -> PathBuf {
    PathBuf::from("results")
}
fn default_output_prefix() -> String {
    "metsim".to_string()
}
fn default_scheduler() -> String {
    "threaded".to_string()
}
