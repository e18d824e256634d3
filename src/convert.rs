//! Pure conversion functions: TOML config structs -> crate API config types.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::config::*;

use metprep_calendar::parse_date;
use metprep_io::WriterConfig;
use metprep_pipeline::{
    DriverSettings, GridCell, HruLayout, HruUnit, Layout, OutputNames, PipelineConfig,
    RunPeriod, SourceOptions,
};
use metprep_tabular::{AttributeColumns, ColumnMap, DateColumn, LoaderConfig, Variable};

/// Date format of `[run]` start and stop.
const RUN_DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts a single-character TOML string to a byte.
pub fn parse_byte(c: char, what: &str) -> Result<u8> {
    if !c.is_ascii() {
        bail!("{what} must be an ASCII character, got {c:?}");
    }
    Ok(c as u8)
}

/// Resolves `path` against the directory holding the configuration file.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Builds the [`RunPeriod`] from `[run]`.
pub fn build_run_period(run: &RunToml) -> Result<RunPeriod> {
    let start = parse_date(&run.start, RUN_DATE_FORMAT).context("invalid [run].start")?;
    let stop = parse_date(&run.stop, RUN_DATE_FORMAT).context("invalid [run].stop")?;
    Ok(RunPeriod::new(start, stop).with_spinup_days(run.spinup_days))
}

/// Builds the loader for observation exports from `[source]`.
pub fn build_loader_config(source: &SourceToml) -> Result<LoaderConfig> {
    let comment = source
        .comment
        .map(|c| parse_byte(c, "[source].comment"))
        .transpose()?;
    Ok(LoaderConfig::default()
        .with_skip_rows(source.skip_rows)
        .with_comment(comment)
        .with_delimiter(parse_byte(source.delimiter, "[source].delimiter")?))
}

/// Builds the column map from `[source.columns]`, or the station default.
pub fn build_column_map(columns: Option<&BTreeMap<String, String>>) -> Result<ColumnMap> {
    let Some(columns) = columns else {
        return Ok(ColumnMap::default());
    };
    if columns.is_empty() {
        bail!("[source.columns] must map at least one variable");
    }
    let mut map = ColumnMap::empty();
    for (name, label) in columns {
        let variable: Variable = name
            .parse()
            .with_context(|| format!("[source.columns] key {name:?}"))?;
        map = map
            .with_column(variable, label)
            .with_context(|| format!("[source.columns].{name}"))?;
    }
    Ok(map)
}

/// Builds [`SourceOptions`] from `[source]`.
pub fn build_source_options(source: &SourceToml) -> Result<SourceOptions> {
    Ok(SourceOptions::default()
        .with_loader(build_loader_config(source)?)
        .with_columns(build_column_map(source.columns.as_ref())?)
        .with_date(
            DateColumn::default()
                .with_label(&source.date_column)
                .with_format(&source.date_format),
        )
        .with_precip_cumulative(source.precip_cumulative))
}

/// Builds the spatial layout; exactly one of `[grid]` or `[hru]` must be set.
pub fn build_layout(
    grid: Option<&GridToml>,
    hru: Option<&HruToml>,
    base: &Path,
) -> Result<Layout> {
    let opt = |p: &Option<PathBuf>| p.as_deref().map(|p| resolve(base, p));
    match (grid, hru) {
        (Some(g), None) => Ok(Layout::Grid(
            g.cells
                .iter()
                .map(|c| GridCell {
                    lat: c.lat,
                    lon: c.lon,
                    elev: c.elev,
                    mask: c.mask,
                    source: opt(&c.source),
                    history: opt(&c.history),
                })
                .collect(),
        )),
        (None, Some(h)) => Ok(Layout::Hru(HruLayout {
            attributes: resolve(base, &h.attributes),
            loader: LoaderConfig::default().with_skip_rows(h.skip_rows),
            columns: AttributeColumns::default()
                .with_key(&h.join_key)
                .with_elev(&h.elev_column)
                .with_mask(&h.mask_column)
                .with_lat(&h.lat_column)
                .with_lon(&h.lon_column),
            units: h
                .units
                .iter()
                .map(|u| HruUnit {
                    id: u.id.clone(),
                    source: opt(&u.source),
                    history: opt(&u.history),
                })
                .collect(),
        })),
        (Some(_), Some(_)) => bail!("configure either [grid] or [hru], got both"),
        (None, None) => bail!("configure either [grid] or [hru], got neither"),
    }
}

/// Builds the output names, with `out_dir` taken from `[run]`.
pub fn build_output_names(output: &OutputToml, out_dir: PathBuf) -> OutputNames {
    OutputNames::default()
        .with_out_dir(out_dir)
        .with_forcing(&output.forcing)
        .with_domain(&output.domain)
        .with_state(&output.state)
        .with_driver_config(&output.driver_config)
}

/// Builds a [`WriterConfig`] from `[output]`.
pub fn build_writer_config(output: &OutputToml) -> Result<WriterConfig> {
    let level = output.compress.then_some(output.deflate_level);
    let cfg = WriterConfig::default().with_deflate_level(level);
    cfg.validate().context("invalid [output] compression settings")?;
    Ok(cfg)
}

/// Builds [`DriverSettings`] from `[driver]`.
pub fn build_driver_settings(driver: &DriverToml) -> Result<DriverSettings> {
    let mut settings = DriverSettings::default()
        .with_time_step(&driver.time_step)
        .with_out_dir(&driver.out_dir)
        .with_output_prefix(&driver.output_prefix)
        .with_scheduler(&driver.scheduler)
        .with_chunks(driver.chunks.clone());
    for (key, value) in &driver.params {
        let json = serde_json::to_value(value)
            .with_context(|| format!("[driver.params].{key} is not representable as JSON"))?;
        settings = settings.with_param(key, json);
    }
    Ok(settings)
}

/// Builds the full [`PipelineConfig`].
///
/// Relative paths are resolved against `base`, the configuration file's
/// directory. `out_dir` overrides `[run].out_dir` and is used as given.
pub fn build_pipeline_config(
    cfg: &MetprepConfig,
    base: &Path,
    out_dir: Option<PathBuf>,
    no_driver_config: bool,
) -> Result<PipelineConfig> {
    let out_dir = out_dir.unwrap_or_else(|| resolve(base, &cfg.run.out_dir));
    let config = PipelineConfig::new(
        build_run_period(&cfg.run)?,
        build_layout(cfg.grid.as_ref(), cfg.hru.as_ref(), base)?,
    )
    .with_source(build_source_options(&cfg.source)?)
    .with_output(build_output_names(&cfg.output, out_dir))
    .with_driver(build_driver_settings(&cfg.driver)?)
    .with_writer(build_writer_config(&cfg.output)?)
    .with_driver_config(cfg.driver.enabled && !no_driver_config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}
