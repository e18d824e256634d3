//! Assemble command: CSV exports to forcing, domain and state datasets.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use metprep_pipeline::{Layout, run_pipeline};

use crate::cli::AssembleArgs;
use crate::config::MetprepConfig;
use crate::convert;

/// Run the full assembly pipeline.
pub fn run(args: AssembleArgs) -> Result<()> {
    let _cmd = info_span!("assemble").entered();

    // 1. Load project TOML
    let toml_str = std::fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config file: {}", args.config.display()))?;
    let config: MetprepConfig = toml::from_str(&toml_str).context("failed to parse TOML config")?;

    // 2. Convert to pipeline settings; relative paths follow the config file
    let base = args.config.parent().unwrap_or(Path::new("."));
    let pipeline = convert::build_pipeline_config(
        &config,
        base,
        args.out_dir.clone(),
        args.no_driver_config,
    )?;
    info!(
        layout = pipeline.layout().name(),
        n_units = pipeline.layout().len(),
        start = %pipeline.run().start(),
        stop = %pipeline.run().stop(),
        spinup_days = pipeline.run().spinup_days(),
        "configuration loaded"
    );
    if let Layout::Hru(hru) = pipeline.layout() {
        info!(attributes = %hru.attributes.display(), "using HRU attribute table");
    }

    // 3. Build and persist
    let report = run_pipeline(&pipeline).context("assembly failed")?;

    info!(path = %report.forcing.display(), "forcing written");
    info!(path = %report.domain.display(), "domain written");
    info!(path = %report.state.display(), "state written");
    if let Some(path) = &report.driver_config {
        info!(path = %path.display(), "driver configuration written");
    }
    info!(
        n_units = report.n_units,
        n_active = report.n_active,
        n_days = report.n_days,
        n_sources = report.n_sources,
        "assembly complete"
    );
    Ok(())
}
