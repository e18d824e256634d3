//! Inspect command: summarise a persisted dataset.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use metprep_io::read_dataset;

use crate::cli::InspectArgs;

/// Read a dataset and print its dimensions and per-variable statistics.
pub fn run(args: InspectArgs) -> Result<()> {
    let _cmd = info_span!("inspect").entered();

    let ds = read_dataset(&args.file, args.kind)
        .with_context(|| format!("failed to read dataset: {}", args.file.display()))?;
    info!(path = %args.file.display(), dataset = %ds.kind(), "dataset loaded");

    println!("{} ({})", args.file.display(), ds.kind());
    let dims: Vec<String> = ds.dims().iter().map(|(d, n)| format!("{d}={n}")).collect();
    println!("  dimensions: {}", dims.join(", "));
    if let Some(t) = ds.time()
        && let Some(end) = t.end()
    {
        println!("  time: {} .. {}", t.start(), end);
    }
    for (name, value) in ds.attrs() {
        println!("  :{name} = {value:?}");
    }

    for var in ds.variables() {
        let s = var.data().summary();
        let range = if s.min.is_nan() {
            "all missing".to_string()
        } else {
            format!("min={:.3} max={:.3}", s.min, s.max)
        };
        println!(
            "  {:<6} [{}] {} ({}) {range} missing={}/{}",
            var.name(),
            var.dims().join(", "),
            var.long_name(),
            var.units(),
            s.missing,
            s.len,
        );
    }
    Ok(())
}
