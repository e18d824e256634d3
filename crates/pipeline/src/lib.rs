//! # metprep-pipeline
//!
//! End-to-end assembly of the forcing, domain and state datasets for a run,
//! followed by the driver configuration record that points at them.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["PipelineConfig"] --> B["grid / hru layout"]
//!     B --> C["Assembler"]
//!     A --> D["SourceCache (one load per CSV)"]
//!     D -->|"deaccumulate + convert"| E["SeriesTable (forcing, state)"]
//!     E --> C
//!     C --> F["forcing, domain, state in memory"]
//!     F -->|"DatasetSink"| G["NetCDF files"]
//!     F --> H["DriverConfig JSON"]
//! ```
//!
//! All three datasets are built before any is persisted, so a run that
//! fails validation leaves no output behind.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | Run period, sources, layout, outputs |
//! | `run` | Orchestration |
//! | `driver` | Driver configuration record |
//! | `error` | Error types |

mod config;
mod driver;
mod error;
mod prepare;
mod run;
mod sources;

pub use config::{
    DEFAULT_SPINUP_DAYS, GridCell, HruLayout, HruUnit, Layout, OutputNames, PipelineConfig,
    RunPeriod, SourceOptions,
};
pub use driver::{DriverConfig, DriverSettings, RESERVED_KEYS, write_driver_config};
pub use error::PipelineError;
pub use run::{Assembled, PipelineReport, assemble, run_pipeline, run_with_sink};
