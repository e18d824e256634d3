//! # metprep-transform
//!
//! Pure per-series transforms applied between loading and assembly.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["RawSeries (cumulative, in)"] -->|"deaccumulate_raw()"| B["RawSeries (increments, in)"]
//!     B -->|"into_target_units()"| C["DailySeries (mm)"]
//!     C -->|"extract_spinup(run_start, n)"| D["n-day window ending run_start - 1"]
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `deaccumulate` | Running totals to per-day increments |
//! | `spinup` | Trailing lookback window before a run |
//! | `error` | Error types |

mod deaccumulate;
mod error;
mod spinup;

pub use deaccumulate::{count_negative, deaccumulate, deaccumulate_raw, deaccumulate_series};
pub use error::TransformError;
pub use spinup::extract_spinup;
