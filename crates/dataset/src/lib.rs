//! # metprep-dataset
//!
//! Dimensioned forcing, domain and state datasets, and the assembler that
//! builds them from per-unit daily series and static attributes.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["SpatialUnits"] --> C["Assembler::new()"]
//!     B["DomainTable"] -->|"resolve(): coverage, mask"| C
//!     D["SeriesTable + TimeAxis"] --> E["build_forcing() / build_state()"]
//!     C --> E
//!     C --> F["build_domain()"]
//!     E --> G["Dataset"]
//!     F --> G
//!     G -->|"DatasetSink::persist()"| H["storage"]
//! ```
//!
//! Structured runs use `time × lat × lon`, unstructured runs `time × hru`.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `spatial` | Grid and HRU unit collections |
//! | `domain` | Static attributes and their validation |
//! | `model` | Dataset, variables, dimensions |
//! | `assemble` | Dataset construction |
//! | `sink` | Persistence trait |
//! | `error` | Error types |

mod assemble;
mod domain;
mod error;
mod model;
mod sink;
mod spatial;
mod validate;

pub use assemble::{Assembler, SeriesTable};
pub use domain::{DomainTable, ResolvedDomain, ResolvedUnit, UnitAttributes};
pub use error::DatasetError;
pub use model::{DType, DataVariable, Dataset, DatasetKind, Summary, TIME_DIM, VariableData};
pub use sink::DatasetSink;
pub use spatial::{HRU_DIM, LAT_DIM, LON_DIM, SpatialUnits, UnitKey};
