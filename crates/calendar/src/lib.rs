//! # metprep-calendar
//!
//! Gregorian daily date arithmetic for forcing and state time axes.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["parse_date()"] --> B["NaiveDate"]
//!     B -->|"TimeAxis::new(start, end)"| C["TimeAxis"]
//!     B -->|"TimeAxis::preceding(run_start, n)"| C
//!     D["dated rows"] -->|"TimeAxis::from_dates()"| C
//!     C -->|"DailySeries::new()"| E["DailySeries"]
//!     E -->|".window() / .before() / .tail()"| E
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use metprep_calendar::{DailySeries, TimeAxis, parse_date};
//!
//! let start = parse_date("2011-01-01", "%Y-%m-%d").unwrap();
//! let stop = parse_date("2011-12-31", "%Y-%m-%d").unwrap();
//! let run = TimeAxis::new(start, stop).unwrap(); // 365 days
//!
//! // 90-day spin-up axis ending 2010-12-31
//! let spinup = TimeAxis::preceding(start, 90).unwrap();
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `date` | Epoch offsets, day arithmetic, parsing |
//! | `sequence` | Daily sequences and contiguity checks |
//! | `axis` | Contiguous daily time axis |
//! | `series` | Daily values over an axis |
//! | `error` | Error types |

mod axis;
mod date;
mod error;
mod sequence;
mod series;

pub use axis::TimeAxis;
pub use date::{add_days, days_since_epoch, epoch, from_epoch_days, inclusive_day_count, parse_date};
pub use error::CalendarError;
pub use sequence::{check_contiguous, daily_sequence};
pub use series::DailySeries;
