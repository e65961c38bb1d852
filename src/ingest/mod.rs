//! Turns raw feed records into a [`CaseTable`](crate::models::CaseTable).

mod location;
mod rows;

pub use location::{first_non_empty, normalize, normalize_value, try_normalize};
pub use rows::{build, build_report, parse_timestamp, BuildReport, ParseWarning};
