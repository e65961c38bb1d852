mod case;
mod location;

pub use case::{Case, CaseTable, Column, RawRecord, DATE_FIELDS};
pub use location::{LocationPayload, NormalizedLocation};
