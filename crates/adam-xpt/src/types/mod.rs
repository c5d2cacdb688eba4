//! Core types for XPT file handling.

mod column;
mod dataset;
mod missing;
mod options;
mod value;

pub use column::{Justification, XptColumn, XptType};
pub use dataset::XptDataset;
pub use missing::MissingValue;
pub use options::{XptReaderOptions, XptWriterOptions};
pub use value::{NumericValue, XptValue};
