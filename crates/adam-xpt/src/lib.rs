//! SAS Transport (XPT) V5 reader and writer.
//!
//! SDTM source domains arrive as transport files (`dm.xpt`, `SUPPDM.xpt`, ...)
//! and the derived ADSL can be exported in the same format. This crate covers
//! the V5 layout only: 8-character names, 40-character labels, IBM mainframe
//! doubles.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use adam_xpt::{XptColumn, XptDataset, XptValue, read_xpt, write_xpt};
//!
//! let dm = read_xpt(Path::new("data/dm.xpt")).unwrap();
//! println!("{} ({} rows)", dm.name, dm.num_rows());
//!
//! let mut ds = XptDataset::with_columns(
//!     "ADSL",
//!     vec![
//!         XptColumn::character("USUBJID", 20).with_label("Unique Subject Identifier"),
//!         XptColumn::numeric("AGE").with_label("Age"),
//!     ],
//! );
//! ds.add_row(vec![XptValue::character("01-701-1015"), XptValue::numeric(63.0)]);
//! write_xpt(Path::new("output/adsl.xpt"), &ds).unwrap();
//! ```
//!
//! # Missing Values
//!
//! ```
//! use adam_xpt::{MissingValue, XptValue};
//!
//! let missing = XptValue::numeric_missing();
//! assert!(missing.is_missing());
//!
//! let special = XptValue::numeric_missing_with(MissingValue::Special('A'));
//! assert!(special.is_missing());
//! ```

mod error;
pub mod float;
pub mod header;
mod reader;
mod types;
mod writer;

#[cfg(feature = "polars")]
mod polars_ext;

pub use error::{Result, XptError};

pub use types::{
    Justification, MissingValue, NumericValue, XptColumn, XptDataset, XptReaderOptions, XptType,
    XptValue, XptWriterOptions,
};

pub use reader::{XptReader, read_xpt, read_xpt_with_options};

pub use writer::{XptWriter, write_xpt, write_xpt_with_options};

#[cfg(feature = "polars")]
pub use polars_ext::{dataset_to_dataframe, read_xpt_to_dataframe};
