//! Source table loading.
//!
//! Reads SDTM transport files from a data directory into Polars DataFrames.
//! Each domain's main table is required; its supplemental qualifier table is
//! optional and reported through [`SupplementalData`].

mod error;
pub mod paths;
mod reader;
mod table;

pub use error::{IngestError, Result};
pub use paths::{find_supp_table, main_table_path, supp_table_candidates};
pub use reader::{read_domain, read_domains, read_source_table, read_supplemental};
pub use table::{DomainSource, SourceTable, SupplementalData};
