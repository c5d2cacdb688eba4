//! ADSL derivation.
//!
//! Stages, in run order:
//! - [`suppqual`]: merge each domain's supplemental qualifiers onto its main table
//! - [`exposure`]: first and last exposure date per subject
//! - [`disposition`]: end-of-study status, date and reason per subject
//! - [`adsl`]: one record per demographics subject with recodes and flags
//!
//! [`pipeline::run_adsl`] runs them all from a data directory.

pub mod adsl;
pub mod datetime;
pub mod disposition;
pub mod exposure;
pub mod frame_utils;
pub mod pipeline;
pub mod suppqual;

pub use adsl::{assemble_adsl, ensure_unique_subjects};
pub use disposition::{DispositionOutcome, aggregate_disposition};
pub use exposure::{TreatmentWindow, aggregate_exposure};
pub use pipeline::{AdslRun, DomainSummary, MergedDomain, derive_adsl, load_domains, run_adsl};
pub use suppqual::{SupplementalMerge, merge_supplemental};
