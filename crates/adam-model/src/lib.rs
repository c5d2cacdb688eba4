//! Data model for ADaM subject-level derivation.
//!
//! - [`AdamError`]: errors raised by derivation and rule loading
//! - [`RuleSet`]: lookup tables and column lists injected into the pipeline
//! - [`AdslRecord`] / [`AdslDataset`]: the assembled output
//! - [`domain`]: source domain codes and variable names

pub mod adsl;
pub mod domain;
pub mod error;
pub mod rules;

pub use adsl::{
    ADSL_FIELDS, AdslDataset, AdslRecord, AdslValue, ColumnKind, ColumnSpec, field_spec,
    flag_label,
};
pub use error::{AdamError, Result};
pub use rules::{
    AgeGrouping, DispositionSelection, FlagRename, RuleSet, RuleSetVersion, StatusRules,
};
