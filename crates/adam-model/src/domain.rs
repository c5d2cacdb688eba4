//! Source domain codes and the variable names the derivation reads.

/// Demographics, the one-row-per-subject backbone.
pub const DM: &str = "DM";
/// Exposure.
pub const EX: &str = "EX";
/// Disposition.
pub const DS: &str = "DS";

/// Domains loaded for an ADSL run, in load order.
pub const ADSL_SOURCE_DOMAINS: [&str; 3] = [DM, EX, DS];

pub const USUBJID: &str = "USUBJID";

pub mod dm {
    pub const STUDYID: &str = "STUDYID";
    pub const SUBJID: &str = "SUBJID";
    pub const AGE: &str = "AGE";
    pub const AGEU: &str = "AGEU";
    pub const SEX: &str = "SEX";
    pub const RACE: &str = "RACE";
    pub const ARM: &str = "ARM";
    pub const ACTARM: &str = "ACTARM";
}

pub mod ex {
    pub const EXSTDTC: &str = "EXSTDTC";
    pub const EXENDTC: &str = "EXENDTC";
}

pub mod ds {
    pub const DSCAT: &str = "DSCAT";
    pub const DSDECOD: &str = "DSDECOD";
    pub const DSSTDTC: &str = "DSSTDTC";
}

/// Supplemental qualifier (SUPP--) variables.
pub mod supp {
    pub const RDOMAIN: &str = "RDOMAIN";
    pub const IDVAR: &str = "IDVAR";
    pub const IDVARVAL: &str = "IDVARVAL";
    pub const QNAM: &str = "QNAM";
    pub const QVAL: &str = "QVAL";

    /// Columns a supplemental table must carry to be merged.
    pub const REQUIRED: [&str; 4] = [super::USUBJID, RDOMAIN, QNAM, QVAL];
}

/// File stem of the supplemental table for a domain, e.g. `SUPPDM`.
pub fn supp_name(domain: &str) -> String {
    format!("SUPP{}", domain.to_uppercase())
}
