//! Data directory layout.
//!
//! Main tables are named by the lower-case domain code (`dm.xpt`);
//! supplemental tables by `SUPP` plus the upper-case code (`SUPPDM.xpt`),
//! with `suppdm.xpt` accepted as a fallback.

use std::path::{Path, PathBuf};

use adam_model::domain::supp_name;

const XPT_EXTENSION: &str = "xpt";

pub fn main_table_path(dir: &Path, domain: &str) -> PathBuf {
    dir.join(format!("{}.{XPT_EXTENSION}", domain.to_lowercase()))
}

/// Supplemental file names to try, in order.
pub fn supp_table_candidates(dir: &Path, domain: &str) -> [PathBuf; 2] {
    let name = supp_name(domain);
    [
        dir.join(format!("{name}.{XPT_EXTENSION}")),
        dir.join(format!("{}.{XPT_EXTENSION}", name.to_lowercase())),
    ]
}

pub fn find_supp_table(dir: &Path, domain: &str) -> Option<PathBuf> {
    supp_table_candidates(dir, domain)
        .into_iter()
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_case_convention() {
        let dir = Path::new("data");
        assert_eq!(main_table_path(dir, "DM"), Path::new("data/dm.xpt"));
        let [upper, lower] = supp_table_candidates(dir, "ds");
        assert_eq!(upper, Path::new("data/SUPPDS.xpt"));
        assert_eq!(lower, Path::new("data/suppds.xpt"));
    }

    #[test]
    fn missing_supp_table_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_supp_table(dir.path(), "DM"), None);

        let lower = dir.path().join("suppdm.xpt");
        std::fs::write(&lower, b"").unwrap();
        assert!(find_supp_table(dir.path(), "DM").is_some());
    }
}
