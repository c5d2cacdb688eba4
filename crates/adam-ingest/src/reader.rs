//! Reading domain tables from a data directory.

use std::path::Path;

use adam_model::domain::supp_name;
use adam_xpt::{XptError, dataset_to_dataframe, read_xpt};
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::paths::{find_supp_table, main_table_path};
use crate::table::{DomainSource, SourceTable, SupplementalData};

/// Read one transport file into a [`SourceTable`].
pub fn read_source_table(path: &Path, domain: &str) -> Result<SourceTable> {
    let dataset = read_xpt(path).map_err(|source| match source {
        XptError::FileNotFound { path } => IngestError::MissingResource {
            domain: domain.to_string(),
            path,
        },
        source => IngestError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let data = dataset_to_dataframe(&dataset).map_err(|e| IngestError::Conversion {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(
        domain,
        path = %path.display(),
        rows = data.height(),
        columns = data.width(),
        "read source table"
    );
    Ok(SourceTable::new(domain, path, data))
}

/// Read a domain's supplemental table. A missing file is not an error.
pub fn read_supplemental(dir: &Path, domain: &str) -> Result<SupplementalData> {
    let Some(path) = find_supp_table(dir, domain) else {
        debug!(domain, "no supplemental table");
        return Ok(SupplementalData::Absent);
    };
    let table = read_source_table(&path, &supp_name(domain))?;
    if table.height() == 0 {
        debug!(domain, path = %path.display(), "supplemental table is empty");
        return Ok(SupplementalData::Empty { path });
    }
    Ok(SupplementalData::Loaded(table))
}

/// Read a domain's main table (required) and its supplemental table.
pub fn read_domain(dir: &Path, domain: &str) -> Result<DomainSource> {
    let domain = domain.to_uppercase();
    let main = read_source_table(&main_table_path(dir, &domain), &domain)?;
    let supplemental = read_supplemental(dir, &domain)?;
    Ok(DomainSource { main, supplemental })
}

/// Read every requested domain before any of them is processed.
pub fn read_domains(dir: &Path, domains: &[&str]) -> Result<Vec<DomainSource>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let sources = domains
        .iter()
        .map(|domain| read_domain(dir, domain))
        .collect::<Result<Vec<_>>>()?;
    info!(
        dir = %dir.display(),
        domains = sources.len(),
        supplemental = sources
            .iter()
            .filter(|s| s.supplemental.table().is_some())
            .count(),
        "source tables loaded"
    );
    Ok(sources)
}
