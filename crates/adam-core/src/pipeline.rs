//! End-to-end ADSL derivation from a data directory.

use std::path::Path;
use std::time::Instant;

use adam_ingest::{SourceTable, read_domains};
use adam_model::domain::{ADSL_SOURCE_DOMAINS, DM, DS, EX};
use adam_model::{AdslDataset, RuleSet};
use anyhow::{Context, Result, anyhow};
use tracing::{info, info_span};

use crate::adsl::assemble_adsl;
use crate::disposition::aggregate_disposition;
use crate::exposure::aggregate_exposure;
use crate::suppqual::merge_supplemental;

/// Row counts of one source domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSummary {
    pub domain: String,
    pub main_rows: usize,
    /// `None` when the domain has no supplemental file.
    pub supp_rows: Option<usize>,
    pub added_columns: Vec<String>,
}

/// A domain's main table after its supplemental qualifiers were merged.
#[derive(Debug, Clone)]
pub struct MergedDomain {
    pub table: SourceTable,
    pub summary: DomainSummary,
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct AdslRun {
    pub dataset: AdslDataset,
    pub domains: Vec<DomainSummary>,
}

/// Read every domain, then merge each with its own supplemental table.
pub fn load_domains(dir: &Path, domains: &[&str]) -> Result<Vec<MergedDomain>> {
    let sources = info_span!("ingest").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let sources = read_domains(dir, domains)
            .with_context(|| format!("read source tables from {}", dir.display()))?;
        info!(
            domains = sources.len(),
            duration_ms = start.elapsed().as_millis(),
            "ingest complete"
        );
        Ok(sources)
    })?;

    info_span!("suppqual").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let mut merged = Vec::with_capacity(sources.len());
        for source in sources {
            let domain = source.domain().to_string();
            let main_rows = source.main.height();
            let supp_rows = source
                .supplemental
                .path()
                .map(|_| source.supplemental.rows());
            let merge = merge_supplemental(source.main, &source.supplemental, &domain)
                .with_context(|| format!("merge supplemental qualifiers for {domain}"))?;
            merged.push(MergedDomain {
                table: merge.table,
                summary: DomainSummary {
                    domain,
                    main_rows,
                    supp_rows,
                    added_columns: merge.added_columns,
                },
            });
        }
        info!(
            domains = merged.len(),
            added_columns = merged
                .iter()
                .map(|d| d.summary.added_columns.len())
                .sum::<usize>(),
            duration_ms = start.elapsed().as_millis(),
            "supplemental merge complete"
        );
        Ok(merged)
    })
}

/// Aggregate EX and DS and assemble ADSL from merged domain tables.
pub fn derive_adsl(domains: &[MergedDomain], rules: &RuleSet) -> Result<AdslDataset> {
    let dm = find_domain(domains, DM)?;
    let ex = find_domain(domains, EX)?;
    let ds = find_domain(domains, DS)?;

    let windows = info_span!("exposure").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let windows = aggregate_exposure(&ex.data).context("aggregate exposure")?;
        info!(
            records = ex.height(),
            subjects = windows.len(),
            duration_ms = start.elapsed().as_millis(),
            "exposure aggregation complete"
        );
        Ok(windows)
    })?;

    let outcomes = info_span!("disposition").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let outcomes =
            aggregate_disposition(&ds.data, &rules.status).context("aggregate disposition")?;
        info!(
            records = ds.height(),
            subjects = outcomes.len(),
            duration_ms = start.elapsed().as_millis(),
            "disposition aggregation complete"
        );
        Ok(outcomes)
    })?;

    info_span!("assemble", rules = %rules.name).in_scope(|| -> Result<_> {
        let start = Instant::now();
        let dataset = assemble_adsl(&dm.data, &windows, &outcomes, rules)
            .context("assemble ADSL")?;
        info!(
            subjects = dataset.len(),
            columns = dataset.columns.len(),
            duration_ms = start.elapsed().as_millis(),
            "assembly complete"
        );
        Ok(dataset)
    })
}

/// Load DM, EX and DS from `dir` and derive ADSL.
pub fn run_adsl(dir: &Path, rules: &RuleSet) -> Result<AdslRun> {
    let span = info_span!("adsl", rules = %rules.name);
    let _guard = span.enter();
    let start = Instant::now();

    let domains = load_domains(dir, &ADSL_SOURCE_DOMAINS)?;
    let dataset = derive_adsl(&domains, rules)?;
    info!(
        subjects = dataset.len(),
        duration_ms = start.elapsed().as_millis(),
        "ADSL derived"
    );
    Ok(AdslRun {
        dataset,
        domains: domains.into_iter().map(|d| d.summary).collect(),
    })
}

fn find_domain<'a>(domains: &'a [MergedDomain], code: &str) -> Result<&'a SourceTable> {
    domains
        .iter()
        .map(|d| &d.table)
        .find(|table| table.domain == code)
        .ok_or_else(|| anyhow!("domain {code} was not loaded"))
}
