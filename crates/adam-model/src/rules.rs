//! Derivation rule sets.
//!
//! Every lookup table and column list the derivation depends on lives in a
//! [`RuleSet`]. The built-in versions reproduce the successive ADSL programs
//! of the CDISC pilot study; custom versions are loaded from TOML.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::adsl::field_spec;
use crate::error::{AdamError, Result};

/// How a single disposition record is chosen when a subject has several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispositionSelection {
    /// Latest status date wins; missing dates rank last, ties keep record order.
    #[default]
    MostRecent,
    /// The first qualifying record in source order.
    FirstListed,
}

impl fmt::Display for DispositionSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MostRecent => write!(f, "most-recent"),
            Self::FirstListed => write!(f, "first-listed"),
        }
    }
}

/// End-of-study status classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusRules {
    /// `DSCAT` value of the records that take part.
    pub category: String,
    /// Status for which `DCSREAS` carries the decoded term.
    pub discontinued: String,
    /// Status for subjects without a classified record; empty leaves them null.
    pub default_status: String,
    pub selection: DispositionSelection,
    /// `DSDECOD` term to status, exact match.
    pub terms: BTreeMap<String, String>,
}

impl StatusRules {
    pub fn status_for(&self, term: &str) -> Option<&str> {
        self.terms.get(term).map(String::as_str)
    }

    pub fn fallback_status(&self) -> Option<&str> {
        if self.default_status.is_empty() {
            None
        } else {
            Some(&self.default_status)
        }
    }
}

impl Default for StatusRules {
    fn default() -> Self {
        let terms = [
            ("COMPLETED", "COMPLETED"),
            ("DEATH", "DISCONTINUED"),
            ("ADVERSE EVENT", "DISCONTINUED"),
            ("STUDY TERMINATED BY SPONSOR", "DISCONTINUED"),
            ("SCREEN FAILURE", "NOT STARTED"),
            ("WITHDRAWAL BY SUBJECT", "DISCONTINUED"),
            ("PHYSICIAN DECISION", "DISCONTINUED"),
            ("PROTOCOL VIOLATION", "DISCONTINUED"),
            ("LOST TO FOLLOW-UP", "DISCONTINUED"),
            ("LACK OF EFFICACY", "DISCONTINUED"),
        ];
        Self {
            category: "DISPOSITION EVENT".to_string(),
            terms: owned_map(&terms),
            discontinued: "DISCONTINUED".to_string(),
            default_status: "ONGOING".to_string(),
            selection: DispositionSelection::MostRecent,
        }
    }
}

/// Supplemental qualifier renamed into a population flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagRename {
    pub source: String,
    pub target: String,
}

impl FlagRename {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Age categories with closed upper bounds.
///
/// A value equal to a cutpoint falls into the lower bucket; `lower` itself is
/// included in the first bucket. Ages below `lower` have no category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgeGrouping {
    pub lower: f64,
    pub cutpoints: Vec<f64>,
    pub labels: Vec<String>,
}

impl AgeGrouping {
    pub fn group(&self, age: f64) -> Option<&str> {
        if !age.is_finite() || age < self.lower {
            return None;
        }
        let index = self
            .cutpoints
            .iter()
            .position(|&cut| age <= cut)
            .unwrap_or(self.cutpoints.len());
        self.labels.get(index).map(String::as_str)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.lower.is_finite() || self.cutpoints.iter().any(|c| !c.is_finite()) {
            return Err(AdamError::invalid_rules(name, "age bounds must be finite"));
        }
        let mut previous = self.lower;
        for &cut in &self.cutpoints {
            if cut <= previous {
                return Err(AdamError::invalid_rules(
                    name,
                    format!("age cutpoint {cut} is not above {previous}"),
                ));
            }
            previous = cut;
        }
        if self.labels.len() != self.cutpoints.len() + 1 {
            return Err(AdamError::invalid_rules(
                name,
                format!(
                    "{} age cutpoints need {} labels, found {}",
                    self.cutpoints.len(),
                    self.cutpoints.len() + 1,
                    self.labels.len()
                ),
            ));
        }
        Ok(())
    }
}

impl Default for AgeGrouping {
    fn default() -> Self {
        Self {
            lower: 0.0,
            cutpoints: vec![65.0, 75.0],
            labels: vec!["<65".into(), "65-74".into(), "75+".into()],
        }
    }
}

/// Built-in rule set versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSetVersion {
    Standard,
    Pilot,
    PopulationFlags,
    Baseline,
}

impl RuleSetVersion {
    pub const ALL: [Self; 4] = [
        Self::Standard,
        Self::Pilot,
        Self::PopulationFlags,
        Self::Baseline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Pilot => "pilot",
            Self::PopulationFlags => "population-flags",
            Self::Baseline => "baseline",
        }
    }

    pub fn rules(self) -> RuleSet {
        match self {
            Self::Standard => RuleSet::standard(),
            Self::Pilot => RuleSet::pilot(),
            Self::PopulationFlags => RuleSet::population_flags(),
            Self::Baseline => RuleSet::baseline(),
        }
    }
}

impl fmt::Display for RuleSetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const STANDARD_COLUMNS: [&str; 24] = [
    "STUDYID", "USUBJID", "SUBJID", "AGE", "AGEU", "AGEGRP1", "SEX", "RACE", "TRTSDT", "TRTEDT",
    "TRT01P", "TRT01PN", "TRT01A", "TRT01AN", "FASFL", "SAFFL", "ITTFL", "EFFFL", "COMPFL8",
    "COMPFL16", "COMPFL24", "EOSSTT", "EOSDT", "DCSREAS",
];

const POPULATION_FLAG_COLUMNS: [&str; 15] = [
    "STUDYID", "USUBJID", "SUBJID", "AGE", "AGEU", "AGEGRP1", "SEX", "RACE", "TRTSDT", "TRTEDT",
    "TRT01P", "TRT01A", "FASFL", "SAFFL", "ITTFL",
];

const BASELINE_COLUMNS: [&str; 13] = [
    "STUDYID", "USUBJID", "SUBJID", "AGEU", "AGE", "AGEGRP1", "SEX", "RACE", "TRTSDT", "TRTEDT",
    "TRT01P", "TRT01A", "FASFL",
];

/// Explicit configuration for one ADSL derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    pub name: String,
    /// Value of a renamed flag that is absent or null.
    #[serde(default = "default_flag_fill")]
    pub flag_default: String,
    /// Projected ADSL columns, in output order.
    pub columns: Vec<String>,
    #[serde(default)]
    pub status: StatusRules,
    /// Treatment arm to numeric code, exact match.
    #[serde(default)]
    pub treatment_codes: BTreeMap<String, i64>,
    #[serde(default)]
    pub flags: Vec<FlagRename>,
    #[serde(default)]
    pub age_groups: AgeGrouping,
}

fn default_flag_fill() -> String {
    "N".to_string()
}

fn owned_map<V, T>(pairs: &[(&str, V)]) -> BTreeMap<String, T>
where
    V: Clone + Into<T>,
{
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.clone().into()))
        .collect()
}

fn owned_list(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

fn pilot_treatment_codes() -> BTreeMap<String, i64> {
    owned_map::<i64, i64>(&[
        ("Xanomeline High Dose", 1),
        ("Xanomeline Low Dose", 2),
        ("Placebo", 3),
        ("Screen Failure", 99),
    ])
}

impl RuleSet {
    /// Full status table, six population flags and the 24-column ADSL.
    pub fn standard() -> Self {
        Self {
            name: RuleSetVersion::Standard.as_str().to_string(),
            status: StatusRules::default(),
            treatment_codes: pilot_treatment_codes(),
            flags: vec![
                FlagRename::new("SAFETY", "SAFFL"),
                FlagRename::new("ITT", "ITTFL"),
                FlagRename::new("EFFICACY", "EFFFL"),
                FlagRename::new("COMPLT8", "COMPFL8"),
                FlagRename::new("COMPLT16", "COMPFL16"),
                FlagRename::new("COMPLT24", "COMPFL24"),
            ],
            flag_default: default_flag_fill(),
            age_groups: AgeGrouping::default(),
            columns: owned_list(&STANDARD_COLUMNS),
        }
    }

    /// First-generation program: five-term status table with `DEATH` counted
    /// as completed, first-listed disposition record, no ongoing fill.
    pub fn pilot() -> Self {
        let terms = [
            ("COMPLETED", "COMPLETED"),
            ("ADVERSE EVENT", "DISCONTINUED"),
            ("WITHDRAWAL BY SUBJECT", "DISCONTINUED"),
            ("LOST TO FOLLOW-UP", "DISCONTINUED"),
            ("DEATH", "COMPLETED"),
        ];
        Self {
            name: RuleSetVersion::Pilot.as_str().to_string(),
            status: StatusRules {
                terms: owned_map(&terms),
                default_status: String::new(),
                selection: DispositionSelection::FirstListed,
                ..StatusRules::default()
            },
            columns: owned_list(&STANDARD_COLUMNS[..22]),
            ..Self::standard()
        }
    }

    /// Safety and intent-to-treat flags only.
    pub fn population_flags() -> Self {
        Self {
            name: RuleSetVersion::PopulationFlags.as_str().to_string(),
            treatment_codes: BTreeMap::new(),
            flags: vec![
                FlagRename::new("SAFETY", "SAFFL"),
                FlagRename::new("ITT", "ITTFL"),
            ],
            columns: owned_list(&POPULATION_FLAG_COLUMNS),
            ..Self::standard()
        }
    }

    /// Demographics and treatment window only.
    pub fn baseline() -> Self {
        Self {
            name: RuleSetVersion::Baseline.as_str().to_string(),
            treatment_codes: BTreeMap::new(),
            flags: Vec::new(),
            columns: owned_list(&BASELINE_COLUMNS),
            ..Self::standard()
        }
    }

    pub fn builtin(version: RuleSetVersion) -> Self {
        version.rules()
    }

    /// Parse and validate a TOML rule set. `origin` names the source in errors.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self> {
        let rules: Self = toml::from_str(text).map_err(|source| AdamError::RuleSetParse {
            origin: origin.to_string(),
            source,
        })?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| AdamError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.name.as_str();
        if name.trim().is_empty() {
            return Err(AdamError::invalid_rules(name, "name is empty"));
        }

        self.age_groups.validate(name)?;

        if self.status.terms.values().any(|status| status.is_empty()) {
            return Err(AdamError::invalid_rules(name, "status terms map to an empty status"));
        }

        let mut targets = BTreeSet::new();
        for flag in &self.flags {
            if flag.source.is_empty() || flag.target.is_empty() {
                return Err(AdamError::invalid_rules(name, "flag rename with empty name"));
            }
            if field_spec(&flag.target).is_some() {
                return Err(AdamError::invalid_rules(
                    name,
                    format!("flag {} collides with a derived ADSL variable", flag.target),
                ));
            }
            if !targets.insert(flag.target.as_str()) {
                return Err(AdamError::invalid_rules(
                    name,
                    format!("flag {} is produced twice", flag.target),
                ));
            }
        }

        if self.columns.is_empty() {
            return Err(AdamError::invalid_rules(name, "column list is empty"));
        }
        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if field_spec(column).is_none() && !targets.contains(column.as_str()) {
                return Err(AdamError::UnknownColumn {
                    column: column.clone(),
                });
            }
            if !seen.insert(column.as_str()) {
                return Err(AdamError::invalid_rules(
                    name,
                    format!("column {column} is listed twice"),
                ));
            }
        }
        Ok(())
    }

    pub fn treatment_code(&self, arm: &str) -> Option<i64> {
        self.treatment_codes.get(arm).copied()
    }

    /// ADSL names of the renamed flags, in rule order.
    pub fn flag_columns(&self) -> Vec<String> {
        self.flags.iter().map(|flag| flag.target.clone()).collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn builtin_rule_sets_validate() {
        for version in RuleSetVersion::ALL {
            let rules = version.rules();
            rules.validate().unwrap();
            assert_eq!(rules.name, version.as_str());
        }
    }

    #[test]
    fn builtin_column_counts() {
        assert_eq!(RuleSet::standard().columns.len(), 24);
        assert_eq!(RuleSet::pilot().columns.len(), 22);
        assert_eq!(RuleSet::pilot().columns.last().unwrap(), "EOSSTT");
        assert_eq!(RuleSet::population_flags().columns.len(), 15);
        let baseline = RuleSet::baseline();
        assert_eq!(baseline.columns.len(), 13);
        assert_eq!(baseline.columns[3], "AGEU");
        assert_eq!(baseline.columns[4], "AGE");
    }

    #[test]
    fn status_lookup_is_exact() {
        let status = StatusRules::default();
        assert_eq!(status.status_for("COMPLETED"), Some("COMPLETED"));
        assert_eq!(status.status_for("DEATH"), Some("DISCONTINUED"));
        assert_eq!(status.status_for("SCREEN FAILURE"), Some("NOT STARTED"));
        assert_eq!(status.status_for("completed"), None);
        assert_eq!(status.fallback_status(), Some("ONGOING"));

        let pilot = RuleSet::pilot().status;
        assert_eq!(pilot.status_for("DEATH"), Some("COMPLETED"));
        assert_eq!(pilot.status_for("LACK OF EFFICACY"), None);
        assert_eq!(pilot.fallback_status(), None);
        assert_eq!(pilot.selection, DispositionSelection::FirstListed);
    }

    #[test]
    fn status_tables_hold_every_term() {
        let standard = StatusRules::default();
        assert_eq!(standard.terms.len(), 10);
        assert_eq!(
            standard.terms.get("LACK OF EFFICACY").map(String::as_str),
            Some("DISCONTINUED")
        );

        let pilot = RuleSet::pilot().status;
        assert_eq!(pilot.terms.len(), 5);
        assert_eq!(pilot.terms.get("DEATH").map(String::as_str), Some("COMPLETED"));
    }

    #[test]
    fn treatment_codes() {
        let rules = RuleSet::standard();
        assert_eq!(rules.treatment_code("Placebo"), Some(3));
        assert_eq!(rules.treatment_code("Screen Failure"), Some(99));
        assert_eq!(rules.treatment_code("Unknown Arm"), None);
    }

    #[test]
    fn age_group_boundaries() {
        let groups = AgeGrouping::default();
        assert_eq!(groups.group(0.0), Some("<65"));
        assert_eq!(groups.group(65.0), Some("<65"));
        assert_eq!(groups.group(65.0001), Some("65-74"));
        assert_eq!(groups.group(75.0), Some("65-74"));
        assert_eq!(groups.group(75.0001), Some("75+"));
        assert_eq!(groups.group(-1.0), None);
        assert_eq!(groups.group(f64::NAN), None);
    }

    #[test]
    fn rejects_bad_age_grouping() {
        let mut rules = RuleSet::standard();
        rules.age_groups.cutpoints = vec![75.0, 65.0];
        assert!(matches!(
            rules.validate(),
            Err(AdamError::InvalidRuleSet { .. })
        ));

        let mut rules = RuleSet::standard();
        rules.age_groups.labels.pop();
        assert!(matches!(
            rules.validate(),
            Err(AdamError::InvalidRuleSet { .. })
        ));
    }

    #[test]
    fn rejects_unknown_and_duplicate_columns() {
        let mut rules = RuleSet::baseline();
        rules.columns.push("SAFFL".to_string());
        assert!(matches!(
            rules.validate(),
            Err(AdamError::UnknownColumn { column }) if column == "SAFFL"
        ));

        let mut rules = RuleSet::baseline();
        rules.columns.push("AGE".to_string());
        assert!(matches!(
            rules.validate(),
            Err(AdamError::InvalidRuleSet { .. })
        ));
    }

    #[test]
    fn rejects_flag_shadowing_derived_variable() {
        let mut rules = RuleSet::standard();
        rules.flags.push(FlagRename::new("FAS", "FASFL"));
        assert!(rules.validate().is_err());
    }

    proptest! {
        #[test]
        fn every_nonnegative_age_has_a_group(age in 0.0f64..150.0) {
            let groups = AgeGrouping::default();
            prop_assert!(groups.group(age).is_some());
        }

        #[test]
        fn age_groups_are_monotonic(a in 0.0f64..150.0, b in 0.0f64..150.0) {
            let groups = AgeGrouping::default();
            let index = |age: f64| {
                let label = groups.group(age).unwrap();
                groups.labels.iter().position(|l| l == label).unwrap()
            };
            if a <= b {
                prop_assert!(index(a) <= index(b));
            }
        }
    }
}
