use super::{XptColumn, XptValue};

/// A single XPT member: variable definitions plus observation rows.
#[derive(Debug, Clone, PartialEq)]
pub struct XptDataset {
    pub name: String,
    pub label: Option<String>,
    pub dataset_type: Option<String>,
    pub columns: Vec<XptColumn>,
    pub rows: Vec<Vec<XptValue>>,
}

impl XptDataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            dataset_type: None,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn with_columns(name: impl Into<String>, columns: Vec<XptColumn>) -> Self {
        Self {
            columns,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_type(mut self, dataset_type: impl Into<String>) -> Self {
        self.dataset_type = Some(dataset_type.into());
        self
    }

    pub fn add_row(&mut self, row: Vec<XptValue>) {
        self.rows.push(row);
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_by_name(&self, name: &str) -> Option<&XptColumn> {
        self.columns.iter().find(|col| col.name == name)
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    /// Sum of variable widths.
    #[must_use]
    pub fn observation_length(&self) -> usize {
        self.columns.iter().map(|col| col.length as usize).sum()
    }

    /// Label written to the member header; falls back to the dataset name.
    #[must_use]
    pub fn effective_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}
