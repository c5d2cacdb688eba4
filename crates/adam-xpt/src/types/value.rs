use super::MissingValue;

/// A numeric cell: either a value or one of the SAS missing kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    Value(f64),
    Missing(MissingValue),
}

impl NumericValue {
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Missing(_) => None,
        }
    }

    #[must_use]
    pub fn missing_type(&self) -> Option<MissingValue> {
        match self {
            Self::Value(_) => None,
            Self::Missing(kind) => Some(*kind),
        }
    }
}

impl From<Option<f64>> for NumericValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Self::Value(v),
            _ => Self::Missing(MissingValue::Standard),
        }
    }
}

/// A single cell of an XPT observation.
#[derive(Debug, Clone, PartialEq)]
pub enum XptValue {
    Char(String),
    Num(NumericValue),
}

impl XptValue {
    pub fn character(value: impl Into<String>) -> Self {
        Self::Char(value.into())
    }

    #[must_use]
    pub fn numeric(value: f64) -> Self {
        Self::Num(NumericValue::Value(value))
    }

    #[must_use]
    pub fn numeric_missing() -> Self {
        Self::Num(NumericValue::Missing(MissingValue::Standard))
    }

    #[must_use]
    pub fn numeric_missing_with(missing: MissingValue) -> Self {
        Self::Num(NumericValue::Missing(missing))
    }

    /// True for missing numerics and blank character values.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Char(text) => text.trim().is_empty(),
            Self::Num(num) => num.is_missing(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Char(text) => Some(text),
            Self::Num(_) => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(num) => num.value(),
            Self::Char(_) => None,
        }
    }
}
