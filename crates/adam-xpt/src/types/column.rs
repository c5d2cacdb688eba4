/// Variable storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XptType {
    Num,
    Char,
}

impl XptType {
    /// Decode the NAMESTR `ntype` field (1 = numeric, 2 = character).
    #[must_use]
    pub fn from_ntype(ntype: i16) -> Option<Self> {
        match ntype {
            1 => Some(Self::Num),
            2 => Some(Self::Char),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_ntype(self) -> i16 {
        match self {
            Self::Num => 1,
            Self::Char => 2,
        }
    }
}

impl std::fmt::Display for XptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Num => write!(f, "Num"),
            Self::Char => write!(f, "Char"),
        }
    }
}

/// Format justification (`nfj`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justification {
    #[default]
    Left,
    Right,
}

impl Justification {
    #[must_use]
    pub fn from_nfj(nfj: i16) -> Self {
        if nfj == 1 { Self::Right } else { Self::Left }
    }

    #[must_use]
    pub fn to_nfj(self) -> i16 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

/// Variable definition parsed from or written to a NAMESTR record.
#[derive(Debug, Clone, PartialEq)]
pub struct XptColumn {
    pub name: String,
    pub label: Option<String>,
    pub data_type: XptType,
    /// Width of the variable in each observation, in bytes.
    pub length: u16,
    pub format: Option<String>,
    pub format_length: u16,
    pub format_decimals: u16,
    pub informat: Option<String>,
    pub informat_length: u16,
    pub informat_decimals: u16,
    pub justification: Justification,
}

impl XptColumn {
    fn new(name: impl Into<String>, data_type: XptType, length: u16) -> Self {
        Self {
            name: name.into(),
            label: None,
            data_type,
            length,
            format: None,
            format_length: 0,
            format_decimals: 0,
            informat: None,
            informat_length: 0,
            informat_decimals: 0,
            justification: Justification::Left,
        }
    }

    /// An 8-byte numeric variable.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, XptType::Num, 8)
    }

    /// A character variable of the given byte width (at least 1).
    pub fn character(name: impl Into<String>, length: u16) -> Self {
        Self::new(name, XptType::Char, length.max(1))
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: u16) -> Self {
        self.length = length;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>, length: u16, decimals: u16) -> Self {
        self.format = Some(format.into());
        self.format_length = length;
        self.format_decimals = decimals;
        self
    }

    #[must_use]
    pub fn with_informat(mut self, informat: impl Into<String>, length: u16, decimals: u16) -> Self {
        self.informat = Some(informat.into());
        self.informat_length = length;
        self.informat_decimals = decimals;
        self
    }

    #[must_use]
    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.data_type == XptType::Num
    }
}
