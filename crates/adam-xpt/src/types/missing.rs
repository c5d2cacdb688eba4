/// SAS missing value kinds: `.`, `._` and `.A` through `.Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingValue {
    /// Standard missing (`.`).
    Standard,
    /// Underscore missing (`._`).
    Underscore,
    /// Special missing `.A` through `.Z`.
    Special(char),
}

impl MissingValue {
    /// Decode the first byte of a missing numeric.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'.' => Some(Self::Standard),
            b'_' => Some(Self::Underscore),
            b'A'..=b'Z' => Some(Self::Special(code as char)),
            _ => None,
        }
    }

    /// The byte written in the first position of the numeric field.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Standard => b'.',
            Self::Underscore => b'_',
            Self::Special(ch) if ch.is_ascii_uppercase() => ch as u8,
            Self::Special(_) => b'.',
        }
    }
}

impl std::fmt::Display for MissingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "."),
            Self::Underscore => write!(f, "._"),
            Self::Special(ch) => write!(f, ".{ch}"),
        }
    }
}
