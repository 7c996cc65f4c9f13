//! A single token of a version identifier.

use std::cmp::Ordering;
use std::fmt;

/// One token of a [`VersionId`](crate::VersionId).
///
/// Numeric tokens keep their raw spelling so that `04` renders back as `04`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Component {
    Numeric { value: u64, raw: String },
    Text(String),
}

impl Component {
    /// Classify a raw token. All-digit tokens that fit in a `u64` are numeric.
    pub fn parse(raw: &str) -> Self {
        if !raw.is_empty()
            && raw.bytes().all(|b| b.is_ascii_digit())
            && let Ok(value) = raw.parse::<u64>()
        {
            return Self::Numeric {
                value,
                raw: raw.to_string(),
            };
        }
        Self::Text(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Numeric { raw, .. } => raw,
            Self::Text(s) => s,
        }
    }

    pub fn is_numeric(&self) -> bool { matches!(self, Self::Numeric { .. }) }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Numeric { value, .. } => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (
                Self::Numeric { value: a, raw: ra },
                Self::Numeric { value: b, raw: rb },
            ) => a.cmp(b).then_with(|| ra.cmp(rb)),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Numeric { .. }, Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Numeric { .. }) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
