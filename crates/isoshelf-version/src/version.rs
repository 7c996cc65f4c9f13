//! Version identifiers and their ordering.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::Component;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("version string is empty")]
    Empty,
    #[error("empty component in version {0:?}")]
    EmptyComponent(String),
}

/// Characters a raw version string is split on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separators(Vec<char>);

impl Default for Separators {
    fn default() -> Self { Self(vec!['.', '-']) }
}

impl Separators {
    pub fn new(chars: impl IntoIterator<Item = char>) -> Self { Self(chars.into_iter().collect()) }

    pub fn contains(&self, c: char) -> bool { self.0.contains(&c) }

    pub fn as_slice(&self) -> &[char] { &self.0 }
}

/// How two versions compare when one is a strict prefix of the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthOrder {
    /// `12.5` < `12.5.1`
    #[default]
    LongerWins,
    /// `12.5` > `12.5.1`, for vendors whose suffixes mark pre-releases.
    ShorterWins,
}

/// An immutable, ordered sequence of version components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionId {
    components: Vec<Component>,
}

impl VersionId {
    /// Split `raw` on `separators`.
    ///
    /// Surrounding whitespace is ignored. An empty input or an empty token
    /// (`1..2`, a trailing `-`) is rejected so that [`format`](Self::format)
    /// stays the inverse of parsing.
    pub fn parse(raw: &str, separators: &Separators) -> Result<Self, VersionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let components = trimmed
            .split(|c| separators.contains(c))
            .map(|token| {
                if token.is_empty() {
                    Err(VersionError::EmptyComponent(trimmed.to_string()))
                } else {
                    Ok(Component::parse(token))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { components })
    }

    pub fn from_components(components: Vec<Component>) -> Result<Self, VersionError> {
        if components.is_empty() {
            return Err(VersionError::Empty);
        }
        Ok(Self { components })
    }

    pub fn components(&self) -> &[Component] { &self.components }

    pub fn len(&self) -> usize { self.components.len() }

    pub fn is_empty(&self) -> bool { self.components.is_empty() }

    /// True when every component is numeric (`24.04`, not `daily`).
    pub fn is_numeric(&self) -> bool { self.components.iter().all(Component::is_numeric) }

    /// Component-wise comparison; the common prefix decides first, then `length`.
    pub fn compare(&self, other: &Self, length: LengthOrder) -> Ordering {
        for (a, b) in self.components.iter().zip(&other.components) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }

        let by_len = self.components.len().cmp(&other.components.len());
        match length {
            LengthOrder::LongerWins => by_len,
            LengthOrder::ShorterWins => by_len.reverse(),
        }
    }

    /// Join the raw components with `join`.
    pub fn format(&self, join: char) -> String {
        let mut out = String::new();
        for (i, c) in self.components.iter().enumerate() {
            if i > 0 {
                out.push(join);
            }
            out.push_str(c.as_str());
        }
        out
    }
}

impl Ord for VersionId {
    fn cmp(&self, other: &Self) -> Ordering { self.compare(other, LengthOrder::default()) }
}

impl PartialOrd for VersionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.format('.')) }
}

impl Serialize for VersionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(s: &str) -> VersionId { VersionId::parse(s, &Separators::default()).unwrap() }

    #[test]
    fn test_parse_splits_on_default_separators() {
        let id = v("12.5.0-1");
        let parts: Vec<_> = id.components().iter().map(Component::as_str).collect();
        assert_eq!(parts, ["12", "5", "0", "1"]);
    }

    #[test]
    fn test_parse_custom_separator() {
        let id = VersionId::parse("23H2", &Separators::new(['H'])).unwrap();
        assert_eq!(id.len(), 2);
        assert_eq!(id.format('H'), "23H2");
    }

    #[test]
    fn test_parse_rejects_empty() {
        let seps = Separators::default();
        assert_eq!(VersionId::parse("", &seps), Err(VersionError::Empty));
        assert_eq!(VersionId::parse("   ", &seps), Err(VersionError::Empty));
        assert!(matches!(
            VersionId::parse("1..2", &seps),
            Err(VersionError::EmptyComponent(_))
        ));
    }

    #[test]
    fn test_compare_first_difference_wins() {
        assert_eq!(v("24.04").cmp(&v("23.10")), Ordering::Greater);
        assert_eq!(v("12.10.0").cmp(&v("12.9.9")), Ordering::Greater);
        assert_eq!(v("2024.1").cmp(&v("2024.1")), Ordering::Equal);
    }

    #[test]
    fn test_compare_length_order() {
        assert_eq!(v("12.5").compare(&v("12.5.1"), LengthOrder::LongerWins), Ordering::Less);
        assert_eq!(v("12.5").compare(&v("12.5.1"), LengthOrder::ShorterWins), Ordering::Greater);
    }

    #[test]
    fn test_format_preserves_raw_tokens() {
        assert_eq!(v("24-04").format('.'), "24.04");
        assert_eq!(v("2024.01").to_string(), "2024.01");
    }

    #[test]
    fn test_is_numeric() {
        assert!(v("24.04").is_numeric());
        assert!(!v("releases").is_numeric());
    }

    #[test]
    fn test_serialize_as_string() {
        assert_eq!(serde_json::to_string(&v("12.5.0")).unwrap(), "\"12.5.0\"");
    }

    proptest! {
        #[test]
        fn prop_greater_first_difference_orders_greater(
            prefix in proptest::collection::vec(0u32..1000, 0..4),
            low in 0u32..1000,
            bump in 1u32..1000,
            tail_a in proptest::collection::vec(0u32..1000, 0..3),
            tail_b in proptest::collection::vec(0u32..1000, 0..3),
        ) {
            let render = |head: &[u32], x: u32, tail: &[u32]| {
                head.iter()
                    .chain(std::iter::once(&x))
                    .chain(tail)
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(".")
            };
            let a = v(&render(&prefix, low + bump, &tail_a));
            let b = v(&render(&prefix, low, &tail_b));
            prop_assert_eq!(a.cmp(&b), Ordering::Greater);
            prop_assert_eq!(b.cmp(&a), Ordering::Less);
        }

        #[test]
        fn prop_format_inverts_parse(parts in proptest::collection::vec("[a-z0-9]{1,4}", 1..5)) {
            let raw = parts.join(".");
            prop_assert_eq!(v(&raw).format('.'), raw);
        }
    }
}
