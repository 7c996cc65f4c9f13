use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TemplateError;

/// The fixed set of template placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Placeholder {
    Version,
    Edition,
    Language,
}

impl Placeholder {
    pub const ALL: [Placeholder; 3] = [Self::Version, Self::Edition, Self::Language];

    pub fn token(self) -> &'static str {
        match self {
            Self::Version => "VERSION",
            Self::Edition => "EDITION",
            Self::Language => "LANGUAGE",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.token() == token)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.token()) }
}

/// Placeholder values, either supplied for rendering or extracted by matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateValues(BTreeMap<Placeholder, String>);

impl TemplateValues {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, placeholder: Placeholder, value: impl Into<String>) -> Self {
        self.insert(placeholder, value);
        self
    }

    pub fn insert(&mut self, placeholder: Placeholder, value: impl Into<String>) {
        self.0.insert(placeholder, value.into());
    }

    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        self.0.get(&placeholder).map(String::as_str)
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (Placeholder, &str)> {
        self.0.iter().map(|(p, v)| (*p, v.as_str()))
    }
}

/// The enumerated values a vendor accepts for an edition or language.
///
/// Lookups are ASCII case-insensitive and return the vendor's canonical
/// spelling. An empty set accepts nothing; callers treat it as "dimension not
/// declared".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choices(Vec<String>);

impl Choices {
    pub fn new<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self(values.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &str> { self.0.iter().map(String::as_str) }

    pub fn canonicalize(&self, value: &str) -> Option<&str> {
        self.iter().find(|c| c.eq_ignore_ascii_case(value))
    }

    /// Like [`canonicalize`](Self::canonicalize) but reports which placeholder failed.
    pub fn resolve(&self, placeholder: Placeholder, value: &str) -> Result<&str, TemplateError> {
        self.canonicalize(value)
            .ok_or_else(|| TemplateError::InvalidChoice {
                placeholder,
                value: value.to_string(),
                valid: self.0.join(", "),
            })
    }
}
