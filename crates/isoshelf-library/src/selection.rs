use std::fmt;

use isoshelf_template::{Placeholder, TemplateValues};
use serde::{Deserialize, Serialize};

/// The edition and language one update job is about.
///
/// `None` means "any": the dimension is either absent from the vendor's
/// template or left unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub edition:  Option<String>,
    pub language: Option<String>,
}

impl Selection {
    pub fn new() -> Self { Self::default() }

    pub fn edition(mut self, edition: impl Into<String>) -> Self {
        self.edition = Some(edition.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    fn wanted(&self) -> [(Placeholder, Option<&str>); 2] {
        [
            (Placeholder::Edition, self.edition.as_deref()),
            (Placeholder::Language, self.language.as_deref()),
        ]
    }

    /// Whether values captured from a file name satisfy this selection.
    ///
    /// Comparison ignores ASCII case. A dimension the captured values lack
    /// is not filtered.
    pub fn accepts(&self, captured: &TemplateValues) -> bool {
        self.wanted().into_iter().all(|(placeholder, wanted)| {
            match (wanted, captured.get(placeholder)) {
                (Some(wanted), Some(found)) => wanted.eq_ignore_ascii_case(found),
                _ => true,
            }
        })
    }

    /// Values for rendering a template at `version`.
    pub fn values(&self, version: impl Into<String>) -> TemplateValues {
        let mut values = TemplateValues::new().with(Placeholder::Version, version);
        for (placeholder, wanted) in self.wanted() {
            if let Some(value) = wanted {
                values.insert(placeholder, value);
            }
        }
        values
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.edition, &self.language) {
            (None, None) => f.write_str("-"),
            (Some(e), None) => f.write_str(e),
            (None, Some(l)) => f.write_str(l),
            (Some(e), Some(l)) => write!(f, "{e}/{l}"),
        }
    }
}
