use std::future::Future;
use std::path::Path;

use isoshelf_fetch::FetchError;
use isoshelf_library::{LocalLibrary, Selection};
use isoshelf_template::{Choices, FileNameTemplate, Placeholder, TemplateError};
use isoshelf_verify::Sha256Digest;
use isoshelf_version::{LengthOrder, Separators, VersionId};
use thiserror::Error;
use url::Url;

/// Failures a vendor reports back to the orchestrator.
#[derive(Debug, Error)]
pub enum VendorError {
    #[error(transparent)]
    Network(#[from] FetchError),

    #[error("no version found at {location}")]
    VersionNotFound { location: String },

    #[error("no checksum for {file_name} in {manifest}")]
    HashNotFound { file_name: String, manifest: String },

    #[error("unexpected vendor data: {0}")]
    Parse(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// What a vendor declares about itself: naming, dimensions and versioning.
#[derive(Debug, Clone)]
pub struct VendorProfile {
    name:         String,
    template:     FileNameTemplate,
    separators:   Separators,
    length_order: LengthOrder,
    version_join: char,
}

impl VendorProfile {
    pub fn new(name: impl Into<String>, template: FileNameTemplate) -> Self {
        Self {
            name: name.into(),
            template,
            separators: Separators::default(),
            length_order: LengthOrder::default(),
            version_join: '.',
        }
    }

    /// Valid editions, in their canonical case.
    pub fn with_editions(mut self, editions: Choices) -> Result<Self, TemplateError> {
        self.template = self.template.with_choices(Placeholder::Edition, editions)?;
        Ok(self)
    }

    /// Valid languages, in their canonical case.
    pub fn with_languages(mut self, languages: Choices) -> Result<Self, TemplateError> {
        self.template = self.template.with_choices(Placeholder::Language, languages)?;
        Ok(self)
    }

    pub fn with_separators(mut self, separators: Separators) -> Self {
        self.separators = separators;
        self
    }

    pub fn with_length_order(mut self, order: LengthOrder) -> Self {
        self.length_order = order;
        self
    }

    /// Character used to join version components when rendering names.
    pub fn with_version_join(mut self, join: char) -> Self {
        self.version_join = join;
        self
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn template(&self) -> &FileNameTemplate { &self.template }

    pub fn separators(&self) -> &Separators { &self.separators }

    pub fn length_order(&self) -> LengthOrder { self.length_order }

    pub fn version_join(&self) -> char { self.version_join }

    pub fn editions(&self) -> Option<&Choices> { self.template.choices(Placeholder::Edition) }

    pub fn languages(&self) -> Option<&Choices> { self.template.choices(Placeholder::Language) }

    pub fn parse_version(&self, raw: &str) -> Result<VersionId, VendorError> {
        VersionId::parse(raw, &self.separators).map_err(|e| VendorError::Parse(format!("version {raw:?}: {e}")))
    }

    /// Bring a requested selection into canonical case and drop dimensions
    /// the template does not have. Every dimension the template does have
    /// must be given.
    pub fn canonical_selection(&self, selection: &Selection) -> Result<Selection, TemplateError> {
        let canon = |placeholder: Placeholder, value: &Option<String>| -> Result<Option<String>, TemplateError> {
            if !self.template.uses(placeholder) {
                return Ok(None);
            }
            match (value, self.template.choices(placeholder)) {
                (Some(v), Some(choices)) => Ok(Some(choices.resolve(placeholder, v)?.to_string())),
                (Some(v), None) => Ok(Some(v.clone())),
                (None, _) => Err(TemplateError::MissingValue(placeholder)),
            }
        };
        Ok(Selection {
            edition:  canon(Placeholder::Edition, &selection.edition)?,
            language: canon(Placeholder::Language, &selection.language)?,
        })
    }

    /// The file name `version` is installed under.
    pub fn file_name(&self, version: &VersionId, selection: &Selection) -> Result<String, TemplateError> {
        self.template
            .render(&selection.values(version.format(self.version_join)))
    }

    /// The local library of this vendor rooted at `dir`.
    pub fn library<'a>(&'a self, dir: &'a Path) -> LocalLibrary<'a> {
        LocalLibrary::new(dir, &self.template)
            .separators(self.separators.clone())
            .length_order(self.length_order)
    }
}

/// The capabilities the orchestrator needs from a vendor.
///
/// Every call is independent: anything a vendor learns while answering one
/// call (a parsed page, a manifest) is not kept for the next.
pub trait Vendor: Send + Sync {
    fn profile(&self) -> &VendorProfile;

    /// The newest version the vendor publishes for `selection`.
    fn fetch_latest_version(
        &self,
        selection: &Selection,
    ) -> impl Future<Output = Result<VersionId, VendorError>> + Send;

    fn get_download_link(
        &self,
        version: &VersionId,
        selection: &Selection,
    ) -> impl Future<Output = Result<Url, VendorError>> + Send;

    /// The published digest of `file_name` at `version`.
    fn get_expected_hash(
        &self,
        version: &VersionId,
        selection: &Selection,
        file_name: &str,
    ) -> impl Future<Output = Result<Sha256Digest, VendorError>> + Send;
}
