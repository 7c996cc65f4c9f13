use std::sync::Arc;

use isoshelf_fetch::{Fetcher, HttpClient};
use isoshelf_library::Selection;
use isoshelf_template::{FileNameTemplate, Placeholder, TemplateValues};
use isoshelf_update::{Vendor, VendorError, VendorProfile};
use isoshelf_verify::{ManifestFormat, Sha256Digest, find_entry, parse_manifest_with};
use isoshelf_version::VersionId;
use url::Url;

use crate::links::{LinkSource, extract_links};

/// Decides whether a listed version belongs to a selection.
pub type VersionFilter = fn(&VersionId, &Selection) -> bool;

/// Where a directory-index vendor publishes releases.
///
/// Every template here is rendered with the job's version and selection.
#[derive(Debug, Clone)]
pub struct IndexSpec {
    /// Page listing the releases.
    pub index_url:       String,
    /// Matched against each link of the index page. Defaults to the mirror
    /// file name.
    pub link:            Option<FileNameTemplate>,
    pub link_source:     LinkSource,
    /// `link` only has to match the leading words of the link, e.g.
    /// `Ubuntu {VERSION}` against `Ubuntu 24.04.1 LTS (Noble Numbat)`.
    pub link_leading:    bool,
    /// Directory URL the image is downloaded from, ending in `/`.
    pub download_base:   FileNameTemplate,
    /// File name on the mirror when it differs from the installed name.
    pub remote_name:     Option<FileNameTemplate>,
    pub manifest:        FileNameTemplate,
    pub manifest_format: ManifestFormat,
    /// Reject versions with a text component (`noble`, `current`).
    pub numeric_only:    bool,
    pub filter:          Option<VersionFilter>,
}

/// A vendor whose releases are discovered from one index page.
pub struct IndexVendor<C: HttpClient> {
    fetcher: Arc<Fetcher<C>>,
    profile: VendorProfile,
    spec:    IndexSpec,
}

impl<C: HttpClient> IndexVendor<C> {
    pub fn new(fetcher: Arc<Fetcher<C>>, profile: VendorProfile, spec: IndexSpec) -> Self {
        Self { fetcher, profile, spec }
    }

    pub fn spec(&self) -> &IndexSpec { &self.spec }

    fn remote_template(&self) -> &FileNameTemplate {
        self.spec.remote_name.as_ref().unwrap_or(self.profile.template())
    }

    fn values(&self, version: &VersionId, selection: &Selection) -> TemplateValues {
        selection.values(version.format(self.profile.version_join()))
    }

    /// Name of the image on the mirror, which is also its manifest key.
    pub fn remote_name(&self, version: &VersionId, selection: &Selection) -> Result<String, VendorError> {
        Ok(self.remote_template().render(&self.values(version, selection))?)
    }

    fn render_url(&self, template: &FileNameTemplate, version: &VersionId, selection: &Selection) -> Result<Url, VendorError> {
        let raw = template.render(&self.values(version, selection))?;
        Url::parse(&raw).map_err(|e| VendorError::Parse(format!("{raw}: {e}")))
    }

    /// The newest acceptable version among `page`'s links.
    pub fn latest_in(&self, page: &str, selection: &Selection) -> Option<VersionId> {
        let link_template = self.spec.link.as_ref().unwrap_or(self.remote_template());
        let order = self.profile.length_order();

        extract_links(page)
            .iter()
            .filter_map(|link| {
                let text = link.get(self.spec.link_source);
                if self.spec.link_leading {
                    link_template.capture_leading(text)
                } else {
                    link_template.capture(text)
                }
            })
            .filter(|captured| selection.accepts(captured))
            .filter_map(|captured| {
                let raw = captured.get(Placeholder::Version)?;
                VersionId::parse(raw, self.profile.separators()).ok()
            })
            .filter(|version| !self.spec.numeric_only || version.is_numeric())
            .filter(|version| self.spec.filter.is_none_or(|accept| accept(version, selection)))
            .max_by(|a, b| a.compare(b, order))
    }
}

impl<C: HttpClient> Vendor for IndexVendor<C> {
    fn profile(&self) -> &VendorProfile { &self.profile }

    async fn fetch_latest_version(&self, selection: &Selection) -> Result<VersionId, VendorError> {
        let page = self.fetcher.get_text(&self.spec.index_url).await?;
        let latest = self.latest_in(&page, selection).ok_or_else(|| VendorError::VersionNotFound {
            location: self.spec.index_url.clone(),
        })?;
        tracing::debug!(vendor = self.profile.name(), version = %latest, "latest published version");
        Ok(latest)
    }

    async fn get_download_link(&self, version: &VersionId, selection: &Selection) -> Result<Url, VendorError> {
        let base = self.render_url(&self.spec.download_base, version, selection)?;
        let name = self.remote_name(version, selection)?;
        base.join(&name)
            .map_err(|e| VendorError::Parse(format!("{base} + {name}: {e}")))
    }

    async fn get_expected_hash(
        &self,
        version: &VersionId,
        selection: &Selection,
        file_name: &str,
    ) -> Result<Sha256Digest, VendorError> {
        let manifest_url = self.render_url(&self.spec.manifest, version, selection)?;
        let text = self.fetcher.get_text(manifest_url.as_str()).await?;
        let entries = parse_manifest_with(&text, self.spec.manifest_format);

        let remote = self.remote_name(version, selection)?;
        let candidates = [remote.clone(), format!("./{remote}"), file_name.to_string()];
        find_entry(&entries, &candidates)
            .map(|entry| entry.digest)
            .ok_or_else(|| VendorError::HashNotFound {
                file_name: remote,
                manifest:  manifest_url.to_string(),
            })
    }
}
