use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use isoshelf_fetch::{Fetcher, HttpClient};
use isoshelf_library::Selection;
use isoshelf_template::{Choices, FileNameTemplate, TemplateError};
use isoshelf_update::VendorProfile;
use isoshelf_verify::ManifestFormat;
use isoshelf_version::VersionId;

use crate::{IndexSpec, IndexVendor, LinkSource};

const DEBIAN_LIVE: &str = "https://cdimage.debian.org/debian-cd/current-live/amd64/iso-hybrid/";
const KALI_CURRENT: &str = "https://cdimage.kali.org/current/";
const UBUNTU_RELEASES: &str = "https://releases.ubuntu.com/";

/// Built-in vendors, looked up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorKind {
    Debian,
    Kali,
    Ubuntu,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown vendor {0:?} (known: {known})", known = VendorKind::names().join(", "))]
pub struct UnknownVendor(pub String);

impl VendorKind {
    pub const ALL: [VendorKind; 3] = [Self::Debian, Self::Kali, Self::Ubuntu];

    pub fn name(self) -> &'static str {
        match self {
            Self::Debian => "debian",
            Self::Kali => "kali",
            Self::Ubuntu => "ubuntu",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Debian => "Debian Live",
            Self::Kali => "Kali Linux",
            Self::Ubuntu => "Ubuntu Desktop",
        }
    }

    pub fn names() -> Vec<&'static str> { Self::ALL.iter().map(|k| k.name()).collect() }

    /// Case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn profile(self) -> Result<VendorProfile, TemplateError> {
        match self {
            Self::Debian => VendorProfile::new(self.name(), "debian-live-{VERSION}-amd64-{EDITION}.iso".parse()?)
                .with_editions(Choices::new([
                    "cinnamon", "gnome", "kde", "lxde", "lxqt", "mate", "standard", "xfce",
                ])),
            Self::Kali => VendorProfile::new(self.name(), "kali-linux-{VERSION}-{EDITION}-amd64.iso".parse()?)
                .with_editions(Choices::new(["installer", "installer-netinst", "installer-purple", "live"])),
            Self::Ubuntu => VendorProfile::new(self.name(), "ubuntu-{EDITION}-{VERSION}-desktop-amd64.iso".parse()?)
                .with_editions(Choices::new(["LTS", "Interim"])),
        }
    }

    pub fn index(self) -> Result<IndexSpec, TemplateError> {
        let fixed = |url: &str| FileNameTemplate::parse(url);
        Ok(match self {
            Self::Debian => IndexSpec {
                index_url:       DEBIAN_LIVE.to_string(),
                link:            None,
                link_source:     LinkSource::Href,
                link_leading:    false,
                download_base:   fixed(DEBIAN_LIVE)?,
                remote_name:     None,
                manifest:        fixed(&format!("{DEBIAN_LIVE}SHA256SUMS"))?,
                manifest_format: ManifestFormat::Gnu,
                numeric_only:    false,
                filter:          None,
            },
            Self::Kali => IndexSpec {
                index_url:       KALI_CURRENT.to_string(),
                link:            None,
                link_source:     LinkSource::Href,
                link_leading:    false,
                download_base:   fixed(KALI_CURRENT)?,
                remote_name:     None,
                manifest:        fixed(&format!("{KALI_CURRENT}SHA256SUMS"))?,
                manifest_format: ManifestFormat::Gnu,
                numeric_only:    false,
                filter:          None,
            },
            Self::Ubuntu => IndexSpec {
                index_url:       UBUNTU_RELEASES.to_string(),
                // The directory is named after the series (`24.04/`); only the
                // link text carries the point release.
                link:            Some("Ubuntu {VERSION}".parse()?),
                link_source:     LinkSource::Text,
                link_leading:    true,
                download_base:   fixed(&format!("{UBUNTU_RELEASES}{{VERSION}}/"))?,
                remote_name:     Some("ubuntu-{VERSION}-desktop-amd64.iso".parse()?),
                manifest:        fixed(&format!("{UBUNTU_RELEASES}{{VERSION}}/SHA256SUMS"))?,
                manifest_format: ManifestFormat::Gnu,
                numeric_only:    true,
                filter:          Some(ubuntu_track),
            },
        })
    }

    pub fn build<C: HttpClient>(self, fetcher: Arc<Fetcher<C>>) -> Result<IndexVendor<C>, TemplateError> {
        Ok(IndexVendor::new(fetcher, self.profile()?, self.index()?))
    }
}

impl FromStr for VendorKind {
    type Err = UnknownVendor;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::from_name(s).ok_or_else(|| UnknownVendor(s.to_string())) }
}

impl fmt::Display for VendorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// Ubuntu LTS releases are the April releases of even years.
fn is_ubuntu_lts(version: &VersionId) -> bool {
    match version.components() {
        [year, month, ..] => year.as_u64().is_some_and(|y| y % 2 == 0) && month.as_u64() == Some(4),
        _ => false,
    }
}

fn ubuntu_track(version: &VersionId, selection: &Selection) -> bool {
    match selection.edition.as_deref() {
        Some(track) if track.eq_ignore_ascii_case("lts") => is_ubuntu_lts(version),
        Some(track) if track.eq_ignore_ascii_case("interim") => !is_ubuntu_lts(version),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isoshelf_version::Separators;

    fn v(s: &str) -> VersionId { VersionId::parse(s, &Separators::default()).unwrap() }

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(VendorKind::from_name("Debian"), Some(VendorKind::Debian));
        assert_eq!("KALI".parse::<VendorKind>().unwrap(), VendorKind::Kali);
        let err = "arch".parse::<VendorKind>().unwrap_err();
        assert_eq!(err.to_string(), r#"unknown vendor "arch" (known: debian, kali, ubuntu)"#);
    }

    #[test]
    fn test_every_preset_builds() {
        for kind in VendorKind::ALL {
            let profile = kind.profile().unwrap();
            assert_eq!(profile.name(), kind.name());
            assert!(profile.editions().is_some());
            kind.index().unwrap();
        }
    }

    #[test]
    fn test_ubuntu_tracks() {
        assert!(is_ubuntu_lts(&v("24.04")));
        assert!(is_ubuntu_lts(&v("22.04.4")));
        assert!(!is_ubuntu_lts(&v("23.04")));
        assert!(!is_ubuntu_lts(&v("24.10")));

        let lts = Selection::new().edition("LTS");
        let interim = Selection::new().edition("Interim");
        assert!(ubuntu_track(&v("24.04"), &lts));
        assert!(!ubuntu_track(&v("24.10"), &lts));
        assert!(ubuntu_track(&v("24.10"), &interim));
        assert!(ubuntu_track(&v("24.10"), &Selection::new()));
    }
}
