use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream;
use isoshelf_fetch::{Body, Fetcher, HttpClient, Timeouts};
use isoshelf_library::Selection;
use isoshelf_update::{ErrorKind, UpdateJob, UpdateState, Updater, Vendor, VendorError};
use isoshelf_vendor::{IndexVendor, VendorKind};
use isoshelf_verify::Sha256Digest;
use tempfile::tempdir;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct MockError(String);

/// Answers GETs from a fixed table of URL to body.
#[derive(Default, Clone)]
struct Site(Arc<HashMap<String, Vec<u8>>>);

impl Site {
    fn new<const N: usize>(pages: [(&str, &[u8]); N]) -> Self {
        Self(Arc::new(pages.into_iter().map(|(url, body)| (url.to_string(), body.to_vec())).collect()))
    }

    fn body(&self, url: &str) -> Result<Vec<u8>, MockError> {
        self.0
            .get(url)
            .cloned()
            .ok_or_else(|| MockError(format!("HTTP status 404 for {url}")))
    }
}

impl HttpClient for Site {
    type Error = MockError;

    async fn stream(&self, url: &str) -> Result<Body<MockError>, MockError> {
        let body = self.body(url)?;
        Ok(Body {
            content_length: Some(body.len() as u64),
            chunks:         Box::pin(stream::iter(vec![Ok(Bytes::from(body))])),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, MockError> {
        Ok(String::from_utf8_lossy(&self.body(url)?).into_owned())
    }
}

fn fetcher(site: Site) -> Arc<Fetcher<Site>> {
    let timeouts = Timeouts {
        connect: Duration::from_secs(5),
        read:    Duration::from_secs(5),
        request: Duration::from_secs(5),
    };
    Arc::new(Fetcher::new(site, timeouts))
}

fn vendor(kind: VendorKind, site: Site) -> IndexVendor<Site> { kind.build(fetcher(site)).unwrap() }

const DEBIAN: &str = "https://cdimage.debian.org/debian-cd/current-live/amd64/iso-hybrid/";
const KALI: &str = "https://cdimage.kali.org/current/";
const UBUNTU: &str = "https://releases.ubuntu.com/";

const DEBIAN_INDEX: &str = r#"<html><body><pre>
<a href="../">../</a>
<a href="debian-live-12.5.0-amd64-gnome.iso">debian-live-12.5.0-amd64-gnome.iso</a>
<a href="debian-live-12.5.0-amd64-kde.iso">debian-live-12.5.0-amd64-kde.iso</a>
<a href="debian-live-12.5.0-amd64-kde.iso.contents">debian-live-12.5.0-amd64-kde.iso.contents</a>
<a href="SHA256SUMS">SHA256SUMS</a>
</pre></body></html>"#;

const KALI_INDEX: &str = r#"<table>
<tr><td><a href="kali-linux-2024.2-installer-amd64.iso">kali-linux-2024.2-installer-amd64.iso</a></td></tr>
<tr><td><a href="kali-linux-2024.2-installer-netinst-amd64.iso">kali-linux-2024.2-installer-netinst-amd64.iso</a></td></tr>
<tr><td><a href="kali-linux-2024.2-live-amd64.iso">kali-linux-2024.2-live-amd64.iso</a></td></tr>
<tr><td><a href="kali-linux-2024.2-live-arm64.iso">kali-linux-2024.2-live-arm64.iso</a></td></tr>
</table>"#;

const UBUNTU_INDEX: &str = r#"<ul>
<li><a href="/20.04/">Ubuntu 20.04.6 LTS (Focal Fossa)</a></li>
<li><a href="/22.04/">Ubuntu 22.04.4 LTS (Jammy Jellyfish)</a></li>
<li><a href="/23.10/">Ubuntu 23.10 (Mantic Minotaur)</a></li>
<li><a href="/24.04/">Ubuntu 24.04.1 LTS (Noble Numbat)</a></li>
<li><a href="/24.10/">Ubuntu 24.10 (Oracular Oriole)</a></li>
<li><a href="/noble/">noble</a></li>
<li><a href="/releases/">releases</a></li>
</ul>"#;

fn url(base: &str, name: &str) -> String { format!("{base}{name}") }

#[tokio::test]
async fn test_debian_latest_for_edition() {
    let site = Site::new([(DEBIAN, DEBIAN_INDEX.as_bytes())]);
    let debian = vendor(VendorKind::Debian, site);

    let latest = debian.fetch_latest_version(&Selection::new().edition("kde")).await.unwrap();
    assert_eq!(latest.to_string(), "12.5.0");

    let err = debian
        .fetch_latest_version(&Selection::new().edition("xfce"))
        .await
        .unwrap_err();
    assert!(matches!(err, VendorError::VersionNotFound { ref location } if location == DEBIAN), "{err:?}");
}

#[tokio::test]
async fn test_kali_editions_do_not_bleed() {
    let site = Site::new([(KALI, KALI_INDEX.as_bytes())]);
    let kali = vendor(VendorKind::Kali, site);

    for edition in ["installer", "installer-netinst", "live"] {
        let latest = kali.fetch_latest_version(&Selection::new().edition(edition)).await.unwrap();
        assert_eq!(latest.to_string(), "2024.2", "{edition}");
    }
    assert!(
        kali.fetch_latest_version(&Selection::new().edition("installer-purple"))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_ubuntu_tracks() {
    let site = Site::new([(UBUNTU, UBUNTU_INDEX.as_bytes())]);
    let ubuntu = vendor(VendorKind::Ubuntu, site);

    let lts = ubuntu.fetch_latest_version(&Selection::new().edition("LTS")).await.unwrap();
    assert_eq!(lts.to_string(), "24.04.1");
    let interim = ubuntu.fetch_latest_version(&Selection::new().edition("Interim")).await.unwrap();
    assert_eq!(interim.to_string(), "24.10");
}

#[tokio::test]
async fn test_download_links() {
    let debian = vendor(VendorKind::Debian, Site::default());
    let version = debian.profile().parse_version("12.5.0").unwrap();
    let link = debian
        .get_download_link(&version, &Selection::new().edition("kde"))
        .await
        .unwrap();
    assert_eq!(link.as_str(), url(DEBIAN, "debian-live-12.5.0-amd64-kde.iso"));

    let ubuntu = vendor(VendorKind::Ubuntu, Site::default());
    let version = ubuntu.profile().parse_version("24.04.1").unwrap();
    let selection = Selection::new().edition("LTS");
    let link = ubuntu.get_download_link(&version, &selection).await.unwrap();
    assert_eq!(link.as_str(), "https://releases.ubuntu.com/24.04.1/ubuntu-24.04.1-desktop-amd64.iso");
    assert_eq!(
        ubuntu.profile().file_name(&version, &selection).unwrap(),
        "ubuntu-LTS-24.04.1-desktop-amd64.iso"
    );
}

#[tokio::test]
async fn test_expected_hash_from_manifest() {
    let kde = Sha256Digest::of(b"kde");
    let gnome = Sha256Digest::of(b"gnome");
    let sums = format!("{gnome}  debian-live-12.5.0-amd64-gnome.iso\n{kde} *debian-live-12.5.0-amd64-kde.iso\n");
    let site = Site::new([(url(DEBIAN, "SHA256SUMS").as_str(), sums.as_bytes())]);
    let debian = vendor(VendorKind::Debian, site);
    let version = debian.profile().parse_version("12.5.0").unwrap();

    let digest = debian
        .get_expected_hash(&version, &Selection::new().edition("kde"), "debian-live-12.5.0-amd64-kde.iso")
        .await
        .unwrap();
    assert_eq!(digest, kde);

    let err = debian
        .get_expected_hash(&version, &Selection::new().edition("xfce"), "debian-live-12.5.0-amd64-xfce.iso")
        .await
        .unwrap_err();
    assert!(matches!(err, VendorError::HashNotFound { .. }), "{err:?}");
}

#[tokio::test]
async fn test_ubuntu_hash_uses_remote_name() {
    let image = Sha256Digest::of(b"noble");
    let sums = format!("{image} *ubuntu-24.04.1-desktop-amd64.iso\n");
    let site = Site::new([("https://releases.ubuntu.com/24.04.1/SHA256SUMS", sums.as_bytes())]);
    let ubuntu = vendor(VendorKind::Ubuntu, site);
    let version = ubuntu.profile().parse_version("24.04.1").unwrap();

    let digest = ubuntu
        .get_expected_hash(&version, &Selection::new().edition("LTS"), "ubuntu-LTS-24.04.1-desktop-amd64.iso")
        .await
        .unwrap();
    assert_eq!(digest, image);
}

#[tokio::test]
async fn test_index_unreachable_is_network() {
    let debian = vendor(VendorKind::Debian, Site::default());
    let err = debian
        .fetch_latest_version(&Selection::new().edition("kde"))
        .await
        .unwrap_err();
    assert!(matches!(err, VendorError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn test_update_end_to_end() {
    const IMAGE: &[u8] = b"kde image";
    let sums = format!("{}  debian-live-12.5.0-amd64-kde.iso\n", Sha256Digest::of(IMAGE));
    let site = Site::new([
        (DEBIAN, DEBIAN_INDEX.as_bytes()),
        (url(DEBIAN, "SHA256SUMS").as_str(), sums.as_bytes()),
        (url(DEBIAN, "debian-live-12.5.0-amd64-kde.iso").as_str(), IMAGE),
    ]);
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("debian-live-12.4.0-amd64-kde.iso"), b"old").unwrap();

    let fetcher = fetcher(site);
    let debian = Arc::new(VendorKind::Debian.build(fetcher.clone()).unwrap());
    let updater = Updater::new(fetcher);
    let job = UpdateJob::new(debian, dir.path(), Selection::new().edition("KDE"));

    let outcome = updater.update(&job).await;
    assert_eq!(outcome.final_state, UpdateState::Replaced, "{:?}", outcome.error);
    let installed = dir.path().join("debian-live-12.5.0-amd64-kde.iso");
    assert_eq!(std::fs::read(&installed).unwrap(), IMAGE);
    assert!(!dir.path().join("debian-live-12.4.0-amd64-kde.iso").exists());

    assert_eq!(updater.update(&job).await.final_state, UpdateState::UpToDate);
}

#[tokio::test]
async fn test_update_with_unlisted_hash_fails_integrity() {
    let site = Site::new([
        (DEBIAN, DEBIAN_INDEX.as_bytes()),
        (url(DEBIAN, "SHA256SUMS").as_str(), b"".as_slice()),
        (url(DEBIAN, "debian-live-12.5.0-amd64-kde.iso").as_str(), b"image".as_slice()),
    ]);
    let dir = tempdir().unwrap();
    let fetcher = fetcher(site);
    let debian = Arc::new(VendorKind::Debian.build(fetcher.clone()).unwrap());
    let outcome = Updater::new(fetcher)
        .update(&UpdateJob::new(debian, dir.path(), Selection::new().edition("kde")))
        .await;

    assert_eq!(outcome.final_state, UpdateState::Failed);
    assert_eq!(outcome.error.as_ref().map(|e| e.kind()), Some(ErrorKind::Integrity));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_ubuntu_point_release_replaces_series() {
    const IMAGE: &[u8] = b"noble point release";
    let sums = format!("{} *ubuntu-24.04.1-desktop-amd64.iso\n", Sha256Digest::of(IMAGE));
    let site = Site::new([
        (UBUNTU, UBUNTU_INDEX.as_bytes()),
        ("https://releases.ubuntu.com/24.04.1/SHA256SUMS", sums.as_bytes()),
        ("https://releases.ubuntu.com/24.04.1/ubuntu-24.04.1-desktop-amd64.iso", IMAGE),
    ]);
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("ubuntu-LTS-24.04-desktop-amd64.iso"), b"noble").unwrap();
    std::fs::write(dir.path().join("ubuntu-Interim-23.10-desktop-amd64.iso"), b"mantic").unwrap();

    let fetcher = fetcher(site);
    let ubuntu = Arc::new(VendorKind::Ubuntu.build(fetcher.clone()).unwrap());
    let updater = Updater::new(fetcher);
    let job = UpdateJob::new(ubuntu, dir.path(), Selection::new().edition("lts"));

    let outcome = updater.update(&job).await;
    assert_eq!(outcome.final_state, UpdateState::Replaced, "{:?}", outcome.error);
    assert_eq!(outcome.remote.map(|v| v.to_string()).as_deref(), Some("24.04.1"));
    assert_eq!(std::fs::read(dir.path().join("ubuntu-LTS-24.04.1-desktop-amd64.iso")).unwrap(), IMAGE);
    assert!(!dir.path().join("ubuntu-LTS-24.04-desktop-amd64.iso").exists());
    assert!(dir.path().join("ubuntu-Interim-23.10-desktop-amd64.iso").exists());

    let again = updater.update(&job).await;
    assert_eq!(again.final_state, UpdateState::UpToDate);
    assert_eq!(again.local.map(|v| v.to_string()).as_deref(), Some("24.04.1"));
}
