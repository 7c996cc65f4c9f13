//! `isoshelf.toml` and the update jobs it describes.
//!
//! ```toml
//! [library]
//! root = "/srv/iso"
//! workers = 2
//!
//! [[vendor]]
//! name = "debian"
//! editions = ["kde", "gnome"]
//! ```
//!
//! Every key can be overridden from the environment with an `ISOSHELF_`
//! prefix and `__` between levels, e.g. `ISOSHELF_LIBRARY__WORKERS=4`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use isoshelf_fetch::{Fetcher, HttpClient, Timeouts};
use isoshelf_library::Selection;
use isoshelf_template::TemplateError;
use isoshelf_update::{UpdateJob, Vendor};
use isoshelf_vendor::{IndexVendor, UnknownVendor, VendorKind};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "ISOSHELF_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),
    #[error(transparent)]
    UnknownVendor(#[from] UnknownVendor),
    #[error("library.workers must be at least 1")]
    NoWorkers,
    #[error("vendor {vendor}: built-in preset is invalid: {source}")]
    Preset {
        vendor: String,
        #[source]
        source: TemplateError,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub library: LibraryConfig,
    pub network: NetworkConfig,
    #[serde(rename = "vendor")]
    pub vendors: Vec<VendorEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub root:    PathBuf,
    pub workers: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root:    PathBuf::from("."),
            workers: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs:    u64,
    pub request_timeout_secs: u64,
    pub user_agent:           String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let timeouts = Timeouts::default();
        Self {
            connect_timeout_secs: timeouts.connect.as_secs(),
            read_timeout_secs:    timeouts.read.as_secs(),
            request_timeout_secs: timeouts.request.as_secs(),
            user_agent:           concat!("isoshelf/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl NetworkConfig {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            read:    Duration::from_secs(self.read_timeout_secs),
            request: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// One `[[vendor]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorEntry {
    pub name:      String,
    /// Relative to the library root. Defaults to the vendor name.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub editions:  Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default = "enabled")]
    pub enabled:   bool,
}

fn enabled() -> bool { true }

impl VendorEntry {
    /// One selection per edition and language pair.
    pub fn selections(&self) -> Vec<Selection> {
        let editions = dimension(&self.editions);
        let languages = dimension(&self.languages);
        editions
            .iter()
            .flat_map(|edition| {
                languages.iter().map(move |language| Selection {
                    edition:  edition.clone(),
                    language: language.clone(),
                })
            })
            .collect()
    }
}

fn dimension(values: &[String]) -> Vec<Option<String>> {
    if values.is_empty() {
        vec![None]
    } else {
        values.iter().cloned().map(Some).collect()
    }
}

/// A selection the vendor does not offer.
#[derive(Debug)]
pub struct Rejected {
    pub vendor:    String,
    pub selection: Selection,
    pub error:     TemplateError,
}

/// Jobs ready to run, and the ones that failed validation.
pub struct Plan<C: HttpClient> {
    pub jobs:     Vec<UpdateJob<IndexVendor<C>>>,
    pub rejected: Vec<Rejected>,
}

impl Config {
    /// Read `path` (a missing file counts as empty) and the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_figment(Figment::new().merge(Toml::file(path)).merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(Box::new)?;
        if config.library.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(config)
    }

    /// Expand the enabled vendor entries into update jobs under `root`.
    ///
    /// `only`, when non-empty, restricts the run to those vendor names.
    /// Unknown vendor names are fatal. A selection the vendor does not offer,
    /// or one missing a dimension its file names need, only rejects that one
    /// job. Selections that name the same files are planned once.
    pub fn plan<C: HttpClient>(
        &self,
        root: &Path,
        only: &[String],
        fetcher: &Arc<Fetcher<C>>,
    ) -> Result<Plan<C>, ConfigError> {
        for name in only {
            name.parse::<VendorKind>()?;
        }

        let mut plan = Plan {
            jobs:     Vec::new(),
            rejected: Vec::new(),
        };
        let mut planned = HashSet::new();
        for entry in &self.vendors {
            let kind: VendorKind = entry.name.parse()?;
            if !entry.enabled || (!only.is_empty() && !only.iter().any(|n| n.eq_ignore_ascii_case(kind.name()))) {
                tracing::debug!(vendor = kind.name(), "skipped");
                continue;
            }

            let vendor = Arc::new(kind.build(fetcher.clone()).map_err(|source| ConfigError::Preset {
                vendor: kind.name().to_string(),
                source,
            })?);
            let directory = root.join(entry.directory.clone().unwrap_or_else(|| kind.name().into()));

            for selection in entry.selections() {
                match vendor.profile().canonical_selection(&selection) {
                    Ok(canonical) => {
                        if planned.insert((directory.clone(), canonical.clone())) {
                            plan.jobs.push(UpdateJob::new(vendor.clone(), &directory, canonical));
                        } else {
                            tracing::debug!(vendor = kind.name(), %selection, "duplicate selection, skipped");
                        }
                    }
                    Err(error) => {
                        tracing::error!(vendor = kind.name(), %selection, %error, "invalid selection, job skipped");
                        plan.rejected.push(Rejected {
                            vendor: kind.name().to_string(),
                            selection,
                            error,
                        });
                    }
                }
            }
        }
        Ok(plan)
    }
}
