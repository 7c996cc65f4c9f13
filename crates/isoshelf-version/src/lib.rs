//! Version parsing, comparison, and display for vendor release identifiers.
//!
//! Vendors publish versions in many shapes (`12.5.0`, `2024.1`, `24.04`,
//! `23H2`). Rather than forcing them into SemVer, a version is kept as the
//! ordered sequence of tokens produced by splitting on a vendor-declared set of
//! separators.
//!
//! # Ordering
//!
//! - Numeric components compare numerically (`10 > 9`).
//! - Text components compare bytewise.
//! - A numeric component orders below a text component.
//! - When one sequence is a prefix of the other, the [`LengthOrder`] decides.
//!
//! ```
//! use isoshelf_version::{Separators, VersionId};
//!
//! let seps = Separators::default();
//! let newer = VersionId::parse("24.04", &seps).unwrap();
//! let older = VersionId::parse("23.10", &seps).unwrap();
//! assert!(newer > older);
//! assert_eq!(newer.format('.'), "24.04");
//! ```

pub use self::component::Component;
pub use self::version::{LengthOrder, Separators, VersionError, VersionId};

mod component;
mod version;
