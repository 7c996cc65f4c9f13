//! Vendors.
//!
//! Most distributions publish images in a plain directory listing next to
//! a `SHA256SUMS` file. [`IndexVendor`] covers that shape with templates
//! alone; [`VendorKind`] names the built-in presets.

mod index;
mod links;
mod registry;

pub use index::{IndexSpec, IndexVendor, VersionFilter};
pub use links::{Link, LinkSource, extract_links};
pub use registry::{UnknownVendor, VendorKind};
