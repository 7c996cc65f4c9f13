//! Local library discovery.
//!
//! The library has no database: what is installed is exactly the set of
//! files in a vendor's directory whose names match the vendor's template.
//! [`LocalLibrary`] reads that set back into [`LocalFileRecord`]s.

mod error;
mod scanner;
mod selection;

pub use error::{Result, ScanError};
pub use scanner::{LocalFileRecord, LocalLibrary};
pub use selection::Selection;
