//! File-name and URL templates.
//!
//! A template is literal text with zero or more of the placeholders
//! `{VERSION}`, `{EDITION}` and `{LANGUAGE}`. Templates render into concrete
//! names and, in reverse, extract placeholder values back out of names found
//! on disk or in a vendor's download listing.
//!
//! ```
//! use isoshelf_template::{FileNameTemplate, Placeholder, TemplateValues};
//!
//! let template: FileNameTemplate = "debian-live-{VERSION}-amd64-{EDITION}.iso".parse().unwrap();
//! let values = TemplateValues::new()
//!     .with(Placeholder::Version, "12.5.0")
//!     .with(Placeholder::Edition, "kde");
//!
//! let name = template.render(&values).unwrap();
//! assert_eq!(name, "debian-live-12.5.0-amd64-kde.iso");
//! assert_eq!(template.capture(&name), Some(values));
//! ```

pub use self::error::TemplateError;
pub use self::placeholder::{Choices, Placeholder, TemplateValues};
pub use self::template::FileNameTemplate;

mod error;
mod placeholder;
mod template;
