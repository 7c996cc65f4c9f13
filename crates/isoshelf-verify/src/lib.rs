//! Content verification primitives for downloaded images.
//!
//! Vendors publish a checksum list (`SHA256SUMS` and friends) next to their
//! images. This crate parses those lists, looks up the entry for a rendered
//! file name, and checks a file on disk against it without ever holding the
//! whole file in memory.
//!
//! # Example
//!
//! ```
//! use isoshelf_verify::{Sha256Digest, Sha256Hasher, VerifiedReader};
//!
//! let data = b"hello world";
//! let expected = Sha256Digest::of(b"hello world");
//!
//! let mut reader = VerifiedReader::new(&data[..], Sha256Hasher::new());
//! std::io::copy(&mut reader, &mut std::io::sink()).unwrap();
//! reader.finish(&expected).unwrap();
//! ```

pub use self::digest::Sha256Digest;
pub use self::error::{Result, VerifyError};
pub use self::file::{CHUNK_SIZE, sha256_file, sha256_reader, verify_file, verify_file_hex};
pub use self::hasher::{Hasher, Sha256Hasher};
pub use self::manifest::{ManifestEntry, ManifestFormat, find_entry, parse_manifest, parse_manifest_with};
pub use self::reader::VerifiedReader;

mod digest;
mod error;
mod file;
mod hasher;
mod manifest;
mod reader;
