use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::{Result, Sha256Digest, Sha256Hasher, VerifiedReader, VerifyError};

/// Read size used when hashing files on disk.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Hash a file in [`CHUNK_SIZE`] pieces.
pub fn sha256_file(path: impl AsRef<Path>) -> Result<Sha256Digest> {
    let path = path.as_ref();
    let read_err = |source| VerifyError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_err)?;
    sha256_reader(file).map_err(read_err)
}

/// Hash everything left in `reader`, in [`CHUNK_SIZE`] pieces.
pub fn sha256_reader(reader: impl Read) -> io::Result<Sha256Digest> {
    let mut reader = VerifiedReader::new(BufReader::with_capacity(CHUNK_SIZE, reader), Sha256Hasher::new());
    io::copy(&mut reader, &mut io::sink())?;
    Ok(reader.digest())
}

/// `Ok(true)` when the file's digest equals `expected`.
pub fn verify_file(path: impl AsRef<Path>, expected: &Sha256Digest) -> Result<bool> {
    Ok(sha256_file(path)? == *expected)
}

/// Like [`verify_file`] with a hex digest in either case.
pub fn verify_file_hex(path: impl AsRef<Path>, expected: &str) -> Result<bool> {
    let expected: Sha256Digest = expected.parse()?;
    verify_file(path, &expected)
}
