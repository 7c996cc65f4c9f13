use std::io::{self, Read};

use crate::{Hasher, Result, Sha256Digest, VerifyError};

/// Streaming reader that hashes data as it passes through.
pub struct VerifiedReader<R, H> {
    reader: R,
    hasher: H,
}

impl<R, H> VerifiedReader<R, H> {
    pub fn new(reader: R, hasher: H) -> Self { Self { reader, hasher } }
}

impl<R: Read, H: Hasher> Read for VerifiedReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
        }
        Ok(n)
    }
}

impl<R: Read, H: Hasher> VerifiedReader<R, H> {
    /// Digest of everything read so far.
    pub fn digest(self) -> Sha256Digest { self.hasher.finalize() }

    /// Finalize verification against expected hash.
    pub fn finish(self, expected: &Sha256Digest) -> Result<()> {
        let actual = self.hasher.finalize();
        if actual == *expected {
            Ok(())
        } else {
            Err(VerifyError::Mismatch {
                expected: *expected,
                actual,
            })
        }
    }
}
