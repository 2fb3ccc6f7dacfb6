use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },
}

/// SHA-256 and byte count of streamed content.
pub struct ContentDigest {
    hasher: Sha256,
    len: u64,
}

impl Default for ContentDigest {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentDigest {
    #[inline]
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
            len: 0,
        }
    }

    #[inline]
    pub fn update(&mut self, data: impl AsRef<[u8]>) {
        let data = data.as_ref();
        Digest::update(&mut self.hasher, data);
        self.len += data.len() as u64;
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Checks the byte count against `expected_len`, when one was declared,
    /// and returns the length together with the hex-encoded digest.
    pub fn verify(self, expected_len: Option<u64>) -> Result<(u64, String), VerificationError> {
        if let Some(expected) = expected_len {
            if expected != self.len {
                return Err(VerificationError::SizeMismatch {
                    expected,
                    actual: self.len,
                });
            }
        }

        Ok((self.len, hex::encode(self.hasher.finalize())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_digest() {
        let digest = ContentDigest::new();

        assert!(digest.is_empty());
        let (len, sha256) = digest.verify(None).unwrap();
        assert_eq!(len, 0);
        assert_eq!(
            sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_digest_is_independent_of_chunking() {
        let mut digest = ContentDigest::new();
        digest.update(b"a");
        digest.update(b"bc");

        assert_eq!(digest.len(), 3);
        let (len, sha256) = digest.verify(Some(3)).unwrap();
        assert_eq!(len, 3);
        assert_eq!(
            sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_size_mismatch_is_reported() {
        let mut digest = ContentDigest::new();
        digest.update(b"partial");

        let err = digest.verify(Some(100)).unwrap_err();
        assert!(matches!(
            err,
            VerificationError::SizeMismatch {
                expected: 100,
                actual: 7
            }
        ));
    }
}
