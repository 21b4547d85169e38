/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Hash algorithms that can be computed over a request body, looked up by name.

use crate::error::{Error, ErrorKind};
use bytes::Bytes;
use sha2::Digest;
use std::fmt;
use std::str::FromStr;

// Valid hash algorithm names
pub const CRC_32_NAME: &str = "crc32";
pub const CRC_32_C_NAME: &str = "crc32c";
pub const SHA_1_NAME: &str = "sha1";
pub const SHA_256_NAME: &str = "sha256";
pub const MD5_NAME: &str = "md5";

/// The algorithm used when a caller doesn't name one. Signing always hashes payloads with it.
pub const DEFAULT_HASH_ALGORITHM: &str = SHA_256_NAME;

/// A hash algorithm known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ChecksumAlgorithm {
    Crc32,
    Crc32c,
    Sha1,
    Sha256,
    Md5,
}

impl ChecksumAlgorithm {
    /// Create a new hasher for this algorithm.
    pub fn into_impl(self) -> Box<dyn Checksum> {
        match self {
            Self::Crc32 => Box::<Crc32>::default(),
            Self::Crc32c => Box::<Crc32c>::default(),
            Self::Sha1 => Box::<Sha1>::default(),
            Self::Sha256 => Box::<Sha256>::default(),
            Self::Md5 => Box::<Md5>::default(),
        }
    }

    /// Return the canonical name of this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crc32 => CRC_32_NAME,
            Self::Crc32c => CRC_32_C_NAME,
            Self::Sha1 => SHA_1_NAME,
            Self::Sha256 => SHA_256_NAME,
            Self::Md5 => MD5_NAME,
        }
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = Error;

    /// Names are matched case-insensitively.
    fn from_str(checksum_algorithm: &str) -> Result<Self, Self::Err> {
        if checksum_algorithm.eq_ignore_ascii_case(CRC_32_NAME) {
            Ok(Self::Crc32)
        } else if checksum_algorithm.eq_ignore_ascii_case(CRC_32_C_NAME) {
            Ok(Self::Crc32c)
        } else if checksum_algorithm.eq_ignore_ascii_case(SHA_1_NAME) {
            Ok(Self::Sha1)
        } else if checksum_algorithm.eq_ignore_ascii_case(SHA_256_NAME) {
            Ok(Self::Sha256)
        } else if checksum_algorithm.eq_ignore_ascii_case(MD5_NAME) {
            Ok(Self::Md5)
        } else {
            Err(ErrorKind::UnsupportedAlgorithm(checksum_algorithm.to_owned()).into())
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create a new `Box<dyn Checksum>` from an algorithm name. Valid algorithm names are defined as
/// `const`s in this module.
pub fn new_checksum(checksum_algorithm: &str) -> Result<Box<dyn Checksum>, Error> {
    Ok(checksum_algorithm.parse::<ChecksumAlgorithm>()?.into_impl())
}

/// Structs that implement this trait can hash a request body one chunk at a time.
///
/// Anything implementing it can be passed to
/// [`RequestStream::hash_with`](crate::RequestStream::hash_with), so algorithms this crate
/// doesn't ship can still be computed over a body.
pub trait Checksum: Send + Sync {
    /// Given a slice of bytes, update this checksum's internal state.
    fn update(&mut self, bytes: &[u8]);
    /// Consume the checksum and return the digest as raw bytes.
    fn finalize(self: Box<Self>) -> Bytes;
    /// Return the size of the resulting digest in bytes.
    fn size(&self) -> u64;
}

#[derive(Debug, Default)]
struct Crc32 {
    hasher: crc32fast::Hasher,
}

impl Checksum for Crc32 {
    fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    fn finalize(self: Box<Self>) -> Bytes {
        Bytes::copy_from_slice(&self.hasher.finalize().to_be_bytes())
    }

    fn size(&self) -> u64 {
        4
    }
}

#[derive(Debug, Default)]
struct Crc32c {
    state: Option<u32>,
}

impl Checksum for Crc32c {
    fn update(&mut self, bytes: &[u8]) {
        self.state = match self.state {
            Some(crc) => Some(crc32c::crc32c_append(crc, bytes)),
            None => Some(crc32c::crc32c(bytes)),
        };
    }

    fn finalize(self: Box<Self>) -> Bytes {
        // No data means no CRC was ever calculated; that is a checksum of zero.
        Bytes::copy_from_slice(&self.state.unwrap_or_default().to_be_bytes())
    }

    fn size(&self) -> u64 {
        4
    }
}

#[derive(Debug, Default)]
struct Sha1 {
    hasher: sha1::Sha1,
}

impl Checksum for Sha1 {
    fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    fn finalize(self: Box<Self>) -> Bytes {
        Bytes::copy_from_slice(self.hasher.finalize().as_slice())
    }

    fn size(&self) -> u64 {
        20
    }
}

#[derive(Debug, Default)]
struct Sha256 {
    hasher: sha2::Sha256,
}

impl Checksum for Sha256 {
    fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    fn finalize(self: Box<Self>) -> Bytes {
        Bytes::copy_from_slice(self.hasher.finalize().as_slice())
    }

    fn size(&self) -> u64 {
        32
    }
}

#[derive(Debug, Default)]
struct Md5 {
    hasher: md5::Md5,
}

impl Checksum for Md5 {
    fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    fn finalize(self: Box<Self>) -> Bytes {
        Bytes::copy_from_slice(self.hasher.finalize().as_slice())
    }

    fn size(&self) -> u64 {
        16
    }
}

#[cfg(test)]
mod test {
    use super::{new_checksum, ChecksumAlgorithm};
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    const TEST_DATA: &str = r#"test data"#;

    fn hex_digest(algorithm: &str) -> String {
        let mut checksum = new_checksum(algorithm).unwrap();
        checksum.update(TEST_DATA.as_bytes());
        format!("0x{}", hex::encode_upper(checksum.finalize()))
    }

    #[test]
    fn test_crc32_checksum() {
        assert_eq!("0xD308AEB2", hex_digest("crc32"));
    }

    #[test]
    fn test_crc32c_checksum() {
        assert_eq!("0x3379B4CA", hex_digest("crc32c"));
    }

    #[test]
    fn test_sha1_checksum() {
        assert_eq!(
            "0xF48DD853820860816C75D54D0F584DC863327A7C",
            hex_digest("sha1")
        );
    }

    #[test]
    fn test_sha256_checksum() {
        assert_eq!(
            "0x916F0027A575074CE72A331777C3478D6513F786A591BD892DA1A577BF2335F9",
            hex_digest("sha256")
        );
    }

    #[test]
    fn test_md5_checksum() {
        assert_eq!("0xEB733A00C0C9D336E65691A37AB54293", hex_digest("md5"));
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(
            ChecksumAlgorithm::Sha256,
            "SHA256".parse::<ChecksumAlgorithm>().unwrap()
        );
        assert_eq!("crc32c", ChecksumAlgorithm::Crc32c.to_string());
    }

    #[test]
    fn unknown_name_is_unsupported() {
        let err = new_checksum("md5-not-real").err().expect("unknown algorithm");
        match err.kind() {
            ErrorKind::UnsupportedAlgorithm(name) => assert_eq!("md5-not-real", name),
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn digest_sizes_match_output() {
        for name in ["crc32", "crc32c", "sha1", "sha256", "md5"] {
            let checksum = new_checksum(name).unwrap();
            let size = checksum.size();
            assert_eq!(size as usize, checksum.finalize().len(), "{name}");
        }
    }
}
