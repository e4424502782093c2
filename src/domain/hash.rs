//! Hash algorithm domain types.
//!
//! Provides the `HashAlgorithm` enumeration, digest computation, and the
//! `SignableHash`/`SignableData` inputs accepted by the signature and
//! authentication operations.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::domain::verification;
use crate::infra::error::{RemoteIdError, RemoteIdResult};

/// Supported hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Wire name of the algorithm as the service expects it.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha384 => "SHA384",
            HashAlgorithm::Sha512 => "SHA512",
        }
    }

    /// Digest output length in bytes.
    #[must_use]
    pub fn digest_size(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = RemoteIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SHA256" | "SHA-256" => Ok(HashAlgorithm::Sha256),
            "SHA384" | "SHA-384" => Ok(HashAlgorithm::Sha384),
            "SHA512" | "SHA-512" => Ok(HashAlgorithm::Sha512),
            _ => Err(RemoteIdError::Configuration(format!(
                "Unknown hash algorithm: {s}"
            ))),
        }
    }
}

/// Compute the digest of `data` with the given algorithm.
///
/// # Errors
/// Fails with an unprocessable-response error when the algorithm is unset;
/// a hash cannot be interpreted without knowing what produced it.
pub fn calculate_digest(
    data: &[u8],
    algorithm: Option<HashAlgorithm>,
) -> RemoteIdResult<Vec<u8>> {
    let algorithm = algorithm.ok_or_else(|| {
        RemoteIdError::UnprocessableResponse("hash algorithm is not set".to_string())
    })?;

    let digest = match algorithm {
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
    };
    Ok(digest)
}

/// A pre-computed hash to be signed, paired with the algorithm that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignableHash {
    /// Raw hash bytes.
    pub hash: Vec<u8>,
    /// Algorithm that produced `hash`.
    pub algorithm: Option<HashAlgorithm>,
}

impl SignableHash {
    /// Create a signable hash from raw bytes.
    #[must_use]
    pub fn new(hash: Vec<u8>, algorithm: HashAlgorithm) -> Self {
        Self {
            hash,
            algorithm: Some(algorithm),
        }
    }

    /// Create a signable hash from its base64 encoding.
    ///
    /// # Errors
    /// Returns a configuration error if the input is not valid base64.
    pub fn from_base64(hash_in_base64: &str, algorithm: HashAlgorithm) -> RemoteIdResult<Self> {
        let hash = base64::engine::general_purpose::STANDARD
            .decode(hash_in_base64)
            .map_err(|e| RemoteIdError::Configuration(format!("Invalid base64 hash: {e}")))?;
        Ok(Self::new(hash, algorithm))
    }

    /// Hash bytes re-encoded as base64, byte-exact with the input encoding.
    #[must_use]
    pub fn hash_in_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.hash)
    }

    /// Whether both fields are populated and the hash length matches the
    /// algorithm's digest size.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.algorithm
            .is_some_and(|a| self.hash.len() == a.digest_size())
    }

    /// 4-digit code the end user cross-checks against their device.
    #[must_use]
    pub fn verification_code(&self) -> String {
        verification::calculate(&self.hash)
    }
}

/// Raw data to be hashed client-side before signing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignableData {
    /// Data to digest.
    pub data: Vec<u8>,
    /// Algorithm to digest with; defaults to SHA-512 when unset.
    pub algorithm: Option<HashAlgorithm>,
}

impl SignableData {
    /// Create signable data with the default algorithm.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            algorithm: None,
        }
    }

    /// Create signable data with an explicit algorithm.
    #[must_use]
    pub fn with_algorithm(data: Vec<u8>, algorithm: HashAlgorithm) -> Self {
        Self {
            data,
            algorithm: Some(algorithm),
        }
    }

    /// Algorithm that will be used to digest the data.
    #[must_use]
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.algorithm.unwrap_or(HashAlgorithm::Sha512)
    }

    /// Digest of the data with the effective algorithm.
    #[must_use]
    pub fn calculate_hash(&self) -> Vec<u8> {
        // Infallible: hash_algorithm() always yields a concrete algorithm.
        calculate_digest(&self.data, Some(self.hash_algorithm()))
            .unwrap_or_default()
    }

    /// 4-digit code the end user cross-checks against their device.
    #[must_use]
    pub fn verification_code(&self) -> String {
        verification::calculate(&self.calculate_hash())
    }
}
