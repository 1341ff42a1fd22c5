// Hash algorithm registry
// Maps the closed set of selectable algorithms to incremental hash primitives

use std::fmt;
use std::str::FromStr;

use blake3::Hasher as Blake3Hasher;
use blake2::{Blake2b512, Blake2s256};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

use super::error::DigestError;

/// Trait for incremental hash primitives
pub trait Hasher: Send {
    /// Feed the next chunk of input
    fn update(&mut self, data: &[u8]);

    /// Finalize the hash and return the raw digest bytes
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Output size in bytes
    fn output_size(&self) -> usize;
}

/// Every selectable algorithm. The order is the order shown in the interface
/// and the first entry is the default selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AlgorithmId {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Blake2b,
    Blake2s,
    Blake3,
}

const SUPPORTED: [AlgorithmId; 13] = [
    AlgorithmId::Md5,
    AlgorithmId::Sha1,
    AlgorithmId::Sha224,
    AlgorithmId::Sha256,
    AlgorithmId::Sha384,
    AlgorithmId::Sha512,
    AlgorithmId::Sha3_224,
    AlgorithmId::Sha3_256,
    AlgorithmId::Sha3_384,
    AlgorithmId::Sha3_512,
    AlgorithmId::Blake2b,
    AlgorithmId::Blake2s,
    AlgorithmId::Blake3,
];

/// Supported algorithms in stable order; the first one is the default
pub fn supported_algorithms() -> &'static [AlgorithmId] {
    &SUPPORTED
}

impl AlgorithmId {
    /// Canonical lowercase identifier, as accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            AlgorithmId::Md5 => "md5",
            AlgorithmId::Sha1 => "sha1",
            AlgorithmId::Sha224 => "sha224",
            AlgorithmId::Sha256 => "sha256",
            AlgorithmId::Sha384 => "sha384",
            AlgorithmId::Sha512 => "sha512",
            AlgorithmId::Sha3_224 => "sha3-224",
            AlgorithmId::Sha3_256 => "sha3-256",
            AlgorithmId::Sha3_384 => "sha3-384",
            AlgorithmId::Sha3_512 => "sha3-512",
            AlgorithmId::Blake2b => "blake2b",
            AlgorithmId::Blake2s => "blake2s",
            AlgorithmId::Blake3 => "blake3",
        }
    }

    /// Digest size in bytes
    pub fn output_size(self) -> usize {
        match self {
            AlgorithmId::Md5 => 16,
            AlgorithmId::Sha1 => 20,
            AlgorithmId::Sha224 | AlgorithmId::Sha3_224 => 28,
            AlgorithmId::Sha256 | AlgorithmId::Sha3_256 => 32,
            AlgorithmId::Sha384 | AlgorithmId::Sha3_384 => 48,
            AlgorithmId::Sha512 | AlgorithmId::Sha3_512 => 64,
            AlgorithmId::Blake2b => 64,
            AlgorithmId::Blake2s | AlgorithmId::Blake3 => 32,
        }
    }

    /// Length of the lowercase hex rendering
    pub fn hex_len(self) -> usize {
        self.output_size() * 2
    }

    pub fn info(self) -> AlgorithmInfo {
        AlgorithmInfo {
            id: self,
            display_name: match self {
                AlgorithmId::Md5 => "MD5",
                AlgorithmId::Sha1 => "SHA-1",
                AlgorithmId::Sha224 => "SHA-224",
                AlgorithmId::Sha256 => "SHA-256",
                AlgorithmId::Sha384 => "SHA-384",
                AlgorithmId::Sha512 => "SHA-512",
                AlgorithmId::Sha3_224 => "SHA3-224",
                AlgorithmId::Sha3_256 => "SHA3-256",
                AlgorithmId::Sha3_384 => "SHA3-384",
                AlgorithmId::Sha3_512 => "SHA3-512",
                AlgorithmId::Blake2b => "BLAKE2b-512",
                AlgorithmId::Blake2s => "BLAKE2s-256",
                AlgorithmId::Blake3 => "BLAKE3",
            },
            output_bits: self.output_size() * 8,
            // MD5 and SHA-1 have practical collision attacks
            recommended: !matches!(self, AlgorithmId::Md5 | AlgorithmId::Sha1),
        }
    }
}

impl Default for AlgorithmId {
    fn default() -> Self {
        SUPPORTED[0]
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmId {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = match s.trim().to_lowercase().as_str() {
            "md5" => AlgorithmId::Md5,
            "sha1" | "sha-1" => AlgorithmId::Sha1,
            "sha224" | "sha-224" => AlgorithmId::Sha224,
            "sha256" | "sha-256" => AlgorithmId::Sha256,
            "sha384" | "sha-384" => AlgorithmId::Sha384,
            "sha512" | "sha-512" => AlgorithmId::Sha512,
            "sha3-224" => AlgorithmId::Sha3_224,
            "sha3-256" => AlgorithmId::Sha3_256,
            "sha3-384" => AlgorithmId::Sha3_384,
            "sha3-512" => AlgorithmId::Sha3_512,
            "blake2b" | "blake2b-512" => AlgorithmId::Blake2b,
            "blake2s" | "blake2s-256" => AlgorithmId::Blake2s,
            "blake3" => AlgorithmId::Blake3,
            _ => {
                return Err(DigestError::UnsupportedAlgorithm {
                    algorithm: s.to_string(),
                })
            }
        };
        Ok(id)
    }
}

impl TryFrom<String> for AlgorithmId {
    type Error = DigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AlgorithmId> for String {
    fn from(id: AlgorithmId) -> Self {
        id.name().to_string()
    }
}

/// Description of an algorithm for listings
#[derive(Debug, Clone, serde::Serialize)]
pub struct AlgorithmInfo {
    pub id: AlgorithmId,
    pub display_name: &'static str,
    pub output_bits: usize,
    pub recommended: bool,
}

/// Descriptions of every supported algorithm, in interface order
pub fn algorithm_info() -> Vec<AlgorithmInfo> {
    SUPPORTED.iter().map(|id| id.info()).collect()
}

// All RustCrypto hashes share the `digest` 0.10 trait, so one wrapper covers them
struct RustCrypto<D>(D);

impl<D: Digest + Send> Hasher for RustCrypto<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Digest::finalize(self.0).to_vec()
    }

    fn output_size(&self) -> usize {
        <D as Digest>::output_size()
    }
}

struct Blake3Wrapper(Blake3Hasher);

impl Hasher for Blake3Wrapper {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().as_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        blake3::OUT_LEN
    }
}

/// Construct a fresh hash state for `algorithm`
pub fn new_hasher(algorithm: AlgorithmId) -> Box<dyn Hasher> {
    match algorithm {
        AlgorithmId::Md5 => Box::new(RustCrypto(Md5::new())),
        AlgorithmId::Sha1 => Box::new(RustCrypto(Sha1::new())),
        AlgorithmId::Sha224 => Box::new(RustCrypto(Sha224::new())),
        AlgorithmId::Sha256 => Box::new(RustCrypto(Sha256::new())),
        AlgorithmId::Sha384 => Box::new(RustCrypto(Sha384::new())),
        AlgorithmId::Sha512 => Box::new(RustCrypto(Sha512::new())),
        AlgorithmId::Sha3_224 => Box::new(RustCrypto(Sha3_224::new())),
        AlgorithmId::Sha3_256 => Box::new(RustCrypto(Sha3_256::new())),
        AlgorithmId::Sha3_384 => Box::new(RustCrypto(Sha3_384::new())),
        AlgorithmId::Sha3_512 => Box::new(RustCrypto(Sha3_512::new())),
        AlgorithmId::Blake2b => Box::new(RustCrypto(Blake2b512::new())),
        AlgorithmId::Blake2s => Box::new(RustCrypto(Blake2s256::new())),
        AlgorithmId::Blake3 => Box::new(Blake3Wrapper(Blake3Hasher::new())),
    }
}

/// Construct a hash state from a textual algorithm name
pub fn new_hasher_by_name(name: &str) -> Result<Box<dyn Hasher>, DigestError> {
    Ok(new_hasher(name.parse()?))
}
