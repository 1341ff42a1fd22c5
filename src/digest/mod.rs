// Digest core
// Algorithm registry, streaming engine and comparison workflow

pub mod algorithm;
pub mod compare;
pub mod engine;
pub mod error;

pub use algorithm::{
    algorithm_info, new_hasher, new_hasher_by_name, supported_algorithms, AlgorithmId,
    AlgorithmInfo, Hasher,
};
pub use compare::{AbortReason, AlgorithmMode, CompareEngine, Verdict};
pub use engine::{compute, DigestEngine, DigestResult, FileDigest, ProgressFn, CHUNK_SIZE};
pub use error::{DigestError, InputProblem};
