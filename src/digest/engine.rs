// Streaming digest engine
// Reads a file in fixed-size chunks, feeds the hash state and reports progress

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::algorithm::{new_hasher, AlgorithmId};
use super::error::DigestError;

/// Bytes fed to the hasher per read
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Progress callback; receives bytes-read / total-bytes × 100
pub type ProgressFn<'a> = &'a mut dyn FnMut(f64);

/// A successfully computed file digest
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileDigest {
    pub algorithm: AlgorithmId,
    /// Lowercase hex, `algorithm.hex_len()` characters
    pub hex: String,
    pub path: PathBuf,
}

pub type DigestResult = Result<FileDigest, DigestError>;

/// Digest computer with streaming I/O
#[derive(Debug, Clone)]
pub struct DigestEngine {
    chunk_size: usize,
}

impl DigestEngine {
    /// Engine reading 64 KiB chunks
    pub fn new() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Compute the digest of the file at `path`.
    ///
    /// `on_progress` is called once per chunk with a non-decreasing value that
    /// reaches 100 on success. An empty file reports 100 exactly once. On any
    /// failure only the error is returned, never a partial digest.
    pub fn compute(
        &self,
        path: &Path,
        algorithm: AlgorithmId,
        mut on_progress: Option<ProgressFn<'_>>,
    ) -> DigestResult {
        let started = Instant::now();
        let mut hasher = new_hasher(algorithm);

        // Checked before opening: opening a FIFO blocks until a writer shows up
        let metadata = fs::metadata(path)
            .map_err(|e| DigestError::from_io_error(e, "reading metadata of", path.to_path_buf()))?;
        if !metadata.is_file() {
            return Err(DigestError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut file = File::open(path)
            .map_err(|e| DigestError::from_io_error(e, "opening", path.to_path_buf()))?;
        let total = file
            .metadata()
            .map_err(|e| DigestError::from_io_error(e, "reading metadata of", path.to_path_buf()))?
            .len();

        tracing::debug!(path = %path.display(), %algorithm, size = total, "computing digest");

        let mut buffer = vec![0u8; self.chunk_size];
        let mut read_so_far: u64 = 0;

        loop {
            let n = read_chunk(&mut file, &mut buffer)
                .map_err(|e| DigestError::from_io_error(e, "reading", path.to_path_buf()))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
            read_so_far += n as u64;

            if let Some(report) = on_progress.as_mut() {
                report(percent(read_so_far, total));
            }
        }

        if read_so_far < total {
            // File shrank underneath us
            return Err(DigestError::Io {
                path: path.to_path_buf(),
                operation: "reading",
                source: io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("file truncated: read {} of {} bytes", read_so_far, total),
                ),
            });
        }

        if read_so_far == 0 {
            if let Some(report) = on_progress.as_mut() {
                report(100.0);
            }
        }

        let hex = hex::encode(hasher.finalize());
        tracing::info!(
            path = %path.display(),
            %algorithm,
            bytes = read_so_far,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "digest computed"
        );

        Ok(FileDigest {
            algorithm,
            hex,
            path: path.to_path_buf(),
        })
    }

    /// Same as [`compute`](Self::compute) but with a textual algorithm name.
    /// The name is validated before the file is touched.
    pub fn compute_by_name(
        &self,
        path: &Path,
        algorithm: &str,
        on_progress: Option<ProgressFn<'_>>,
    ) -> DigestResult {
        let algorithm: AlgorithmId = algorithm.parse()?;
        self.compute(path, algorithm, on_progress)
    }
}

impl Default for DigestEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute a digest with the default 64 KiB engine
pub fn compute(path: &Path, algorithm: AlgorithmId, on_progress: Option<ProgressFn<'_>>) -> DigestResult {
    DigestEngine::new().compute(path, algorithm, on_progress)
}

// Fill `buf` unless EOF comes first; returns bytes read
fn read_chunk(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn percent(done: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (done as f64 / total as f64 * 100.0).min(100.0)
}
