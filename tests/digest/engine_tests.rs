// Tests for the streaming digest engine

use std::fs;
use std::path::Path;

use hashcheck::digest::{compute, AlgorithmId, DigestEngine, DigestError, CHUNK_SIZE};

fn write_file(dir: &Path, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

/// Deterministic non-repeating-ish content
fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[test]
fn test_empty_file_digests() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "empty.bin", b"");

    let expected = [
        (AlgorithmId::Md5, "d41d8cd98f00b204e9800998ecf8427e"),
        (AlgorithmId::Sha1, "da39a3ee5e6b4b0d3255bfef95601890afd80709"),
        (AlgorithmId::Sha224, "d14a028c2a3a2bc9476102bb288234c415a2b01f828ea62ac5b3e42f"),
        (AlgorithmId::Sha256, "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"),
        (
            AlgorithmId::Sha384,
            "38b060a751ac96384cd9327eb1b1e36a21fdb71114be07434c0cc7bf63f6e1da274edebfe76f65fbd51ad2f14898b95b",
        ),
        (
            AlgorithmId::Sha512,
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e",
        ),
        (AlgorithmId::Sha3_224, "6b4e03423667dbb73b6e15454f0eb1abd4597f9a1b078e3f5b5a6bc7"),
        (AlgorithmId::Sha3_256, "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"),
        (
            AlgorithmId::Sha3_384,
            "0c63a75b845e4f7d01107d852e4c2485c51a50aaaa94fc61995e71bbee983a2ac3713831264adb47fb6bd1e058d5f004",
        ),
        (
            AlgorithmId::Sha3_512,
            "a69f73cca23a9ac5c8b567dc185a756e97c982164fe25859e0d1dcc1475c80a615b2123af1f5f94c11e3e9402c3ac558f500199d95b6d3e301758586281dcd26",
        ),
        (
            AlgorithmId::Blake2b,
            "786a02f742015903c6c6fd852552d272912f4740e15847618a86e217f71f5419d25e1031afee585313896444934eb04b903a685b1448b755d56f701afe9be2ce",
        ),
        (AlgorithmId::Blake2s, "69217a3079908094e11121d042354a7c1f55b6482ca1a51e1b250dfd1ed0eef9"),
        (AlgorithmId::Blake3, "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"),
    ];

    for (algorithm, hex) in expected {
        let digest = compute(&path, algorithm, None).unwrap();
        assert_eq!(digest.hex, hex, "{}", algorithm);
        assert_eq!(digest.algorithm, algorithm);
        assert_eq!(digest.path, path);
    }
}

#[test]
fn test_known_vectors() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "hello.txt", b"hello world");

    let sha256 = compute(&path, AlgorithmId::Sha256, None).unwrap();
    assert_eq!(sha256.hex, "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9");

    let md5 = compute(&path, AlgorithmId::Md5, None).unwrap();
    assert_eq!(md5.hex, "5eb63bbbe01eeed093cb22bb8f5acdc3");
}

#[test]
fn test_output_is_lowercase_hex_of_expected_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "data.bin", &pattern(1000));

    for algorithm in hashcheck::digest::supported_algorithms() {
        let digest = compute(&path, *algorithm, None).unwrap();
        assert_eq!(digest.hex.len(), algorithm.hex_len());
        assert!(digest
            .hex
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}

#[test]
fn test_chunk_size_does_not_change_digest() {
    let dir = tempfile::tempdir().unwrap();
    // Larger than one default chunk and not a multiple of any chunk size used
    let path = write_file(dir.path(), "big.bin", &pattern(200_000));

    let default = DigestEngine::new().compute(&path, AlgorithmId::Sha1, None).unwrap();
    let small = DigestEngine::with_chunk_size(4096)
        .compute(&path, AlgorithmId::Sha1, None)
        .unwrap();
    let odd = DigestEngine::with_chunk_size(7).compute(&path, AlgorithmId::Sha1, None).unwrap();

    assert_eq!(default.hex, "4fa3b414b52f18a8b007acc492540659f310282d");
    assert_eq!(small.hex, default.hex);
    assert_eq!(odd.hex, default.hex);
}

#[test]
fn test_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "data.bin", &pattern(CHUNK_SIZE + 17));

    let first = compute(&path, AlgorithmId::Blake3, None).unwrap();
    let second = compute(&path, AlgorithmId::Blake3, None).unwrap();
    assert_eq!(first.hex, second.hex);
}

#[test]
fn test_progress_is_monotonic_and_ends_at_100() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "data.bin", &pattern(10_000));

    let mut seen = Vec::new();
    let mut record = |p: f64| seen.push(p);
    DigestEngine::with_chunk_size(1000)
        .compute(&path, AlgorithmId::Md5, Some(&mut record))
        .unwrap();

    assert_eq!(seen.len(), 10);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{:?}", seen);
    assert!(seen.iter().all(|p| (0.0..=100.0).contains(p)));
    assert_eq!(seen.last().copied(), Some(100.0));
}

#[test]
fn test_empty_file_reports_100_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "empty.bin", b"");

    let mut seen = Vec::new();
    let mut record = |p: f64| seen.push(p);
    compute(&path, AlgorithmId::Sha256, Some(&mut record)).unwrap();
    assert_eq!(seen, vec![100.0]);
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = compute(&dir.path().join("nope.bin"), AlgorithmId::Md5, None).unwrap_err();
    assert!(matches!(err, DigestError::FileNotFound { .. }), "{:?}", err);
}

#[test]
fn test_directory_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = compute(dir.path(), AlgorithmId::Md5, None).unwrap_err();
    assert!(matches!(err, DigestError::FileNotFound { .. }), "{:?}", err);
}

#[test]
fn test_failure_reports_no_progress_after_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut seen = Vec::new();
    let mut record = |p: f64| seen.push(p);
    let result = compute(&dir.path().join("missing"), AlgorithmId::Md5, Some(&mut record));
    assert!(result.is_err());
    assert!(seen.is_empty());
}

#[test]
fn test_unsupported_name_rejected_before_io() {
    // The path does not exist; the algorithm error must win
    let err = DigestEngine::new()
        .compute_by_name(Path::new("/definitely/not/here"), "whirlpool", None)
        .unwrap_err();
    assert!(matches!(err, DigestError::UnsupportedAlgorithm { .. }), "{:?}", err);
}

#[test]
fn test_compute_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "abc.txt", b"abc");
    let digest = DigestEngine::new().compute_by_name(&path, "MD5", None).unwrap();
    assert_eq!(digest.hex, "900150983cd24fb0d6963f7d28e17f72");
}

#[test]
fn test_zero_chunk_size_is_clamped() {
    assert_eq!(DigestEngine::with_chunk_size(0).chunk_size(), 1);
    assert_eq!(DigestEngine::new().chunk_size(), CHUNK_SIZE);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_io_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "secret.bin", b"data");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits; nothing to check in that case
    if fs::File::open(&path).is_ok() {
        return;
    }
    let err = compute(&path, AlgorithmId::Md5, None).unwrap_err();
    assert!(matches!(err, DigestError::Io { .. }), "{:?}", err);
}

#[test]
fn test_truncated_mid_read_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "shrinking.bin", &pattern(10_000));

    let mut truncated = false;
    let mut shrink = |_: f64| {
        if !truncated {
            fs::OpenOptions::new().write(true).open(&path).unwrap().set_len(0).unwrap();
            truncated = true;
        }
    };
    let result = DigestEngine::with_chunk_size(1000).compute(&path, AlgorithmId::Md5, Some(&mut shrink));

    match result {
        Err(DigestError::Io { source, .. }) => {
            assert_eq!(source.kind(), std::io::ErrorKind::UnexpectedEof);
            assert!(source.to_string().contains("read 1000 of 10000 bytes"));
        }
        other => panic!("expected Io error, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_fifo_is_not_found_without_blocking() {
    use std::sync::mpsc;
    use std::time::Duration;

    let dir = tempfile::tempdir().unwrap();
    let fifo = dir.path().join("pipe");
    let created = std::process::Command::new("mkfifo")
        .arg(&fifo)
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    if !created {
        // mkfifo unavailable on this system
        return;
    }

    let (tx, rx) = mpsc::channel();
    let path = fifo.clone();
    std::thread::spawn(move || {
        let _ = tx.send(compute(&path, AlgorithmId::Md5, None));
    });

    let result = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("computing a FIFO digest must not block");
    assert!(matches!(result, Err(DigestError::FileNotFound { .. })), "{:?}", result);
}
