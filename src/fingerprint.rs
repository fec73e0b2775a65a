//! Content fingerprinting: streams a file through a digest in fixed-size reads.

use bytesize::ByteSize;
use clap::ValueEnum;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::SweepError;

/// Digest used for content fingerprints. The choice affects collision
/// resistance only; equal fingerprints stand in for byte-equal contents
/// either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HashAlgorithm {
    Blake3,
    Sha256,
}

const MIN_CHUNK: u64 = 4 * 1024; // 4 KiB
const MAX_CHUNK: u64 = 64 * 1024 * 1024; // 64 MiB

/// Clamp the configured read granularity to [4 KiB, 64 MiB].
fn clamped_chunk(bytes: u64) -> u64 {
    if bytes < MIN_CHUNK {
        eprintln!(
            "--chunk-size too small ({}); clamping to {}",
            ByteSize(bytes),
            ByteSize(MIN_CHUNK)
        );
        MIN_CHUNK
    } else if bytes > MAX_CHUNK {
        eprintln!(
            "--chunk-size too large ({}); clamping to {}",
            ByteSize(bytes),
            ByteSize(MAX_CHUNK)
        );
        MAX_CHUNK
    } else {
        bytes
    }
}

/// Computes fingerprints with a fixed algorithm and read granularity.
pub struct Fingerprinter {
    algo: HashAlgorithm,
    chunk_size: usize,
}

impl Fingerprinter {
    pub fn new(algo: HashAlgorithm, chunk_size: u64) -> Self {
        Self {
            algo,
            chunk_size: clamped_chunk(chunk_size) as usize,
        }
    }

    /// Digest the whole file, reading at most `chunk_size` bytes at a time so
    /// memory stays bounded regardless of file size. Returns the lowercase
    /// hex digest, or `PathInaccessible` if the file cannot be opened or a
    /// read fails partway through.
    pub fn fingerprint(&self, path: &Path) -> Result<String, SweepError> {
        let mut f = File::open(path).map_err(|source| SweepError::PathInaccessible {
            path: path.to_path_buf(),
            source,
        })?;
        let mut buf = vec![0u8; self.chunk_size];
        match self.algo {
            HashAlgorithm::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                loop {
                    let n = f.read(&mut buf).map_err(|source| SweepError::PathInaccessible {
                        path: path.to_path_buf(),
                        source,
                    })?;
                    if n == 0 {
                        break;
                    }
                    hasher.update(&buf[..n]);
                }
                Ok(hasher.finalize().to_hex().to_string())
            }
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                loop {
                    let n = f.read(&mut buf).map_err(|source| SweepError::PathInaccessible {
                        path: path.to_path_buf(),
                        source,
                    })?;
                    if n == 0 {
                        break;
                    }
                    hasher.update(&buf[..n]);
                }
                Ok(format!("{:x}", hasher.finalize()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let p = dir.join(name);
        File::create(&p).unwrap().write_all(contents).unwrap();
        p
    }

    #[test]
    fn matches_single_shot_digests() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_file(dir.path(), "hello.txt", b"hello");

        let b3 = Fingerprinter::new(HashAlgorithm::Blake3, MIN_CHUNK);
        assert_eq!(
            b3.fingerprint(&p).unwrap(),
            blake3::hash(b"hello").to_hex().to_string()
        );

        let sha = Fingerprinter::new(HashAlgorithm::Sha256, MIN_CHUNK);
        assert_eq!(
            sha.fingerprint(&p).unwrap(),
            format!("{:x}", Sha256::digest(b"hello"))
        );
    }

    #[test]
    fn chunked_reads_cover_the_full_stream() {
        let dir = tempfile::tempdir().unwrap();
        // Larger than the minimum chunk so the loop runs more than once.
        let contents = vec![0xabu8; (MIN_CHUNK as usize) * 3 + 17];
        let p = write_file(dir.path(), "big.bin", &contents);

        let fp = Fingerprinter::new(HashAlgorithm::Blake3, MIN_CHUNK);
        assert_eq!(
            fp.fingerprint(&p).unwrap(),
            blake3::hash(&contents).to_hex().to_string()
        );
    }

    #[test]
    fn missing_file_is_inaccessible() {
        let dir = tempfile::tempdir().unwrap();
        let fp = Fingerprinter::new(HashAlgorithm::Blake3, MIN_CHUNK);
        let err = fp.fingerprint(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, SweepError::PathInaccessible { .. }));
    }

    #[test]
    fn chunk_size_is_clamped() {
        assert_eq!(clamped_chunk(1), MIN_CHUNK);
        assert_eq!(clamped_chunk(MIN_CHUNK), MIN_CHUNK);
        assert_eq!(clamped_chunk(1024 * 1024), 1024 * 1024);
        assert_eq!(clamped_chunk(u64::MAX), MAX_CHUNK);
    }
}
