use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Range;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::genomics::alphabet::TERMINATOR;

/// File inside a dataset directory holding the stored reads, one per line.
pub const READS_FILE: &str = "reads.txt";

/// Error type returned by index loading and construction.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Backing files for the dataset are missing.
    #[error("no index found at {}", path.display())]
    NotFound {
        /// Path that was probed.
        path: PathBuf,
    },

    /// Encountered an unsupported character in a stored read.
    #[error("unsupported character '{ch}' in read {read} at position {position}")]
    UnsupportedCharacter {
        /// Character that could not be stored.
        ch: char,
        /// Zero-based read number.
        read: usize,
        /// Position within the read.
        position: usize,
    },

    /// I/O failure while reading the backing file.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Read collection searchable by prefix, as exposed by a multi-string BWT.
///
/// Rows are the sorted rotations of every stored `read + '$'`; a row begins at
/// some offset of a read and wraps around through the terminator.
pub trait SequenceIndex {
    /// Half-open rank interval of rows starting with `pattern`.
    fn find_range(&self, pattern: &[u8]) -> Range<usize>;

    /// Row at `rank`, including its terminator.
    fn recover_row(&self, rank: usize) -> Vec<u8>;

    /// Number of stored strings.
    fn string_count(&self) -> usize;

    /// Total number of stored symbols, terminators included.
    fn total_size(&self) -> usize;

    /// Number of rows starting with `pattern`.
    fn count_occurrences(&self, pattern: &[u8]) -> usize {
        self.find_range(pattern).len()
    }
}

/// Uncompressed sorted-rotation index. Suitable for tests and moderate inputs.
#[derive(Debug, Clone)]
pub struct MemoryIndex {
    reads: Vec<Vec<u8>>,
    rows: Vec<Rotation>,
}

#[derive(Debug, Clone, Copy)]
struct Rotation {
    read: usize,
    offset: usize,
}

impl MemoryIndex {
    /// Build the index from raw reads. Reads are uppercased; each gains a
    /// trailing terminator.
    pub fn from_reads<I>(reads: I) -> Result<Self, IndexError>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut stored = Vec::new();
        for (read_idx, read) in reads.into_iter().enumerate() {
            stored.push(sanitize_read(read.as_ref(), read_idx)?);
        }

        let mut rows: Vec<Rotation> = stored
            .iter()
            .enumerate()
            .flat_map(|(read, text)| (0..text.len()).map(move |offset| Rotation { read, offset }))
            .collect();
        rows.sort_by(|&lhs, &rhs| compare_rotations(&stored, lhs, rhs));

        debug!(reads = stored.len(), rows = rows.len(), "built in-memory index");
        Ok(Self {
            reads: stored,
            rows,
        })
    }

    fn rotation(&self, row: Rotation) -> impl Iterator<Item = u8> + '_ {
        rotation_symbols(&self.reads, row)
    }

    /// Compare the first `pattern.len()` symbols of `row` with `pattern`.
    /// Rows shorter than the pattern sort before it when they agree.
    fn compare_prefix(&self, row: Rotation, pattern: &[u8]) -> Ordering {
        self.rotation(row)
            .take(pattern.len())
            .cmp(pattern.iter().copied())
    }
}

impl SequenceIndex for MemoryIndex {
    fn find_range(&self, pattern: &[u8]) -> Range<usize> {
        let lower = self
            .rows
            .partition_point(|&row| self.compare_prefix(row, pattern) == Ordering::Less);
        let upper = self
            .rows
            .partition_point(|&row| self.compare_prefix(row, pattern) != Ordering::Greater);
        lower..upper
    }

    fn recover_row(&self, rank: usize) -> Vec<u8> {
        self.rows
            .get(rank)
            .map(|&row| self.rotation(row).collect())
            .unwrap_or_default()
    }

    fn string_count(&self) -> usize {
        self.reads.len()
    }

    fn total_size(&self) -> usize {
        self.rows.len()
    }
}

/// Load the dataset stored under `directory`.
pub fn load_index(directory: &Path) -> Result<MemoryIndex, IndexError> {
    let path = directory.join(READS_FILE);
    if !path.is_file() {
        return Err(IndexError::NotFound { path });
    }
    let file = File::open(&path).map_err(|source| IndexError::Io {
        path: path.clone(),
        source,
    })?;

    let mut reads = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| IndexError::Io {
            path: path.clone(),
            source,
        })?;
        let read = line.trim();
        if !read.is_empty() {
            reads.push(read.as_bytes().to_vec());
        }
    }
    MemoryIndex::from_reads(reads)
}

fn sanitize_read(read: &[u8], read_idx: usize) -> Result<Vec<u8>, IndexError> {
    let mut clean = Vec::with_capacity(read.len() + 1);
    for (position, &ch) in read.iter().enumerate() {
        match ch.to_ascii_uppercase() {
            upper @ (b'A' | b'C' | b'G' | b'T' | b'N') => clean.push(upper),
            _ => {
                return Err(IndexError::UnsupportedCharacter {
                    ch: ch as char,
                    read: read_idx,
                    position,
                })
            }
        }
    }
    clean.push(TERMINATOR);
    Ok(clean)
}

fn rotation_symbols(reads: &[Vec<u8>], row: Rotation) -> impl Iterator<Item = u8> + '_ {
    let text = &reads[row.read];
    text[row.offset..]
        .iter()
        .chain(text[..row.offset].iter())
        .copied()
}

fn compare_rotations(reads: &[Vec<u8>], lhs: Rotation, rhs: Rotation) -> Ordering {
    rotation_symbols(reads, lhs)
        .cmp(rotation_symbols(reads, rhs))
        .then_with(|| (lhs.read, lhs.offset).cmp(&(rhs.read, rhs.offset)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_count(reads: &[&[u8]], pattern: &[u8]) -> usize {
        reads
            .iter()
            .map(|read| {
                let mut text = read.to_vec();
                text.push(TERMINATOR);
                (0..text.len())
                    .filter(|&offset| {
                        let rotated: Vec<u8> = text[offset..]
                            .iter()
                            .chain(text[..offset].iter())
                            .copied()
                            .collect();
                        rotated.starts_with(pattern)
                    })
                    .count()
            })
            .sum()
    }

    #[test]
    fn memory_index_counts_match_naive_search() {
        let reads: Vec<&[u8]> = vec![&b"ACGTACGT"[..], &b"TTACGAA"[..], &b"CCCCGT"[..]];
        let index = MemoryIndex::from_reads(&reads).expect("index build should succeed");

        assert_eq!(index.string_count(), 3);
        assert_eq!(index.total_size(), 8 + 7 + 6 + 3);

        for pattern in [
            &b"A"[..],
            &b"ACG"[..],
            &b"CGT"[..],
            &b"GT$"[..],
            &b"CCCC"[..],
            &b"GGG"[..],
            &b"T$C"[..],
        ] {
            assert_eq!(
                index.count_occurrences(pattern),
                naive_count(&reads, pattern),
                "pattern {}",
                String::from_utf8_lossy(pattern)
            );
        }
    }

    #[test]
    fn recovered_rows_start_with_pattern() {
        let index = MemoryIndex::from_reads([b"GATTACA".as_slice(), b"ATTAC".as_slice()]).unwrap();
        let range = index.find_range(b"TTAC");
        assert_eq!(range.len(), 2);
        for rank in range {
            let row = index.recover_row(rank);
            assert!(row.starts_with(b"TTAC"));
            assert_eq!(row.iter().filter(|&&b| b == TERMINATOR).count(), 1);
        }
    }

    #[test]
    fn rows_sort_terminator_first() {
        let index = MemoryIndex::from_reads([b"CA".as_slice()]).unwrap();
        assert_eq!(index.recover_row(0), b"$CA");
        assert_eq!(index.recover_row(1), b"A$C");
        assert_eq!(index.recover_row(2), b"CA$");
        assert!(index.recover_row(3).is_empty());
    }

    #[test]
    fn rejects_unsupported_characters() {
        let err = MemoryIndex::from_reads([b"ACXG".as_slice()]).unwrap_err();
        assert!(matches!(
            err,
            IndexError::UnsupportedCharacter { ch: 'X', read: 0, position: 2 }
        ));
    }

    #[test]
    fn load_index_reports_missing_dataset() {
        let err = load_index(Path::new("/definitely/not/a/dataset")).unwrap_err();
        assert!(matches!(err, IndexError::NotFound { .. }));
    }
}
