#![allow(dead_code)]

use std::fs;
use std::path::Path;

use kmer_haplotyper::config::{DatasetGroup, QueryConfig};
use kmer_haplotyper::genomics::{AlignedRead, MemoryIndex, READS_FILE};
use tempfile::TempDir;

/// Reads of the minor variant, the major variant and the minor variant's
/// reverse complement, all containing the anchor `GACC` on one strand.
pub const MINOR: &str = "TTGACCACAA";
pub const MAJOR: &str = "TTGACCTCAA";
pub const MINOR_RC: &str = "TTGTGGTCAA";

pub fn index_of(reads: &[&str]) -> MemoryIndex {
    MemoryIndex::from_reads(reads).expect("test reads are valid")
}

pub fn aligned(raw: &[&str]) -> Vec<AlignedRead> {
    raw.iter().map(|&read| AlignedRead::from(read)).collect()
}

/// Repeat each `(read, copies)` entry.
pub fn repeated(spec: &[(&'static str, usize)]) -> Vec<&'static str> {
    spec.iter()
        .flat_map(|&(read, copies)| std::iter::repeat(read).take(copies))
        .collect()
}

/// Dataset group laid out in a temporary directory, removed on drop.
pub struct DatasetDir {
    root: TempDir,
}

impl DatasetDir {
    pub fn new(tag: &str) -> Self {
        let root = tempfile::Builder::new()
            .prefix(&format!("kmer-haplotyper-{tag}-"))
            .tempdir()
            .expect("create dataset root");
        Self { root }
    }

    pub fn with_dataset(self, name: &str, reads: &[&str]) -> Self {
        let directory = self.root().join(name);
        fs::create_dir_all(&directory).expect("create dataset directory");
        fs::write(directory.join(READS_FILE), reads.join("\n")).expect("write reads");
        self
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Configuration with this directory as group 0.
    pub fn config(&self) -> QueryConfig {
        QueryConfig::default().with_group(DatasetGroup::new("test", self.root().to_path_buf()))
    }
}
