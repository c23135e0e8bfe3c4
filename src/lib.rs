//! # k-mer Haplotype Separation
//!
//! Given a short anchor pattern, this library pulls every read containing it
//! (on either strand) out of a sequence index and separates those reads into
//! haplotypes: groups believed to come from the same sequence variant.
//!
//! ## Pipeline
//!
//! 1. **Alignment**: every matching row is placed into a fixed-width frame of
//!    `2 * readLen - patternLen` columns with the anchor at column
//!    `readLen - patternLen`; reverse-strand rows are flipped first
//! 2. **Bucketing**: identical aligned reads become one initial group
//! 3. **Greedy merging**: the heaviest conflict-free pair of groups is merged
//!    until no compatible pair remains
//! 4. **Classification**: large groups are reported individually, the rest
//!    are pooled and re-voted into a single remainder record
//!
//! ## Usage Example
//!
//! ```
//! use kmer_haplotyper::genomics::{merge_haplotypes, MatchRanges, MemoryIndex, SequenceAligner};
//!
//! let index = MemoryIndex::from_reads(["TTGACCTCAA", "TTGACCTCAA", "TTGACCACAA"])?;
//! let ranges = MatchRanges::find(&index, b"GACC")?;
//! let aligner = SequenceAligner::new(SequenceAligner::derive_read_len(&index, None), 4)?;
//! let groups = merge_haplotypes(aligner.align_matches(&index, &ranges)?);
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups[0].size(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod config;   // Dataset groups and query limits
pub mod genomics; // Alignment, consensus and merging
pub mod query;    // Per-dataset query handlers

// Re-exports for convenience
pub use config::{ConfigError, DatasetGroup, QueryConfig};
pub use genomics::{
    AlignedRead, HaplotypeGroup, HaplotypeRecord, MemoryIndex, RecordKind, SequenceIndex,
};
pub use query::QueryError;
