//! Sequence primitives and the haplotype-separation engine.
//!
//! Reads matching an anchor pattern are recovered from a [`SequenceIndex`],
//! placed into a shared frame by [`SequenceAligner`], bucketed and merged by
//! [`GreedyMerger`], and finally split into confident and remainder records
//! by [`classify_groups`].

pub mod alphabet;
mod aligner;
mod classifier;
mod compatibility;
mod consensus;
mod index;
mod merger;
mod types;

pub use aligner::{AlignError, MatchRanges, SequenceAligner};
pub use alphabet::{normalize_pattern, reverse_complement, AlphabetError, BaseCode};
pub use classifier::{classify_groups, HaplotypeRecord, RecordKind, DEFAULT_MIN_CONFIDENT_SIZE};
pub use compatibility::{combine, compatibility, overlap, Compatibility, OverlapCounts};
pub use consensus::{build_consensus, tally_columns, ColumnTally, Consensus};
pub use index::{load_index, IndexError, MemoryIndex, SequenceIndex, READS_FILE};
pub use merger::{merge_haplotypes, GreedyMerger, MergeRecord};
pub use types::{AlignedRead, GroupId, HaplotypeGroup, Orientation};
