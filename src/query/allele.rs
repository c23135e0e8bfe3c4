use serde::Serialize;
use tracing::{info, warn};

use crate::config::QueryConfig;
use crate::genomics::{
    classify_groups, merge_haplotypes, normalize_pattern, AlignedRead, HaplotypeRecord,
    MatchRanges, SequenceAligner, SequenceIndex,
};
use crate::query::{for_each_dataset, DatasetReport, QueryError};

/// Result of an allele query against one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AlleleOutcome {
    /// Pattern occurs on neither strand.
    NotFound,
    /// More matches than the configured cap; nothing was clustered.
    TooManyMatches {
        /// Forward matches.
        forward: usize,
        /// Reverse-complement matches.
        reverse: usize,
    },
    /// Haplotype records, confident ones first.
    Haplotypes {
        /// Forward matches.
        forward: usize,
        /// Reverse-complement matches.
        reverse: usize,
        /// First column of the anchor window.
        anchor_start: usize,
        /// Anchor length.
        pattern_len: usize,
        /// Confident records by descending size, then the remainder.
        records: Vec<HaplotypeRecord>,
    },
}

/// Cluster aligned reads and split the groups into confident and remainder
/// records.
pub fn extract_haplotypes(
    reads: Vec<AlignedRead>,
    min_confident_size: usize,
) -> Vec<HaplotypeRecord> {
    if reads.is_empty() {
        return Vec::new();
    }
    classify_groups(merge_haplotypes(reads), min_confident_size)
}

/// Run the allele query for an already normalized `pattern` on one index.
pub fn allele_query<I: SequenceIndex + ?Sized>(
    index: &I,
    pattern: &[u8],
    uniform_length: Option<usize>,
    config: &QueryConfig,
) -> Result<AlleleOutcome, QueryError> {
    let ranges = MatchRanges::find(index, pattern)?;
    let (forward, reverse) = (ranges.forward_count(), ranges.reverse_count());
    if ranges.is_empty() {
        return Ok(AlleleOutcome::NotFound);
    }
    if ranges.total() > config.max_matches {
        warn!(
            forward,
            reverse,
            cap = config.max_matches,
            "too many matches, skipping haplotype extraction"
        );
        return Ok(AlleleOutcome::TooManyMatches { forward, reverse });
    }

    let read_len = SequenceAligner::derive_read_len(index, uniform_length);
    let aligner = SequenceAligner::new(read_len, pattern.len())?;
    let reads = aligner.align_matches(index, &ranges)?;
    let records = extract_haplotypes(reads, config.min_confident_size);
    info!(
        forward,
        reverse,
        haplotypes = records.len(),
        "extracted haplotypes"
    );

    Ok(AlleleOutcome::Haplotypes {
        forward,
        reverse,
        anchor_start: aligner.margin(),
        pattern_len: aligner.pattern_len(),
        records,
    })
}

/// Allele query across several datasets. The pattern is validated before any
/// dataset is touched.
pub fn run_allele_query(
    config: &QueryConfig,
    datasets: &[String],
    pattern: &str,
) -> Result<Vec<DatasetReport<AlleleOutcome>>, QueryError> {
    let pattern = normalize_pattern(pattern)?;
    for_each_dataset(config, datasets, |index, location| {
        allele_query(index, &pattern, location.uniform_length, config)
    })
}
