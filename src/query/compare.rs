use std::cmp::Ordering;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::QueryConfig;
use crate::genomics::alphabet::is_called;
use crate::genomics::{
    build_consensus, normalize_pattern, AlignedRead, MatchRanges, SequenceAligner, SequenceIndex,
};
use crate::query::{for_each_dataset, DatasetReport, QueryError};

/// Aligned read together with the columns where it disagrees with the
/// consensus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparedRead {
    /// Read in the anchor frame.
    pub sequence: AlignedRead,
    /// Called columns whose base differs from a called consensus base.
    pub mismatches: Vec<usize>,
}

/// Result of a compare query against one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompareOutcome {
    /// Pattern occurs on neither strand.
    NotFound,
    /// More matches than the configured cap.
    TooManyMatches {
        /// Forward matches.
        forward: usize,
        /// Reverse-complement matches.
        reverse: usize,
    },
    /// Every matching read, sorted centre-out, with one consensus over all.
    Reads {
        /// Forward matches.
        forward: usize,
        /// Reverse-complement matches.
        reverse: usize,
        /// First column of the anchor window.
        anchor_start: usize,
        /// Anchor length.
        pattern_len: usize,
        /// Majority vote over every read.
        consensus: AlignedRead,
        /// Reads ordered by [`center_out_cmp`].
        reads: Vec<ComparedRead>,
    },
}

/// Order two reads by their first differing column, visiting columns from the
/// middle outward: `mid, mid + 1, mid - 1, mid + 2, ...`. Walking off either
/// end before a difference is found makes the reads equal.
pub fn center_out_cmp(a: &[u8], b: &[u8]) -> Ordering {
    let width = a.len().min(b.len());
    if width == 0 {
        return Ordering::Equal;
    }
    let mut column = (a.len() / 2) as isize;
    let mut step = 1isize;
    loop {
        if column < 0 || column as usize >= width {
            return Ordering::Equal;
        }
        let c = column as usize;
        match a[c].cmp(&b[c]) {
            Ordering::Equal => {}
            order => return order,
        }
        column += step;
        step = -(step + step.signum());
    }
}

fn mismatches(read: &AlignedRead, consensus: &AlignedRead) -> Vec<usize> {
    read.as_bytes()
        .iter()
        .zip(consensus.as_bytes())
        .enumerate()
        .filter(|&(_, (&base, &called))| {
            is_called(base) && is_called(called) && !base.eq_ignore_ascii_case(&called)
        })
        .map(|(column, _)| column)
        .collect()
}

/// Run the compare query for an already normalized `pattern` on one index.
pub fn compare_query<I: SequenceIndex + ?Sized>(
    index: &I,
    pattern: &[u8],
    uniform_length: Option<usize>,
    config: &QueryConfig,
) -> Result<CompareOutcome, QueryError> {
    let ranges = MatchRanges::find(index, pattern)?;
    let (forward, reverse) = (ranges.forward_count(), ranges.reverse_count());
    if ranges.is_empty() {
        return Ok(CompareOutcome::NotFound);
    }
    if ranges.total() > config.max_matches {
        warn!(forward, reverse, cap = config.max_matches, "too many matches to compare");
        return Ok(CompareOutcome::TooManyMatches { forward, reverse });
    }

    let read_len = SequenceAligner::derive_read_len(index, uniform_length);
    let aligner = SequenceAligner::new(read_len, pattern.len())?;
    let mut reads = aligner.align_matches(index, &ranges)?;
    let consensus = build_consensus(&reads).sequence;
    reads.sort_by(|a, b| center_out_cmp(a.as_bytes(), b.as_bytes()));
    info!(forward, reverse, "compared reads");

    let reads = reads
        .into_iter()
        .map(|sequence| ComparedRead {
            mismatches: mismatches(&sequence, &consensus),
            sequence,
        })
        .collect();
    Ok(CompareOutcome::Reads {
        forward,
        reverse,
        anchor_start: aligner.margin(),
        pattern_len: aligner.pattern_len(),
        consensus,
        reads,
    })
}

/// Compare query across several datasets.
pub fn run_compare_query(
    config: &QueryConfig,
    datasets: &[String],
    pattern: &str,
) -> Result<Vec<DatasetReport<CompareOutcome>>, QueryError> {
    let pattern = normalize_pattern(pattern)?;
    for_each_dataset(config, datasets, |index, location| {
        compare_query(index, &pattern, location.uniform_length, config)
    })
}
