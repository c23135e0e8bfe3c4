//! Walk through the haplotype pipeline step by step on a small read set.

use anyhow::{Context, Result};
use kmer_haplotyper::genomics::{
    classify_groups, GreedyMerger, MatchRanges, MemoryIndex, SequenceAligner,
    DEFAULT_MIN_CONFIDENT_SIZE,
};

const ANCHOR: &str = "GACC";

fn main() -> Result<()> {
    let mut reads = vec!["TTGACCTCAA"; 6];
    reads.extend(["TTGACCACAA", "TTGTGGTCAA", "TTGTGGTCAA", "GACCTCAAGT"]);
    let index = MemoryIndex::from_reads(&reads).context("failed to build index")?;

    let ranges = MatchRanges::find(&index, ANCHOR.as_bytes()).context("invalid anchor")?;
    println!(
        "{ANCHOR}: {} forward, {} reverse-complemented",
        ranges.forward_count(),
        ranges.reverse_count()
    );

    let read_len = SequenceAligner::derive_read_len(&index, None);
    let aligner = SequenceAligner::new(read_len, ANCHOR.len()).context("anchor does not fit")?;
    let aligned = aligner
        .align_matches(&index, &ranges)
        .context("failed to align matching rows")?;
    for read in &aligned {
        println!("  {read}");
    }

    let mut merger = GreedyMerger::from_reads(aligned);
    println!(
        "{} initial groups, {} compatible pairs",
        merger.node_count(),
        merger.edge_count()
    );
    while let Some(step) = merger.merge_step() {
        println!(
            "  merged {} + {} (weight {}) into {}",
            step.low, step.high, step.weight, step.merged
        );
    }

    for record in classify_groups(merger.run(), DEFAULT_MIN_CONFIDENT_SIZE) {
        println!("{}\t{:?}\t{} reads", record.consensus, record.kind, record.size());
    }
    Ok(())
}
