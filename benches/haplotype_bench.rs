//! Haplotype pipeline benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kmer_haplotyper::config::QueryConfig;
use kmer_haplotyper::genomics::{merge_haplotypes, MatchRanges, MemoryIndex, SequenceAligner};
use kmer_haplotyper::query::allele_query;

const ANCHOR: &[u8] = b"GATTACA";

/// Deterministic reads around the anchor with a handful of variant columns.
fn synthetic_reads(count: usize) -> Vec<Vec<u8>> {
    const BASES: [u8; 4] = *b"ACGT";
    let mut state = 0x2545_f491_u64;
    (0..count)
        .map(|i| {
            let mut read = b"CCTAGGCTTA".to_vec();
            read.extend_from_slice(ANCHOR);
            read.extend_from_slice(b"CTCCGAGCTT");
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let haplotype = (state >> 33) as usize % 4;
            read[3] = BASES[haplotype];
            read[20] = BASES[(haplotype + 1) % 4];
            // stagger read starts so the aligner sees varied flanks
            read.drain(..i % 5);
            read
        })
        .collect()
}

fn benchmark_merging(c: &mut Criterion) {
    let index = MemoryIndex::from_reads(synthetic_reads(400)).expect("synthetic reads are valid");
    let ranges = MatchRanges::find(&index, ANCHOR).expect("anchor is valid");
    let read_len = SequenceAligner::derive_read_len(&index, Some(28));
    let aligner = SequenceAligner::new(read_len, ANCHOR.len()).expect("anchor fits");
    let reads = aligner.align_matches(&index, &ranges).expect("rows align");

    c.bench_function("merge_haplotypes/400", |b| {
        b.iter(|| black_box(merge_haplotypes(black_box(reads.clone()))));
    });
}

fn benchmark_allele_query(c: &mut Criterion) {
    let index = MemoryIndex::from_reads(synthetic_reads(400)).expect("synthetic reads are valid");
    let config = QueryConfig::default();

    c.bench_function("allele_query/400", |b| {
        b.iter(|| black_box(allele_query(&index, ANCHOR, Some(28), &config)));
    });
}

criterion_group!(benches, benchmark_merging, benchmark_allele_query);
criterion_main!(benches);
