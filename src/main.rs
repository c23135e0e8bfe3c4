use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use kmer_haplotyper::config::{DatasetGroup, QueryConfig, DEFAULT_MAX_MATCHES};
use kmer_haplotyper::genomics::DEFAULT_MIN_CONFIDENT_SIZE;
use kmer_haplotyper::query::{
    run_allele_query, run_batch_query, run_compare_query, run_mass_query, run_path_query,
    AlleleOutcome, CompareOutcome, DatasetReport, PathExtension, StrandSelection,
};

#[derive(Parser, Debug)]
#[command(name = "kmer-haplotyper", about = "Separate reads sharing a k-mer into haplotypes")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct Settings {
    /// Dataset group as LABEL=DIR[:READLEN]; datasets are addressed as
    /// `<group index>-<name>` in the order groups are given.
    #[arg(long = "group", global = true, value_name = "LABEL=DIR[:READLEN]")]
    groups: Vec<DatasetGroup>,
    /// Refuse queries matching more rows than this.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_MATCHES)]
    max_matches: usize,
    /// Report groups with at least this many reads individually.
    #[arg(long, global = true, default_value_t = DEFAULT_MIN_CONFIDENT_SIZE)]
    min_confident: usize,
    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Separate the reads containing PATTERN into haplotypes.
    Allele {
        /// Anchor k-mer.
        pattern: String,
        /// Dataset ids (`<group>-<name>`).
        #[arg(required = true)]
        datasets: Vec<String>,
    },
    /// Show every read containing PATTERN next to a single consensus.
    Compare {
        /// Anchor k-mer.
        pattern: String,
        /// Dataset ids (`<group>-<name>`).
        #[arg(required = true)]
        datasets: Vec<String>,
    },
    /// Count k-mers on one or both strands; prints the JSON wire format.
    Count {
        /// Dataset id; repeat to count across several datasets.
        #[arg(long = "dataset", required = true)]
        datasets: Vec<String>,
        /// Only count the queries as given.
        #[arg(long, conflicts_with = "reverse_only")]
        forward_only: bool,
        /// Only count reverse complements.
        #[arg(long)]
        reverse_only: bool,
        /// k-mers to count.
        #[arg(required = true)]
        queries: Vec<String>,
    },
    /// Follow the de Bruijn graph from KMER while the path is unambiguous.
    Extend {
        /// Dataset id.
        dataset: String,
        /// Seed k-mer.
        kmer: String,
        /// Minimum pooled count for a k-mer to be considered present.
        #[arg(long, default_value_t = 2)]
        threshold: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.settings.json;
    let config = QueryConfig::new(cli.settings.groups)
        .with_max_matches(cli.settings.max_matches)
        .with_min_confident_size(cli.settings.min_confident);
    config.validate().context("invalid query limits")?;
    info!(groups = config.groups.len(), "configured dataset groups");

    match cli.command {
        Commands::Allele { pattern, datasets } => {
            let reports = run_allele_query(&config, &datasets, &pattern)
                .with_context(|| format!("allele query for '{pattern}' failed"))?;
            if json {
                print_json(&reports)?;
            } else {
                reports.iter().for_each(print_allele);
            }
        }
        Commands::Compare { pattern, datasets } => {
            let reports = run_compare_query(&config, &datasets, &pattern)
                .with_context(|| format!("compare query for '{pattern}' failed"))?;
            if json {
                print_json(&reports)?;
            } else {
                reports.iter().for_each(print_compare);
            }
        }
        Commands::Count {
            datasets,
            forward_only,
            reverse_only,
            queries,
        } => {
            let strands = match (forward_only, reverse_only) {
                (true, _) => StrandSelection::FORWARD,
                (_, true) => StrandSelection::REVERSE,
                _ => StrandSelection::BOTH,
            };
            let queries_json = serde_json::to_string(&queries)?;
            let reply = match datasets.as_slice() {
                [dataset] => run_mass_query(&config, dataset, &queries_json, strands),
                _ => run_batch_query(
                    &config,
                    &serde_json::to_string(&datasets)?,
                    &queries_json,
                    strands,
                ),
            };
            let reply = reply.context("count query failed")?;
            println!("{reply}");
        }
        Commands::Extend {
            dataset,
            kmer,
            threshold,
        } => {
            let report = run_path_query(&config, &dataset, &kmer, threshold)
                .with_context(|| format!("path extension from '{kmer}' failed"))?;
            if json {
                print_json(&report)?;
            } else {
                print_path(&report);
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_header<O>(report: &DatasetReport<O>) {
    println!("{}: {}", report.group, report.name);
    println!(
        "{} strings with {} bases",
        report.summary.string_count, report.summary.total_size
    );
}

fn anchor_marker(anchor_start: usize, pattern_len: usize) -> String {
    format!(
        "{}{}{}",
        ".".repeat(anchor_start),
        "*".repeat(pattern_len),
        ".".repeat(anchor_start)
    )
}

fn print_allele(report: &DatasetReport<AlleleOutcome>) {
    print_header(report);
    match &report.outcome {
        AlleleOutcome::NotFound => println!("Pattern not found"),
        AlleleOutcome::TooManyMatches { forward, reverse } => println!(
            "Found {} times ({forward} forward, {reverse} reverse-complemented): too much data",
            forward + reverse
        ),
        AlleleOutcome::Haplotypes {
            forward,
            reverse,
            anchor_start,
            pattern_len,
            records,
        } => {
            println!(
                "Found {} times ({forward} forward, {reverse} reverse-complemented)",
                forward + reverse
            );
            println!("{}", anchor_marker(*anchor_start, *pattern_len));
            for record in records {
                println!("{}\t{:?}\t{}", record.consensus, record.kind, record.size());
            }
        }
    }
    println!();
}

fn print_compare(report: &DatasetReport<CompareOutcome>) {
    print_header(report);
    match &report.outcome {
        CompareOutcome::NotFound => println!("Pattern not found"),
        CompareOutcome::TooManyMatches { forward, reverse } => println!(
            "Found {} times ({forward} forward, {reverse} reverse-complemented): too much data",
            forward + reverse
        ),
        CompareOutcome::Reads {
            forward,
            reverse,
            anchor_start,
            pattern_len,
            consensus,
            reads,
        } => {
            println!(
                "Found {} times ({forward} forward, {reverse} reverse-complemented)",
                forward + reverse
            );
            println!("{}", anchor_marker(*anchor_start, *pattern_len));
            for read in reads {
                println!("{}\t{}", read.sequence, read.mismatches.len());
            }
            println!("{consensus}");
        }
    }
    println!();
}

fn print_path(report: &DatasetReport<PathExtension>) {
    print_header(report);
    let walk = &report.outcome;
    println!("{}", walk.path);
    println!("forward counts: {:?}", walk.forward_counts);
    println!("reverse counts: {:?}", walk.reverse_counts);
    println!(
        "next bases (A, C, G, T): forward {:?}, reverse {:?}",
        walk.next_forward, walk.next_reverse
    );
    println!("stopped: {:?}", walk.stop);
}
