use anyhow::Context;
use clap::Parser;
use kira_te_classifier::*;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Classify query sequences against a library of TE reference sequences.
///
/// Writes one tab-separated line per query:
/// `name  reference|*  +|-|.  hits/total`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Reference FASTA(.gz), one record per family
    #[arg(short, long)]
    refs: PathBuf,

    /// Query FASTA(.gz)
    #[arg(short, long)]
    query: PathBuf,

    /// K-mer length (1..=16)
    #[arg(short = 'k', long, default_value_t = 11)]
    k: usize,

    /// Leave references shorter than this unindexed
    #[arg(long, default_value_t = 0)]
    min_ref_len: usize,

    /// Log per-reference forward/reverse hit counts for every query
    #[arg(long, default_value_t = false)]
    report: bool,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 if args.report => log::LevelFilter::Info,
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cfg = BuildConfig::default().k(args.k).min_ref_len(args.min_ref_len);
    let mut refs = FastaSource::open(&args.refs)
        .with_context(|| format!("cannot open reference file {}", args.refs.display()))?;
    let lib = build_library(&mut refs, &cfg)?;

    let mut queries = FastaSource::open(&args.query)
        .with_context(|| format!("cannot open query file {}", args.query.display()))?;
    let mut classifier = Classifier::new(&lib);
    let mut out = BufWriter::new(std::io::stdout().lock());
    let (mut n_queries, mut n_matched) = (0usize, 0usize);

    while let Some(rec) = queries.next_record()? {
        let board = classifier.score(&rec.bases);
        if args.report {
            log::info!("query {}: {} sampled k-mers", rec.name, board.total);
            for (name, h) in lib.names().zip(&board.hits) {
                log::info!("  {name}: forward {} reverse {}", h.forward, h.reverse);
            }
        }
        let call = board.decide();
        n_queries += 1;
        match call.matched() {
            Some((i, orientation)) => {
                n_matched += 1;
                let name = lib.name(i).unwrap_or("?");
                writeln!(out, "{}\t{name}\t{orientation}\t{}/{}", rec.name, call.hits, call.total)?;
            }
            None => writeln!(out, "{}\t*\t.\t{}/{}", rec.name, call.hits, call.total)?,
        }
    }
    out.flush()?;

    log::info!(
        "classified {n_matched} of {n_queries} queries against {} references (k={})",
        lib.len(),
        lib.k()
    );
    Ok(())
}
