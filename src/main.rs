//! Orchestration of the sweep: parse → validate root → scan → disposition →
//! output.

mod cli;
mod detect;
mod disposition;
mod error;
mod fingerprint;
mod index;
mod output;
mod walk;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;

use cli::Opts;
use detect::Detector;
use disposition::{Action, ActionStats, DispositionEngine};
use error::SweepError;
use fingerprint::Fingerprinter;
use walk::WalkOptions;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let opts = Opts::parse();

    // A bad root is a configuration error: fail before any scanning begins.
    // Canonicalizing up front also makes every walked path absolute.
    let root = fs::canonicalize(&opts.root)
        .ok()
        .filter(|r| r.is_dir())
        .ok_or_else(|| SweepError::RootInvalid {
            path: opts.root.clone(),
        })?;

    let detector = Detector::new(Fingerprinter::new(opts.algo, opts.chunk_size.as_u64()));
    let report = detector.scan(
        &root,
        WalkOptions {
            follow_symlinks: opts.follow_symlinks,
            skip_hidden: opts.skip_hidden,
            min_size: opts.min_size.as_u64(),
        },
    );

    // Side effects last, and only on explicit opt-in.
    let mut records = Vec::new();
    if opts.action != Action::Report {
        if !opts.yes {
            eprintln!("Refusing to modify files without --yes.");
        } else {
            let mut engine = DispositionEngine::new(
                opts.action,
                opts.quarantine_into.clone(),
                opts.on_collision,
            );
            records = engine
                .apply(&report.pairs)
                .context("disposition aborted")?;
        }
    }

    if opts.json {
        output::print_json(&report, &records).context("rendering JSON report")?;
    } else {
        output::print_human(&report, &records, opts.quiet);
    }

    // Non-zero exit code if any per-pair disposition failed.
    if ActionStats::from_records(&records).failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
