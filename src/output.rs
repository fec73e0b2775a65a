//! Rendering: human and JSON views of pairs, errors, and disposition
//! outcomes.

use bytesize::ByteSize;
use serde::Serialize;

use crate::detect::{DuplicatePair, ScanReport};
use crate::disposition::{ActionStats, DispositionRecord};

/// Print the human-readable report: pairs with original/duplicate labels,
/// per-pair outcomes when an action ran, collected per-file errors, and a
/// closing summary line. Errors and the summary survive `--quiet`.
pub fn print_human(report: &ScanReport, records: &[DispositionRecord], quiet: bool) {
    if !quiet {
        for pair in &report.pairs {
            println!("duplicate ({} each):", ByteSize(pair.size));
            println!("  original:  {}", pair.original.display());
            println!("  duplicate: {}", pair.duplicate.display());
        }
        if report.pairs.is_empty() {
            println!("No duplicates found.");
        }
        for r in records {
            println!("{}: {}", r.duplicate.display(), r.outcome);
        }
    }

    for e in &report.errors {
        eprintln!("warning: {e}");
    }

    if !records.is_empty() {
        let stats = ActionStats::from_records(records);
        eprintln!(
            "actions: applied={} skipped={} failed={}",
            stats.applied, stats.skipped, stats.failed
        );
    }

    println!(
        "Scanned {} files: {} duplicate pairs ({} reclaimable), {} distinct contents, {} errors",
        report.files_seen,
        report.pairs.len(),
        ByteSize(report.reclaimable()),
        report.distinct_contents,
        report.errors.len()
    );
}

#[derive(Serialize)]
struct JsonReport<'a> {
    pairs: &'a [DuplicatePair],
    errors: Vec<String>,
    dispositions: &'a [DispositionRecord],
    summary: Summary,
}

#[derive(Serialize)]
struct Summary {
    files_seen: u64,
    distinct_contents: usize,
    pairs: usize,
    reclaimable: u64,
    errors: usize,
    #[serde(flatten)]
    actions: ActionStats,
}

/// Print the whole run as one stable, pretty JSON document.
pub fn print_json(
    report: &ScanReport,
    records: &[DispositionRecord],
) -> serde_json::Result<()> {
    let doc = JsonReport {
        pairs: &report.pairs,
        errors: report.errors.iter().map(|e| e.to_string()).collect(),
        dispositions: records,
        summary: Summary {
            files_seen: report.files_seen,
            distinct_contents: report.distinct_contents,
            pairs: report.pairs.len(),
            reclaimable: report.reclaimable(),
            errors: report.errors.len(),
            actions: ActionStats::from_records(records),
        },
    };
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
