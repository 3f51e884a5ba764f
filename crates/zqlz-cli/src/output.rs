//! Human-readable output on stdout

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use zqlz_restore::{
    ProgressListener, RestoreEvent, RestoreReport, RunOutcome, VerificationReport,
};

use crate::dumps::DumpEntry;

/// Prints restore checkpoints as they happen
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ProgressListener for ConsoleProgress {
    fn on_event(&self, event: &RestoreEvent) {
        if let Some(line) = progress_line(event) {
            println!("{}", line);
        }
    }
}

/// The line printed for an event, if any
pub fn progress_line(event: &RestoreEvent) -> Option<String> {
    match event {
        RestoreEvent::WholeFileStarted { .. } => Some(
            "Executing backup as a single transaction (this may take several minutes)...".into(),
        ),
        RestoreEvent::WholeFileSucceeded => Some("All SQL statements executed successfully".into()),
        RestoreEvent::FallingBack { reason } => Some(format!(
            "Backup too large for a single transaction ({}). Splitting into batches...",
            reason
        )),
        RestoreEvent::Tokenized {
            statements,
            batches,
        } => Some(format!(
            "Split into {} statements. Executing in {} batches...",
            statements, batches
        )),
        RestoreEvent::BatchProgress {
            processed,
            total,
            percent,
        } => Some(format!(
            "  Progress: {}/{} statements ({:.1}%)",
            processed, total, percent
        )),
        RestoreEvent::BatchFailed {
            benign: false,
            batch_index,
            message,
        } => Some(format!("  Error in batch {}: {}", batch_index, message)),
        RestoreEvent::BatchFailed { benign: true, .. } => None,
        RestoreEvent::Completed { .. } | RestoreEvent::Aborted { .. } => None,
    }
}

/// Summary lines for a finished restore
pub fn summary_lines(report: &RestoreReport) -> Vec<String> {
    let mut lines = vec!["Import completed".to_string()];
    if let RunOutcome::Completed {
        strategy,
        batches,
        errors,
        benign,
    } = &report.outcome
    {
        lines.push(format!("  Strategy: {}", strategy));
        if *batches > 0 {
            lines.push(format!("  Batches executed: {}", batches));
        }
        if *errors > 0 {
            lines.push(format!("  Errors tolerated: {}", errors));
        }
        if *benign > 0 {
            lines.push(format!("  Existing objects skipped: {}", benign));
        }
    }
    lines.push(format!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64()));
    lines
}

pub fn verification_table(report: &VerificationReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Table", "Rows"]);

    for snapshot in &report.tables {
        let rows = match snapshot.row_count {
            Some(count) => Cell::new(count).set_alignment(CellAlignment::Right),
            None => Cell::new("count unavailable"),
        };
        table.add_row(vec![Cell::new(&snapshot.name), rows]);
    }
    table.add_row(vec![
        Cell::new(format!("{} tables", report.table_count())),
        Cell::new(report.total_rows()).set_alignment(CellAlignment::Right),
    ]);
    table
}

pub fn dump_table(dumps: &[DumpEntry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "File", "Size (MB)"]);

    for (i, dump) in dumps.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&dump.name),
            Cell::new(format!("{:.2}", dump.size_mb())).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn print_report(report: &RestoreReport) {
    println!();
    for line in summary_lines(report) {
        println!("{}", line);
    }

    match &report.verification {
        None => {}
        Some(Ok(verification)) => {
            println!();
            println!(
                "Verification ({} tables in schema \"{}\"):",
                verification.table_count(),
                verification.schema
            );
            println!("{}", verification_table(verification));
        }
        Some(Err(message)) => {
            println!();
            println!("Verification could not be completed: {}", message);
        }
    }
}
