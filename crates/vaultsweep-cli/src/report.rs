/// Plain-text and CSV reports of scan and cleanup results.
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::Path;
use vaultsweep_core::cleanup::{CleanupOutcome, CleanupReport};
use vaultsweep_core::scanner::ScanResult;

/// Format a byte count with a binary unit.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else if b < GB {
        format!("{:.1} MB", b / MB)
    } else {
        format!("{:.2} GB", b / GB)
    }
}

pub fn print_scan(out: &mut dyn Write, result: &ScanResult) -> std::io::Result<()> {
    for warning in &result.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    if result.is_empty() {
        writeln!(out, "Nothing to clean.")?;
        return Ok(());
    }

    for file in &result.files_to_remove {
        let reason = result
            .reason(&file.path)
            .map(|r| r.to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "  {:>10}  {:<20}  {}",
            format_size(file.size),
            reason,
            file.path
        )?;
    }
    for folder in &result.folders_to_remove {
        writeln!(out, "  {:>10}  {:<20}  {}/", "", "empty folder", folder.path)?;
    }

    writeln!(
        out,
        "{} file(s) and {} folder(s), {} in {:.2?}",
        result.files_to_remove.len(),
        result.folders_to_remove.len(),
        format_size(result.bytes_to_free()),
        result.stats.duration
    )
}

pub fn print_cleanup(out: &mut dyn Write, outcome: &CleanupOutcome) -> std::io::Result<()> {
    match outcome {
        CleanupOutcome::NothingToClean => writeln!(out, "Nothing to clean."),
        CleanupOutcome::Aborted => writeln!(out, "Cleanup aborted. Nothing was removed."),
        CleanupOutcome::Completed(report) => print_report(out, "Removed", report),
    }
}

pub fn print_report(
    out: &mut dyn Write,
    verb: &str,
    report: &CleanupReport,
) -> std::io::Result<()> {
    for failure in &report.failures {
        writeln!(out, "failed: {}", failure.error)?;
    }
    writeln!(
        out,
        "{verb} {} item(s), {} failure(s).",
        report.deleted.len(),
        report.failures.len()
    )
}

/// Write one row per candidate: kind, path, reason, size, last modified.
pub fn export_csv(path: &Path, result: &ScanResult) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    wtr.write_record(["kind", "path", "reason", "size_bytes", "modified"])?;

    for file in &result.files_to_remove {
        let reason = result
            .reason(&file.path)
            .map(|r| r.to_string())
            .unwrap_or_default();
        let modified = file
            .modified
            .map(|m| DateTime::<Local>::from(m).to_rfc3339())
            .unwrap_or_default();
        wtr.write_record([
            "file",
            file.path.as_str(),
            reason.as_str(),
            file.size.to_string().as_str(),
            modified.as_str(),
        ])?;
    }
    for folder in &result.folders_to_remove {
        wtr.write_record(["folder", folder.path.as_str(), "empty folder", "0", ""])?;
    }

    wtr.flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_048_576), "1.0 MB");
        assert_eq!(format_size(1_073_741_824), "1.00 GB");
    }

    #[test]
    fn empty_result_says_so() {
        let mut out = Vec::new();
        print_scan(&mut out, &ScanResult::default()).expect("print");
        assert_eq!(String::from_utf8(out).expect("utf-8"), "Nothing to clean.\n");
    }

    #[test]
    fn aborted_cleanup_says_nothing_was_removed() {
        let mut out = Vec::new();
        print_cleanup(&mut out, &CleanupOutcome::Aborted).expect("print");
        assert!(String::from_utf8(out).expect("utf-8").contains("Nothing was removed"));
    }
}
