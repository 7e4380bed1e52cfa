// Thu Jan 22 2026 - Alex

use crate::analyze::OdrvReport;
use crate::registry::CounterSnapshot;
use crate::utils::demangle::demangle;
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::io::Write;

/// Serializes writes to the standard streams so progress overwrites and
/// diagnostics from worker threads never interleave.
pub struct PrintQueue {
    lock: Mutex<()>,
}

impl PrintQueue {
    pub fn new() -> Self {
        Self { lock: Mutex::new(()) }
    }

    pub fn out(&self, text: &str) {
        let _guard = self.lock.lock();
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    pub fn out_line(&self, text: &str) {
        let _guard = self.lock.lock();
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", text);
    }

    pub fn err_line(&self, text: &str) {
        let _guard = self.lock.lock();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", text);
    }
}

impl Default for PrintQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// The overwrite-style progress line, e.g. `12/340  3%; 1 violation(s) found`.
pub fn progress_line(snapshot: CounterSnapshot) -> String {
    let done = snapshot.analyzed;
    let total = snapshot.processed;
    let percentage = if total == 0 {
        0
    } else {
        (done as f64 / total as f64 * 100.0) as usize
    };
    // trailing overprint clears any previous lingerers
    format!(
        "\r{}/{}  {}%; {} violation(s) found          ",
        done, total, percentage, snapshot.violations
    )
}

/// Render one ODRV report: the category line, then every unique definition
/// as a DIE header plus its attribute list.
pub fn render_report(report: &OdrvReport, prefix: &str) -> String {
    let mut out = String::new();

    let symbol = if report.symbol.is_empty() {
        "<unknown>".to_string()
    } else {
        demangle(&report.symbol)
    };

    let _ = writeln!(
        out,
        "{}: ODRV ({}); conflict in `{}`",
        prefix,
        report.category(),
        symbol
    );

    for entry in report.conflict_map.values() {
        let _ = writeln!(
            out,
            "    {} [{}] (0x{:08x}) {}",
            entry.ancestry, entry.arch, entry.debug_info_offset, entry.tag
        );
        for attribute in &entry.attributes {
            let _ = writeln!(out, "        {}", attribute);
        }
    }

    out
}

/// End-of-run summary.
pub fn summary_line(snapshot: CounterSnapshot, unique_symbols: usize) -> String {
    format!(
        "{} die(s) processed; {} unique symbol(s); {} violation(s)",
        snapshot.processed, unique_symbols, snapshot.violations
    )
}
