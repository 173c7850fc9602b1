//! Console display logic for the mail-probe CLI.
//!
//! Banner, per-record status lines, the single overwritten progress line
//! and the final summary. Uses only the `console` crate.

use console::{style, Term};
use mail_probe_lib::{Outcome, ProbeResult, Progress, RunSummary};
use std::cell::Cell;
use std::io;

// ── Banner ───────────────────────────────────────────────────────────────────

pub fn print_banner() {
    println!();
    println!(
        "  {} {}",
        style("mail-probe").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
    );
    println!(
        "  {}",
        style("bulk email classification against a registration endpoint").dim()
    );
    println!();
}

// ── Progress ─────────────────────────────────────────────────────────────────

/// Renders status lines above a progress line that is rewritten in place.
///
/// When stdout is not a terminal only the status lines are written, followed
/// by the final progress line.
pub struct ProgressView {
    term: Term,
    last: Cell<Option<Progress>>,
}

impl ProgressView {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            last: Cell::new(None),
        }
    }

    pub fn start(&self, total: usize) {
        println!("{} Processing {} emails...", style("[*]").cyan(), total);
        println!();
    }

    /// Print the record's status line, then redraw the progress line.
    pub fn update(&self, result: &ProbeResult, progress: &Progress) -> io::Result<()> {
        self.last.set(Some(*progress));
        if self.term.is_term() {
            self.term.clear_line()?;
            self.term.write_line(&styled_status(result))?;
            self.term.write_str(&progress_line(progress))
        } else {
            self.term.write_line(&styled_status(result))
        }
    }

    pub fn finish(&self) -> io::Result<()> {
        if self.term.is_term() {
            self.term.write_line("")
        } else if let Some(progress) = self.last.get() {
            self.term.write_line(&progress_line(&progress))
        } else {
            Ok(())
        }
    }
}

impl Default for ProgressView {
    fn default() -> Self {
        Self::new()
    }
}

fn styled_status(result: &ProbeResult) -> String {
    let line = result.outcome.status_line(&result.email);
    match result.outcome {
        Outcome::Valid => style(line).green().to_string(),
        Outcome::Invalid => style(line).red().to_string(),
        Outcome::Failed => style(line).yellow().to_string(),
        Outcome::Skipped => style(line).dim().to_string(),
    }
}

pub(crate) fn progress_line(progress: &Progress) -> String {
    format!(
        "[*] Progress: {}/{} ({}%)",
        progress.completed, progress.total, progress.percent
    )
}

// ── Summary ──────────────────────────────────────────────────────────────────

pub(crate) fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let counters = &summary.counters;
    let paths = &summary.paths;
    vec![
        "=== Results ===".to_string(),
        format!("[+] Valid: {}", counters.valid),
        format!("[-] Invalid: {}", counters.invalid),
        format!("[!] Failed: {}", counters.failed),
        format!("[!] Skipped: {}", counters.skipped),
        String::new(),
        format!("Valid emails saved to: {}", paths.valid.display()),
        format!("Invalid emails saved to: {}", paths.invalid.display()),
        format!("Failed checks saved to: {}", paths.retry.display()),
        format!("Full log saved to: {}", paths.log.display()),
    ]
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    for (i, line) in summary_lines(summary).into_iter().enumerate() {
        if i == 0 {
            println!("{}", style(line).bold());
        } else {
            println!("{}", line);
        }
    }
    println!(
        "{}",
        style(format!(
            "Checked {} emails in {:.1}s",
            summary.total,
            summary.duration.as_secs_f64()
        ))
        .dim()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use mail_probe_lib::{OutputPaths, RunCounters};
    use std::time::Duration;

    #[test]
    fn test_progress_line_format() {
        let progress = Progress {
            completed: 3,
            total: 7,
            percent: 42,
            counters: RunCounters::default(),
        };
        assert_eq!(progress_line(&progress), "[*] Progress: 3/7 (42%)");
    }

    #[test]
    fn test_summary_lines() {
        let summary = RunSummary {
            counters: RunCounters {
                valid: 2,
                invalid: 1,
                failed: 0,
                skipped: 4,
            },
            total: 7,
            duration: Duration::from_millis(1500),
            paths: OutputPaths::in_dir("."),
        };

        let lines = summary_lines(&summary);
        assert_eq!(lines[1], "[+] Valid: 2");
        assert_eq!(lines[2], "[-] Invalid: 1");
        assert_eq!(lines[3], "[!] Failed: 0");
        assert_eq!(lines[4], "[!] Skipped: 4");
        assert!(lines[6].ends_with("valid_emails.txt"));
        assert!(lines[9].ends_with("checker.log"));
    }
}
