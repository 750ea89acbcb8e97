//! Terminal and Markdown rendering.
//!
//! Beta is shown rounded to two decimals here. Exports keep full precision.

use crate::export::BetaReport;
use betacalc_estimator::BetaSummary;
use std::fmt::Write;

const WIDTH: usize = 72;

/// Human-readable rendering of a result.
pub trait TextReport {
    /// Fixed-width table for the terminal.
    fn to_ascii_table(&self) -> String;

    /// Markdown table.
    fn to_markdown(&self) -> String;
}

fn beta_cell(beta: Option<f64>) -> String {
    beta.map_or_else(|| "n/a".to_string(), |b| format!("{b:.2}"))
}

fn change_cell(change: Option<f64>) -> String {
    change.map_or_else(String::new, |c| format!("{:.2}%", c * 100.0))
}

impl TextReport for BetaReport {
    fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "\nBeta: {} vs {}", self.symbol, self.benchmark);
        output.push_str(&"=".repeat(WIDTH));
        output.push('\n');

        match &self.result {
            Some(result) => {
                let _ = writeln!(output, "{:<20} {:>12.2}", "Beta", result.rounded());
                let _ = writeln!(output, "{:<20} {:>12}", "Start Date", result.start_date);
                let _ = writeln!(output, "{:<20} {:>12}", "End Date", result.end_date);
                let _ = writeln!(output, "{:<20} {:>12}", "Sample Size", result.sample_size);
                let _ = writeln!(output, "{:<20} {:>12}", "Return Mode", result.mode);
            }
            None => {
                let _ = writeln!(output, "{:<20} {:>12}", "Beta", "n/a");
                if let Some(error) = &self.error {
                    let _ = writeln!(output, "{:<20} {}", "Error", error);
                }
            }
        }

        if !self.workings.aligned.is_empty() {
            output.push_str(&"-".repeat(WIDTH));
            output.push('\n');
            let _ = writeln!(
                output,
                "{:<12} {:>14} {:>10} {:>14} {:>10}",
                "Date", "Stock", "Chg %", "Index", "Chg %"
            );
            for row in &self.workings.aligned {
                let _ = writeln!(
                    output,
                    "{:<12} {:>14.2} {:>10} {:>14.2} {:>10}",
                    row.date,
                    row.asset_price,
                    change_cell(row.asset_return),
                    row.benchmark_price,
                    change_cell(row.benchmark_return)
                );
            }
        }

        if !self.workings.unmatched.is_empty() {
            let _ = writeln!(
                output,
                "{} unmatched date(s) not used",
                self.workings.unmatched.len()
            );
        }

        output.push_str(&"=".repeat(WIDTH));
        output.push('\n');
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "# Beta: {} vs {}\n", self.symbol, self.benchmark);
        match &self.result {
            Some(result) => {
                let _ = writeln!(output, "| Metric | Value |");
                let _ = writeln!(output, "|--------|-------|");
                let _ = writeln!(output, "| Beta | {:.2} |", result.rounded());
                let _ = writeln!(
                    output,
                    "| Period | {} to {} |",
                    result.start_date, result.end_date
                );
                let _ = writeln!(output, "| Sample Size | {} |", result.sample_size);
                let _ = writeln!(output, "| Return Mode | {} |", result.mode);
            }
            None => {
                let _ = writeln!(
                    output,
                    "Beta unavailable: {}",
                    self.error.as_deref().unwrap_or("no result")
                );
            }
        }
        output
    }
}

impl TextReport for BetaSummary {
    fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "\nBeta Summary (benchmark {})", self.benchmark);
        output.push_str(&"=".repeat(WIDTH));
        output.push('\n');
        let _ = writeln!(output, "{:<20} {:>10}  {}", "Stock Symbol", "Beta", "Note");
        output.push_str(&"-".repeat(WIDTH));
        output.push('\n');

        for entry in &self.entries {
            let note = entry.error.as_deref().unwrap_or("");
            let _ = writeln!(
                output,
                "{:<20} {:>10}  {}",
                entry.symbol,
                beta_cell(entry.beta()),
                note
            );
        }

        output.push_str(&"-".repeat(WIDTH));
        output.push('\n');
        let _ = writeln!(
            output,
            "{:<20} {:>10}",
            "Average Beta",
            beta_cell(self.average_beta())
        );
        output.push_str(&"=".repeat(WIDTH));
        output.push('\n');
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "# Beta Summary\n");
        let _ = writeln!(output, "Benchmark: {}\n", self.benchmark);
        let _ = writeln!(output, "| Stock Symbol | Beta |");
        let _ = writeln!(output, "|--------------|------|");
        for entry in &self.entries {
            let _ = writeln!(output, "| {} | {} |", entry.symbol, beta_cell(entry.beta()));
        }
        let _ = writeln!(
            output,
            "| **Average Beta** | {} |",
            beta_cell(self.average_beta())
        );
        output
    }
}
