//! Rendering diagnostic records for people (rustc-like text) and for tools
//! (JSON).

use crate::diagnostics::{DiagnosticRecord, FixItChange, Severity};
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use std::fmt::{self, Write as _};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}' (expected text or json)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// The records extracted from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: String,
    pub diagnostics: Vec<DiagnosticRecord>,
}

impl FileReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

fn severity_label(severity: Severity) -> ColoredString {
    let label = severity.to_string();
    match severity {
        Severity::Error => label.red().bold(),
        Severity::Warning => label.yellow().bold(),
        Severity::Note | Severity::Remark => label.cyan().bold(),
    }
}

fn describe_change(change: &FixItChange) -> String {
    match change {
        FixItChange::Replace { span, .. } | FixItChange::Delete { span } => match span.end() {
            Some(end) => format!("{}-{}", span.start(), end),
            None => span.start().to_string(),
        },
        FixItChange::Insert { position, .. } => position.to_string(),
        FixItChange::Generic { description, .. } => description.clone(),
    }
}

/// One record as rustc-style text.
pub fn render_record(file: &str, record: &DiagnosticRecord) -> String {
    let mut out = String::new();
    let width = record
        .context_lines
        .iter()
        .map(|line| line.line_number.to_string().len())
        .max()
        .unwrap_or(1);
    let gutter = " ".repeat(width);
    let bar = "|".blue().bold();

    let _ = writeln!(out, "{}: {}", severity_label(record.severity), record.message.bold());
    let _ = writeln!(out, "{gutter}{} {file}:{}", "-->".blue().bold(), record.location);
    if !record.context_lines.is_empty() {
        let _ = writeln!(out, "{gutter} {bar}");
    }
    for line in &record.context_lines {
        let number = format!("{:>width$}", line.line_number);
        let _ = writeln!(out, "{} {bar} {}", number.blue().bold(), line.text);
        if line.line_number == record.location.line {
            let carets = match record.span.end() {
                Some(end) if end.line == record.location.line && end.column > record.location.column => {
                    end.column - record.location.column
                }
                _ => 1,
            };
            let marker = "^".repeat(carets);
            let _ = writeln!(
                out,
                "{gutter} {bar} {}{}",
                " ".repeat(record.location.column.saturating_sub(1)),
                marker.red().bold()
            );
        }
    }
    for fix_it in &record.fix_its {
        let places: Vec<String> = fix_it.changes.iter().map(describe_change).collect();
        let _ = writeln!(
            out,
            "{gutter} {} {}: {} ({})",
            "=".blue().bold(),
            "fix-it".bold(),
            fix_it.message,
            places.join(", ")
        );
    }
    for note in &record.notes {
        match note.location {
            Some(location) => {
                let _ = writeln!(
                    out,
                    "{gutter} {} {}: {} ({file}:{location})",
                    "=".blue().bold(),
                    "note".bold(),
                    note.message
                );
            }
            None => {
                let _ = writeln!(out, "{gutter} {} {}: {}", "=".blue().bold(), "note".bold(), note.message);
            }
        }
    }
    out
}

/// Every record of every report, followed by a summary line.
pub fn render_text(reports: &[FileReport]) -> String {
    let mut out = String::new();
    for report in reports {
        for record in &report.diagnostics {
            out.push_str(&render_record(&report.file, record));
            out.push('\n');
        }
    }
    let errors: usize = reports.iter().map(FileReport::error_count).sum();
    let warnings: usize = reports.iter().map(FileReport::warning_count).sum();
    let summary = format!(
        "{} file(s) checked: {errors} error(s), {warnings} warning(s)",
        reports.len()
    );
    if errors > 0 {
        let _ = writeln!(out, "{}", summary.red());
    } else if warnings > 0 {
        let _ = writeln!(out, "{}", summary.yellow());
    } else {
        let _ = writeln!(out, "{}", summary.green());
    }
    out
}

pub fn render_json(reports: &[FileReport]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(reports)
}

/// Unified line diff between two versions of `file`.
pub fn unified_diff(file: &str, original: &str, modified: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("--- {file} (original)").dimmed());
    let _ = writeln!(out, "{}", format!("+++ {file} (modified)").dimmed());
    let diff = TextDiff::from_lines(original, modified);
    for group in diff.grouped_ops(3) {
        for op in group {
            for change in diff.iter_changes(&op) {
                let line = match change.tag() {
                    ChangeTag::Delete => format!("-{change}").red(),
                    ChangeTag::Insert => format!("+{change}").green(),
                    ChangeTag::Equal => format!(" {change}").normal(),
                };
                out.push_str(&line.to_string());
                if change.missing_newline() {
                    out.push('\n');
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticExtractor;
    use crate::parser::parse;

    fn report(source: &str) -> FileReport {
        let parsed = parse("bad.swift", source);
        FileReport {
            file: "bad.swift".to_string(),
            diagnostics: DiagnosticExtractor::default().extract(&parsed.tree, &parsed.diagnostics),
        }
    }

    #[test]
    fn text_points_at_the_quoted_code() {
        colored::control::set_override(false);
        let report = report("func bad: <T>(value: T) -> T { return value }\n");
        let text = render_text(std::slice::from_ref(&report));
        assert!(text.contains("error: unexpected code ': <T>(value: T) -> T'"), "{text}");
        assert!(text.contains("--> bad.swift:1:9"), "{text}");
        assert!(text.contains("1 | func bad: <T>(value: T) -> T { return value }"), "{text}");
        assert!(text.contains(&format!("  | {}^", " ".repeat(8))), "{text}");
        assert!(text.contains("error(s)"));
    }

    #[test]
    fn clean_files_only_print_the_summary() {
        colored::control::set_override(false);
        let report = report("let a = 1\n");
        assert_eq!(report.error_count(), 0);
        assert_eq!(
            render_text(&[report]),
            "1 file(s) checked: 0 error(s), 0 warning(s)\n"
        );
    }

    #[test]
    fn json_is_camel_case() {
        let report = report("struct S {\n    fucn f() {}\n}\n");
        let json: serde_json::Value = serde_json::from_str(&render_json(&[report]).unwrap()).unwrap();
        let first = &json[0]["diagnostics"][0];
        assert_eq!(json[0]["file"], "bad.swift");
        assert!(first["contextLines"].is_array());
        assert_eq!(first["severity"], "error");
        assert!(first["position"].is_string());
    }

    #[test]
    fn diff_marks_changed_lines() {
        colored::control::set_override(false);
        let diff = unified_diff("a.swift", "let a = 1\nlet b = 2\n", "let a = 1\nlet c = 2\n");
        assert!(diff.contains("-let b = 2\n"));
        assert!(diff.contains("+let c = 2\n"));
        assert!(diff.contains(" let a = 1\n"));
    }

    #[test]
    fn formats_parse() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
