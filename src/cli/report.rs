//! Report formatting and printing utilities.
//!
//! Displays issues in cargo-style format. Kept apart from the indexing engine
//! so ngi18n can be used as a library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{
    CommandResult, CommandSummary, FixSummary, InitSummary, ListSummary, LocateSummary,
};
use crate::core::query::SpanTarget;
use crate::issues::{Issue, Report, ReportLocation, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Maximum number of usages to display per identifier in `list`.
const MAX_USAGES_DISPLAY: usize = 3;

/// Print issues in cargo-style format to stdout.
pub fn report(issues: &[Issue]) {
    report_to(issues, &mut io::stdout().lock());
}

/// Print issues to a custom writer.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let mut sorted = issues.to_vec();
    sorted.sort_by(compare_issues);

    let max_line_width = calculate_max_line_width(&sorted);

    for issue in &sorted {
        print_issue(issue, writer, max_line_width);
    }

    print_summary(&sorted, writer);
}

/// Print a success message when no issues are found.
pub fn print_success(files: usize) {
    print_success_to(files, &mut io::stdout().lock());
}

pub fn print_success_to<W: Write>(files: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} template {} - no issues found",
            files,
            if files == 1 { "file" } else { "files" }
        )
        .green()
    );
}

/// Print a warning about templates that could not be read.
pub fn print_read_warning(count: usize, verbose: bool) {
    print_read_warning_to(count, verbose, &mut io::stderr().lock());
}

pub fn print_read_warning_to<W: Write>(count: usize, verbose: bool, writer: &mut W) {
    if count > 0 && !verbose {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be read (use {} for details)",
            "warning:".bold().yellow(),
            count,
            "-v".cyan()
        );
    }
}

// ============================================================
// Internal Functions
// ============================================================

fn print_issue<W: Write>(issue: &Issue, writer: &mut W, max_line_width: usize) {
    let loc = issue.location();
    let (file_path, line, col, source_line) = extract_location_info(&loc);

    let severity = issue.report_severity();
    let severity_str = match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity_str,
        issue.message(),
        issue.report_rule().to_string().dimmed().cyan()
    );

    if line > 0 {
        let _ = writeln!(writer, "  {} {}:{}:{}", "-->".blue(), file_path, line, col);
    } else {
        let _ = writeln!(writer, "  {} {}", "-->".blue(), file_path);
    }

    if let Some(source_line) = source_line {
        let caret_char = match severity {
            Severity::Error => "^".red(),
            Severity::Warning => "^".yellow(),
        };

        let _ = writeln!(
            writer,
            "{:>width$} {}",
            "",
            "|".blue(),
            width = max_line_width
        );
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            line.to_string().blue(),
            "|".blue(),
            source_line,
            width = max_line_width
        );

        // col is 1-based
        let prefix: String = source_line.chars().take(col.saturating_sub(1)).collect();
        let caret_padding = UnicodeWidthStr::width(prefix.as_str());
        let _ = writeln!(
            writer,
            "{:>width$} {} {:>padding$}{}",
            "",
            "|".blue(),
            "",
            caret_char,
            width = max_line_width,
            padding = caret_padding
        );
    }

    if let Some(details) = issue.details() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            details,
            width = max_line_width
        );
    }

    if let Some(hint) = issue.hint() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "hint:".bold().cyan(),
            hint,
            width = max_line_width
        );
    }

    let _ = writeln!(writer);
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let total_warnings = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Warning)
        .count();
    let total_problems = total_errors + total_warnings;

    if total_problems > 0 {
        let _ = writeln!(
            writer,
            "\n{} {} problems ({} {}, {} {})",
            FAILURE_MARK.red(),
            total_problems,
            total_errors,
            if total_errors == 1 { "error" } else { "errors" }.red(),
            total_warnings,
            if total_warnings == 1 {
                "warning"
            } else {
                "warnings"
            }
            .yellow()
        );
    }
}

fn extract_location_info<'a>(
    loc: &'a ReportLocation<'a>,
) -> (&'a str, usize, usize, Option<&'a str>) {
    match loc {
        ReportLocation::Source(ctx) => (
            &ctx.location.file_path,
            ctx.location.line,
            ctx.location.col,
            Some(&ctx.source_line),
        ),
        ReportLocation::File { path } => (path, 0, 0, None),
    }
}

fn calculate_max_line_width(issues: &[Issue]) -> usize {
    issues
        .iter()
        .filter_map(|i| match i.location() {
            ReportLocation::Source(ctx) => Some(ctx.location.line),
            ReportLocation::File { .. } => None,
        })
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}

fn compare_issues(a: &Issue, b: &Issue) -> std::cmp::Ordering {
    let a_loc = a.location();
    let b_loc = b.location();
    let (a_path, a_line, a_col, _) = extract_location_info(&a_loc);
    let (b_path, b_line, b_col, _) = extract_location_info(&b_loc);

    a_path
        .cmp(b_path)
        .then_with(|| a_line.cmp(&b_line))
        .then_with(|| a_col.cmp(&b_col))
}

pub fn print(result: &CommandResult, verbose: bool) {
    print_to(result, &mut io::stdout().lock());
    print_read_warning(result.read_error_count, verbose);
}

pub fn print_to<W: Write>(result: &CommandResult, writer: &mut W) {
    match &result.summary {
        CommandSummary::Check(summary) => {
            report_to(&result.issues, writer);
            if result.issues.is_empty() {
                print_success_to(summary.files_checked, writer);
            }
        }
        CommandSummary::List(summary) => print_list(summary, writer),
        CommandSummary::Locate(summary) => print_locate(summary, writer),
        CommandSummary::Fix(summary) => {
            report_to(&result.issues, writer);
            print_fix(summary, writer);
        }
        CommandSummary::Init(summary) => print_init(summary, writer),
    }
}

fn print_list<W: Write>(summary: &ListSummary, writer: &mut W) {
    if summary.entries.is_empty() {
        let _ = writeln!(writer, "No translation identifiers found.");
        return;
    }

    for entry in &summary.entries {
        let _ = writeln!(
            writer,
            "{} ({} {})",
            entry.id.bold(),
            entry.usages.len(),
            if entry.usages.len() == 1 { "usage" } else { "usages" }
        );
        for value in &entry.values {
            let _ = writeln!(writer, "  {} {}", "=".blue(), value);
        }

        let total = entry.usages.len();
        let display_count = total.min(MAX_USAGES_DISPLAY);
        for (i, usage) in entry.usages.iter().take(display_count).enumerate() {
            let remaining = total - display_count;
            let suffix = if i == display_count - 1 && remaining > 0 {
                format!(" (and {} more)", remaining)
            } else {
                String::new()
            };
            let _ = writeln!(
                writer,
                "  {} {}:{}:{}{}",
                "-->".blue(),
                usage.file,
                usage.line,
                usage.col,
                suffix
            );
        }
    }

    let _ = writeln!(
        writer,
        "\n{} {} {}",
        SUCCESS_MARK.green(),
        summary.entries.len(),
        if summary.entries.len() == 1 {
            "identifier"
        } else {
            "identifiers"
        }
    );
}

fn print_locate<W: Write>(summary: &LocateSummary, writer: &mut W) {
    let what = match summary.target {
        SpanTarget::Id => "identifier",
        SpanTarget::Content => "content",
    };
    match summary.span {
        Some(span) => {
            let _ = writeln!(
                writer,
                "{}:{}:{}-{}:{}",
                summary.file,
                span.start.line + 1,
                span.start.col + 1,
                span.end.line + 1,
                span.end.col + 1
            );
        }
        None => {
            let _ = writeln!(
                writer,
                "{} No {} found for \"{}\" (occurrence {}) in {}",
                FAILURE_MARK.red(),
                what,
                summary.id,
                summary.occurrence,
                summary.file
            );
        }
    }
}

fn print_fix<W: Write>(summary: &FixSummary, writer: &mut W) {
    match summary {
        FixSummary::Listed { fixable: 0 } => {
            let _ = writeln!(writer, "{} No fixable records.", SUCCESS_MARK.green());
        }
        FixSummary::Listed { fixable } => {
            let _ = writeln!(
                writer,
                "{} fixable record(s). Pick one with {} and write it with {}.",
                fixable,
                "--id <ID> --index <N> --action <ACTION>".cyan(),
                "--apply".cyan()
            );
        }
        FixSummary::Preview { action, operations } => {
            for op in operations {
                op.preview_to(writer);
            }
            let edits: usize = operations.iter().map(|op| op.edits.len()).sum();
            if edits == 0 {
                let _ = writeln!(writer, "{}: nothing to change.", action.label);
                return;
            }
            let _ = writeln!(
                writer,
                "{} {}: {} edit(s) in {} file(s).",
                "Would apply".yellow().bold(),
                action.label,
                edits,
                operations.len()
            );
            let _ = writeln!(writer, "Run with {} to write these changes.", "--apply".cyan());
        }
        FixSummary::Applied {
            action,
            stats,
            remaining,
        } => {
            let _ = writeln!(
                writer,
                "{} {}: {} edit(s) in {} file(s).",
                "Applied".green().bold(),
                action.label,
                stats.changes_applied,
                stats.files_modified.len()
            );
            if *remaining > 0 {
                let _ = writeln!(writer, "{} problem(s) remaining.", remaining);
            } else {
                let _ = writeln!(writer, "{} No problems remaining.", SUCCESS_MARK.green());
            }
        }
    }
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    if summary.created {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", summary.path).green()
        );
    } else {
        eprintln!("Error: {} already exists", summary.path);
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        actions::{Edit, FixAction, Operation},
        cli::commands::{ListEntry, Usage},
        core::parsers::html::{Position, Span},
        issues::{EntryIssue, ReadErrorIssue, Rule, SourceContext, SourceLocation},
    };

    fn strip_ansi(s: &str) -> String {
        let mut result = String::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                // Skip until 'm'
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next == 'm' {
                        break;
                    }
                }
            } else {
                result.push(c);
            }
        }
        result
    }

    fn render(result: &CommandResult) -> String {
        let mut output = Vec::new();
        print_to(result, &mut output);
        strip_ansi(&String::from_utf8(output).unwrap())
    }

    fn entry_issue(severity: Severity, line: usize, col: usize) -> Issue {
        Issue::from(EntryIssue {
            context: SourceContext {
                location: SourceLocation::new("src/app.html", line, col),
                source_line: "<p i18n=\"@@greet\">Hello</p>".to_string(),
            },
            id: "@@greet".to_string(),
            index: 0,
            occurrence: 0,
            value: Some("Hello".to_string()),
            severity,
            rule: Rule::DuplicateValue,
            message: "The translation has the same value as @@hello".to_string(),
            fix_actions: vec![FixAction::new("keep:@@greet", "Keep @@greet")],
        })
    }

    #[test]
    fn test_report_empty() {
        let mut output = Vec::new();
        report_to(&[], &mut output);
        assert!(output.is_empty());
    }

    #[test]
    fn test_report_entry_issue() {
        let mut output = Vec::new();
        report_to(&[entry_issue(Severity::Warning, 3, 10)], &mut output);
        let stripped = strip_ansi(&String::from_utf8(output).unwrap());

        assert!(stripped.contains(
            "warning: \"@@greet\" The translation has the same value as @@hello  duplicate-value"
        ));
        assert!(stripped.contains("--> src/app.html:3:10"));
        assert!(stripped.contains("3 | <p i18n=\"@@greet\">Hello</p>"));
        assert!(stripped.contains("  |          ^"));
        assert!(stripped.contains("= note: value: Hello"));
        assert!(stripped.contains("= hint: ngi18n fix --id '@@greet' --index 0 --action <keep:@@greet>"));
        assert!(stripped.contains("1 problems (0 errors, 1 warning)"));
    }

    #[test]
    fn test_report_read_error_has_no_source_block() {
        let issue = Issue::from(ReadErrorIssue {
            file_path: "src/broken.html".to_string(),
            error: "Failed to read template: src/broken.html".to_string(),
        });

        let mut output = Vec::new();
        report_to(&[issue], &mut output);
        let stripped = strip_ansi(&String::from_utf8(output).unwrap());

        assert!(stripped.contains("error: Failed to read template: src/broken.html  read-error"));
        assert!(stripped.contains("--> src/broken.html\n"));
        assert!(!stripped.contains(" | "));
    }

    #[test]
    fn test_check_without_issues_prints_success() {
        let result = CommandResult::new(CommandSummary::Check(
            crate::cli::commands::CheckSummary { files_checked: 1 },
        ));

        assert_eq!(render(&result), "✓ Checked 1 template file - no issues found\n");
    }

    #[test]
    fn test_list_truncates_usages() {
        let usages = (1..=5)
            .map(|line| Usage {
                file: "a.html".to_string(),
                line,
                col: 4,
            })
            .collect();
        let result = CommandResult::new(CommandSummary::List(ListSummary {
            entries: vec![ListEntry {
                id: "@@a".to_string(),
                values: vec!["Hi".to_string()],
                usages,
            }],
        }));

        let output = render(&result);

        assert!(output.contains("@@a (5 usages)"));
        assert!(output.contains("= Hi"));
        assert!(output.contains("--> a.html:3:4 (and 2 more)"));
        assert!(!output.contains("a.html:4:4"));
        assert!(output.contains("1 identifier"));
    }

    #[test]
    fn test_locate_output() {
        let at = |line, col| Position { offset: 0, line, col };
        let found = CommandResult::new(CommandSummary::Locate(LocateSummary {
            file: "a.html".to_string(),
            id: "@@a".to_string(),
            occurrence: 0,
            target: SpanTarget::Id,
            span: Some(Span {
                start: at(0, 9),
                end: at(0, 12),
            }),
        }));
        assert_eq!(render(&found), "a.html:1:10-1:13\n");

        let missing = CommandResult::new(CommandSummary::Locate(LocateSummary {
            file: "a.html".to_string(),
            id: "@@b".to_string(),
            occurrence: 2,
            target: SpanTarget::Content,
            span: None,
        }));
        assert_eq!(
            render(&missing),
            "✘ No content found for \"@@b\" (occurrence 2) in a.html\n"
        );
    }

    #[test]
    fn test_fix_preview_output() {
        let result = CommandResult::new(CommandSummary::Fix(FixSummary::Preview {
            action: FixAction::new("flatten", "Remove nested HTML tags"),
            operations: vec![Operation {
                file_path: "a.html".to_string(),
                edits: vec![Edit {
                    range: 14..28,
                    replacement: "Hi there".to_string(),
                    line: 2,
                }],
            }],
        }));

        let output = render(&result);

        assert!(output.contains("--> a.html:2 => Hi there"));
        assert!(output.contains("Would apply Remove nested HTML tags: 1 edit(s) in 1 file(s)."));
        assert!(output.contains("Run with --apply"));
    }
}
