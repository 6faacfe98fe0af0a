//! Rendering of lines, messages and summaries in text, XML or JSON.

use std::collections::{BTreeMap, HashSet};
use std::io::{self, Write};

use serde_json::json;

use crate::diagnostics::codes::{CodeClass, ErrorCode, Severity};
use crate::diagnostics::sink::{Attribution, Diagnostic, Summary};

/// Lines longer than this are shortened in text reports
const MAX_DISPLAYED_LINE: usize = 200;
const TRUNCATED_LINE: usize = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Xml,
    Json,
}

/// Escape text for use in XML content or attribute values
#[must_use]
pub fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Make trailing or doubled spaces visible and shorten very long lines
fn display_text(text: &str) -> String {
    let mut shown = if text.len() > MAX_DISPLAYED_LINE {
        let mut end = TRUNCATED_LINE;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    } else {
        text.to_string()
    };
    if text.ends_with(' ') || text.contains("  ") || text.contains(" \t") {
        shown.push_str("<<<SPACE!");
    }
    shown
}

pub(crate) fn write_preamble(out: &mut dyn Write, format: ReportFormat) -> io::Result<()> {
    if format == ReportFormat::Xml {
        writeln!(out, "<?xml version=\"1.0\"?>")?;
        writeln!(out, "<page>")?;
    }
    Ok(())
}

/// Write a line that has at least one message attached.
///
/// In text reports lines are separated by a blank line, except when a
/// message spans two consecutive lines.
pub(crate) fn write_line(
    out: &mut dyn Write,
    format: ReportFormat,
    file: Option<&str>,
    number: usize,
    text: &str,
    two_lines: bool,
) -> io::Result<()> {
    match format {
        ReportFormat::Text => {
            if !two_lines {
                writeln!(out)?;
            }
            match file {
                Some(file) => writeln!(out, "{file}:{number}:{}", display_text(text)),
                None => writeln!(out, "{number}:{}", display_text(text)),
            }
        }
        ReportFormat::Xml => {
            write!(out, "<line num=\"{number}\"")?;
            if let Some(file) = file {
                write!(out, " filename=\"{}\"", xml_escape(file))?;
            }
            if two_lines {
                write!(out, " two_lines=\"true\"")?;
            }
            writeln!(out, ">{}</line>", xml_escape(text))
        }
        ReportFormat::Json => {
            let value = json!({
                "line": number,
                "file": file,
                "text": text,
            });
            writeln!(out, "{value}")
        }
    }
}

pub(crate) fn write_message(
    out: &mut dyn Write,
    format: ReportFormat,
    diagnostic: &Diagnostic,
    severity: Severity,
    code_label: &str,
) -> io::Result<()> {
    let line_skipped = diagnostic.code.skips_line()
        && diagnostic.attribution.contains(Attribution::CURRENT_LINE);
    match format {
        ReportFormat::Text => {
            if diagnostic.attribution.is_none() {
                if let Some(file) = &diagnostic.file {
                    writeln!(out, "{file}:")?;
                }
            }
            let skipped = if line_skipped { ", line skipped" } else { "" };
            writeln!(out, "\t{}{skipped}: {}", severity.label(), diagnostic.text)
        }
        ReportFormat::Xml => {
            write!(out, "<message severity=\"{}\"", severity.label())?;
            if line_skipped {
                write!(out, " line_skipped=\"1\"")?;
            }
            writeln!(out, ">")?;
            writeln!(out, " <code>{code_label}</code>")?;
            if let Some(file) = &diagnostic.file {
                writeln!(out, " <filename>{}</filename>", xml_escape(file))?;
            }
            for line in &diagnostic.lines {
                writeln!(out, " <line_num>{line}</line_num>")?;
            }
            writeln!(out, " <text>{}</text>", xml_escape(&diagnostic.text))?;
            writeln!(out, "</message>")
        }
        ReportFormat::Json => {
            let value = json!({
                "severity": severity.label(),
                "code": code_label,
                "file": diagnostic.file,
                "lines": diagnostic.lines,
                "line_skipped": line_skipped,
                "text": diagnostic.text,
            });
            writeln!(out, "{value}")
        }
    }
}

fn plural(count: usize, word: &str) -> String {
    match count {
        0 => format!("no {word}s"),
        1 => format!("1 {word}"),
        n => format!("{n} {word}s"),
    }
}

/// "No errors, 1 warning, 2 notes; 3 not printed"
#[must_use]
pub fn totals_line(summary: &Summary) -> String {
    let mut parts = vec![plural(summary.errors, "error")];
    if summary.warnings > 0 || summary.notes == 0 {
        parts.push(plural(summary.warnings, "warning"));
    }
    if summary.notes > 0 {
        parts.push(plural(summary.notes, "note"));
    }
    let mut line = parts.join(", ");
    if let Some(first) = line.get(..1) {
        line = first.to_uppercase() + &line[1..];
    }
    if summary.suppressed > 0 {
        line.push_str(&format!("; {} not printed", summary.suppressed));
    }
    line
}

pub(crate) fn write_summary(
    out: &mut dyn Write,
    format: ReportFormat,
    summary: &Summary,
    labels: &BTreeMap<ErrorCode, String>,
) -> io::Result<()> {
    let label = |code: &ErrorCode| labels.get(code).cloned().unwrap_or_else(|| code.printable());
    match format {
        ReportFormat::Text => {
            if summary.lines_skipped > 0 {
                writeln!(out)?;
                writeln!(
                    out,
                    "NOTE: {} invalid lines were skipped (not subjected to all the checks, not included in most of the counts below).",
                    summary.lines_skipped
                )?;
            }
            if !summary.counts.is_empty() {
                writeln!(out)?;
                writeln!(out, "{:>7} Code  Description", "Count")?;
                for (code, count) in &summary.counts {
                    writeln!(out, "{count:>7} {:<5} {}", label(code), code.template())?;
                }
            }
            writeln!(out)?;
            writeln!(out, "{}", totals_line(summary))
        }
        ReportFormat::Xml => {
            for (code, count) in &summary.counts {
                writeln!(out, "<msg_summary>")?;
                writeln!(out, " <code>{}</code>", label(code))?;
                writeln!(out, " <text>{}</text>", xml_escape(code.template()))?;
                writeln!(out, " <count>{count}</count>")?;
                writeln!(out, "</msg_summary>")?;
            }
            writeln!(out, "<errors>{}</errors>", summary.errors)?;
            writeln!(out, "<warnings>{}</warnings>", summary.warnings)?;
            writeln!(out, "<notes>{}</notes>", summary.notes)?;
            writeln!(out, "<not_printed>{}</not_printed>", summary.suppressed)?;
            writeln!(out, "<invalid_lines>{}</invalid_lines>", summary.lines_skipped)?;
            writeln!(out, "</page>")
        }
        ReportFormat::Json => {
            let counts: BTreeMap<String, usize> = summary
                .counts
                .iter()
                .map(|(code, count)| (label(code), *count))
                .collect();
            let value = json!({
                "summary": {
                    "counts": counts,
                    "errors": summary.errors,
                    "warnings": summary.warnings,
                    "notes": summary.notes,
                    "not_printed": summary.suppressed,
                    "invalid_lines": summary.lines_skipped,
                }
            });
            writeln!(out, "{value}")
        }
    }
}

/// Catalogue label; warnings that become errors in strict mode read `w31/e31`
fn catalogue_label(code: ErrorCode, strict_mode_warnings: &HashSet<ErrorCode>) -> String {
    if code.class() == CodeClass::ContentWarning
        && code.severity() == Severity::Warning
        && !strict_mode_warnings.contains(&code)
    {
        format!("{}/e{:02}", code.printable(), code.number())
    } else {
        code.printable()
    }
}

/// List every code with its label and message template.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_catalogue(
    out: &mut dyn Write,
    format: ReportFormat,
    strict_mode_warnings: &HashSet<ErrorCode>,
) -> io::Result<()> {
    if format == ReportFormat::Json {
        for code in ErrorCode::ALL {
            let value = json!({
                "code": code.printable(),
                "class": code.class(),
                "severity": code.severity(),
                "skips_line": code.skips_line(),
                "strict_mode_error": catalogue_label(code, strict_mode_warnings).contains('/'),
                "text": code.template(),
            });
            writeln!(out, "{value}")?;
        }
        return Ok(());
    }

    if format == ReportFormat::Xml {
        writeln!(out, "<?xml version=\"1.0\"?>")?;
        writeln!(out, "<codes>")?;
        for code in ErrorCode::ALL {
            writeln!(
                out,
                "<code id=\"{}\" severity=\"{}\">{}</code>",
                catalogue_label(code, strict_mode_warnings),
                code.severity().label(),
                xml_escape(code.template())
            )?;
        }
        return writeln!(out, "</codes>");
    }

    let mut heading = None;
    for code in ErrorCode::ALL {
        let section = match code.class() {
            CodeClass::ContentError if code.skips_line() => {
                "### Errors within a single line. Lines with such errors are skipped, ###\n\
                 ### i.e. not used for: further checks, object/component/gap counts.  ###"
            }
            CodeClass::ContentError => "### Errors that may involve several lines ###",
            CodeClass::ContentWarning => "### Warnings (most are errors in strict mode) ###",
            CodeClass::External => "### Errors for GenBank-based and other component checks ###",
        };
        if heading != Some(section) {
            if heading.is_some() {
                writeln!(out)?;
            }
            writeln!(out, "{section}")?;
            heading = Some(section);
        }
        let note = if code == ErrorCode::GapLineMissingCol9 {
            " (no longer reported)"
        } else if code.severity() == Severity::Note {
            " (NOTE)"
        } else {
            ""
        };
        writeln!(
            out,
            "{}\t{}{note}",
            catalogue_label(code, strict_mode_warnings),
            code.template()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::sink::DEFAULT_STRICT_MODE_WARNINGS;

    fn render(f: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_text_line_marks_spaces_and_truncates() {
        let text = render(|out| {
            write_line(out, ReportFormat::Text, Some("a.agp"), 3, "chr1 ", false)
        });
        assert_eq!(text, "\na.agp:3:chr1 <<<SPACE!\n");

        let long = "x".repeat(250);
        let text = render(|out| write_line(out, ReportFormat::Text, None, 1, &long, true));
        assert_eq!(text, format!("1:{}...\n", "x".repeat(160)));
    }

    #[test]
    fn test_xml_message() {
        let diagnostic = Diagnostic {
            code: ErrorCode::EmptyColumn,
            text: "column 3 is empty".to_string(),
            attribution: Attribution::CURRENT_LINE,
            lines: vec![7],
            file: None,
        };
        let xml = render(|out| {
            write_message(out, ReportFormat::Xml, &diagnostic, Severity::Error, "e02")
        });
        assert!(xml.starts_with("<message severity=\"ERROR\" line_skipped=\"1\">"));
        assert!(xml.contains("<line_num>7</line_num>"));
        assert!(xml.contains("<code>e02</code>"));
    }

    #[test]
    fn test_totals_line() {
        let summary = Summary {
            warnings: 1,
            notes: 2,
            suppressed: 3,
            ..Summary::default()
        };
        assert_eq!(totals_line(&summary), "No errors, 1 warning, 2 notes; 3 not printed");

        let summary = Summary {
            errors: 2,
            ..Summary::default()
        };
        assert_eq!(totals_line(&summary), "2 errors, no warnings");
    }

    #[test]
    fn test_catalogue_lists_every_code() {
        let strict: HashSet<ErrorCode> = DEFAULT_STRICT_MODE_WARNINGS.into_iter().collect();
        let text = render(|out| write_catalogue(out, ReportFormat::Text, &strict));
        assert!(text.contains("e01\texpecting 9 tab-separated columns"));
        assert!(text.contains("w31/e31\tgap at the end of object"));
        assert!(text.contains("w42\tmissing line separator"));
        assert!(text.contains("w52\tgap shorter than 10 bp (NOTE)"));
        assert!(text.contains("### Errors that may involve several lines ###"));

        let json = render(|out| write_catalogue(out, ReportFormat::Json, &strict));
        assert_eq!(json.lines().count(), ErrorCode::ALL.len());
    }
}
