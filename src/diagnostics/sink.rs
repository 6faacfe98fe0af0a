use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{self, Write};

use serde::Serialize;

use crate::diagnostics::codes::{format_message, CodeClass, ErrorCode, Severity};
use crate::diagnostics::report::{self, ReportFormat};
use crate::diagnostics::window::{FlushedLine, LineWindow};

/// Warnings that keep their severity in strict mode
pub const DEFAULT_STRICT_MODE_WARNINGS: [ErrorCode; 10] = [
    ErrorCode::GapLineMissingCol9,
    ErrorCode::NoEolAtEof,
    ErrorCode::ObjOrderNotNumerical,
    ErrorCode::CompIsWgsTypeIsNot,
    ErrorCode::CompIsNotWgsTypeIs,
    ErrorCode::AgpVersionCommentUnnecessary,
    ErrorCode::CompIsNotHtgTypeIs,
    ErrorCode::SingletonsOnly,
    ErrorCode::GnlId,
    ErrorCode::CompIsLocalTypeNotW,
];

/// Codes shown only a handful of times in text reports
const TEXT_THROTTLED: [ErrorCode; 5] = [
    ErrorCode::CompIsWgsTypeIsNot,
    ErrorCode::CompIsNotWgsTypeIs,
    ErrorCode::CompIsNotHtgTypeIs,
    ErrorCode::CompIsLocalTypeNotW,
    ErrorCode::ShortGap,
];
const TEXT_THROTTLE_LIMIT: u32 = 5;

/// Which lines a message is about.
///
/// Flags combine with `|`; an empty set means the message concerns no line in
/// particular (the stream as a whole).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attribution(u8);

impl Attribution {
    pub const NONE: Self = Self(0);
    pub const CURRENT_LINE: Self = Self(1);
    pub const PREVIOUS_LINE: Self = Self(1 << 1);
    pub const LINE_BEFORE_PREVIOUS: Self = Self(1 << 2);

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    #[must_use]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Attribution {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// How the reader classified a physical line when flushing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    /// A content line used for cross-line checks
    Valid,
    /// A content line with a structural error, left out of cross-line checks
    Skipped,
    /// A comment-only line; it never becomes the "previous line"
    Comment,
}

/// Destination for diagnostics.
///
/// Parsers, the stream reader and observers all report through this trait, so
/// collaborators (sequence database lookups, FASTA length checks) share one
/// channel with the core checks.
pub trait DiagnosticSink {
    /// Report `code`, substituting `details` into its message template.
    fn msg(&mut self, code: ErrorCode, details: &str, attribution: Attribution);

    /// Called once per physical line, after every check on it has run.
    fn line_done(&mut self, text: &str, line_number: usize, status: LineStatus);

    /// Report `code` without details
    fn report(&mut self, code: ErrorCode, attribution: Attribution) {
        self.msg(code, "", attribution);
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &mut T {
    fn msg(&mut self, code: ErrorCode, details: &str, attribution: Attribution) {
        (**self).msg(code, details, attribution);
    }

    fn line_done(&mut self, text: &str, line_number: usize, status: LineStatus) {
        (**self).line_done(text, line_number, status);
    }
}

/// A message that was displayed (not dropped by throttling)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: ErrorCode,
    /// Template with details substituted
    pub text: String,
    pub attribution: Attribution,
    /// Line numbers the message was attached to, oldest first
    pub lines: Vec<usize>,
    pub file: Option<String>,
}

impl Diagnostic {
    /// Severity derived from the code
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

/// Totals for a validation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Every report per code, including those not displayed
    pub counts: BTreeMap<ErrorCode, usize>,
    pub errors: usize,
    pub warnings: usize,
    pub notes: usize,
    /// Messages counted but not displayed
    pub suppressed: usize,
    /// Lines excluded from cross-line checks
    pub lines_skipped: usize,
}

/// The standard sink: renders lines and messages to a writer as they become
/// final, keeps authoritative per-code counts, and applies throttling and
/// strict-mode severity.
pub struct DiagnosticLog<W: Write> {
    out: W,
    format: ReportFormat,
    window: LineWindow,
    diagnostics: Vec<Diagnostic>,
    counts: BTreeMap<ErrorCode, usize>,
    /// 1: never display; n > 1: display n - 1 more times
    display_budget: HashMap<ErrorCode, u32>,
    max_repeat: usize,
    suppressed: usize,
    lines_skipped: usize,
    strict: bool,
    strict_mode_warnings: HashSet<ErrorCode>,
    treat_as_error: HashSet<ErrorCode>,
    file: Option<String>,
    two_lines_involved: bool,
    io_error: Option<io::Error>,
}

impl DiagnosticLog<io::Sink> {
    /// A log that only records diagnostics and counts, writing nothing
    #[must_use]
    pub fn collecting() -> Self {
        Self::new(io::sink(), ReportFormat::Json)
    }
}

impl<W: Write> DiagnosticLog<W> {
    #[must_use]
    pub fn new(out: W, format: ReportFormat) -> Self {
        let mut display_budget = HashMap::new();
        display_budget.insert(ErrorCode::GapLineMissingCol9, 1);
        if format == ReportFormat::Text {
            display_budget.insert(ErrorCode::ExtraTab, 1);
            for code in TEXT_THROTTLED {
                display_budget.insert(code, TEXT_THROTTLE_LIMIT + 1);
            }
        }

        Self {
            out,
            format,
            window: LineWindow::new(),
            diagnostics: Vec::new(),
            counts: BTreeMap::new(),
            display_budget,
            max_repeat: 0,
            suppressed: 0,
            lines_skipped: 0,
            strict: false,
            strict_mode_warnings: DEFAULT_STRICT_MODE_WARNINGS.into_iter().collect(),
            treat_as_error: HashSet::new(),
            file: None,
            two_lines_involved: false,
            io_error: None,
        }
    }

    /// Report most warnings as errors
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Display at most `max_repeat` messages per code (0 = no limit)
    #[must_use]
    pub fn with_max_repeat(mut self, max_repeat: usize) -> Self {
        self.max_repeat = max_repeat;
        self
    }

    /// Replace the set of warnings that stay warnings in strict mode
    pub fn set_strict_mode_warnings(&mut self, codes: impl IntoIterator<Item = ErrorCode>) {
        self.strict_mode_warnings = codes.into_iter().collect();
    }

    /// Always report these codes as errors
    pub fn treat_as_error(&mut self, codes: impl IntoIterator<Item = ErrorCode>) {
        self.treat_as_error.extend(codes);
    }

    /// Count these codes but never display them
    pub fn silence(&mut self, codes: impl IntoIterator<Item = ErrorCode>) {
        for code in codes {
            self.display_budget.insert(code, 1);
        }
    }

    /// Display these codes without any per-code limit
    pub fn unsilence(&mut self, codes: impl IntoIterator<Item = ErrorCode>) {
        for code in codes {
            self.display_budget.remove(&code);
        }
    }

    /// Label subsequent lines with `name` and forget the previous file's lines
    pub fn start_file(&mut self, name: impl Into<String>) {
        self.file = Some(name.into());
        self.window.clear();
        self.two_lines_involved = false;
    }

    #[must_use]
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Severity after strict-mode and treat-as-error reclassification
    #[must_use]
    pub fn effective_severity(&self, code: ErrorCode) -> Severity {
        if self.treat_as_error.contains(&code) {
            return Severity::Error;
        }
        let severity = code.severity();
        if self.strict
            && severity == Severity::Warning
            && code.class() == CodeClass::ContentWarning
            && !self.strict_mode_warnings.contains(&code)
        {
            return Severity::Error;
        }
        severity
    }

    /// Printable code; reclassified warnings are labelled `e..`
    #[must_use]
    pub fn display_code(&self, code: ErrorCode) -> String {
        if code.class() == CodeClass::ContentWarning
            && self.effective_severity(code) == Severity::Error
        {
            format!("e{:02}", code.number())
        } else {
            code.printable()
        }
    }

    /// Displayed diagnostics, in the order they became final
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of times `code` was reported, displayed or not
    #[must_use]
    pub fn count(&self, code: ErrorCode) -> usize {
        self.counts.get(&code).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            counts: self.counts.clone(),
            suppressed: self.suppressed,
            lines_skipped: self.lines_skipped,
            ..Summary::default()
        };
        for (code, count) in &self.counts {
            match self.effective_severity(*code) {
                Severity::Error => summary.errors += count,
                Severity::Warning => summary.warnings += count,
                Severity::Note => summary.notes += count,
            }
        }
        summary
    }

    /// Write the report preamble (XML only)
    pub fn begin_report(&mut self) {
        let result = report::write_preamble(&mut self.out, self.format);
        self.record(result);
    }

    /// Write per-code counts and totals, closing the report
    pub fn write_summary(&mut self) {
        let summary = self.summary();
        let labels: BTreeMap<ErrorCode, String> = summary
            .counts
            .keys()
            .map(|code| (*code, self.display_code(*code)))
            .collect();
        let result = report::write_summary(&mut self.out, self.format, &summary, &labels);
        self.record(result);
    }

    /// The underlying writer, for callers appending their own sections
    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Flush the writer and surface the first write error, if any
    ///
    /// # Errors
    ///
    /// Returns the first I/O error hit while writing the report.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.io_error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            if self.io_error.is_none() {
                self.io_error = Some(err);
            }
        }
    }

    fn print_flushed_line(&mut self, before_previous: bool) -> Option<usize> {
        let two_lines = self.two_lines_involved;
        let line = if before_previous {
            self.window.before_previous_mut()?
        } else {
            self.window.previous_mut()?
        };
        let mut result = Ok(());
        if !line.printed {
            result = report::write_line(
                &mut self.out,
                self.format,
                line.file.as_deref(),
                line.number,
                &line.text,
                two_lines,
            );
        }
        line.printed = true;
        let number = line.number;
        self.record(result);
        Some(number)
    }

    fn print_message(&mut self, diagnostic: &Diagnostic) {
        let severity = self.effective_severity(diagnostic.code);
        let label = self.display_code(diagnostic.code);
        let result =
            report::write_message(&mut self.out, self.format, diagnostic, severity, &label);
        self.record(result);
    }
}

impl<W: Write> DiagnosticSink for DiagnosticLog<W> {
    fn msg(&mut self, code: ErrorCode, details: &str, attribution: Attribution) {
        let count = self.counts.entry(code).or_insert(0);
        *count += 1;
        let count = *count;

        if let Some(left) = self.display_budget.get_mut(&code) {
            if *left == 1 {
                self.suppressed += 1;
                return;
            }
            if *left > 1 {
                *left -= 1;
            }
        }
        if self.max_repeat > 0 && count > self.max_repeat {
            self.suppressed += 1;
            return;
        }

        let mut diagnostic = Diagnostic {
            code,
            text: format_message(code.template(), details),
            attribution,
            lines: Vec::new(),
            file: self.file.clone(),
        };

        if attribution.contains(Attribution::LINE_BEFORE_PREVIOUS) {
            if let Some(number) = self.print_flushed_line(true) {
                diagnostic.lines.push(number);
            }
            if attribution.contains(Attribution::PREVIOUS_LINE) {
                self.two_lines_involved = true;
            }
        }
        if attribution.contains(Attribution::PREVIOUS_LINE) {
            if let Some(number) = self.print_flushed_line(false) {
                diagnostic.lines.push(number);
            }
        }

        if attribution.contains(Attribution::CURRENT_LINE) {
            self.window.push_pending(diagnostic);
        } else {
            self.print_message(&diagnostic);
            self.diagnostics.push(diagnostic);
        }

        if attribution.contains(Attribution::PREVIOUS_LINE)
            && attribution.contains(Attribution::CURRENT_LINE)
        {
            self.two_lines_involved = true;
        }
    }

    fn line_done(&mut self, text: &str, line_number: usize, status: LineStatus) {
        let printed = self.window.has_pending();
        if printed {
            let result = report::write_line(
                &mut self.out,
                self.format,
                self.file.as_deref(),
                line_number,
                text,
                self.two_lines_involved,
            );
            self.record(result);
            for mut diagnostic in self.window.take_pending() {
                diagnostic.lines.push(line_number);
                self.print_message(&diagnostic);
                self.diagnostics.push(diagnostic);
            }
        }
        self.two_lines_involved = false;

        match status {
            LineStatus::Comment => {}
            LineStatus::Valid | LineStatus::Skipped => {
                if status == LineStatus::Skipped {
                    self.lines_skipped += 1;
                }
                self.window.rotate(FlushedLine {
                    number: line_number,
                    text: text.to_string(),
                    file: self.file.clone(),
                    printed,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_log() -> DiagnosticLog<Vec<u8>> {
        DiagnosticLog::new(Vec::new(), ReportFormat::Text)
    }

    fn output(log: DiagnosticLog<Vec<u8>>) -> String {
        String::from_utf8(log.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_attribution_flags() {
        let both = Attribution::CURRENT_LINE | Attribution::PREVIOUS_LINE;
        assert!(both.contains(Attribution::CURRENT_LINE));
        assert!(both.contains(Attribution::PREVIOUS_LINE));
        assert!(!both.contains(Attribution::LINE_BEFORE_PREVIOUS));
        assert!(!both.contains(Attribution::NONE));
        assert!(Attribution::NONE.is_none());
    }

    #[test]
    fn test_current_line_message_waits_for_flush() {
        let mut log = text_log();
        log.msg(ErrorCode::EmptyColumn, "3", Attribution::CURRENT_LINE);
        assert!(log.diagnostics().is_empty());

        log.line_done("a\tb", 4, LineStatus::Skipped);
        assert_eq!(log.diagnostics().len(), 1);
        assert_eq!(log.diagnostics()[0].lines, vec![4]);
        assert_eq!(log.diagnostics()[0].text, "column 3 is empty");

        let text = output(log);
        assert!(text.contains("4:a\tb\n"));
        assert!(text.contains("\tERROR, line skipped: column 3 is empty\n"));
    }

    #[test]
    fn test_previous_line_message_reaches_flushed_line() {
        let mut log = text_log();
        log.line_done("line one", 1, LineStatus::Valid);
        log.line_done("line two", 2, LineStatus::Valid);

        log.msg(ErrorCode::GapObjEnd, "chr1", Attribution::PREVIOUS_LINE);
        assert_eq!(log.diagnostics()[0].lines, vec![2]);

        log.msg(ErrorCode::ConseqGaps, "", Attribution::LINE_BEFORE_PREVIOUS);
        assert_eq!(log.diagnostics()[1].lines, vec![1]);

        let text = output(log);
        let line_two = text.find("2:line two").unwrap();
        let warning = text.find("OK if chr1 is the circular").unwrap();
        assert!(line_two < warning);
    }

    #[test]
    fn test_comment_lines_do_not_rotate_window() {
        let mut log = text_log();
        log.line_done("content", 1, LineStatus::Valid);
        log.line_done("# comment", 2, LineStatus::Comment);
        log.msg(ErrorCode::GapObjEnd, "x", Attribution::PREVIOUS_LINE);
        assert_eq!(log.diagnostics()[0].lines, vec![1]);
    }

    #[test]
    fn test_two_line_message() {
        let mut log = text_log();
        log.line_done("first", 1, LineStatus::Valid);
        log.report(
            ErrorCode::PartNumberNotPlus1,
            Attribution::CURRENT_LINE | Attribution::PREVIOUS_LINE,
        );
        log.line_done("second", 2, LineStatus::Valid);
        assert_eq!(log.diagnostics()[0].lines, vec![1, 2]);
    }

    #[test]
    fn test_max_repeat_keeps_counting() {
        let mut log = text_log().with_max_repeat(2);
        for line in 1..=5 {
            log.report(ErrorCode::ObjMustBegin1, Attribution::CURRENT_LINE);
            log.line_done("x", line, LineStatus::Valid);
        }
        assert_eq!(log.count(ErrorCode::ObjMustBegin1), 5);
        assert_eq!(log.diagnostics().len(), 2);
        let summary = log.summary();
        assert_eq!(summary.errors, 5);
        assert_eq!(summary.suppressed, 3);
    }

    #[test]
    fn test_text_throttling_defaults() {
        let mut log = text_log();
        for line in 1..=8 {
            log.report(ErrorCode::ShortGap, Attribution::CURRENT_LINE);
            log.report(ErrorCode::ExtraTab, Attribution::CURRENT_LINE);
            log.line_done("x", line, LineStatus::Valid);
        }
        assert_eq!(log.count(ErrorCode::ShortGap), 8);
        assert_eq!(
            log.diagnostics()
                .iter()
                .filter(|d| d.code == ErrorCode::ShortGap)
                .count(),
            5
        );
        assert!(log.diagnostics().iter().all(|d| d.code != ErrorCode::ExtraTab));
        assert_eq!(log.summary().notes, 16);
    }

    #[test]
    fn test_strict_mode_reclassifies_warnings() {
        let mut log = text_log().with_strict(true);
        log.report(ErrorCode::GapObjBegin, Attribution::NONE);
        log.report(ErrorCode::NoEolAtEof, Attribution::NONE);
        log.report(ErrorCode::AssumingVersion, Attribution::NONE);

        assert_eq!(log.effective_severity(ErrorCode::GapObjBegin), Severity::Error);
        assert_eq!(log.display_code(ErrorCode::GapObjBegin), "e32");
        assert_eq!(log.effective_severity(ErrorCode::NoEolAtEof), Severity::Warning);
        assert_eq!(log.display_code(ErrorCode::NoEolAtEof), "w42");

        let summary = log.summary();
        assert_eq!((summary.errors, summary.warnings, summary.notes), (1, 1, 1));
        // code identity and text are unchanged
        assert_eq!(log.diagnostics()[0].code, ErrorCode::GapObjBegin);
        assert_eq!(log.diagnostics()[0].severity(), Severity::Warning);
    }

    #[test]
    fn test_treat_as_error_and_silence() {
        let mut log = text_log();
        log.treat_as_error([ErrorCode::ConseqGaps]);
        log.silence([ErrorCode::GapObjBegin]);
        log.report(ErrorCode::ConseqGaps, Attribution::NONE);
        log.report(ErrorCode::GapObjBegin, Attribution::NONE);

        assert_eq!(log.diagnostics().len(), 1);
        let summary = log.summary();
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.suppressed, 1);

        log.unsilence([ErrorCode::GapObjBegin]);
        log.report(ErrorCode::GapObjBegin, Attribution::NONE);
        assert_eq!(log.diagnostics().len(), 2);
    }
}
