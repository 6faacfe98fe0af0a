use std::io::BufRead;
use std::ops::ControlFlow;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::row::Row;
use crate::core::types::{AgpVersion, FormatVersion};
use crate::diagnostics::codes::ErrorCode;
use crate::diagnostics::sink::{Attribution, DiagnosticSink, LineStatus};
use crate::parsing::row::{implied_version, ParsedLine, RowParser};

const VERSION_PRAGMA: &str = "##agp-version";
const UTF16_MESSAGE: &str = "X UTF-16 not supported, text needs to be in ASCII encoding.";

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("IO error after line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

/// How a call to [`AgpReader::read_stream`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Every line was read
    Completed,
    /// An observer asked to stop after this line
    Stopped { line: usize },
    /// The stream held no content line (or was not readable text)
    NoValidLines,
}

/// The two rows either side of an object boundary.
///
/// `previous` is `None` at the start of a stream, `next` is `None` when the
/// stream is finalized.
#[derive(Debug, Clone, Copy)]
pub struct ObjectChange<'a> {
    pub previous: Option<&'a Row>,
    pub next: Option<&'a Row>,
}

/// Receives structural events from an [`AgpReader`].
///
/// Every callback gets the reader's sink, so an observer reports through the
/// same channel (and the same line attribution) as the core checks. For each
/// row the order is: scaffold end, object change, then the row itself.
pub trait AgpObserver {
    fn on_row(&mut self, _row: &Row, _sink: &mut dyn DiagnosticSink) {}

    fn on_scaffold_end(&mut self, _sink: &mut dyn DiagnosticSink) {}

    fn on_object_change(&mut self, _change: ObjectChange<'_>, _sink: &mut dyn DiagnosticSink) {}

    fn on_comment(&mut self, _line: &str, _sink: &mut dyn DiagnosticSink) {}

    /// Called once for a line that failed to parse, or once for a row that
    /// broke continuity, with the last continuity code reported for it.
    /// Returning `Break` stops the stream after the current line.
    fn on_error(
        &mut self,
        _code: ErrorCode,
        _line_number: usize,
        _sink: &mut dyn DiagnosticSink,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl AgpObserver for () {}

impl<T: AgpObserver + ?Sized> AgpObserver for &mut T {
    fn on_row(&mut self, row: &Row, sink: &mut dyn DiagnosticSink) {
        (**self).on_row(row, sink);
    }

    fn on_scaffold_end(&mut self, sink: &mut dyn DiagnosticSink) {
        (**self).on_scaffold_end(sink);
    }

    fn on_object_change(&mut self, change: ObjectChange<'_>, sink: &mut dyn DiagnosticSink) {
        (**self).on_object_change(change, sink);
    }

    fn on_comment(&mut self, line: &str, sink: &mut dyn DiagnosticSink) {
        (**self).on_comment(line, sink);
    }

    fn on_error(
        &mut self,
        code: ErrorCode,
        line_number: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> ControlFlow<()> {
        (**self).on_error(code, line_number, sink)
    }
}

#[derive(Debug, Clone)]
struct ReaderState {
    /// Last row that parsed, or the start-of-stream sentinel
    previous_row: Row,
    previous_line_skipped: bool,
    line_number: usize,
    at_start: bool,
    version: FormatVersion,
    content_line_seen: bool,
}

/// Streaming AGP reader: parses each line and runs the checks that need the
/// previous row (object boundaries, part numbers, coordinates, gap adjacency).
///
/// The reader holds no policy beyond that; counting, reports and external
/// lookups belong to the sink and the observer.
pub struct AgpReader<S, O = ()> {
    parser: RowParser,
    sink: S,
    observer: O,
    state: ReaderState,
}

impl<S: DiagnosticSink> AgpReader<S> {
    #[must_use]
    pub fn new(sink: S) -> Self {
        AgpReader::with_observer(sink, ())
    }
}

impl<S: DiagnosticSink, O: AgpObserver> AgpReader<S, O> {
    #[must_use]
    pub fn with_observer(sink: S, observer: O) -> Self {
        Self {
            parser: RowParser::default(),
            sink,
            observer,
            state: ReaderState {
                previous_row: Row::sentinel(),
                previous_line_skipped: false,
                line_number: 0,
                at_start: true,
                version: FormatVersion::Unset,
                content_line_seen: false,
            },
        }
    }

    /// Fix the AGP version instead of detecting it
    #[must_use]
    pub fn with_version(mut self, version: Option<AgpVersion>) -> Self {
        self.state.version = version.into();
        self
    }

    #[must_use]
    pub fn with_parser(mut self, parser: RowParser) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn version(&self) -> FormatVersion {
        self.state.version
    }

    /// Number of the last line read
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.state.line_number
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_parts(self) -> (S, O) {
        (self.sink, self.observer)
    }

    /// Read lines until EOF, then finalize if asked to.
    ///
    /// Malformed lines never stop the stream; only an observer returning
    /// `Break` from [`AgpObserver::on_error`] does.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::Io` if the input cannot be read.
    pub fn read_stream<R: BufRead>(
        &mut self,
        mut input: R,
        finalize: bool,
    ) -> Result<StreamOutcome, ReadError> {
        if self.state.at_start {
            self.state.line_number = 0;
            self.state.previous_line_skipped = false;
        }
        self.state.content_line_seen = false;

        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = input
                .read_until(b'\n', &mut buf)
                .map_err(|source| ReadError::Io {
                    line: self.state.line_number,
                    source,
                })?;
            if read == 0 {
                break;
            }

            if self.state.at_start && (buf.starts_with(&[0xFF, 0xFE]) || buf.starts_with(&[0xFE, 0xFF]))
            {
                warn!("input looks like UTF-16 text");
                self.sink
                    .msg(ErrorCode::NoValidLines, UTF16_MESSAGE, Attribution::NONE);
                return Ok(StreamOutcome::NoValidLines);
            }

            let missing_eol = buf.last() != Some(&b'\n');
            if !missing_eol {
                buf.pop();
            }
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
            let line = String::from_utf8_lossy(&buf);
            if self.process_line(&line, missing_eol).is_break() {
                info!(line = self.state.line_number, "stopping early at observer request");
                return Ok(StreamOutcome::Stopped {
                    line: self.state.line_number,
                });
            }
        }

        if self.state.at_start {
            self.sink.report(ErrorCode::NoValidLines, Attribution::NONE);
            return Ok(StreamOutcome::NoValidLines);
        }
        if finalize {
            self.finalize();
        }
        Ok(StreamOutcome::Completed)
    }

    /// Process one physical line, given without its line terminator.
    pub fn read_line(&mut self, line: &str) -> ControlFlow<()> {
        self.process_line(line, false)
    }

    /// Run the end-of-object checks for the last object and reset for the
    /// next stream. The format version stays as it was.
    pub fn finalize(&mut self) {
        if !self.state.at_start {
            let previous = &self.state.previous_row;
            if !self.state.previous_line_skipped
                && previous.is_gap()
                && !previous.gap_valid_at_object_end()
            {
                self.sink.msg(
                    ErrorCode::GapObjEnd,
                    &previous.object_name,
                    Attribution::PREVIOUS_LINE,
                );
            }
            if !previous.ends_scaffold() {
                self.observer.on_scaffold_end(&mut self.sink);
            }
            self.observer.on_object_change(
                ObjectChange {
                    previous: Some(previous),
                    next: None,
                },
                &mut self.sink,
            );
            debug!(lines = self.state.line_number, "stream finalized");
        }

        self.state.previous_row = Row::sentinel();
        self.state.previous_line_skipped = false;
        self.state.at_start = true;
    }

    fn process_line(&mut self, line: &str, missing_eol: bool) -> ControlFlow<()> {
        self.state.line_number += 1;
        self.check_pragma(line);

        if !self.state.version.is_locked() {
            if let Some(version) = implied_version(line) {
                self.state.version.lock(version);
                let details = match version {
                    AgpVersion::V1_1 => "1.1 since linkage evidence (column 9) is empty",
                    AgpVersion::V2_0 => "2 since linkage evidence (column 9) is NOT empty",
                };
                self.sink
                    .msg(ErrorCode::AssumingVersion, details, Attribution::CURRENT_LINE);
                debug!(%version, line = self.state.line_number, "AGP version inferred from gap line");
            }
        }

        let mut flow = ControlFlow::Continue(());
        let status = match self.parser.parse_line(line, self.state.version, &mut self.sink) {
            Ok(ParsedLine::Comment) => {
                if self.state.version.is(AgpVersion::V2_0) && self.state.content_line_seen {
                    self.sink
                        .report(ErrorCode::CommentsAfterStart, Attribution::CURRENT_LINE);
                }
                self.observer.on_comment(line, &mut self.sink);
                LineStatus::Comment
            }
            Ok(ParsedLine::Row(row)) => {
                self.state.content_line_seen = true;
                flow = self.process_row(row);
                LineStatus::Valid
            }
            Err(code) => {
                self.state.content_line_seen = true;
                // the next row is compared with the last row that parsed
                self.state.previous_line_skipped = true;
                flow = self
                    .observer
                    .on_error(code, self.state.line_number, &mut self.sink);
                LineStatus::Skipped
            }
        };

        if missing_eol && !self.state.at_start {
            self.sink
                .report(ErrorCode::NoEolAtEof, Attribution::CURRENT_LINE);
        }
        self.sink.line_done(line, self.state.line_number, status);
        flow
    }

    fn check_pragma(&mut self, line: &str) {
        let Some(rest) = line.strip_prefix(VERSION_PRAGMA) else {
            return;
        };
        let token = rest.trim_matches([' ', '\t', '\x0b', '\x0c']);
        match self.state.version.locked() {
            None => match AgpVersion::from_pragma(token) {
                Some(version) => {
                    self.state.version.lock(version);
                    debug!(%version, "AGP version set by pragma");
                }
                None => self
                    .sink
                    .report(ErrorCode::AgpVersionCommentInvalid, Attribution::NONE),
            },
            Some(version) => self.sink.msg(
                ErrorCode::AgpVersionCommentUnnecessary,
                version.label(),
                Attribution::NONE,
            ),
        }
    }

    fn process_row(&mut self, row: Row) -> ControlFlow<()> {
        let skipped = self.state.previous_line_skipped;
        let at_start = self.state.at_start;
        let previous = &self.state.previous_row;
        let both_lines = Attribution::CURRENT_LINE | Attribution::PREVIOUS_LINE;
        let mut continuity_error = None;

        let new_object = previous.object_name != row.object_name;
        if new_object {
            if !skipped {
                if row.object_begin != 1 {
                    self.sink
                        .report(ErrorCode::ObjMustBegin1, Attribution::CURRENT_LINE);
                    continuity_error = Some(ErrorCode::ObjMustBegin1);
                }
                if row.part_number != 1 {
                    self.sink
                        .report(ErrorCode::PartNumberNot1, Attribution::CURRENT_LINE);
                    continuity_error = Some(ErrorCode::PartNumberNot1);
                }
                if previous.is_gap() && !previous.gap_valid_at_object_end() && !at_start {
                    self.sink.msg(
                        ErrorCode::GapObjEnd,
                        &previous.object_name,
                        Attribution::PREVIOUS_LINE,
                    );
                }
            }
            if !previous.ends_scaffold() {
                self.observer.on_scaffold_end(&mut self.sink);
            }
            self.observer.on_object_change(
                ObjectChange {
                    previous: (!at_start).then_some(previous),
                    next: Some(&row),
                },
                &mut self.sink,
            );
        } else if !skipped {
            if previous.part_number.checked_add(1) != Some(row.part_number) {
                self.sink.report(ErrorCode::PartNumberNotPlus1, both_lines);
                continuity_error = Some(ErrorCode::PartNumberNotPlus1);
            }
            if previous.object_end.checked_add(1) != Some(row.object_begin) {
                self.sink.report(ErrorCode::ObjBegNePrevEndPlus1, both_lines);
                continuity_error = Some(ErrorCode::ObjBegNePrevEndPlus1);
            }
        }

        if let Some(gap) = row.gap() {
            if !skipped {
                if new_object {
                    if !gap.gap_type.valid_at_object_end() {
                        self.sink.msg(
                            ErrorCode::GapObjBegin,
                            &row.object_name,
                            Attribution::CURRENT_LINE,
                        );
                    }
                } else if let Some(previous_gap) = previous.gap().filter(|_| !at_start) {
                    if previous_gap.gap_type == gap.gap_type
                        && previous_gap.linkage == gap.linkage
                    {
                        self.sink.report(ErrorCode::SameConseqGaps, both_lines);
                    } else {
                        self.sink.report(ErrorCode::ConseqGaps, both_lines);
                    }
                }
            }
            if !new_object && gap.ends_scaffold() && !previous.ends_scaffold() {
                self.observer.on_scaffold_end(&mut self.sink);
            }
        }

        self.observer.on_row(&row, &mut self.sink);
        self.state.at_start = false;
        self.state.previous_row = row;
        self.state.previous_line_skipped = false;

        match continuity_error {
            Some(code) => self
                .observer
                .on_error(code, self.state.line_number, &mut self.sink),
            None => ControlFlow::Continue(()),
        }
    }
}
