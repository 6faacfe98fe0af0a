//! Diagnostic codes, the sink that collects them, and report rendering.
//!
//! Checks report a code plus optional details to a [`DiagnosticSink`], naming
//! which line(s) the message is about with an [`Attribution`]. A message about
//! the current line is held until that line is flushed; a message about an
//! earlier line is attached to it through a small lookback window, since some
//! problems (a gap ending an object) only show once the next line is read.
//!
//! [`DiagnosticLog`] is the standard sink. It counts every report, throttles
//! what it displays, and renders lines and messages as text, XML or JSON.

pub mod codes;
pub mod report;
pub mod sink;
pub mod window;

pub use codes::{format_message, CodeClass, ErrorCode, Severity};
pub use report::ReportFormat;
pub use sink::{
    Attribution, Diagnostic, DiagnosticLog, DiagnosticSink, LineStatus, Summary,
    DEFAULT_STRICT_MODE_WARNINGS,
};
