//! # agp-validate
//!
//! A validator for AGP (A Golden Path) files, the format that describes how
//! an assembled sequence (an object) is built from components and gaps.
//!
//! Every content line is parsed on its own, then compared with the line before
//! it: coordinates must be contiguous, part numbers consecutive, gaps must not
//! start or end an object, and so on. Problems are reported as numbered codes
//! attached to the line(s) they concern.
//!
//! ## Features
//!
//! - **Versions 1.1 and 2.0**: from a `##agp-version` comment, a setting, or
//!   inferred from the first gap line
//! - **Deferred attribution**: a problem found on one line can be reported
//!   against the line before it, or the one before that
//! - **Throttling**: per-code display limits, skip/only filters, strict mode
//! - **Reports**: text, XML or JSON, with a per-code summary
//!
//! ## Example
//!
//! ```rust
//! use agp_validate::{AgpReader, DiagnosticLog, ErrorCode};
//!
//! let text = "chr1\t2\t1001\t1\tW\tAC123.1\t1\t1000\t+\n";
//!
//! let mut reader = AgpReader::new(DiagnosticLog::collecting());
//! reader.read_stream(text.as_bytes(), true).unwrap();
//!
//! assert_eq!(reader.sink().count(ErrorCode::ObjMustBegin1), 1);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Row and column types
//! - [`parsing`]: Line parser and streaming reader
//! - [`diagnostics`]: Message codes, the diagnostic sink, report rendering
//! - [`checks`]: Object-level checks and statistics
//! - [`config`]: Validator settings
//! - [`cli`]: Command-line interface implementation

pub mod checks;
pub mod cli;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod parsing;

// Re-export commonly used types for convenience
pub use checks::{AssemblyStats, ContentChecks};
pub use config::{ConfigError, ValidatorConfig};
pub use core::row::{Row, RowKind};
pub use core::types::*;
pub use diagnostics::{Attribution, DiagnosticLog, DiagnosticSink, ErrorCode, Severity};
pub use parsing::reader::{AgpObserver, AgpReader, StreamOutcome};
pub use parsing::row::RowParser;
