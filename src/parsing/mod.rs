//! Line parsing and the streaming reader.
//!
//! - [`row::RowParser`]: turns one line into a [`Row`](crate::core::Row),
//!   reporting every problem it can find on that line
//! - [`reader::AgpReader`]: drives the parser over a stream and runs the
//!   checks that compare a row with the one before it
//!
//! ## Example
//!
//! ```rust
//! use agp_validate::diagnostics::{DiagnosticLog, ErrorCode};
//! use agp_validate::parsing::reader::AgpReader;
//!
//! let text = "chr1\t1\t1000\t1\tW\tAC123.1\t1\t1000\t+\n\
//!             chr1\t1001\t1100\t3\tN\t100\tcontig\tno\tna\n";
//!
//! let mut reader = AgpReader::new(DiagnosticLog::collecting());
//! reader.read_stream(text.as_bytes(), true).unwrap();
//!
//! let log = reader.sink();
//! assert_eq!(log.count(ErrorCode::PartNumberNotPlus1), 1);
//! assert_eq!(log.count(ErrorCode::GapObjEnd), 1);
//! ```

pub mod reader;
pub mod row;

pub use reader::{AgpObserver, AgpReader, ObjectChange, ReadError, StreamOutcome};
pub use row::{implied_version, ParsedLine, RowParser, DEFAULT_MAX_POSITION};
