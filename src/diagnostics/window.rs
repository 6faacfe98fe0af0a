//! Lookback window over the most recently flushed lines.
//!
//! Some checks can only be confirmed after the following line has been read
//! (a gap at the end of an object, for example). The window keeps the last two
//! flushed content lines so such a message can still be attached to the line
//! it concerns, and holds the diagnostics waiting for the current line.

use crate::diagnostics::sink::Diagnostic;

/// A content line that has already been flushed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushedLine {
    pub number: usize,
    pub text: String,
    pub file: Option<String>,
    /// Whether the line text has been written to the report
    pub printed: bool,
}

/// Ring buffer of capacity 2 plus the pending diagnostics of the current line
#[derive(Debug, Default)]
pub struct LineWindow {
    slots: [Option<FlushedLine>; 2],
    newest: usize,
    pending: Vec<Diagnostic>,
}

impl LineWindow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The line flushed most recently
    pub fn previous_mut(&mut self) -> Option<&mut FlushedLine> {
        self.slots[self.newest].as_mut()
    }

    /// The line flushed before [`Self::previous_mut`]
    pub fn before_previous_mut(&mut self) -> Option<&mut FlushedLine> {
        self.slots[1 - self.newest].as_mut()
    }

    #[must_use]
    pub fn previous(&self) -> Option<&FlushedLine> {
        self.slots[self.newest].as_ref()
    }

    #[must_use]
    pub fn before_previous(&self) -> Option<&FlushedLine> {
        self.slots[1 - self.newest].as_ref()
    }

    /// Queue a diagnostic for the line being processed
    pub fn push_pending(&mut self, diagnostic: Diagnostic) {
        self.pending.push(diagnostic);
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Take the diagnostics queued for the current line
    pub fn take_pending(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.pending)
    }

    /// Push `line` as the newest entry, evicting the oldest one
    pub fn rotate(&mut self, line: FlushedLine) {
        self.newest = 1 - self.newest;
        self.slots[self.newest] = Some(line);
    }

    /// Forget all lines, e.g. when a new input file starts
    pub fn clear(&mut self) {
        self.slots = [None, None];
        self.pending.clear();
    }
}
