//! Object-level content checks and assembly statistics.
//!
//! [`ContentChecks`] is an [`AgpObserver`]: it follows the reader's object and
//! scaffold boundaries and reports through the reader's sink, so its messages
//! land next to the lines they concern.

use std::collections::{BTreeMap, HashSet};
use std::ops::ControlFlow;

use serde::Serialize;
use tracing::info;

use crate::core::row::{Row, RowKind};
use crate::core::types::Orientation;
use crate::diagnostics::codes::ErrorCode;
use crate::diagnostics::sink::{Attribution, DiagnosticSink};
use crate::parsing::reader::{AgpObserver, ObjectChange};

/// Gaps shorter than this are noted
const MIN_GAP_LENGTH: u64 = 10;

/// Counts collected while reading
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyStats {
    pub objects: usize,
    pub scaffolds: usize,
    /// Scaffolds made of exactly one component
    pub singletons: usize,
    pub components: usize,
    /// Component lines per component type (column 5)
    pub component_types: BTreeMap<char, usize>,
    pub gaps: usize,
    /// Gap lines per gap type (column 7)
    pub gap_types: BTreeMap<String, usize>,
    pub comment_lines: usize,
    /// Lines that failed to parse or broke continuity with the previous line
    pub errors_seen: usize,
}

/// A component of the scaffold being assembled
#[derive(Debug, Clone)]
struct ScaffoldMember {
    object_name: String,
    part_number: u64,
    component_id: String,
    orientation: Orientation,
}

#[derive(Debug, Default)]
pub struct ContentChecks {
    stats: AssemblyStats,
    seen_objects: HashSet<String>,
    components_in_object: usize,
    scaffold: Vec<ScaffoldMember>,
    gaps_in_scaffold: usize,
    max_errors: usize,
}

impl ContentChecks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the reader to stop once `max_errors` lines had errors (0 = never).
    ///
    /// A line with several errors counts once.
    #[must_use]
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    #[must_use]
    pub fn stats(&self) -> &AssemblyStats {
        &self.stats
    }

    pub fn into_stats(self) -> AssemblyStats {
        self.stats
    }

    fn close_scaffold(&mut self, sink: &mut dyn DiagnosticSink) {
        let members = std::mem::take(&mut self.scaffold);
        let gaps = std::mem::replace(&mut self.gaps_in_scaffold, 0);
        if members.is_empty() {
            return;
        }

        self.stats.scaffolds += 1;
        if members.len() == 1 && gaps == 0 {
            self.stats.singletons += 1;
            return;
        }
        for member in members.iter().filter(|m| {
            matches!(m.orientation, Orientation::Unknown | Orientation::Irrelevant)
        }) {
            sink.msg(
                ErrorCode::UnknownOrientation,
                &format!(
                    ": {} in object {}, part {}",
                    member.component_id, member.object_name, member.part_number
                ),
                Attribution::NONE,
            );
        }
    }
}

impl AgpObserver for ContentChecks {
    fn on_row(&mut self, row: &Row, sink: &mut dyn DiagnosticSink) {
        match &row.kind {
            RowKind::Component(component) => {
                self.stats.components += 1;
                *self
                    .stats
                    .component_types
                    .entry(component.component_type.as_char())
                    .or_insert(0) += 1;
                self.components_in_object += 1;

                if component.component_id == row.object_name {
                    sink.report(ErrorCode::ObjEqCompId, Attribution::CURRENT_LINE);
                }
                self.scaffold.push(ScaffoldMember {
                    object_name: row.object_name.clone(),
                    part_number: row.part_number,
                    component_id: component.component_id.clone(),
                    orientation: component.orientation,
                });
            }
            RowKind::Gap(gap) => {
                self.stats.gaps += 1;
                *self
                    .stats
                    .gap_types
                    .entry(gap.gap_type.as_str().to_string())
                    .or_insert(0) += 1;

                if gap.gap_length < MIN_GAP_LENGTH {
                    sink.report(ErrorCode::ShortGap, Attribution::CURRENT_LINE);
                }
                if !gap.ends_scaffold() {
                    self.gaps_in_scaffold += 1;
                }
            }
        }
    }

    fn on_scaffold_end(&mut self, sink: &mut dyn DiagnosticSink) {
        self.close_scaffold(sink);
    }

    fn on_object_change(&mut self, change: ObjectChange<'_>, sink: &mut dyn DiagnosticSink) {
        if let Some(previous) = change.previous {
            if self.components_in_object == 0 {
                sink.msg(
                    ErrorCode::ObjNoComp,
                    &format!(": {}", previous.object_name),
                    Attribution::PREVIOUS_LINE,
                );
            }
        }
        self.components_in_object = 0;

        if let Some(next) = change.next {
            self.stats.objects += 1;
            if !self.seen_objects.insert(next.object_name.clone()) {
                sink.msg(ErrorCode::DuplicateObj, &next.object_name, Attribution::CURRENT_LINE);
            }
            if next.object_name.contains(' ') {
                sink.msg(
                    ErrorCode::SpaceInObjName,
                    &next.object_name,
                    Attribution::CURRENT_LINE,
                );
            }
        }
    }

    fn on_comment(&mut self, _line: &str, _sink: &mut dyn DiagnosticSink) {
        self.stats.comment_lines += 1;
    }

    fn on_error(
        &mut self,
        _code: ErrorCode,
        line_number: usize,
        _sink: &mut dyn DiagnosticSink,
    ) -> ControlFlow<()> {
        self.stats.errors_seen += 1;
        if self.max_errors > 0 && self.stats.errors_seen >= self.max_errors {
            info!(line = line_number, errors = self.stats.errors_seen, "error limit reached");
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}
