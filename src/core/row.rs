use serde::Serialize;

use crate::core::types::{
    AgpVersion, ComponentType, GapSize, GapType, LinkageEvidence, Orientation,
};

/// One parsed AGP content line.
///
/// Fields shared by every line live here; the type-specific columns are in
/// [`RowKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Column 1
    pub object_name: String,
    /// Column 2, 1-based inclusive
    pub object_begin: u64,
    /// Column 3, 1-based inclusive
    pub object_end: u64,
    /// Column 4
    pub part_number: u64,
    /// Columns 5-9
    #[serde(flatten)]
    pub kind: RowKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "row_type", rename_all = "snake_case")]
pub enum RowKind {
    Gap(GapRow),
    Component(ComponentRow),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapRow {
    pub size: GapSize,
    pub gap_length: u64,
    pub gap_type: GapType,
    pub linkage: bool,
    pub linkage_evidence: LinkageEvidence,
}

impl GapRow {
    /// Whether this gap breaks the scaffold it sits in.
    ///
    /// Fragment gaps are always within-scaffold; every other gap type ends a
    /// scaffold exactly when it carries no linkage.
    #[must_use]
    pub fn ends_scaffold(&self) -> bool {
        if self.gap_type == GapType::Fragment {
            return false;
        }
        !self.linkage
    }

    /// Replacement suggested for gap types retired in AGP 2.0
    #[must_use]
    pub fn replacement_hint(&self) -> Option<String> {
        let evidence = match (self.gap_type, self.linkage) {
            (GapType::Fragment, true) => "paired-ends",
            (GapType::Fragment, false) => "within_clone",
            (GapType::Clone, true) => "clone_contig",
            (GapType::Clone, false) => {
                return Some("gap type=contig, linkage=no, linkage evidence=na".to_string())
            }
            _ => return None,
        };
        Some(format!(
            "gap type=scaffold, linkage=yes, linkage evidence={evidence} or unspecified"
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentRow {
    pub component_type: ComponentType,
    pub component_id: String,
    pub component_begin: u64,
    pub component_end: u64,
    pub orientation: Orientation,
}

impl ComponentRow {
    #[must_use]
    pub fn span_len(&self) -> u64 {
        self.component_end - self.component_begin + 1
    }
}

impl Row {
    /// Placeholder that precedes the first real row of a stream: an unnamed
    /// object ending in a scaffold-breaking gap.
    pub(crate) fn sentinel() -> Self {
        Self {
            object_name: String::new(),
            object_begin: 0,
            object_end: 0,
            part_number: 0,
            kind: RowKind::Gap(GapRow {
                size: GapSize::Known,
                gap_length: 0,
                gap_type: GapType::Contig,
                linkage: false,
                linkage_evidence: LinkageEvidence::Absent,
            }),
        }
    }

    #[must_use]
    pub fn is_gap(&self) -> bool {
        matches!(self.kind, RowKind::Gap(_))
    }

    #[must_use]
    pub fn gap(&self) -> Option<&GapRow> {
        match &self.kind {
            RowKind::Gap(gap) => Some(gap),
            RowKind::Component(_) => None,
        }
    }

    #[must_use]
    pub fn component(&self) -> Option<&ComponentRow> {
        match &self.kind {
            RowKind::Component(component) => Some(component),
            RowKind::Gap(_) => None,
        }
    }

    /// Declared length of the object range (columns 2-3)
    #[must_use]
    pub fn object_span_len(&self) -> u64 {
        self.object_end - self.object_begin + 1
    }

    /// Column 5 character
    #[must_use]
    pub fn type_char(&self) -> char {
        match &self.kind {
            RowKind::Gap(gap) => gap.size.as_char(),
            RowKind::Component(component) => component.component_type.as_char(),
        }
    }

    /// True for a gap line that breaks its scaffold
    #[must_use]
    pub fn ends_scaffold(&self) -> bool {
        self.gap().is_some_and(GapRow::ends_scaffold)
    }

    /// True for a gap line whose type is allowed at either end of an object
    #[must_use]
    pub fn gap_valid_at_object_end(&self) -> bool {
        self.gap().is_some_and(|gap| gap.gap_type.valid_at_object_end())
    }

    /// Serialize back to the 9-column tab-separated form.
    ///
    /// With AGP 1.1 the linkage evidence column of a gap line is left empty
    /// and unknown orientation is written as `0`.
    #[must_use]
    pub fn to_line(&self, version: Option<AgpVersion>) -> String {
        let mut line = format!(
            "{}\t{}\t{}\t{}\t{}\t",
            self.object_name,
            self.object_begin,
            self.object_end,
            self.part_number,
            self.type_char()
        );
        match &self.kind {
            RowKind::Gap(gap) => {
                line.push_str(&format!(
                    "{}\t{}\t{}\t",
                    gap.gap_length,
                    gap.gap_type,
                    if gap.linkage { "yes" } else { "no" }
                ));
                if version != Some(AgpVersion::V1_1) {
                    line.push_str(&gap.linkage_evidence.to_string());
                }
            }
            RowKind::Component(component) => {
                line.push_str(&format!(
                    "{}\t{}\t{}\t{}",
                    component.component_id,
                    component.component_begin,
                    component.component_end,
                    component.orientation.as_str(version)
                ));
            }
        }
        line
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_line(Some(AgpVersion::V2_0)))
    }
}
