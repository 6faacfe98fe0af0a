//! Core data types for AGP content lines.
//!
//! - [`Row`]: one parsed content line, with object fields shared by all lines
//!   and a [`RowKind`] payload for gap or component columns
//! - [`FormatVersion`], [`AgpVersion`]: the AGP specification version in effect
//! - [`GapType`], [`Orientation`], [`ComponentType`], [`LinkageEvidence`]:
//!   column vocabularies
//!
//! ## Columns
//!
//! | # | Component line | Gap line |
//! |---|----------------|----------|
//! | 1 | object | object |
//! | 2 | object_beg | object_beg |
//! | 3 | object_end | object_end |
//! | 4 | part_number | part_number |
//! | 5 | A, D, F, G, O, P, W | N, U |
//! | 6 | component_id | gap_length |
//! | 7 | component_beg | gap_type |
//! | 8 | component_end | linkage |
//! | 9 | orientation | linkage_evidence (2.0) |

pub mod row;
pub mod types;

pub use row::{ComponentRow, GapRow, Row, RowKind};
pub use types::{
    AgpVersion, ComponentType, EvidenceSet, EvidenceTerm, FormatVersion, GapSize, GapType,
    LinkageEvidence, Orientation,
};
