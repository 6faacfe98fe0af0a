//! The closed catalogue of diagnostic codes.
//!
//! Codes are grouped by numeric range, and the range alone decides the class
//! of a message:
//!
//! | Range | Class | Printable |
//! |-------|-------|-----------|
//! | 1-29  | content errors | `e01`..`e29` |
//! | 31-69 | content warnings (a few are notes) | `w31`..`w69` |
//! | 71-79 | external checks (GenBank, FASTA) | `g71`..`g79` |

use serde::Serialize;

/// Lines with these codes are excluded from cross-line checks
const LAST_SKIPPING_CODE: u16 = ErrorCode::CompEndLtBeg as u16;
const ERROR_LIMIT: u16 = 30;
const WARNING_LIMIT: u16 = 70;

/// Every diagnostic the validator, or a collaborator reporting through the same
/// sink, can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u16)]
pub enum ErrorCode {
    // Content errors
    ColumnCount = 1,
    EmptyColumn = 2,
    EmptyLine = 3,
    InvalidValue = 4,
    InvalidLinkage = 5,
    MustBePositive = 6,
    MustFitSeqPosType = 7,
    ObjEndLtBeg = 8,
    CompEndLtBeg = 9,
    ObjRangeNeGap = 10,
    ObjRangeNeComp = 11,
    DuplicateObj = 12,
    ObjMustBegin1 = 13,
    PartNumberNot1 = 14,
    PartNumberNotPlus1 = 15,
    UnknownOrientation = 16,
    ObjBegNePrevEndPlus1 = 17,
    NoValidLines = 18,
    SameConseqGaps = 19,
    ScafBreakingGap = 20,
    WithinScafGap = 21,
    UnknownScaf = 22,
    UnusedScaf = 23,
    SameGapLength = 24,
    InvalidBarInId = 25,

    // Content warnings
    GapObjEnd = 31,
    GapObjBegin = 32,
    ConseqGaps = 33,
    ObjNoComp = 34,
    SpansOverlap = 35,
    SpansOrder = 36,
    DuplicateComp = 37,
    LooksLikeGap = 38,
    LooksLikeComp = 39,
    ExtraTab = 40,
    GapLineMissingCol9 = 41,
    NoEolAtEof = 42,
    GapLineIgnoredCol9 = 43,
    ObjOrderNotNumerical = 44,
    CompIsWgsTypeIsNot = 45,
    CompIsNotWgsTypeIs = 46,
    ObjEqCompId = 47,
    GapSizeNot100 = 48,
    BreakingGapSameCompId = 49,
    UnSingleCompNotInFull = 50,
    SingleOriNotPlus = 51,
    ShortGap = 52,
    SpaceInObjName = 53,
    CommentsAfterStart = 54,
    OrientationZeroDeprecated = 55,
    NaLinkageExpected = 56,
    OldGapType = 57,
    AssumingVersion = 58,
    ScafNotInFull = 59,
    MissingLinkage = 60,
    AgpVersionCommentInvalid = 61,
    AgpVersionCommentUnnecessary = 62,
    DuplicateEvidence = 63,
    CompIsNotHtgTypeIs = 64,
    SingletonsOnly = 65,
    GnlId = 66,
    CompIsLocalTypeNotW = 67,

    // External (GenBank / FASTA) checks
    InvalidCompId = 71,
    NotInGenbank = 72,
    NeedVersion = 73,
    CompEndGtLength = 74,
    DataError = 75,
    TaxError = 76,
    InvalidObjId = 77,
    BadObjLen = 78,
    NsWithinCompSpan = 79,
}

/// Which part of the catalogue a code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeClass {
    ContentError,
    ContentWarning,
    External,
}

/// Severity of a message, before any strict-mode reclassification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl Severity {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Note => "NOTE",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl ErrorCode {
    /// Every code, in numeric order
    pub const ALL: [ErrorCode; 71] = [
        Self::ColumnCount,
        Self::EmptyColumn,
        Self::EmptyLine,
        Self::InvalidValue,
        Self::InvalidLinkage,
        Self::MustBePositive,
        Self::MustFitSeqPosType,
        Self::ObjEndLtBeg,
        Self::CompEndLtBeg,
        Self::ObjRangeNeGap,
        Self::ObjRangeNeComp,
        Self::DuplicateObj,
        Self::ObjMustBegin1,
        Self::PartNumberNot1,
        Self::PartNumberNotPlus1,
        Self::UnknownOrientation,
        Self::ObjBegNePrevEndPlus1,
        Self::NoValidLines,
        Self::SameConseqGaps,
        Self::ScafBreakingGap,
        Self::WithinScafGap,
        Self::UnknownScaf,
        Self::UnusedScaf,
        Self::SameGapLength,
        Self::InvalidBarInId,
        Self::GapObjEnd,
        Self::GapObjBegin,
        Self::ConseqGaps,
        Self::ObjNoComp,
        Self::SpansOverlap,
        Self::SpansOrder,
        Self::DuplicateComp,
        Self::LooksLikeGap,
        Self::LooksLikeComp,
        Self::ExtraTab,
        Self::GapLineMissingCol9,
        Self::NoEolAtEof,
        Self::GapLineIgnoredCol9,
        Self::ObjOrderNotNumerical,
        Self::CompIsWgsTypeIsNot,
        Self::CompIsNotWgsTypeIs,
        Self::ObjEqCompId,
        Self::GapSizeNot100,
        Self::BreakingGapSameCompId,
        Self::UnSingleCompNotInFull,
        Self::SingleOriNotPlus,
        Self::ShortGap,
        Self::SpaceInObjName,
        Self::CommentsAfterStart,
        Self::OrientationZeroDeprecated,
        Self::NaLinkageExpected,
        Self::OldGapType,
        Self::AssumingVersion,
        Self::ScafNotInFull,
        Self::MissingLinkage,
        Self::AgpVersionCommentInvalid,
        Self::AgpVersionCommentUnnecessary,
        Self::DuplicateEvidence,
        Self::CompIsNotHtgTypeIs,
        Self::SingletonsOnly,
        Self::GnlId,
        Self::CompIsLocalTypeNotW,
        Self::InvalidCompId,
        Self::NotInGenbank,
        Self::NeedVersion,
        Self::CompEndGtLength,
        Self::DataError,
        Self::TaxError,
        Self::InvalidObjId,
        Self::BadObjLen,
        Self::NsWithinCompSpan,
    ];

    #[must_use]
    pub fn number(self) -> u16 {
        self as u16
    }

    #[must_use]
    pub fn from_number(number: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.number() == number)
    }

    #[must_use]
    pub fn class(self) -> CodeClass {
        match self.number() {
            n if n < ERROR_LIMIT => CodeClass::ContentError,
            n if n < WARNING_LIMIT => CodeClass::ContentWarning,
            _ => CodeClass::External,
        }
    }

    /// Severity as a function of the code alone
    #[must_use]
    pub fn severity(self) -> Severity {
        match self.class() {
            CodeClass::ContentError => Severity::Error,
            CodeClass::ContentWarning => match self {
                Self::ExtraTab | Self::GapLineMissingCol9 | Self::ShortGap | Self::AssumingVersion => {
                    Severity::Note
                }
                _ => Severity::Warning,
            },
            CodeClass::External => match self {
                Self::NsWithinCompSpan => Severity::Warning,
                _ => Severity::Error,
            },
        }
    }

    /// Whether a line reported with this code is left out of cross-line checks
    #[must_use]
    pub fn skips_line(self) -> bool {
        self.number() <= LAST_SKIPPING_CODE
    }

    /// `e01`, `w40`, `g74`
    #[must_use]
    pub fn printable(self) -> String {
        let prefix = match self.class() {
            CodeClass::ContentError => 'e',
            CodeClass::ContentWarning => 'w',
            CodeClass::External => 'g',
        };
        format!("{prefix}{:02}", self.number())
    }

    /// Message template; an `X` word is replaced by the details of a report
    #[must_use]
    pub fn template(self) -> &'static str {
        match self {
            Self::ColumnCount => "expecting 9 tab-separated columns",
            Self::EmptyColumn => "column X is empty",
            Self::EmptyLine => "empty line",
            Self::InvalidValue => "invalid value for X",
            Self::InvalidLinkage => "invalid linkage",
            Self::MustBePositive => "X must be a positive integer",
            Self::MustFitSeqPosType => "X must not exceed the maximum sequence position",
            Self::ObjEndLtBeg => "object_end is less than object_beg",
            Self::CompEndLtBeg => "component_end is less than component_beg",
            Self::ObjRangeNeGap => "object range length not equal to the gap length",
            Self::ObjRangeNeComp => "object range length not equal to component range length",
            Self::DuplicateObj => "duplicate object ",
            Self::ObjMustBegin1 => "first line of an object must have object_beg=1",
            Self::PartNumberNot1 => "first line of an object must have part_number=1",
            Self::PartNumberNotPlus1 => "part number (column 4) != previous part number + 1",
            Self::UnknownOrientation => {
                "'na' or ? (formerly 0) component orientation may only be used in a singleton scaffold"
            }
            Self::ObjBegNePrevEndPlus1 => "object_beg != previous object_end + 1",
            Self::NoValidLines => "no valid AGP lines",
            Self::SameConseqGaps => "consecutive gap lines with the same type and linkage",
            Self::ScafBreakingGap => {
                "in \"Scaffold from component\" file, invalid scaffold-breaking gap"
            }
            Self::WithinScafGap => {
                "in \"Chromosome from scaffold\" file, invalid \"within-scaffold\" gap"
            }
            Self::UnknownScaf => {
                "scaffold X was not defined in any of \"Scaffold from component\" files"
            }
            Self::UnusedScaf => {
                "scaffold X is not used in any of \"Chromosome from scaffold\" files"
            }
            Self::SameGapLength => {
                "same gap_length=X in all gap lines, and component_type='N' ('U' is required for gaps of unknown size)"
            }
            Self::InvalidBarInId => "invalid use of \"|\" character",

            Self::GapObjEnd => "gap at the end of object (OK if X is the circular chromosome/plasmid)",
            Self::GapObjBegin => "gap at the beginning of object ",
            Self::ConseqGaps => {
                "two consecutive gap lines (e.g. a gap at the end of a scaffold, two non scaffold-breaking gaps, ...)"
            }
            Self::ObjNoComp => "no components in object",
            Self::SpansOverlap => "the span overlaps a previous span for this component",
            Self::SpansOrder => "component span appears out of order",
            Self::DuplicateComp => "duplicate component with non-draft type",
            Self::LooksLikeGap => {
                "line with component_type X appears to be a gap line and not a component line"
            }
            Self::LooksLikeComp => {
                "line with component_type X appears to be a component line and not a gap line"
            }
            Self::ExtraTab => "extra tab or space at the end of line",
            Self::GapLineMissingCol9 => "gap line missing column 9 (null)",
            Self::NoEolAtEof => "missing line separator at the end of file",
            Self::GapLineIgnoredCol9 => "extra text in the column 9 of the gap line",
            Self::ObjOrderNotNumerical => "object names appear sorted, but not in a numerical order",
            Self::CompIsWgsTypeIsNot => {
                "component_id looks like a WGS accession, component_type is not W"
            }
            Self::CompIsNotWgsTypeIs => {
                "component_id looks like a non-WGS accession, yet component_type is W"
            }
            Self::ObjEqCompId => "object name (column 1) is the same as component_id (column 6)",
            Self::GapSizeNot100 => {
                "gap length (column 6) is not 100 for a gap of unknown size (an INSDC standard)"
            }
            Self::BreakingGapSameCompId => "same component_id found on different scaffolds",
            Self::UnSingleCompNotInFull => {
                "in unplaced singleton scaffold, component is not used in full"
            }
            Self::SingleOriNotPlus => {
                "in unplaced singleton scaffold, component orientation is not \"+\""
            }
            Self::ShortGap => "gap shorter than 10 bp",
            Self::SpaceInObjName => "space in object name ",
            Self::CommentsAfterStart => "comments only allowed at the beginning of the file in AGP 2.0",
            Self::OrientationZeroDeprecated => "orientation '0' is deprecated in AGP 2.0;  use '?' instead",
            Self::NaLinkageExpected => {
                "linkage (column 9) should be 'na' for a gap with linkage 'no' (AGP 2.0)"
            }
            Self::OldGapType => "old gap type; not used in AGP 2.0",
            Self::AssumingVersion => "assuming AGP version X",
            Self::ScafNotInFull => "in \"Chromosome from scaffold\" file, scaffold is not used in full",
            Self::MissingLinkage => "missing linkage evidence (column 9) (AGP 2.0)",
            Self::AgpVersionCommentInvalid => {
                "AGP version comment is invalid, expecting ##agp-version 1.1 or ##agp-version 2.0"
            }
            Self::AgpVersionCommentUnnecessary => {
                "ignoring AGP version comment - version already set to X"
            }
            Self::DuplicateEvidence => "linkage evidence term X appears more than once",
            Self::CompIsNotHtgTypeIs => {
                "component_id X is not an HTG accession, but is used with component_type A, D, or F"
            }
            Self::SingletonsOnly => "all objects are singletons with component_beg=1",
            Self::GnlId => {
                "\"gnl|\" prefix in X is deprecated inside AGP files (no \"prefix|\" is best)"
            }
            Self::CompIsLocalTypeNotW => {
                "component_id X is a not an accession, but is used with component_type other than W"
            }

            Self::InvalidCompId => "invalid component_id",
            Self::NotInGenbank => "component_id not in GenBank",
            Self::NeedVersion => "component_id X is ambiguous without an explicit version",
            Self::CompEndGtLength => "component_end greater than sequence length",
            Self::DataError => "sequence data is invalid or unavailable",
            Self::TaxError => "taxonomic data is not available",
            Self::InvalidObjId => "object X not found in FASTA file(s)",
            Self::BadObjLen => {
                "final object_end (column 3) not equal to object length in FASTA file(s)"
            }
            Self::NsWithinCompSpan => "run(s) of Ns within the component span",
        }
    }

    /// Parse a printable code (`e01`, `w40`, ...).
    ///
    /// A warning may also be named with an `e` prefix, as it is labelled in
    /// strict mode.
    #[must_use]
    pub fn from_printable(s: &str) -> Option<Self> {
        let prefix = s.chars().next()?;
        let number: u16 = s.get(1..)?.parse().ok()?;
        let code = Self::from_number(number)?;
        let matches = match code.class() {
            CodeClass::ContentError => prefix == 'e',
            CodeClass::ContentWarning => prefix == 'w' || prefix == 'e',
            CodeClass::External => prefix == 'g',
        };
        matches.then_some(code)
    }

    /// Resolve a code selector to the codes it names.
    ///
    /// Accepted selectors:
    /// - `all`: every code
    /// - `alt`: external (GenBank/FASTA) codes
    /// - `warn`, `warning`, `warnings`: content warnings
    /// - `err`, `error`, `errors`: content errors
    /// - a printable code such as `w40`
    /// - any other text: codes whose message contains it
    ///
    /// Returns an empty list when nothing matches.
    #[must_use]
    pub fn select(selector: &str) -> Vec<Self> {
        let codes = Self::ALL.into_iter();
        match selector {
            "all" => return codes.collect(),
            "alt" => return codes.filter(|c| c.class() == CodeClass::External).collect(),
            _ => {}
        }
        if selector.starts_with("warn") && selector.len() <= 8 {
            return codes
                .filter(|c| c.class() == CodeClass::ContentWarning)
                .collect();
        }
        if selector.starts_with("err") && selector.len() <= 6 {
            return codes
                .filter(|c| c.class() == CodeClass::ContentError)
                .collect();
        }
        if let Some(code) = Self::from_printable(selector) {
            return vec![code];
        }
        codes.filter(|c| c.template().contains(selector)).collect()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.printable())
    }
}

/// Substitute `details` into a message template.
///
/// The standalone word `X` is replaced when present; otherwise details are
/// appended. A `NoValidLines` report whose details start with `"X "` replaces
/// the whole message, which allows custom stream-level failures.
#[must_use]
pub fn format_message(template: &str, details: &str) -> String {
    if details.is_empty() {
        return template.to_string();
    }

    let padded = format!(" {template} ");
    if let Some(pos) = padded.find(" X ") {
        // `pos` in the padded text is the index of `X` in the template
        return format!("{}{}{}", &template[..pos], details, &template[pos + 1..]);
    }
    if template == ErrorCode::NoValidLines.template() {
        if let Some(custom) = details.strip_prefix("X ") {
            return custom.to_string();
        }
    }
    format!("{template}{details}")
}
