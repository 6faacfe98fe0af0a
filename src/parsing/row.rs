use crate::core::row::{ComponentRow, GapRow, Row, RowKind};
use crate::core::types::{
    AgpVersion, ComponentType, EvidenceSet, EvidenceTerm, FormatVersion, GapSize, GapType,
    LinkageEvidence, Orientation,
};
use crate::diagnostics::codes::ErrorCode;
use crate::diagnostics::sink::{Attribution, DiagnosticSink};

/// Largest accepted sequence position (columns 2, 3, 4, 6, 7 and 8)
pub const DEFAULT_MAX_POSITION: u64 = 4_294_967_294;

/// Result of parsing one physical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Nothing but a comment (or a pragma)
    Comment,
    Row(Row),
}

/// Reports parser messages against the current line, or swallows them when
/// a line is re-parsed only to guess what the author meant.
struct Emit<'a> {
    sink: Option<&'a mut dyn DiagnosticSink>,
}

impl<'a> Emit<'a> {
    fn to(sink: &'a mut dyn DiagnosticSink) -> Self {
        Self { sink: Some(sink) }
    }

    fn silent() -> Self {
        Self { sink: None }
    }

    fn msg(&mut self, code: ErrorCode, details: &str) {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.msg(code, details, Attribution::CURRENT_LINE);
        }
    }

    /// Report `code` and hand it back as the line's error
    fn fail(&mut self, code: ErrorCode, details: &str) -> ErrorCode {
        self.msg(code, details);
        code
    }
}

/// Parser for single AGP lines.
///
/// The parser never changes the format version; it reads the version the
/// caller has settled on and reports every problem it can find on the line
/// before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowParser {
    max_position: u64,
}

impl Default for RowParser {
    fn default() -> Self {
        Self {
            max_position: DEFAULT_MAX_POSITION,
        }
    }
}

impl RowParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_position(max_position: u64) -> Self {
        Self { max_position }
    }

    #[must_use]
    pub fn max_position(&self) -> u64 {
        self.max_position
    }

    /// Parse one line (without its line terminator).
    ///
    /// Diagnostics go to `sink`, attributed to the current line. A span length
    /// mismatch is reported but the row is still returned.
    ///
    /// # Errors
    ///
    /// Returns the code of the first structural problem; such a line must be
    /// left out of cross-line checks.
    pub fn parse_line(
        &self,
        line: &str,
        version: FormatVersion,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<ParsedLine, ErrorCode> {
        let mut emit = Emit::to(sink);
        let mut tabs_stripped = false;
        let mut extra_tab = false;

        let content = if let Some(hash) = find_comment(line) {
            let content = line[..hash].trim_end_matches([' ', '\t']);
            if content.is_empty() {
                return Ok(ParsedLine::Comment);
            }
            tabs_stripped = line[content.len()..hash].contains('\t');
            content
        } else {
            if line.is_empty() {
                return Err(emit.fail(ErrorCode::EmptyLine, ""));
            }
            let content = line.trim_end_matches(' ');
            if content.len() < line.len() {
                emit.msg(ErrorCode::ExtraTab, "");
                extra_tab = true;
            }
            content
        };

        let mut cols: Vec<&str> = content.split('\t').collect();
        if cols.len() == 10 && cols[9].is_empty() {
            if !extra_tab {
                emit.msg(ErrorCode::ExtraTab, "");
            }
            cols.pop();
        } else if cols.len() < 8 || cols.len() > 9 {
            return Err(emit.fail(ErrorCode::ColumnCount, &format!(", found {}", cols.len())));
        }

        // spaces are only allowed inside the object name
        let name = cols[0];
        let after_name = content.get(name.len() + 1..).unwrap_or("");
        if after_name.contains(' ') || name.starts_with(' ') || name.ends_with(' ') {
            return Err(emit.fail(ErrorCode::ColumnCount, ", found space characters"));
        }

        if let Some(index) = cols.iter().take(8).position(|col| col.is_empty()) {
            return Err(emit.fail(ErrorCode::EmptyColumn, &(index + 1).to_string()));
        }

        let mut first_error = None;
        let object_begin =
            self.read_pos(cols[1], "object_beg (column 2)", &mut first_error, &mut emit);
        let object_end = self.read_pos(cols[2], "object_end (column 3)", &mut first_error, &mut emit);
        let part_number =
            self.read_pos(cols[3], "part_number (column 4)", &mut first_error, &mut emit);
        if let Some(code) = first_error {
            return Err(code);
        }
        if object_end < object_begin {
            return Err(emit.fail(ErrorCode::ObjEndLtBeg, ""));
        }
        let object_span = object_end - object_begin + 1;

        let type_col = cols[4];
        let Some(type_char) = single_char(type_col) else {
            return Err(emit.fail(ErrorCode::InvalidValue, "component_type (column 5)"));
        };

        let kind = if let Some(component_type) = ComponentType::from_char(type_char) {
            if cols.len() == 8 {
                return Err(if tabs_stripped {
                    emit.fail(ErrorCode::EmptyColumn, "9")
                } else {
                    emit.fail(ErrorCode::ColumnCount, ", found 8")
                });
            }
            let component =
                match self.parse_component_cols(&cols, component_type, version, &mut emit) {
                    Ok(component) => component,
                    Err(code) => {
                        let as_gap = self.parse_gap_cols(
                            &cols,
                            GapSize::Known,
                            AgpVersion::V2_0,
                            &mut Emit::silent(),
                        );
                        if as_gap.is_ok() {
                            emit.msg(ErrorCode::LooksLikeGap, type_col);
                        }
                        return Err(code);
                    }
                };
            let component_span = component.span_len();
            if component_span != object_span {
                emit.msg(
                    ErrorCode::ObjRangeNeComp,
                    &format!(": {object_span} != {component_span}"),
                );
            }
            RowKind::Component(component)
        } else if let Some(size) = GapSize::from_char(type_char) {
            let evidence = cols.get(8).copied().unwrap_or("");
            let effective = version.locked().unwrap_or(if evidence.is_empty() {
                AgpVersion::V1_1
            } else {
                AgpVersion::V2_0
            });
            if effective == AgpVersion::V1_1 && !evidence.is_empty() {
                emit.msg(ErrorCode::GapLineIgnoredCol9, "");
            }
            let gap = match self.parse_gap_cols(&cols, size, effective, &mut emit) {
                Ok(gap) => gap,
                Err(code) => {
                    // the component type is irrelevant, only whether the columns parse
                    let as_component = self.parse_component_cols(
                        &cols,
                        ComponentType::Wgs,
                        version,
                        &mut Emit::silent(),
                    );
                    if as_component.is_ok() {
                        emit.msg(ErrorCode::LooksLikeComp, type_col);
                    }
                    return Err(code);
                }
            };
            if gap.gap_length != object_span {
                emit.msg(
                    ErrorCode::ObjRangeNeGap,
                    &format!(": {object_span} != {}", gap.gap_length),
                );
            }
            RowKind::Gap(gap)
        } else {
            return Err(emit.fail(ErrorCode::InvalidValue, "component_type (column 5)"));
        };

        Ok(ParsedLine::Row(Row {
            object_name: name.to_string(),
            object_begin,
            object_end,
            part_number,
            kind,
        }))
    }

    /// Parse a bounded positive integer; on failure report it, remember the
    /// first error and return 0.
    fn read_pos(
        &self,
        text: &str,
        what: &str,
        first_error: &mut Option<ErrorCode>,
        emit: &mut Emit<'_>,
    ) -> u64 {
        let code = match text.parse::<i128>() {
            Ok(value) if value <= 0 => ErrorCode::MustBePositive,
            Ok(value) => match u64::try_from(value) {
                Ok(pos) if pos <= self.max_position => return pos,
                _ => ErrorCode::MustFitSeqPosType,
            },
            Err(_) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
                ErrorCode::MustFitSeqPosType
            }
            Err(_) => ErrorCode::MustBePositive,
        };
        emit.msg(code, what);
        first_error.get_or_insert(code);
        0
    }

    fn parse_component_cols(
        &self,
        cols: &[&str],
        component_type: ComponentType,
        version: FormatVersion,
        emit: &mut Emit<'_>,
    ) -> Result<ComponentRow, ErrorCode> {
        let mut first_error = None;
        let component_begin =
            self.read_pos(cols[6], "component_beg (column 7)", &mut first_error, emit);
        let component_end =
            self.read_pos(cols[7], "component_end (column 8)", &mut first_error, emit);
        if let Some(code) = first_error {
            return Err(code);
        }
        if component_end < component_begin {
            return Err(emit.fail(ErrorCode::CompEndLtBeg, ""));
        }

        let orientation = match cols.get(8).copied().unwrap_or("") {
            "+" => Orientation::Plus,
            "-" => Orientation::Minus,
            "na" => Orientation::Irrelevant,
            "0" => {
                if version.is(AgpVersion::V2_0) {
                    emit.msg(ErrorCode::OrientationZeroDeprecated, "");
                }
                Orientation::Unknown
            }
            "?" if !version.is(AgpVersion::V1_1) => Orientation::Unknown,
            _ => return Err(emit.fail(ErrorCode::InvalidValue, "orientation (column 9)")),
        };

        Ok(ComponentRow {
            component_type,
            component_id: cols[5].to_string(),
            component_begin,
            component_end,
            orientation,
        })
    }

    fn parse_gap_cols(
        &self,
        cols: &[&str],
        size: GapSize,
        version: AgpVersion,
        emit: &mut Emit<'_>,
    ) -> Result<GapRow, ErrorCode> {
        let mut first_error = None;
        let gap_length = self.read_pos(cols[5], "gap_length (column 6)", &mut first_error, emit);
        if let Some(code) = first_error {
            return Err(code);
        }
        if size == GapSize::Unknown && gap_length != 100 {
            emit.msg(ErrorCode::GapSizeNot100, "");
        }

        let Some(gap_type) = GapType::parse(cols[6]) else {
            return Err(emit.fail(ErrorCode::InvalidValue, "gap_type (column 7)"));
        };
        let linkage = match cols[7] {
            "yes" => true,
            "no" => false,
            _ => return Err(emit.fail(ErrorCode::InvalidValue, "linkage (column 8)")),
        };
        if linkage && !gap_type.allows_linkage() {
            return Err(emit.fail(
                ErrorCode::InvalidLinkage,
                &format!(" \"yes\" for gap_type {gap_type}"),
            ));
        }

        let mut gap = GapRow {
            size,
            gap_length,
            gap_type,
            linkage,
            linkage_evidence: LinkageEvidence::Absent,
        };

        match version {
            AgpVersion::V2_0 => {
                if let Some(hint) = gap.replacement_hint() {
                    emit.msg(
                        ErrorCode::OldGapType,
                        &format!(". Recommended replacement: {hint}"),
                    );
                }
                if !linkage && gap_type == GapType::Scaffold {
                    return Err(emit.fail(
                        ErrorCode::InvalidLinkage,
                        &format!(" \"no\" for gap_type {gap_type}"),
                    ));
                }
                let evidence = cols.get(8).copied().unwrap_or("");
                gap.linkage_evidence = parse_evidence(evidence, gap.ends_scaffold(), emit)?;
            }
            AgpVersion::V1_1 => {
                if gap_type == GapType::Scaffold {
                    return Err(emit.fail(ErrorCode::InvalidValue, "gap_type (column 7)"));
                }
            }
        }

        Ok(gap)
    }
}

fn parse_evidence(
    text: &str,
    ends_scaffold: bool,
    emit: &mut Emit<'_>,
) -> Result<LinkageEvidence, ErrorCode> {
    if text.is_empty() {
        emit.msg(ErrorCode::MissingLinkage, "");
    }
    if ends_scaffold {
        if text == "na" {
            return Ok(LinkageEvidence::Na);
        }
        emit.msg(ErrorCode::NaLinkageExpected, "");
        return Ok(LinkageEvidence::Absent);
    }
    if text == "na" {
        return Err(emit.fail(
            ErrorCode::InvalidValue,
            "linkage_evidence (column 9): 'na' can only be used for gaps with linkage 'no'",
        ));
    }
    if text.is_empty() {
        return Ok(LinkageEvidence::Absent);
    }

    let terms: Vec<&str> = text.split(';').collect();
    let mut set = EvidenceSet::new();
    let mut unspecified = false;
    for term in &terms {
        match EvidenceTerm::parse(term) {
            None => {
                return Err(emit.fail(
                    ErrorCode::InvalidValue,
                    &format!("linkage_evidence (column 9): {term}"),
                ));
            }
            Some(EvidenceTerm::Unspecified) => unspecified = true,
            Some(term_value) => {
                if !set.insert(term_value) {
                    emit.msg(ErrorCode::DuplicateEvidence, term);
                }
            }
        }
    }
    if unspecified {
        if terms.len() > 1 {
            return Err(emit.fail(
                ErrorCode::InvalidValue,
                "linkage_evidence (column 9) -- \"unspecified\" cannot be combined with other terms",
            ));
        }
        return Ok(LinkageEvidence::Unspecified);
    }
    Ok(LinkageEvidence::Terms(set))
}

/// Byte offset of the first `#` not escaped with a backslash
fn find_comment(line: &str) -> Option<usize> {
    line.match_indices('#')
        .map(|(index, _)| index)
        .find(|&index| !line[..index].ends_with('\\'))
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// The version a gap line implies when none has been settled yet.
///
/// Only a well-formed gap line (valid `gap_type` and `linkage`) implies a
/// version: AGP 2.0 when its linkage evidence column is filled, AGP 1.1 when
/// it is empty or missing. Any other line implies nothing.
#[must_use]
pub fn implied_version(line: &str) -> Option<AgpVersion> {
    let content = match find_comment(line) {
        Some(hash) => &line[..hash],
        None => line,
    };
    let cols: Vec<&str> = content.trim_end_matches([' ', '\t']).split('\t').collect();
    if !(8..=10).contains(&cols.len()) {
        return None;
    }
    single_char(cols[4]).and_then(GapSize::from_char)?;
    let gap_type = GapType::parse(cols[6])?;
    let linkage = match cols[7] {
        "yes" => true,
        "no" => false,
        _ => return None,
    };
    if linkage && !gap_type.allows_linkage() {
        return None;
    }
    let evidence = cols.get(8).copied().unwrap_or("");
    Some(if evidence.is_empty() {
        AgpVersion::V1_1
    } else {
        AgpVersion::V2_0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::sink::LineStatus;

    #[derive(Default)]
    struct Recorder {
        messages: Vec<(ErrorCode, String)>,
    }

    impl Recorder {
        fn codes(&self) -> Vec<ErrorCode> {
            self.messages.iter().map(|(code, _)| *code).collect()
        }
    }

    impl DiagnosticSink for Recorder {
        fn msg(&mut self, code: ErrorCode, details: &str, attribution: Attribution) {
            assert_eq!(attribution, Attribution::CURRENT_LINE);
            self.messages.push((code, details.to_string()));
        }

        fn line_done(&mut self, _text: &str, _line_number: usize, _status: LineStatus) {}
    }

    const V2: FormatVersion = FormatVersion::Locked(AgpVersion::V2_0);
    const V1: FormatVersion = FormatVersion::Locked(AgpVersion::V1_1);

    fn parse(line: &str, version: FormatVersion) -> (Result<ParsedLine, ErrorCode>, Recorder) {
        let mut recorder = Recorder::default();
        let result = RowParser::new().parse_line(line, version, &mut recorder);
        (result, recorder)
    }

    fn row(result: Result<ParsedLine, ErrorCode>) -> Row {
        match result {
            Ok(ParsedLine::Row(row)) => row,
            other => panic!("expected a row, got {other:?}"),
        }
    }

    #[test]
    fn test_component_line() {
        let (result, recorder) = parse("chr1\t1\t1000\t1\tW\tAC123.1\t1\t1000\t+", V2);
        let row = row(result);
        assert!(recorder.messages.is_empty());
        assert_eq!(row.object_name, "chr1");
        assert_eq!((row.object_begin, row.object_end, row.part_number), (1, 1000, 1));
        let component = row.component().unwrap();
        assert_eq!(component.component_id, "AC123.1");
        assert_eq!(component.component_type, ComponentType::Wgs);
        assert_eq!((component.component_begin, component.component_end), (1, 1000));
        assert_eq!(component.orientation, Orientation::Plus);
    }

    #[test]
    fn test_gap_span_mismatch_still_returns_row() {
        let (result, recorder) = parse("chr1\t1\t100\t1\tN\t50\tscaffold\tyes\tpaired-ends", V2);
        let row = row(result);
        assert_eq!(recorder.codes(), vec![ErrorCode::ObjRangeNeGap]);
        assert_eq!(recorder.messages[0].1, ": 100 != 50");
        let gap = row.gap().unwrap();
        assert_eq!(gap.gap_type, GapType::Scaffold);
        assert!(matches!(gap.linkage_evidence, LinkageEvidence::Terms(set)
            if set.contains(EvidenceTerm::PairedEnds) && set.len() == 1));
    }

    #[test]
    fn test_component_span_mismatch() {
        let (result, recorder) = parse("chr1\t1\t100\t1\tW\tAC1.1\t1\t90\t-", V2);
        assert!(result.is_ok());
        assert_eq!(recorder.messages, vec![(ErrorCode::ObjRangeNeComp, ": 100 != 90".to_string())]);
    }

    #[test]
    fn test_comments() {
        let (result, recorder) = parse("# just a comment", V2);
        assert_eq!(result, Ok(ParsedLine::Comment));
        assert!(recorder.messages.is_empty());

        let (result, _) = parse("##agp-version 2.0", FormatVersion::Unset);
        assert_eq!(result, Ok(ParsedLine::Comment));

        let (result, recorder) = parse("chr1\t1\t10\t1\tW\tAC1.1\t1\t10\t+ \t# note", V2);
        assert!(result.is_ok());
        assert!(recorder.messages.is_empty());

        // an escaped hash is content
        let (result, _) = parse("chr1\t1\t10\t1\tW\tAC1\\#x\t1\t10\t+", V2);
        assert_eq!(row(result).component().unwrap().component_id, "AC1\\#x");
    }

    #[test]
    fn test_empty_line() {
        let (result, recorder) = parse("", V2);
        assert_eq!(result, Err(ErrorCode::EmptyLine));
        assert_eq!(recorder.codes(), vec![ErrorCode::EmptyLine]);
    }

    #[test]
    fn test_column_count() {
        let (result, recorder) = parse("chr1\t1\t10\t1\tW\tAC1.1\t1", V2);
        assert_eq!(result, Err(ErrorCode::ColumnCount));
        assert_eq!(recorder.messages[0].1, ", found 7");

        let (result, recorder) = parse("chr1\t1\t10\t1\tW\tAC1.1\t1\t10", V2);
        assert_eq!(result, Err(ErrorCode::ColumnCount));
        assert_eq!(recorder.messages[0].1, ", found 8");

        let (result, recorder) = parse("chr1\t1\t10\t1\tW\tAC1.1\t1\t10\t\t# c", V2);
        assert_eq!(result, Err(ErrorCode::EmptyColumn));
        assert_eq!(recorder.messages[0].1, "9");
    }

    #[test]
    fn test_trailing_tab_and_spaces_are_notes() {
        let (result, recorder) = parse("chr1\t1\t10\t1\tW\tAC1.1\t1\t10\t+\t", V2);
        assert!(result.is_ok());
        assert_eq!(recorder.codes(), vec![ErrorCode::ExtraTab]);

        let (result, recorder) = parse("chr1\t1\t10\t1\tW\tAC1.1\t1\t10\t+  ", V2);
        assert!(result.is_ok());
        assert_eq!(recorder.codes(), vec![ErrorCode::ExtraTab]);
    }

    #[test]
    fn test_spaces_outside_object_name() {
        let (result, recorder) = parse("chr1\t1\t10\t1\tW\tAC1.1 \t1\t10\t+", V2);
        assert_eq!(result, Err(ErrorCode::ColumnCount));
        assert_eq!(recorder.messages[0].1, ", found space characters");

        let (result, _) = parse("chr 1\t1\t10\t1\tW\tAC1.1\t1\t10\t+", V2);
        assert!(result.is_ok());
    }

    #[test]
    fn test_empty_column_index() {
        let (result, recorder) = parse("chr1\t1\t\t1\tW\tAC1.1\t1\t10\t+", V2);
        assert_eq!(result, Err(ErrorCode::EmptyColumn));
        assert_eq!(recorder.messages[0].1, "3");
    }

    #[test]
    fn test_position_errors_are_all_reported() {
        let (result, recorder) = parse("chr1\t0\tabc\t99999999999\tW\tAC1.1\t1\t10\t+", V2);
        assert_eq!(result, Err(ErrorCode::MustBePositive));
        assert_eq!(
            recorder.codes(),
            vec![
                ErrorCode::MustBePositive,
                ErrorCode::MustBePositive,
                ErrorCode::MustFitSeqPosType
            ]
        );
        assert_eq!(recorder.messages[2].1, "part_number (column 4)");
    }

    #[test]
    fn test_max_position_is_configurable() {
        let parser = RowParser::with_max_position(1000);
        let mut recorder = Recorder::default();
        let result = parser.parse_line("chr1\t1\t1001\t1\tN\t1001\tcontig\tno\tna", V2, &mut recorder);
        assert_eq!(result, Err(ErrorCode::MustFitSeqPosType));
    }

    #[test]
    fn test_end_before_begin() {
        let (result, _) = parse("chr1\t10\t1\t1\tW\tAC1.1\t1\t10\t+", V2);
        assert_eq!(result, Err(ErrorCode::ObjEndLtBeg));
        let (result, _) = parse("chr1\t1\t10\t1\tW\tAC1.1\t10\t1\t+", V2);
        assert_eq!(result, Err(ErrorCode::CompEndLtBeg));
    }

    #[test]
    fn test_invalid_type_column() {
        let (result, recorder) = parse("chr1\t1\t10\t1\tX\tAC1.1\t1\t10\t+", V2);
        assert_eq!(result, Err(ErrorCode::InvalidValue));
        assert_eq!(recorder.messages[0].1, "component_type (column 5)");
    }

    #[test]
    fn test_looks_like_other_grammar() {
        let (result, recorder) = parse("chr1\t1\t100\t1\tW\t100\tcontig\tno\tna", V2);
        assert_eq!(result, Err(ErrorCode::MustBePositive));
        assert!(recorder.codes().contains(&ErrorCode::LooksLikeGap));

        let (result, recorder) = parse("chr1\t1\t100\t1\tN\tAC1.1\t1\t100\t+", V2);
        assert_eq!(result, Err(ErrorCode::MustBePositive));
        assert_eq!(
            recorder.codes(),
            vec![ErrorCode::MustBePositive, ErrorCode::LooksLikeComp]
        );
    }

    #[test]
    fn test_orientation_by_version() {
        let line = "chr1\t1\t10\t1\tW\tAC1.1\t1\t10\t0";
        let (result, recorder) = parse(line, V2);
        assert_eq!(row(result).component().unwrap().orientation, Orientation::Unknown);
        assert_eq!(recorder.codes(), vec![ErrorCode::OrientationZeroDeprecated]);

        let (_, recorder) = parse(line, V1);
        assert!(recorder.messages.is_empty());

        let line = "chr1\t1\t10\t1\tW\tAC1.1\t1\t10\t?";
        assert!(parse(line, V2).0.is_ok());
        assert_eq!(parse(line, V1).0, Err(ErrorCode::InvalidValue));

        let line = "chr1\t1\t10\t1\tW\tAC1.1\t1\t10\tna";
        assert_eq!(
            row(parse(line, V1).0).component().unwrap().orientation,
            Orientation::Irrelevant
        );
    }

    #[test]
    fn test_gap_linkage_rules() {
        let (result, recorder) = parse("chr1\t1\t100\t1\tN\t100\tcontig\tyes\tmap", V2);
        assert_eq!(result, Err(ErrorCode::InvalidLinkage));
        assert_eq!(recorder.messages[0].1, " \"yes\" for gap_type contig");

        let (result, _) = parse("chr1\t1\t100\t1\tN\t100\tscaffold\tno\tna", V2);
        assert_eq!(result, Err(ErrorCode::InvalidLinkage));

        let (result, _) = parse("chr1\t1\t100\t1\tN\t100\tscaffold\tyes\t", V1);
        assert_eq!(result, Err(ErrorCode::InvalidValue));

        let (result, _) = parse("chr1\t1\t100\t1\tN\t100\tcontig\tmaybe\tna", V2);
        assert_eq!(result, Err(ErrorCode::InvalidValue));
    }

    #[test]
    fn test_old_gap_types_in_v2() {
        let (result, recorder) = parse("chr1\t1\t100\t1\tN\t100\tclone\tyes\tclone_contig", V2);
        assert!(result.is_ok());
        assert_eq!(recorder.codes(), vec![ErrorCode::OldGapType]);
        assert!(recorder.messages[0].1.starts_with(". Recommended replacement: gap type=scaffold"));
    }

    #[test]
    fn test_linkage_evidence_rules() {
        let (result, recorder) = parse("chr1\t1\t100\t1\tN\t100\tcontig\tno\tmap", V2);
        assert!(result.is_ok());
        assert_eq!(recorder.codes(), vec![ErrorCode::NaLinkageExpected]);

        let (result, recorder) = parse("chr1\t1\t100\t1\tN\t100\tscaffold\tyes\tna", V2);
        assert_eq!(result, Err(ErrorCode::InvalidValue));
        assert!(recorder.messages[0].1.contains("'na' can only be used"));

        let (result, recorder) = parse("chr1\t1\t100\t1\tN\t100\tscaffold\tyes\t", V2);
        assert!(result.is_ok());
        assert_eq!(recorder.codes(), vec![ErrorCode::MissingLinkage]);

        let (result, _) = parse("chr1\t1\t100\t1\tN\t100\tscaffold\tyes\tmap;unspecified", V2);
        assert_eq!(result, Err(ErrorCode::InvalidValue));

        let (result, recorder) = parse("chr1\t1\t100\t1\tN\t100\tscaffold\tyes\tmap;bogus", V2);
        assert_eq!(result, Err(ErrorCode::InvalidValue));
        assert_eq!(recorder.messages[0].1, "linkage_evidence (column 9): bogus");

        let (result, recorder) = parse("chr1\t1\t100\t1\tN\t100\tscaffold\tyes\tmap;map", V2);
        assert!(result.is_ok());
        assert_eq!(recorder.messages, vec![(ErrorCode::DuplicateEvidence, "map".to_string())]);

        let (result, _) = parse("chr1\t1\t100\t1\tN\t100\tscaffold\tyes\tunspecified", V2);
        assert_eq!(
            row(result).gap().unwrap().linkage_evidence,
            LinkageEvidence::Unspecified
        );
    }

    #[test]
    fn test_gap_line_versions() {
        let (result, recorder) = parse("chr1\t1\t100\t1\tN\t100\tcontig\tno\tna", V1);
        assert!(result.is_ok());
        assert_eq!(recorder.codes(), vec![ErrorCode::GapLineIgnoredCol9]);

        let (result, recorder) = parse("chr1\t1\t50\t1\tU\t50\tcontig\tno\t", V1);
        assert!(result.is_ok());
        assert_eq!(recorder.codes(), vec![ErrorCode::GapSizeNot100]);

        // without a locked version the evidence column decides
        let (result, recorder) = parse("chr1\t1\t100\t1\tN\t100\tcontig\tno\tna", FormatVersion::Unset);
        assert_eq!(row(result).gap().unwrap().linkage_evidence, LinkageEvidence::Na);
        assert!(recorder.messages.is_empty());
    }

    #[test]
    fn test_implied_version() {
        assert_eq!(
            implied_version("chr1\t1\t100\t1\tN\t100\tcontig\tno\tna"),
            Some(AgpVersion::V2_0)
        );
        assert_eq!(
            implied_version("chr1\t1\t100\t1\tN\t100\tcontig\tno"),
            Some(AgpVersion::V1_1)
        );
        assert_eq!(
            implied_version("chr1\t1\t100\t1\tN\t100\tcontig\tno\t\t# c"),
            Some(AgpVersion::V1_1)
        );
        assert_eq!(implied_version("chr1\t1\t10\t1\tW\tAC1.1\t1\t10\t+"), None);
        assert_eq!(implied_version("chr1\t1\t100\t1\tN\t100\tcontig\tyes\tmap"), None);
        assert_eq!(implied_version("# comment"), None);
    }

    #[test]
    fn test_serialized_rows_parse_back() {
        let lines = [
            "chr1\t1\t1000\t1\tW\tAC123.1\t1\t1000\t+",
            "chr1\t1001\t1100\t2\tN\t100\tscaffold\tyes\tpaired-ends;map",
            "chr1\t1101\t1200\t3\tU\t100\tcontig\tno\tna",
            "chr1\t1201\t1300\t4\tN\t100\trepeat\tyes\tunspecified",
            "chr1\t1301\t1400\t5\tD\tAC9\t201\t300\t?",
            "chr2\t1\t10\t1\tO\tlocal_1\t1\t10\tna",
        ];
        for line in lines {
            let original = row(parse(line, V2).0);
            let reparsed = row(parse(&original.to_line(Some(AgpVersion::V2_0)), V2).0);
            assert_eq!(original, reparsed, "{line}");
            assert_eq!(original.to_string(), line);
        }

        let v1_lines = [
            "chr1\t1\t100\t1\tN\t100\tclone\tyes\t",
            "chr1\t101\t200\t2\tW\tAC1.1\t1\t100\t0",
        ];
        for line in v1_lines {
            let original = row(parse(line, V1).0);
            assert_eq!(original.to_line(Some(AgpVersion::V1_1)), line);
        }
    }
}
