use serde::{Deserialize, Serialize};

/// AGP specification version a stream is validated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgpVersion {
    #[serde(rename = "1.1")]
    V1_1,
    #[serde(rename = "2.0", alias = "2.1", alias = "2")]
    V2_0,
}

impl AgpVersion {
    /// Parse the token that follows `##agp-version` in a pragma comment.
    ///
    /// Only the exact tokens `1.1`, `2.0` and `2.1` are accepted.
    #[must_use]
    pub fn from_pragma(token: &str) -> Option<Self> {
        match token {
            "1.1" => Some(Self::V1_1),
            "2.0" | "2.1" => Some(Self::V2_0),
            _ => None,
        }
    }

    /// Short label used in diagnostics ("1.1" or "2")
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::V1_1 => "1.1",
            Self::V2_0 => "2",
        }
    }
}

impl std::fmt::Display for AgpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V1_1 => write!(f, "1.1"),
            Self::V2_0 => write!(f, "2.0"),
        }
    }
}

impl std::str::FromStr for AgpVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" | "1.1" => Ok(Self::V1_1),
            "2" | "2.0" | "2.1" => Ok(Self::V2_0),
            other => Err(format!(
                "unsupported AGP version '{other}' (expected 1.1 or 2.0)"
            )),
        }
    }
}

/// Format version of a stream: undecided until a pragma or the first gap line
/// settles it, then fixed for the rest of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormatVersion {
    #[default]
    Unset,
    Locked(AgpVersion),
}

impl FormatVersion {
    /// The locked version, if any
    #[must_use]
    pub fn locked(self) -> Option<AgpVersion> {
        match self {
            Self::Unset => None,
            Self::Locked(version) => Some(version),
        }
    }

    #[must_use]
    pub fn is_locked(self) -> bool {
        matches!(self, Self::Locked(_))
    }

    /// True only when the version is locked to `version`
    #[must_use]
    pub fn is(self, version: AgpVersion) -> bool {
        self == Self::Locked(version)
    }

    /// Lock to `version` unless already locked.
    ///
    /// Returns `false` (and leaves the value untouched) when a version was
    /// already decided.
    pub fn lock(&mut self, version: AgpVersion) -> bool {
        match self {
            Self::Unset => {
                *self = Self::Locked(version);
                true
            }
            Self::Locked(_) => false,
        }
    }
}

impl From<Option<AgpVersion>> for FormatVersion {
    fn from(version: Option<AgpVersion>) -> Self {
        version.map_or(Self::Unset, Self::Locked)
    }
}

/// Component orientation (column 9 of a component line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Plus,
    Minus,
    /// `?` (AGP 2.0) or `0` (AGP 1.1)
    Unknown,
    /// `na`
    Irrelevant,
}

impl Orientation {
    /// Column text for this orientation under the given version.
    ///
    /// Unknown orientation is written as `0` for AGP 1.1 and `?` otherwise.
    #[must_use]
    pub fn as_str(self, version: Option<AgpVersion>) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Unknown if version == Some(AgpVersion::V1_1) => "0",
            Self::Unknown => "?",
            Self::Irrelevant => "na",
        }
    }
}

/// Gap type vocabulary (column 7 of a gap line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    Clone,
    Fragment,
    Repeat,
    Scaffold,
    Contamination,
    Contig,
    Centromere,
    ShortArm,
    Heterochromatin,
    Telomere,
}

impl GapType {
    pub const ALL: [GapType; 10] = [
        Self::Clone,
        Self::Fragment,
        Self::Repeat,
        Self::Scaffold,
        Self::Contamination,
        Self::Contig,
        Self::Centromere,
        Self::ShortArm,
        Self::Heterochromatin,
        Self::Telomere,
    ];

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|gap_type| gap_type.as_str() == s)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clone => "clone",
            Self::Fragment => "fragment",
            Self::Repeat => "repeat",
            Self::Scaffold => "scaffold",
            Self::Contamination => "contamination",
            Self::Contig => "contig",
            Self::Centromere => "centromere",
            Self::ShortArm => "short_arm",
            Self::Heterochromatin => "heterochromatin",
            Self::Telomere => "telomere",
        }
    }

    /// Gap types that may carry `linkage=yes`
    #[must_use]
    pub fn allows_linkage(self) -> bool {
        matches!(
            self,
            Self::Clone | Self::Repeat | Self::Fragment | Self::Scaffold | Self::Contamination
        )
    }

    /// Gap types that may legitimately start or end an object
    #[must_use]
    pub fn valid_at_object_end(self) -> bool {
        matches!(
            self,
            Self::Centromere
                | Self::Telomere
                | Self::ShortArm
                | Self::Heterochromatin
                | Self::Contamination
        )
    }
}

impl std::fmt::Display for GapType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sequencing status of a component (column 5 of a component line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentType {
    /// `A`: active finishing
    Active,
    /// `D`: draft HTG
    Draft,
    /// `F`: finished HTG
    Finished,
    /// `G`: whole genome finishing
    WholeGenomeFinishing,
    /// `O`: other sequence
    Other,
    /// `P`: pre-draft
    PreDraft,
    /// `W`: WGS contig
    Wgs,
}

impl ComponentType {
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::Active),
            'D' => Some(Self::Draft),
            'F' => Some(Self::Finished),
            'G' => Some(Self::WholeGenomeFinishing),
            'O' => Some(Self::Other),
            'P' => Some(Self::PreDraft),
            'W' => Some(Self::Wgs),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Active => 'A',
            Self::Draft => 'D',
            Self::Finished => 'F',
            Self::WholeGenomeFinishing => 'G',
            Self::Other => 'O',
            Self::PreDraft => 'P',
            Self::Wgs => 'W',
        }
    }
}

/// Whether a gap line declares a known (`N`) or unknown (`U`) length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapSize {
    Known,
    Unknown,
}

impl GapSize {
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'N' => Some(Self::Known),
            'U' => Some(Self::Unknown),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Known => 'N',
            Self::Unknown => 'U',
        }
    }
}

/// A single linkage evidence term (AGP 2.0, column 9 of a gap line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvidenceTerm {
    PairedEnds,
    AlignGenus,
    AlignXgenus,
    AlignTrnscpt,
    WithinClone,
    CloneContig,
    Map,
    Strobe,
    Unspecified,
    Pcr,
    ProximityLigation,
}

impl EvidenceTerm {
    /// Terms that can be combined in a set, in canonical output order
    pub const COMBINABLE: [EvidenceTerm; 10] = [
        Self::PairedEnds,
        Self::AlignGenus,
        Self::AlignXgenus,
        Self::AlignTrnscpt,
        Self::WithinClone,
        Self::CloneContig,
        Self::Map,
        Self::Strobe,
        Self::Pcr,
        Self::ProximityLigation,
    ];

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s == "unspecified" {
            return Some(Self::Unspecified);
        }
        Self::COMBINABLE.into_iter().find(|term| term.as_str() == s)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PairedEnds => "paired-ends",
            Self::AlignGenus => "align_genus",
            Self::AlignXgenus => "align_xgenus",
            Self::AlignTrnscpt => "align_trnscpt",
            Self::WithinClone => "within_clone",
            Self::CloneContig => "clone_contig",
            Self::Map => "map",
            Self::Strobe => "strobe",
            Self::Unspecified => "unspecified",
            Self::Pcr => "pcr",
            Self::ProximityLigation => "proximity_ligation",
        }
    }

    fn bit(self) -> u16 {
        match self {
            Self::Unspecified => 0,
            term => {
                let index = Self::COMBINABLE
                    .iter()
                    .position(|t| *t == term)
                    .unwrap_or_default();
                1 << index
            }
        }
    }
}

/// Set of combinable linkage evidence terms, stored as flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EvidenceSet(u16);

impl EvidenceSet {
    #[must_use]
    pub fn new() -> Self {
        Self(0)
    }

    /// Add a term. Returns `false` if it was already present.
    ///
    /// `unspecified` is not a set member and is ignored.
    pub fn insert(&mut self, term: EvidenceTerm) -> bool {
        let bit = term.bit();
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    #[must_use]
    pub fn contains(self, term: EvidenceTerm) -> bool {
        let bit = term.bit();
        bit != 0 && self.0 & bit != 0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Terms in canonical order
    pub fn iter(self) -> impl Iterator<Item = EvidenceTerm> {
        EvidenceTerm::COMBINABLE
            .into_iter()
            .filter(move |term| self.contains(*term))
    }
}

impl FromIterator<EvidenceTerm> for EvidenceSet {
    fn from_iter<I: IntoIterator<Item = EvidenceTerm>>(iter: I) -> Self {
        let mut set = Self::new();
        for term in iter {
            set.insert(term);
        }
        set
    }
}

impl std::fmt::Display for EvidenceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, term) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, "{}", term.as_str())?;
        }
        Ok(())
    }
}

impl Serialize for EvidenceSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(EvidenceTerm::as_str))
    }
}

/// Value of the linkage evidence column of a gap line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "terms")]
pub enum LinkageEvidence {
    /// Column empty, or not used (AGP 1.1)
    #[default]
    Absent,
    /// `na`: gap has no linkage
    Na,
    /// `unspecified`
    Unspecified,
    /// One or more named evidence terms
    Terms(EvidenceSet),
}

impl std::fmt::Display for LinkageEvidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => Ok(()),
            Self::Na => write!(f, "na"),
            Self::Unspecified => write!(f, "unspecified"),
            Self::Terms(set) => write!(f, "{set}"),
        }
    }
}
