//! Validator settings, loadable from a JSON file.
//!
//! ```json
//! {
//!   "version": "2.0",
//!   "strict": true,
//!   "max_repeat": 10,
//!   "skip": ["w52", "gap shorter"],
//!   "treat_as_error": ["w42"]
//! }
//! ```
//!
//! Every field is optional. Code lists take selectors: `all`, `alt`,
//! `warn...`, `err...`, a printable code such as `w40`, or text found in a
//! message.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::types::AgpVersion;
use crate::diagnostics::codes::ErrorCode;
use crate::diagnostics::report::ReportFormat;
use crate::diagnostics::sink::DiagnosticLog;
use crate::parsing::row::{RowParser, DEFAULT_MAX_POSITION};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("No message code matches '{0}'")]
    UnknownCode(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Force this AGP version instead of detecting it
    pub version: Option<AgpVersion>,
    pub max_position: u64,
    pub strict: bool,
    /// Warnings that stay warnings in strict mode; `None` keeps the default set
    pub strict_mode_warnings: Option<Vec<String>>,
    pub treat_as_error: Vec<String>,
    /// Display at most this many messages per code (0 = no limit)
    pub max_repeat: usize,
    pub skip: Vec<String>,
    /// When non-empty, display only these codes
    pub only: Vec<String>,
    /// Stop reading after this many lines with errors (0 = no limit)
    pub max_errors: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            version: None,
            max_position: DEFAULT_MAX_POSITION,
            strict: false,
            strict_mode_warnings: None,
            treat_as_error: Vec::new(),
            max_repeat: 0,
            skip: Vec::new(),
            only: Vec::new(),
            max_errors: 0,
        }
    }
}

impl ValidatorConfig {
    /// Load settings from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds invalid settings.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        debug!(path = %path.display(), "loaded validator config");
        Ok(config)
    }

    /// Parse settings from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON, unknown fields, or a zero
    /// `max_position`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but make no sense
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when `max_position` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_position == 0 {
            return Err(ConfigError::Invalid(
                "max_position must be positive".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn row_parser(&self) -> RowParser {
        RowParser::with_max_position(self.max_position)
    }

    /// Build the diagnostic log these settings describe
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownCode` if a selector matches no code.
    pub fn build_log<W: Write>(
        &self,
        out: W,
        format: ReportFormat,
    ) -> Result<DiagnosticLog<W>, ConfigError> {
        let mut log = DiagnosticLog::new(out, format)
            .with_strict(self.strict)
            .with_max_repeat(self.max_repeat);

        if let Some(selectors) = &self.strict_mode_warnings {
            log.set_strict_mode_warnings(resolve_codes(selectors)?);
        }
        log.treat_as_error(resolve_codes(&self.treat_as_error)?);
        if !self.only.is_empty() {
            log.silence(ErrorCode::ALL);
            log.unsilence(resolve_codes(&self.only)?);
        }
        log.silence(resolve_codes(&self.skip)?);
        Ok(log)
    }
}

/// Resolve selectors to codes; every selector must match at least one code.
///
/// # Errors
///
/// Returns `ConfigError::UnknownCode` naming the first selector that matches
/// nothing.
pub fn resolve_codes(selectors: &[String]) -> Result<Vec<ErrorCode>, ConfigError> {
    let mut codes = Vec::new();
    for selector in selectors {
        let matched = ErrorCode::select(selector);
        if matched.is_empty() {
            return Err(ConfigError::UnknownCode(selector.clone()));
        }
        codes.extend(matched);
    }
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::sink::{Attribution, DiagnosticSink};

    #[test]
    fn test_defaults() {
        let config = ValidatorConfig::from_json("{}").unwrap();
        assert_eq!(config, ValidatorConfig::default());
        assert_eq!(config.row_parser().max_position(), DEFAULT_MAX_POSITION);
    }

    #[test]
    fn test_from_json() {
        let config = ValidatorConfig::from_json(
            r#"{"version": "1.1", "strict": true, "max_repeat": 3, "skip": ["w52"]}"#,
        )
        .unwrap();
        assert_eq!(config.version, Some(AgpVersion::V1_1));
        assert!(config.strict);
        assert_eq!(config.max_repeat, 3);
        assert_eq!(config.skip, vec!["w52".to_string()]);
    }

    #[test]
    fn test_rejects_unknown_fields_and_bad_values() {
        assert!(matches!(
            ValidatorConfig::from_json(r#"{"strictness": true}"#),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            ValidatorConfig::from_json(r#"{"max_position": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"max_errors": 5}"#).unwrap();
        let config = ValidatorConfig::load_from_file(&path).unwrap();
        assert_eq!(config.max_errors, 5);

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            ValidatorConfig::load_from_file(&missing),
            Err(ConfigError::ReadError(_))
        ));
    }

    #[test]
    fn test_unknown_selector() {
        let config = ValidatorConfig {
            skip: vec!["no message says this".to_string()],
            ..ValidatorConfig::default()
        };
        assert!(matches!(
            config.build_log(Vec::new(), ReportFormat::Text),
            Err(ConfigError::UnknownCode(s)) if s == "no message says this"
        ));
    }

    #[test]
    fn test_only_and_skip() {
        let config = ValidatorConfig {
            only: vec!["warnings".to_string()],
            skip: vec!["w33".to_string()],
            ..ValidatorConfig::default()
        };
        let mut log = config.build_log(Vec::new(), ReportFormat::Json).unwrap();
        log.report(ErrorCode::ObjMustBegin1, Attribution::NONE);
        log.report(ErrorCode::ConseqGaps, Attribution::NONE);
        log.report(ErrorCode::GapObjBegin, Attribution::NONE);

        let shown: Vec<ErrorCode> = log.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(shown, vec![ErrorCode::GapObjBegin]);
        assert_eq!(log.summary().errors, 1);
        assert_eq!(log.summary().suppressed, 2);
    }

    #[test]
    fn test_strict_settings() {
        let config = ValidatorConfig {
            strict: true,
            strict_mode_warnings: Some(vec!["w31".to_string()]),
            treat_as_error: vec!["w52".to_string()],
            ..ValidatorConfig::default()
        };
        let log = config.build_log(Vec::new(), ReportFormat::Text).unwrap();
        assert_eq!(
            log.effective_severity(ErrorCode::GapObjEnd),
            crate::diagnostics::codes::Severity::Warning
        );
        assert_eq!(
            log.effective_severity(ErrorCode::NoEolAtEof),
            crate::diagnostics::codes::Severity::Error
        );
        assert_eq!(
            log.effective_severity(ErrorCode::ShortGap),
            crate::diagnostics::codes::Severity::Error
        );
    }
}
