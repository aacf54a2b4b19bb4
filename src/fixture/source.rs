//! Fixture source loading.
//!
//! Turns a [`FixtureSource`] into the raw [`Value`] tree the normalizer works on.
//! Files are decoded by extension; inline values are handed back untouched.

use crate::errors::{Result, SvtError};
use crate::value::Value;
use log::debug;
use miette::{NamedSource, SourceSpan};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The structured-data formats a fixture may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
    Yaml,
}

impl Format {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Format> {
        match path.extension()?.to_str()? {
            "toml" => Some(Format::Toml),
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Toml => "TOML",
            Format::Json => "JSON",
            Format::Yaml => "YAML",
        }
    }
}

/// Where a fixture set comes from.
#[derive(Debug, Clone)]
pub enum FixtureSource {
    /// A fixture file, decoded according to its extension.
    Path(PathBuf),
    /// Fixture text already in memory, e.g. from `include_str!`.
    Text { format: Format, text: String },
    /// An already-decoded mapping.
    Inline(Value),
}

impl FixtureSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        FixtureSource::Path(path.into())
    }

    pub fn text(format: Format, text: impl Into<String>) -> Self {
        FixtureSource::Text {
            format,
            text: text.into(),
        }
    }

    pub fn inline(value: impl Into<Value>) -> Self {
        FixtureSource::Inline(value.into())
    }

    /// Produces the raw fixture tree.
    pub fn load(&self) -> Result<Value> {
        match self {
            FixtureSource::Path(path) => load_file(path),
            FixtureSource::Text { format, text } => decode(*format, text, Path::new("<inline>")),
            FixtureSource::Inline(value) => Ok(value.clone()),
        }
    }

    /// A short label for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            FixtureSource::Path(path) => path.display().to_string(),
            FixtureSource::Text { format, .. } => format!("<inline {}>", format.name()),
            FixtureSource::Inline(_) => "<inline>".to_string(),
        }
    }
}

impl From<Value> for FixtureSource {
    fn from(value: Value) -> Self {
        FixtureSource::Inline(value)
    }
}

impl From<&Path> for FixtureSource {
    fn from(path: &Path) -> Self {
        FixtureSource::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for FixtureSource {
    fn from(path: PathBuf) -> Self {
        FixtureSource::Path(path)
    }
}

impl From<&str> for FixtureSource {
    fn from(path: &str) -> Self {
        FixtureSource::Path(PathBuf::from(path))
    }
}

impl From<String> for FixtureSource {
    fn from(path: String) -> Self {
        FixtureSource::Path(PathBuf::from(path))
    }
}

fn load_file(path: &Path) -> Result<Value> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => SvtError::SourceNotFound {
            path: path.to_path_buf(),
            source,
        },
        _ => SvtError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let format = Format::from_path(path).ok_or_else(|| SvtError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let text = String::from_utf8(bytes).map_err(|e| {
        let valid = e.utf8_error().valid_up_to();
        let lossy = String::from_utf8_lossy(e.as_bytes()).into_owned();
        // The first invalid sequence becomes U+FFFD, three bytes wide.
        SvtError::SourceMalformed {
            path: path.to_path_buf(),
            format: format.name(),
            message: e.utf8_error().to_string(),
            src: NamedSource::new(path.display().to_string(), lossy),
            span: Some(SourceSpan::from((valid, 3))),
        }
    })?;
    debug!("loaded {} fixture {}", format.name(), path.display());
    decode(format, &text, path)
}

/// Decodes fixture text, mapping decoder errors onto a labelled span.
pub fn decode(format: Format, text: &str, path: &Path) -> Result<Value> {
    let decoded: std::result::Result<Value, (String, Option<SourceSpan>)> = match format {
        Format::Toml => toml::from_str(text).map_err(|e| {
            let span = e.span().map(|r| SourceSpan::from(r.start..r.end.max(r.start + 1)));
            (e.message().to_string(), span)
        }),
        Format::Json => serde_json::from_str(text).map_err(|e| {
            let span = offset_of(text, e.line(), e.column()).map(|o| SourceSpan::from((o, 1)));
            (e.to_string(), span)
        }),
        Format::Yaml => serde_yaml::from_str(text).map_err(|e| {
            let span = e.location().map(|l| SourceSpan::from((l.index(), 1)));
            (e.to_string(), span)
        }),
    };
    decoded.map_err(|(message, span)| SvtError::SourceMalformed {
        path: path.to_path_buf(),
        format: format.name(),
        message,
        src: NamedSource::new(path.display().to_string(), text.to_string()),
        span,
    })
}

/// Byte offset of a 1-based line/column position.
fn offset_of(text: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    Some((line_start + column.saturating_sub(1)).min(text.len().saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_each_format_by_extension() {
        let toml = write_fixture(".toml", "o = [2, 3]\ni = [[1, 1], [1, 2]]\n");
        let json = write_fixture(".json", r#"{"o": [2, 3], "i": [[1, 1], [1, 2]]}"#);
        let yaml = write_fixture(".yml", "o: [2, 3]\ni: [[1, 1], [1, 2]]\n");
        let a = FixtureSource::path(toml.path()).load().unwrap();
        let b = FixtureSource::path(json.path()).load().unwrap();
        let c = FixtureSource::path(yaml.path()).load().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let err = FixtureSource::path("does/not/exist.toml").load().unwrap_err();
        assert!(matches!(err, SvtError::SourceNotFound { .. }));
        let err = FixtureSource::path("does/not/exist.ini").load().unwrap_err();
        assert!(matches!(err, SvtError::SourceNotFound { .. }));
    }

    #[test]
    fn invalid_utf8_is_malformed_not_missing() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(b"o = \xff\xfe\n").unwrap();
        let err = FixtureSource::path(file.path()).load().unwrap_err();
        match err {
            SvtError::SourceMalformed { format, span, .. } => {
                assert_eq!(format, "TOML");
                assert_eq!(span, Some(SourceSpan::from((4, 3))));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn directories_are_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = FixtureSource::path(dir.path()).load().unwrap_err();
        assert!(matches!(err, SvtError::SourceUnreadable { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write_fixture(".txt", "o = [1]");
        let err = FixtureSource::path(file.path()).load().unwrap_err();
        assert!(matches!(err, SvtError::UnsupportedFormat { .. }));
    }

    #[test]
    fn malformed_content_carries_a_span() {
        let file = write_fixture(".json", "{\"o\": [1, 2}\n");
        let err = FixtureSource::path(file.path()).load().unwrap_err();
        match err {
            SvtError::SourceMalformed { format, span, .. } => {
                assert_eq!(format, "JSON");
                assert!(span.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn inline_values_are_returned_unchanged() {
        let value = Value::from(vec![1, 2]);
        assert_eq!(FixtureSource::inline(value.clone()).load().unwrap(), value);
    }

    #[test]
    fn offsets_follow_lines() {
        let text = "ab\ncde\n";
        assert_eq!(offset_of(text, 1, 1), Some(0));
        assert_eq!(offset_of(text, 2, 2), Some(4));
        assert_eq!(offset_of(text, 0, 1), None);
    }
}
