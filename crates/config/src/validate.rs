//! Configuration validation.
//!
//! Checks a config document against the known schema, flags unknown or
//! misspelled fields and reports out-of-range values. Documents in any
//! supported format are normalised to a TOML value tree first.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{env_subst::substitute_env, schema::CourierConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "range", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "thumbnail.jpeg_quality"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn single(diagnostic: Diagnostic, config_path: Option<PathBuf>) -> Self {
        Self {
            diagnostics: vec![diagnostic],
            config_path,
        }
    }
}

/// Expected shape of the configuration document.
enum KnownKeys {
    Struct(HashMap<&'static str, KnownKeys>),
    Leaf,
}

fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Struct};

    Struct(HashMap::from([
        (
            "thumbnail",
            Struct(HashMap::from([
                ("max_dimension", Leaf),
                ("jpeg_quality", Leaf),
                ("video_frame_index", Leaf),
                ("enabled", Leaf),
            ])),
        ),
        (
            "ffmpeg",
            Struct(HashMap::from([("binary_path", Leaf), ("timeout_secs", Leaf)])),
        ),
        ("send", Struct(HashMap::from([("timeout_secs", Leaf)]))),
        (
            "logging",
            Struct(HashMap::from([("level", Leaf), ("json", Leaf)])),
        ),
    ]))
}

/// Levenshtein edit distance.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// Closest candidate within `max_distance` edits.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(needle, c)))
        .filter(|(_, d)| *d > 0 && *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

/// Validate a config file at the given path, or the discovered config file
/// when `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = path
        .map(Path::to_path_buf)
        .or_else(crate::loader::find_config_file);

    let Some(actual_path) = config_path else {
        return ValidationResult::single(
            Diagnostic::new(
                Severity::Info,
                "file-ref",
                "",
                "no config file found; using defaults",
            ),
            None,
        );
    };

    let content = match std::fs::read_to_string(&actual_path) {
        Ok(content) => substitute_env(&content),
        Err(e) => {
            return ValidationResult::single(
                Diagnostic::new(
                    Severity::Error,
                    "syntax",
                    "",
                    format!("failed to read config file: {e}"),
                ),
                Some(actual_path),
            );
        },
    };

    let ext = actual_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("toml");
    let mut result = match ext {
        "toml" => validate_toml_str(&content),
        "yaml" | "yml" => match serde_yaml::from_str::<serde_yaml::Value>(&content) {
            Ok(v) => validate_foreign(v, "YAML"),
            Err(e) => syntax_error(format!("YAML syntax error: {e}")),
        },
        "json" => match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(v) => validate_foreign(v, "JSON"),
            Err(e) => syntax_error(format!("JSON syntax error: {e}")),
        },
        other => syntax_error(format!("unsupported config format: .{other}")),
    };
    result.config_path = Some(actual_path);
    result
}

/// Validate a TOML string without touching the filesystem.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    match toml::from_str::<toml::Value>(toml_str) {
        Ok(value) => validate_value(value),
        Err(e) => syntax_error(format!("TOML syntax error: {e}")),
    }
}

fn validate_foreign<T: serde::Serialize>(value: T, format: &str) -> ValidationResult {
    match toml::Value::try_from(value) {
        Ok(value) => validate_value(value),
        Err(e) => syntax_error(format!("{format} document is not a config table: {e}")),
    }
}

fn syntax_error(message: String) -> ValidationResult {
    ValidationResult::single(Diagnostic::new(Severity::Error, "syntax", "", message), None)
}

fn validate_value(value: toml::Value) -> ValidationResult {
    let mut diagnostics = Vec::new();

    check_unknown_fields(&value, &build_schema_map(), "", &mut diagnostics);

    match value.try_into::<CourierConfig>() {
        Ok(config) => check_ranges(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            format!("type error: {e}"),
        )),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

/// Walk the value tree against the schema tree and flag unknown keys.
fn check_unknown_fields(
    value: &toml::Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (toml::Value::Table(table), KnownKeys::Struct(fields)) = (value, schema) else {
        return;
    };
    let known: Vec<&str> = fields.keys().copied().collect();

    for (key, child) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Some(child_schema) = fields.get(key.as_str()) {
            check_unknown_fields(child, child_schema, &path, diagnostics);
            continue;
        }
        let message = match suggest(key, &known, 3) {
            Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
            None => "unknown field".to_string(),
        };
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "unknown-field",
            path,
            message,
        ));
    }
}

fn check_ranges(config: &CourierConfig, diagnostics: &mut Vec<Diagnostic>) {
    let thumb = &config.thumbnail;
    if thumb.max_dimension == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "range",
            "thumbnail.max_dimension",
            "must be greater than 0",
        ));
    }
    if !(1..=100).contains(&thumb.jpeg_quality) {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "range",
            "thumbnail.jpeg_quality",
            format!("must be between 1 and 100, got {}", thumb.jpeg_quality),
        ));
    }
    if thumb.video_frame_index == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "range",
            "thumbnail.video_frame_index",
            "the first frame of many videos is black",
        ));
    }
    if config.ffmpeg.timeout_secs == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "range",
            "ffmpeg.timeout_secs",
            "must be greater than 0",
        ));
    }
    if config.send.timeout_secs == Some(0) {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "range",
            "send.timeout_secs",
            "every send will be cancelled immediately",
        ));
    }
    if let Some(path) = &config.ffmpeg.binary_path
        && !Path::new(path).is_file()
    {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "file-ref",
            "ffmpeg.binary_path",
            format!("{path} does not exist; falling back to PATH"),
        ));
    }
}
