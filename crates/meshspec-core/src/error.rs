//! Core error types

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CoreError {
    #[error("Invalid path '{path}': paths are non-empty, dot-separated keys")]
    #[diagnostic(code(meshspec::values::invalid_path))]
    InvalidPath { path: String },

    #[error("Path '{path}' traverses '{segment}', which is a {found}, not a map")]
    #[diagnostic(code(meshspec::values::path_type_mismatch))]
    PathTypeMismatch {
        path: String,
        segment: String,
        found: &'static str,
    },

    #[error("Value at '{path}' is a {found}, expected {expected}")]
    #[diagnostic(code(meshspec::values::type_coercion))]
    TypeCoercion {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unknown {kind} '{value}'")]
    #[diagnostic(code(meshspec::spec::unknown_enum_value))]
    UnknownEnumValue {
        kind: &'static str,
        value: String,
        #[help]
        expected: Option<String>,
    },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
