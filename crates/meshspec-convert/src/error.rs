//! Conversion error types

use miette::Diagnostic;
use thiserror::Error;

use meshspec_core::CoreError;
use meshspec_versions::VersionError;

#[derive(Error, Debug, Diagnostic)]
pub enum ConvertError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Version(#[from] VersionError),

    #[error("Invalid specification: {0}")]
    #[diagnostic(code(meshspec::convert::invalid_spec))]
    InvalidSpec(String),

    #[error("Unknown runtime component '{name}'")]
    #[diagnostic(code(meshspec::convert::unknown_component))]
    UnknownComponent {
        name: String,
        #[help]
        expected: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
