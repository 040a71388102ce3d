//! Version error types

use miette::Diagnostic;
use thiserror::Error;

use crate::version::Version;

#[derive(Error, Debug, Diagnostic)]
pub enum VersionError {
    #[error("Unknown control plane version '{version}'")]
    #[diagnostic(code(meshspec::version::unknown))]
    UnknownVersion {
        version: String,
        #[help]
        suggestion: Option<String>,
    },

    /// The strategy table itself is inconsistent; never caused by user input
    #[error("Invalid strategy registration: {message}")]
    #[diagnostic(code(meshspec::version::registration))]
    Registration { message: String },

    #[error("{message} (version {version})")]
    #[diagnostic(
        code(meshspec::version::unsupported),
        help("Choose a setting supported by {version} or change the control plane version")
    )]
    Unsupported { version: Version, message: String },
}

pub type Result<T> = std::result::Result<T, VersionError>;
