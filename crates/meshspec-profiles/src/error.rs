//! Profile error types

use miette::Diagnostic;
use thiserror::Error;

use meshspec_convert::ConvertError;
use meshspec_versions::VersionError;

#[derive(Error, Debug, Diagnostic)]
pub enum ProfileError {
    #[error("Profile '{name}' not found for {version} (searched {searched})")]
    #[diagnostic(code(meshspec::profile::not_found))]
    NotFound {
        name: String,
        version: String,
        searched: String,
        #[help]
        suggestion: Option<String>,
    },

    #[error("Invalid profile name '{name}'")]
    #[diagnostic(
        code(meshspec::profile::invalid_name),
        help("Profile names are plain file stems and cannot be empty or contain path separators")
    )]
    InvalidName { name: String },

    #[error("Failed to parse profile '{name}': {source}")]
    #[diagnostic(code(meshspec::profile::parse))]
    Parse {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Profile '{name}' has unsupported apiVersion '{api_version}'")]
    #[diagnostic(
        code(meshspec::profile::api_version),
        help("Use an apiVersion ending in /v1 (legacy) or /v2 (typed)")
    )]
    UnsupportedApiVersion { name: String, api_version: String },

    #[error("Profile '{name}' sets both template and profiles")]
    #[diagnostic(
        code(meshspec::profile::template_and_profiles),
        help("Use either a single template or a profiles list")
    )]
    TemplateAndProfiles { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Version(#[from] VersionError),
}

pub type Result<T> = std::result::Result<T, ProfileError>;
