//! Meshspec Versions - Control plane versions and their strategies
//!
//! Every supported control plane version maps to exactly one
//! [`VersionStrategy`], which supplies the version-specific rules the
//! converter needs:
//! - chart install ordering
//! - policy and telemetry type inference from legacy flags
//! - the trust domain path
//! - mesh expansion ports
//! - validation of the typed specification
//!
//! Strategies are collected in a [`StrategyRegistry`], built once and
//! passed to whoever needs it.

pub mod error;
pub mod registry;
pub mod strategy;
pub mod version;

pub use error::{Result, VersionError};
pub use registry::StrategyRegistry;
pub use strategy::{
    ChartGroup, ExpansionPort, PolicyFlags, TelemetryFlags, V1Strategy, V2_0Strategy,
    V2_1Strategy, VersionStrategy,
};
pub use version::Version;
