//! Meshspec Core - Settings documents and control plane specifications
//!
//! This crate provides the foundational types used throughout meshspec:
//! - `Values`: A nested settings document with dotted-path access
//! - `LegacySpec`: The loosely typed legacy control plane specification
//! - `ControlPlaneSpec`: The strongly typed control plane specification

pub mod error;
pub mod spec;
pub mod values;

pub use error::{CoreError, Result};
pub use spec::{ControlPlaneSpec, LegacySpec};
pub use values::{FromValue, Map, Value, Values};
