//! Meshspec Convert - Legacy <-> typed control plane conversion
//!
//! The [`Converter`] translates between [`LegacySpec`](meshspec_core::LegacySpec)
//! and [`ControlPlaneSpec`](meshspec_core::ControlPlaneSpec):
//!
//! - **Typed to legacy**: start from the spec's tech preview settings, run
//!   every field mapper's writer, then the typed-to-legacy hacks
//! - **Legacy to typed**: embed the 3scale settings, run the legacy-to-typed
//!   hacks, then every field mapper's reader; whatever no mapper consumed
//!   becomes tech preview content
//!
//! A legacy spec that cannot be converted is quarantined rather than
//! reported as an error, see [`quarantine`].

pub mod context;
pub mod converter;
pub mod error;
pub mod hacks;
pub mod mapper;
pub mod quarantine;

pub use context::MapperContext;
pub use converter::Converter;
pub use error::{ConvertError, Result};
pub use hacks::Hack;
pub use mapper::FieldMapper;
