//! Meshspec Profiles - Named, reusable control plane configuration
//!
//! A profile is a partial specification stored under a name, which may
//! itself build on other profiles. The [`ProfileResolver`] loads profiles
//! from a [`ProfileSource`] and merges them into one legacy specification
//! that seeds a conversion before user settings are layered on top.
//!
//! ```ignore
//! let registry = StrategyRegistry::builtin();
//! let source = FileProfileSource::new("/usr/share/meshspec/profiles")
//!     .with_override_dir("/etc/meshspec/profiles");
//! let resolver = ProfileResolver::new(&source, &registry);
//! let base = resolver.resolve(&["small".into()], &ResolveContext::new(Version::V2_0))?;
//! ```

pub mod document;
pub mod error;
pub mod resolver;
pub mod source;

pub use document::ProfileContent;
pub use error::{ProfileError, Result};
pub use resolver::{DEFAULT_PROFILE, ProfileResolver, ResolveContext};
pub use source::{FileProfileSource, MemoryProfileSource, ProfileSource, validate_name};
