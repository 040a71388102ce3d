//! Version to strategy lookup

use std::fmt;

use crate::error::{Result, VersionError};
use crate::strategy::{V1Strategy, V2_0Strategy, V2_1Strategy, VersionStrategy};
use crate::version::Version;

/// Immutable mapping from every [`Version`] to its strategy
///
/// Built once at startup and shared by reference; lookups never fail for a
/// parsed [`Version`].
pub struct StrategyRegistry {
    /// Indexed by [`Version::index`]
    strategies: Vec<Box<dyn VersionStrategy>>,
}

impl StrategyRegistry {
    /// Build a registry, checking that every version has exactly one strategy
    pub fn new(strategies: Vec<Box<dyn VersionStrategy>>) -> Result<Self> {
        let mut slots: Vec<Option<Box<dyn VersionStrategy>>> =
            Version::ALL.iter().map(|_| None).collect();

        for strategy in strategies {
            let version = strategy.version();
            let slot = &mut slots[version.index()];
            if slot.is_some() {
                return Err(VersionError::Registration {
                    message: format!("more than one strategy registered for {version}"),
                });
            }
            *slot = Some(strategy);
        }

        let mut ordered = Vec::with_capacity(slots.len());
        for (version, slot) in Version::ALL.iter().zip(slots) {
            match slot {
                Some(strategy) => ordered.push(strategy),
                None => {
                    return Err(VersionError::Registration {
                        message: format!("no strategy registered for {version}"),
                    });
                }
            }
        }

        Ok(Self {
            strategies: ordered,
        })
    }

    /// The registry of built-in strategies
    ///
    /// # Panics
    ///
    /// Panics if the built-in table misses a version, which is a programming
    /// error caught by this crate's tests.
    pub fn builtin() -> Self {
        Self::new(vec![
            Box::new(V1Strategy::new(Version::V1_0)),
            Box::new(V1Strategy::new(Version::V1_1)),
            Box::new(V2_0Strategy),
            Box::new(V2_1Strategy::new(Version::V2_1)),
            Box::new(V2_1Strategy::new(Version::V2_2)),
        ])
        .expect("built-in strategies cover every version exactly once")
    }

    /// Parse a version string supplied by a user
    pub fn parse(&self, version: &str) -> Result<Version> {
        Version::parse(version)
    }

    /// The strategy for a version
    pub fn strategy(&self, version: Version) -> &dyn VersionStrategy {
        self.strategies[version.index()].as_ref()
    }

    /// Parse a version string (empty meaning the default) and return its strategy
    pub fn strategy_for(&self, version: &str) -> Result<&dyn VersionStrategy> {
        Ok(self.strategy(Version::parse_or_default(version)?))
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field(
                "versions",
                &self.strategies.iter().map(|s| s.version()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_version() {
        let registry = StrategyRegistry::builtin();
        for version in Version::ALL {
            assert_eq!(registry.strategy(*version).version(), *version);
        }
    }

    #[test]
    fn test_missing_version_is_rejected() {
        let err = StrategyRegistry::new(vec![Box::new(V2_0Strategy)]).unwrap_err();
        assert!(matches!(err, VersionError::Registration { .. }));
        assert!(err.to_string().contains("v1.0"));
    }

    #[test]
    fn test_duplicate_version_is_rejected() {
        let err = StrategyRegistry::new(vec![
            Box::new(V1Strategy::new(Version::V1_0)),
            Box::new(V1Strategy::new(Version::V1_0)),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("more than one"));
    }

    #[test]
    fn test_strategy_for() {
        let registry = StrategyRegistry::builtin();
        assert_eq!(registry.strategy_for("").unwrap().version(), Version::DEFAULT);
        assert_eq!(registry.strategy_for("v1.1").unwrap().version(), Version::V1_1);
        assert!(matches!(
            registry.strategy_for("v3.0"),
            Err(VersionError::UnknownVersion { .. })
        ));
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StrategyRegistry>();
    }
}
