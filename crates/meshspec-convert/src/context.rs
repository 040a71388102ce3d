//! Per-conversion context shared by every mapper and hack

use meshspec_versions::{Version, VersionStrategy};

/// Everything a mapper may consult besides the document itself
#[derive(Clone, Copy)]
pub struct MapperContext<'a> {
    pub version: Version,
    pub strategy: &'a dyn VersionStrategy,
    /// Namespace the control plane is installed into, when known
    pub namespace: Option<&'a str>,
}

impl<'a> MapperContext<'a> {
    pub fn new(strategy: &'a dyn VersionStrategy) -> Self {
        Self {
            version: strategy.version(),
            strategy,
            namespace: None,
        }
    }

    pub fn with_namespace(mut self, namespace: Option<&'a str>) -> Self {
        self.namespace = namespace;
        self
    }
}

impl std::fmt::Debug for MapperContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperContext")
            .field("version", &self.version)
            .field("namespace", &self.namespace)
            .finish()
    }
}
