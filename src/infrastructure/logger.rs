//! Namespaced diagnostic logger carried through the execution context.
//!
//! Every event is a `tracing` event with the namespace attached as a field, so
//! subscriber configuration (level, filtering) stays in one place.

use std::fmt;

use tracing::{debug, error, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
    namespace: String,
}

impl Logger {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Derive a child logger: `cmdtree` -> `cmdtree:discover`.
    pub fn extend(&self, namespace: &str) -> Self {
        Self {
            namespace: format!("{}:{}", self.namespace, namespace),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn message(&self, args: fmt::Arguments<'_>) {
        debug!(namespace = %self.namespace, "{}", args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        warn!(namespace = %self.namespace, "{}", args);
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        error!(namespace = %self.namespace, "{}", args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_builds_hierarchical_namespace() {
        let log = Logger::new("cmdtree").extend("discover").extend("dns");
        assert_eq!(log.namespace(), "cmdtree:discover:dns");
    }
}
