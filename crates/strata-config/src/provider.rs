//! The provider interface shared by configuration nodes.

use crate::node::Configuration;
use crate::types::{ConfigError, ConfigValue};

/// Something that produces a configuration value on demand.
pub trait Provider {
    /// Produce the current value.
    fn provide(&self) -> Result<ConfigValue, ConfigError>;

    fn is_provider(&self) -> bool {
        true
    }

    /// Whether this provider stands in for another one instead of producing
    /// a value itself.
    fn is_delegated(&self) -> bool {
        false
    }
}

impl Provider for Configuration {
    fn provide(&self) -> Result<ConfigValue, ConfigError> {
        self.resolve()
    }
}
