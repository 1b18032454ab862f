//! Router configuration.

use std::time::Duration;

use hubforge_session::RegistryConfig;

/// Configuration for a [`Router`](crate::Router).
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// How long a game with no bound sockets survives before it is reaped.
    pub death_watch_grace: Duration,

    /// Settings for the registry the router owns. Change tracking is
    /// always switched on, whatever this says; the router depends on it.
    pub registry: RegistryConfig,

    /// Round-trip every request and response through the codec before
    /// and after processing. Costs one registry clone per request.
    pub validate_round_trip: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            death_watch_grace: Duration::from_secs(30),
            registry: RegistryConfig::default(),
            validate_round_trip: true,
        }
    }
}

impl RouterConfig {
    /// Sets the death-watch grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.death_watch_grace = grace;
        self
    }

    /// Sets the registry configuration.
    pub fn with_registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }

    /// Turns round-trip validation on or off.
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_round_trip = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_config_default() {
        let config = RouterConfig::default();
        assert_eq!(config.death_watch_grace, Duration::from_secs(30));
        assert!(config.validate_round_trip);
        assert!(config.registry.track_changes);
    }

    #[test]
    fn test_router_config_setters_chain() {
        let config = RouterConfig::default()
            .with_grace(Duration::from_secs(5))
            .with_validation(false);
        assert_eq!(config.death_watch_grace, Duration::from_secs(5));
        assert!(!config.validate_round_trip);
    }
}
