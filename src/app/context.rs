use crate::domain::{EngineConfig, ResolutionError};
use crate::ports::{RestconfClient, SqlClient, UnconfiguredSqlClient};
use crate::services::resolvers::ResolverRegistry;
use crate::services::{FixtureSqlClient, ResourceAssignmentComponent, RestconfHttpClient};

/// Holds the wired dependencies that commands execute against.
///
/// The context owns the port implementations so that command modules
/// stay free of adapter construction details.
pub struct AppContext {
    config: EngineConfig,
    sql: Box<dyn SqlClient>,
    restconf: Box<dyn RestconfClient>,
}

impl AppContext {
    /// Creates a context from explicit port implementations.
    pub fn new(
        config: EngineConfig,
        sql: Box<dyn SqlClient>,
        restconf: Box<dyn RestconfClient>,
    ) -> Self {
        Self { config, sql, restconf }
    }

    /// Creates a context with the bundled adapters: the fixture-backed
    /// SQL client when fixtures were supplied, and an HTTP RESTCONF
    /// client built from the `[mdsal]` configuration.
    pub fn with_defaults(
        config: EngineConfig,
        fixtures: Option<FixtureSqlClient>,
    ) -> Result<Self, ResolutionError> {
        let restconf = Box::new(RestconfHttpClient::from_config(&config.mdsal)?);
        let sql: Box<dyn SqlClient> = match fixtures {
            Some(client) => Box::new(client),
            None => Box::new(UnconfiguredSqlClient),
        };
        Ok(Self::new(config, sql, restconf))
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds the resource-assignment component, consuming the wired ports.
    pub fn into_component(self) -> ResourceAssignmentComponent {
        ResourceAssignmentComponent::new(ResolverRegistry::new(self.sql, self.restconf))
    }
}
