//! Adapter registry - maps configured identifiers to adapter factories.
//!
//! The adapter named by `auth.adapter` is built once at start-up. Built-ins
//! are registered by [`AdapterRegistry::with_defaults`]; applications add
//! their own with [`AdapterRegistry::register`].

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::PgPool;

use super::{
    DatabaseAuthAdapter, DirectoryAuthAdapter, DisabledAdapter, MockAuthAdapter,
    TokenAuthAdapter, DATABASE_ADAPTER_ID, DIRECTORY_ADAPTER_ID, MOCK_ADAPTER_ID,
    TOKEN_ADAPTER_ID,
};
use crate::config::AuthConfig;
use crate::domain::auth::ConfigurationError;
use crate::ports::AuthAdapter;

/// Shared infrastructure handed to adapter factories.
#[derive(Debug, Clone, Default)]
pub struct AdapterResources {
    pub pool: Option<PgPool>,
}

impl AdapterResources {
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool: Some(pool) }
    }
}

pub type AdapterFactory = Box<
    dyn Fn(&AuthConfig, &AdapterResources) -> Result<Arc<dyn AuthAdapter>, ConfigurationError>
        + Send
        + Sync,
>;

#[derive(Default)]
pub struct AdapterRegistry {
    factories: HashMap<String, AdapterFactory>,
}

impl AdapterRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the mock, database, directory and token adapters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(MOCK_ADAPTER_ID, |config, _| {
            let settings = config
                .mock
                .as_ref()
                .ok_or_else(|| ConfigurationError::missing("auth.mock"))?;
            Ok(Arc::new(MockAuthAdapter::from_settings(settings)?))
        });

        registry.register(DATABASE_ADAPTER_ID, |config, resources| {
            let settings = config
                .database
                .as_ref()
                .ok_or_else(|| ConfigurationError::missing("auth.database"))?;
            let pool = resources
                .pool
                .clone()
                .ok_or_else(|| ConfigurationError::missing("database.url"))?;
            Ok(Arc::new(DatabaseAuthAdapter::new(pool, settings)?))
        });

        registry.register(DIRECTORY_ADAPTER_ID, |config, _| {
            let settings = config
                .directory
                .as_ref()
                .ok_or_else(|| ConfigurationError::missing("auth.directory"))?;
            Ok(Arc::new(DirectoryAuthAdapter::new(settings)?))
        });

        registry.register(TOKEN_ADAPTER_ID, |config, _| {
            let settings = config
                .token
                .as_ref()
                .ok_or_else(|| ConfigurationError::missing("auth.token"))?;
            Ok(Arc::new(TokenAuthAdapter::new(settings)?))
        });

        registry
    }

    /// Adds or replaces the factory for `identifier`.
    pub fn register<F>(&mut self, identifier: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&AuthConfig, &AdapterResources) -> Result<Arc<dyn AuthAdapter>, ConfigurationError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(identifier.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    /// Builds the adapter `config` selects.
    pub fn resolve(
        &self,
        config: &AuthConfig,
        resources: &AdapterResources,
    ) -> Result<Arc<dyn AuthAdapter>, ConfigurationError> {
        if !config.enabled {
            tracing::info!("Authentication disabled");
            return Ok(Arc::new(DisabledAdapter));
        }

        let identifier = config.adapter.trim();
        if identifier.is_empty() {
            return Err(ConfigurationError::missing("auth.adapter"));
        }
        let factory = self
            .factories
            .get(identifier)
            .ok_or_else(|| ConfigurationError::UnknownAdapter(identifier.to_string()))?;

        let adapter = factory(config, resources)?;
        tracing::info!(adapter = %adapter.identifier(), "Auth adapter bound");
        Ok(adapter)
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("AdapterRegistry")
            .field("adapters", &names)
            .finish()
    }
}
