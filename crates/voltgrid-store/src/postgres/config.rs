use std::env;
use std::time::Duration;

use voltgrid_core::error::{Result, VoltgridError};

/// Connection pool tuning
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// PostgreSQL adapter configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub pool: PoolConfig,
}

impl PostgresConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self { database_url: database_url.into(), pool: PoolConfig::default() }
    }

    /// Read the connection string from `DATABASE_URL`.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| VoltgridError::ConfigMissing { key: "DATABASE_URL".to_string() })?;
        Ok(Self::new(database_url))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(VoltgridError::ConfigInvalid {
                key: "database_url".to_string(),
                reason: "must start with postgres:// or postgresql://".to_string(),
            });
        }
        if self.pool.max_connections == 0 || self.pool.max_connections < self.pool.min_connections
        {
            return Err(VoltgridError::ConfigInvalid {
                key: "pool.max_connections".to_string(),
                reason: "must be at least 1 and not below min_connections".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_postgres_urls() {
        assert!(PostgresConfig::new("postgres://localhost/voltgrid").validate().is_ok());
        assert!(PostgresConfig::new("postgresql://localhost/voltgrid").validate().is_ok());
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(PostgresConfig::new("mysql://localhost/voltgrid").validate().is_err());
    }

    #[test]
    fn rejects_zero_sized_pool() {
        let mut config = PostgresConfig::new("postgres://localhost/voltgrid");
        config.pool.max_connections = 0;
        assert!(config.validate().is_err());
    }
}
