use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use userhub_user::{DeletePolicy, picture::PublicPathResolver, token::TokenTtl};

/// Ten years, in seconds.
const MAX_TOKEN_TTL: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Falls back to `secret` when unset
    #[serde(default)]
    pub refresh_secret: Option<String>,
    pub access_ttl: u64,
    pub refresh_ttl: u64,
}

impl JwtConfig {
    pub fn ttl(&self) -> TokenTtl {
        TokenTtl {
            access: self.access_ttl,
            refresh: self.refresh_ttl,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    #[serde(default = "default_role")]
    pub default_role: String,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default)]
    pub delete: DeleteConfig,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            default_role: default_role(),
            public_base_url: default_public_base_url(),
            delete: DeleteConfig::default(),
        }
    }
}

fn default_role() -> String {
    "user".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeleteConfig {
    #[serde(default = "default_true")]
    pub soft_delete: bool,
    #[serde(default)]
    pub prevent_delete_if_used: bool,
    #[serde(default = "default_true")]
    pub cascade: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            soft_delete: true,
            prevent_delete_if_used: false,
            cascade: true,
        }
    }
}

impl DeleteConfig {
    pub fn policy(&self) -> userhub_shared::Result<DeletePolicy> {
        DeletePolicy::new(self.soft_delete, self.prevent_delete_if_used, self.cascade)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Legacy variables (DATABASE_URL, JWT_SECRET, JWT_ACCESS_TOKEN_EXP, ...)
    /// 2. Environment variables (USERHUB__DATABASE__URL, etc.)
    /// 3. Config file specified by path
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("database.url", "sqlite:userhub.db")?
            .set_default("database.max_connections", 5)?
            .set_default("jwt.access_ttl", 3600)?
            .set_default("jwt.refresh_ttl", 86400)?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Optional, ignored when missing
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("USERHUB")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in [
            ("DATABASE_URL", "database.url"),
            ("JWT_SECRET", "jwt.secret"),
            ("JWT_REFRESH_SECRET", "jwt.refresh_secret"),
            ("JWT_ACCESS_TOKEN_EXP", "jwt.access_ttl"),
            ("JWT_REFRESH_TOKEN_EXP", "jwt.refresh_ttl"),
        ] {
            if let Ok(value) = env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt.secret.len() < 32 {
            return Err("JWT secret must be at least 32 characters long".to_string());
        }
        if self
            .jwt
            .refresh_secret
            .as_ref()
            .is_some_and(|secret| secret.len() < 32)
        {
            return Err("JWT refresh secret must be at least 32 characters long".to_string());
        }
        if self.jwt.access_ttl == 0 || self.jwt.refresh_ttl == 0 {
            return Err("JWT token lifetimes must be greater than 0".to_string());
        }
        if self.jwt.refresh_ttl > MAX_TOKEN_TTL {
            return Err(format!(
                "JWT token lifetimes must not exceed {MAX_TOKEN_TTL} seconds"
            ));
        }
        if self.jwt.refresh_ttl < self.jwt.access_ttl {
            return Err(
                "JWT refresh lifetime must not be shorter than the access lifetime".to_string(),
            );
        }
        if self.database.max_connections < 1 {
            return Err("Database max_connections must be at least 1".to_string());
        }
        self.user.delete.policy().map_err(|e| e.to_string())?;
        PublicPathResolver::new(&self.user.public_base_url).map_err(|e| e.to_string())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            database: DatabaseConfig {
                url: "sqlite:test.db".to_string(),
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: "test_secret_key_minimum_32_characters_long".to_string(),
                refresh_secret: None,
                access_ttl: 3600,
                refresh_ttl: 86400,
            },
            user: UserConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validation_short_secret() {
        let mut config = valid_config();
        config.jwt.secret = "short".to_string();
        assert!(config.validate().is_err());

        let mut other = valid_config();
        other.jwt.refresh_secret = Some("short".to_string());
        assert!(other.validate().is_err());
    }

    #[test]
    fn test_validation_token_lifetimes() {
        let mut config = valid_config();
        config.jwt.access_ttl = 0;
        assert!(config.validate().is_err());

        config.jwt.access_ttl = 7200;
        config.jwt.refresh_ttl = 3600;
        assert!(config.validate().is_err());

        config.jwt.refresh_ttl = u64::MAX;
        assert!(config.validate().is_err());

        config.jwt.access_ttl = MAX_TOKEN_TTL;
        config.jwt.refresh_ttl = MAX_TOKEN_TTL;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_connections() {
        let mut config = valid_config();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_public_base_url() {
        let mut config = valid_config();
        config.user.public_base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.user.public_base_url = "https://cdn.userhub.localhost/files".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_delete_policy() {
        let mut config = valid_config();
        config.user.delete.prevent_delete_if_used = true;
        assert!(config.validate().is_err());

        config.user.delete.cascade = false;
        assert!(config.validate().is_ok());
        assert!(config.user.delete.policy().unwrap().prevent_delete_if_used());
    }
}
