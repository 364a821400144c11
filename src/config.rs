use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::db::DEFAULT_DATABASE_PATH;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_path: String,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_expiry_minutes: i64,
    pub cors_allowed_origin: Option<String>,
    pub static_dir: Option<PathBuf>,
}

/// `DATABASE_PATH`, falling back to the default store file. Shared with the
/// maintenance binary, which needs no signing secret.
pub fn database_path<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("DATABASE_PATH")
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = database_path(&lookup);
        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .context("PORT must be a valid u16")?;
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|value| !value.is_empty())
            .context("JWT_SECRET must be set")?;
        let jwt_issuer = lookup("JWT_ISSUER").unwrap_or_else(|| "advocacia".to_string());
        let jwt_audience =
            lookup("JWT_AUDIENCE").unwrap_or_else(|| "advocacia-clients".to_string());
        let jwt_expiry_minutes = lookup("JWT_EXPIRY_MINUTES")
            .unwrap_or_else(|| "480".to_string())
            .parse()
            .context("JWT_EXPIRY_MINUTES must be an integer")?;
        let cors_allowed_origin = lookup("CORS_ALLOWED_ORIGIN");
        let static_dir = lookup("STATIC_DIR").map(PathBuf::from);

        Ok(Self {
            database_path,
            server_host,
            server_port,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            jwt_expiry_minutes,
            cors_allowed_origin,
            static_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{database_path, AppConfig};

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = config_from(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.database_path, "advocacia.db");
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.jwt_expiry_minutes, 480);
        assert!(config.cors_allowed_origin.is_none());
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn requires_signing_secret() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("JWT_SECRET", "")]).is_err());
    }

    #[test]
    fn rejects_invalid_port() {
        let err = config_from(&[("JWT_SECRET", "x"), ("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("JWT_SECRET", "x"),
            ("PORT", "3000"),
            ("DATABASE_PATH", "/var/lib/advocacia/data.db"),
            ("STATIC_DIR", "public"),
        ])
        .unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.database_path, "/var/lib/advocacia/data.db");
        assert_eq!(config.static_dir.unwrap().to_str(), Some("public"));
    }

    #[test]
    fn database_path_without_signing_secret() {
        assert_eq!(database_path(|_| None), "advocacia.db");
        assert_eq!(database_path(|_| Some(String::new())), "advocacia.db");
        assert_eq!(
            database_path(|key| (key == "DATABASE_PATH").then(|| "/srv/escritorio.db".to_string())),
            "/srv/escritorio.db"
        );
    }
}
