//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `STOREFRONT_*` environment variables, and
//! configuration files. Accessors supply defaults for anything unset.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::seed::AdminSeed;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_SECRET_FILE: &str = "/var/run/secrets/token_secret";
const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_ADMIN_EMAIL: &str = "admin@organikkose.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STOREFRONT")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    pub pool_max_size: Option<u32>,
    /// File holding the token signing secret.
    pub token_secret_file: Option<PathBuf>,
    /// Generate a throwaway secret when the file is unreadable.
    pub allow_ephemeral_secret: Option<bool>,
    /// Bearer token lifetime in seconds.
    pub token_ttl_secs: Option<u64>,
    /// Recreate the admin account and fill an empty catalog at startup.
    pub seed: Option<bool>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Apply pending migrations before serving.
    pub run_migrations: Option<bool>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    pub fn token_secret_file(&self) -> &Path {
        self.token_secret_file
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_TOKEN_SECRET_FILE))
    }

    pub fn allow_ephemeral_secret(&self) -> bool {
        self.allow_ephemeral_secret.unwrap_or(false)
    }

    /// Seeding runs unless explicitly disabled.
    pub fn seed(&self) -> bool {
        self.seed.unwrap_or(true)
    }

    /// Migrations run unless explicitly disabled.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS))
    }

    pub fn admin_seed(&self) -> AdminSeed {
        AdminSeed {
            email: self
                .admin_email
                .clone()
                .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_owned()),
            password: self
                .admin_password
                .clone()
                .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "STOREFRONT_BIND_ADDR",
        "STOREFRONT_DATABASE_URL",
        "STOREFRONT_POOL_MAX_SIZE",
        "STOREFRONT_TOKEN_SECRET_FILE",
        "STOREFRONT_ALLOW_EPHEMERAL_SECRET",
        "STOREFRONT_TOKEN_TTL_SECS",
        "STOREFRONT_SEED",
        "STOREFRONT_ADMIN_EMAIL",
        "STOREFRONT_ADMIN_PASSWORD",
        "STOREFRONT_RUN_MIGRATIONS",
    ];

    fn load() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("storefront")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.pool_max_size(), 10);
        assert_eq!(settings.token_secret_file(), Path::new(DEFAULT_TOKEN_SECRET_FILE));
        assert_eq!(settings.token_ttl(), Duration::from_secs(86_400));
        assert!(!settings.allow_ephemeral_secret());
        assert!(settings.seed());
        assert!(settings.run_migrations());
        assert_eq!(settings.admin_seed().email, DEFAULT_ADMIN_EMAIL);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("STOREFRONT_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "STOREFRONT_DATABASE_URL",
                Some("postgres://shop@localhost/shop".to_owned()),
            ),
            ("STOREFRONT_POOL_MAX_SIZE", Some("4".to_owned())),
            ("STOREFRONT_TOKEN_SECRET_FILE", None),
            ("STOREFRONT_ALLOW_EPHEMERAL_SECRET", Some("true".to_owned())),
            ("STOREFRONT_TOKEN_TTL_SECS", Some("600".to_owned())),
            ("STOREFRONT_SEED", Some("false".to_owned())),
            ("STOREFRONT_ADMIN_EMAIL", Some("owner@shop.test".to_owned())),
            ("STOREFRONT_ADMIN_PASSWORD", None),
            ("STOREFRONT_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load();
        assert_eq!(settings.bind_addr().expect("address").port(), 9000);
        assert_eq!(settings.database_url(), Some("postgres://shop@localhost/shop"));
        assert_eq!(settings.pool_max_size(), 4);
        assert!(settings.allow_ephemeral_secret());
        assert_eq!(settings.token_ttl(), Duration::from_secs(600));
        assert!(!settings.seed());
        assert!(!settings.run_migrations());
        let admin = settings.admin_seed();
        assert_eq!(admin.email, "owner@shop.test");
        assert_eq!(admin.password, DEFAULT_ADMIN_PASSWORD);
    }

    #[rstest]
    fn startup_switches_can_be_enabled_individually() {
        let _guard = lock_env(VARS.map(|name| {
            let value = match name {
                "STOREFRONT_ALLOW_EPHEMERAL_SECRET" | "STOREFRONT_SEED" => Some("true".to_owned()),
                "STOREFRONT_RUN_MIGRATIONS" => Some("false".to_owned()),
                _ => None,
            };
            (name, value)
        }));

        let settings = load();
        assert!(settings.allow_ephemeral_secret());
        assert!(settings.seed());
        assert!(!settings.run_migrations());
    }

    #[rstest]
    fn blank_database_url_counts_as_unset() {
        let _guard = lock_env(VARS.map(|name| {
            (name, (name == "STOREFRONT_DATABASE_URL").then(|| "  ".to_owned()))
        }));
        assert!(load().database_url().is_none());
    }
}
