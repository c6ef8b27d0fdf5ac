//! Storefront entry-point: settings, database, credentials, seeding, server.

mod server;

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use rand::RngCore;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use server::{Adapters, ServerConfig, build_http_state, create_server};
use storefront::domain::ports::PasswordHasher;
use storefront::inbound::http::health::HealthState;
use storefront::outbound::persistence::{
    DbPool, DieselCategoryRepository, DieselProductRepository, DieselUserRepository,
    MigrationError, PoolConfig, PoolError, run_pending_migrations,
};
use storefront::outbound::security::{Argon2PasswordHasher, JwtTokenCodec};
use storefront::seed::{SeedError, seed_store};
use storefront::settings::AppSettings;

const EPHEMERAL_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
enum StartupError {
    #[error("failed to load settings: {0}")]
    Config(String),
    #[error("invalid bind address: {0}")]
    BindAddr(#[from] std::net::AddrParseError),
    #[error("STOREFRONT_DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("failed to read token secret at {path}: {source}")]
    TokenSecret {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Migrations(#[from] MigrationError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("startup seeding failed: {0}")]
    Seed(#[from] SeedError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

/// Read the signing secret, or fall back to a random one outside release
/// builds or when explicitly allowed.
fn load_token_secret(settings: &AppSettings) -> Result<Zeroizing<Vec<u8>>, StartupError> {
    let path = settings.token_secret_file();
    match std::fs::read(path) {
        Ok(bytes) => Ok(Zeroizing::new(bytes)),
        Err(source) if cfg!(debug_assertions) || settings.allow_ephemeral_secret() => {
            warn!(path = %path.display(), error = %source, "using temporary token secret (dev only)");
            let mut secret = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
            rand::thread_rng().fill_bytes(secret.as_mut_slice());
            Ok(secret)
        }
        Err(source) => Err(StartupError::TokenSecret {
            path: path.to_path_buf(),
            source,
        }),
    }
}

async fn seed_on_startup(
    settings: &AppSettings,
    pool: &DbPool,
    hasher: &dyn PasswordHasher,
    clock: &dyn Clock,
) -> Result<(), StartupError> {
    if !settings.seed() {
        info!(reason = "disabled", "startup seeding skipped");
        return Ok(());
    }
    let outcome = seed_store(
        &DieselUserRepository::new(pool.clone()),
        &DieselCategoryRepository::new(pool.clone()),
        &DieselProductRepository::new(pool.clone()),
        hasher,
        clock,
        &settings.admin_seed(),
    )
    .await?;
    info!(
        categories = outcome.categories,
        products = outcome.products,
        "startup seeding finished"
    );
    Ok(())
}

#[cfg(feature = "metrics")]
fn attach_metrics(config: ServerConfig) -> ServerConfig {
    match server::storefront_metrics() {
        Ok(metrics) => config.with_metrics(Some(metrics)),
        Err(error) => {
            warn!(%error, "metrics disabled");
            config
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let settings = AppSettings::load().map_err(|err| StartupError::Config(err.to_string()))?;
    let bind_addr = settings.bind_addr()?;
    let database_url = settings
        .database_url()
        .ok_or(StartupError::MissingDatabaseUrl)?;

    if settings.run_migrations() {
        run_pending_migrations(database_url).await?;
    }
    let pool =
        DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size())).await?;

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let tokens = Arc::new(JwtTokenCodec::new(
        load_token_secret(&settings)?,
        settings.token_ttl(),
        clock.clone(),
    ));

    seed_on_startup(&settings, &pool, hasher.as_ref(), clock.as_ref()).await?;

    let http_state = build_http_state(Adapters {
        pool,
        hasher,
        tokens,
        clock,
    });
    let config = ServerConfig::new(bind_addr, http_state);
    #[cfg(feature = "metrics")]
    let config = attach_metrics(config);

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "storefront listening");
    create_server(health_state, config)?.await?;
    Ok(())
}

#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();
    run().await?;
    Ok(())
}
