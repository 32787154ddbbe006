use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tracing::info;

use claimdesk_core::config::AppConfig;
use claimdesk_core::errors::RepositoryError;
use claimdesk_core::workflow::ClaimWorkflow;
use claimdesk_db::{connect_with_settings, migrations, DbPool, SqlClaimRepository};

use crate::routes::{self, AppState};
use crate::sessions::SessionManager;
use crate::storage::LocalDocumentStore;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub router: Router,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("seeding sample data failed: {0}")]
    Seed(#[source] RepositoryError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let repository = SqlClaimRepository::new(db_pool.clone());
    if seed_requested() {
        claimdesk_db::fixtures::seed(&repository).await.map_err(BootstrapError::Seed)?;
        info!(event_name = "system.bootstrap.sample_data_seeded", "sample claims seeded");
    }

    let documents = LocalDocumentStore::new(config.uploads.root_dir.clone());
    let workflow = ClaimWorkflow::new(repository, documents, config.uploads.policy());
    let state = AppState { workflow: Arc::new(workflow), sessions: SessionManager::default() };

    let router = routes::router(state).merge(crate::health::router(db_pool.clone()));

    Ok(Application { config, db_pool, router })
}

fn seed_requested() -> bool {
    std::env::var("CLAIMDESK_SEED_SAMPLE_DATA")
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
