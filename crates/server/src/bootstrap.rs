use std::sync::Arc;

use munchy_agent::{LlmClient, OllamaClient, ResponseCache, Resolver, RuleEngine, SessionStore};
use munchy_core::config::{AppConfig, ConfigError, LoadOptions};
use munchy_db::repositories::RepositoryError;
use munchy_db::{connect_with_settings, migrations, DbPool, SqlCatalogRepository};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub resolver: Arc<Resolver>,
    pub llm: Arc<dyn LlmClient>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("catalog snapshot load failed: {0}")]
    CatalogLoad(#[source] RepositoryError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let catalog = SqlCatalogRepository::new(db_pool.clone())
        .load_snapshot()
        .await
        .map_err(BootstrapError::CatalogLoad)?;
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        restaurants = catalog.restaurant_count(),
        orders = catalog.order_count(),
        "catalog snapshot loaded"
    );

    let llm: Arc<dyn LlmClient> = Arc::new(OllamaClient::new(&config.llm));
    let resolver = Arc::new(Resolver::new(
        RuleEngine::new(Arc::new(catalog), config.chat.support_phone.clone()),
        ResponseCache::new(),
        SessionStore::new(config.chat.max_history),
        llm.clone(),
        config.chat.default_session_id.clone(),
    ));

    Ok(Application { config, db_pool, resolver, llm })
}

#[cfg(test)]
mod tests {
    use munchy_core::config::{ConfigOverrides, LoadOptions};
    use munchy_db::DemoSeedDataset;

    use super::{bootstrap, BootstrapError};

    fn memory_options(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_prepares_schema_and_wires_the_resolver() {
        let app = bootstrap(memory_options("sqlite::memory:?cache=shared"))
            .await
            .expect("bootstrap should succeed against an in-memory database");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
             AND name IN ('restaurant', 'menu_item', 'customer_order', 'conversation')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("baseline tables should exist after bootstrap");
        assert_eq!(table_count, 4);

        // Rule replies work even with an empty catalog.
        let resolution = app.resolver.resolve("hi", Some("boot-test")).await;
        assert!(resolution.reply.contains("Hello"));

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_snapshot_covers_seeded_catalog() {
        let options = memory_options("sqlite::memory:?cache=shared");

        // Seed through a separate bootstrap pass, then bootstrap again so the
        // snapshot load observes the seeded rows.
        let first = bootstrap(options).await.expect("first bootstrap");
        DemoSeedDataset::load(&first.db_pool).await.expect("seed fixtures");

        let resolution = {
            let catalog = munchy_db::SqlCatalogRepository::new(first.db_pool.clone())
                .load_snapshot()
                .await
                .expect("reload snapshot");
            assert_eq!(catalog.restaurant_count(), 6);

            let rules = munchy_agent::RuleEngine::new(std::sync::Arc::new(catalog), "1800-1234-5678");
            rules.evaluate("ORD100000")
        };
        assert!(matches!(resolution, munchy_agent::MatchOutcome::Matched(reply) if reply.contains("DELIVERED")));

        first.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_invalid_config() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("postgres://nope".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        assert!(matches!(result, Err(BootstrapError::Config(_))));
    }
}
