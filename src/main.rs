//! Payment API server
//!
//! Reads configuration from the environment (and `.env`), or from the YAML
//! file named by `CONFIG_FILE`, connects to PostgreSQL, makes sure the
//! schema exists and serves the REST API until SIGINT/SIGTERM.

use anyhow::Result;
use paystore::config::AppConfig;
use paystore::server::ServerBuilder;
use paystore::storage::PostgresPaymentRepository;
use paystore::storage::postgres::{connect, ensure_schema};
use paystore::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_yaml_file(&path)?,
        Err(_) => AppConfig::from_env()?,
    };
    telemetry::init(config.log_format);

    if config.is_production() && config.auth_token.is_none() {
        anyhow::bail!("AUTH_TOKEN must be set when ENV=production");
    }

    tracing::info!(
        environment = %config.environment,
        port = config.port,
        operation_timeout_ms = ?config.operation_timeout_ms,
        "starting payment API"
    );

    let pool = connect(&config.database).await?;
    ensure_schema(&pool).await?;

    ServerBuilder::new(PostgresPaymentRepository::new(pool))
        .with_auth_token(config.auth_token.clone())
        .with_operation_timeout(config.operation_timeout())
        .serve(config.listen_addr())
        .await
}
