//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresPaymentRepository`, backed by a `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag (on by default).
//!
//! # Schema
//!
//! One `payments` table. The database assigns `id`
//! (`gen_random_uuid()`), `status` (`'pending'`) and both timestamps
//! (`NOW()`) on insert; `INSERT ... RETURNING` hands them back in the same
//! statement.

use crate::config::DatabaseConfig;
use crate::core::error::{PaymentError, PaymentResult, TransactionStage};
use crate::core::payment::{NewPayment, Payment};
use crate::core::store::PaymentRepository;
use crate::query::{Column, QuerySpec, SqlArg, compile};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres, Transaction};
use std::str::FromStr;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Connection and schema management
// ---------------------------------------------------------------------------

/// Open a connection pool from `config`
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let options = match &config.url {
        Some(url) => PgConnectOptions::from_str(url)
            .map_err(|e| anyhow!("Invalid DATABASE_URL: {}", e))?,
        None => PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name)
            .ssl_mode(
                PgSslMode::from_str(&config.sslmode)
                    .map_err(|e| anyhow!("Invalid DB_SSLMODE '{}': {}", config.sslmode, e))?,
            ),
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| anyhow!("Failed to connect to PostgreSQL: {}", e))?;

    tracing::info!(
        host = %config.host,
        database = %config.name,
        max_connections = config.max_connections,
        "connected to PostgreSQL"
    );
    Ok(pool)
}

/// Create the `payments` table if it does not exist (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS payments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            tag TEXT NOT NULL,
            description TEXT NOT NULL,
            amount NUMERIC NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TIMESTAMPTZ DEFAULT NOW(),
            updated_at TIMESTAMPTZ DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create payments table: {}", e))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_payments_status ON payments (status)")
        .execute(pool)
        .await
        .map_err(|e| anyhow!("Failed to create payments status index: {}", e))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// PostgresPaymentRepository
// ---------------------------------------------------------------------------

/// Payment repository backed by PostgreSQL.
///
/// # Example
///
/// ```rust,ignore
/// use paystore::storage::postgres::{PostgresPaymentRepository, connect, ensure_schema};
///
/// let pool = connect(&config.database).await?;
/// ensure_schema(&pool).await?;
/// let repository = PostgresPaymentRepository::new(pool);
/// ```
#[derive(Clone, Debug)]
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

type PaymentQuery<'q> = QueryAs<'q, Postgres, Payment, PgArguments>;

fn returning(statement: &str) -> String {
    format!("{} RETURNING {}", statement, Column::select_list())
}

/// Bind compiled arguments in `$1..$n` order
fn bind_args<'q>(mut query: PaymentQuery<'q>, args: Vec<SqlArg>) -> PaymentQuery<'q> {
    for arg in args {
        query = match arg {
            SqlArg::Text(v) => query.bind(v),
            SqlArg::TextArray(v) => query.bind(v),
            SqlArg::Decimal(v) => query.bind(v),
            SqlArg::DecimalArray(v) => query.bind(v),
            SqlArg::Timestamp(v) => query.bind(v),
            SqlArg::TimestampArray(v) => query.bind(v),
            SqlArg::Uuid(v) => query.bind(v),
            SqlArg::UuidArray(v) => query.bind(v),
            SqlArg::BigInt(v) => query.bind(v),
        };
    }
    query
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> PaymentResult<Self::Tx> {
        self.pool
            .begin()
            .await
            .map_err(|e| PaymentError::transaction(TransactionStage::Begin, e))
    }

    async fn commit(&self, tx: Self::Tx) -> PaymentResult<()> {
        tx.commit()
            .await
            .map_err(|e| PaymentError::transaction(TransactionStage::Commit, e))
    }

    async fn rollback(&self, tx: Self::Tx) -> PaymentResult<()> {
        tx.rollback()
            .await
            .map_err(|e| PaymentError::transaction(TransactionStage::Rollback, e))
    }

    async fn fetch_with_query(&self, spec: &QuerySpec) -> PaymentResult<Vec<Payment>> {
        let compiled = compile(spec)?;
        tracing::debug!(sql = %compiled.sql, args = compiled.args.len(), "executing payment query");

        bind_args(sqlx::query_as::<_, Payment>(&compiled.sql), compiled.args)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PaymentError::store("list", None, e))
    }

    async fn fetch_by_id(&self, id: Uuid) -> PaymentResult<Payment> {
        let sql = format!("SELECT {} FROM payments WHERE id = $1", Column::select_list());
        sqlx::query_as::<_, Payment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PaymentError::store("get", Some(id), e))?
            .ok_or(PaymentError::NotFound { id })
    }

    async fn modify_status_by_id(&self, id: Uuid, status: &str) -> PaymentResult<Payment> {
        let sql = returning("UPDATE payments SET status = $1, updated_at = NOW() WHERE id = $2");
        sqlx::query_as::<_, Payment>(&sql)
            .bind(status)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PaymentError::store("update_status", Some(id), e))?
            .ok_or(PaymentError::NotFound { id })
    }

    async fn store(&self, tx: &mut Self::Tx, payment: NewPayment) -> PaymentResult<Payment> {
        let sql = returning("INSERT INTO payments (tag, description, amount) VALUES ($1, $2, $3)");
        sqlx::query_as::<_, Payment>(&sql)
            .bind(&payment.tag)
            .bind(&payment.description)
            .bind(&payment.amount)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| PaymentError::store("insert", None, e))
    }

    async fn remove(&self, id: Uuid) -> PaymentResult<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PaymentError::store("delete", Some(id), e))?;

        if result.rows_affected() == 0 {
            tracing::debug!(payment_id = %id, "delete matched no row");
        }
        Ok(())
    }
}
