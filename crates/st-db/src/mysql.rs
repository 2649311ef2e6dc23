//! MySQL warehouse backend
//!
//! Wraps a single `MySqlConnection`: the pipeline holds exactly one
//! session for the duration of a run and executes statements strictly in
//! order through it. Statements go over the text protocol (`raw_sql`) so
//! that stored-routine bodies with embedded `;` terminators execute as a
//! single statement.

use crate::error::{DbError, DbResult};
use crate::ident::quote_ident;
use crate::traits::Warehouse;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Executor, MySql, QueryBuilder};
use st_core::WarehouseConfig;
use tokio::sync::Mutex;

/// MySQL warehouse backend
pub struct MySqlWarehouse {
    conn: Mutex<MySqlConnection>,
}

impl MySqlWarehouse {
    /// Connect to the server and select the target database, creating it
    /// if it does not exist.
    pub async fn connect(config: &WarehouseConfig) -> DbResult<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password);

        // Server-level connect first: the target database may not exist yet
        let mut conn = options
            .connect()
            .await
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        let database = quote_ident(&config.database);
        sqlx::raw_sql(&format!("CREATE DATABASE IF NOT EXISTS {}", database))
            .execute(&mut conn)
            .await?;
        sqlx::raw_sql(&format!("USE {}", database))
            .execute(&mut conn)
            .await?;

        log::debug!("connected to warehouse {}", config.endpoint());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl Warehouse for MySqlWarehouse {
    async fn execute(&self, sql: &str) -> DbResult<u64> {
        let mut conn = self.conn.lock().await;
        let result = (&mut *conn).execute(sqlx::raw_sql(sql)).await?;
        Ok(result.rows_affected())
    }

    async fn count_rows(&self, table: &str) -> DbResult<u64> {
        let mut conn = self.conn.lock().await;
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", quote_ident(table)))
                .fetch_one(&mut *conn)
                .await?;
        Ok(count as u64)
    }

    async fn insert_batch(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<String>],
    ) -> DbResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) ",
            quote_ident(table),
            column_list
        ));
        builder.push_values(rows, |mut b, row| {
            for value in row {
                b.push_bind(value.as_str());
            }
        });

        let mut conn = self.conn.lock().await;
        let result = builder.build().execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    async fn begin(&self) -> DbResult<()> {
        self.execute("START TRANSACTION").await?;
        Ok(())
    }

    async fn commit(&self) -> DbResult<()> {
        self.execute("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&self) -> DbResult<()> {
        let mut conn = self.conn.lock().await;
        (&mut *conn)
            .execute(sqlx::raw_sql("ROLLBACK"))
            .await
            .map_err(|e| DbError::RollbackError(e.to_string()))?;
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "mysql"
    }
}
