use async_trait::async_trait;
use sqlx::PgPool;

use crate::config::ConfigError;
use crate::models::analysis::StoredAnalysis;
use crate::store::{is_valid_table_name, PersistenceError, ResultStore};

/// PostgreSQL backend. Append-only: one INSERT per analysis, never UPDATE.
///
/// Expects the table from `migrations/0001_create_cv_analyses.sql`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    table_name: String,
    insert_sql: String,
}

impl PgStore {
    pub fn new(pool: PgPool, table_name: String) -> Result<Self, ConfigError> {
        let insert_sql = insert_statement(&table_name)?;
        Ok(Self {
            pool,
            table_name,
            insert_sql,
        })
    }
}

fn insert_statement(table_name: &str) -> Result<String, ConfigError> {
    if !is_valid_table_name(table_name) {
        return Err(ConfigError::Invalid {
            key: "TABLE_NAME",
            reason: format!("'{table_name}' is not a valid SQL table name"),
        });
    }
    Ok(format!(
        "INSERT INTO {table_name} (id, file_name, analysis_result, created_at) \
         VALUES ($1, $2, $3, $4)"
    ))
}

#[async_trait]
impl ResultStore for PgStore {
    fn table(&self) -> &str {
        &self.table_name
    }

    async fn put(&self, analysis: &StoredAnalysis) -> Result<(), PersistenceError> {
        sqlx::query(&self.insert_sql)
            .bind(analysis.id)
            .bind(&analysis.file_name)
            .bind(&analysis.analysis_result)
            .bind(analysis.timestamp)
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::Write {
                table: self.table_name.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_statement() {
        assert_eq!(
            insert_statement("cv_analyses").unwrap(),
            "INSERT INTO cv_analyses (id, file_name, analysis_result, created_at) VALUES ($1, $2, $3, $4)"
        );
    }

    #[test]
    fn test_insert_statement_rejects_injection() {
        let err = insert_statement("cv_analyses; DROP TABLE users").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TABLE_NAME", .. }));
    }
}
