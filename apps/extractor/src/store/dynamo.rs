use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::config::ConfigError;
use crate::models::analysis::StoredAnalysis;
use crate::store::{PersistenceError, ResultStore};

/// DynamoDB backend. One `PutItem` per analysis, keyed by `id`.
#[derive(Clone)]
pub struct DynamoStore {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: String) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            table_name: require_table_name(table_name)?,
        })
    }
}

/// DynamoDB names are 3 to 255 characters of `[A-Za-z0-9_.-]`.
fn require_table_name(table_name: String) -> Result<String, ConfigError> {
    if table_name.trim().is_empty() {
        return Err(ConfigError::Missing("TABLE_NAME"));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-');
    if !(3..=255).contains(&table_name.len()) || !table_name.chars().all(allowed) {
        return Err(ConfigError::Invalid {
            key: "TABLE_NAME",
            reason: format!("'{table_name}' is not a valid DynamoDB table name"),
        });
    }
    Ok(table_name)
}

#[async_trait]
impl ResultStore for DynamoStore {
    fn table(&self) -> &str {
        &self.table_name
    }

    async fn put(&self, analysis: &StoredAnalysis) -> Result<(), PersistenceError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_attributes(analysis)))
            .send()
            .await
            .map_err(|e| PersistenceError::Write {
                table: self.table_name.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }
}

/// All attributes are stored as strings.
fn item_attributes(analysis: &StoredAnalysis) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("id".to_string(), AttributeValue::S(analysis.id.to_string())),
        (
            "fileName".to_string(),
            AttributeValue::S(analysis.file_name.clone()),
        ),
        (
            "analysisResult".to_string(),
            AttributeValue::S(analysis.analysis_result.clone()),
        ),
        (
            "timestamp".to_string(),
            AttributeValue::S(analysis.timestamp_iso()),
        ),
    ])
}
