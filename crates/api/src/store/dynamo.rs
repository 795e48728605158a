//! DynamoDB document store.
//!
//! Each [`Table`] maps to a DynamoDB table whose partition key is the table's
//! key attribute (string). Scans use `Limit` and `ExclusiveStartKey`; the
//! `LastEvaluatedKey` of a page becomes the next [`Cursor`].

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use tracing::{debug, info};

use mini_shop_core::Document;

use super::codec::{document_to_item, item_to_document};
use super::{Cursor, DocumentStore, Result, ScanPage, ScanRequest, StoreError, Table};
use crate::config::DynamoConfig;

/// DynamoDB implementation of `DocumentStore`.
#[derive(Clone)]
pub struct DynamoStore {
    client: Client,
}

impl DynamoStore {
    /// Create a client for the configured region and optional endpoint.
    ///
    /// Credentials come from the default AWS provider chain.
    pub async fn new(config: &DynamoConfig) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let client = if let Some(endpoint) = &config.endpoint_url {
            let dynamo_config = aws_sdk_dynamodb::config::Builder::from(&sdk_config)
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(dynamo_config)
        } else {
            Client::new(&sdk_config)
        };

        info!(
            region = %config.region,
            endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
            "Connected to DynamoDB"
        );

        Self { client }
    }
}

fn dynamo_error<E>(operation: &'static str, err: E) -> StoreError
where
    E: std::error::Error,
{
    StoreError::Dynamo {
        operation,
        message: DisplayErrorContext(err).to_string(),
    }
}

/// Build `ExclusiveStartKey` from a client cursor. Only the table's key
/// attribute is accepted so malformed cursors never reach DynamoDB.
fn exclusive_start_key(
    table: &Table,
    cursor: &Cursor,
) -> Result<HashMap<String, AttributeValue>> {
    let key = cursor.start_key(table)?;
    Ok(HashMap::from([(table.key.clone(), AttributeValue::S(key))]))
}

#[async_trait]
impl DocumentStore for DynamoStore {
    fn backend(&self) -> &'static str {
        "dynamodb"
    }

    async fn scan(&self, table: &Table, request: ScanRequest) -> Result<ScanPage> {
        let start_key = request
            .cursor
            .as_ref()
            .map(|cursor| exclusive_start_key(table, cursor))
            .transpose()?;

        let output = self
            .client
            .scan()
            .table_name(&table.name)
            .limit(i32::try_from(request.limit).unwrap_or(i32::MAX))
            .set_exclusive_start_key(start_key)
            .send()
            .await
            .map_err(|e| dynamo_error("scan", e))?;

        let items = output
            .items
            .unwrap_or_default()
            .iter()
            .map(item_to_document)
            .collect::<Result<Vec<_>>>()?;

        let next = match output.last_evaluated_key {
            Some(key) if !key.is_empty() => Some(Cursor::encode(&item_to_document(&key)?)?),
            _ => None,
        };

        debug!(
            table = %table.name,
            count = items.len(),
            more = next.is_some(),
            "Scanned DynamoDB page"
        );

        Ok(ScanPage { items, next })
    }

    async fn get(&self, table: &Table, key: &str) -> Result<Option<Document>> {
        let output = self
            .client
            .get_item()
            .table_name(&table.name)
            .key(&table.key, AttributeValue::S(key.to_string()))
            .send()
            .await
            .map_err(|e| dynamo_error("get_item", e))?;

        output.item.as_ref().map(item_to_document).transpose()
    }

    async fn put(&self, table: &Table, item: Document) -> Result<()> {
        let key = table.key_of(&item)?.to_string();

        self.client
            .put_item()
            .table_name(&table.name)
            .set_item(Some(document_to_item(&item)))
            .send()
            .await
            .map_err(|e| dynamo_error("put_item", e))?;

        debug!(table = %table.name, key = %key, "Stored item in DynamoDB");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .list_tables()
            .limit(1)
            .send()
            .await
            .map_err(|e| dynamo_error("list_tables", e))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_start_key_holds_only_table_key() {
        let table = Table::new("Products", "id");
        let cursor = Cursor::after_key(&table, "p7").unwrap();

        let key = exclusive_start_key(&table, &cursor).unwrap();
        assert_eq!(key.len(), 1);
        assert_eq!(key.get("id"), Some(&AttributeValue::S("p7".to_string())));
    }

    #[test]
    fn test_non_key_cursor_is_client_error() {
        let table = Table::new("Products", "id");
        let stray = json!({"foo": 1}).as_object().cloned().unwrap();
        let cursor = Cursor::encode(&stray).unwrap();

        let err = exclusive_start_key(&table, &cursor).unwrap_err();
        assert!(matches!(err, StoreError::InvalidCursor));
        assert!(err.is_client_error());
    }
}
