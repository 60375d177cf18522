//! Like table integration using Dynamo DB
//!
//! Records are keyed by (`partition_key`, `row_key`) and carry a numeric `like_count`
//! that is only ever changed through an atomic `ADD` update.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::SdkError,
    types::{
        AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType, ReturnValue,
        ScalarAttributeType, TableStatus,
    },
    Client as DynamoDbClient,
};
use futures::{stream, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::{ImageLike, ImageLikeAttribute, LikeStorageError, LikeStorageResult, LikeTable};

/// Maximum number of concurrent deletes issued when clearing a partition
const DELETE_CONCURRENCY: usize = 8;

/// Like table client for Dynamo DB operations
pub struct DynamoDbLikeTable {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl DynamoDbLikeTable {
    /// Creates a new like table client
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured Dynamo DB client
    /// * `table_name` - Dynamo DB table name for like records
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }

    /// Name of the backing table
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn key(partition_key: &str, row_key: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (
                ImageLikeAttribute::PartitionKey.to_string(),
                AttributeValue::S(partition_key.to_string()),
            ),
            (
                ImageLikeAttribute::RowKey.to_string(),
                AttributeValue::S(row_key.to_string()),
            ),
        ])
    }

    /// Current status of the table, `None` when it does not exist
    async fn table_status(&self) -> LikeStorageResult<Option<TableStatus>> {
        match self
            .dynamodb_client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
        {
            Ok(output) => Ok(output
                .table()
                .and_then(|table| table.table_status())
                .cloned()),
            Err(SdkError::ServiceError(service_err))
                if service_err.err().is_resource_not_found_exception() =>
            {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn check_status(&self, status: &TableStatus) -> LikeStorageResult<()> {
        if matches!(status, TableStatus::Deleting) {
            return Err(LikeStorageError::TableBeingDeleted(self.table_name.clone()));
        }
        debug!("Table {} is {}", self.table_name, status.as_str());
        Ok(())
    }

    async fn create_table(&self) -> LikeStorageResult<()> {
        let key_attribute = |name: ImageLikeAttribute| {
            AttributeDefinition::builder()
                .attribute_name(name.to_string())
                .attribute_type(ScalarAttributeType::S)
                .build()
                .map_err(|e| LikeStorageError::SerializationError(e.to_string()))
        };
        let key_schema = |name: ImageLikeAttribute, key_type: KeyType| {
            KeySchemaElement::builder()
                .attribute_name(name.to_string())
                .key_type(key_type)
                .build()
                .map_err(|e| LikeStorageError::SerializationError(e.to_string()))
        };

        let result = self
            .dynamodb_client
            .create_table()
            .table_name(&self.table_name)
            .billing_mode(BillingMode::PayPerRequest)
            .attribute_definitions(key_attribute(ImageLikeAttribute::PartitionKey)?)
            .attribute_definitions(key_attribute(ImageLikeAttribute::RowKey)?)
            .key_schema(key_schema(ImageLikeAttribute::PartitionKey, KeyType::Hash)?)
            .key_schema(key_schema(ImageLikeAttribute::RowKey, KeyType::Range)?)
            .send()
            .await;

        match result {
            Ok(_) => {
                info!("Created likes table {}", self.table_name);
                Ok(())
            }
            // Lost a creation race, or the old table is still on its way out
            Err(SdkError::ServiceError(service_err))
                if service_err.err().is_resource_in_use_exception() =>
            {
                match self.table_status().await? {
                    Some(status) => self.check_status(&status),
                    None => Err(LikeStorageError::TableBeingDeleted(self.table_name.clone())),
                }
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl LikeTable for DynamoDbLikeTable {
    async fn ensure_table(&self) -> LikeStorageResult<()> {
        match self.table_status().await? {
            Some(status) => self.check_status(&status),
            None => self.create_table().await,
        }
    }

    async fn get(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> LikeStorageResult<Option<ImageLike>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(partition_key, row_key)))
            .consistent_read(true)
            .send()
            .await?;

        let item = response
            .item()
            .map(|item| serde_dynamo::from_item(item.clone()))
            .transpose()?;

        Ok(item)
    }

    async fn query_partition(&self, partition_key: &str) -> LikeStorageResult<Vec<ImageLike>> {
        let mut likes = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let response = self
                .dynamodb_client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#pk = :pk")
                .expression_attribute_names("#pk", ImageLikeAttribute::PartitionKey.to_string())
                .expression_attribute_values(":pk", AttributeValue::S(partition_key.to_string()))
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await?;

            let items = response.items().to_vec();
            likes.extend(serde_dynamo::from_items::<_, ImageLike>(items)?);

            match response.last_evaluated_key() {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(likes)
    }

    async fn increment(&self, partition_key: &str, row_key: &str) -> LikeStorageResult<ImageLike> {
        let response = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(partition_key, row_key)))
            .update_expression("ADD #like_count :one")
            .expression_attribute_names("#like_count", ImageLikeAttribute::LikeCount.to_string())
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await?;

        let like_count = response
            .attributes()
            .and_then(|attributes| attributes.get(&ImageLikeAttribute::LikeCount.to_string()))
            .and_then(|value| value.as_n().ok())
            .and_then(|count| count.parse::<u64>().ok())
            .ok_or_else(|| LikeStorageError::MissingLikeCount(row_key.to_string()))?;

        Ok(ImageLike {
            partition_key: partition_key.to_string(),
            row_key: row_key.to_string(),
            like_count,
        })
    }

    async fn delete(&self, partition_key: &str, row_key: &str) -> LikeStorageResult<()> {
        self.dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(partition_key, row_key)))
            .send()
            .await?;

        Ok(())
    }

    async fn delete_partition(&self, partition_key: &str) -> LikeStorageResult<usize> {
        let likes = self.query_partition(partition_key).await?;
        let removed = likes.len();

        stream::iter(likes)
            .map(|like| async move { self.delete(&like.partition_key, &like.row_key).await })
            .buffer_unordered(DELETE_CONCURRENCY)
            .try_collect::<Vec<()>>()
            .await?;

        debug!("Deleted {removed} like records from partition {partition_key}");
        Ok(removed)
    }
}
