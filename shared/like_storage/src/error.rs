//! Error types for like storage operations

use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::{
    create_table::CreateTableError, delete_item::DeleteItemError,
    describe_table::DescribeTableError, get_item::GetItemError, query::QueryError,
    update_item::UpdateItemError,
};
use thiserror::Error;

/// Result type for like storage operations
pub type LikeStorageResult<T> = Result<T, LikeStorageError>;

/// Errors that can occur during like storage operations
#[derive(Error, Debug)]
pub enum LikeStorageError {
    /// Failed to describe the likes table
    #[error("Failed to describe likes table: {}", DisplayErrorContext(.0))]
    DynamoDbDescribeError(#[from] SdkError<DescribeTableError>),

    /// Failed to create the likes table
    #[error("Failed to create likes table: {}", DisplayErrorContext(.0))]
    DynamoDbCreateError(#[from] SdkError<CreateTableError>),

    /// Failed to get a like record from Dynamo DB
    #[error("Failed to get like record from DynamoDB: {}", DisplayErrorContext(.0))]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Failed to query like records from Dynamo DB
    #[error("Failed to query like records from DynamoDB: {}", DisplayErrorContext(.0))]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Failed to increment a like record in Dynamo DB
    #[error("Failed to update like record in DynamoDB: {}", DisplayErrorContext(.0))]
    DynamoDbUpdateError(#[from] SdkError<UpdateItemError>),

    /// Failed to delete a like record from Dynamo DB
    #[error("Failed to delete like record from DynamoDB: {}", DisplayErrorContext(.0))]
    DynamoDbDeleteError(#[from] SdkError<DeleteItemError>),

    /// The table exists but is still being deleted, so it can neither be used nor recreated yet
    #[error("Table {0} is being deleted")]
    TableBeingDeleted(String),

    /// A transient condition outlived the retry policy
    #[error("Gave up after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made, including the first
        attempts: u32,
        /// The error returned by the final attempt
        #[source]
        source: Box<LikeStorageError>,
    },

    /// Serialization error for `serde_dynamo`
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The update succeeded but the new count was missing from the response
    #[error("Missing like count in response for {0}")]
    MissingLikeCount(String),

    /// Failure reported by a non-AWS backend
    #[error("Like table backend error: {0}")]
    Backend(String),
}

impl LikeStorageError {
    /// Whether the error is a transient conflict worth retrying
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TableBeingDeleted(_))
    }
}

impl From<serde_dynamo::Error> for LikeStorageError {
    fn from(error: serde_dynamo::Error) -> Self {
        Self::SerializationError(error.to_string())
    }
}
