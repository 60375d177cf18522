use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use gallery::{
    media_storage::{ImageStore, MediaStorage},
    server,
    types::Environment,
};
use like_storage::{dynamodb::DynamoDbLikeTable, ImageLikeService, RetryPolicy};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // JSON logs for staging/production, plain text for development
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let image_store: Arc<dyn ImageStore> = Arc::new(MediaStorage::new(
        s3_client,
        environment.s3_bucket(),
        environment.image_base_url(),
    ));

    let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));
    let likes_table = Arc::new(DynamoDbLikeTable::new(
        dynamodb_client,
        environment.likes_table_name(),
    ));
    let like_service =
        Arc::new(ImageLikeService::initialize(likes_table, &RetryPolicy::default()).await?);

    server::start(environment, image_store, like_service).await
}
