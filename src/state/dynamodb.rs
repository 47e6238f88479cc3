//! # DynamoDB Backend
//!
//! [`StateBackend`] on Amazon DynamoDB.
//!
//! Table schema created on demand:
//! - partition key `type` (S), sort key `name` (S)
//! - global secondary index `type_name` (S) / `last_updated` (S), projecting all attributes
//! - on-demand (pay-per-request) billing
//!
//! Credentials and region come from the default AWS provider chain;
//! `EDEN_AWS_REGION` and `EDEN_DYNAMODB_ENDPOINT` override them.

use crate::config::Settings;
use crate::state::backend::{BackendError, Item, StateBackend, TableStatus};
use crate::state::schema::{
    ATTR_LAST_UPDATED, ATTR_NAME, ATTR_TYPE, ATTR_TYPE_NAME, INDEX_TYPE_NAME_LAST_UPDATED,
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_dynamodb::config::timeout::TimeoutConfig;
use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, GlobalSecondaryIndex, KeySchemaElement,
    KeyType, Projection, ProjectionType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info_span, Instrument};

/// Service error codes that mean the caller could not be authenticated
const CREDENTIAL_ERROR_CODES: [&str; 4] = [
    "UnrecognizedClientException",
    "InvalidSignatureException",
    "ExpiredTokenException",
    "MissingAuthenticationTokenException",
];

/// DynamoDB-backed state table
pub struct DynamoDbBackend {
    client: Client,
}

impl std::fmt::Debug for DynamoDbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoDbBackend").finish_non_exhaustive()
    }
}

impl DynamoDbBackend {
    /// Load the shared AWS configuration and build a backend from it
    pub async fn from_settings(settings: &Settings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &settings.aws_region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;
        Self::new(&sdk_config, settings)
    }

    /// Build a DynamoDB client from shared config plus eden's overrides
    #[must_use]
    pub fn new(sdk_config: &SdkConfig, settings: &Settings) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);

        if let Some(region) = &settings.aws_region {
            builder = builder.region(Region::new(region.clone()));
        }

        // LocalStack / DynamoDB Local
        if let Some(endpoint) = &settings.dynamodb_endpoint {
            debug!("Using DynamoDB endpoint {}", endpoint);
            builder = builder.endpoint_url(endpoint);
        }

        if let Some(timeout_ms) = settings.remote_timeout_ms {
            let timeout_config = TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(timeout_ms))
                .build();
            builder = builder.timeout_config(timeout_config);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

/// Classify an SDK failure of any operation
fn classify<E, R>(error: SdkError<E, R>) -> BackendError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    match error.as_service_error() {
        Some(service_error) => classify_service(
            service_error.code(),
            service_error
                .message()
                .map_or_else(|| service_error.to_string(), str::to_string),
        ),
        None => classify_transport(DisplayErrorContext(&error).to_string()),
    }
}

fn classify_service(code: Option<&str>, message: String) -> BackendError {
    match code {
        Some("ResourceNotFoundException") => BackendError::TableNotFound,
        Some(code) if CREDENTIAL_ERROR_CODES.contains(&code) => BackendError::Credentials(message),
        Some(code) => BackendError::Service {
            code: code.to_string(),
            message,
        },
        None => BackendError::Unknown(message),
    }
}

/// Failures raised before a response arrived (credentials, dispatch, timeout)
fn classify_transport(context: String) -> BackendError {
    if context.to_lowercase().contains("credentials") {
        BackendError::Credentials(context)
    } else {
        BackendError::Unknown(context)
    }
}

fn build_error(error: BuildError) -> BackendError {
    BackendError::Unknown(error.to_string())
}

fn attribute(name: &str) -> Result<AttributeDefinition, BackendError> {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .map_err(build_error)
}

fn key(name: &str, key_type: KeyType) -> Result<KeySchemaElement, BackendError> {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .map_err(build_error)
}

/// String view of a DynamoDB item; non-scalar attributes are skipped
fn from_attributes(item: &HashMap<String, AttributeValue>) -> Item {
    item.iter()
        .filter_map(|(name, value)| match value {
            AttributeValue::S(s) | AttributeValue::N(s) => Some((name.clone(), s.clone())),
            _ => None,
        })
        .collect()
}

fn to_attributes(item: Item) -> HashMap<String, AttributeValue> {
    item.into_iter()
        .map(|(name, value)| (name, AttributeValue::S(value)))
        .collect()
}

fn parse_status(status: Option<&aws_sdk_dynamodb::types::TableStatus>) -> TableStatus {
    status.map_or_else(
        || TableStatus::Other("UNKNOWN".to_string()),
        |s| TableStatus::from_status(s.as_str()),
    )
}

#[async_trait]
impl StateBackend for DynamoDbBackend {
    async fn describe_table(&self, table: &str) -> Result<TableStatus, BackendError> {
        let response = self
            .client
            .describe_table()
            .table_name(table)
            .send()
            .instrument(info_span!("dynamodb.describe_table", table = table))
            .await
            .map_err(classify)?;

        Ok(parse_status(
            response.table().and_then(|t| t.table_status()),
        ))
    }

    async fn create_table(&self, table: &str) -> Result<TableStatus, BackendError> {
        let index = GlobalSecondaryIndex::builder()
            .index_name(INDEX_TYPE_NAME_LAST_UPDATED)
            .key_schema(key(ATTR_TYPE_NAME, KeyType::Hash)?)
            .key_schema(key(ATTR_LAST_UPDATED, KeyType::Range)?)
            .projection(
                Projection::builder()
                    .projection_type(ProjectionType::All)
                    .build(),
            )
            .build()
            .map_err(build_error)?;

        let response = self
            .client
            .create_table()
            .table_name(table)
            .attribute_definitions(attribute(ATTR_TYPE)?)
            .attribute_definitions(attribute(ATTR_NAME)?)
            .attribute_definitions(attribute(ATTR_TYPE_NAME)?)
            .attribute_definitions(attribute(ATTR_LAST_UPDATED)?)
            .key_schema(key(ATTR_TYPE, KeyType::Hash)?)
            .key_schema(key(ATTR_NAME, KeyType::Range)?)
            .global_secondary_indexes(index)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .instrument(info_span!("dynamodb.create_table", table = table))
            .await
            .map_err(classify)?;

        Ok(parse_status(
            response
                .table_description()
                .and_then(|d| d.table_status()),
        ))
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<(), BackendError> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(to_attributes(item)))
            .send()
            .instrument(info_span!("dynamodb.put_item", table = table))
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        partition: &str,
        sort: &str,
    ) -> Result<Option<Item>, BackendError> {
        let response = self
            .client
            .get_item()
            .table_name(table)
            .key(ATTR_TYPE, AttributeValue::S(partition.to_string()))
            .key(ATTR_NAME, AttributeValue::S(sort.to_string()))
            .consistent_read(true)
            .send()
            .instrument(info_span!("dynamodb.get_item", table = table))
            .await
            .map_err(classify)?;

        Ok(response.item().map(from_attributes))
    }

    async fn delete_item(
        &self,
        table: &str,
        partition: &str,
        sort: &str,
    ) -> Result<(), BackendError> {
        self.client
            .delete_item()
            .table_name(table)
            .key(ATTR_TYPE, AttributeValue::S(partition.to_string()))
            .key(ATTR_NAME, AttributeValue::S(sort.to_string()))
            .send()
            .instrument(info_span!("dynamodb.delete_item", table = table))
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn query(&self, table: &str, partition: &str) -> Result<Vec<Item>, BackendError> {
        let mut items = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let mut request = self
                .client
                .query()
                .table_name(table)
                .key_condition_expression("#t = :t")
                .expression_attribute_names("#t", ATTR_TYPE)
                .expression_attribute_values(":t", AttributeValue::S(partition.to_string()));

            if let Some(key) = last_evaluated_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }

            let response = request
                .send()
                .instrument(info_span!("dynamodb.query", table = table))
                .await
                .map_err(classify)?;

            items.extend(response.items().iter().map(from_attributes));

            match response.last_evaluated_key() {
                Some(key) if !key.is_empty() => last_evaluated_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn scan(&self, table: &str) -> Result<Vec<Item>, BackendError> {
        let mut items = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let mut request = self.client.scan().table_name(table);

            if let Some(key) = last_evaluated_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }

            let response = request
                .send()
                .instrument(info_span!("dynamodb.scan", table = table))
                .await
                .map_err(classify)?;

            items.extend(response.items().iter().map(from_attributes));

            match response.last_evaluated_key() {
                Some(key) if !key.is_empty() => last_evaluated_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(items)
    }
}
