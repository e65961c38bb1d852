use std::future::Future;

use reqwest::Client;
use serde_json::Value;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::RawRecord;

/// Anything that can produce one bulk batch of feed records.
pub trait FeedSource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<RawRecord>>> + Send;
}

pub struct FeedClient {
    client: Client,
    url: String,
}

impl FeedClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AppError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.feed_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Transport(format!(
                "Failed to fetch feed: HTTP {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        let records = decode_body(&bytes)?;
        tracing::debug!("Fetched {} records from {}", records.len(), self.url);
        Ok(records)
    }
}

impl FeedSource for FeedClient {
    fn fetch(&self) -> impl Future<Output = Result<Vec<RawRecord>>> + Send {
        self.fetch_records()
    }
}

/// Decode a feed body shaped as `{"data": [...]}` or a bare array.
pub fn decode_body(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let body: Value = serde_json::from_slice(bytes)
        .map_err(|e| AppError::Shape(format!("body is not valid JSON: {}", e)))?;

    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(AppError::Shape(format!(
                    "`data` is {} rather than a list",
                    json_kind(&other)
                )))
            }
            None => return Err(AppError::Shape("object body has no `data` key".into())),
        },
        other => {
            return Err(AppError::Shape(format!(
                "top-level body is {}",
                json_kind(&other)
            )))
        }
    };

    let total = items.len();
    let records: Vec<RawRecord> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();

    if records.len() < total {
        tracing::warn!("Skipped {} feed entries that were not objects", total - records.len());
    }

    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
