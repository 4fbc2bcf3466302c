//! Homework API access and response validation
//!
//! [`PracticumClient`] performs one `GET` per call against the statuses
//! endpoint; [`check_response`] verifies the decoded payload before the
//! poller looks at any record.

use crate::config::Config;
use crate::error::{Error, Result, ShapeError, TransportError, json_type_name};
use crate::types::ApiResponse;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

/// Source of raw homework API answers
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetch every homework whose status changed since `from_date`
    ///
    /// `None` means "since now". Returns the decoded JSON body as-is; shape
    /// checks belong to [`check_response`].
    async fn fetch(&self, from_date: Option<i64>) -> Result<Value>;
}

/// HTTP client for the Practicum homework statuses endpoint
pub struct PracticumClient {
    http_client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    /// Create a client from the loaded configuration
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent("homework-bot");
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| Error::Config {
            message: format!("failed to create HTTP client: {e}"),
            key: None,
        })?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            token: config.credentials.practicum_token.clone(),
        })
    }

    /// Endpoint this client queries
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn fetch(&self, from_date: Option<i64>) -> Result<Value> {
        let from_date = from_date.unwrap_or_else(|| chrono::Utc::now().timestamp());
        debug!(endpoint = %self.endpoint, from_date, "requesting homework statuses");

        let response = self
            .http_client
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                error!(endpoint = %self.endpoint, from_date, error = %e, "homework API unreachable");
                TransportError::Unreachable {
                    endpoint: self.endpoint.clone(),
                    from_date,
                    reason: e.to_string(),
                }
            })?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(TransportError::UnexpectedStatus {
                endpoint: self.endpoint.clone(),
                from_date,
                status: response.status().as_u16(),
            }
            .into());
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::Decode {
                endpoint: self.endpoint.clone(),
                from_date,
                reason: e.to_string(),
            })?;

        Ok(body)
    }
}

/// Verify the shape of a homework API answer
///
/// # Errors
/// - [`ShapeError::NotAnObject`] if the body is not a JSON object
/// - [`ShapeError::MissingKey`] if `homeworks` or `current_date` is absent
/// - [`ShapeError::WrongType`] if `homeworks` is not an array or
///   `current_date` is not an integer
pub fn check_response(response: &Value) -> Result<ApiResponse> {
    const CONTEXT: &str = "response";

    let body = response.as_object().ok_or(ShapeError::NotAnObject {
        context: CONTEXT,
        found: json_type_name(response),
    })?;

    for key in ["homeworks", "current_date"] {
        if !body.contains_key(key) {
            error!(key, "homework API response is missing a required key");
            return Err(ShapeError::MissingKey {
                context: CONTEXT,
                key,
            }
            .into());
        }
    }

    let homeworks = body["homeworks"]
        .as_array()
        .ok_or_else(|| ShapeError::WrongType {
            context: CONTEXT,
            key: "homeworks",
            expected: "an array",
            found: json_type_name(&body["homeworks"]),
        })?
        .clone();

    let current_date = body["current_date"]
        .as_i64()
        .ok_or_else(|| ShapeError::WrongType {
            context: CONTEXT,
            key: "current_date",
            expected: "an integer",
            found: json_type_name(&body["current_date"]),
        })?;

    Ok(ApiResponse {
        homeworks,
        current_date,
    })
}
