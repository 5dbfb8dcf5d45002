use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::env;

use crate::api::USER_HEADER;
use crate::cli::error::{CliError, CliResult};

/// API client for communicating with the VlogForge REST API
pub struct ApiClient {
    base_url: String,
    user_id: Option<String>,
    client: Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// Priority for base URL:
    /// 1. Explicit `api_url` parameter
    /// 2. VF_API_URL environment variable
    /// 3. Default: http://localhost:3737
    ///
    /// The acting user follows the same order with VF_USER_ID and no default.
    pub fn new(api_url: Option<String>, user_id: Option<String>) -> Self {
        let base_url = api_url
            .or_else(|| env::var("VF_API_URL").ok())
            .unwrap_or_else(|| "http://localhost:3737".to_string());
        let user_id = user_id
            .or_else(|| env::var("VF_USER_ID").ok())
            .filter(|id| !id.trim().is_empty());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id,
            client: Client::new(),
        }
    }

    /// Get the base URL being used
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The user requests are made on behalf of
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Fail early when a command needs an identity and none is configured.
    pub fn require_user(&self) -> CliResult<&str> {
        self.user_id().ok_or(CliError::MissingUser)
    }

    fn with_identity(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.user_id {
            Some(id) => builder.header(USER_HEADER, id),
            None => builder,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a GET request builder
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.with_identity(self.client.get(self.url(path)))
    }

    /// Create a POST request builder
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.with_identity(self.client.post(self.url(path)))
    }

    /// Create a PUT request builder
    pub fn put(&self, path: &str) -> RequestBuilder {
        self.with_identity(self.client.put(self.url(path)))
    }

    /// Create a PATCH request builder
    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.with_identity(self.client.patch(self.url(path)))
    }

    /// Create a DELETE request builder
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.with_identity(self.client.delete(self.url(path)))
    }

    /// Handle API response with standardized error handling
    ///
    /// Returns the deserialized response body on success, or a
    /// CliError::ApiError carrying the server's error message otherwise.
    pub async fn handle_response<T: DeserializeOwned>(response: Response) -> CliResult<T> {
        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| CliError::InvalidResponse {
                    message: e.to_string(),
                })
        } else {
            let status = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorBody>(&error_text)
                .map(|body| body.error)
                .unwrap_or(error_text);
            Err(CliError::ApiError { status, message })
        }
    }
}
