//! Blocking HTTP implementation of the Notion session.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::core::error::NwsError;
use crate::notion::api::{
    CreatePageRequest, DatabaseObject, IntegrationUser, NotionError, NotionSession, PageObject,
};

const DEFAULT_NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";

/// API version pinned by this tool. The data-source model (databases exposing
/// `data_sources`, pages parented by `data_source_id`) exists from this
/// version onward.
const NOTION_VERSION: &str = "2025-09-03";

/// Structured error body Notion returns for rejected requests.
#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Blocking Notion API client. One instance per token; calls are sequential
/// and never retried here.
pub struct NotionHttpClient {
    http_client: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl NotionHttpClient {
    /// Creates a client against the production Notion API.
    ///
    /// # Errors
    ///
    /// Returns an error when the token is empty or the HTTP client cannot be
    /// initialized.
    pub fn new(token: &str) -> Result<Self, NwsError> {
        Self::new_with_base_url(token, DEFAULT_NOTION_API_BASE_URL)
    }

    /// Creates a client against an explicit base URL (stub servers in tests).
    ///
    /// # Errors
    ///
    /// Returns an error when required values are missing or the HTTP client
    /// cannot be initialized.
    pub fn new_with_base_url(token: &str, base_url: &str) -> Result<Self, NwsError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(NwsError::ValidationError("Token is required.".to_string()));
        }

        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(NwsError::ValidationError(
                "API base URL must not be empty.".to_string(),
            ));
        }

        // Transport-level bounds only; the verification sequence itself has
        // no timeout or cancellation.
        let http_client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|error| {
                NwsError::ValidationError(format!("Failed to initialize HTTP client: {}", error))
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.to_string(),
            token: token.to_string(),
        })
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::blocking::Response, NotionError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http_client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION);

        if let Some(body) = body {
            builder = builder.json(&body);
        }

        builder.send().map_err(|error| NotionError::Transport {
            message: Some(error.to_string()),
        })
    }

    fn decode<T: DeserializeOwned>(
        response: reqwest::blocking::Response,
    ) -> Result<T, NotionError> {
        let status = response.status();
        if status.is_success() {
            return response.json().map_err(|error| NotionError::Transport {
                message: Some(error.to_string()),
            });
        }

        let status_code = status.as_u16();
        match response.json::<NotionErrorBody>() {
            Ok(body) => match body.code {
                Some(code) => Err(NotionError::Api {
                    status: status_code,
                    code,
                    message: body.message,
                }),
                // Rejected without a code; only the message text is usable.
                None => Err(NotionError::Transport {
                    message: body.message,
                }),
            },
            Err(_) => Err(NotionError::Transport {
                message: Some(format!("HTTP {}", status_code)),
            }),
        }
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, NotionError> {
        let response = self.request(reqwest::Method::GET, path, None)?;
        Self::decode(response)
    }

    fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, NotionError> {
        let response = self.request(reqwest::Method::POST, path, Some(body))?;
        Self::decode(response)
    }

    fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, NotionError> {
        let response = self.request(reqwest::Method::PATCH, path, Some(body))?;
        Self::decode(response)
    }
}

impl NotionSession for NotionHttpClient {
    fn retrieve_page(&self, page_id: &str) -> Result<PageObject, NotionError> {
        self.get(&format!("/pages/{}", page_id))
    }

    fn retrieve_database(&self, database_id: &str) -> Result<DatabaseObject, NotionError> {
        self.get(&format!("/databases/{}", database_id))
    }

    fn create_page(&self, request: &CreatePageRequest) -> Result<PageObject, NotionError> {
        let body = serde_json::to_value(request).map_err(|error| NotionError::Transport {
            message: Some(error.to_string()),
        })?;
        self.post("/pages", body)
    }

    fn archive_page(&self, page_id: &str) -> Result<PageObject, NotionError> {
        self.patch(
            &format!("/pages/{}", page_id),
            serde_json::json!({ "archived": true }),
        )
    }

    fn search_any(&self) -> Result<(), NotionError> {
        let response = self.request(
            reqwest::Method::POST,
            "/search",
            Some(serde_json::json!({ "page_size": 1 })),
        )?;
        Self::decode::<serde_json::Value>(response).map(|_| ())
    }

    fn me(&self) -> Result<IntegrationUser, NotionError> {
        self.get("/users/me")
    }
}
