//! Session boundary for the Notion API.
//!
//! The verification engine talks to Notion exclusively through the
//! [`NotionSession`] trait: fetch a page or database by id, create a page
//! under a parent, archive a page, run the cheapest possible search, and look
//! up the integration's own identity. Transport, retries, and rate limiting
//! live behind the trait; the engine never sees them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors emitted by a Notion session.
///
/// `Api` carries the structured error body Notion returns for a rejected
/// request; `Transport` covers everything that failed before a structured
/// body existed (connect errors, timeouts, undecodable responses).
#[derive(Debug, Error)]
pub enum NotionError {
    /// Request reached Notion and was rejected with a structured error body.
    #[error("Notion API error ({status}): {code}")]
    Api {
        /// HTTP status of the rejection.
        status: u16,
        /// Machine-readable error code (e.g. `object_not_found`).
        code: String,
        /// Human-readable message from the error body, when present.
        message: Option<String>,
    },

    /// Request failed without a structured error body.
    #[error("Notion transport error")]
    Transport {
        /// Underlying failure text, when any exists.
        message: Option<String>,
    },
}

/// One run of rich text; only the rendered text matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct RichTextRun {
    #[serde(default)]
    pub plain_text: String,
}

/// A page property as returned by page retrieval. Only title-typed
/// properties are consumed; everything else is carried for the kind tag.
#[derive(Debug, Clone, Deserialize)]
pub struct PageProperty {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: Option<Vec<RichTextRun>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageObject {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PageProperty>,
}

/// Reference to a data source exposed by a database.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSourceRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A database schema property; only its kind is consumed (to find the
/// title-typed column for row creation).
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseProperty {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseObject {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Vec<RichTextRun>,
    #[serde(default)]
    pub data_sources: Vec<DataSourceRef>,
    #[serde(default)]
    pub properties: BTreeMap<String, DatabaseProperty>,
}

/// The integration's own identity as echoed by the self lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Parent of a page to be created: a direct child of a page, or a row in a
/// database's data source.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PageParent {
    Page { page_id: String },
    DataSource { data_source_id: String },
}

/// Page-creation request. Properties are raw Notion property payloads keyed
/// by property name; the only property this tool ever writes is a title.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePageRequest {
    pub parent: PageParent,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl CreatePageRequest {
    /// Builds a request creating a page with a single title property under
    /// the given key.
    pub fn with_title(parent: PageParent, property_name: &str, title: &str) -> Self {
        let mut properties = serde_json::Map::new();
        properties.insert(
            property_name.to_string(),
            serde_json::json!({
                "title": [{ "text": { "content": title } }]
            }),
        );

        Self { parent, properties }
    }
}

/// An authenticated Notion session.
///
/// Every call is an independent blocking operation; callers sequence them and
/// decide what each failure means. Implementations must not retry.
pub trait NotionSession {
    /// Fetches a page by id.
    ///
    /// # Errors
    ///
    /// Returns an error when the id does not name a readable page.
    fn retrieve_page(&self, page_id: &str) -> Result<PageObject, NotionError>;

    /// Fetches a database by id.
    ///
    /// # Errors
    ///
    /// Returns an error when the id does not name a readable database.
    fn retrieve_database(&self, database_id: &str) -> Result<DatabaseObject, NotionError>;

    /// Creates a page under the requested parent.
    ///
    /// # Errors
    ///
    /// Returns an error when the integration cannot write under the parent.
    fn create_page(&self, request: &CreatePageRequest) -> Result<PageObject, NotionError>;

    /// Marks a page as archived.
    ///
    /// # Errors
    ///
    /// Returns an error when the page cannot be archived.
    fn archive_page(&self, page_id: &str) -> Result<PageObject, NotionError>;

    /// Runs the smallest possible workspace search (page size 1), proving
    /// the token can reach shared content at all.
    ///
    /// # Errors
    ///
    /// Returns an error when search is denied or unreachable.
    fn search_any(&self) -> Result<(), NotionError>;

    /// Looks up the integration's own identity. Requires no resource-specific
    /// permission.
    ///
    /// # Errors
    ///
    /// Returns an error when the token is rejected.
    fn me(&self) -> Result<IntegrationUser, NotionError>;
}
