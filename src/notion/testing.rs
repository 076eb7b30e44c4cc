//! Scriptable in-memory session for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::notion::api::{
    CreatePageRequest, DatabaseObject, DatabaseProperty, DataSourceRef, IntegrationUser,
    NotionError, NotionSession, PageObject, PageProperty, RichTextRun,
};

/// Cloneable stand-in for `NotionError`, so a mock can replay the same
/// failure across calls.
#[derive(Debug, Clone)]
pub enum StubError {
    Api {
        status: u16,
        code: String,
        message: Option<String>,
    },
    Transport(Option<String>),
}

impl StubError {
    pub fn to_notion(&self) -> NotionError {
        match self {
            StubError::Api {
                status,
                code,
                message,
            } => NotionError::Api {
                status: *status,
                code: code.clone(),
                message: message.clone(),
            },
            StubError::Transport(message) => NotionError::Transport {
                message: message.clone(),
            },
        }
    }
}

fn runs(text: &str) -> Vec<RichTextRun> {
    vec![RichTextRun {
        plain_text: text.to_string(),
    }]
}

/// A page whose single title-typed property renders `title`.
pub fn titled_page(id: &str, title: &str) -> PageObject {
    let mut properties = BTreeMap::new();
    properties.insert(
        "title".to_string(),
        PageProperty {
            kind: "title".to_string(),
            title: Some(runs(title)),
        },
    );
    properties.insert(
        "Status".to_string(),
        PageProperty {
            kind: "select".to_string(),
            title: None,
        },
    );

    PageObject {
        id: id.to_string(),
        url: Some(format!("https://www.notion.so/{}", id)),
        properties,
    }
}

/// A page carrying no title-typed property at all.
pub fn untitled_page(id: &str) -> PageObject {
    let mut properties = BTreeMap::new();
    properties.insert(
        "Status".to_string(),
        PageProperty {
            kind: "select".to_string(),
            title: None,
        },
    );

    PageObject {
        id: id.to_string(),
        url: Some(format!("https://www.notion.so/{}", id)),
        properties,
    }
}

/// A database titled `title` with the given data sources and a title-typed
/// property named "Name".
pub fn database_object(id: &str, title: &str, data_source_ids: &[&str]) -> DatabaseObject {
    let mut properties = BTreeMap::new();
    properties.insert(
        "Name".to_string(),
        DatabaseProperty {
            kind: "title".to_string(),
        },
    );
    properties.insert(
        "Created".to_string(),
        DatabaseProperty {
            kind: "created_time".to_string(),
        },
    );

    DatabaseObject {
        id: id.to_string(),
        url: Some(format!("https://www.notion.so/{}", id)),
        title: runs(title),
        data_sources: data_source_ids
            .iter()
            .map(|source_id| DataSourceRef {
                id: source_id.to_string(),
                name: None,
            })
            .collect(),
        properties,
    }
}

pub fn integration_user(id: &str, name: &str) -> IntegrationUser {
    IntegrationUser {
        id: id.to_string(),
        name: Some(name.to_string()),
        kind: "bot".to_string(),
    }
}

/// Scriptable session: each operation replays a configured outcome and
/// counts its invocations.
pub struct MockSession {
    pub page: Result<PageObject, StubError>,
    pub database: Result<DatabaseObject, StubError>,
    pub created: Result<PageObject, StubError>,
    pub archive: Result<(), StubError>,
    pub search: Result<(), StubError>,
    pub user: Result<IntegrationUser, StubError>,

    pub page_calls: Cell<usize>,
    pub database_calls: Cell<usize>,
    pub create_calls: Cell<usize>,
    pub archive_calls: Cell<usize>,
    pub last_page_id: RefCell<Option<String>>,
    pub last_create: RefCell<Option<CreatePageRequest>>,
    pub last_archived_id: RefCell<Option<String>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            page: Ok(titled_page("page-default", "Default Page")),
            database: Ok(database_object("database-default", "Default DB", &["ds-default"])),
            created: Ok(titled_page("created-default", "Created")),
            archive: Ok(()),
            search: Ok(()),
            user: Ok(integration_user("user-default", "Default Bot")),
            page_calls: Cell::new(0),
            database_calls: Cell::new(0),
            create_calls: Cell::new(0),
            archive_calls: Cell::new(0),
            last_page_id: RefCell::new(None),
            last_create: RefCell::new(None),
            last_archived_id: RefCell::new(None),
        }
    }

    pub fn with_page(mut self, page: Result<PageObject, StubError>) -> Self {
        self.page = page;
        self
    }

    pub fn with_database(mut self, database: Result<DatabaseObject, StubError>) -> Self {
        self.database = database;
        self
    }

    pub fn with_created(mut self, created: Result<PageObject, StubError>) -> Self {
        self.created = created;
        self
    }

    pub fn with_archive(mut self, archive: Result<(), StubError>) -> Self {
        self.archive = archive;
        self
    }

    pub fn with_search(mut self, search: Result<(), StubError>) -> Self {
        self.search = search;
        self
    }

    pub fn with_user(mut self, user: Result<IntegrationUser, StubError>) -> Self {
        self.user = user;
        self
    }
}

impl NotionSession for MockSession {
    fn retrieve_page(&self, page_id: &str) -> Result<PageObject, NotionError> {
        self.page_calls.set(self.page_calls.get() + 1);
        *self.last_page_id.borrow_mut() = Some(page_id.to_string());
        self.page.clone().map_err(|error| error.to_notion())
    }

    fn retrieve_database(&self, _database_id: &str) -> Result<DatabaseObject, NotionError> {
        self.database_calls.set(self.database_calls.get() + 1);
        self.database.clone().map_err(|error| error.to_notion())
    }

    fn create_page(&self, request: &CreatePageRequest) -> Result<PageObject, NotionError> {
        self.create_calls.set(self.create_calls.get() + 1);
        *self.last_create.borrow_mut() = Some(request.clone());
        self.created.clone().map_err(|error| error.to_notion())
    }

    fn archive_page(&self, page_id: &str) -> Result<PageObject, NotionError> {
        self.archive_calls.set(self.archive_calls.get() + 1);
        *self.last_archived_id.borrow_mut() = Some(page_id.to_string());
        self.archive
            .clone()
            .map(|()| PageObject {
                id: page_id.to_string(),
                url: None,
                properties: BTreeMap::new(),
            })
            .map_err(|error| error.to_notion())
    }

    fn search_any(&self) -> Result<(), NotionError> {
        self.search.clone().map_err(|error| error.to_notion())
    }

    fn me(&self) -> Result<IntegrationUser, NotionError> {
        self.user.clone().map_err(|error| error.to_notion())
    }
}
