//! Bookmark records as they are persisted and returned to clients.

pub mod validation;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whole store: user id -> record, in the order found in the backing document.
pub type UserMap = IndexMap<String, UserRecord>;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    Google,
    #[default]
    Yandex,
}

impl SearchEngine {
    /// Exact, case-sensitive match on the wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "google" => Some(Self::Google),
            "yandex" => Some(Self::Yandex),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tab {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Folder {
    pub name: String,
    #[serde(default)]
    pub tabs: Vec<Tab>,
}

/// A user's saved folders and search engine preference.
///
/// `search_engine` is back-filled with yandex when the stored record lacks it.
/// Any other keys found in the stored record are carried along untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub search_engine: SearchEngine,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Record given to a freshly added user and to lookups of unknown users.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Best-effort decode of a stored record that failed strict decoding.
    ///
    /// Unknown search engines fall back to yandex; folders without a string
    /// name and tabs without string name/url are dropped. Limits are not
    /// re-checked here, only on save.
    pub fn salvage(value: Value) -> Self {
        let Value::Object(mut object) = value else {
            return Self::empty();
        };
        let search_engine = object
            .remove("search_engine")
            .as_ref()
            .and_then(Value::as_str)
            .and_then(SearchEngine::from_name)
            .unwrap_or_default();
        let folders = match object.remove("folders") {
            Some(Value::Array(items)) => items.iter().filter_map(salvage_folder).collect(),
            _ => Vec::new(),
        };
        Self { folders, search_engine, extra: object }
    }

    /// Replace the user-editable part of the record, leaving `extra` alone.
    pub fn apply(&mut self, update: RecordUpdate) {
        self.folders = update.folders;
        self.search_engine = update.search_engine;
    }
}

fn salvage_folder(value: &Value) -> Option<Folder> {
    let name = value.get("name")?.as_str()?.to_string();
    let tabs = match value.get("tabs") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|tab| {
                Some(Tab {
                    name: tab.get("name")?.as_str()?.to_string(),
                    url: tab.get("url")?.as_str()?.to_string(),
                })
            })
            .collect(),
        _ => Vec::new(),
    };
    Some(Folder { name, tabs })
}

/// Validated payload of a save request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordUpdate {
    pub folders: Vec<Folder>,
    pub search_engine: SearchEngine,
}
