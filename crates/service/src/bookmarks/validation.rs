//! Schema checks for incoming save requests.
//!
//! Input arrives as loosely typed JSON; every check maps to one
//! `ServiceError` variant and the first failure wins.

use serde_json::{Map, Value};
use url::Url;

use super::{Folder, RecordUpdate, SearchEngine, Tab};
use crate::errors::{FolderFault, ServiceError};

pub const MAX_FOLDER_NAME_CHARS: usize = 50;
pub const MAX_TAB_NAME_CHARS: usize = 100;

/// Accepts only absolute `http://` / `https://` URLs that parse.
///
/// The scheme prefix is matched case-sensitively on the raw string, so
/// `HTTP://example.com` and `http:example.com` are rejected even though a URL
/// parser would normalise them.
pub fn is_web_url(candidate: &str) -> bool {
    if !(candidate.starts_with("http://") || candidate.starts_with("https://")) {
        return false;
    }
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Validate a save request body, producing the typed update to apply.
pub fn parse_record_update(candidate: &Value) -> Result<RecordUpdate, ServiceError> {
    let object = candidate.as_object().ok_or(ServiceError::InvalidFormat)?;

    let search_engine = match object.get("search_engine") {
        None => SearchEngine::default(),
        Some(value) => value
            .as_str()
            .and_then(SearchEngine::from_name)
            .ok_or(ServiceError::InvalidSearchEngine)?,
    };

    let folders = match object.get("folders") {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(parse_folder).collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ServiceError::InvalidFolder(FolderFault::FoldersFormat)),
    };

    Ok(RecordUpdate { folders, search_engine })
}

fn parse_folder(value: &Value) -> Result<Folder, ServiceError> {
    let folder = value.as_object().ok_or(ServiceError::InvalidFolder(FolderFault::Name))?;
    let name = bounded_string(folder, "name", MAX_FOLDER_NAME_CHARS)
        .ok_or(ServiceError::InvalidFolder(FolderFault::Name))?;
    let tabs = match folder.get("tabs") {
        Some(Value::Array(items)) => items.iter().map(parse_tab).collect::<Result<Vec<_>, _>>()?,
        _ => return Err(ServiceError::InvalidFolder(FolderFault::TabsFormat)),
    };
    Ok(Folder { name, tabs })
}

fn parse_tab(value: &Value) -> Result<Tab, ServiceError> {
    let tab = value.as_object().ok_or(ServiceError::InvalidTab)?;
    let name = bounded_string(tab, "name", MAX_TAB_NAME_CHARS).ok_or(ServiceError::InvalidTab)?;
    let url = tab.get("url").and_then(Value::as_str).unwrap_or_default();
    if !is_web_url(url) {
        return Err(ServiceError::InvalidUrl);
    }
    Ok(Tab { name, url: url.to_string() })
}

// length in characters, not bytes
fn bounded_string(object: &Map<String, Value>, key: &str, max_chars: usize) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| s.chars().count() <= max_chars)
        .map(str::to_string)
}
