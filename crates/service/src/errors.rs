use std::fmt;

use thiserror::Error;

/// Which part of a folder failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderFault {
    /// `folders` is not an array.
    FoldersFormat,
    /// Folder is not an object, or its name is missing, not a string or too long.
    Name,
    /// `tabs` is missing or not an array.
    TabsFormat,
}

impl fmt::Display for FolderFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FolderFault::FoldersFormat => "Invalid folders format",
            FolderFault::Name => "Invalid folder name",
            FolderFault::TabsFormat => "Invalid tabs format",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Invalid data format")]
    InvalidFormat,
    #[error("{0}")]
    InvalidFolder(FolderFault),
    #[error("Invalid tab name")]
    InvalidTab,
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Invalid search engine")]
    InvalidSearchEngine,
    #[error("User ID is required")]
    MissingId,
    #[error("User already exists")]
    DuplicateUser,
    #[error("User not found")]
    UserNotFound,
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl ServiceError {
    pub fn persistence(err: impl fmt::Display) -> Self { Self::Persistence(err.to_string()) }

    /// True for errors caused by the request content rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ServiceError::Persistence(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_api_contract() {
        assert_eq!(ServiceError::InvalidFolder(FolderFault::FoldersFormat).to_string(), "Invalid folders format");
        assert_eq!(ServiceError::InvalidFolder(FolderFault::Name).to_string(), "Invalid folder name");
        assert_eq!(ServiceError::InvalidFolder(FolderFault::TabsFormat).to_string(), "Invalid tabs format");
        assert_eq!(ServiceError::InvalidUrl.to_string(), "Invalid URL");
        assert_eq!(ServiceError::UserNotFound.to_string(), "User not found");
        assert!(!ServiceError::persistence("disk full").is_client_error());
        assert!(ServiceError::DuplicateUser.is_client_error());
    }
}
