//! Folder identifiers and discovery roots

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a remote folder
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub String);

impl FolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for FolderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FolderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Well-known folders every mailbox has, addressable without knowing their ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistinguishedFolder {
    MsgFolderRoot,
    Inbox,
    SentItems,
    DeletedItems,
    Drafts,
    JunkEmail,
    Outbox,
    Archive,
}

impl DistinguishedFolder {
    /// Name used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MsgFolderRoot => "msgfolderroot",
            Self::Inbox => "inbox",
            Self::SentItems => "sentitems",
            Self::DeletedItems => "deleteditems",
            Self::Drafts => "drafts",
            Self::JunkEmail => "junkemail",
            Self::Outbox => "outbox",
            Self::Archive => "archive",
        }
    }
}

impl FromStr for DistinguishedFolder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "msgfolderroot" => Ok(Self::MsgFolderRoot),
            "inbox" => Ok(Self::Inbox),
            "sentitems" => Ok(Self::SentItems),
            "deleteditems" => Ok(Self::DeletedItems),
            "drafts" => Ok(Self::Drafts),
            "junkemail" => Ok(Self::JunkEmail),
            "outbox" => Ok(Self::Outbox),
            "archive" => Ok(Self::Archive),
            other => Err(format!("unknown distinguished folder: {other}")),
        }
    }
}

impl fmt::Display for DistinguishedFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Starting point of a folder discovery walk
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FolderRoot {
    /// A well-known folder such as the message root or the inbox
    Distinguished(DistinguishedFolder),
    /// A folder addressed by its id
    Folder(FolderId),
}

impl From<DistinguishedFolder> for FolderRoot {
    fn from(folder: DistinguishedFolder) -> Self {
        Self::Distinguished(folder)
    }
}

impl From<FolderId> for FolderRoot {
    fn from(id: FolderId) -> Self {
        Self::Folder(id)
    }
}

impl fmt::Display for FolderRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distinguished(name) => write!(f, "{name}"),
            Self::Folder(id) => write!(f, "folder {id}"),
        }
    }
}
