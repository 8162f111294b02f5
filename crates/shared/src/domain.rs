use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a document as the backend reports it.
///
/// The documents endpoint may send ids as JSON strings or numbers; both are
/// kept as their string form so they can be echoed back in row URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocumentId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = match RawDocumentId::deserialize(deserializer)? {
            RawDocumentId::Text(text) => text,
            RawDocumentId::Signed(n) => n.to_string(),
            RawDocumentId::Unsigned(n) => n.to_string(),
        };
        Ok(Self(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
}

/// A row value belonging to a document. Unique within one document's row list.
pub type RowName = String;
