//! Books and upload form data.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_with_id, lenient_u64, lenient_year, RecordId, Reference, Resource};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    #[serde(skip_deserializing)]
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, alias = "branchId", alias = "branch_id")]
    pub branch: Option<Reference>,
    #[serde(default, deserialize_with = "lenient_year", alias = "publishedYear")]
    pub year: Option<i32>,
    #[serde(default, rename = "abstract", alias = "description")]
    pub summary: Option<String>,
    #[serde(default, alias = "fileUrl", alias = "file_url", alias = "filePath")]
    pub file: Option<String>,
    #[serde(default, alias = "uploadedBy", alias = "uploaded_by", alias = "uploaderId")]
    pub uploader: Option<Reference>,
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        alias = "downloadCount",
        alias = "downloads"
    )]
    pub download_count: u64,
}

impl Resource for Book {
    const COLLECTION_KEYS: &'static [&'static str] = &["books"];
    const RECORD_KEYS: &'static [&'static str] = &["book"];

    fn from_value(value: &Value) -> Option<Self> {
        let book: Book = decode_with_id(value, &["id", "_id", "bookId", "uuid"], |b: &mut Book, id| {
            b.id = id
        })?;
        if book.title.trim().is_empty() {
            return None;
        }
        Some(book)
    }

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Upload form: metadata plus the local file to send.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub branch: Option<String>,
    pub year: Option<i32>,
    pub summary: Option<String>,
    pub file: PathBuf,
}
