use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_with_id, RecordId, Reference, Resource};

/// One entry of the download history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Download {
    #[serde(skip_deserializing)]
    pub id: RecordId,
    #[serde(default, alias = "bookId", alias = "book_id")]
    pub book: Option<Reference>,
    #[serde(default, alias = "userId", alias = "user_id")]
    pub user: Option<Reference>,
    #[serde(default, alias = "downloadedAt", alias = "createdAt")]
    pub downloaded_at: Option<String>,
}

impl Resource for Download {
    const COLLECTION_KEYS: &'static [&'static str] = &["downloads", "history"];
    const RECORD_KEYS: &'static [&'static str] = &["download"];

    fn from_value(value: &Value) -> Option<Self> {
        let download: Download =
            decode_with_id(value, &["id", "_id", "downloadId"], |d: &mut Download, id| d.id = id)?;
        // A history row without a book is useless to show.
        download.book.as_ref()?;
        Some(download)
    }

    fn id(&self) -> &RecordId {
        &self.id
    }
}
