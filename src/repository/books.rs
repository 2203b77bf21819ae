use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::info;

use std::path::Path;

use super::{normalize_record, DownloadedFile, DownloadsRepository, Repository};
use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{Book, NewBook, RecordId};
use crate::validation;

const BOOKS_PATH: &str = "v1/books";

pub struct BooksRepository {
    inner: Repository<Book>,
}

impl BooksRepository {
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: Repository::new(client, BOOKS_PATH),
        }
    }

    pub async fn list(&self) -> Result<Vec<Book>> {
        self.inner.list().await
    }

    /// Server-side search; an empty query lists everything.
    pub async fn search(&self, query: &str) -> Result<Vec<Book>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list().await;
        }
        self.inner.list_with_query(&[("search", query)]).await
    }

    pub async fn get(&self, id: &RecordId) -> Result<Book> {
        self.inner.get(id).await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        self.inner.delete(id).await
    }

    /// Multipart upload of the metadata and the file itself.
    pub async fn upload(&self, book: &NewBook) -> Result<Option<Book>> {
        validation::validate_new_book(book)?;

        let bytes = tokio::fs::read(&book.file).await?;
        let size = bytes.len();
        let file_name = book
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime = mime_guess::from_path(&book.file).first_or_octet_stream();

        let file_part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str(mime.essence_str())?;

        let mut form = Form::new()
            .text("title", book.title.trim().to_string())
            .text("author", book.author.trim().to_string());
        if let Some(branch) = &book.branch {
            form = form.text("branch", branch.clone());
        }
        if let Some(year) = book.year {
            form = form.text("year", year.to_string());
        }
        if let Some(summary) = &book.summary {
            form = form.text("abstract", summary.clone());
        }
        let form = form.part("file", file_part);

        let client = self.inner.client();
        let request = client.authorized(Method::POST, BOOKS_PATH)?.multipart(form);
        let value = client.send_json(request).await?;

        info!(file = %file_name, bytes = size, "Book uploaded");
        Ok(normalize_record(&value))
    }

    /// Save the book file under `dest`; see `DownloadsRepository::download_book`.
    pub async fn download(&self, id: &RecordId, dest: &Path) -> Result<DownloadedFile> {
        DownloadsRepository::new(self.inner.client().clone())
            .download_book(id, dest)
            .await
    }

    /// Fetch a single book and fail with a readable message when it is gone.
    pub async fn require(&self, id: &RecordId) -> Result<Book> {
        match self.get(id).await {
            Err(ClientError::Api { status, .. }) if status == reqwest::StatusCode::NOT_FOUND => {
                Err(ClientError::Api {
                    status,
                    message: format!("Book not found: {}", id),
                })
            }
            other => other,
        }
    }
}
