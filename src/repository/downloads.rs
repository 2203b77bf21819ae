//! Book downloads and the download history.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Method, Response};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use super::Repository;
use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Download, RecordId};

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub bytes: u64,
}

pub struct DownloadsRepository {
    history: Repository<Download>,
}

impl DownloadsRepository {
    pub fn new(client: ApiClient) -> Self {
        Self {
            history: Repository::new(client, "downloads/history"),
        }
    }

    pub async fn history(&self) -> Result<Vec<Download>> {
        self.history.list().await
    }

    /// Stream the book file to `dest`. When `dest` is a directory the file
    /// name comes from the response headers. A failed transfer leaves no
    /// partial file behind.
    pub async fn download_book(&self, id: &RecordId, dest: &Path) -> Result<DownloadedFile> {
        let client = self.history.client();
        let request = client.authorized_record(Method::GET, "downloads", id)?;
        let response = client.send(request).await?;

        let path = if dest.is_dir() {
            dest.join(file_name_for(&response, id))
        } else {
            dest.to_path_buf()
        };

        match write_body(response, &path).await {
            Ok(bytes) => {
                info!(book = %id, path = %path.display(), bytes, "Book downloaded");
                Ok(DownloadedFile { path, bytes })
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %remove_err, "Failed to remove partial download");
                }
                Err(e)
            }
        }
    }
}

async fn write_body(response: Response, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

/// File name from `Content-Disposition`, else `book-<id>` plus an extension
/// guessed from the content type.
fn file_name_for(response: &Response, id: &RecordId) -> String {
    let from_header = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(disposition_file_name);
    if let Some(name) = from_header {
        return name;
    }

    let extension = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .and_then(|essence| mime_guess::get_mime_extensions_str(essence.trim()))
        .and_then(|exts| exts.first())
        .copied()
        .unwrap_or("bin");

    format!("book-{}.{}", id, extension)
}

fn disposition_file_name(header: &str) -> Option<String> {
    let raw = header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))?
        .trim_matches('"');

    // Keep only the final component so a hostile name cannot escape `dest`.
    Path::new(raw)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::logged_in_client;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_disposition_file_name() {
        assert_eq!(
            disposition_file_name("attachment; filename=\"notes.pdf\"").as_deref(),
            Some("notes.pdf")
        );
        assert_eq!(
            disposition_file_name("attachment; filename=../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(disposition_file_name("inline"), None);
    }

    #[tokio::test]
    async fn test_download_into_directory_uses_header_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/downloads/b1"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Disposition", "attachment; filename=\"circuits.pdf\"")
                    .set_body_bytes(b"%PDF-1.7 circuits".to_vec()),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloads = DownloadsRepository::new(logged_in_client(&server).await);
        let file = downloads
            .download_book(&RecordId::new("b1"), dir.path())
            .await
            .unwrap();

        assert_eq!(file.path, dir.path().join("circuits.pdf"));
        assert_eq!(file.bytes, 17);
        assert_eq!(std::fs::read(&file.path).unwrap(), b"%PDF-1.7 circuits");
    }

    #[tokio::test]
    async fn test_download_falls_back_to_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/downloads/7"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"%PDF".to_vec(), "application/pdf"),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloads = DownloadsRepository::new(logged_in_client(&server).await);
        let file = downloads
            .download_book(&RecordId::new("7"), dir.path())
            .await
            .unwrap();
        assert_eq!(file.path, dir.path().join("book-7.pdf"));
    }

    #[tokio::test]
    async fn test_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/downloads/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "downloads": [
                    { "_id": "d1", "bookId": { "_id": "b1", "title": "Optics" } },
                    { "_id": "d2" }
                ] }
            })))
            .mount(&server)
            .await;

        let downloads = DownloadsRepository::new(logged_in_client(&server).await);
        let history = downloads.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].book.as_ref().unwrap().label(), "Optics");
    }
}
