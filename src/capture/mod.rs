//! Page snapshot capture.
//!
//! Fetches an allegedly-infringing page, fixes it cryptographically, and
//! persists it for chain of custody. The four sub-steps (fetch, parse,
//! store, archive) are independent failure domains: a failure in one never
//! prevents the others from running, and `capture` always returns a
//! snapshot, possibly mostly empty.

pub mod archive;
pub mod html;
pub mod store;

use std::sync::Arc;

use chrono::Utc;
use scraper::Html;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::CaptureSettings;
use crate::domain::PageSnapshot;
use crate::evidence::spans::compute_hash;

pub use store::{FsSnapshotStore, SnapshotStore};

/// User agent presented to captured sites
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Captures page snapshots with hash anchoring and durable storage
pub struct PageCapturer {
    client: reqwest::Client,
    store: Option<Arc<dyn SnapshotStore>>,
    settings: CaptureSettings,
    /// Archive submission can be disabled for tests and offline runs
    archive_enabled: bool,
}

impl PageCapturer {
    pub fn new(settings: CaptureSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(settings.fetch_timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            store: None,
            settings,
            archive_enabled: true,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_archive_enabled(mut self, enabled: bool) -> Self {
        self.archive_enabled = enabled;
        self
    }

    /// Capture a snapshot of `url`.
    ///
    /// Never fails: fetch errors degrade every downstream field to
    /// empty/null and the caller still gets a snapshot with a hash over
    /// whatever bytes were received (possibly none).
    #[instrument(skip(self), fields(%url))]
    pub async fn capture(&self, url: &str, owner_id: Uuid, subject_id: Uuid) -> PageSnapshot {
        let captured_at = Utc::now();

        // Fetch: degrade to empty HTML on any failure
        let raw_html = self.fetch(url).await;

        // Hash the raw, unmodified bytes before any parsing touches them.
        // This is the tamper-evidence anchor.
        let content_hash = compute_hash(&raw_html);

        // Parse
        let (title, text, links) = if raw_html.is_empty() {
            (String::new(), String::new(), Vec::new())
        } else {
            let document = Html::parse_document(&String::from_utf8_lossy(&raw_html));
            (
                html::extract_title(&document),
                html::extract_text(&document, self.settings.max_text_chars),
                html::extract_links(&document, url, self.settings.max_links),
            )
        };

        // Store: failure is logged and swallowed
        let storage_path = match &self.store {
            Some(store) if !raw_html.is_empty() => {
                match store.store(owner_id, subject_id, captured_at, &raw_html).await {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!(%url, error = %e, "Snapshot storage failed");
                        None
                    }
                }
            }
            _ => None,
        };

        // Archive: best-effort third-party timestamping
        let archive_url = if self.archive_enabled && !raw_html.is_empty() {
            archive::submit(url).await
        } else {
            None
        };

        info!(
            %url,
            hash = %content_hash,
            text_chars = text.chars().count(),
            links = links.len(),
            stored = storage_path.is_some(),
            archived = archive_url.is_some(),
            "Page captured"
        );

        PageSnapshot {
            owner_id,
            subject_id,
            url: url.to_string(),
            title,
            text,
            links,
            content_hash,
            storage_path,
            archive_url,
            captured_at,
        }
    }

    /// Fetch raw page bytes, returning empty on any failure
    async fn fetch(&self, url: &str) -> Vec<u8> {
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    warn!(%url, status = status.as_u16(), "Fetch returned non-2xx, proceeding with empty page");
                    return Vec::new();
                }
                match response.bytes().await {
                    Ok(bytes) => bytes.to_vec(),
                    Err(e) => {
                        warn!(%url, error = %e, "Failed to read response body");
                        Vec::new()
                    }
                }
            }
            Err(e) => {
                warn!(%url, error = %e, "Fetch failed, proceeding with empty page");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::spans::verify_hash;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Serve one HTTP response on loopback and return the URL for it
    async fn serve_once(body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf).await;

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        });

        format!("http://{}/page", addr)
    }

    #[tokio::test]
    async fn test_capture_unreachable_url_degrades_to_empty() {
        let capturer = PageCapturer::new(CaptureSettings {
            fetch_timeout: std::time::Duration::from_millis(300),
            ..Default::default()
        })
        .with_archive_enabled(false);

        let snapshot = capturer
            .capture(
                "http://127.0.0.1:1/unreachable",
                Uuid::new_v4(),
                Uuid::new_v4(),
            )
            .await;

        assert!(snapshot.is_empty());
        assert!(snapshot.links.is_empty());
        assert!(snapshot.storage_path.is_none());
        assert!(snapshot.archive_url.is_none());
        // Hash of the empty byte string is still recorded
        assert!(verify_hash(b"", &snapshot.content_hash));
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_snapshot_usable() {
        const BODY: &str = "<html><head><title>Cracked Widget</title></head>\
            <body><p>Download the full product here</p></body></html>";

        let url = serve_once(BODY).await;

        // procfs rejects directory creation, so every persist attempt fails
        let capturer = PageCapturer::new(CaptureSettings::default())
            .with_store(Arc::new(store::FsSnapshotStore::new("/proc/no-such-dir")))
            .with_archive_enabled(false);

        let snapshot = capturer.capture(&url, Uuid::new_v4(), Uuid::new_v4()).await;

        // The persist failure is swallowed; everything else still ran
        assert!(snapshot.storage_path.is_none());
        assert_eq!(snapshot.title, "Cracked Widget");
        assert!(snapshot.text.contains("Download the full product here"));
        assert!(verify_hash(BODY.as_bytes(), &snapshot.content_hash));
    }
}
