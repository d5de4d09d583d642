//! Best-effort submission to the Internet Archive.
//!
//! Independent third-party timestamping for captured pages. Every failure
//! here is non-fatal: the pipeline proceeds without an archive URL.

use std::time::Duration;

use tracing::{debug, warn};

const SAVE_ENDPOINT: &str = "https://web.archive.org/save";
const ARCHIVE_TIMEOUT: Duration = Duration::from_secs(30);

/// Submit a URL to web.archive.org for archival.
///
/// Success is signaled by a redirect `Location` (or `Content-Location`)
/// header pointing at the archived copy. A 2xx without either header gets
/// a constructed best-guess URL; anything else yields `None`.
pub async fn submit(url: &str) -> Option<String> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(ARCHIVE_TIMEOUT)
        .build()
        .ok()?;

    let save_url = format!("{}/{}", SAVE_ENDPOINT, url);

    match client.get(&save_url).send().await {
        Ok(response) => {
            let status = response.status();

            let location = response
                .headers()
                .get("location")
                .or_else(|| response.headers().get("content-location"))
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            if let Some(location) = location {
                let archive_url = if location.starts_with("http") {
                    location
                } else {
                    format!("https://web.archive.org{}", location)
                };
                debug!(%url, %archive_url, "Archive submission accepted");
                return Some(archive_url);
            }

            if status.is_success() || status.is_redirection() {
                // Accepted but no pointer returned; construct the best guess
                Some(best_guess_url(url))
            } else {
                warn!(%url, status = status.as_u16(), "Archive submission rejected");
                None
            }
        }
        Err(e) => {
            warn!(%url, error = %e, "Archive submission failed");
            None
        }
    }
}

/// The stable wayback URL an accepted capture ends up at
fn best_guess_url(url: &str) -> String {
    format!("https://web.archive.org/web/{}", url)
}
