//! Chromium-backed catalog capture using chromiumoxide.
//!
//! The browse page issues its own `searchStoreQuery` GraphQL calls; this
//! module only listens. A matching response's body is fetched once both its
//! headers and `Network.loadingFinished` have been seen.

use crate::config::Config;
use crate::store::capture::{
    CaptureState, CaptureWindow, CapturedResponse, CatalogSource, ResponseMatcher,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventResponseReceived, GetResponseBodyParams,
    RequestId,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

const TICK: Duration = Duration::from_millis(250);

const SCROLL_SCRIPT: &str = "window.scrollBy(0, window.innerHeight)";

/// Browser failures that end a capture run.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to launch Chromium: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("DevTools command failed: {0}")]
    Cdp(#[from] CdpError),
}

/// Finds a Chromium binary: the configured path, then well-known names on PATH.
///
/// `None` leaves discovery to chromiumoxide.
pub fn find_chrome(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        warn!("Configured Chromium path does not exist: {}", path.display());
    }

    ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"]
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Settings of one browser run, taken from [`Config`].
#[derive(Debug, Clone)]
struct SessionSettings {
    headless: bool,
    chrome_path: Option<PathBuf>,
    nav_timeout_ms: u64,
    scroll: bool,
    scroll_interval: Duration,
    interactive: bool,
}

/// Captures catalog responses by loading the browse page in Chromium.
pub struct BrowserCapture {
    settings: SessionSettings,
    matcher: ResponseMatcher,
    window: CaptureWindow,
}

impl BrowserCapture {
    pub fn new(config: &Config) -> Self {
        Self {
            settings: SessionSettings {
                headless: config.headless,
                chrome_path: config.chrome_path.clone(),
                nav_timeout_ms: config.nav_timeout_ms,
                scroll: config.scroll,
                scroll_interval: Duration::from_millis(config.scroll_interval_ms.max(100)),
                interactive: config.interactive,
            },
            matcher: ResponseMatcher::new(&config.operation),
            window: CaptureWindow::from_config(config),
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, CaptureError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1366, 900)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");

        if !self.settings.headless {
            builder = builder.with_head();
        }

        if let Some(path) = find_chrome(self.settings.chrome_path.as_deref()) {
            debug!("Using Chromium at {}", path.display());
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(CaptureError::Launch)
    }

    async fn navigate(&self, page: &Page, url: &str) -> Result<(), CaptureError> {
        let timeout = Duration::from_millis(self.settings.nav_timeout_ms);

        match tokio::time::timeout(timeout, page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => {
                Err(CaptureError::Navigation { url: url.to_string(), reason: e.to_string() })
            }
            Err(_) => {
                // The load event may never fire on a busy store page; the
                // catalog query is usually already in flight by now.
                warn!("Page load did not finish within {}ms, capturing anyway", timeout.as_millis());
                Ok(())
            }
        }
    }

    async fn run(&self, browser: &Browser, url: &str) -> Result<Vec<CapturedResponse>> {
        let page = browser.new_page("about:blank").await.map_err(CaptureError::from)?;

        let mut received = page.event_listener::<EventResponseReceived>().await?;
        let mut finished = page.event_listener::<EventLoadingFinished>().await?;
        let mut failed = page.event_listener::<EventLoadingFailed>().await?;

        info!("Navigating to {}", url);
        self.navigate(&page, url).await?;

        let started = Instant::now();
        let mut state = CaptureState::new();
        let mut ticker = tokio::time::interval(TICK);
        let mut next_scroll = started + self.settings.scroll_interval;
        let mut confirmation: Option<JoinHandle<()>> = None;

        loop {
            // Headers first: CDP emits responseReceived before loadingFinished.
            let ready = tokio::select! {
                biased;
                Some(event) = received.next() => {
                    let status = u16::try_from(event.response.status).unwrap_or(0);
                    let id = event.request_id.inner();
                    if self.matcher.matches(&event.response.url, status) {
                        debug!("Catalog response headers received: {}", event.response.url);
                        state.on_response(id, &event.response.url, status, started.elapsed())
                    } else {
                        trace!("Ignoring response {} ({})", event.response.url, status);
                        state.forget(id);
                        None
                    }
                }
                Some(event) = finished.next() => {
                    state.on_finished(event.request_id.inner(), started.elapsed())
                }
                Some(event) = failed.next() => {
                    if let Some(entry) = state.on_failed(event.request_id.inner()) {
                        warn!("Catalog request failed to load: {} ({})", entry.url, event.error_text);
                    }
                    None
                }
                _ = ticker.tick() => None,
            };

            if let Some(entry) = ready {
                let request_id = RequestId::new(entry.request_id.clone());
                match fetch_body(&page, &request_id).await {
                    Ok(body) => {
                        info!("Captured catalog response ({} bytes)", body.len());
                        state.record(
                            CapturedResponse::new(entry.url, entry.status, body),
                            started.elapsed(),
                        );
                    }
                    Err(e) => warn!("Could not read body of {}: {:#}", entry.url, e),
                }
            }

            let elapsed = started.elapsed();

            if self.settings.interactive {
                if self.window.is_settled(elapsed) {
                    let handle = confirmation.get_or_insert_with(prompt_operator);
                    if handle.is_finished() {
                        break;
                    }
                }
            } else if self.window.is_complete(elapsed, &state.progress()) {
                break;
            }

            if self.settings.scroll && Instant::now() >= next_scroll {
                if let Err(e) = page.evaluate(SCROLL_SCRIPT).await {
                    debug!("Scroll failed: {}", e);
                }
                next_scroll = Instant::now() + self.settings.scroll_interval;
            }
        }

        if state.pending_len() > 0 {
            warn!(
                "{} catalog response(s) were still loading when capture ended",
                state.pending_len()
            );
        }

        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }

        let captured = state.into_captured();
        info!("Captured {} catalog response(s) in {:?}", captured.len(), started.elapsed());
        Ok(captured)
    }
}

#[async_trait]
impl CatalogSource for BrowserCapture {
    async fn capture(&self, url: &str) -> Result<Vec<CapturedResponse>> {
        let config = self.browser_config()?;
        let (mut browser, mut handler) =
            Browser::launch(config).await.map_err(|e| CaptureError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!("Browser handler error: {}", e);
                }
            }
        });

        let result = self.run(&browser, url).await;

        // Always tear the browser down, whatever the run returned.
        match browser.close().await {
            Ok(_) => {
                let _ = browser.wait().await;
                let _ = handler_task.await;
            }
            Err(e) => {
                warn!("Failed to close Chromium cleanly: {}", e);
                handler_task.abort();
            }
        }

        result
    }
}

async fn fetch_body(page: &Page, request_id: &RequestId) -> Result<String> {
    let reply = page
        .execute(GetResponseBodyParams::new(request_id.clone()))
        .await
        .context("Network.getResponseBody failed")?;

    if reply.result.base64_encoded {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&reply.result.body)
            .context("Response body is not valid base64")?;
        return String::from_utf8(bytes).context("Response body is not UTF-8");
    }

    Ok(reply.result.body)
}

fn prompt_operator() -> JoinHandle<()> {
    eprintln!("Scroll or interact with the page if needed, then press Enter to continue...");
    tokio::spawn(async {
        let mut line = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = stdin.read_line(&mut line).await {
            debug!("Could not read confirmation from stdin: {}", e);
        }
    })
}
