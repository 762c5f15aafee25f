//! Response interception primitives shared by every catalog source.

use crate::config::Config;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// GraphQL operation issued by the browse page to list the catalog.
pub const DEFAULT_OPERATION: &str = "searchStoreQuery";

/// Source of captured catalog responses - enables mocking for tests.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Loads `url` and returns every matching response observed while it loads.
    async fn capture(&self, url: &str) -> Result<Vec<CapturedResponse>>;
}

/// A network response whose URL and status matched the catalog query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl CapturedResponse {
    /// Creates a response record.
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self { url: url.into(), status, body: body.into() }
    }
}

/// Decides which responses belong to the catalog query.
#[derive(Debug, Clone)]
pub struct ResponseMatcher {
    signature: String,
}

impl ResponseMatcher {
    /// Matches `graphql?operationName=<operation>` anywhere in the URL.
    pub fn new(operation: &str) -> Self {
        Self { signature: format!("graphql?operationName={}", operation) }
    }

    /// Returns true for successful responses carrying the operation signature.
    pub fn matches(&self, url: &str, status: u16) -> bool {
        status == 200 && url.contains(&self.signature)
    }

    /// The URL fragment a response must contain.
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl Default for ResponseMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_OPERATION)
    }
}

/// Capture counters, as seen by the wait condition.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaptureProgress {
    /// Bodies retrieved so far
    pub captured: usize,
    /// Matching responses whose body is still loading
    pub pending: usize,
    /// Offset from the start of the run of the latest matching event
    pub last_activity: Option<Duration>,
}

/// A matching response whose body has not been retrieved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingResponse {
    pub request_id: String,
    pub url: String,
    pub status: u16,
}

/// Bookkeeping for one capture run, keyed by DevTools request id.
///
/// Response headers and load completion arrive as separate events and may be
/// handled in either order; a body is ready once both have been seen.
#[derive(Debug, Default)]
pub struct CaptureState {
    pending: HashMap<String, PendingResponse>,
    finished: HashSet<String>,
    captured: Vec<CapturedResponse>,
    last_activity: Option<Duration>,
}

impl CaptureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the headers of a matching response.
    ///
    /// Returns the entry when its body already finished loading.
    pub fn on_response(
        &mut self,
        request_id: &str,
        url: &str,
        status: u16,
        at: Duration,
    ) -> Option<PendingResponse> {
        self.last_activity = Some(at);
        let entry = PendingResponse {
            request_id: request_id.to_string(),
            url: url.to_string(),
            status,
        };

        if self.finished.remove(request_id) {
            return Some(entry);
        }
        self.pending.insert(entry.request_id.clone(), entry);
        None
    }

    /// Drops whatever is known about a response that did not match.
    pub fn forget(&mut self, request_id: &str) {
        self.finished.remove(request_id);
    }

    /// Records that a request finished loading.
    ///
    /// Returns the entry when its headers were already seen.
    pub fn on_finished(&mut self, request_id: &str, at: Duration) -> Option<PendingResponse> {
        match self.pending.remove(request_id) {
            Some(entry) => {
                self.last_activity = Some(at);
                Some(entry)
            }
            None => {
                self.finished.insert(request_id.to_string());
                None
            }
        }
    }

    /// Records that a request failed; returns the entry if it was a matching one.
    pub fn on_failed(&mut self, request_id: &str) -> Option<PendingResponse> {
        self.finished.remove(request_id);
        self.pending.remove(request_id)
    }

    /// Stores a retrieved body.
    pub fn record(&mut self, response: CapturedResponse, at: Duration) {
        self.last_activity = Some(at);
        self.captured.push(response);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn progress(&self) -> CaptureProgress {
        CaptureProgress {
            captured: self.captured.len(),
            pending: self.pending.len(),
            last_activity: self.last_activity,
        }
    }

    /// Captured bodies in retrieval order.
    pub fn into_captured(self) -> Vec<CapturedResponse> {
        self.captured
    }
}

/// Wait condition deciding when a page has finished issuing catalog queries.
///
/// Nothing completes before `settle`. After that the run ends once at least
/// one body was captured, nothing is pending and the query has been quiet for
/// `idle`, or unconditionally at `timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureWindow {
    pub settle: Duration,
    pub idle: Duration,
    pub timeout: Duration,
}

impl CaptureWindow {
    pub fn new(settle: Duration, idle: Duration, timeout: Duration) -> Self {
        Self { settle, idle, timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Duration::from_millis(config.settle_ms),
            Duration::from_millis(config.idle_ms),
            Duration::from_millis(config.timeout_ms),
        )
    }

    /// Returns true once the fixed settle delay is over.
    pub fn is_settled(&self, elapsed: Duration) -> bool {
        elapsed >= self.settle
    }

    /// Returns true when capturing should stop.
    pub fn is_complete(&self, elapsed: Duration, progress: &CaptureProgress) -> bool {
        if !self.is_settled(elapsed) {
            return false;
        }
        if elapsed >= self.timeout {
            return true;
        }
        if progress.captured == 0 || progress.pending > 0 {
            return false;
        }

        let last = progress.last_activity.unwrap_or_default();
        elapsed.saturating_sub(last) >= self.idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTLE: Duration = Duration::from_secs(10);
    const IDLE: Duration = Duration::from_secs(3);
    const TIMEOUT: Duration = Duration::from_secs(60);

    fn window() -> CaptureWindow {
        CaptureWindow::new(SETTLE, IDLE, TIMEOUT)
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_matcher_matches_operation() {
        let matcher = ResponseMatcher::default();
        assert!(matcher.matches(
            "https://store.epicgames.com/graphql?operationName=searchStoreQuery&variables=%7B%7D",
            200
        ));
        assert_eq!(matcher.signature(), "graphql?operationName=searchStoreQuery");
    }

    #[test]
    fn test_matcher_requires_success() {
        let matcher = ResponseMatcher::default();
        let url = "https://store.epicgames.com/graphql?operationName=searchStoreQuery";
        assert!(!matcher.matches(url, 304));
        assert!(!matcher.matches(url, 403));
        assert!(!matcher.matches(url, 500));
    }

    #[test]
    fn test_matcher_ignores_other_operations() {
        let matcher = ResponseMatcher::default();
        assert!(!matcher.matches(
            "https://store.epicgames.com/graphql?operationName=getCatalogOffer",
            200
        ));
        assert!(!matcher.matches("https://store.epicgames.com/en-US/browse", 200));
        assert!(!matcher.matches(
            "https://store.epicgames.com/graphql?variables=x&operationName=searchStoreQuery",
            200
        ));
    }

    #[test]
    fn test_matcher_custom_operation() {
        let matcher = ResponseMatcher::new("promotionsQuery");
        assert!(matcher.matches("https://x/graphql?operationName=promotionsQuery", 200));
        assert!(!matcher.matches("https://x/graphql?operationName=searchStoreQuery", 200));
    }

    #[test]
    fn test_window_waits_for_settle() {
        let progress =
            CaptureProgress { captured: 3, pending: 0, last_activity: Some(secs(1)) };
        assert!(!window().is_complete(secs(5), &progress));
        assert!(window().is_complete(SETTLE, &progress));
    }

    #[test]
    fn test_window_waits_for_quiet_period() {
        let progress =
            CaptureProgress { captured: 1, pending: 0, last_activity: Some(secs(9)) };
        assert!(!window().is_complete(secs(11), &progress));
        assert!(window().is_complete(secs(12), &progress));
    }

    #[test]
    fn test_window_waits_for_pending_bodies() {
        let progress =
            CaptureProgress { captured: 1, pending: 1, last_activity: Some(secs(2)) };
        assert!(!window().is_complete(secs(30), &progress));
    }

    #[test]
    fn test_window_keeps_waiting_without_captures() {
        let progress = CaptureProgress::default();
        assert!(!window().is_complete(secs(20), &progress));
        assert!(!window().is_complete(secs(59), &progress));
    }

    #[test]
    fn test_window_timeout_always_completes() {
        let stuck = CaptureProgress { captured: 0, pending: 2, last_activity: Some(secs(58)) };
        assert!(window().is_complete(TIMEOUT, &stuck));
        assert!(window().is_complete(secs(120), &stuck));
    }

    #[test]
    fn test_window_from_config() {
        let config = Config::default();
        let window = CaptureWindow::from_config(&config);
        assert_eq!(window.settle, Duration::from_millis(config.settle_ms));
        assert_eq!(window.idle, Duration::from_millis(config.idle_ms));
        assert_eq!(window.timeout, Duration::from_millis(config.timeout_ms));
    }

    const CATALOG_URL: &str = "https://store.epicgames.com/graphql?operationName=searchStoreQuery";

    fn fetch(state: &mut CaptureState, entry: PendingResponse, at: Duration) {
        state.record(CapturedResponse::new(entry.url, entry.status, "{}"), at);
    }

    #[test]
    fn test_state_headers_then_finished() {
        let mut state = CaptureState::new();

        assert!(state.on_response("req-1", CATALOG_URL, 200, secs(1)).is_none());
        assert_eq!(state.progress().pending, 1);

        let entry = state.on_finished("req-1", secs(2)).unwrap();
        assert_eq!(entry.request_id, "req-1");
        fetch(&mut state, entry, secs(2));

        let progress = state.progress();
        assert_eq!(progress.captured, 1);
        assert_eq!(progress.pending, 0);
        assert_eq!(progress.last_activity, Some(secs(2)));
    }

    #[test]
    fn test_state_finished_before_headers() {
        let mut state = CaptureState::new();

        assert!(state.on_finished("req-1", secs(1)).is_none());
        assert_eq!(state.progress().pending, 0);

        let entry = state.on_response("req-1", CATALOG_URL, 200, secs(1)).unwrap();
        assert_eq!(entry.url, CATALOG_URL);
        fetch(&mut state, entry, secs(1));

        assert_eq!(state.pending_len(), 0);
        assert_eq!(state.into_captured().len(), 1);
    }

    #[test]
    fn test_state_any_interleaving_drains() {
        // Every order of (headers, finished) across two requests.
        let events = [("req-1", true), ("req-1", false), ("req-2", true), ("req-2", false)];
        let orders: [[usize; 4]; 6] =
            [[0, 1, 2, 3], [1, 0, 3, 2], [1, 3, 0, 2], [0, 2, 1, 3], [3, 1, 2, 0], [2, 1, 3, 0]];

        for order in orders {
            let mut state = CaptureState::new();
            for index in order {
                let (id, is_headers) = events[index];
                let ready = if is_headers {
                    state.on_response(id, CATALOG_URL, 200, secs(1))
                } else {
                    state.on_finished(id, secs(1))
                };
                if let Some(entry) = ready {
                    fetch(&mut state, entry, secs(1));
                }
            }

            let progress = state.progress();
            assert_eq!(progress.captured, 2, "order {:?}", order);
            assert_eq!(progress.pending, 0, "order {:?}", order);
            assert!(window().is_complete(secs(15), &progress));
        }
    }

    #[test]
    fn test_state_failed_request() {
        let mut state = CaptureState::new();
        state.on_response("req-1", CATALOG_URL, 200, secs(1));

        assert!(state.on_failed("req-1").is_some());
        assert!(state.on_failed("req-1").is_none());
        assert_eq!(state.progress().pending, 0);
        assert_eq!(state.progress().captured, 0);
    }

    #[test]
    fn test_state_forget_unmatched() {
        let mut state = CaptureState::new();
        assert!(state.on_finished("asset", secs(1)).is_none());
        state.forget("asset");

        // A later matching response with a reused id waits for its own finish.
        assert!(state.on_response("asset", CATALOG_URL, 200, secs(2)).is_none());
        assert_eq!(state.pending_len(), 1);
        assert_eq!(state.progress().last_activity, Some(secs(2)));
    }

    #[test]
    fn test_captured_response_serde() {
        let response = CapturedResponse::new("https://x/graphql", 200, "{}");
        let json = serde_json::to_string(&response).unwrap();
        let parsed: CapturedResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, response);
    }
}
