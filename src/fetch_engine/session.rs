use std::future::Future;

/// One long-lived browser tab, as seen by a fetch worker
///
/// The chromiumoxide implementation lives in [`crate::browser_session`]; tests
/// substitute scripted sessions.
pub trait PageSession: Send + Sync + 'static {
    /// Navigate the tab to `url`
    fn navigate(&self, url: &str) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Wait for the document-ready signal after navigation
    fn wait_until_ready(&self) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Full rendered content of the current document
    fn content(&self) -> impl Future<Output = anyhow::Result<String>> + Send;
}
