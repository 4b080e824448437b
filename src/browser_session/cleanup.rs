//! Browser shutdown after a run
//!
//! The profile directory is left in place so the next run starts with the
//! same cookies.

use chromiumoxide::Browser;
use log::{debug, warn};
use tokio::task::JoinHandle;

/// Result of cleanup operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupResult {
    /// All cleanup operations succeeded
    Success,
    /// Some cleanup operations failed, with error details
    PartialFailure(Vec<String>),
}

/// Close the browser, wait for the process to exit and stop the CDP handler
pub async fn shutdown_browser(mut browser: Browser, handler: JoinHandle<()>) -> CleanupResult {
    let mut errors = Vec::new();

    debug!(target: "batchfetch::cleanup", "Closing browser");
    if let Err(e) = browser.close().await {
        warn!(target: "batchfetch::cleanup", "Failed to close browser: {e}");
        errors.push(format!("Browser close failed: {e}"));
    }

    // Reap the process so chromiumoxide does not warn about an unclosed browser
    if let Err(e) = browser.wait().await {
        warn!(target: "batchfetch::cleanup", "Failed to wait for browser exit: {e}");
        errors.push(format!("Browser wait failed: {e}"));
    } else {
        debug!(target: "batchfetch::cleanup", "Browser process exited");
    }

    handler.abort();

    if errors.is_empty() {
        CleanupResult::Success
    } else {
        CleanupResult::PartialFailure(errors)
    }
}
