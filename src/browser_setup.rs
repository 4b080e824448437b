use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

use crate::utils::constants::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// Environment variable naming an explicit Chrome/Chromium binary
pub const CHROMIUM_PATH_ENV: &str = "CHROMIUM_PATH";

/// Launch settings for the shared browser process
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub headless: bool,
    /// Persistent profile directory, reused across runs
    pub user_data_dir: PathBuf,
    pub user_agent: String,
    /// Proxy server handed to Chromium via `--proxy-server`
    pub proxy_server: Option<String>,
}

impl BrowserSettings {
    /// Command-line switches for this run, on top of chromiumoxide's defaults
    #[must_use]
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--user-agent={}", self.user_agent),
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-infobars".to_string(),
            "--disable-notifications".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--no-sandbox".to_string(),
            "--disable-extensions".to_string(),
            "--password-store=basic".to_string(),
            "--mute-audio".to_string(),
        ];
        if let Some(server) = &self.proxy_server {
            args.push(format!("--proxy-server={server}"));
        }
        args
    }
}

/// `CHROMIUM_PATH`, if it names a file that exists
fn executable_override() -> Option<PathBuf> {
    let path = PathBuf::from(std::env::var_os(CHROMIUM_PATH_ENV)?);
    if path.exists() {
        info!("Using browser from {CHROMIUM_PATH_ENV}: {}", path.display());
        Some(path)
    } else {
        warn!(
            "{CHROMIUM_PATH_ENV} points to {} which does not exist; ignoring it",
            path.display()
        );
        None
    }
}

/// Downloads and manages Chromium browser if not found locally.
/// Returns a path to the downloaded executable.
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .map(|dir| dir.join("kodegen-batchfetch"))
        .unwrap_or_else(|| std::env::temp_dir().join("batchfetch_chrome_cache"))
        .join("chromium");

    std::fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );

    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;
    info!(
        "Downloaded Chromium to: {}",
        revision_info.folder_path.display()
    );

    Ok(revision_info.executable_path)
}

fn config_builder(settings: &BrowserSettings) -> BrowserConfigBuilder {
    let window_width = u32::try_from(VIEWPORT_WIDTH).unwrap_or(1920);
    let window_height = u32::try_from(VIEWPORT_HEIGHT).unwrap_or(1080);

    let builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(window_width, window_height)
        .user_data_dir(settings.user_data_dir.clone())
        .args(settings.launch_args());

    if settings.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    }
}

/// Resolve the executable and build the launch config
///
/// Order: `CHROMIUM_PATH`, then chromiumoxide's own detection, then a
/// managed download.
async fn browser_config(settings: &BrowserSettings) -> Result<BrowserConfig> {
    if let Some(path) = executable_override() {
        return config_builder(settings)
            .chrome_executable(path)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"));
    }

    match config_builder(settings).build() {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!("No local browser found ({e}); downloading one");
            let path = download_managed_browser().await?;
            config_builder(settings)
                .chrome_executable(path)
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))
        }
    }
}

/// Find or download Chrome/Chromium and launch it with the run's profile,
/// user agent and proxy.
///
/// The profile directory is kept after the run so cookies and consent
/// state carry over to the next one.
pub async fn launch_browser(settings: &BrowserSettings) -> Result<(Browser, JoinHandle<()>)> {
    std::fs::create_dir_all(&settings.user_data_dir)
        .context("Failed to create user data directory")?;

    if let Some(server) = &settings.proxy_server {
        info!("Routing browser traffic through proxy {server}");
    }
    let browser_config = browser_config(settings).await?;

    info!("Launching browser with profile {}", settings.user_data_dir.display());
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(h) = handler.next().await {
            if let Err(e) = h {
                let error_msg = e.to_string();

                // Chrome emits CDP events chromiumoxide cannot deserialize
                if error_msg.contains("data did not match any variant of untagged enum Message")
                    || error_msg.contains("Failed to deserialize WS response")
                {
                    trace!("Suppressed CDP serialization error: {error_msg}");
                } else {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        info!("Browser handler task completed");
    });

    Ok((browser, handler_task))
}
